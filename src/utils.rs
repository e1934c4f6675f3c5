use std::time::{Duration, SystemTime};

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub fn format_duration(value: &Duration) -> String {
    if value.as_secs() < 60 * 60 {
        format!(
            "{:0>2}:{:0>2}.{:0>2}",
            value.as_secs() / 60,
            value.as_secs() % 60,
            value.subsec_millis() / 10
        )
    } else {
        format!(
            "{:0>2}:{:0>2}:{:0>2}",
            value.as_secs() / (60 * 60),
            (value.as_secs() / 60) % 60,
            value.as_secs() % 60
        )
    }
}

/// Rough age of a file, for result listings.
pub fn format_age(modified: SystemTime) -> String {
    match modified.elapsed() {
        Ok(age) => {
            let days = age.as_secs() / 86_400;
            if days == 0 {
                "today".to_string()
            } else {
                format!("{days}d ago")
            }
        }
        Err(_) => "-".to_string(),
    }
}

/// helper function to create a centered rect using up certain percentage of the available rect `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
