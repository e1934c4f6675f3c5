use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Cleanup,
    BigFiles,
    Duplicates,
    OldFiles,
}

const ENTRIES: [(MenuChoice, &str, &str); 4] = [
    (
        MenuChoice::Cleanup,
        "Clean caches & junk",
        "Delete well-known cache, log and temp locations",
    ),
    (
        MenuChoice::BigFiles,
        "Find large files",
        "Scan home folders for files over the size threshold",
    ),
    (
        MenuChoice::Duplicates,
        "Find duplicate files",
        "Group files with identical size and content fingerprint",
    ),
    (
        MenuChoice::OldFiles,
        "Find old files",
        "Scan for files untouched past the age threshold",
    ),
];

pub struct MenuWidget {
    cursor: usize,
}

impl MenuWidget {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Returns the chosen mode once the user confirms an entry.
    pub fn handle_event(&mut self, event: &Event) -> Option<MenuChoice> {
        let Event::Key(key) = event else { return None };
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }

        match key.code {
            KeyCode::Up if self.cursor > 0 => self.cursor -= 1,
            KeyCode::Down if self.cursor + 1 < ENTRIES.len() => self.cursor += 1,
            KeyCode::Enter => return Some(ENTRIES[self.cursor].0),
            KeyCode::Char(digit @ '1'..='4') => {
                return Some(ENTRIES[digit as usize - '1' as usize].0);
            }
            _ => {}
        }
        None
    }
}

impl Widget for &MenuWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        let mut lines = vec![Line::raw(""), Line::raw("  What should be cleaned?"), Line::raw("")];
        for (index, (_, label, description)) in ENTRIES.iter().enumerate() {
            let line = Line::raw(format!("  {}. {label} - {description}", index + 1));
            lines.push(if index == self.cursor {
                line.on_gray()
            } else {
                line
            });
        }

        Paragraph::new(lines)
            .block(Block::default().title("macsweep").borders(Borders::ALL))
            .render(layout[0], buf);

        Line::raw("up/down move, enter select, q quit")
            .blue()
            .render(layout[1], buf);
    }
}
