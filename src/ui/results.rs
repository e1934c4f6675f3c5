use std::cell::Cell;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use macsweep::{format_size, shorten_path, BigFile, DuplicateGroup, OldFile};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::utils::format_age;

const PATH_WIDTH: usize = 60;

/// A scan result that can be listed, selected and deleted.
pub trait SelectableRow {
    fn header() -> &'static [&'static str];
    fn size(&self) -> u64;
    fn selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
    fn cells(&self) -> Vec<String>;
}

impl SelectableRow for BigFile {
    fn header() -> &'static [&'static str] {
        &["Size", "Age", "Path"]
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format_size(self.size),
            format_age(self.modified),
            shorten_path(&self.path.to_string_lossy(), PATH_WIDTH),
        ]
    }
}

impl SelectableRow for OldFile {
    fn header() -> &'static [&'static str] {
        &["Size", "Age", "Path"]
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format_size(self.size),
            format_age(self.modified),
            shorten_path(&self.path.to_string_lossy(), PATH_WIDTH),
        ]
    }
}

impl SelectableRow for DuplicateGroup {
    fn header() -> &'static [&'static str] {
        &["Reclaim", "Copies", "Keep"]
    }

    /// Reclaimable bytes, not the group's full footprint. One copy
    /// always survives a deletion.
    fn size(&self) -> u64 {
        self.reclaimable()
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn cells(&self) -> Vec<String> {
        let keeper = self
            .files
            .first()
            .map(|path| shorten_path(&path.to_string_lossy(), PATH_WIDTH))
            .unwrap_or_default();
        vec![
            format_size(self.reclaimable()),
            format!("{}", self.files.len()),
            keeper,
        ]
    }
}

/// Scrollable list of scan results with per-row selection.
pub struct ResultsWidget<T> {
    title: String,
    rows: Vec<T>,
    cursor: usize,
    view_offset: Cell<usize>,
    view_height: Cell<usize>,
}

impl<T: SelectableRow> ResultsWidget<T> {
    pub fn new(title: &str, rows: Vec<T>) -> Self {
        Self {
            title: title.to_string(),
            rows,
            cursor: 0,
            view_offset: Cell::new(0),
            view_height: Cell::new(1),
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    pub fn selected_size(&self) -> u64 {
        self.rows
            .iter()
            .filter(|row| row.selected())
            .map(|row| row.size())
            .sum()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|row| row.selected()).count()
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else { return };
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }

        let page = self.view_height.get().max(1);
        match key.code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down if self.cursor + 1 < self.rows.len() => self.cursor += 1,
            KeyCode::PageUp => self.cursor = self.cursor.saturating_sub(page),
            KeyCode::PageDown if !self.rows.is_empty() => {
                self.cursor = (self.cursor + page).min(self.rows.len() - 1);
            }
            KeyCode::Char(' ') => {
                if let Some(row) = self.rows.get_mut(self.cursor) {
                    row.set_selected(!row.selected());
                }
            }
            KeyCode::Char('a') => {
                for row in &mut self.rows {
                    row.set_selected(true);
                }
            }
            KeyCode::Char('n') => {
                for row in &mut self.rows {
                    row.set_selected(false);
                }
            }
            _ => {}
        }
    }
}

impl<T: SelectableRow> Widget for &ResultsWidget<T> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        // Border plus header line.
        let height = layout[0].height.saturating_sub(3).max(1) as usize;
        self.view_height.set(height);

        let mut offset = self.view_offset.get().min(self.cursor);
        if self.cursor >= offset + height {
            offset = self.cursor + 1 - height;
        }
        self.view_offset.set(offset);

        let header = T::header();
        let mut lines = vec![Line::raw(format!(
            "      {:>9}  {:>8}  {}",
            header[0], header[1], header[2]
        ))
        .bold()];

        if self.rows.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::raw("  Nothing found."));
        }

        for (index, row) in self.rows.iter().enumerate().skip(offset).take(height) {
            let cells = row.cells();
            let mark = if row.selected() { 'x' } else { ' ' };
            let line = Line::raw(format!(
                "  [{mark}] {:>9}  {:>8}  {}",
                cells[0], cells[1], cells[2]
            ));
            lines.push(if index == self.cursor {
                line.on_gray()
            } else {
                line
            });
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            )
            .render(layout[0], buf);

        Line::raw(format!(
            "{} of {} selected ({}) - space toggle, a all, n none, d delete, b back, q quit",
            self.selected_count(),
            self.rows.len(),
            format_size(self.selected_size())
        ))
        .blue()
        .render(layout[1], buf);
    }
}
