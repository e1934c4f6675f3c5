use std::cell::Cell;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use macsweep::{
    default_targets, format_size, has_selection, Cleaner, CleanupTarget, SudoSession,
};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::utils::centered_rect;

/// Catalog of cleanup targets with selection and live size figures.
///
/// Sizes are measured on a background thread so the list is usable
/// immediately; rows fill in as measurements arrive.
pub struct TargetSelectWidget {
    targets: Vec<CleanupTarget>,
    cursor: usize,
    view_offset: Cell<usize>,
    view_height: Cell<usize>,
    size_rx: Receiver<(usize, u64)>,
    sized: usize,
    confirming: bool,
}

impl TargetSelectWidget {
    pub fn new(sudo: Arc<SudoSession>) -> Self {
        let targets = default_targets();
        let (size_tx, size_rx) = mpsc::channel();

        let catalog = targets.clone();
        thread::spawn(move || {
            let cleaner = Cleaner::new(&sudo);
            for (index, target) in catalog.iter().enumerate() {
                let size = cleaner.measure_target(target);
                if size_tx.send((index, size)).is_err() {
                    return;
                }
            }
        });

        Self {
            targets,
            cursor: 0,
            view_offset: Cell::new(0),
            view_height: Cell::new(1),
            size_rx,
            sized: 0,
            confirming: false,
        }
    }

    /// Applies pending size measurements.
    pub fn poll(&mut self) {
        while let Ok((index, size)) = self.size_rx.try_recv() {
            if let Some(target) = self.targets.get_mut(index) {
                target.size = size;
            }
            self.sized += 1;
        }
    }

    fn selected_size(&self) -> u64 {
        self.targets
            .iter()
            .filter(|target| target.selected)
            .map(|target| target.size)
            .sum()
    }

    fn selected_count(&self) -> usize {
        self.targets.iter().filter(|target| target.selected).count()
    }

    /// Returns the full catalog, selections included, once the user
    /// confirms a cleanup.
    pub fn handle_event(&mut self, event: &Event) -> Option<Vec<CleanupTarget>> {
        let Event::Key(key) = event else { return None };
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }

        if self.confirming {
            match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirming = false;
                    return Some(self.targets.clone());
                }
                KeyCode::Esc => self.confirming = false,
                _ => {}
            }
            return None;
        }

        let page = self.view_height.get().max(1);
        match key.code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down if self.cursor + 1 < self.targets.len() => self.cursor += 1,
            KeyCode::PageUp => self.cursor = self.cursor.saturating_sub(page),
            KeyCode::PageDown if !self.targets.is_empty() => {
                self.cursor = (self.cursor + page).min(self.targets.len() - 1);
            }
            KeyCode::Char(' ') => {
                if let Some(target) = self.targets.get_mut(self.cursor) {
                    target.selected = !target.selected;
                }
            }
            KeyCode::Char('a') => {
                for target in &mut self.targets {
                    target.selected = true;
                }
            }
            KeyCode::Char('n') => {
                for target in &mut self.targets {
                    target.selected = false;
                }
            }
            KeyCode::Char('c') if has_selection(&self.targets) => {
                self.confirming = true;
            }
            _ => {}
        }
        None
    }
}

impl Widget for &TargetSelectWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        let height = layout[0].height.saturating_sub(2).max(1) as usize;
        self.view_height.set(height);

        let mut offset = self.view_offset.get().min(self.cursor);
        if self.cursor >= offset + height {
            offset = self.cursor + 1 - height;
        }
        self.view_offset.set(offset);

        let mut lines = Vec::with_capacity(height);
        for (index, target) in self.targets.iter().enumerate().skip(offset).take(height) {
            let mark = if target.selected { 'x' } else { ' ' };
            let sudo = if target.requires_sudo { " (sudo)" } else { "" };
            let size = if index < self.sized || target.size > 0 {
                format_size(target.size)
            } else {
                "...".to_string()
            };
            let line = Line::raw(format!(
                "  [{mark}] {:<28} {:>9}  {}{sudo}",
                target.name, size, target.category
            ));
            lines.push(if index == self.cursor {
                line.on_gray()
            } else {
                line
            });
        }

        let title = self
            .targets
            .get(self.cursor)
            .map(|target| format!("Cleanup targets - {}", target.description))
            .unwrap_or_else(|| "Cleanup targets".to_string());

        Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .render(layout[0], buf);

        Line::raw(format!(
            "{} of {} selected ({}) - space toggle, a all, n none, c clean, b back, q quit",
            self.selected_count(),
            self.targets.len(),
            format_size(self.selected_size())
        ))
        .blue()
        .render(layout[1], buf);

        if self.confirming {
            let popup = centered_rect(60, 25, area);
            Clear.render(popup, buf);
            Paragraph::new(vec![
                Line::raw(""),
                Line::raw(format!(
                    "  Delete {} targets, about {}?",
                    self.selected_count(),
                    format_size(self.selected_size())
                )),
                Line::raw(""),
                Line::raw("  enter confirm, esc cancel").blue(),
            ])
            .block(Block::default().title("Confirm cleanup").borders(Borders::ALL))
            .render(popup, buf);
        }
    }
}
