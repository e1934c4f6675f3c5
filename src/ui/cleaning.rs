use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use macsweep::{format_size, FnProgress, ProgressSink};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::utils::format_duration;

/// Summary of one finished cleanup run.
#[derive(Debug)]
pub struct Report {
    pub total_freed: u64,
    pub lines: Vec<String>,
}

/// Runs a deletion job on a background thread, mirroring its progress.
pub struct CleaningWidget {
    title: String,
    status: Arc<Mutex<String>>,
    report_rx: Receiver<Report>,
    started: Instant,
}

impl CleaningWidget {
    pub fn new(
        title: &str,
        job: impl FnOnce(&mut dyn ProgressSink) -> Report + Send + 'static,
    ) -> Self {
        let status = Arc::new(Mutex::new("Starting...".to_string()));
        let (report_tx, report_rx) = mpsc::channel();

        let job_status = Arc::clone(&status);
        thread::spawn(move || {
            let mut sink = FnProgress(move |line: &str| {
                if let Ok(mut status) = job_status.lock() {
                    *status = line.to_string();
                }
            });
            let report = job(&mut sink);
            if report_tx.send(report).is_err() {
                log::debug!("Cleanup report dropped, receiver closed");
            }
        });

        Self {
            title: title.to_string(),
            status,
            report_rx,
            started: Instant::now(),
        }
    }

    pub fn poll(&mut self) -> Option<Report> {
        self.report_rx.try_recv().ok()
    }
}

impl Widget for &CleaningWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        let status = self
            .status
            .lock()
            .map(|status| status.clone())
            .unwrap_or_default();

        Paragraph::new(vec![Line::raw(""), Line::raw(format!("  {status}"))])
            .block(
                Block::default()
                    .title(self.title.as_str())
                    .borders(Borders::ALL),
            )
            .render(layout[0], buf);

        Line::raw(format!(
            "{} Cleaning... (q quit)",
            format_duration(&self.started.elapsed())
        ))
        .blue()
        .render(layout[1], buf);
    }
}

/// Shows the outcome of a cleanup run.
pub struct ReportWidget {
    report: Report,
}

impl ReportWidget {
    pub fn new(report: Report) -> Self {
        Self { report }
    }
}

impl Widget for &ReportWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        let mut lines = vec![
            Line::raw(""),
            Line::raw(format!(
                "  Freed {} in total.",
                format_size(self.report.total_freed)
            ))
            .bold(),
            Line::raw(""),
        ];
        let height = layout[0].height.saturating_sub(2) as usize;
        for entry in self.report.lines.iter().take(height.saturating_sub(3)) {
            lines.push(Line::raw(format!("  {entry}")));
        }

        Paragraph::new(lines)
            .block(Block::default().title("Cleanup complete").borders(Borders::ALL))
            .render(layout[0], buf);

        Line::raw("b back to menu, q quit")
            .blue()
            .render(layout[1], buf);
    }
}
