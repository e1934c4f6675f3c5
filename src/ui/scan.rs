use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use macsweep::{FnProgress, ProgressSink};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::utils::format_duration;

/// Runs a scan on a background thread while showing its progress line.
///
/// The scan itself is synchronous; this widget only moves it off the
/// render thread and forwards its progress reports.
pub struct ScanWidget<T> {
    title: String,
    status: Arc<Mutex<String>>,
    result_rx: Receiver<(Vec<T>, u64)>,
    started: Instant,
}

impl<T: Send + 'static> ScanWidget<T> {
    pub fn new(
        title: &str,
        job: impl FnOnce(&mut dyn ProgressSink) -> (Vec<T>, u64) + Send + 'static,
    ) -> Self {
        let status = Arc::new(Mutex::new("Starting...".to_string()));
        let (result_tx, result_rx) = mpsc::channel();

        let job_status = Arc::clone(&status);
        thread::spawn(move || {
            let mut sink = FnProgress(move |line: &str| {
                if let Ok(mut status) = job_status.lock() {
                    *status = line.to_string();
                }
            });
            let outcome = job(&mut sink);
            if result_tx.send(outcome).is_err() {
                log::debug!("Scan result dropped, receiver closed");
            }
        });

        Self {
            title: title.to_string(),
            status,
            result_rx,
            started: Instant::now(),
        }
    }

    /// The scan outcome, once the background thread finishes.
    pub fn poll(&mut self) -> Option<(Vec<T>, u64)> {
        self.result_rx.try_recv().ok()
    }
}

impl<T> Widget for &ScanWidget<T> {
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
            "{} Scanning... (b back, q quit)",
            format_duration(&self.started.elapsed())
        ))
        .blue()
        .render(layout[1], buf);
    }
}
