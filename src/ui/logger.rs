use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Widget};
use tui_logger::TuiLoggerWidget;

pub struct LogPaneWidget;

impl Widget for LogPaneWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block = Block::new().title("Log").borders(Borders::LEFT);
        TuiLoggerWidget::default().block(block).render(area, buf);
    }
}
