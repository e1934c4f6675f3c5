use std::time::Duration;

use clap::Parser;
use crossterm::event;
use ratatui::layout::{Constraint, Layout};
use tui_logger::Drain;

use args::Args;
use ui::{App, LogPaneWidget};

mod args;
mod term;
mod ui;
mod utils;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.ui_logger {
        let tui_log_drain = Drain::new();
        env_logger::builder()
            .format(move |_buf, record| Ok(tui_log_drain.log(record)))
            .init();
    } else {
        env_logger::init();
    }

    let mut app = App::new(&args);
    if args.dry_run {
        log::info!("Dry run: nothing will be deleted");
    }

    let mut terminal = term::setup()?;
    terminal.clear()?;

    loop {
        terminal.draw(|frame| {
            if args.ui_logger {
                let layout =
                    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(frame.size());

                frame.render_widget(&app, layout[0]);
                frame.render_widget(LogPaneWidget, layout[1]);
            } else {
                frame.render_widget(&app, frame.size());
            }
        })?;

        app.poll();

        if event::poll(Duration::from_millis(16))? {
            let event = event::read()?;
            if !app.handle_event(&event) {
                break;
            }
        }
    }

    Ok(())
}
