use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crossterm::event::{Event, KeyCode, KeyEventKind};
use macsweep::scan::{
    default_big_file_roots, default_scan_roots, default_skip_names, scan_big_files,
    scan_duplicates, scan_old_files,
};
use macsweep::{format_size, BigFile, Cleaner, DuplicateGroup, OldFile, SudoSession};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use crate::args::Args;
use crate::ui::{
    CleaningWidget, MenuChoice, MenuWidget, Report, ReportWidget, ResultsWidget, ScanWidget,
    TargetSelectWidget,
};

enum AppView {
    Menu(MenuWidget),
    Targets(TargetSelectWidget),
    ScanBig(ScanWidget<BigFile>),
    BigResults(ResultsWidget<BigFile>),
    ScanDuplicates(ScanWidget<DuplicateGroup>),
    DuplicateResults(ResultsWidget<DuplicateGroup>),
    ScanOld(ScanWidget<OldFile>),
    OldResults(ResultsWidget<OldFile>),
    Cleaning(CleaningWidget),
    Report(ReportWidget),
}

/// Top level application state: the active view plus everything the
/// views need to start work.
pub struct App {
    sudo: Arc<SudoSession>,
    dry_run: bool,
    min_size: u64,
    cutoff: Duration,
    big_file_roots: Vec<PathBuf>,
    scan_roots: Vec<PathBuf>,
    view: AppView,
}

impl App {
    pub fn new(args: &Args) -> Self {
        let mut big_file_roots = default_big_file_roots();
        let mut scan_roots = default_scan_roots();
        big_file_roots.extend(args.root.iter().cloned());
        scan_roots.extend(args.root.iter().cloned());

        Self {
            sudo: Arc::new(SudoSession::new()),
            dry_run: args.dry_run,
            min_size: args.min_size_mb * 1024 * 1024,
            cutoff: Duration::from_secs(args.older_than_days * 86_400),
            big_file_roots,
            scan_roots,
            view: AppView::Menu(MenuWidget::new()),
        }
    }

    /// Advances background work: finished scans become result lists,
    /// finished cleanups become reports.
    pub fn poll(&mut self) {
        match &mut self.view {
            AppView::Targets(targets) => targets.poll(),
            AppView::ScanBig(scan) => {
                if let Some((files, total)) = scan.poll() {
                    log::info!("Found {} large files ({})", files.len(), format_size(total));
                    self.view =
                        AppView::BigResults(ResultsWidget::new("Large files", files));
                }
            }
            AppView::ScanDuplicates(scan) => {
                if let Some((groups, reclaimable)) = scan.poll() {
                    log::info!(
                        "Found {} duplicate groups ({} reclaimable)",
                        groups.len(),
                        format_size(reclaimable)
                    );
                    self.view = AppView::DuplicateResults(ResultsWidget::new(
                        "Duplicate files",
                        groups,
                    ));
                }
            }
            AppView::ScanOld(scan) => {
                if let Some((files, total)) = scan.poll() {
                    log::info!("Found {} old files ({})", files.len(), format_size(total));
                    self.view = AppView::OldResults(ResultsWidget::new("Old files", files));
                }
            }
            AppView::Cleaning(cleaning) => {
                if let Some(report) = cleaning.poll() {
                    log::info!("Cleanup freed {}", format_size(report.total_freed));
                    self.view = AppView::Report(ReportWidget::new(report));
                }
            }
            _ => {}
        }
    }

    /// Returns false once the application should exit.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if let Event::Key(key) = event {
            if matches!(key.kind, KeyEventKind::Press) {
                match key.code {
                    KeyCode::Char('q') => return false,
                    KeyCode::Char('b') if !matches!(self.view, AppView::Cleaning(_)) => {
                        self.view = AppView::Menu(MenuWidget::new());
                        return true;
                    }
                    _ => {}
                }
            }
        }

        match &mut self.view {
            AppView::Menu(menu) => {
                if let Some(choice) = menu.handle_event(event) {
                    self.enter(choice);
                }
            }
            AppView::Targets(targets) => {
                if let Some(mut catalog) = targets.handle_event(event) {
                    let sudo = Arc::clone(&self.sudo);
                    let dry_run = self.dry_run;
                    self.view = AppView::Cleaning(CleaningWidget::new(
                        "Cleaning targets",
                        move |progress| {
                            let cleaner = Cleaner::new(&sudo).dry_run(dry_run);
                            let (results, total_freed) =
                                cleaner.clean_targets(&mut catalog, progress);
                            let lines = results
                                .iter()
                                .map(|result| match &result.error {
                                    None => format!(
                                        "{}: freed {}",
                                        result.target,
                                        format_size(result.actual)
                                    ),
                                    Some(error) => {
                                        format!("{}: failed ({error})", result.target)
                                    }
                                })
                                .collect();
                            Report { total_freed, lines }
                        },
                    ));
                }
            }
            AppView::BigResults(results) => {
                results.handle_event(event);
                if delete_requested(event) && results.selected_count() > 0 {
                    let paths: Vec<PathBuf> = results
                        .rows()
                        .iter()
                        .filter(|file| file.selected)
                        .map(|file| file.path.clone())
                        .collect();
                    self.delete_files(paths);
                }
            }
            AppView::OldResults(results) => {
                results.handle_event(event);
                if delete_requested(event) && results.selected_count() > 0 {
                    let paths: Vec<PathBuf> = results
                        .rows()
                        .iter()
                        .filter(|file| file.selected)
                        .map(|file| file.path.clone())
                        .collect();
                    self.delete_files(paths);
                }
            }
            AppView::DuplicateResults(results) => {
                results.handle_event(event);
                if delete_requested(event) && results.selected_count() > 0 {
                    let groups: Vec<DuplicateGroup> = results
                        .rows()
                        .iter()
                        .filter(|group| group.selected)
                        .cloned()
                        .collect();
                    let sudo = Arc::clone(&self.sudo);
                    let dry_run = self.dry_run;
                    self.view = AppView::Cleaning(CleaningWidget::new(
                        "Deleting duplicates",
                        move |progress| {
                            let cleaner = Cleaner::new(&sudo).dry_run(dry_run);
                            let total_freed = cleaner.delete_duplicates(&groups, progress);
                            let lines = vec![format!(
                                "Removed extra copies from {} groups",
                                groups.len()
                            )];
                            Report { total_freed, lines }
                        },
                    ));
                }
            }
            _ => {}
        }
        true
    }

    fn enter(&mut self, choice: MenuChoice) {
        match choice {
            MenuChoice::Cleanup => {
                self.view = AppView::Targets(TargetSelectWidget::new(Arc::clone(&self.sudo)));
            }
            MenuChoice::BigFiles => {
                let roots = self.big_file_roots.clone();
                let min_size = self.min_size;
                self.view = AppView::ScanBig(ScanWidget::new(
                    "Scanning for large files",
                    move |progress| {
                        let mut files =
                            scan_big_files(&roots, min_size, &default_skip_names(), progress);
                        files.sort_by(|a, b| b.size.cmp(&a.size));
                        let total = files.iter().map(|file| file.size).sum();
                        (files, total)
                    },
                ));
            }
            MenuChoice::Duplicates => {
                let roots = self.scan_roots.clone();
                self.view = AppView::ScanDuplicates(ScanWidget::new(
                    "Scanning for duplicates",
                    move |progress| scan_duplicates(&roots, &default_skip_names(), progress),
                ));
            }
            MenuChoice::OldFiles => {
                let roots = self.scan_roots.clone();
                let cutoff = SystemTime::now() - self.cutoff;
                self.view = AppView::ScanOld(ScanWidget::new(
                    "Scanning for old files",
                    move |progress| {
                        let mut files =
                            scan_old_files(&roots, cutoff, &default_skip_names(), progress);
                        files.sort_by(|a, b| b.size.cmp(&a.size));
                        let total = files.iter().map(|file| file.size).sum();
                        (files, total)
                    },
                ));
            }
        }
    }

    fn delete_files(&mut self, paths: Vec<PathBuf>) {
        let sudo = Arc::clone(&self.sudo);
        let dry_run = self.dry_run;
        self.view = AppView::Cleaning(CleaningWidget::new("Deleting files", move |progress| {
            let cleaner = Cleaner::new(&sudo).dry_run(dry_run);
            let total_freed = cleaner.delete_files(&paths, progress);
            let lines = vec![format!("Deleted {} files", paths.len())];
            Report { total_freed, lines }
        }));
    }
}

fn delete_requested(event: &Event) -> bool {
    let Event::Key(key) = event else { return false };
    matches!(key.kind, KeyEventKind::Press) && key.code == KeyCode::Char('d')
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        match &self.view {
            AppView::Menu(menu) => menu.render(area, buf),
            AppView::Targets(targets) => targets.render(area, buf),
            AppView::ScanBig(scan) => scan.render(area, buf),
            AppView::BigResults(results) => results.render(area, buf),
            AppView::ScanDuplicates(scan) => scan.render(area, buf),
            AppView::DuplicateResults(results) => results.render(area, buf),
            AppView::ScanOld(scan) => scan.render(area, buf),
            AppView::OldResults(results) => results.render(area, buf),
            AppView::Cleaning(cleaning) => cleaning.render(area, buf),
            AppView::Report(report) => report.render(area, buf),
        }
    }
}
