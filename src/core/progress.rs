use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::warn;

/// Receives per-asset progress from the export driver.
///
/// Called only from the driver thread, after a result has been received.
pub trait ProgressSink: Send {
    /// A new asset kind starts with `total` items.
    fn begin(&mut self, kind: &str, total: usize);
    /// One item of the current kind is done.
    fn advance(&mut self, name: &str, ok: bool);
    /// The current kind is done.
    fn finish(&mut self);
}

/// Sink that ignores everything.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _kind: &str, _total: usize) {}
    fn advance(&mut self, _name: &str, _ok: bool) {}
    fn finish(&mut self) {}
}

/// Terminal progress: one bar per asset kind plus a failure counter
#[derive(Debug)]
pub struct ConsoleProgress {
    multi: MultiProgress,
    bar: Option<ProgressBar>,
    failed: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: None,
            failed: 0,
        }
    }

    fn style() -> ProgressStyle {
        match ProgressStyle::default_bar().template("{prefix:>8} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}") {
            Ok(style) => style.progress_chars("█▓░"),
            Err(e) => {
                warn!("Bad progress template: {}", e);
                ProgressStyle::default_bar()
            }
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&mut self, kind: &str, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(Self::style());
        bar.set_prefix(kind.to_string());
        self.failed = 0;
        self.bar = Some(bar);
    }

    fn advance(&mut self, name: &str, ok: bool) {
        if !ok {
            self.failed += 1;
        }
        if let Some(bar) = &self.bar {
            if self.failed > 0 {
                bar.set_message(format!("{} ({} failed)", name, self.failed));
            } else {
                bar.set_message(name.to_string());
            }
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(if self.failed > 0 {
                format!("done, {} failed", self.failed)
            } else {
                "done".to_string()
            });
        }
    }
}
