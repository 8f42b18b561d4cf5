//! Terminal progress bars.

use indicatif::{ProgressBar, ProgressStyle};

/// A 0–100 percentage bar that only redraws when the whole percentage changes.
pub struct PercentBar {
    bar: ProgressBar,
    shown: u64,
}

impl PercentBar {
    /// A visible bar on stderr.
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {label} [{{bar:40.cyan/blue}}] {{pos}}%"
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar, shown: 0 }
    }

    /// A bar that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            shown: 0,
        }
    }

    /// Move to `percent`. Returns `true` if the integral value changed.
    pub fn update(&mut self, percent: f64) -> bool {
        let whole = (percent.max(0.0) as u64).min(100);
        if whole == self.shown {
            return false;
        }
        self.bar.set_position(whole);
        self.shown = whole;
        true
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

/// A `pos/len` counter bar, hidden when `visible` is false.
pub fn count_bar(len: u64, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {label} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
