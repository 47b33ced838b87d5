//! Progress bars for install and uninstall.
//!
//! Maps [`InstallProgress`] events onto an `indicatif` bar pair: one for the
//! current file and one for the whole package. Both bars count percent.

use cloudpkg::manager::{InstallProgress, InstallProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const FILE_TEMPLATE: &str = "  file  [{bar:40.cyan/blue}] {pos:>3}% {msg}";
const TOTAL_TEMPLATE: &str = "  total [{bar:40.green/white}] {pos:>3}%";

/// Bar pair fed by the package manager's progress callback.
pub struct ProgressDisplay {
    _multi: MultiProgress,
    file: Option<ProgressBar>,
    total: ProgressBar,
}

impl ProgressDisplay {
    /// Create the bars. `with_file_bar` adds the per-file bar above the total.
    pub fn new(with_file_bar: bool) -> Self {
        let multi = MultiProgress::new();

        let file = with_file_bar.then(|| multi.add(percent_bar(FILE_TEMPLATE)));
        let total = multi.add(percent_bar(TOTAL_TEMPLATE));

        Self {
            _multi: multi,
            file,
            total,
        }
    }

    /// Build a callback that updates these bars.
    pub fn callback(&self) -> InstallProgressCallback {
        let file = self.file.clone();
        let total = self.total.clone();

        Box::new(move |progress: &InstallProgress| {
            apply(file.as_ref(), &total, progress);
        })
    }

    /// Remove the bars from the terminal.
    pub fn finish(&self) {
        if let Some(file) = &self.file {
            file.finish_and_clear();
        }
        self.total.finish_and_clear();
    }
}

fn percent_bar(template: &str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

fn apply(file: Option<&ProgressBar>, total: &ProgressBar, progress: &InstallProgress) {
    match file {
        Some(file) => {
            if let Some(percent) = progress.file_percent {
                file.set_position(u64::from(percent));
            }
            file.set_message(progress.status.clone());
        }
        None => total.set_message(progress.status.clone()),
    }
    if let Some(percent) = progress.total_percent {
        total.set_position(u64::from(percent));
    }
}
