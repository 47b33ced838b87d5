//! Progress values for downloads and whole operations.
//!
//! Percentages below 100 are derived from byte counts and capped at 99, so a
//! reported 100 always means the unit of work has been committed. Only the
//! orchestrators emit 100, and only after the commit.

use std::fmt;

/// Highest percentage that can be derived from byte counts.
pub const MAX_PARTIAL_PERCENT: u8 = 99;

/// Percentage reported once a unit of work is committed.
pub const COMPLETE_PERCENT: u8 = 100;

/// Compute a capped percentage of `progress` over `size`.
///
/// Returns `None` when `size` is zero or the ratio is not finite; callers treat
/// this as an indeterminate value rather than an error.
///
/// # Example
///
/// ```
/// use cloudpkg::manager::calculate_percent;
///
/// assert_eq!(calculate_percent(1.0, 4.0), Some(25));
/// assert_eq!(calculate_percent(4.0, 4.0), Some(99));
/// assert_eq!(calculate_percent(1.0, 0.0), None);
/// ```
pub fn calculate_percent(progress: f64, size: f64) -> Option<u8> {
    if size == 0.0 {
        return None;
    }

    let percent = (progress / size * 100.0).round();
    if !percent.is_finite() {
        return None;
    }

    Some(percent.clamp(0.0, MAX_PARTIAL_PERCENT as f64) as u8)
}

/// Byte-level progress of one file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes received so far for this file.
    pub downloaded: u64,
    /// Length declared by the transport, if known.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Capped percentage of the declared total, if one is known.
    pub fn percent(&self) -> Option<u8> {
        self.total
            .and_then(|total| calculate_percent(self.downloaded as f64, total as f64))
    }
}

/// Progress event reported by the install and uninstall orchestrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallProgress {
    /// Current operation, e.g. `Downloading: bin/app`.
    pub status: String,
    /// Percent of the current file, `None` when indeterminate.
    pub file_percent: Option<u8>,
    /// Percent of the whole operation, `None` when indeterminate.
    pub total_percent: Option<u8>,
}

impl InstallProgress {
    /// Create a progress event.
    pub fn new(status: impl Into<String>, file_percent: Option<u8>, total_percent: Option<u8>) -> Self {
        Self {
            status: status.into(),
            file_percent,
            total_percent,
        }
    }

    /// Whether this event marks the end of the operation.
    pub fn is_done(&self) -> bool {
        self.file_percent == Some(COMPLETE_PERCENT) && self.total_percent == Some(COMPLETE_PERCENT)
    }
}

impl fmt::Display for InstallProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn pct(value: Option<u8>) -> String {
            value.map_or_else(|| "?".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "{}: {}% (Total: {}%)",
            self.status,
            pct(self.file_percent),
            pct(self.total_percent)
        )
    }
}

/// Progress callback for install and uninstall operations.
pub type InstallProgressCallback = Box<dyn Fn(&InstallProgress) + Send + Sync>;

/// Forwards progress events to an optional callback.
///
/// Status strings are built lazily, so an absent callback costs nothing
/// beyond the `Option` check.
#[derive(Clone, Copy)]
pub struct ProgressReporter<'a> {
    callback: Option<&'a InstallProgressCallback>,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter around an optional callback.
    pub fn new(callback: Option<&'a InstallProgressCallback>) -> Self {
        Self { callback }
    }

    /// Whether anyone is listening.
    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    /// Emit an event, building the status only when a callback is present.
    pub fn emit(
        &self,
        status: impl FnOnce() -> String,
        file_percent: Option<u8>,
        total_percent: Option<u8>,
    ) {
        if let Some(cb) = self.callback {
            cb(&InstallProgress::new(status(), file_percent, total_percent));
        }
    }

    /// Emit the final `Done` event at 100%.
    pub fn done(&self) {
        self.emit(
            || "Done".to_string(),
            Some(COMPLETE_PERCENT),
            Some(COMPLETE_PERCENT),
        );
    }
}

/// Tracks the last reported percentage so unchanged values are not re-sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentTracker {
    last: Option<u8>,
}

impl PercentTracker {
    /// Create a tracker that has not reported anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker seeded with an already reported value.
    pub fn starting_at(percent: Option<u8>) -> Self {
        Self { last: percent }
    }

    /// Record `percent` and return whether it rose above the last value.
    ///
    /// Indeterminate values never count as a change.
    pub fn advance(&mut self, percent: Option<u8>) -> bool {
        match (percent, self.last) {
            (None, _) => false,
            (Some(new), Some(old)) if new <= old => false,
            (Some(new), _) => {
                self.last = Some(new);
                true
            }
        }
    }

    /// Last value that was reported.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(calculate_percent(1.0, 3.0), Some(33));
        assert_eq!(calculate_percent(2.0, 3.0), Some(67));
        assert_eq!(calculate_percent(0.0, 10.0), Some(0));
    }

    #[test]
    fn test_percent_caps_below_complete() {
        assert_eq!(calculate_percent(999.0, 1000.0), Some(99));
        assert_eq!(calculate_percent(1000.0, 1000.0), Some(99));
        assert_eq!(calculate_percent(5000.0, 1000.0), Some(99));
    }

    #[test]
    fn test_percent_indeterminate_for_zero_size() {
        assert_eq!(calculate_percent(0.0, 0.0), None);
        assert_eq!(calculate_percent(10.0, 0.0), None);
        assert_eq!(calculate_percent(1.0, f64::NAN), None);
    }

    #[test]
    fn test_download_progress_unknown_total() {
        let progress = DownloadProgress {
            downloaded: 42,
            total: None,
        };
        assert_eq!(progress.percent(), None);
    }

    #[test]
    fn test_tracker_suppresses_duplicates() {
        let mut tracker = PercentTracker::new();
        assert!(tracker.advance(Some(0)));
        assert!(!tracker.advance(Some(0)));
        assert!(tracker.advance(Some(5)));
        assert!(!tracker.advance(Some(3)));
        assert!(!tracker.advance(None));
        assert_eq!(tracker.last(), Some(5));
    }

    #[test]
    fn test_install_progress_display() {
        let progress = InstallProgress::new("Downloading: a.txt", Some(50), None);
        assert_eq!(progress.to_string(), "Downloading: a.txt: 50% (Total: ?%)");
        assert!(!progress.is_done());
        assert!(InstallProgress::new("Done", Some(100), Some(100)).is_done());
    }

    #[test]
    fn test_reporter_without_callback_skips_status() {
        let reporter = ProgressReporter::new(None);
        assert!(!reporter.is_active());
        reporter.emit(|| panic!("status must not be built"), Some(0), Some(0));
    }

    #[test]
    fn test_reporter_forwards_events() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: InstallProgressCallback =
            Box::new(move |p: &InstallProgress| sink.lock().unwrap().push(p.clone()));

        let reporter = ProgressReporter::new(Some(&callback));
        reporter.emit(|| "Scanning: a".to_string(), Some(0), Some(10));
        reporter.done();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].status, "Scanning: a");
        assert!(seen[1].is_done());
    }

    proptest! {
        #[test]
        fn prop_percent_in_partial_range(progress in 0u64..1_000_000, size in 1u64..1_000_000) {
            let percent = calculate_percent(progress as f64, size as f64).unwrap();
            prop_assert!(percent <= MAX_PARTIAL_PERCENT);
        }

        #[test]
        fn prop_percent_monotonic(a in 0u64..1_000_000, b in 0u64..1_000_000, size in 1u64..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = calculate_percent(lo as f64, size as f64).unwrap();
            let p_hi = calculate_percent(hi as f64, size as f64).unwrap();
            prop_assert!(p_lo <= p_hi);
        }
    }
}
