//! Progress display for long-running computations.
//!
//! The computation runs on the calling thread and bumps a shared counter once
//! per completed trial; a scoped ticker thread mirrors the counter into an
//! indicatif progress bar until the computation returns.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(50);

/// Run `work` with a progress bar of `total` steps labelled `label`
pub fn with_progress<T>(label: &str, total: usize, work: impl FnOnce(Arc<AtomicUsize>) -> T) -> T {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(label.to_string());

    let counter = Arc::new(AtomicUsize::new(0));
    let done = AtomicBool::new(false);

    let out = std::thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                pb.set_position(counter.load(Ordering::Relaxed) as u64);
                std::thread::sleep(TICK);
            }
        });

        // Stops the ticker even if `work` unwinds
        let _stop = StopOnDrop(&done);
        work(Arc::clone(&counter))
    });

    pb.finish_and_clear();
    out
}

struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_result_is_returned() {
        let value = with_progress("test", 10, |counter| {
            for _ in 0..10 {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            counter.load(Ordering::Relaxed) * 2
        });
        assert_eq!(value, 20);
    }
}
