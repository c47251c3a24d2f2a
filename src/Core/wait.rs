use crossbeam_utils::Backoff;
use std::time::{Duration, Instant};

/// Default bound on how long the consumer waits for a reserved frame.
pub const DEFAULT_READY_WAIT: Duration = Duration::from_millis(5);

/// Bounded busy-poll: capped exponential backoff until a deadline, then one last check.
///
/// There is no parking and no notification; a producer that never finishes
/// writing only costs the consumer `limit` per `get` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyWait {
    limit: Duration,
}

impl Default for ReadyWait {
    fn default() -> Self {
        Self::new(DEFAULT_READY_WAIT)
    }
}

impl ReadyWait {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Polls `ready` until it returns true or the limit elapses.
    ///
    /// Returns the time spent waiting in the error case.
    pub fn poll<F: FnMut() -> bool>(&self, mut ready: F) -> Result<(), Duration> {
        if ready() {
            return Ok(());
        }

        let start = Instant::now();
        let backoff = Backoff::new();
        while start.elapsed() < self.limit {
            if backoff.is_completed() {
                // Backoff is capped; past that point just yield the timeslice.
                std::thread::yield_now();
            } else {
                backoff.snooze();
            }
            if ready() {
                return Ok(());
            }
        }

        if ready() {
            Ok(())
        } else {
            Err(start.elapsed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn ready_immediately() {
        assert_eq!(ReadyWait::new(Duration::ZERO).poll(|| true), Ok(()));
    }

    #[test]
    fn gives_up_after_limit() {
        let wait = ReadyWait::new(Duration::from_millis(2));
        let waited = wait.poll(|| false).unwrap_err();
        assert!(waited >= Duration::from_millis(2));
    }

    #[test]
    fn sees_flag_set_by_other_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let setter = {
            let flag = flag.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(1));
                flag.store(true, Ordering::Release);
            })
        };
        let wait = ReadyWait::new(Duration::from_secs(5));
        assert_eq!(wait.poll(|| flag.load(Ordering::Acquire)), Ok(()));
        setter.join().unwrap();
    }
}
