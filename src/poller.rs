use crate::error::{Error, Result};
use crate::renderer::PageSession;
use crate::selector::Locator;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Polls an element until its text stops reading as the not-ready sentinel.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
    deadline: Duration,
    interval: Duration,
}

impl ReadinessPoller {
    pub fn new(deadline: Duration, interval: Duration) -> Self {
        Self { deadline, interval }
    }

    /// Returns the first text at `locator` that differs from `not_ready`.
    ///
    /// A missing element is retried like the sentinel is; once the deadline
    /// passes the call fails with `ElementNotFound` if the last lookup missed,
    /// otherwise with `ReadinessTimeout`. Any other session error ends the
    /// poll immediately.
    pub async fn await_ready(
        &self,
        session: &mut dyn PageSession,
        locator: &Locator,
        not_ready: &str,
    ) -> Result<String> {
        let started = Instant::now();

        loop {
            let last = match session.locate_text(locator).await {
                Ok(text) if text != not_ready => {
                    log::debug!("{} ready after {:?}", locator, started.elapsed());
                    return Ok(text);
                }
                Ok(_) => Error::ReadinessTimeout {
                    locator: locator.to_string(),
                    not_ready: not_ready.to_string(),
                    waited: started.elapsed(),
                },
                Err(e @ Error::ElementNotFound(_)) => e,
                Err(e) => return Err(e),
            };

            let elapsed = started.elapsed();
            if elapsed >= self.deadline {
                return Err(match last {
                    Error::ReadinessTimeout {
                        locator, not_ready, ..
                    } => Error::ReadinessTimeout {
                        locator,
                        not_ready,
                        waited: elapsed,
                    },
                    other => other,
                });
            }

            sleep(self.interval.min(self.deadline - elapsed)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Element that reads the sentinel until `ready_after` has passed.
    struct DelayedText {
        opened: Instant,
        ready_after: Option<Duration>,
        value: &'static str,
        lookups: usize,
    }

    impl DelayedText {
        fn new(ready_after: Option<Duration>, value: &'static str) -> Self {
            Self {
                opened: Instant::now(),
                ready_after,
                value,
                lookups: 0,
            }
        }
    }

    #[async_trait]
    impl PageSession for DelayedText {
        async fn load(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn locate_text(&mut self, locator: &Locator) -> Result<String> {
            self.lookups += 1;
            match self.ready_after {
                None if self.value.is_empty() => Err(Error::ElementNotFound(locator.to_string())),
                Some(after) if self.opened.elapsed() >= after => Ok(self.value.to_string()),
                _ => Ok("LOADING...".to_string()),
            }
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_returns_immediately_when_ready() {
        let poller = ReadinessPoller::new(Duration::from_secs(5), Duration::from_millis(100));
        let mut session = DelayedText::new(Some(Duration::ZERO), "42");

        let started = Instant::now();
        let text = poller
            .await_ready(&mut session, &Locator::default(), "LOADING...")
            .await
            .unwrap();

        assert_eq!(text, "42");
        assert_eq!(session.lookups, 1);
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_returns_within_one_interval_of_readiness() {
        let poller = ReadinessPoller::new(Duration::from_secs(5), Duration::from_millis(100));
        let mut session = DelayedText::new(Some(Duration::from_millis(300)), "42");

        let started = Instant::now();
        let text = poller
            .await_ready(&mut session, &Locator::default(), "LOADING...")
            .await
            .unwrap();

        assert_eq!(text, "42");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_sentinel_for_whole_window_times_out() {
        let poller = ReadinessPoller::new(Duration::from_secs(1), Duration::from_millis(100));
        let mut session = DelayedText::new(None, "never");

        let started = Instant::now();
        let err = poller
            .await_ready(&mut session, &Locator::default(), "LOADING...")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ReadinessTimeout { .. }), "got {err:?}");
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert!(session.lookups >= 5);
    }

    #[tokio::test]
    async fn test_missing_element_propagates_not_found() {
        let poller = ReadinessPoller::new(Duration::from_millis(300), Duration::from_millis(100));
        let mut session = DelayedText::new(None, "");

        let err = poller
            .await_ready(&mut session, &Locator::css(".gone"), "LOADING...")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ElementNotFound(_)), "got {err:?}");
    }
}
