//! Wait loops over server-reported state.
//!
//! The service only exposes state transitions via polling, so the clients
//! repeatedly probe a status endpoint until the expected value appears. The
//! baseline behaviour is a fixed short interval with no bound at all: a
//! server that never reaches the expected state keeps the loop alive
//! indefinitely. [`PollConfig::deadline`] and [`PollConfig::cancel`] are
//! opt-in limits on top of that baseline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{ClientError, ClientResult};

/// Interval between training-status probes.
pub const TRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between deletion-confirmation probes.
pub const DELETE_PROBE_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable cancellation flag, checked once per poll iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a wait loop behaves between probes.
#[derive(Debug, Clone, Default)]
pub struct PollConfig {
    /// Sleep between probes. Zero means probe back-to-back (tests).
    pub interval: Duration,
    /// Give up with [`ClientError::Timeout`] once this much time has passed.
    pub deadline: Option<Duration>,
    /// Abort with [`ClientError::Cancelled`] when the token fires.
    pub cancel: Option<CancelToken>,
}

impl PollConfig {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Run `probe` until it reports `true`.
///
/// The probe's own errors propagate immediately and end the wait; that is
/// how terminal status codes abort a poll.
pub fn wait_until<F>(cfg: &PollConfig, mut probe: F) -> ClientResult<()>
where
    F: FnMut() -> ClientResult<bool>,
{
    let started = Instant::now();
    loop {
        if let Some(token) = &cfg.cancel {
            if token.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
        }
        if probe()? {
            return Ok(());
        }
        if let Some(deadline) = cfg.deadline {
            if started.elapsed() >= deadline {
                return Err(ClientError::Timeout(deadline));
            }
        }
        if !cfg.interval.is_zero() {
            std::thread::sleep(cfg.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> PollConfig {
        PollConfig::every(Duration::ZERO)
    }

    #[test]
    fn returns_once_probe_succeeds() {
        let mut remaining = 3;
        wait_until(&instant(), || {
            remaining -= 1;
            Ok(remaining == 0)
        })
        .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn probe_error_ends_the_wait() {
        let mut calls = 0;
        let err = wait_until(&instant(), || {
            calls += 1;
            if calls < 3 {
                Ok(false)
            } else {
                Err(ClientError::Protocol("boom".into()))
            }
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn deadline_yields_timeout() {
        let cfg = instant().with_deadline(Duration::ZERO);
        let err = wait_until(&cfg, || Ok(false)).unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[test]
    fn cancelled_token_aborts_before_probing() {
        let token = CancelToken::new();
        token.cancel();
        let cfg = instant().with_cancel(token);
        let mut calls = 0;
        let err = wait_until(&cfg, || {
            calls += 1;
            Ok(false)
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(calls, 0, "a pre-cancelled wait must not probe at all");
    }
}
