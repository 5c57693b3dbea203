//! Injected time source.
//!
//! Every expiry and drift-window decision reads the current instant through
//! [`Clock`] so tests can pin deterministic instants.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Clock pinned to an instant tests move by hand.
    pub(crate) struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub(crate) fn at_unix(secs: i64) -> Self {
            Self(Mutex::new(
                DateTime::from_timestamp(secs, 0).expect("valid timestamp"),
            ))
        }

        pub(crate) fn set_unix(&self, secs: i64) {
            *self.0.lock().unwrap() =
                DateTime::from_timestamp(secs, 0).expect("valid timestamp");
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}
