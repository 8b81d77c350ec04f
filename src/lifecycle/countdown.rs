//! Deadline countdown.
//!
//! A one-second tick recomputes the remaining time from the wall
//! clock and publishes it on a watch channel. The task stops on its
//! own at zero and is aborted when the owning session is torn down or
//! replaced by a fresh load.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub expired: bool,
}

impl Countdown {
    pub fn remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (deadline - now).num_seconds();
        if total <= 0 {
            return Self::expired();
        }
        let total = total as u64;
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
            expired: false,
        }
    }

    pub fn expired() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            expired: true,
        }
    }
}

/// Owns the ticking task. Dropping the handle aborts the task, so a
/// session teardown can never leak a background timer.
#[derive(Debug)]
pub struct CountdownHandle {
    rx: watch::Receiver<Countdown>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn latest(&self) -> Countdown {
        *self.rx.borrow()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_countdown(deadline: DateTime<Utc>) -> CountdownHandle {
    let (tx, rx) = watch::channel(Countdown::remaining(deadline, Utc::now()));

    let task = tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            let remaining = Countdown::remaining(deadline, Utc::now());
            if tx.send(remaining).is_err() {
                break;
            }
            if remaining.expired {
                break;
            }
        }
    });

    CountdownHandle { rx, task }
}
