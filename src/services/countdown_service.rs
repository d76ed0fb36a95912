use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::utils::time;

pub const JOIN_NOW_LABEL: &str = "Join Now";
pub const ENDED_LABEL: &str = "Interview Ended";
pub const UNAVAILABLE_LABEL: &str = "N/A";

/// Label for a slot's join window at one instant. Total: a missing start
/// yields "N/A", a missing end leaves the window open after the start.
pub fn countdown_label(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> String {
    let Some(start) = start else {
        return UNAVAILABLE_LABEL.to_string();
    };
    if now < start {
        return format!("Starts in {}", time::format_hms(start - now));
    }
    match end {
        Some(end) if now >= end => ENDED_LABEL.to_string(),
        _ => JOIN_NOW_LABEL.to_string(),
    }
}

pub struct CountdownTimer;

impl CountdownTimer {
    /// Spawns the once-a-second recomputation for one slot. Must be called
    /// from within a tokio runtime. The caller owns the returned handle;
    /// switching slots means dropping it and starting a new one.
    pub fn start(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> CountdownHandle {
        Self::start_with_period(start, end, Duration::from_secs(1))
    }

    pub fn start_with_period(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        period: Duration,
    ) -> CountdownHandle {
        let (tx, rx) = watch::channel(countdown_label(time::now(), start, end));
        let token = CancellationToken::new();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The interval fires immediately once; the initial label was
            // already published when the channel was created.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let label = countdown_label(time::now(), start, end);
                        let finished = label == ENDED_LABEL;
                        if tx.send(label).is_err() {
                            // Every receiver is gone.
                            break;
                        }
                        if finished {
                            // The label can never change again.
                            break;
                        }
                    }
                }
            }
            debug!("Countdown task stopped");
        });

        CountdownHandle { token, task, rx }
    }
}

/// Owning handle for one countdown task. Dropping it tears the task down,
/// so a leaked ticker cannot outlive the card that displayed it.
pub struct CountdownHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    rx: watch::Receiver<String>,
}

impl CountdownHandle {
    pub fn label(&self) -> String {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.rx.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
    }
}
