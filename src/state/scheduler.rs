//! Delayed navigation
//!
//! Stages that move the attendee to another screen do so after a short
//! delay. The pending move is owned by the screen that scheduled it and is
//! cancelled when that screen is torn down, so a navigation never reaches a
//! screen that no longer exists.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

/// Screens a flow can send the user to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Navigation {
    CertificateReview { attendance_id: i64 },
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Armed,
    Fired,
    Cancelled,
}

/// A navigation that fires once after a delay unless cancelled first
#[derive(Debug)]
pub struct ScheduledNavigation {
    target: Navigation,
    state: Arc<Mutex<TimerState>>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledNavigation {
    /// Send `target` to `sink` after `delay`. Must be called inside a tokio runtime.
    pub fn schedule(target: Navigation, delay: Duration, sink: UnboundedSender<Navigation>) -> Self {
        let state = Arc::new(Mutex::new(TimerState::Armed));
        let task_state = Arc::clone(&state);
        let task_target = target.clone();

        debug!(target = ?target, delay_ms = delay.as_millis() as u64, "Navigation scheduled");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Checked and sent under the lock so cancel() cannot interleave
            let mut state = task_state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == TimerState::Armed {
                *state = TimerState::Fired;
                if sink.send(task_target).is_err() {
                    debug!("Navigation receiver gone");
                }
            }
        });

        Self {
            target,
            state,
            handle: Some(handle),
        }
    }

    pub fn target(&self) -> &Navigation {
        &self.target
    }

    /// Still waiting to fire
    pub fn is_pending(&self) -> bool {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) == TimerState::Armed
    }

    pub fn has_fired(&self) -> bool {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) == TimerState::Fired
    }

    /// Cancel the navigation. Once this returns the navigation will not be sent.
    pub fn cancel(&mut self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state == TimerState::Armed {
                *state = TimerState::Cancelled;
                debug!(target = ?self.target, "Navigation cancelled");
            }
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ScheduledNavigation {
    fn drop(&mut self) {
        self.cancel();
    }
}
