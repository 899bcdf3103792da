//! Runs reschedule calls off the UI thread.
//!
//! Each submitted move gets a token and its own worker thread; results come
//! back over a channel and are drained with [`RescheduleDispatcher::poll`]
//! from the UI loop. Dropping the dispatcher abandons everything still in
//! flight: late results are discarded instead of being applied. A worker that
//! panics reports a failure rather than leaving its token in flight.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::models::scheduled_item::ScheduledItem;
use crate::services::posts::{ApiError, PostApi};

#[derive(Debug)]
pub struct RescheduleOutcome {
    pub token: u64,
    pub item_id: String,
    pub result: Result<Option<ScheduledItem>, ApiError>,
}

/// A call that was still running when it was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbandonedMove {
    pub token: u64,
    pub item_id: String,
}

struct InFlight {
    item_id: String,
    abandoned: Arc<AtomicBool>,
}

pub struct RescheduleDispatcher {
    api: Arc<dyn PostApi>,
    tx: Sender<RescheduleOutcome>,
    rx: Receiver<RescheduleOutcome>,
    in_flight: HashMap<u64, InFlight>,
    next_token: u64,
}

impl RescheduleDispatcher {
    pub fn new(api: Arc<dyn PostApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            tx,
            rx,
            in_flight: HashMap::new(),
            next_token: 1,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start a reschedule call in the background and return its token
    pub fn submit(&mut self, item_id: &str, scheduled_at: DateTime<Local>) -> u64 {
        let token = self.next_token;
        self.next_token += 1;

        let abandoned = Arc::new(AtomicBool::new(false));
        self.in_flight.insert(
            token,
            InFlight {
                item_id: item_id.to_string(),
                abandoned: Arc::clone(&abandoned),
            },
        );

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let item_id = item_id.to_string();

        log::debug!("Dispatching move {} for post {}", token, item_id);
        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| api.reschedule(&item_id, scheduled_at)))
                .unwrap_or_else(|payload| {
                    let reason = panic_message(payload.as_ref());
                    log::error!("Move {} for post {} panicked: {}", token, item_id, reason);
                    Err(ApiError::Worker(reason))
                });

            if abandoned.load(Ordering::SeqCst) {
                log::debug!("Discarding result of abandoned move {} for post {}", token, item_id);
                return;
            }

            let _ = tx.send(RescheduleOutcome {
                token,
                item_id,
                result,
            });
        });

        token
    }

    /// Drain finished calls without blocking
    pub fn poll(&mut self) -> Vec<RescheduleOutcome> {
        let mut finished = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => {
                    if self.in_flight.remove(&outcome.token).is_some() {
                        finished.push(outcome);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        finished
    }

    /// Block until one call finishes or `timeout` elapses
    pub fn wait_next(&mut self, timeout: Duration) -> Option<RescheduleOutcome> {
        if self.in_flight.is_empty() {
            return None;
        }

        loop {
            match self.rx.recv_timeout(timeout) {
                Ok(outcome) => {
                    if self.in_flight.remove(&outcome.token).is_some() {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    /// Forget every in-flight call; their results will never be delivered.
    ///
    /// Returns the abandoned calls so the caller can undo their moves.
    pub fn abandon_all(&mut self) -> Vec<AbandonedMove> {
        if !self.in_flight.is_empty() {
            log::info!("Abandoning {} in-flight moves", self.in_flight.len());
        }
        let mut abandoned: Vec<AbandonedMove> = self
            .in_flight
            .drain()
            .map(|(token, job)| {
                job.abandoned.store(true, Ordering::SeqCst);
                AbandonedMove {
                    token,
                    item_id: job.item_id,
                }
            })
            .collect();
        abandoned.sort_by_key(|job| job.token);
        abandoned
    }
}

impl Drop for RescheduleDispatcher {
    fn drop(&mut self) {
        self.abandon_all();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
