#![forbid(unsafe_code)]

use crate::domain::{RoamEvent, SignalSample};
use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window the signal history covers, independent of poll cadence.
pub const HISTORY_WINDOW: Duration = Duration::from_secs(5 * 60);

pub const ROAM_LOG_CAP: usize = 20;

/// Bounded ring of signal samples, oldest first. The capacity is derived
/// from the window and the current poll interval on every push, so an
/// interval change takes effect on the next sample.
#[derive(Debug, Default)]
pub struct SignalHistory {
    samples: VecDeque<SignalSample>,
}

impl SignalHistory {
    pub fn capacity(poll_interval: Duration) -> usize {
        let poll = poll_interval.as_secs().max(1);
        ((HISTORY_WINDOW.as_secs() / poll) as usize).max(1)
    }

    pub fn push(&mut self, sample: SignalSample, cap: usize) {
        self.samples.push_back(sample);
        while self.samples.len() > cap {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn to_vec(&self) -> Vec<SignalSample> {
        self.samples.iter().cloned().collect()
    }
}

/// Bounded roam log, newest first.
#[derive(Debug, Default)]
pub struct RoamLog {
    events: VecDeque<RoamEvent>,
}

impl RoamLog {
    pub fn record(&mut self, event: RoamEvent) {
        self.events.push_front(event);
        self.events.truncate(ROAM_LOG_CAP);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_vec(&self) -> Vec<RoamEvent> {
        self.events.iter().cloned().collect()
    }
}
