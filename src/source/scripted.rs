//! Scripted event source for testing.
//!
//! Replays a fixed list of poll batches, then reports exhaustion. Useful for
//! exercising capture and conversion without a physical pad attached.

use super::{RawEventSource, SourceError};
use crate::event::RawEvent;
use log::debug;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    batches: VecDeque<Vec<RawEvent>>,
}

impl ScriptedSource {
    /// One entry per poll call.
    pub fn new(batches: Vec<Vec<RawEvent>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Every event delivered by a single poll.
    pub fn single_batch(events: Vec<RawEvent>) -> Self {
        Self::new(vec![events])
    }

    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl RawEventSource for ScriptedSource {
    fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError> {
        match self.batches.pop_front() {
            Some(batch) => {
                debug!("scripted source: replaying {} events", batch.len());
                Ok(batch)
            }
            None => Err(SourceError::Exhausted),
        }
    }
}
