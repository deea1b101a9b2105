// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workflow event sequencing and in-process fanout.

use crate::error::BusError;
use crate::filter::EventFilter;
use amelia_core::{Clock, Event, EventId, EventLevel, EventType, WorkflowId};
use amelia_store::StateStore;
use dashmap::DashMap;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const FANOUT_CAPACITY: usize = 1024;

/// Owns one emit lock and one broadcast channel per workflow, created
/// atomically via `dashmap`'s `entry` API so the get-or-create is free of a
/// check-then-set race.
pub struct Sequencer<C: Clock> {
    store: Arc<dyn StateStore>,
    clock: C,
    locks: DashMap<WorkflowId, Arc<Mutex<()>>>,
    channels: DashMap<WorkflowId, broadcast::Sender<Event>>,
}

impl<C: Clock> Sequencer<C> {
    pub fn new(store: Arc<dyn StateStore>, clock: C) -> Self {
        Self { store, clock, locks: DashMap::new(), channels: DashMap::new() }
    }

    fn lock_for(&self, workflow_id: WorkflowId) -> Arc<Mutex<()>> {
        self.locks.entry(workflow_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    fn channel_for(&self, workflow_id: WorkflowId) -> broadcast::Sender<Event> {
        self.channels.entry(workflow_id).or_insert_with(|| broadcast::channel(FANOUT_CAPACITY).0).clone()
    }

    /// Assigns the next sequence, persists, then broadcasts. If persistence
    /// fails the event is never fanned out.
    #[allow(clippy::too_many_arguments)]
    pub async fn emit(
        &self,
        workflow_id: WorkflowId,
        event_type: EventType,
        message: impl Into<String>,
        data: serde_json::Value,
        level: EventLevel,
        agent: Option<String>,
    ) -> Result<Event, BusError> {
        let lock = self.lock_for(workflow_id);
        let _guard = lock.lock().await;

        let sequence = self.store.get_max_event_sequence(workflow_id).await.map_err(BusError::from)? + 1;
        let event = Event {
            id: EventId::new(),
            workflow_id,
            sequence,
            timestamp_ms: self.clock.epoch_ms(),
            level,
            event_type,
            agent,
            message: message.into(),
            data,
            is_error: level == EventLevel::Error,
        };

        let persisted = self.store.save_event(event).await?;
        let _ = self.channel_for(workflow_id).send(persisted.clone());
        Ok(persisted)
    }

    pub async fn get_max_event_sequence(&self, workflow_id: WorkflowId) -> Result<u64, BusError> {
        Ok(self.store.get_max_event_sequence(workflow_id).await?)
    }

    /// Live fanout for `filter.workflow_id`, filtered further by event type
    /// and level. Lagged subscribers silently skip missed messages
    /// (best-effort ordering); they can recover state via `list_events`.
    pub fn subscribe(&self, filter: EventFilter) -> impl Stream<Item = Event> {
        let receiver = self.channel_for(filter.workflow_id).subscribe();
        BroadcastStream::new(receiver).filter_map(move |item| item.ok()).filter(move |event| filter.matches(event))
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
