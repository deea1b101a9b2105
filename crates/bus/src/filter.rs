// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live-subscription filter.

use amelia_core::{Event, EventLevel};

#[derive(Debug, Clone)]
pub struct EventFilter {
    pub workflow_id: amelia_core::WorkflowId,
    pub event_type: Option<String>,
    pub min_level: Option<EventLevel>,
}

impl EventFilter {
    pub fn for_workflow(workflow_id: amelia_core::WorkflowId) -> Self {
        Self { workflow_id, event_type: None, min_level: None }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if event.workflow_id != self.workflow_id {
            return false;
        }
        if let Some(event_type) = &self.event_type {
            if event.event_type.as_wire_str() != event_type {
                return false;
            }
        }
        if let Some(min_level) = self.min_level {
            if event.level < min_level {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amelia_core::{EventType, WorkflowId};

    fn event(workflow_id: WorkflowId, level: EventLevel) -> Event {
        Event::builder().workflow_id(workflow_id).sequence(1).level(level).event_type(EventType::WorkflowStarted).build()
    }

    #[test]
    fn filters_out_events_from_other_workflows() {
        let workflow_id = WorkflowId::new();
        let filter = EventFilter::for_workflow(workflow_id);
        assert!(!filter.matches(&event(WorkflowId::new(), EventLevel::Info)));
    }

    #[test]
    fn min_level_excludes_quieter_events() {
        let workflow_id = WorkflowId::new();
        let filter = EventFilter { workflow_id, event_type: None, min_level: Some(EventLevel::Warning) };
        assert!(!filter.matches(&event(workflow_id, EventLevel::Info)));
        assert!(filter.matches(&event(workflow_id, EventLevel::Error)));
    }
}
