//! Structural-change notifications for the presentation layer.
//!
//! The tree never references presentation types; views subscribe through
//! [`TreeObserver`] and receive plain path-based events.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

/// A change to the vault tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeEvent {
    /// A node was appended to `parent`.
    NodeAdded { parent: PathBuf, path: PathBuf },
    /// A node was detached from `parent`.
    NodeRemoved { parent: PathBuf, path: PathBuf },
    /// A node changed path and name in place.
    NodeRenamed { from: PathBuf, to: PathBuf },
    /// A folder was flagged expanded by an operation.
    NodeExpanded { path: PathBuf },
    /// The whole tree was rebuilt from disk.
    TreeReplaced { root: PathBuf },
    /// Expansion flags were re-applied after a rebuild.
    ExpansionRestored { expanded: usize },
}

/// Receiver of tree notifications.
pub trait TreeObserver {
    /// Called after each in-memory tree change.
    fn notify(&mut self, event: &TreeEvent);
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TreeObserver for NullObserver {
    fn notify(&mut self, _event: &TreeEvent) {}
}

/// Observer that forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl TreeObserver for LoggingObserver {
    fn notify(&mut self, event: &TreeEvent) {
        debug!(?event, "Tree changed");
    }
}

/// Observer that records events; clones share one log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<TreeEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<TreeEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl TreeObserver for EventLog {
    fn notify(&mut self, event: &TreeEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_shared_between_clones() {
        let log = EventLog::new();
        let mut observer = log.clone();

        observer.notify(&TreeEvent::NodeExpanded {
            path: PathBuf::from("/vault"),
        });
        assert_eq!(log.len(), 1);

        let events = log.take();
        assert_eq!(
            events,
            vec![TreeEvent::NodeExpanded {
                path: PathBuf::from("/vault")
            }]
        );
        assert!(log.is_empty());
    }
}
