// Copyright 2026 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction event routing handles.

use core::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::id::{SurfaceId, Tag};

/// Receives interaction events addressed to a node.
///
/// Implemented by whatever owns the declarative layer's event loop.
pub trait EventDispatcher: Send + Sync {
    /// Delivers `name` with `payload` to the node identified by `target`.
    fn dispatch_event(&self, surface_id: SurfaceId, target: Tag, name: &str, payload: Value);
}

/// A shared handle that routes events for one logical node.
///
/// Emitters belong to a node family, so every version of the node shares one
/// emitter and mounted views can hold on to it across commits.
pub struct EventEmitter {
    surface_id: SurfaceId,
    target: Tag,
    dispatcher: Option<Arc<dyn EventDispatcher>>,
}

impl EventEmitter {
    /// Creates an emitter for `target` that forwards to `dispatcher`.
    #[must_use]
    pub fn new(
        surface_id: SurfaceId,
        target: Tag,
        dispatcher: Option<Arc<dyn EventDispatcher>>,
    ) -> Self {
        Self {
            surface_id,
            target,
            dispatcher,
        }
    }

    /// Returns the tag events are addressed to.
    #[must_use]
    pub fn target(&self) -> Tag {
        self.target
    }

    /// Dispatches an event. Returns `false` if no dispatcher is attached.
    pub fn dispatch(&self, name: &str, payload: Value) -> bool {
        match &self.dispatcher {
            Some(dispatcher) => {
                dispatcher.dispatch_event(self.surface_id, self.target, name, payload);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("surface_id", &self.surface_id)
            .field("target", &self.target)
            .field("has_dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(Tag, String)>>);

    impl EventDispatcher for Collect {
        fn dispatch_event(&self, _: SurfaceId, target: Tag, name: &str, _: Value) {
            self.0.lock().push((target, name.to_owned()));
        }
    }

    #[test]
    fn dispatch_reaches_dispatcher() {
        let sink = Arc::new(Collect::default());
        let emitter = EventEmitter::new(SurfaceId(1), Tag(7), Some(sink.clone()));
        assert!(emitter.dispatch("press", json!({})));
        assert_eq!(sink.0.lock().as_slice(), &[(Tag(7), "press".to_owned())]);
    }

    #[test]
    fn dispatch_without_dispatcher_is_dropped() {
        let emitter = EventEmitter::new(SurfaceId(1), Tag(7), None);
        assert!(!emitter.dispatch("press", Value::Null));
    }
}
