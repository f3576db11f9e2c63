use crossbeam_channel::{Receiver, Sender, unbounded};
use netview_core::{ElementId, NetworkId};
use serde::{Deserialize, Serialize};

pub mod telemetry;

/// What caused a view to be recomputed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecomputeCause {
    NetworkAdded,
    StyleChanged,
    TableChanged,
    ElementsDeleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Networks
    NetworkAdded {
        network: NetworkId,
        nodes: usize,
        edges: usize,
    },
    NetworkRemoved {
        network: NetworkId,
    },

    // Style and data
    StyleChanged {
        network: NetworkId,
        /// Camel-case visual property name, e.g. `nodeWidth`.
        property: String,
    },
    StyleImported {
        network: NetworkId,
    },
    TableChanged {
        network: NetworkId,
        column: Option<String>,
    },
    ViewRecomputed {
        network: NetworkId,
        cause: RecomputeCause,
    },

    // Selection and positions
    SelectionChanged {
        network: NetworkId,
        selected_nodes: Vec<ElementId>,
        selected_edges: Vec<ElementId>,
    },
    PositionsUpdated {
        network: NetworkId,
        view_type: Option<String>,
        count: usize,
    },
    ObjectsDeleted {
        network: NetworkId,
        ids: Vec<ElementId>,
    },

    // ========================================================================
    // Layout
    // ========================================================================
    LayoutStarted {
        network: NetworkId,
        algorithm: String,
        ticket: String,
    },
    LayoutApplied {
        network: NetworkId,
        ticket: String,
        count: usize,
    },
    /// A result arrived for a network or view that no longer exists.
    LayoutDiscarded {
        network: NetworkId,
        ticket: String,
    },
    SecondaryViewBuilt {
        network: NetworkId,
        view_type: String,
    },

    // Notifications
    ShowInfo {
        message: String,
    },
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Take every pending event without blocking.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Implement this to receive events from the [`EventBus`].
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_publish_receive() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender
            .send(Event::NetworkRemoved {
                network: "net".into(),
            })
            .unwrap();

        match receiver.recv().unwrap() {
            Event::NetworkRemoved { network } => assert_eq!(network.0, "net"),
            other => panic!("Expected NetworkRemoved, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct Counter {
        selections: usize,
        warnings: Vec<String>,
    }

    impl EventListener for Counter {
        fn handle_event(&mut self, event: &Event) {
            match event {
                Event::SelectionChanged { .. } => self.selections += 1,
                Event::ShowWarning { message } => self.warnings.push(message.clone()),
                _ => {}
            }
        }
    }

    #[test]
    fn test_dispatch_to_listener_drains_queue() {
        let bus = EventBus::new();
        bus.publish(Event::SelectionChanged {
            network: "net".into(),
            selected_nodes: vec!["a".into()],
            selected_edges: vec![],
        });
        bus.publish(Event::ShowWarning {
            message: "empty network".to_string(),
        });

        let mut counter = Counter::default();
        bus.dispatch_to(&mut counter);
        assert_eq!(counter.selections, 1);
        assert_eq!(counter.warnings, vec!["empty network".to_string()]);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_layout_events_in_order() {
        let bus = EventBus::new();
        bus.publish(Event::LayoutStarted {
            network: "net".into(),
            algorithm: "grid".to_string(),
            ticket: "t1".to_string(),
        });
        bus.publish(Event::LayoutApplied {
            network: "net".into(),
            ticket: "t1".to_string(),
            count: 4,
        });

        let events = bus.drain();
        assert!(matches!(events[0], Event::LayoutStarted { .. }));
        assert_eq!(
            events[1],
            Event::LayoutApplied {
                network: "net".into(),
                ticket: "t1".to_string(),
                count: 4,
            }
        );
    }

    #[test]
    fn test_events_serialize() {
        let event = Event::ViewRecomputed {
            network: "net".into(),
            cause: RecomputeCause::StyleChanged,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
