//! Change events pushed to the editor client.

use serde_json::{Value, json};

use markset_store::{MarkerStore, MarkersState};
use markset_types::{AutoSelect, PathAliaser};

/// Snapshot of marker state composed for client delivery.
///
/// Capturing is a pure read of the store; delivery goes through an
/// [`EventSink`].
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    state: MarkersState,
    auto_select: AutoSelect,
}

impl ChangeEvent {
    #[must_use]
    pub fn capture(
        store: &MarkerStore,
        aliaser: &dyn PathAliaser,
        auto_select: AutoSelect,
    ) -> Self {
        Self {
            state: store.state_view(aliaser),
            auto_select,
        }
    }

    #[must_use]
    pub fn state(&self) -> &MarkersState {
        &self.state
    }

    #[must_use]
    pub fn auto_select(&self) -> AutoSelect {
        self.auto_select
    }

    /// The full payload pushed to the client.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "markers_state": self.state.to_json(),
            "auto_select": self.auto_select.wire_value(),
        })
    }
}

/// Delivery channel for change events.
///
/// The transport (comm layer, websocket, test buffer) is an external
/// concern; this is the narrow seam the session writes into.
pub trait EventSink {
    fn markers_changed(&mut self, event: ChangeEvent);
}

/// Sink that buffers events until drained.
///
/// Used by tests and by hosts that flush queued client events on their own
/// schedule.
#[derive(Debug, Default)]
pub struct BufferedSink {
    pending: Vec<ChangeEvent>,
}

impl BufferedSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> &[ChangeEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl EventSink for BufferedSink {
    fn markers_changed(&mut self, event: ChangeEvent) {
        self.pending.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markset_types::{MarkerSet, NoAlias, SetName};

    #[test]
    fn test_capture_empty_store() {
        let store = MarkerStore::new();
        let event = ChangeEvent::capture(&store, &NoAlias, AutoSelect::None);

        let payload = event.to_json();
        assert!(payload["markers_state"]["names"].is_null());
        assert!(payload["markers_state"]["markers"].is_null());
        assert_eq!(payload["auto_select"], 0);
    }

    #[test]
    fn test_capture_with_active_set() {
        let mut store = MarkerStore::new();
        store.publish(MarkerSet::new(
            SetName::new("Lint").unwrap(),
            None,
            Vec::new(),
        ));

        let event = ChangeEvent::capture(&store, &NoAlias, AutoSelect::First);
        let payload = event.to_json();

        assert_eq!(payload["markers_state"]["names"][0], "Lint");
        assert_eq!(payload["markers_state"]["markers"]["name"], "Lint");
        assert_eq!(payload["auto_select"], 1);
    }

    #[test]
    fn test_buffered_sink_drains_in_order() {
        let store = MarkerStore::new();
        let mut sink = BufferedSink::new();

        sink.markers_changed(ChangeEvent::capture(&store, &NoAlias, AutoSelect::None));
        sink.markers_changed(ChangeEvent::capture(&store, &NoAlias, AutoSelect::First));
        assert_eq!(sink.pending().len(), 2);

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].auto_select(), AutoSelect::None);
        assert_eq!(drained[1].auto_select(), AutoSelect::First);
        assert!(sink.pending().is_empty());
    }
}
