//! Marker session: the owned service instance behind the RPC surface.
//!
//! One `MarkerSession` exists per editor session. It owns the store, the
//! state-file path, the path aliaser, and the event sink, and is passed by
//! reference to handlers rather than reached through any ambient global.

use std::path::{Path, PathBuf};

use tracing::warn;

use markset_store::{MarkerStore, read_markers, write_markers};
use markset_types::{AutoSelect, MarkerSet, PathAliaser};

use crate::notify::{ChangeEvent, EventSink};
use crate::rpc::{Request, RequestError, single_string_param};

/// Close-tab request: drop all marker state.
pub const MARKERS_TAB_CLOSED: &str = "markers_tab_closed";
/// Switch the active set by name.
pub const MARKERS_UPDATE_ACTIVE_SET: &str = "update_active_marker_set";
/// Remove the active set and fall back to the previous one.
pub const MARKERS_CLEAR_ACTIVE_SET: &str = "clear_active_marker_set";

/// File name of the persisted marker state within the scratch directory.
pub const STATE_FILE_NAME: &str = "markers_db";

/// Per-user scratch directory when the host environment does not supply one.
#[must_use]
pub fn default_scratch_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("markset"))
}

pub struct MarkerSession<S: EventSink> {
    store: MarkerStore,
    state_path: PathBuf,
    aliaser: Box<dyn PathAliaser>,
    sink: S,
}

impl<S: EventSink> MarkerSession<S> {
    /// Create a session with an empty store; call [`startup`](Self::startup)
    /// to load persisted state.
    pub fn new(scratch_dir: &Path, aliaser: Box<dyn PathAliaser>, sink: S) -> Self {
        Self {
            store: MarkerStore::new(),
            state_path: scratch_dir.join(STATE_FILE_NAME),
            aliaser,
            sink,
        }
    }

    /// Load persisted marker state, tolerating a missing or corrupt file.
    pub fn startup(&mut self) {
        self.store = read_markers(&self.state_path, self.aliaser.as_ref());
    }

    /// Persist the store, but only on a clean shutdown.
    ///
    /// Abnormal termination writes nothing; losing unsaved changes there is
    /// acceptable. A failed write is logged and leaves memory untouched.
    pub fn shutdown(&mut self, terminated_normally: bool) {
        if !terminated_normally {
            return;
        }

        if let Err(err) = write_markers(&self.state_path, &self.store, self.aliaser.as_ref()) {
            warn!("failed to persist marker state: {err:#}");
        }
    }

    /// Route a dispatcher request to its handler.
    pub fn dispatch(&mut self, request: &Request) -> Result<(), RequestError> {
        match request.method.as_str() {
            MARKERS_TAB_CLOSED => {
                self.handle_tab_closed();
                Ok(())
            }
            MARKERS_UPDATE_ACTIVE_SET => self.handle_update_active_set(&request.params),
            MARKERS_CLEAR_ACTIVE_SET => {
                self.handle_clear_active_set();
                Ok(())
            }
            other => Err(RequestError::UnknownMethod(other.to_string())),
        }
    }

    /// The markers tab was closed: drop everything.
    pub fn handle_tab_closed(&mut self) {
        self.store.clear();
        self.fire_changed(AutoSelect::None);
    }

    /// The client selected a set by name.
    ///
    /// Unknown names are deliberately ignored (stale client state must not
    /// error); the change event still fires so the client re-syncs.
    pub fn handle_update_active_set(
        &mut self,
        params: &[serde_json::Value],
    ) -> Result<(), RequestError> {
        let name = single_string_param(MARKERS_UPDATE_ACTIVE_SET, params)?;

        self.store.activate(&name);
        self.fire_changed(AutoSelect::None);
        Ok(())
    }

    /// The client dismissed the active set.
    pub fn handle_clear_active_set(&mut self) {
        self.store.clear_active();
        self.fire_changed(AutoSelect::None);
    }

    /// Producer surface: publish a complete set and notify the client.
    ///
    /// Tool integrations pass [`AutoSelect::First`] so the client focuses
    /// the fresh results. Does not persist; persistence is shutdown-only.
    pub fn show_markers(&mut self, set: MarkerSet, auto_select: AutoSelect) {
        self.store.publish(set);
        self.fire_changed(auto_select);
    }

    /// Current client state view, for the session's initial client-state
    /// payload.
    #[must_use]
    pub fn state_as_json(&self) -> serde_json::Value {
        self.store.state_view(self.aliaser.as_ref()).to_json()
    }

    #[must_use]
    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn fire_changed(&mut self, auto_select: AutoSelect) {
        let event = ChangeEvent::capture(&self.store, self.aliaser.as_ref(), auto_select);
        self.sink.markers_changed(event);
    }
}
