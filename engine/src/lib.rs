//! Request handlers, change notification, and session lifecycle for marker
//! state.
//!
//! The external RPC dispatcher hands requests to [`MarkerSession::dispatch`];
//! tool integrations publish complete sets through
//! [`MarkerSession::show_markers`]. Every mutation is followed by a change
//! event delivered through the [`EventSink`] collaborator.

mod notify;
mod rpc;
mod session;

pub use notify::{BufferedSink, ChangeEvent, EventSink};
pub use rpc::{Request, RequestError};
pub use session::{
    MARKERS_CLEAR_ACTIVE_SET, MARKERS_TAB_CLOSED, MARKERS_UPDATE_ACTIVE_SET, MarkerSession,
    STATE_FILE_NAME, default_scratch_dir,
};
