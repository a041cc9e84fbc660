//! Observable video session store.
//!
//! A [`VideoSession`] owns the state a video annotation viewer renders:
//! the video list, the current selection and its detail info, and the
//! transient upload/load/delete flags. Operations call the video API and
//! publish every state change through a `tokio::sync::watch` channel.

pub mod error;
pub mod session;
pub mod state;

pub use error::{SessionError, SessionResult};
pub use session::VideoSession;
pub use state::SessionState;
