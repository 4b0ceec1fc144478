//! Client sessions
//!
//! A session is a consumer attached to exactly one processor at a time. The
//! session layer owns the connection; the hub keeps a [`SessionRecord`]
//! per registered session and hands out [`ClientInfo`] snapshots.

mod context;
mod state;

pub use context::ClientInfo;
pub use state::{SessionClient, SessionRecord};
