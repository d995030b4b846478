//! Chat front ends over the intake machine: per-session store, HTTP routes
//! and a local REPL.

pub mod cli;
pub mod routes;
pub mod session;

pub use routes::{ChatRouteState, chat_routes};
pub use session::{Session, SessionStore, spawn_expiry_task};
