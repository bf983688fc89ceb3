//! Member authentication for footlog.
//!
//! This facade crate re-exports the footlog crates for convenient access.
//!
//! - [`core`] — Typed identifiers and runtime utilities
//! - [`pg`] — PostgreSQL connectivity and schema
//! - [`auth`] — Tokens, refresh sessions, delegated login
//! - `server` — HTTP backend (feature `server`)

pub use footlog_core    as core;
pub use footlog_pg      as pg;
pub use footlog_auth    as auth;
#[cfg(feature = "server")]
pub use footlog_server  as server;
