//! Member authentication and session lifecycle.
//!
//! Stateless JWT access tokens paired with stateful refresh tokens. Each
//! member holds at most one live refresh session, bound to the client IP
//! that opened it and rotated on every reissue.
//!
//! ## Tokens
//!
//! - [`Crypto`] — HS256 signing, verification, and token extraction
//! - [`Claims`] — JWT payload structure
//! - [`TokenPair`] — access and refresh tokens issued together
//! - [`password`] — Argon2 hashing and verification
//!
//! ## Sessions
//!
//! - [`SessionStore`] — refresh session persistence with a reverse index
//! - [`Vault`] — in-process store
//! - `RedisVault` — shared store with server-side expiry (feature `redis`)
//!
//! ## Accounts
//!
//! - [`Resolver`] — lookup, registration, and find-or-create over a [`MemberRepository`]
//! - [`Kakao`] — delegated login through an OAuth authorization code
//! - [`Authenticator`] — login, reissue, and logout orchestration
mod carrier;
mod claims;
mod config;
mod crypto;
mod dto;
mod error;
mod gender;
mod kakao;
mod kind;
mod member;
mod origin;
mod pair;
pub mod password;
mod profile;
mod repository;
mod resolver;
mod role;
mod roster;
mod service;
mod session;
mod vault;

pub use carrier::*;
pub use claims::*;
pub use config::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use gender::*;
pub use kakao::*;
pub use kind::*;
pub use member::*;
pub use origin::*;
pub use pair::*;
pub use profile::*;
pub use repository::*;
pub use resolver::*;
pub use role::*;
pub use roster::*;
pub use service::*;
pub use session::*;
pub use vault::*;

#[cfg(feature = "redis")]
mod remote;
#[cfg(feature = "redis")]
pub use remote::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
