//! todocore - local-first todo store with revision-based remote sync.
//!
//! This library provides the core of a todo application that stays usable
//! offline and convergent with a remote, revision-versioned list service:
//! - Data model ([`TodoItem`], [`Importance`], [`ItemCategory`])
//! - In-memory keyed store with durable flat-file snapshots ([`TodoStore`])
//! - Remote list service interface and HTTP client ([`RemoteService`],
//!   [`HttpRemoteService`])
//! - Optimistic-concurrency sync coordination ([`SyncCoordinator`])
//! - Configuration management ([`Config`])
//!
//! Mutations are applied locally first and confirmed against the server
//! afterwards; an unconfirmed mutation marks the session dirty, and the
//! next operation reconciles by replacing local state with the server's
//! authoritative list.

pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use error::{TodoError, TodoResult};
pub use models::{Importance, ItemCategory, TodoItem};
pub use remote::{HttpRemoteService, RemoteService, TodoListResponse};
pub use store::TodoStore;
pub use sync::{SyncCoordinator, SyncPhase, SyncStatus};
