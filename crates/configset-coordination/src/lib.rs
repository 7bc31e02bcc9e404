//! Configset Coordination
//!
//! This crate is the boundary between configset resolution and the distributed
//! coordination store. The store is a tree of named nodes; each node carries
//! content and a version counter that the store bumps on every content update.
//!
//! The [`CoordinationClient`] trait is the only capability the rest of the
//! workspace consumes. Every call takes a [`CancellationToken`] so that a
//! shutdown can abort a pending round-trip, which surfaces as
//! [`CoordinationError::Interrupted`] rather than an ordinary failure.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod client;
mod error;
mod memory;
pub mod paths;

pub use client::{CoordinationClient, Stat, cancellable};
pub use error::CoordinationError;
pub use memory::{InMemoryCoordinationStore, TreeSnapshot};
