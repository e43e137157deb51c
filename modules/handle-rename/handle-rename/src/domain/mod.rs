//! Domain layer: rename saga and the components it drives.
//!
//! - `handle` - handle format rules
//! - `patterns` - regex construction and in-process rewriting of references
//! - `content_rewriter` - two-phase (SQL prefilter, regex rewrite) content pass
//! - `cache_invalidation` - cache-key surface of a user identity
//! - `redirects` - redirect rules for retired paths
//! - `service` - the orchestrator tying them together
//!
//! Repository traits take a generic `ConnectionTrait` so the same code runs against the
//! pooled connection (reads, dry runs, best-effort steps) and against the rename transaction.

pub mod cache_invalidation;
pub mod content_rewriter;
pub mod error;
pub mod handle;
pub mod patterns;
pub mod ports;
pub mod redirects;
pub mod repos;
pub mod service;
