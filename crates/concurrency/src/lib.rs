//! Unit-of-work plumbing for Cadence
//!
//! This crate implements the persistence side of a command's unit of work:
//! - EntityStore: shared revision-checked store, one atomic batch per flush
//! - Session / SessionFactory: pluggable persistence backends, opened lazily
//! - Sessions: per-unit-of-work registry, flushed in opening order
//! - DbEntitySession: the primary session, a change-tracking entity cache
//! - ResourceSession: a session over an external transactional resource
//! - TransactionContext: phase listeners fired on commit and rollback

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod db_session;
pub mod resource;
pub mod session;
pub mod store;
pub mod testing;
pub mod transaction;

pub use db_session::{DbEntitySession, DbEntitySessionFactory};
pub use resource::{ExternalResource, ResourceConnection, ResourceSession, ResourceSessionFactory};
pub use session::{Session, SessionFactories, SessionFactory, Sessions};
pub use store::{EntityStore, WriteOp};
pub use transaction::{TransactionContext, TransactionListener, TransactionPhase};
