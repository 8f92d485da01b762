//! Core abstractions for zinc-rs.
//!
//! This crate provides the collaborators that scene filters are built on:
//! - [`Manager`], a name-indexed object registry with batched change messages
//! - [`ManagerChange`] flags describing how a managed object changed
//! - The [`Graphics`] capability and its [`GraphicsType`]/[`DomainType`] enums
//! - The [`Region`] hierarchy
//! - Configuration [`Options`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod change;
pub mod error;
pub mod graphics;
pub mod manager;
pub mod options;
pub mod region;

pub use change::ManagerChange;
pub use error::{Result, ZincError};
pub use graphics::{DomainType, Graphics, GraphicsType};
pub use manager::{ManagedObject, Manager, ManagerMessage, ObserverId, WeakManager};
pub use options::Options;
pub use region::Region;
