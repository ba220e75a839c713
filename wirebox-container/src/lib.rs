//! Core container implementation for wirebox.

pub mod container;
pub mod definition;
mod engine;
pub mod error;
pub mod key;
pub mod module;
mod registry;
pub mod settings;
pub mod store;
pub mod submission;

pub use container::{Container, prelude};
pub use definition::{Arguments, BoxError, Definition, DefinitionBuilder, Injectable, Parameter};
pub use error::{Result, WireboxError};
pub use key::TypeKey;
pub use module::Module;
pub use settings::{CapabilityPolicy, WiringSettings};
pub use store::{InstanceStore, WiringReport};

#[doc(hidden)]
pub use inventory;
