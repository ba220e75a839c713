//! # The Container — heart of wirebox
//!
//! Collects definitions and named values, then wires them in one go.
//!
//! # Lifecycle
//! ```text
//! Container::new()  ──register_*()──>  Container  ──build()──>  InstanceStore
//! ```
//!
//! `build` consumes the container: once wiring starts, nothing else can be
//! registered, and a build either produces a complete store or fails.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use wirebox_container::prelude::*;
//!
//! trait Repository: Send + Sync {}
//!
//! struct RepositoryStubImpl;
//! impl Repository for RepositoryStubImpl {}
//!
//! struct Service {
//!     repository: Arc<dyn Repository>,
//! }
//!
//! #[derive(Debug)]
//! struct SmsClient {
//!     url: String,
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register_value("smsUrl", String::from("https://sms.io"))?
//!     .register_definitions([
//!         Definition::of::<SmsClient>()
//!             .constructor([Parameter::named::<String>("smsUrl")], |args| {
//!                 Ok(SmsClient { url: args.value()? })
//!             })
//!             .build(),
//!         Definition::of::<Service>()
//!             .constructor([Parameter::of::<dyn Repository>()], |args| {
//!                 Ok(Service { repository: args.instance()? })
//!             })
//!             .build(),
//!         Definition::of::<RepositoryStubImpl>()
//!             .constructor([], |_| Ok(RepositoryStubImpl))
//!             .capability(|it| -> Arc<dyn Repository> { it })
//!             .build(),
//!     ])?;
//!
//! let store = container.build()?;
//! assert_eq!(store.len(), 3);
//! assert_eq!(store.get::<SmsClient>().unwrap().url, "https://sms.io");
//! assert_eq!(store.generation_of::<Service>(), Some(2));
//! # Ok::<(), WireboxError>(())
//! ```

use std::fmt;

use tracing::{debug, info, instrument};

use crate::definition::{Definition, Injectable};
use crate::engine::WiringEngine;
use crate::error::Result;
use crate::module::Module;
use crate::registry::Registry;
use crate::settings::WiringSettings;
use crate::store::InstanceStore;

/// Collects definitions and values, then builds them into an
/// [`InstanceStore`].
///
/// Not a global: create one per composition root.
pub struct Container {
    registry: Registry,
    settings: WiringSettings,
}

impl Container {
    /// Creates an empty container with default settings.
    pub fn new() -> Self {
        Self::with_settings(WiringSettings::default())
    }

    pub fn with_settings(settings: WiringSettings) -> Self {
        Self {
            registry: Registry::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &WiringSettings {
        &self.settings
    }

    // ── Definitions ──

    /// Registers a batch of definitions.
    ///
    /// Every definition must declare exactly one constructor. If any does
    /// not, the call fails with
    /// [`AmbiguousConstructor`](crate::error::WireboxError::AmbiguousConstructor)
    /// naming all of them, and no definition of the batch is kept.
    /// Registering the same concrete type again is a no-op.
    pub fn register_definitions<I, D>(&mut self, definitions: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<Definition>,
    {
        let batch: Vec<Definition> = definitions.into_iter().map(Into::into).collect();
        self.registry.register_definitions(batch)?;
        Ok(self)
    }

    /// Registers a single definition.
    pub fn register_definition(&mut self, definition: impl Into<Definition>) -> Result<&mut Self> {
        self.register_definitions([definition.into()])
    }

    /// Registers the definition of an [`Injectable`] type.
    pub fn register<T: Injectable>(&mut self) -> Result<&mut Self> {
        self.register_definition(T::definition())
    }

    /// Registers every definition recorded with
    /// [`submit_definition!`](crate::submit_definition), as one batch.
    pub fn register_submitted(&mut self) -> Result<&mut Self> {
        let batch = crate::submission::submitted();
        debug!(count = batch.len(), "Registering submitted definitions");
        self.register_definitions(batch)
    }

    // ── Values ──

    /// Binds `value` to `key`.
    ///
    /// Fails with
    /// [`AmbiguousValueName`](crate::error::WireboxError::AmbiguousValueName)
    /// if the key is taken; the earlier value is kept.
    pub fn register_value<V>(&mut self, key: impl Into<String>, value: V) -> Result<&mut Self>
    where
        V: fmt::Debug + Send + Sync + 'static,
    {
        self.registry.register_value(key.into(), value)?;
        Ok(self)
    }

    // ── Modules ──

    /// Applies a [`Module`].
    pub fn install(&mut self, module: &dyn Module) -> Result<&mut Self> {
        debug!(module = module.name(), "Installing module");
        module.register(self)?;
        Ok(self)
    }

    /// Returns the number of registered definitions.
    pub fn definition_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the number of named values.
    pub fn value_count(&self) -> usize {
        self.registry.value_count()
    }

    // ── Build ──

    /// Builds one instance of every registered definition.
    ///
    /// # Errors
    /// - [`UnmetDependencies`](crate::error::WireboxError::UnmetDependencies)
    ///   — missing bindings or a cycle
    /// - [`ObjectInstantiation`](crate::error::WireboxError::ObjectInstantiation)
    ///   — a factory failed; nothing after it is built
    /// - [`CapabilityConflict`](crate::error::WireboxError::CapabilityConflict)
    ///   — only with [`CapabilityPolicy::Reject`](crate::settings::CapabilityPolicy::Reject)
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<InstanceStore> {
        info!(
            definitions = self.registry.len(),
            values = self.registry.value_count(),
            "Building container"
        );

        let store = WiringEngine::new(&self.registry, self.settings.capability_conflicts).run()?;

        info!(
            instances = store.len(),
            generations = store.generations().len(),
            "Container built successfully ✓"
        );
        Ok(store)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.registry.len())
            .field("values", &self.registry.value_count())
            .field("settings", &self.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::definition::{Arguments, BoxError, Definition, Injectable, Parameter};
    pub use crate::error::{Result, WireboxError};
    pub use crate::key::TypeKey;
    pub use crate::module::Module;
    pub use crate::settings::{CapabilityPolicy, WiringSettings};
    pub use crate::store::{InstanceStore, WiringReport};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
