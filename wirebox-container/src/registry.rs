//! Definition registry — holds definitions and named values until build.
//!
//! Registration only validates and stores. No factory runs here.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::definition::{Capability, Constructor, Definition, Parameter, Slot};
use crate::error::{AmbiguousConstructorError, AmbiguousValueNameError, Offender, WireboxError};
use crate::key::TypeKey;

/// An admitted definition. Holds exactly one constructor, so the engine
/// never sees an ambiguous one.
pub(crate) struct Blueprint {
    pub key: TypeKey,
    pub constructor: Constructor,
    pub capabilities: Vec<Capability>,
}

impl Blueprint {
    pub fn parameters(&self) -> &[Parameter] {
        &self.constructor.parameters
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("key", &self.key)
            .field("parameters", &self.constructor.parameters)
            .field("capabilities", &self.capabilities.iter().map(|c| c.key).collect::<Vec<_>>())
            .finish()
    }
}

/// A value registered under a string key.
pub(crate) struct NamedValue {
    /// Holds an `Arc<V>`.
    pub slot: Slot,
    pub description: String,
}

/// Stores definitions and named values.
///
/// Populated through [`Container`](crate::container::Container), read-only
/// once the build starts.
#[derive(Default)]
pub(crate) struct Registry {
    definitions: Vec<Blueprint>,
    known: HashSet<TypeKey>,
    values: HashMap<String, NamedValue>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a batch of definitions.
    ///
    /// # Errors
    /// Returns [`WireboxError::AmbiguousConstructor`] naming every
    /// definition that does not declare exactly one constructor. In that
    /// case nothing from the batch is admitted.
    pub fn register_definitions(
        &mut self,
        definitions: Vec<Definition>,
    ) -> Result<(), WireboxError> {
        let offenders: Vec<Offender> = definitions
            .iter()
            .filter(|d| d.constructor_count() != 1)
            .map(|d| Offender {
                definition: d.key(),
                constructors: d.constructor_count(),
            })
            .collect();

        if !offenders.is_empty() {
            return Err(WireboxError::AmbiguousConstructor(
                AmbiguousConstructorError { offenders },
            ));
        }

        for definition in definitions {
            let Definition { key, constructors, capabilities } = definition;

            if !self.known.insert(key) {
                debug!(definition = %key, "Definition already registered, keeping the first");
                continue;
            }

            // Checked above: exactly one.
            let Some(constructor) = constructors.into_iter().next() else {
                continue;
            };

            debug!(
                definition = %key,
                parameters = constructor.parameters.len(),
                capabilities = capabilities.len(),
                "Registered definition"
            );
            self.definitions.push(Blueprint { key, constructor, capabilities });
        }

        Ok(())
    }

    /// Stores a named value.
    ///
    /// # Errors
    /// Returns [`WireboxError::AmbiguousValueName`] if `key` is taken. The
    /// original value stays in place.
    pub fn register_value<V>(&mut self, key: String, value: V) -> Result<(), WireboxError>
    where
        V: fmt::Debug + Send + Sync + 'static,
    {
        let description = format!("{value:?}");

        if let Some(existing) = self.values.get(&key) {
            return Err(WireboxError::AmbiguousValueName(AmbiguousValueNameError {
                key,
                existing: existing.description.clone(),
                rejected: description,
            }));
        }

        debug!(key = %key, value = %description, "Registered value");
        self.values.insert(
            key,
            NamedValue {
                slot: Box::new(Arc::new(value)),
                description,
            },
        );
        Ok(())
    }

    /// Admitted definitions, in registration order.
    pub fn definitions(&self) -> &[Blueprint] {
        &self.definitions
    }

    /// Looks up the storage cell of a named value.
    pub fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(key).map(|v| v.slot.as_ref())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn value_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of admitted definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns the number of named values.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &self.definitions)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
