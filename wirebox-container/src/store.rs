//! The instance store — the result of a successful build.
//!
//! Every instance is bound under its concrete type and under each
//! capability its definition declares. Bindings are only ever added while
//! the build runs; a finished store is read-only.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{trace, warn};
use wirebox_support::rendering::{render_generations, suggest_similar};

use crate::definition::Slot;
use crate::error::{CapabilityConflictError, NotFoundError, Result, WireboxError};
use crate::key::TypeKey;
use crate::registry::Blueprint;
use crate::settings::CapabilityPolicy;

struct Binding {
    /// Holds an `Arc<K>` where `K` is the binding's key.
    slot: Slot,
    provider: TypeKey,
    generation: usize,
}

struct Record {
    key: TypeKey,
    generation: usize,
}

/// Instances produced by [`Container::build`](crate::container::Container::build).
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use wirebox_container::prelude::*;
///
/// trait Repository: Send + Sync {}
/// struct RepositoryStubImpl;
/// impl Repository for RepositoryStubImpl {}
///
/// let mut container = Container::new();
/// container.register_definition(
///     Definition::of::<RepositoryStubImpl>()
///         .constructor([], |_| Ok(RepositoryStubImpl))
///         .capability(|it| -> Arc<dyn Repository> { it }),
/// )?;
/// let store = container.build()?;
///
/// assert_eq!(store.len(), 1);
/// assert!(store.get::<RepositoryStubImpl>().is_some());
/// assert!(store.get::<dyn Repository>().is_some());
/// # Ok::<(), WireboxError>(())
/// ```
#[derive(Default)]
pub struct InstanceStore {
    bindings: HashMap<TypeKey, Binding>,
    built: Vec<Record>,
}

impl InstanceStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the instance bound under `T`, a concrete type or a capability.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.bindings
            .get(&TypeKey::of::<T>())
            .and_then(|b| b.slot.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Like [`get`](InstanceStore::get), but explains what is missing.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get::<T>().ok_or_else(|| {
            let bound: Vec<&str> = self.bindings.keys().map(|k| k.type_name()).collect();
            WireboxError::NotFound(NotFoundError {
                requested: TypeKey::of::<T>(),
                suggestions: suggest_similar(type_name::<T>(), &bound, 3),
            })
        })
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeKey::of::<T>())
    }

    /// Returns the number of built instances, one per definition.
    pub fn len(&self) -> usize {
        self.built.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }

    /// Returns the number of capability bindings.
    pub fn capability_count(&self) -> usize {
        self.bindings.iter().filter(|(key, b)| **key != b.provider).count()
    }

    /// The 1-based generation that built `T` (or the current provider of
    /// capability `T`).
    pub fn generation_of<T: ?Sized + 'static>(&self) -> Option<usize> {
        self.bindings.get(&TypeKey::of::<T>()).map(|b| b.generation)
    }

    /// The concrete type currently bound under `T`.
    pub fn provider_of<T: ?Sized + 'static>(&self) -> Option<TypeKey> {
        self.bindings.get(&TypeKey::of::<T>()).map(|b| b.provider)
    }

    /// Built definitions grouped by generation, in build order.
    pub fn generations(&self) -> Vec<Vec<TypeKey>> {
        let mut out: Vec<Vec<TypeKey>> = Vec::new();
        for record in &self.built {
            if out.len() < record.generation {
                out.resize_with(record.generation, Vec::new);
            }
            out[record.generation - 1].push(record.key);
        }
        out
    }

    /// A serializable summary of the build.
    pub fn report(&self) -> WiringReport {
        let mut capabilities: Vec<CapabilityBinding> = self
            .bindings
            .iter()
            .filter(|(key, b)| **key != b.provider)
            .map(|(key, b)| CapabilityBinding {
                capability: *key,
                provider: b.provider,
            })
            .collect();
        capabilities.sort_by(|a, b| a.capability.type_name().cmp(b.capability.type_name()));

        WiringReport {
            instances: self.len(),
            generations: self.generations(),
            capabilities,
        }
    }

    pub(crate) fn slot(&self, key: &TypeKey) -> Option<&(dyn Any + Send + Sync)> {
        self.bindings.get(key).map(|b| b.slot.as_ref())
    }

    pub(crate) fn contains_key(&self, key: &TypeKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub(crate) fn bound_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.keys().map(|k| k.type_name())
    }

    /// Binds a freshly built instance under its type and capabilities.
    ///
    /// # Errors
    /// [`WireboxError::CapabilityConflict`] when a capability already has a
    /// different provider and `policy` is [`CapabilityPolicy::Reject`].
    pub(crate) fn commit(
        &mut self,
        blueprint: &Blueprint,
        slot: Slot,
        generation: usize,
        policy: CapabilityPolicy,
    ) -> Result<()> {
        let projected: Vec<(TypeKey, Slot)> = blueprint
            .capabilities
            .iter()
            .filter_map(|c| (c.project)(slot.as_ref()).map(|s| (c.key, s)))
            .collect();

        for (capability, capability_slot) in projected {
            if let Some(existing) = self.bindings.get(&capability) {
                if existing.provider != blueprint.key {
                    match policy {
                        CapabilityPolicy::Override => {
                            warn!(
                                capability = %capability,
                                previous = %existing.provider,
                                provider = %blueprint.key,
                                "Capability provided twice, later provider wins"
                            );
                        }
                        CapabilityPolicy::Reject => {
                            return Err(WireboxError::CapabilityConflict(CapabilityConflictError {
                                capability,
                                existing: existing.provider,
                                incoming: blueprint.key,
                            }));
                        }
                    }
                }
            }

            trace!(capability = %capability, provider = %blueprint.key, "Bound capability");
            self.bindings.insert(
                capability,
                Binding {
                    slot: capability_slot,
                    provider: blueprint.key,
                    generation,
                },
            );
        }

        self.bindings.insert(
            blueprint.key,
            Binding {
                slot,
                provider: blueprint.key,
                generation,
            },
        );
        self.built.push(Record {
            key: blueprint.key,
            generation,
        });
        Ok(())
    }
}

impl fmt::Debug for InstanceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStore")
            .field("instances", &self.built.len())
            .field("capabilities", &self.capability_count())
            .finish()
    }
}

/// A capability and the concrete type bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityBinding {
    pub capability: TypeKey,
    pub provider: TypeKey,
}

/// Summary of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct WiringReport {
    pub instances: usize,
    pub generations: Vec<Vec<TypeKey>>,
    pub capabilities: Vec<CapabilityBinding>,
}

impl fmt::Display for WiringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let generations: Vec<Vec<String>> = self
            .generations
            .iter()
            .map(|members| members.iter().map(TypeKey::short_name).collect())
            .collect();

        write!(f, "{}", render_generations(&generations))?;
        for binding in &self.capabilities {
            writeln!(
                f,
                "{} <- {}",
                binding.capability.short_name(),
                binding.provider.short_name()
            )?;
        }
        Ok(())
    }
}
