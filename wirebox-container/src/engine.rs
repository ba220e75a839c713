//! The wiring engine — generation-based construction.
//!
//! Instead of sorting the dependency graph up front, the engine repeatedly
//! scans the definitions that are not built yet:
//!
//! 1. every definition whose parameters can all be satisfied right now
//!    forms the next **generation**;
//! 2. the generation is constructed against the store as it was before the
//!    round started, then committed as a whole;
//! 3. the loop ends when nothing is left, or fails when a scan finds an
//!    empty generation while definitions remain.
//!
//! Members of one generation cannot depend on each other (neither would
//! have been ready otherwise), so their relative order does not affect the
//! result. The engine builds them in registration order.
//!
//! A cycle never becomes ready, so it surfaces as
//! [`UnmetDependencies`](crate::error::WireboxError::UnmetDependencies)
//! together with any genuinely missing binding.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument, trace, warn};
use wirebox_support::rendering::suggest_similar;

use crate::definition::{Arguments, Parameter, Slot};
use crate::error::{
    MissingParameter, Result, UnmetDependenciesError, UnresolvedDefinition, WireboxError,
};
use crate::key::TypeKey;
use crate::registry::{Blueprint, Registry};
use crate::settings::CapabilityPolicy;
use crate::store::InstanceStore;

/// How a parameter was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Via {
    Type,
    Key,
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Via::Type => write!(f, "type"),
            Via::Key => write!(f, "key"),
        }
    }
}

/// Finds the storage cell for a parameter. A built instance of the
/// required type wins over the named value.
fn locate<'a>(
    parameter: &Parameter,
    store: &'a InstanceStore,
    registry: &'a Registry,
) -> Option<(&'a (dyn Any + Send + Sync), Via)> {
    if let Some(slot) = store.slot(&parameter.required()) {
        return Some((slot, Via::Type));
    }
    parameter
        .key()
        .and_then(|key| registry.value(key))
        .map(|slot| (slot, Via::Key))
}

/// Builds every registered definition into an [`InstanceStore`].
pub(crate) struct WiringEngine<'r> {
    registry: &'r Registry,
    policy: CapabilityPolicy,
}

impl<'r> WiringEngine<'r> {
    pub fn new(registry: &'r Registry, policy: CapabilityPolicy) -> Self {
        Self { registry, policy }
    }

    /// Runs generations until everything is built.
    ///
    /// # Errors
    /// - [`WireboxError::UnmetDependencies`] — a scan found nothing buildable
    /// - [`WireboxError::ObjectInstantiation`] — a factory failed
    /// - [`WireboxError::CapabilityConflict`] — only with [`CapabilityPolicy::Reject`]
    #[instrument(skip(self), name = "wiring")]
    pub fn run(&self) -> Result<InstanceStore> {
        let mut remaining: Vec<&Blueprint> = self.registry.definitions().iter().collect();
        let mut store = InstanceStore::new();
        let mut generation = 0;

        debug!(
            definitions = remaining.len(),
            values = self.registry.value_count(),
            policy = %self.policy,
            "Starting wiring"
        );

        while !remaining.is_empty() {
            generation += 1;

            let (ready, blocked): (Vec<&Blueprint>, Vec<&Blueprint>) = remaining
                .into_iter()
                .partition(|blueprint| self.is_satisfiable(blueprint, &store));

            if ready.is_empty() {
                let err = self.unmet(&blocked, &store);
                warn!(
                    generation,
                    unresolved = blocked.len(),
                    "No definition became buildable"
                );
                return Err(WireboxError::UnmetDependencies(err));
            }

            debug!(
                generation,
                size = ready.len(),
                pending = blocked.len(),
                "Building generation"
            );

            let mut instances: Vec<Slot> = Vec::with_capacity(ready.len());
            for blueprint in &ready {
                instances.push(self.construct(blueprint, &store)?);
            }

            for (blueprint, instance) in ready.into_iter().zip(instances) {
                store.commit(blueprint, instance, generation, self.policy)?;
            }

            remaining = blocked;
        }

        debug!(generations = generation, instances = store.len(), "Wiring finished");
        Ok(store)
    }

    /// A definition is ready when every parameter resolves by type or key.
    /// Definitions without parameters are always ready.
    fn is_satisfiable(&self, blueprint: &Blueprint, store: &InstanceStore) -> bool {
        blueprint.parameters().iter().all(|parameter| {
            store.contains_key(&parameter.required())
                || parameter.key().is_some_and(|key| self.registry.has_value(key))
        })
    }

    fn construct(&self, blueprint: &Blueprint, store: &InstanceStore) -> Result<Slot> {
        let parameters = blueprint.parameters();
        let mut slots = Vec::with_capacity(parameters.len());

        for (index, parameter) in parameters.iter().enumerate() {
            let Some((slot, via)) = locate(parameter, store, self.registry) else {
                // The scan said otherwise; report it the same way a stuck scan would.
                return Err(WireboxError::UnmetDependencies(self.unmet(&[blueprint], store)));
            };
            trace!(
                definition = %blueprint.key,
                index,
                parameter = %parameter,
                via = %via,
                "Resolved argument"
            );
            slots.push(slot);
        }

        let mut arguments = Arguments::new(blueprint.key, slots);
        (blueprint.constructor.factory)(&mut arguments).map_err(|source| {
            warn!(definition = %blueprint.key, error = %source, "Instantiation failed");
            WireboxError::ObjectInstantiation {
                definition: blueprint.key,
                source,
            }
        })
    }

    /// Describes why each blocked definition could not be built.
    fn unmet(&self, blocked: &[&Blueprint], store: &InstanceStore) -> UnmetDependenciesError {
        let pending: HashSet<TypeKey> = blocked
            .iter()
            .flat_map(|b| std::iter::once(b.key).chain(b.capabilities.iter().map(|c| c.key)))
            .collect();
        let bound: Vec<&str> = store.bound_names().collect();
        let keys: Vec<&str> = self.registry.value_keys().collect();

        let unresolved = blocked
            .iter()
            .map(|blueprint| UnresolvedDefinition {
                definition: blueprint.key,
                missing: blueprint
                    .parameters()
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| locate(p, store, self.registry).is_none())
                    .map(|(index, p)| {
                        let mut suggestions = suggest_similar(p.required().type_name(), &bound, 3);
                        if let Some(key) = p.key() {
                            suggestions.extend(suggest_similar(key, &keys, 3));
                        }
                        MissingParameter {
                            index,
                            required: p.required(),
                            key: p.key().map(str::to_owned),
                            pending: pending.contains(&p.required()),
                            suggestions,
                        }
                    })
                    .collect(),
            })
            .collect();

        UnmetDependenciesError { unresolved }
    }
}
