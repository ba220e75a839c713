//! Error types for wirebox registration and wiring.
//!
//! Every failure is fatal to the call that produced it. Messages name all
//! offending definitions at once, so one failed build shows the whole
//! problem instead of the first symptom.

use std::fmt;

use wirebox_support::rendering::render_list;

use crate::definition::BoxError;
use crate::key::TypeKey;

/// Main error type for all wirebox operations.
#[derive(Debug, thiserror::Error)]
pub enum WireboxError {
    /// One or more definitions do not declare exactly one constructor.
    #[error("{}", .0)]
    AmbiguousConstructor(AmbiguousConstructorError),

    /// A named value was registered under a key that is already taken.
    #[error("{}", .0)]
    AmbiguousValueName(AmbiguousValueNameError),

    /// A generation came up empty while definitions were still unbuilt.
    #[error("{}", .0)]
    UnmetDependencies(UnmetDependenciesError),

    /// A factory failed while building a definition.
    #[error("Failed to instantiate {definition}: {source}")]
    ObjectInstantiation {
        definition: TypeKey,
        #[source]
        source: BoxError,
    },

    /// Two definitions provide the same capability and the settings
    /// reject overrides.
    #[error("{}", .0)]
    CapabilityConflict(CapabilityConflictError),

    /// Lookup in a finished instance store found nothing.
    #[error("{}", .0)]
    NotFound(NotFoundError),
}

/// A definition rejected at registration time.
#[derive(Debug, Clone)]
pub struct Offender {
    pub definition: TypeKey,
    /// How many constructor signatures it declared.
    pub constructors: usize,
}

/// Error when definitions declare zero or several constructors.
///
/// Lists every offender of the batch, not only the first.
#[derive(Debug)]
pub struct AmbiguousConstructorError {
    pub offenders: Vec<Offender>,
}

impl AmbiguousConstructorError {
    pub fn definitions(&self) -> Vec<TypeKey> {
        self.offenders.iter().map(|o| o.definition).collect()
    }
}

impl fmt::Display for AmbiguousConstructorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.offenders.iter().map(|o| o.definition.type_name()).collect();
        write!(f, "Ambiguous constructor: {}", render_list(&names))?;

        for offender in &self.offenders {
            write!(
                f,
                "\n  - {} declares {} constructors",
                offender.definition, offender.constructors
            )?;
        }

        write!(f, "\n  Hint: call .constructor(..) exactly once per definition")?;
        write!(f, "; nothing from this batch was registered")
    }
}

/// Error when a named value key is registered twice.
#[derive(Debug)]
pub struct AmbiguousValueNameError {
    pub key: String,
    /// Description of the value already registered under `key`.
    pub existing: String,
    /// Description of the value that was turned away.
    pub rejected: String,
}

impl fmt::Display for AmbiguousValueNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous value name: {:?} with value {} is already bound to {}",
            self.key, self.rejected, self.existing
        )
    }
}

/// One constructor parameter nothing could satisfy.
#[derive(Debug, Clone)]
pub struct MissingParameter {
    /// Position in the constructor signature.
    pub index: usize,
    pub required: TypeKey,
    pub key: Option<String>,
    /// The required type is provided by another unbuilt definition,
    /// which usually means a cycle.
    pub pending: bool,
    /// Bound types or value keys with a similar name.
    pub suggestions: Vec<String>,
}

/// A definition that could not be scheduled in any generation.
#[derive(Debug, Clone)]
pub struct UnresolvedDefinition {
    pub definition: TypeKey,
    pub missing: Vec<MissingParameter>,
}

/// Error when the build gets stuck with definitions left over.
///
/// Covers both missing bindings and dependency cycles.
#[derive(Debug)]
pub struct UnmetDependenciesError {
    pub unresolved: Vec<UnresolvedDefinition>,
}

impl UnmetDependenciesError {
    pub fn definitions(&self) -> Vec<TypeKey> {
        self.unresolved.iter().map(|u| u.definition).collect()
    }
}

impl fmt::Display for UnmetDependenciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.unresolved.iter().map(|u| u.definition.type_name()).collect();
        write!(f, "Unmet dependencies: {}", render_list(&names))?;

        let mut cyclic = false;
        for unresolved in &self.unresolved {
            write!(f, "\n  {}", unresolved.definition)?;
            for missing in &unresolved.missing {
                write!(f, "\n    #{} needs {}", missing.index, missing.required)?;
                if let Some(ref key) = missing.key {
                    write!(f, " or value {key:?}")?;
                }
                if missing.pending {
                    cyclic = true;
                    write!(f, " (registered, but never became buildable)")?;
                }
                if !missing.suggestions.is_empty() {
                    write!(f, "\n      Did you mean: {}", render_list(&missing.suggestions))?;
                }
            }
        }

        if cyclic {
            write!(
                f,
                "\n  Hint: definitions that wait on each other form a cycle; \
                 break it by depending on a value or a third definition"
            )
        } else {
            write!(
                f,
                "\n  Hint: register a definition providing the type, or a named value for the key"
            )
        }
    }
}

/// Error when a second provider claims an already bound capability.
#[derive(Debug)]
pub struct CapabilityConflictError {
    pub capability: TypeKey,
    pub existing: TypeKey,
    pub incoming: TypeKey,
}

impl fmt::Display for CapabilityConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Capability conflict: {} is provided by both {} and {}",
            self.capability, self.existing, self.incoming
        )?;
        write!(
            f,
            "\n  Hint: drop one provider, or set capability_conflicts = \"override\" \
             to let the later one win"
        )
    }
}

/// Error when a finished store has nothing under the requested type.
#[derive(Debug)]
pub struct NotFoundError {
    pub requested: TypeKey,
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nothing was built for {}", self.requested)?;
        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }
        Ok(())
    }
}

/// Convenient Result type for wirebox operations.
pub type Result<T> = std::result::Result<T, WireboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct SmsClient;
    struct Service;
    trait Repository {}

    #[test]
    fn ambiguous_constructor_lists_every_offender() {
        let err = WireboxError::AmbiguousConstructor(AmbiguousConstructorError {
            offenders: vec![
                Offender { definition: TypeKey::of::<SmsClient>(), constructors: 0 },
                Offender { definition: TypeKey::of::<Service>(), constructors: 2 },
            ],
        });

        let msg = err.to_string();
        assert!(msg.starts_with("Ambiguous constructor"));
        assert!(msg.contains("SmsClient declares 0 constructors"));
        assert!(msg.contains("Service declares 2 constructors"));
        assert!(msg.ends_with(
            "exactly once per definition; nothing from this batch was registered"
        ));
    }

    #[test]
    fn ambiguous_value_name_display() {
        let err = WireboxError::AmbiguousValueName(AmbiguousValueNameError {
            key: "smsUrl".into(),
            existing: "\"https://sms.io\"".into(),
            rejected: "\"https://other.io\"".into(),
        });

        let msg = err.to_string();
        assert!(msg.contains("\"smsUrl\""));
        assert!(msg.contains("https://sms.io"));
        assert!(msg.contains("https://other.io"));
    }

    #[test]
    fn unmet_dependencies_with_cycle_hint() {
        let err = WireboxError::UnmetDependencies(UnmetDependenciesError {
            unresolved: vec![UnresolvedDefinition {
                definition: TypeKey::of::<Service>(),
                missing: vec![MissingParameter {
                    index: 0,
                    required: TypeKey::of::<dyn Repository>(),
                    key: None,
                    pending: true,
                    suggestions: vec![],
                }],
            }],
        });

        let msg = err.to_string();
        assert!(msg.contains("Unmet dependencies"));
        assert!(msg.contains("#0 needs dyn"));
        assert!(msg.contains("form a cycle; break it by depending on a value"));
    }

    #[test]
    fn capability_conflict_names_both_providers() {
        struct SqlRepository;

        let err = WireboxError::CapabilityConflict(CapabilityConflictError {
            capability: TypeKey::of::<dyn Repository>(),
            existing: TypeKey::of::<Service>(),
            incoming: TypeKey::of::<SqlRepository>(),
        });

        let msg = err.to_string();
        assert!(msg.contains("is provided by both"));
        assert!(msg.contains("SqlRepository"));
        assert!(msg.contains("capability_conflicts = \"override\" to let the later one win"));
    }

    #[test]
    fn unmet_dependencies_with_suggestion() {
        let err = UnmetDependenciesError {
            unresolved: vec![UnresolvedDefinition {
                definition: TypeKey::of::<SmsClient>(),
                missing: vec![MissingParameter {
                    index: 0,
                    required: TypeKey::of::<String>(),
                    key: Some("smsUri".into()),
                    pending: false,
                    suggestions: vec!["smsUrl".into()],
                }],
            }],
        };

        let msg = err.to_string();
        assert!(msg.contains("or value \"smsUri\""));
        assert!(msg.contains("Did you mean: smsUrl"));
        assert!(!msg.contains("cycle"));
        assert_eq!(err.definitions(), vec![TypeKey::of::<SmsClient>()]);
    }

    #[test]
    fn instantiation_keeps_source() {
        use std::error::Error as _;

        let err = WireboxError::ObjectInstantiation {
            definition: TypeKey::of::<SmsClient>(),
            source: "connection refused".into(),
        };

        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("connection refused"));
    }
}
