//! Buildable type definitions.
//!
//! A [`Definition`] describes how to build one concrete type: the constructor
//! signature (an ordered list of [`Parameter`]s plus a factory) and the
//! capabilities the built instance is indexed under.
//!
//! Nothing is discovered at runtime. Each definition spells out its
//! dependency requirements up front so the wiring engine can decide
//! readiness without calling any factory.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use wirebox_container::definition::{Definition, Parameter};
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
//! let stub = Definition::of::<RepositoryStubImpl>()
//!     .constructor([], |_| Ok(RepositoryStubImpl))
//!     .capability(|it| -> Arc<dyn Repository> { it })
//!     .build();
//!
//! let service = Definition::of::<Service>()
//!     .constructor([Parameter::of::<dyn Repository>()], |args| {
//!         Ok(Service { repository: args.instance()? })
//!     })
//!     .build();
//!
//! assert_eq!(stub.constructor_count(), 1);
//! assert_eq!(service.parameters().map(|p| p.len()), Some(1));
//! ```

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// Error type factories may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased storage cell. Always holds an `Arc<T>` for the key it is
/// stored under, so the same cell can be handed out by type or by name.
pub(crate) type Slot = Box<dyn Any + Send + Sync>;

pub(crate) type FactoryFn =
    Box<dyn Fn(&mut Arguments<'_>) -> Result<Slot, BoxError> + Send + Sync>;

pub(crate) type ProjectFn = Box<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Slot> + Send + Sync>;

/// One constructor argument slot.
///
/// The required type is always checked first; the key is consulted only
/// when nothing of that type has been built yet.
#[derive(Clone, PartialEq, Eq)]
pub struct Parameter {
    required: TypeKey,
    key: Option<Cow<'static, str>>,
}

impl Parameter {
    /// A parameter satisfied by a built instance of `T` (concrete type or
    /// capability).
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            required: TypeKey::of::<T>(),
            key: None,
        }
    }

    /// A parameter of type `T` that falls back to the named value `key`.
    pub fn named<T: ?Sized + 'static>(key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            required: TypeKey::of::<T>(),
            key: Some(key.into()),
        }
    }

    #[inline]
    pub fn required(&self) -> TypeKey {
        self.required
    }

    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "Parameter({}, key={:?})", self.required, key),
            None => write!(f, "Parameter({})", self.required),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} (key={:?})", self.required.short_name(), key),
            None => f.write_str(&self.required.short_name()),
        }
    }
}

/// A single constructor signature.
pub(crate) struct Constructor {
    pub parameters: Vec<Parameter>,
    pub factory: FactoryFn,
}

/// A capability binding: projects the concrete `Arc<T>` into `Arc<dyn Cap>`.
pub(crate) struct Capability {
    pub key: TypeKey,
    pub project: ProjectFn,
}

/// Describes how to build one concrete type.
///
/// Created with [`Definition::of`], immutable once registered.
pub struct Definition {
    pub(crate) key: TypeKey,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) capabilities: Vec<Capability>,
}

impl Definition {
    /// Starts a definition for the concrete type `T`.
    pub fn of<T: Send + Sync + 'static>() -> DefinitionBuilder<T> {
        DefinitionBuilder {
            definition: Definition {
                key: TypeKey::of::<T>(),
                constructors: Vec::new(),
                capabilities: Vec::new(),
            },
            _marker: std::marker::PhantomData,
        }
    }

    /// The concrete type this definition builds.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Number of declared constructor signatures. Only definitions with
    /// exactly one are admitted by the registry.
    #[inline]
    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }

    /// Parameters of the constructor, if there is exactly one.
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match self.constructors.as_slice() {
            [only] => Some(&only.parameters),
            _ => None,
        }
    }

    /// Capabilities the built instance will be indexed under.
    pub fn capabilities(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.capabilities.iter().map(|c| c.key)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("key", &self.key)
            .field(
                "constructors",
                &self.constructors.iter().map(|c| &c.parameters).collect::<Vec<_>>(),
            )
            .field("capabilities", &self.capabilities.iter().map(|c| c.key).collect::<Vec<_>>())
            .finish()
    }
}

/// Typed builder for a [`Definition`] of `T`.
///
/// Converts into a [`Definition`] via [`From`], so it can be passed
/// anywhere a definition is expected.
pub struct DefinitionBuilder<T> {
    definition: Definition,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DefinitionBuilder<T> {
    /// Declares a constructor signature.
    ///
    /// The factory receives its arguments in the same order as
    /// `parameters`. Declaring more than one constructor makes the
    /// definition ambiguous.
    pub fn constructor<F>(
        mut self,
        parameters: impl IntoIterator<Item = Parameter>,
        factory: F,
    ) -> Self
    where
        F: Fn(&mut Arguments<'_>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.definition.constructors.push(Constructor {
            parameters: parameters.into_iter().collect(),
            factory: Box::new(move |args: &mut Arguments<'_>| {
                let instance = factory(args)?;
                Ok(Box::new(Arc::new(instance)) as Slot)
            }),
        });
        self
    }

    /// Declares that `T` provides capability `C`.
    ///
    /// The cast is usually the identity closure with an explicit return
    /// type, which performs the unsizing coercion:
    /// `.capability(|it| -> Arc<dyn Repository> { it })`.
    pub fn capability<C, F>(mut self, cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.definition.capabilities.push(Capability {
            key: TypeKey::of::<C>(),
            project: Box::new(move |slot: &(dyn Any + Send + Sync)| {
                slot.downcast_ref::<Arc<T>>()
                    .map(|it| Box::new(cast(Arc::clone(it))) as Slot)
            }),
        });
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> Definition {
        self.definition
    }
}

impl<T: Send + Sync + 'static> From<DefinitionBuilder<T>> for Definition {
    fn from(builder: DefinitionBuilder<T>) -> Self {
        builder.build()
    }
}

/// Types that know their own [`Definition`].
///
/// Implement by hand or with `#[derive(Injectable)]`.
pub trait Injectable: Send + Sync + Sized + 'static {
    fn definition() -> Definition;
}

/// Failure to read an argument inside a factory.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error(
        "{definition} asked for argument #{index}, but its constructor declares only {declared}"
    )]
    Exhausted {
        definition: TypeKey,
        index: usize,
        declared: usize,
    },

    #[error("argument #{index} of {definition} is not a {expected}")]
    TypeMismatch {
        definition: TypeKey,
        index: usize,
        expected: &'static str,
    },
}

/// Resolved constructor arguments, in declaration order.
///
/// Each call to [`instance`](Arguments::instance) or
/// [`value`](Arguments::value) consumes the next argument.
pub struct Arguments<'a> {
    definition: TypeKey,
    slots: Vec<&'a (dyn Any + Send + Sync)>,
    cursor: usize,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(definition: TypeKey, slots: Vec<&'a (dyn Any + Send + Sync)>) -> Self {
        Self {
            definition,
            slots,
            cursor: 0,
        }
    }

    /// Takes the next argument as a shared `Arc<T>`.
    pub fn instance<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>, ArgumentError> {
        let index = self.cursor;
        let slot = self.slots.get(index).copied().ok_or(ArgumentError::Exhausted {
            definition: self.definition,
            index,
            declared: self.slots.len(),
        })?;
        self.cursor += 1;

        slot.downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ArgumentError::TypeMismatch {
                definition: self.definition,
                index,
                expected: type_name::<T>(),
            })
    }

    /// Takes the next argument and clones the value out of it.
    pub fn value<T: Clone + Send + Sync + 'static>(&mut self) -> Result<T, ArgumentError> {
        self.instance::<T>().map(|it| (*it).clone())
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.slots.len().saturating_sub(self.cursor)
    }
}

impl fmt::Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("definition", &self.definition)
            .field("len", &self.slots.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Repository: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct RepositoryStubImpl;

    impl Repository for RepositoryStubImpl {
        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn slot<T: Send + Sync + 'static>(value: T) -> Slot {
        Box::new(Arc::new(value))
    }

    #[test]
    fn parameter_without_key() {
        let p = Parameter::of::<dyn Repository>();
        assert_eq!(p.required(), TypeKey::of::<dyn Repository>());
        assert_eq!(p.key(), None);
    }

    #[test]
    fn parameter_with_key() {
        let p = Parameter::named::<String>("smsUrl");
        assert_eq!(p.required(), TypeKey::of::<String>());
        assert_eq!(p.key(), Some("smsUrl"));
        assert_eq!(p.to_string(), "String (key=\"smsUrl\")");
    }

    #[test]
    fn counts_constructors() {
        let none: Definition = Definition::of::<RepositoryStubImpl>().into();
        assert_eq!(none.constructor_count(), 0);
        assert!(none.parameters().is_none());

        let two: Definition = Definition::of::<RepositoryStubImpl>()
            .constructor([], |_| Ok(RepositoryStubImpl))
            .constructor([Parameter::of::<String>()], |_| Ok(RepositoryStubImpl))
            .into();
        assert_eq!(two.constructor_count(), 2);
        assert!(two.parameters().is_none());
    }

    #[test]
    fn factory_produces_arc_slot() {
        let def = Definition::of::<RepositoryStubImpl>()
            .constructor([], |_| Ok(RepositoryStubImpl))
            .build();

        let mut args = Arguments::new(def.key(), vec![]);
        let produced = (def.constructors[0].factory)(&mut args).unwrap();
        assert!(produced.downcast_ref::<Arc<RepositoryStubImpl>>().is_some());
    }

    #[test]
    fn capability_projects_same_allocation() {
        let def = Definition::of::<RepositoryStubImpl>()
            .constructor([], |_| Ok(RepositoryStubImpl))
            .capability(|it| -> Arc<dyn Repository> { it })
            .build();

        let concrete = slot(RepositoryStubImpl);
        let projected = (def.capabilities[0].project)(concrete.as_ref()).unwrap();
        let repo = projected.downcast_ref::<Arc<dyn Repository>>().unwrap();
        assert_eq!(repo.name(), "stub");

        let original = concrete.downcast_ref::<Arc<RepositoryStubImpl>>().unwrap();
        assert_eq!(Arc::strong_count(original), 2);
    }

    #[test]
    fn arguments_in_order() {
        let url = slot(String::from("https://sms.io"));
        let port = slot(8080u16);
        let mut args = Arguments::new(TypeKey::of::<()>(), vec![url.as_ref(), port.as_ref()]);

        assert_eq!(args.remaining(), 2);
        assert_eq!(args.value::<String>().unwrap(), "https://sms.io");
        assert_eq!(*args.instance::<u16>().unwrap(), 8080);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn argument_type_mismatch() {
        let url = slot(String::from("https://sms.io"));
        let mut args = Arguments::new(TypeKey::of::<()>(), vec![url.as_ref()]);

        match args.value::<u32>() {
            Err(ArgumentError::TypeMismatch { index, expected, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(expected, "u32");
            }
            other => panic!("Expected TypeMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn arguments_exhausted() {
        let mut args = Arguments::new(TypeKey::of::<()>(), vec![]);
        match args.instance::<String>() {
            Err(ArgumentError::Exhausted { index, declared, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(declared, 0);
            }
            other => panic!("Expected Exhausted, got: {other:?}"),
        }
    }
}
