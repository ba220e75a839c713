//! Type identification keys.
//!
//! [`TypeKey`] identifies both concrete definitions and the capabilities
//! (`dyn Trait`) they are indexed under. It wraps a [`TypeId`] and keeps the
//! type name around for diagnostics.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use wirebox_support::rendering::shorten_type_name;

/// Identifies a type in the container.
///
/// # Examples
/// ```
/// use wirebox_container::key::TypeKey;
///
/// trait Repository {}
///
/// let concrete = TypeKey::of::<String>();
/// assert_eq!(concrete.type_name(), "alloc::string::String");
///
/// let capability = TypeKey::of::<dyn Repository>();
/// assert_ne!(concrete, capability);
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates the key for type `T`. Works for trait objects too.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name without module paths.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }
}

// Two keys are equal when their TypeIds are; the name is only for display.
impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name)
    }
}
