//! Link-time collection of definitions.
//!
//! [`submit_definition!`](crate::submit_definition) records an
//! [`Injectable`](crate::definition::Injectable) type anywhere in the
//! program; [`Container::register_submitted`](crate::container::Container::register_submitted)
//! picks all of them up at once.

use crate::definition::Definition;

/// A definition recorded with [`submit_definition!`](crate::submit_definition).
pub struct Submission {
    definition: fn() -> Definition,
}

impl Submission {
    pub const fn new(definition: fn() -> Definition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> Definition {
        (self.definition)()
    }
}

inventory::collect!(Submission);

/// Every definition submitted so far, in no particular order.
pub fn submitted() -> Vec<Definition> {
    inventory::iter::<Submission>
        .into_iter()
        .map(Submission::definition)
        .collect()
}

/// Records an `Injectable` type for
/// [`Container::register_submitted`](crate::container::Container::register_submitted).
///
/// ```
/// use wirebox_container::prelude::*;
///
/// struct Clock;
///
/// impl Injectable for Clock {
///     fn definition() -> Definition {
///         Definition::of::<Clock>().constructor([], |_| Ok(Clock)).build()
///     }
/// }
///
/// wirebox_container::submit_definition!(Clock);
///
/// fn main() -> Result<()> {
///     let mut container = Container::new();
///     container.register_submitted()?;
///     let store = container.build()?;
///     assert!(store.contains::<Clock>());
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! submit_definition {
    ($ty:ty) => {
        $crate::inventory::submit! {
            $crate::submission::Submission::new(<$ty as $crate::definition::Injectable>::definition)
        }
    };
}
