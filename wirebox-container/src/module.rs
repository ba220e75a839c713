//! Modules — groups of related registrations.
//!
//! A module bundles the definitions and values of one area of an
//! application so the composition root stays short.
//!
//! # Examples
//! ```
//! use wirebox_container::prelude::*;
//!
//! #[derive(Debug)]
//! struct SmsClient {
//!     url: String,
//! }
//!
//! struct NotificationModule;
//!
//! impl Module for NotificationModule {
//!     fn register(&self, container: &mut Container) -> Result<()> {
//!         container.register_value("smsUrl", String::from("https://sms.io"))?;
//!         container.register_definition(
//!             Definition::of::<SmsClient>()
//!                 .constructor([Parameter::named::<String>("smsUrl")], |args| {
//!                     Ok(SmsClient { url: args.value()? })
//!                 }),
//!         )?;
//!         Ok(())
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.install(&NotificationModule)?;
//! let store = container.build()?;
//! assert_eq!(store.get::<SmsClient>().unwrap().url, "https://sms.io");
//! # Ok::<(), WireboxError>(())
//! ```

use crate::container::Container;
use crate::error::Result;

/// A set of registrations applied to a [`Container`] in one step.
pub trait Module {
    /// Registers this module's definitions and values.
    fn register(&self, container: &mut Container) -> Result<()>;

    /// Human-readable name, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
