//! # wirebox — a small generation-based IoC container
//!
//! Register definitions and named values on a [`Container`], then
//! [`build`](Container::build) it. The build constructs everything in
//! generations: a definition is built once each of its parameters can be
//! satisfied by an instance built earlier or by a named value.
//!
//! ```
//! use std::sync::Arc;
//! use wirebox::prelude::*;
//! use wirebox::Injectable;
//!
//! trait Repository: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(capability = "dyn Repository")]
//! struct RepositoryStubImpl;
//!
//! impl Repository for RepositoryStubImpl {
//!     fn name(&self) -> &str {
//!         "stub"
//!     }
//! }
//!
//! #[derive(Injectable)]
//! struct Service {
//!     repository: Arc<dyn Repository>,
//! }
//!
//! fn main() -> Result<()> {
//!     let mut container = Container::new();
//!     container.register::<Service>()?.register::<RepositoryStubImpl>()?;
//!
//!     let store = container.build()?;
//!     let service = store.resolve::<Service>()?;
//!     assert_eq!(service.repository.name(), "stub");
//!     assert_eq!(store.generation_of::<Service>(), Some(2));
//!     Ok(())
//! }
//! ```

pub use wirebox_container::*;
pub use wirebox_derive::*;
pub use wirebox_support::*;
