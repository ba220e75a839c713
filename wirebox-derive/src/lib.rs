//! Derive macros for wirebox.
//!
//! Re-exports the procedural macros so the facade crate can expose them
//! next to the container types.

pub use wirebox_macros::Injectable;
