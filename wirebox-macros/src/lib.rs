//! Procedural macros for wirebox.
//!
//! Provides `#[derive(Injectable)]`, which writes a type's
//! `Definition` from its fields.

use proc_macro::TokenStream;

/// Injectable derive implementation.
mod injectable;

/// Derives `wirebox::Injectable` for a struct.
///
/// Each field becomes one constructor parameter, in declaration order:
/// - `Arc<T>` — satisfied by a built instance of `T` (a concrete type or a
///   `dyn Trait` capability)
/// - `#[inject(value = "key")] field: V` — satisfied by the named value
///   `key`, cloned into the field (a built `V` still takes priority)
/// - `#[inject(value = "key")] field: Arc<T>` — like `Arc<T>`, falling back
///   to the named value `key`
///
/// Capabilities are declared on the struct:
/// - `#[injectable(capability = "dyn Repository")]` — repeatable
///
/// ```ignore
/// #[derive(Injectable)]
/// #[injectable(capability = "dyn Repository")]
/// struct RepositoryStubImpl;
///
/// #[derive(Injectable)]
/// struct Service {
///     repository: Arc<dyn Repository>,
/// }
///
/// #[derive(Injectable)]
/// struct SmsClient {
///     #[inject(value = "smsUrl")]
///     url: String,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
