//! # Wirebox Support
//!
//! Shared helpers for the wirebox crates.
//!
//! This crate provides:
//! - Text rendering for error messages and build reports

pub mod rendering;
