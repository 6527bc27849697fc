//! Error types for the conversion pipeline.
//!
//! Structural problems are reported as [`Mismatch`] diagnostics accumulated
//! into [`Mismatches`], so a caller sees every offending path at once rather
//! than fixing documents one error at a time. Everything that can stop a
//! conversion is a variant of [`ConversionError`].

mod conversion;
mod mismatch;

pub use conversion::ConversionError;
pub use mismatch::{Mismatch, Mismatches};
