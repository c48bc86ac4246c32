//! Request middleware.
//!
//! Currently only [`Trace`], which scopes every request to a correlation id.

pub mod trace;

pub use trace::Trace;
