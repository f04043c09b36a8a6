//! Core domain types for Mimic.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the engine.

mod failure;
mod ids;
mod invocation;
mod value;

pub use failure::DeclaredFailure;
pub use ids::{DispatchPath, MemberSignature, SeqNo, UnitId};
pub use invocation::Invocation;
pub use value::{ArgValue, ValueKind, render_args};
