//! Mimic engine: runtime call interception, stubbing, and verification.
//!
//! The engine underlies a test-double framework. Concrete mock
//! representations (generated, hand-written, or proxied) forward every
//! member call through one narrow contract — unit id, member signature,
//! argument vector — and the engine records the call, resolves the
//! applicable stub in last-declaration-wins order, and executes it. There
//! is no relaxed mode: a call with no matching stub is a hard
//! [`MockError::UnmockedCall`]. Test code later verifies claimed call
//! sequences against the log under four order/exhaustiveness modes.
//!
//! # Concurrency contract
//!
//! One [`Mocker`] is meant to be owned by one test case and mutated only by
//! that test's call flow. Individual operations are atomic, but the engine
//! does not coordinate concurrent dispatch from multiple threads onto the
//! same unit; embedding tests must synchronize externally. The asynchronous
//! dispatch path introduces no parallelism: a behavior runs to completion
//! within the caller's own suspension context and the engine never spawns.
//!
//! There is no cancellation or timeout inside the engine; a hung behavior
//! hangs the call. The log grows until an explicit [`Mocker::reset`] or
//! [`Mocker::clear_calls`], expected between test cases.

mod constraint;
mod error;
mod mocker;
mod property;
mod registry;
mod stub;
mod verify;

pub use constraint::{
    ArgSpec, Captor, Constraint, any, eq, is_null, ne, not_null, not_same, of_kind, same,
    satisfies, val,
};
pub use error::{MockError, VerificationFailure};
pub use mocker::{MockInject, Mocker};
pub use property::PropertyCell;
pub use stub::{Behavior, BehaviorFut};
pub use verify::{CallPattern, VerificationBlock};

// Re-export the domain types the public API is written in terms of.
pub use mimic_types::{
    ArgValue, DeclaredFailure, DispatchPath, Invocation, MemberSignature, SeqNo, UnitId,
    ValueKind,
};
