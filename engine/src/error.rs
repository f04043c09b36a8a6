//! Error taxonomy for the engine.
//!
//! Every engine-internal failure is surfaced to the invoking test context;
//! nothing is retried or recovered internally. Declared behavior failures
//! propagate to the original caller by design.

use std::fmt;

use thiserror::Error;

use mimic_types::{DeclaredFailure, DispatchPath, UnitId};

/// Errors raised by stub registration, dispatch, and verification.
#[derive(Debug, Error)]
pub enum MockError {
    /// Dispatch found no matching stub. Always fatal to the call; never
    /// silently defaulted.
    #[error("unmocked call: {unit}.{member}{args} has no matching stub")]
    UnmockedCall {
        unit: String,
        member: String,
        /// The received arguments, rendered verbatim.
        args: String,
    },

    /// A call mixed bare values and explicit constraints in one argument
    /// list. Raised at definition time.
    #[error(
        "arguments to `{member}` mix bare values and constraint matchers; use one or the other for the whole call"
    )]
    MixedArguments { member: String },

    /// A stub's constraint list arity differs from the member's arity.
    #[error("stub for `{member}` declares {given} argument matchers but the member takes {expected}")]
    ArityMismatch {
        member: String,
        expected: usize,
        given: usize,
    },

    /// Member registered on one dispatch path but used on the other.
    /// Raised at registration (conflicting re-registration) or at dispatch.
    #[error("`{member}` is {registered} but was used as {invoked}")]
    DispatchPathMismatch {
        member: String,
        registered: DispatchPath,
        invoked: DispatchPath,
    },

    /// The verifier could not satisfy the declared mode.
    #[error("{0}")]
    VerificationFailed(VerificationFailure),

    /// A stub's behavior intentionally raised; propagated unchanged.
    #[error(transparent)]
    Declared(#[from] DeclaredFailure),
}

/// Structured diagnostic for a failed verification.
///
/// Names each expected pattern that went unmatched and, for exhaustive
/// modes, the recorded invocations left unexplained by the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFailure {
    exhaustive: bool,
    in_order: bool,
    scope: Vec<UnitId>,
    unmatched_patterns: Vec<String>,
    leftover_invocations: Vec<String>,
}

impl VerificationFailure {
    #[must_use]
    pub(crate) fn new(
        exhaustive: bool,
        in_order: bool,
        scope: Vec<UnitId>,
        unmatched_patterns: Vec<String>,
        leftover_invocations: Vec<String>,
    ) -> Self {
        Self {
            exhaustive,
            in_order,
            scope,
            unmatched_patterns,
            leftover_invocations,
        }
    }

    #[must_use]
    pub fn unmatched_patterns(&self) -> &[String] {
        &self.unmatched_patterns
    }

    #[must_use]
    pub fn leftover_invocations(&self) -> &[String] {
        &self.leftover_invocations
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "verification failed ({}, {})",
            if self.exhaustive {
                "exhaustive"
            } else {
                "non-exhaustive"
            },
            if self.in_order { "in order" } else { "any order" },
        )?;
        if !self.scope.is_empty() {
            let units: Vec<String> = self.scope.iter().map(ToString::to_string).collect();
            write!(f, " over {}", units.join(", "))?;
        }
        if !self.unmatched_patterns.is_empty() {
            write!(f, "\nunmatched expected calls:")?;
            for pattern in &self.unmatched_patterns {
                write!(f, "\n  - {pattern}")?;
            }
        }
        if !self.leftover_invocations.is_empty() {
            write!(f, "\nrecorded calls not accounted for:")?;
            for invocation in &self.leftover_invocations {
                write!(f, "\n  - {invocation}")?;
            }
        }
        if self.unmatched_patterns.is_empty() && self.leftover_invocations.is_empty() {
            write!(f, "\nexpected calls could not be arranged in the required order")?;
        }
        Ok(())
    }
}
