//! Declared behaviors and the per-member stub table.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use mimic_types::{ArgValue, DeclaredFailure, DispatchPath, MemberSignature, UnitId};

use crate::constraint::{Constraint, args_match};
use crate::error::MockError;

/// Boxed future produced by an asynchronous behavior.
pub type BehaviorFut = Pin<Box<dyn Future<Output = Result<ArgValue, DeclaredFailure>> + Send>>;

type SyncBody = Arc<dyn Fn(&[ArgValue]) -> Result<ArgValue, DeclaredFailure> + Send + Sync>;
type AsyncBody = Arc<dyn Fn(Vec<ArgValue>) -> BehaviorFut + Send + Sync>;

/// What a stub does once its constraints accept a call.
#[derive(Clone)]
pub enum Behavior {
    /// Return a fixed value.
    Returns(ArgValue),
    /// Compute a value from the argument vector. The body runs inside the
    /// call and may itself dispatch further calls synchronously.
    Computes(SyncBody),
    /// Compute a value asynchronously; only valid on the async path.
    ComputesAsync(AsyncBody),
    /// Raise a declared failure, propagated to the original caller.
    Raises(DeclaredFailure),
}

impl Behavior {
    #[must_use]
    pub fn returns(value: impl Into<serde_json::Value>) -> Self {
        Self::Returns(ArgValue::new(value))
    }

    /// Return an existing [`ArgValue`] handle (preserves identity).
    #[must_use]
    pub fn returns_value(value: ArgValue) -> Self {
        Self::Returns(value)
    }

    #[must_use]
    pub fn computes(
        body: impl Fn(&[ArgValue]) -> Result<ArgValue, DeclaredFailure> + Send + Sync + 'static,
    ) -> Self {
        Self::Computes(Arc::new(body))
    }

    #[must_use]
    pub fn computes_async(
        body: impl Fn(Vec<ArgValue>) -> BehaviorFut + Send + Sync + 'static,
    ) -> Self {
        Self::ComputesAsync(Arc::new(body))
    }

    #[must_use]
    pub fn raises(message: impl Into<String>) -> Self {
        Self::Raises(DeclaredFailure::new(message))
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returns(value) => write!(f, "Returns({value})"),
            Self::Computes(_) => write!(f, "Computes(..)"),
            Self::ComputesAsync(_) => write!(f, "ComputesAsync(..)"),
            Self::Raises(failure) => write!(f, "Raises({failure})"),
        }
    }
}

/// One declared (constraints -> behavior) rule for a member.
#[derive(Debug, Clone)]
pub(crate) struct StubDefinition {
    constraints: Vec<Constraint>,
    behavior: Behavior,
}

impl StubDefinition {
    pub(crate) fn new(constraints: Vec<Constraint>, behavior: Behavior) -> Self {
        Self {
            constraints,
            behavior,
        }
    }

    pub(crate) fn accepts(&self, args: &[ArgValue]) -> bool {
        args_match(&self.constraints, args)
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn behavior(&self) -> &Behavior {
        &self.behavior
    }
}

/// Stubs declared for one member, all on one dispatch path.
///
/// The first registration fixes the member's path; a later registration on
/// the other path is rejected.
#[derive(Debug)]
struct MemberStubs {
    path: DispatchPath,
    stubs: Vec<StubDefinition>,
}

/// Per unit-and-member ordered lists of declared behaviors.
#[derive(Debug, Default)]
pub(crate) struct StubTable {
    members: HashMap<(UnitId, MemberSignature), MemberStubs>,
}

impl StubTable {
    /// Append a stub to the member's list.
    pub(crate) fn register(
        &mut self,
        unit: UnitId,
        member: MemberSignature,
        stub: StubDefinition,
        path: DispatchPath,
    ) -> Result<(), MockError> {
        let entry = self
            .members
            .entry((unit, member.clone()))
            .or_insert_with(|| MemberStubs {
                path,
                stubs: Vec::new(),
            });
        if entry.path != path {
            return Err(MockError::DispatchPathMismatch {
                member: member.to_string(),
                registered: entry.path,
                invoked: path,
            });
        }
        entry.stubs.push(stub);
        Ok(())
    }

    /// The dispatch path the member was registered on, if any stub exists.
    pub(crate) fn path_of(&self, unit: UnitId, member: &MemberSignature) -> Option<DispatchPath> {
        self.members
            .get(&(unit, member.clone()))
            .map(|entry| entry.path)
    }

    /// Resolve the applicable stub: scan in reverse registration order and
    /// take the first whose full constraint list accepts the arguments.
    /// This realizes last-declaration-wins.
    pub(crate) fn resolve(
        &self,
        unit: UnitId,
        member: &MemberSignature,
        args: &[ArgValue],
    ) -> Option<&StubDefinition> {
        self.members
            .get(&(unit, member.clone()))?
            .stubs
            .iter()
            .rev()
            .find(|stub| stub.accepts(args))
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }
}
