//! The engine façade: unit creation, stub registration, dispatch, and
//! lifecycle.

use std::collections::HashMap;
use std::sync::Mutex;

use mimic_types::{ArgValue, DispatchPath, MemberSignature, UnitId, render_args};

use crate::constraint::{ArgSpec, compose_args, feed_captures};
use crate::error::MockError;
use crate::registry::CallRegistry;
use crate::stub::{Behavior, StubDefinition, StubTable};
use crate::verify::VerificationBlock;

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) units: HashMap<UnitId, String>,
    pub(crate) stubs: StubTable,
    pub(crate) registry: CallRegistry,
    next_unit: u64,
}

/// One mocking engine instance, normally scoped to one test case.
///
/// Owns the stub table and call log for every unit it created. Methods take
/// `&self`; an internal mutex makes each operation atomic, but the engine
/// performs no further coordination — concurrent dispatch from multiple
/// threads onto the same unit is undefined unless the embedding test
/// synchronizes externally. The lock is never held while a behavior body or
/// an awaited future runs, so behaviors may dispatch further calls.
#[derive(Debug, Default)]
pub struct Mocker {
    state: Mutex<EngineState>,
}

impl Mocker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a fresh unit identity bound to this engine instance.
    /// `debug_name` appears in diagnostics (e.g. "db").
    pub fn create_unit(&self, debug_name: impl Into<String>) -> UnitId {
        let mut state = self.lock();
        let unit = UnitId::new(state.next_unit);
        state.next_unit += 1;
        let name = debug_name.into();
        tracing::debug!(%unit, %name, "created unit");
        state.units.insert(unit, name);
        unit
    }

    /// Declare a stub: when a call to `member` on `unit` satisfies `args`,
    /// run `behavior`. Later declarations win over earlier ones.
    ///
    /// Fails on arity mismatch, on a bare/matcher argument mix, when the
    /// member was already registered on the other dispatch path, or when an
    /// async behavior is registered on the sync path.
    pub fn register_stub(
        &self,
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgSpec>,
        behavior: Behavior,
        path: DispatchPath,
    ) -> Result<(), MockError> {
        let constraints = compose_args(&member, args)?;
        if matches!(behavior, Behavior::ComputesAsync(_)) && path == DispatchPath::Sync {
            return Err(MockError::DispatchPathMismatch {
                member: member.to_string(),
                registered: DispatchPath::Sync,
                invoked: DispatchPath::Async,
            });
        }
        tracing::debug!(%unit, %member, %path, ?behavior, "registering stub");
        self.lock()
            .stubs
            .register(unit, member, StubDefinition::new(constraints, behavior), path)
    }

    /// Intercept a synchronous call: log it, resolve the applicable stub,
    /// and execute its behavior.
    pub fn dispatch(
        &self,
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgValue>,
    ) -> Result<ArgValue, MockError> {
        let resolved = self.log_and_resolve(unit, &member, &args, DispatchPath::Sync)?;
        match resolved.behavior() {
            Behavior::Returns(value) => Ok(value.clone()),
            Behavior::Computes(body) => body(&args).map_err(MockError::Declared),
            Behavior::Raises(failure) => Err(MockError::Declared(failure.clone())),
            // Unreachable through the public API: registration refuses an
            // async behavior on the sync path.
            Behavior::ComputesAsync(_) => Err(MockError::DispatchPathMismatch {
                member: member.to_string(),
                registered: DispatchPath::Async,
                invoked: DispatchPath::Sync,
            }),
        }
    }

    /// Intercept an asynchronous call. The behavior runs to completion
    /// within the caller's own suspension context; the engine spawns
    /// nothing and performs no scheduling of its own.
    pub async fn dispatch_async(
        &self,
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgValue>,
    ) -> Result<ArgValue, MockError> {
        let resolved = self.log_and_resolve(unit, &member, &args, DispatchPath::Async)?;
        match resolved.behavior() {
            Behavior::Returns(value) => Ok(value.clone()),
            Behavior::Computes(body) => body(&args).map_err(MockError::Declared),
            Behavior::Raises(failure) => Err(MockError::Declared(failure.clone())),
            Behavior::ComputesAsync(body) => body(args).await.map_err(MockError::Declared),
        }
    }

    /// Shared dispatch front half: record the invocation (before any
    /// failure can be raised), enforce path agreement, resolve the stub in
    /// reverse registration order, and feed capture sinks of the accepted
    /// stub before its behavior executes.
    fn log_and_resolve(
        &self,
        unit: UnitId,
        member: &MemberSignature,
        args: &[ArgValue],
        path: DispatchPath,
    ) -> Result<StubDefinition, MockError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let seq = state
            .registry
            .record(unit, member.clone(), args.to_vec(), path);

        if let Some(registered) = state.stubs.path_of(unit, member)
            && registered != path
        {
            tracing::debug!(%unit, %member, %seq, "dispatch path mismatch");
            return Err(MockError::DispatchPathMismatch {
                member: member.to_string(),
                registered,
                invoked: path,
            });
        }

        let Some(stub) = state.stubs.resolve(unit, member, args) else {
            tracing::debug!(%unit, %member, %seq, "unmocked call");
            return Err(MockError::UnmockedCall {
                unit: state
                    .units
                    .get(&unit)
                    .cloned()
                    .unwrap_or_else(|| unit.to_string()),
                member: member.name().to_string(),
                args: render_args(args),
            });
        };
        tracing::trace!(%unit, %member, %seq, "stub resolved");
        let stub = stub.clone();
        // Captures see the current call before the behavior body runs.
        feed_captures(stub.constraints(), args);
        Ok(stub)
    }

    /// Match a claimed call block against the log (restricted to the
    /// block's scope) under its `exhaustive`/`in_order` mode.
    pub fn verify(&self, block: &VerificationBlock) -> Result<(), MockError> {
        let scope = block.scope();
        let invocations = self.lock().registry.scoped(&scope);
        match crate::verify::run(block, &invocations) {
            Ok(()) => Ok(()),
            Err(failure) => {
                tracing::debug!(%failure, "verification failed");
                Err(MockError::VerificationFailed(failure))
            }
        }
    }

    /// Clear stubs and log. Units and sequence numbering survive.
    pub fn reset(&self) {
        let mut state = self.lock();
        tracing::debug!("reset: clearing stubs and call log");
        state.stubs.clear();
        state.registry.clear();
    }

    /// Clear the log only; declared stubs stay in force.
    pub fn clear_calls(&self) {
        tracing::debug!("clearing call log");
        self.lock().registry.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine lock poisoned")
    }
}

/// Injection seam for generated setup plumbing.
///
/// A generated implementation assigns freshly created unit ids (via
/// [`Mocker::create_unit`]) into each field of the structure marked for
/// mock injection. Implementations must be idempotent across repeated test
/// setup: injecting twice replaces the ids rather than accumulating state.
pub trait MockInject {
    fn inject_mocks(&mut self, mocker: &Mocker);
}
