//! Argument constraints, capture sinks, and argument-list composition.
//!
//! A [`Constraint`] is a named predicate over one argument value. Evaluation
//! is pure: it never touches the capture sink. Capture population is an
//! explicit second step performed only once a whole call has been accepted,
//! so sinks reflect matched calls only, never calls merely inspected during
//! a search.

use std::fmt;
use std::sync::{Arc, Mutex};

use mimic_types::{ArgValue, MemberSignature, ValueKind};

use crate::error::MockError;

/// Predicate applied by a [`Constraint`].
#[derive(Clone)]
enum Predicate {
    Any,
    IsNull,
    NotNull,
    Eq(ArgValue),
    Ne(ArgValue),
    Same(ArgValue),
    NotSame(ArgValue),
    OfKind(ValueKind),
    Custom(Arc<dyn Fn(&ArgValue) -> Result<(), String> + Send + Sync>),
}

/// A named predicate over a single argument value, with an optional capture
/// sink and a description used in failure diagnostics.
#[derive(Clone)]
pub struct Constraint {
    predicate: Predicate,
    description: String,
    captor: Option<Captor>,
}

impl Constraint {
    fn new(predicate: Predicate, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
            captor: None,
        }
    }

    /// Attach a capture sink. Accepted values are appended to it, in call
    /// order, whenever a call this constraint belongs to is matched.
    #[must_use]
    pub fn capturing(mut self, captor: &Captor) -> Self {
        self.captor = Some(captor.clone());
        self
    }

    /// Evaluate the predicate. Pure: the capture sink is not touched.
    pub fn eval(&self, value: &ArgValue) -> Result<(), String> {
        let ok = match &self.predicate {
            Predicate::Any => true,
            Predicate::IsNull => value.is_null(),
            Predicate::NotNull => !value.is_null(),
            Predicate::Eq(expected) => value == expected,
            Predicate::Ne(expected) => value != expected,
            Predicate::Same(expected) => value.is_same(expected),
            Predicate::NotSame(expected) => !value.is_same(expected),
            Predicate::OfKind(kind) => value.kind() == *kind,
            Predicate::Custom(check) => return check(value),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{value} failed: {}", self.description))
        }
    }

    /// Record an accepted value into the sink, if one is attached.
    pub(crate) fn feed_capture(&self, value: &ArgValue) {
        if let Some(captor) = &self.captor {
            captor.push(value.clone());
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("description", &self.description)
            .field("captures", &self.captor.is_some())
            .finish()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

// ============================================================================
// Built-in constraints
// ============================================================================

/// Accepts any value.
#[must_use]
pub fn any() -> Constraint {
    Constraint::new(Predicate::Any, "any value")
}

/// Accepts only null.
#[must_use]
pub fn is_null() -> Constraint {
    Constraint::new(Predicate::IsNull, "is null")
}

/// Accepts anything but null.
#[must_use]
pub fn not_null() -> Constraint {
    Constraint::new(Predicate::NotNull, "is not null")
}

/// Accepts values equal (by value) to `expected`.
#[must_use]
pub fn eq(expected: impl Into<serde_json::Value>) -> Constraint {
    let expected = ArgValue::new(expected);
    let description = format!("is equal to {expected}");
    Constraint::new(Predicate::Eq(expected), description)
}

/// Accepts values not equal (by value) to `expected`.
#[must_use]
pub fn ne(expected: impl Into<serde_json::Value>) -> Constraint {
    let expected = ArgValue::new(expected);
    let description = format!("is not equal to {expected}");
    Constraint::new(Predicate::Ne(expected), description)
}

/// Accepts exactly the given allocation (reference identity).
#[must_use]
pub fn same(expected: &ArgValue) -> Constraint {
    let description = format!("is the same instance as {expected}");
    Constraint::new(Predicate::Same(expected.clone()), description)
}

/// Rejects exactly the given allocation (reference non-identity).
#[must_use]
pub fn not_same(expected: &ArgValue) -> Constraint {
    let description = format!("is not the same instance as {expected}");
    Constraint::new(Predicate::NotSame(expected.clone()), description)
}

/// Accepts values of the given runtime kind.
#[must_use]
pub fn of_kind(kind: ValueKind) -> Constraint {
    Constraint::new(Predicate::OfKind(kind), format!("is of type {kind}"))
}

/// Custom predicate. Return `Err(reason)` to reject a value; the reason
/// appears in diagnostics alongside `description`.
#[must_use]
pub fn satisfies(
    description: impl Into<String>,
    check: impl Fn(&ArgValue) -> Result<(), String> + Send + Sync + 'static,
) -> Constraint {
    Constraint::new(Predicate::Custom(Arc::new(check)), description)
}

// ============================================================================
// Captor
// ============================================================================

/// An ordered, append-only capture sink owned by the test.
///
/// Cloning shares the sink, so one `Captor` may be attached to several
/// constraints across several stubs and accumulate values across calls in
/// call order. During dispatch the append happens before the stub's behavior
/// runs, so a behavior body calling [`Captor::last`] observes the current
/// call's argument.
#[derive(Debug, Clone, Default)]
pub struct Captor {
    values: Arc<Mutex<Vec<ArgValue>>>,
}

impl Captor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, value: ArgValue) {
        self.values.lock().expect("captor lock poisoned").push(value);
    }

    /// The most recently appended value, if any.
    #[must_use]
    pub fn last(&self) -> Option<ArgValue> {
        self.values
            .lock()
            .expect("captor lock poisoned")
            .last()
            .cloned()
    }

    /// Snapshot of everything captured so far, in call order.
    #[must_use]
    pub fn values(&self) -> Vec<ArgValue> {
        self.values.lock().expect("captor lock poisoned").clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().expect("captor lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Argument lists
// ============================================================================

/// One argument position in a stub or verification declaration: either a
/// bare value (implicit equality) or an explicit constraint.
#[derive(Debug, Clone)]
pub enum ArgSpec {
    Bare(ArgValue),
    Matcher(Constraint),
}

impl From<Constraint> for ArgSpec {
    fn from(constraint: Constraint) -> Self {
        Self::Matcher(constraint)
    }
}

impl From<ArgValue> for ArgSpec {
    fn from(value: ArgValue) -> Self {
        Self::Bare(value)
    }
}

/// Shorthand for a bare argument in stub/verification declarations.
#[must_use]
pub fn val(value: impl Into<serde_json::Value>) -> ArgSpec {
    ArgSpec::Bare(ArgValue::new(value))
}

/// Compose an argument-spec list into a constraint list for `member`.
///
/// A call's arguments are either all bare values or all explicit matchers;
/// a mix is rejected here, at definition time. Bare values become equality
/// constraints. Arity must equal the member's arity.
pub(crate) fn compose_args(
    member: &MemberSignature,
    specs: Vec<ArgSpec>,
) -> Result<Vec<Constraint>, MockError> {
    if specs.len() != member.arity() {
        return Err(MockError::ArityMismatch {
            member: member.to_string(),
            expected: member.arity(),
            given: specs.len(),
        });
    }
    let bare = specs.iter().filter(|s| matches!(s, ArgSpec::Bare(_))).count();
    if bare != 0 && bare != specs.len() {
        return Err(MockError::MixedArguments {
            member: member.to_string(),
        });
    }
    Ok(specs
        .into_iter()
        .map(|spec| match spec {
            ArgSpec::Bare(value) => {
                let description = format!("is equal to {value}");
                Constraint::new(Predicate::Eq(value), description)
            }
            ArgSpec::Matcher(constraint) => constraint,
        })
        .collect())
}

/// Evaluate a composed constraint list against an argument vector.
///
/// Succeeds only if every positional constraint succeeds. Pure with respect
/// to capture sinks.
pub(crate) fn args_match(constraints: &[Constraint], args: &[ArgValue]) -> bool {
    constraints.len() == args.len()
        && constraints
            .iter()
            .zip(args)
            .all(|(constraint, arg)| constraint.eval(arg).is_ok())
}

/// Append each argument of an accepted call to its constraint's sink.
pub(crate) fn feed_captures(constraints: &[Constraint], args: &[ArgValue]) {
    for (constraint, arg) in constraints.iter().zip(args) {
        constraint.feed_capture(arg);
    }
}
