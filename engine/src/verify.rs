//! Verification of claimed call sequences against the call log.
//!
//! One parameterized matcher realizes all four `exhaustive x in_order`
//! modes, so diagnostics stay consistent across modes:
//!
//! - exhaustive + ordered: positional equality, same length, same order;
//! - exhaustive + unordered: a bijection between invocations and patterns;
//! - non-exhaustive + ordered: the patterns appear in order as a
//!   subsequence, extra invocations ignored;
//! - non-exhaustive + unordered: each pattern is independently satisfied by
//!   at least one invocation (reuse across patterns allowed).
//!
//! Capture sinks inside a block's constraints are fed only for invocations
//! bound in a successful match, in call order; on failure they are left
//! untouched.

use mimic_types::{DispatchPath, Invocation, MemberSignature, UnitId, render_args};

use crate::constraint::{ArgSpec, Constraint, args_match, compose_args, feed_captures};
use crate::error::{MockError, VerificationFailure};

/// One expected call inside a verification block: unit + member +
/// per-argument constraints, optionally pinned to a dispatch path so one
/// block can mix synchronous and asynchronous expected calls.
#[derive(Debug, Clone)]
pub struct CallPattern {
    unit: UnitId,
    member: MemberSignature,
    constraints: Vec<Constraint>,
    path: Option<DispatchPath>,
}

impl CallPattern {
    /// Declare an expected call. Argument specs follow the same rules as
    /// stub registration: all bare values or all matchers, arity matching
    /// the member's.
    pub fn call(
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgSpec>,
    ) -> Result<Self, MockError> {
        let constraints = compose_args(&member, args)?;
        Ok(Self {
            unit,
            member,
            constraints,
            path: None,
        })
    }

    /// Only match invocations made on the given dispatch path.
    #[must_use]
    pub fn on_path(mut self, path: DispatchPath) -> Self {
        self.path = Some(path);
        self
    }

    pub(crate) fn unit(&self) -> UnitId {
        self.unit
    }

    fn accepts(&self, invocation: &Invocation) -> bool {
        self.unit == invocation.unit()
            && self.member == *invocation.member()
            && self.path.is_none_or(|path| path == invocation.path())
            && args_match(&self.constraints, invocation.args())
    }

    fn feed_captures(&self, invocation: &Invocation) {
        feed_captures(&self.constraints, invocation.args());
    }

    fn describe(&self) -> String {
        let specs: Vec<String> = self
            .constraints
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("{}.{}({})", self.unit, self.member.name(), specs.join(", "))
    }
}

/// An ordered list of expected invocation patterns plus the two independent
/// mode booleans.
///
/// The block's scope (which units' invocations it ranges over) defaults to
/// the units its patterns reference; [`VerificationBlock::scoped_to`] sets
/// it explicitly, which an empty exhaustive block — the "assert nothing was
/// called" idiom — needs.
#[derive(Debug, Clone, Default)]
pub struct VerificationBlock {
    patterns: Vec<CallPattern>,
    exhaustive: bool,
    in_order: bool,
    scope: Vec<UnitId>,
}

impl VerificationBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn expect(mut self, pattern: CallPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Every invocation in scope must be accounted for by the block.
    #[must_use]
    pub fn exhaustive(mut self) -> Self {
        self.exhaustive = true;
        self
    }

    /// Expected calls must match in the same relative order as recorded.
    #[must_use]
    pub fn in_order(mut self) -> Self {
        self.in_order = true;
        self
    }

    /// Restrict the block to the given unit's invocations.
    #[must_use]
    pub fn scoped_to(mut self, unit: UnitId) -> Self {
        if !self.scope.contains(&unit) {
            self.scope.push(unit);
        }
        self
    }

    /// Units whose invocations this block ranges over. Empty means the
    /// whole log (only possible for a block with no patterns and no
    /// explicit scope).
    #[must_use]
    pub fn scope(&self) -> Vec<UnitId> {
        if self.scope.is_empty() {
            let mut units: Vec<UnitId> = Vec::new();
            for pattern in &self.patterns {
                if !units.contains(&pattern.unit()) {
                    units.push(pattern.unit());
                }
            }
            units
        } else {
            self.scope.clone()
        }
    }

    pub(crate) fn patterns(&self) -> &[CallPattern] {
        &self.patterns
    }

    pub(crate) fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub(crate) fn is_in_order(&self) -> bool {
        self.in_order
    }
}

/// Match a block against the scoped invocation sequence.
///
/// On success, feeds capture sinks for every (pattern, invocation) binding
/// in call order and returns `Ok`. On failure, returns the structured
/// diagnostic with sinks untouched.
pub(crate) fn run(
    block: &VerificationBlock,
    invocations: &[Invocation],
) -> Result<(), VerificationFailure> {
    let patterns = block.patterns();
    let outcome = if block.is_in_order() {
        if block.is_exhaustive() {
            match_positional(patterns, invocations)
        } else {
            match_subsequence(patterns, invocations)
        }
    } else if block.is_exhaustive() {
        match_bijection(patterns, invocations)
    } else {
        match_existence(patterns, invocations)
    };

    match outcome {
        Ok(mut bindings) => {
            // Feed captures in call order, one entry per bound invocation.
            bindings.sort_by_key(|(_, inv)| invocations[*inv].seq());
            for (pattern, inv) in bindings {
                patterns[pattern].feed_captures(&invocations[inv]);
            }
            Ok(())
        }
        Err((unmatched, leftover)) => {
            let unmatched_patterns = unmatched
                .into_iter()
                .map(|i| patterns[i].describe())
                .collect();
            let leftover_invocations = if block.is_exhaustive() {
                leftover
                    .into_iter()
                    .map(|i| describe_invocation(&invocations[i]))
                    .collect()
            } else {
                Vec::new()
            };
            Err(VerificationFailure::new(
                block.is_exhaustive(),
                block.is_in_order(),
                block.scope(),
                unmatched_patterns,
                leftover_invocations,
            ))
        }
    }
}

fn describe_invocation(invocation: &Invocation) -> String {
    format!(
        "#{} {}.{}{} [{}]",
        invocation.seq(),
        invocation.unit(),
        invocation.member().name(),
        render_args(invocation.args()),
        invocation.path(),
    )
}

type Bindings = Vec<(usize, usize)>;
type Mismatch = (Vec<usize>, Vec<usize>);

/// exhaustive + in_order: position-for-position equality.
fn match_positional(
    patterns: &[CallPattern],
    invocations: &[Invocation],
) -> Result<Bindings, Mismatch> {
    let mut unmatched = Vec::new();
    let mut leftover = Vec::new();
    let mut bindings = Vec::new();
    for i in 0..patterns.len().max(invocations.len()) {
        match (patterns.get(i), invocations.get(i)) {
            (Some(pattern), Some(invocation)) if pattern.accepts(invocation) => {
                bindings.push((i, i));
            }
            (Some(_), Some(_)) => {
                unmatched.push(i);
                leftover.push(i);
            }
            (Some(_), None) => unmatched.push(i),
            (None, Some(_)) => leftover.push(i),
            (None, None) => unreachable!(),
        }
    }
    if unmatched.is_empty() && leftover.is_empty() {
        Ok(bindings)
    } else {
        Err((unmatched, leftover))
    }
}

/// non-exhaustive + in_order: patterns must appear, in order, as a
/// subsequence of the invocation sequence. Greedy earliest placement is
/// sufficient: any later placement of a pattern can be exchanged for the
/// earliest one without invalidating the rest.
fn match_subsequence(
    patterns: &[CallPattern],
    invocations: &[Invocation],
) -> Result<Bindings, Mismatch> {
    let mut bindings = Vec::new();
    let mut unmatched = Vec::new();
    let mut cursor = 0usize;
    for (p, pattern) in patterns.iter().enumerate() {
        let found = (cursor..invocations.len()).find(|&i| pattern.accepts(&invocations[i]));
        match found {
            Some(i) => {
                bindings.push((p, i));
                cursor = i + 1;
            }
            None => unmatched.push(p),
        }
    }
    if unmatched.is_empty() {
        Ok(bindings)
    } else {
        Err((unmatched, Vec::new()))
    }
}

/// exhaustive + unordered: a bijection between invocations and patterns.
/// Kuhn's augmenting-path matching over the acceptance matrix.
fn match_bijection(
    patterns: &[CallPattern],
    invocations: &[Invocation],
) -> Result<Bindings, Mismatch> {
    // owner[i] = pattern currently assigned to invocation i
    let mut owner: Vec<Option<usize>> = vec![None; invocations.len()];

    fn try_assign(
        pattern: usize,
        patterns: &[CallPattern],
        invocations: &[Invocation],
        owner: &mut [Option<usize>],
        visited: &mut [bool],
    ) -> bool {
        for i in 0..invocations.len() {
            if visited[i] || !patterns[pattern].accepts(&invocations[i]) {
                continue;
            }
            visited[i] = true;
            let displaced = owner[i];
            owner[i] = Some(pattern);
            match displaced {
                None => return true,
                Some(previous) => {
                    if try_assign(previous, patterns, invocations, owner, visited) {
                        return true;
                    }
                    owner[i] = Some(previous);
                }
            }
        }
        false
    }

    let mut unmatched = Vec::new();
    for p in 0..patterns.len() {
        let mut visited = vec![false; invocations.len()];
        if !try_assign(p, patterns, invocations, &mut owner, &mut visited) {
            unmatched.push(p);
        }
    }
    let leftover: Vec<usize> = (0..invocations.len())
        .filter(|&i| owner[i].is_none())
        .collect();

    if unmatched.is_empty() && leftover.is_empty() {
        Ok(owner
            .iter()
            .enumerate()
            .filter_map(|(i, assigned)| assigned.map(|p| (p, i)))
            .collect())
    } else {
        Err((unmatched, leftover))
    }
}

/// non-exhaustive + unordered: each pattern must be satisfied by at least
/// one invocation, independently; one invocation may satisfy several
/// patterns. Each pattern binds its earliest match.
fn match_existence(
    patterns: &[CallPattern],
    invocations: &[Invocation],
) -> Result<Bindings, Mismatch> {
    let mut bindings = Vec::new();
    let mut unmatched = Vec::new();
    for (p, pattern) in patterns.iter().enumerate() {
        match (0..invocations.len()).find(|&i| pattern.accepts(&invocations[i])) {
            Some(i) => bindings.push((p, i)),
            None => unmatched.push(p),
        }
    }
    if unmatched.is_empty() {
        Ok(bindings)
    } else {
        Err((unmatched, Vec::new()))
    }
}
