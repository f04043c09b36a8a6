use std::fmt;

/// Identity of one behavioral unit (mock instance) within an engine.
///
/// Allocated by the engine, monotonically increasing per engine instance.
/// Units own no state themselves; everything lives in the engine, keyed by
/// this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Sequence number of a recorded invocation.
///
/// Strictly increasing within one engine session and never reused; clearing
/// the call log does not reset the counter, so pre/post-clear ordering stays
/// meaningful in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SeqNo(u64);

impl SeqNo {
    #[must_use]
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeqNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a member (method or property accessor) on a unit.
///
/// Name plus arity; stable for the unit's lifetime. A property getter and
/// setter share a name but differ in arity (0 and 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MemberSignature {
    name: String,
    arity: usize,
}

impl MemberSignature {
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Which call path a member uses.
///
/// A member registered on one path may only be dispatched on that path;
/// the mismatch is a hard error, not a silent miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DispatchPath {
    Sync,
    Async,
}

impl fmt::Display for DispatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "synchronous"),
            Self::Async => write!(f, "asynchronous"),
        }
    }
}
