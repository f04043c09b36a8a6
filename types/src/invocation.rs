use std::fmt;

use crate::{ArgValue, DispatchPath, MemberSignature, SeqNo, UnitId, render_args};

/// One recorded call against a unit's member.
///
/// Created by the dispatcher on every call, matched or not, and immutable
/// once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    unit: UnitId,
    member: MemberSignature,
    args: Vec<ArgValue>,
    seq: SeqNo,
    path: DispatchPath,
}

impl Invocation {
    #[must_use]
    pub fn new(
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgValue>,
        seq: SeqNo,
        path: DispatchPath,
    ) -> Self {
        Self {
            unit,
            member,
            args,
            seq,
            path,
        }
    }

    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    #[must_use]
    pub fn member(&self) -> &MemberSignature {
        &self.member
    }

    #[must_use]
    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    #[must_use]
    pub fn seq(&self) -> SeqNo {
        self.seq
    }

    #[must_use]
    pub fn path(&self) -> DispatchPath {
        self.path
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}.{}{}",
            self.seq,
            self.unit,
            self.member.name(),
            render_args(&self.args)
        )
    }
}
