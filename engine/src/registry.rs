//! Append-only, sequence-numbered log of invocations.

use mimic_types::{ArgValue, DispatchPath, Invocation, MemberSignature, SeqNo, UnitId};

/// The engine's call log since the last reset/clear.
///
/// Entries are immutable once recorded and the log never shrinks except
/// through [`CallRegistry::clear`]. The sequence counter is session-scoped:
/// clearing the log does not rewind it, so sequence numbers are never
/// reused.
#[derive(Debug, Default)]
pub(crate) struct CallRegistry {
    log: Vec<Invocation>,
    next_seq: u64,
}

impl CallRegistry {
    /// Record a call. Every dispatch lands here, matched or not, before any
    /// resolution failure can be raised.
    pub(crate) fn record(
        &mut self,
        unit: UnitId,
        member: MemberSignature,
        args: Vec<ArgValue>,
        path: DispatchPath,
    ) -> SeqNo {
        let seq = SeqNo::new(self.next_seq);
        self.next_seq += 1;
        self.log.push(Invocation::new(unit, member, args, seq, path));
        seq
    }

    /// Snapshot of the log restricted to the given units, in call order.
    /// An empty unit list means no restriction.
    pub(crate) fn scoped(&self, units: &[UnitId]) -> Vec<Invocation> {
        self.log
            .iter()
            .filter(|call| units.is_empty() || units.contains(&call.unit()))
            .cloned()
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.log.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.log.len()
    }
}
