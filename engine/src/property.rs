//! Stateful backing for settable properties.
//!
//! A backed property routes its getter and setter through the normal
//! dispatch path, so writes are recorded as invocations and reads observe
//! the latest write. The backing cell is independent per unit instance.

use std::sync::{Arc, Mutex};

use mimic_types::{ArgValue, DispatchPath, MemberSignature, UnitId};

use crate::constraint::any;
use crate::error::MockError;
use crate::mocker::Mocker;
use crate::stub::Behavior;

/// Handle on the mutable cell behind a backed property. Cloning shares the
/// cell. Tests may read it directly instead of dispatching the getter.
#[derive(Debug, Clone)]
pub struct PropertyCell {
    value: Arc<Mutex<ArgValue>>,
}

impl PropertyCell {
    fn new(initial: ArgValue) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
        }
    }

    #[must_use]
    pub fn get(&self) -> ArgValue {
        self.value.lock().expect("property cell lock poisoned").clone()
    }

    fn set(&self, value: ArgValue) {
        *self.value.lock().expect("property cell lock poisoned") = value;
    }
}

impl Mocker {
    /// Back the property `name` on `unit` with a mutable cell holding
    /// `initial`.
    ///
    /// Registers a getter stub (`name`, arity 0) reading the cell and a
    /// setter stub (`name`, arity 1) writing it. Setter calls are recorded
    /// like any invocation, always complete without error, and return null
    /// to the caller. Backed properties use the synchronous dispatch path.
    pub fn back_property(
        &self,
        unit: UnitId,
        name: &str,
        initial: impl Into<serde_json::Value>,
    ) -> Result<PropertyCell, MockError> {
        let cell = PropertyCell::new(ArgValue::new(initial));

        let getter_cell = cell.clone();
        self.register_stub(
            unit,
            MemberSignature::new(name, 0),
            vec![],
            Behavior::computes(move |_| Ok(getter_cell.get())),
            DispatchPath::Sync,
        )?;

        let setter_cell = cell.clone();
        self.register_stub(
            unit,
            MemberSignature::new(name, 1),
            vec![any().into()],
            Behavior::computes(move |args| {
                setter_cell.set(args[0].clone());
                Ok(ArgValue::null())
            }),
            DispatchPath::Sync,
        )?;

        Ok(cell)
    }
}
