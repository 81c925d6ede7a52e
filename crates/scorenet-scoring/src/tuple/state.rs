use std::fmt;

/// Lifecycle state of a tuple.
///
/// Legal transitions:
///
/// ```text
/// Dead -> Creating -> Ok            insert
/// Ok -> Updating -> Ok              update
/// Ok -> Dying -> Dead               retract
/// Creating -> Aborting -> Dead      retract before the insert propagated
/// Updating -> Dying -> Dead         retract before the update propagated
/// ```
///
/// Only `Ok` tuples have been observed by downstream nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleState {
    Dead,
    Creating,
    Ok,
    Updating,
    Dying,
    Aborting,
}

impl TupleState {
    /// Returns true if the tuple is queued for propagation.
    pub fn is_dirty(self) -> bool {
        !matches!(self, TupleState::Ok | TupleState::Dead)
    }

    /// Returns true if the tuple is being removed.
    pub fn is_dying(self) -> bool {
        matches!(self, TupleState::Dying | TupleState::Aborting)
    }

    /// Returns true if downstream nodes have seen (or will see) this tuple.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TupleState::Creating | TupleState::Ok | TupleState::Updating
        )
    }
}

impl fmt::Display for TupleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TupleState::Dead => "DEAD",
            TupleState::Creating => "CREATING",
            TupleState::Ok => "OK",
            TupleState::Updating => "UPDATING",
            TupleState::Dying => "DYING",
            TupleState::Aborting => "ABORTING",
        };
        f.write_str(name)
    }
}
