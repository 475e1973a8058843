use crate::Position;
use serde::{Deserialize, Serialize};

/// One grid position and the state it currently holds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell<V> {
    pub state: V,
    position: Position,
}

impl<V> Cell<V> {
    /// Make a new cell holding `state` at `position`.
    pub fn new(state: V, position: impl Into<Position>) -> Self {
        Self {
            state,
            position: position.into(),
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// A cell at the same position holding `state`.
    #[inline]
    pub fn with_state(&self, state: V) -> Self {
        Self {
            state,
            position: self.position,
        }
    }
}
