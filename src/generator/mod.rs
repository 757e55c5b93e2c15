use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Produces a finished minefield for a config. Implementations receive the
/// first-revealed cell up front so they can keep the opening move safe.
pub trait LayoutGenerator {
    fn generate(self, config: GameConfig) -> Minefield;
}

/// How much of the board around the first revealed cell stays mine-free.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirstMovePolicy {
    /// Only the first-revealed cell is kept mine-free.
    SafeCell,
    /// The first-revealed cell and all its neighbors are kept mine-free, so
    /// the opening reveal always cascades.
    SafeZone,
}

impl Default for FirstMovePolicy {
    fn default() -> Self {
        Self::SafeZone
    }
}
