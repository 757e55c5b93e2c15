use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell. The adjacency count travels inside
/// `Open`, so a cell can never be open and flagged at the same time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Closed,
    Open(u8),
    Flagged,
}

impl CellState {
    pub const fn is_unopened(self) -> bool {
        matches!(self, Self::Closed | Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Closed
    }
}
