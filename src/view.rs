use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a renderer is allowed to see at one cell. Mine positions only appear
/// once the game is over.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewCell {
    Closed,
    Open(u8),
    Flagged,
    /// A mine shown at the end of a lost game.
    Mine,
    /// The mine whose reveal lost the game.
    ExplodedMine,
    /// A flag that turned out to sit on a safe cell.
    Misflagged,
}

/// Whole-board projection of an engine for rendering: mine data is gated
/// until the game ends, and endgame boards carry the usual presentation
/// extras (every mine shown after a loss, remaining mines flagged on a win).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    size: Coord2,
    status: GameStatus,
    cells: Array2<ViewCell>,
}

impl BoardView {
    pub fn from_engine(engine: &Engine) -> Self {
        let size = engine.size();
        let mut cells = Array2::from_elem(size.nd(), ViewCell::Closed);

        let (rows, cols) = size;
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                cells[coords.nd()] = view_cell(engine, coords);
            }
        }

        Self {
            size,
            status: engine.status(),
            cells,
        }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn cell(&self, coords: Coord2) -> Option<ViewCell> {
        let (rows, cols) = self.size;
        (coords.0 < rows && coords.1 < cols).then(|| self.cells[coords.nd()])
    }
}

fn view_cell(engine: &Engine, coords: Coord2) -> ViewCell {
    let cell = engine.cell_at(coords);

    match engine.status() {
        GameStatus::Pending | GameStatus::InProgress => plain(cell),
        GameStatus::Won => {
            if engine.has_mine_at(coords) {
                // unflagged mines display as flags on a won board
                ViewCell::Flagged
            } else {
                plain(cell)
            }
        }
        GameStatus::Lost => {
            if engine.exploded_at() == Some(coords) {
                return ViewCell::ExplodedMine;
            }
            match (engine.has_mine_at(coords), cell) {
                (true, CellState::Flagged) => ViewCell::Flagged,
                (true, _) => ViewCell::Mine,
                (false, CellState::Flagged) => ViewCell::Misflagged,
                (false, other) => plain(other),
            }
        }
    }
}

const fn plain(cell: CellState) -> ViewCell {
    match cell {
        CellState::Closed => ViewCell::Closed,
        CellState::Open(count) => ViewCell::Open(count),
        CellState::Flagged => ViewCell::Flagged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(size: Coord2, mines: &[Coord2]) -> Engine {
        Engine::from_minefield(Minefield::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn mines_stay_hidden_while_the_game_runs() {
        let mut engine = fixed((2, 2), &[(0, 0)]);
        engine.reveal((1, 1));

        let view = BoardView::from_engine(&engine);

        assert_eq!(view.status(), GameStatus::InProgress);
        assert_eq!(view.cell((0, 0)), Some(ViewCell::Closed));
        assert_eq!(view.cell((1, 1)), Some(ViewCell::Open(1)));
        assert_eq!(view.cell((2, 0)), None);
    }

    #[test]
    fn lost_board_distinguishes_exploded_mine_and_misflag() {
        let mut engine = fixed((2, 2), &[(0, 0), (0, 1)]);
        engine.reveal((1, 1));
        engine.toggle_flag((1, 0));
        engine.reveal((0, 0));
        assert_eq!(engine.status(), GameStatus::Lost);

        let view = BoardView::from_engine(&engine);

        assert_eq!(view.cell((0, 0)), Some(ViewCell::ExplodedMine));
        assert_eq!(view.cell((0, 1)), Some(ViewCell::Mine));
        assert_eq!(view.cell((1, 0)), Some(ViewCell::Misflagged));
        assert_eq!(view.cell((1, 1)), Some(ViewCell::Open(2)));
    }

    #[test]
    fn won_board_flags_the_remaining_mines() {
        let mut engine = fixed((2, 1), &[(0, 0)]);
        assert_eq!(engine.reveal((1, 0)).outcome, RevealOutcome::Won);

        let view = BoardView::from_engine(&engine);

        assert_eq!(view.status(), GameStatus::Won);
        assert_eq!(view.cell((0, 0)), Some(ViewCell::Flagged));
        assert_eq!(view.cell((1, 0)), Some(ViewCell::Open(1)));
    }

    #[test]
    fn correctly_flagged_mine_stays_flagged_after_a_loss() {
        let mut engine = fixed((2, 2), &[(0, 0), (0, 1)]);
        engine.reveal((1, 1));
        engine.toggle_flag((0, 1));
        engine.reveal((0, 0));

        let view = BoardView::from_engine(&engine);

        assert_eq!(view.cell((0, 1)), Some(ViewCell::Flagged));
        assert_eq!(view.cell((1, 0)), Some(ViewCell::Closed));
    }
}
