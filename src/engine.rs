use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    Pending,
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Result of a reveal or chord call: the merged outcome plus every cell whose
/// state changed, in reveal order, for incremental re-rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealUpdate {
    pub outcome: RevealOutcome,
    pub changed: Vec<Coord2>,
}

impl RevealUpdate {
    fn unchanged() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            changed: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    config: GameConfig,
    seed: u64,
    first_move: FirstMovePolicy,
    minefield: Option<Minefield>,
    board: Array2<CellState>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    status: GameStatus,
    exploded_at: Option<Coord2>,
}

impl Engine {
    /// Engine with deferred mine placement: the minefield is generated on the
    /// first reveal, so the opening move can never hit a mine.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let config = GameConfig::new(config.size, config.mines);
        Self {
            config,
            seed,
            first_move: FirstMovePolicy::default(),
            minefield: None,
            board: Array2::default(config.size.nd()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            status: GameStatus::default(),
            exploded_at: None,
        }
    }

    /// Engine over a fixed, already-placed minefield. The first reveal still
    /// moves the game out of `Pending`, but no generation happens.
    pub fn from_minefield(minefield: Minefield) -> Self {
        let config = minefield.game_config();
        Self {
            config,
            seed: 0,
            first_move: FirstMovePolicy::default(),
            minefield: Some(minefield),
            board: Array2::default(config.size.nd()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            status: GameStatus::default(),
            exploded_at: None,
        }
    }

    pub fn with_first_move(mut self, policy: FirstMovePolicy) -> Self {
        self.first_move = policy;
        self
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield
            .as_ref()
            .map_or(self.config.mines, Minefield::mine_count)
    }

    /// How many mines are not flagged yet; negative when the player has
    /// placed more flags than there are mines.
    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flagged_count.0
    }

    pub fn cell_at(&self, coords: Coord2) -> CellState {
        self.board[coords.nd()]
    }

    /// Whether a mine sits at `coords`; always `false` before placement.
    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.minefield
            .as_ref()
            .map_or(false, |field| field.contains_mine(coords))
    }

    pub fn exploded_at(&self) -> Option<Coord2> {
        self.exploded_at
    }

    pub fn can_chord_at(&self, coords: Coord2) -> bool {
        let Some(coords) = self.checked(coords) else {
            return false;
        };

        if !matches!(self.status, GameStatus::InProgress) {
            return false;
        }

        match self.cell_at(coords) {
            CellState::Open(count) if count > 0 => count == self.count_flagged_neighbors(coords),
            _ => false,
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealUpdate {
        let mut update = RevealUpdate::unchanged();
        let Some(coords) = self.checked(coords) else {
            return update;
        };

        if self.status.is_finished() || !matches!(self.cell_at(coords), CellState::Closed) {
            return update;
        }

        self.ensure_mines_placed(coords);
        update.outcome = self.reveal_single_cell(coords, &mut update.changed);
        update
    }

    /// Opens every non-flagged closed neighbor of an open numbered cell whose
    /// flagged-neighbor count matches its number. Wrongly placed flags make
    /// this lose the game, exactly as a direct reveal would.
    pub fn chord(&mut self, coords: Coord2) -> RevealUpdate {
        let mut update = RevealUpdate::unchanged();
        if !self.can_chord_at(coords) {
            return update;
        }

        for pos in neighbors(coords, self.size()) {
            if self.status.is_finished() {
                break;
            }
            update.outcome = update.outcome | self.reveal_single_cell(pos, &mut update.changed);
        }
        update
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        let Some(coords) = self.checked(coords) else {
            return FlagOutcome::NoChange;
        };

        if !matches!(self.status, GameStatus::InProgress) {
            return FlagOutcome::NoChange;
        }

        match self.cell_at(coords) {
            CellState::Closed => {
                self.board[coords.nd()] = CellState::Flagged;
                self.flagged_count += 1;
                FlagOutcome::Changed
            }
            CellState::Flagged => {
                self.board[coords.nd()] = CellState::Closed;
                self.flagged_count -= 1;
                FlagOutcome::Changed
            }
            CellState::Open(_) => FlagOutcome::NoChange,
        }
    }

    /// Flags every unopened neighbor of an open cell when its number equals
    /// the unopened-neighbor count.
    pub fn chord_flag(&mut self, coords: Coord2) -> FlagOutcome {
        let Some(coords) = self.checked(coords) else {
            return FlagOutcome::NoChange;
        };

        if !matches!(self.status, GameStatus::InProgress) {
            return FlagOutcome::NoChange;
        }

        let CellState::Open(count) = self.cell_at(coords) else {
            return FlagOutcome::NoChange;
        };

        if count != self.count_unopened_neighbors(coords) {
            return FlagOutcome::NoChange;
        }

        let mut updated = false;
        for pos in neighbors(coords, self.size()) {
            if matches!(self.cell_at(pos), CellState::Closed) {
                self.board[pos.nd()] = CellState::Flagged;
                self.flagged_count += 1;
                updated = true;
            }
        }

        if updated {
            FlagOutcome::Changed
        } else {
            FlagOutcome::NoChange
        }
    }

    fn checked(&self, coords: Coord2) -> Option<Coord2> {
        let (rows, cols) = self.config.size;
        (coords.0 < rows && coords.1 < cols).then_some(coords)
    }

    fn minefield(&self) -> &Minefield {
        self.minefield
            .as_ref()
            .expect("mines are placed before any cell opens")
    }

    fn ensure_mines_placed(&mut self, start: Coord2) {
        if self.minefield.is_none() {
            let field = RandomLayoutGenerator::new(self.seed, start, self.first_move)
                .generate(self.config);
            log::debug!("first reveal at {:?}, placed {} mines", start, field.mine_count());
            self.minefield = Some(field);
        }

        if self.status.is_pending() {
            self.status = GameStatus::InProgress;
        }
    }

    fn reveal_single_cell(&mut self, coords: Coord2, changed: &mut Vec<Coord2>) -> RevealOutcome {
        let cell = self.cell_at(coords);
        let has_mine = self.minefield()[coords];

        match (cell, has_mine) {
            (CellState::Closed, true) => {
                let count = self.minefield().adjacent_mines(coords);
                self.board[coords.nd()] = CellState::Open(count);
                self.exploded_at = Some(coords);
                self.status = GameStatus::Lost;
                changed.push(coords);
                log::debug!("mine hit at {:?}", coords);
                RevealOutcome::Exploded
            }
            (CellState::Closed, false) => {
                let count = self.minefield().adjacent_mines(coords);
                self.board[coords.nd()] = CellState::Open(count);
                self.revealed_count += 1;
                changed.push(coords);

                if count == 0 {
                    self.cascade_from(coords, changed);
                }

                if self.revealed_count == Saturating(self.minefield().safe_cell_count()) {
                    self.status = GameStatus::Won;
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Opened
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    // iterative worklist so large open areas never recurse
    fn cascade_from(&mut self, origin: Coord2, changed: &mut Vec<Coord2>) {
        let size = self.size();
        let mut visited = BTreeSet::from([origin]);
        let mut frontier: VecDeque<Coord2> = neighbors(origin, size)
            .filter(|&pos| matches!(self.cell_at(pos), CellState::Closed))
            .collect();

        while let Some(coords) = frontier.pop_front() {
            if !visited.insert(coords) {
                continue;
            }

            // flags stop the flood, and nothing opens twice
            if !matches!(self.cell_at(coords), CellState::Closed) {
                continue;
            }

            let count = self.minefield().adjacent_mines(coords);
            self.board[coords.nd()] = CellState::Open(count);
            self.revealed_count += 1;
            changed.push(coords);

            if count == 0 {
                frontier.extend(
                    neighbors(coords, size)
                        .filter(|&pos| matches!(self.cell_at(pos), CellState::Closed))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        neighbors(coords, self.size())
            .filter(|&pos| self.cell_at(pos) == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    fn count_unopened_neighbors(&self, coords: Coord2) -> u8 {
        neighbors(coords, self.size())
            .filter(|&pos| self.cell_at(pos).is_unopened())
            .count()
            .try_into()
            .unwrap()
    }
}
