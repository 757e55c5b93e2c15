use ndarray::Array2;

use super::*;

/// Seeded generator that keeps the opening cell (and, per policy, its
/// neighbors) clear and is otherwise uniformly random.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    start: Coord2,
    first_move: FirstMovePolicy,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, start: Coord2, first_move: FirstMovePolicy) -> Self {
        Self {
            seed,
            start,
            first_move,
        }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> Minefield {
        use rand::prelude::*;

        let size = config.size;
        let total = config.total_cells();
        let mut mask: Array2<bool> = Array2::default(size.nd());

        if total == 0 {
            return Minefield::from_mine_mask(mask);
        }

        let mut mines = config.mines;
        if mines >= total {
            log::warn!(
                "mine count {} does not fit {} cells, clamping",
                mines,
                total
            );
            mines = total - 1;
        }

        let start = (
            self.start.0.min(size.0 - 1),
            self.start.1.min(size.1 - 1),
        );

        // shrink the exclusion zone until the mines fit
        let zone_cells = 1 + neighbors(start, size).count() as CellCount;
        let first_move = match self.first_move {
            FirstMovePolicy::SafeZone if mines + zone_cells > total => {
                log::warn!("not enough room to keep the opening zone clear, only the first cell stays safe");
                FirstMovePolicy::SafeCell
            }
            policy => policy,
        };

        let mut excluded: Array2<bool> = Array2::default(size.nd());
        excluded[start.nd()] = true;
        if matches!(first_move, FirstMovePolicy::SafeZone) {
            for pos in neighbors(start, size) {
                excluded[pos.nd()] = true;
            }
        }

        // rejection sampling: draw a cell, skip it when forbidden or already
        // mined, until the quota is met
        let cols = size.1 as CellCount;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;
        while placed < mines {
            let draw = rng.random_range(0..total);
            let coords = ((draw / cols) as Coord, (draw % cols) as Coord);
            if excluded[coords.nd()] || mask[coords.nd()] {
                continue;
            }
            mask[coords.nd()] = true;
            placed += 1;
        }

        let field = Minefield::from_mine_mask(mask);
        if field.mine_count() != mines {
            log::warn!(
                "generated mine count mismatch, actual: {}, requested: {}",
                field.mine_count(),
                mines
            );
        }
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(
        seed: u64,
        start: Coord2,
        policy: FirstMovePolicy,
        size: Coord2,
        mines: CellCount,
    ) -> Minefield {
        RandomLayoutGenerator::new(seed, start, policy).generate(GameConfig::new(size, mines))
    }

    #[test]
    fn places_exactly_the_requested_mine_count() {
        let cases = [
            ((4, 4), 0),
            ((4, 4), 15),
            ((9, 9), 10),
            ((16, 30), 99),
            ((2, 2), 3),
        ];
        for (size, mines) in cases {
            let field = generate(11, (0, 0), FirstMovePolicy::SafeCell, size, mines);
            assert_eq!(field.mine_count(), mines);
            assert!(!field.contains_mine((0, 0)));
        }
    }

    #[test]
    fn safe_zone_keeps_start_and_neighbors_clear() {
        let start = (4, 4);
        let field = generate(7, start, FirstMovePolicy::SafeZone, (9, 9), 10);

        assert!(!field.contains_mine(start));
        assert_eq!(field.adjacent_mines(start), 0);
        for pos in neighbors(start, field.size()) {
            assert!(!field.contains_mine(pos));
        }
    }

    #[test]
    fn dense_board_falls_back_to_a_single_safe_cell() {
        let start = (1, 1);
        let field = generate(3, start, FirstMovePolicy::SafeZone, (3, 3), 8);

        assert_eq!(field.mine_count(), 8);
        assert!(!field.contains_mine(start));
        assert_eq!(field.adjacent_mines(start), 8);
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let first = generate(42, (0, 0), FirstMovePolicy::SafeZone, (16, 16), 40);
        let second = generate(42, (0, 0), FirstMovePolicy::SafeZone, (16, 16), 40);
        assert_eq!(first, second);
    }
}
