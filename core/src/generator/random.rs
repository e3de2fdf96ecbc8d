use super::*;

/// Purely random placement by rejection sampling, except for the 3x3 block around the first click.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig, first_click: Coord2) -> MineLayout {
        use rand::prelude::*;

        let mut layout = MineLayout::empty(config.size);

        // the block shrinks at the edges, so this can exceed the capacity GameConfig reserves
        let free_cells = config
            .total_cells()
            .saturating_sub(block_len(first_click, config.size));
        let target = if config.mines > free_cells {
            log::warn!(
                "Cannot fit {} mines outside the safe zone, placing {}",
                config.mines,
                free_cells
            );
            free_cells
        } else {
            config.mines
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut attempts: u32 = 0;
        while layout.mine_count() < target {
            attempts += 1;
            let coords = (
                rng.random_range(0..config.rows()),
                rng.random_range(0..config.cols()),
            );
            if within_one(coords, first_click) {
                continue;
            }
            layout.place_mine(coords);
        }

        log::debug!(
            "Placed {} mines around first click {:?} in {} attempts",
            layout.mine_count(),
            first_click,
            attempts
        );
        layout
    }
}
