use engine_core::game_utils::{extend_features, opponent};
use engine_core::{FeatureEncoder, PlayerId};

use crate::{SkirmishConfig, Stance, State};

/// Planes per cell: own units, enemy units, own home, enemy home.
const PLANES: usize = 4;
/// Trailing scalars: stance one-hot (none, reinforce, advance), turn fraction.
const SCALARS: usize = 4;

/// Encodes a position from the side to move's point of view.
///
/// Unit counts are scaled by the config's `max_move_amount` and clipped at 1.
#[derive(Debug, Clone)]
pub struct SkirmishEncoder {
    config: SkirmishConfig,
}

impl SkirmishEncoder {
    pub fn new(config: SkirmishConfig) -> Self {
        Self { config }
    }
}

impl FeatureEncoder<State> for SkirmishEncoder {
    fn feature_size(&self) -> usize {
        self.config.num_cells() * PLANES + SCALARS
    }

    fn encode_into(&self, state: &State, out: &mut Vec<f32>) {
        let n = self.config.num_cells();
        let me = state.current_player();
        let scale = self.config.max_move_amount.max(1) as f32;

        let mut planes = vec![0.0f32; n * PLANES];
        for (index, cell) in state.cells().iter().enumerate() {
            let units = (cell.units as f32 / scale).min(1.0);
            match cell.owner {
                Some(p) if p == me => planes[index] = units,
                Some(_) => planes[n + index] = units,
                None => {}
            }
        }
        let home = |player: PlayerId| if player == 0 { 0 } else { n - 1 };
        planes[2 * n + home(me)] = 1.0;
        planes[3 * n + home(opponent(me))] = 1.0;

        let mut scalars = [0.0f32; SCALARS];
        match state.stance() {
            None => scalars[0] = 1.0,
            Some(Stance::Reinforce) => scalars[1] = 1.0,
            Some(Stance::Advance) => scalars[2] = 1.0,
        }
        scalars[3] = state.turn() as f32 / self.config.max_turns.max(1) as f32;

        extend_features(out, [&planes[..], &scalars[..]]);
    }
}
