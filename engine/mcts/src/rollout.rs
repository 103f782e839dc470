//! Cheap playout policy used by the plain driver.
//!
//! Each ply looks at the side to move's candidates. A move whose tactical
//! priority reaches the override threshold is played outright. Otherwise the
//! top-k moves by prior form a shortlist: the best is played with probability
//! `greedy_prob`, else one is sampled with weights `max(0.01, prior + 1)`.
//! Without a prior hook the policy is uniform.

use engine_core::{GameAdapter, PlayerId};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::MctsConfig;

/// Rollout knobs, taken from [`MctsConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RolloutPolicy {
    pub depth: u32,
    pub greedy_prob: f32,
    pub top_k: usize,
    pub tactical_override: i32,
}

impl From<&MctsConfig> for RolloutPolicy {
    fn from(config: &MctsConfig) -> Self {
        Self {
            depth: config.rollout_depth,
            greedy_prob: config.rollout_greedy_prob,
            top_k: config.rollout_top_k.max(1),
            tactical_override: config.tactical_override,
        }
    }
}

impl RolloutPolicy {
    /// Play out from `state` (a scratch copy, left wherever the playout
    /// stopped) and score the result for `player`.
    ///
    /// Stops after `depth` plies, at a terminal state, at a state with no
    /// legal actions, or when the game rejects the chosen move.
    pub fn run<G, R>(&self, game: &G, state: &mut G::State, player: PlayerId, rng: &mut R) -> f32
    where
        G: GameAdapter,
        R: Rng,
    {
        let mut plies = 0;
        while plies < self.depth && !game.is_terminal(state) {
            let actions = game.legal_actions(state);
            if actions.is_empty() {
                break;
            }
            let Some(action) = self.choose(game, state, &actions, rng) else {
                break;
            };
            if !game.apply_action(state, action) {
                break;
            }
            plies += 1;
        }
        self.score(game, state, player)
    }

    fn score<G: GameAdapter>(&self, game: &G, state: &G::State, player: PlayerId) -> f32 {
        if game.is_terminal(state) {
            game.outcome_for_player(state, player)
        } else if game.hooks().evaluate {
            game.evaluate(state, player)
        } else {
            0.0
        }
    }

    /// Pick one action for the side to move in `state`.
    pub fn choose<'a, G, R>(
        &self,
        game: &G,
        state: &G::State,
        actions: &'a [G::Action],
        rng: &mut R,
    ) -> Option<&'a G::Action>
    where
        G: GameAdapter,
        R: Rng,
    {
        if actions.is_empty() {
            return None;
        }
        let hooks = game.hooks();
        let mover = game.current_player(state);

        if hooks.tactical_priority {
            let mut best: Option<(usize, i32, f32)> = None;
            for (i, action) in actions.iter().enumerate() {
                let tactical = game.tactical_priority(state, action, mover);
                if tactical < self.tactical_override {
                    continue;
                }
                let prior = if hooks.action_prior {
                    game.action_prior(state, action, mover)
                } else {
                    0.0
                };
                match best {
                    Some((_, t, p)) if (tactical, prior) <= (t, p) => {}
                    _ => best = Some((i, tactical, prior)),
                }
            }
            if let Some((i, _, _)) = best {
                return actions.get(i);
            }
        }

        if !hooks.action_prior {
            return actions.get(rng.gen_range(0..actions.len()));
        }

        let mut scored: Vec<(usize, f32)> = actions
            .iter()
            .enumerate()
            .map(|(i, action)| (i, game.action_prior(state, action, mover)))
            .collect();
        // Stable sort keeps legal order among equal priors.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        if scored.len() == 1 || rng.gen::<f32>() < self.greedy_prob {
            return actions.get(scored[0].0);
        }

        let weights: Vec<f32> = scored
            .iter()
            .map(|&(_, prior)| (prior + 1.0).max(0.01))
            .collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => actions.get(scored[dist.sample(rng)].0),
            Err(_) => actions.get(scored[0].0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Hooks;
    use games_tictactoe::{Action, State, TicTacToe};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn policy() -> RolloutPolicy {
        RolloutPolicy::from(&MctsConfig::default())
    }

    fn play(game: &TicTacToe, moves: &[u8]) -> State {
        let mut state = State::new();
        for &m in moves {
            assert!(game.apply_action(&mut state, &Action::Place(m)));
        }
        state
    }

    #[test]
    fn test_tactical_override_takes_win() {
        let game = TicTacToe::new().with_heuristics(true);
        // X: 0, 1  O: 3, 4  -> X to move wins at 2.
        let state = play(&game, &[0, 3, 1, 4]);
        let actions = game.legal_actions(&state);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        for _ in 0..20 {
            let chosen = policy().choose(&game, &state, &actions, &mut rng);
            assert_eq!(chosen, Some(&Action::Place(2)));
        }
    }

    #[test]
    fn test_uniform_without_hooks_covers_all_moves() {
        let game = TicTacToe::new();
        assert_eq!(game.hooks(), Hooks::NONE);
        let state = State::new();
        let actions = game.legal_actions(&state);
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        let mut seen = [false; 9];
        for _ in 0..500 {
            if let Some(Action::Place(p)) = policy().choose(&game, &state, &actions, &mut rng) {
                seen[*p as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_greedy_prefers_best_prior() {
        let game = TicTacToe::new().with_heuristics(true);
        let state = State::new();
        let actions = game.legal_actions(&state);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let greedy = RolloutPolicy {
            greedy_prob: 1.0,
            ..policy()
        };

        let chosen = greedy.choose(&game, &state, &actions, &mut rng);
        assert_eq!(chosen, Some(&Action::Place(4)));
    }

    #[test]
    fn test_terminal_rollout_scores_exactly() {
        let game = TicTacToe::new();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let openings: [&[u8]; 3] = [&[0, 3, 1], &[4, 0], &[]];
        for seed_moves in openings {
            let mut state = play(&game, seed_moves);
            let leaf_player = state.current_player();
            let value = policy().run(&game, &mut state, leaf_player, &mut rng);
            assert!(game.is_terminal(&state));
            assert!(value == -1.0 || value == 0.0 || value == 1.0);
        }
    }

    #[test]
    fn test_depth_zero_scores_without_moving() {
        let game = TicTacToe::new();
        let mut state = play(&game, &[0]);
        let before = state;
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let shallow = RolloutPolicy {
            depth: 0,
            ..policy()
        };
        let value = shallow.run(&game, &mut state, 1, &mut rng);
        assert_eq!(state, before);
        assert_eq!(value, 0.0);
    }
}
