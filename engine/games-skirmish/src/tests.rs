use super::*;
use engine_core::game_utils::find_undo_violation;
use engine_core::{ActionIndex, FeatureEncoder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn small() -> Skirmish {
    Skirmish::new(SkirmishConfig::small())
}

fn stack(owner: PlayerId, units: u32) -> Cell {
    Cell {
        owner: Some(owner),
        units,
    }
}

/// Player 0 to act with the Advance stance already chosen.
fn advancing(game: &Skirmish, cells: &[(usize, Cell)]) -> State {
    let mut state = game.initial_state();
    for &(index, cell) in cells {
        state.set_cell(index, cell);
    }
    assert!(game.apply_action(&mut state, &Action::Stance(Stance::Advance)));
    state
}

#[test]
fn test_initial_state() {
    let game = small();
    let state = game.initial_state();
    assert_eq!(state.cell(0), stack(0, 2));
    assert_eq!(state.cell(8), stack(1, 2));
    assert_eq!(state.current_player(), 0);
    assert_eq!(state.stance(), None);
    assert_eq!(
        game.legal_actions(&state),
        vec![
            Action::Stance(Stance::Reinforce),
            Action::Stance(Stance::Advance)
        ]
    );
}

#[test]
fn test_turn_takes_two_plies() {
    let game = small();
    let mut state = game.initial_state();

    assert!(game.apply_action(&mut state, &Action::Stance(Stance::Reinforce)));
    assert_eq!(game.current_player(&state), 0);
    assert_eq!(game.legal_actions(&state), vec![Action::Place(0)]);

    assert!(game.apply_action(&mut state, &Action::Place(0)));
    assert_eq!(state.cell(0), stack(0, 3));
    assert_eq!(game.current_player(&state), 1);
    assert_eq!(state.stance(), None);
}

#[test]
fn test_move_generation() {
    let game = small();
    let state = advancing(&game, &[]);
    let legal = game.legal_actions(&state);
    // Home 0 has neighbours 1 and 3, two units each way.
    assert_eq!(legal.len(), 4);
    assert!(legal.contains(&Action::Move {
        from: 0,
        to: 3,
        amount: 2
    }));
}

#[test]
fn test_move_merges_and_empties_source() {
    let game = small();
    let mut state = advancing(&game, &[(1, stack(0, 1))]);
    assert!(game.apply_action(
        &mut state,
        &Action::Move {
            from: 0,
            to: 1,
            amount: 2
        }
    ));
    assert_eq!(state.cell(0), Cell::default());
    assert_eq!(state.cell(1), stack(0, 3));
}

#[test]
fn test_capture_outcomes() {
    let game = small();
    let attack = Action::Move {
        from: 1,
        to: 4,
        amount: 3,
    };

    // Larger attacker survives with the difference.
    let mut state = advancing(&game, &[(1, stack(0, 3)), (4, stack(1, 1))]);
    assert!(game.apply_action(&mut state, &attack));
    assert_eq!(state.cell(4), stack(0, 2));

    // Equal stacks annihilate.
    let mut state = advancing(&game, &[(1, stack(0, 3)), (4, stack(1, 3))]);
    assert!(game.apply_action(&mut state, &attack));
    assert_eq!(state.cell(4), Cell::default());
    assert_eq!(state.cell(1), Cell::default());

    // Weaker attacker is absorbed.
    let mut state = advancing(&game, &[(1, stack(0, 3)), (4, stack(1, 5))]);
    assert!(game.apply_action(&mut state, &attack));
    assert_eq!(state.cell(4), stack(1, 2));
}

#[test]
fn test_taking_enemy_home_wins() {
    let game = small();
    let mut state = advancing(&game, &[(5, stack(0, 3))]);
    assert!(game.apply_action(
        &mut state,
        &Action::Move {
            from: 5,
            to: 8,
            amount: 3
        }
    ));
    assert_eq!(state.result(), GameResult::Won(0));
    assert!(game.is_terminal(&state));
    assert!(game.legal_actions(&state).is_empty());
    assert_eq!(game.outcome_for_player(&state, 0), 1.0);
    assert_eq!(game.outcome_for_player(&state, 1), -1.0);
}

#[test]
fn test_turn_limit_draws() {
    let mut config = SkirmishConfig::small();
    config.max_turns = 1;
    let game = Skirmish::new(config);
    let mut state = game.initial_state();
    for action in [
        Action::Stance(Stance::Reinforce),
        Action::Place(0),
        Action::Stance(Stance::Reinforce),
        Action::Place(8),
    ] {
        assert!(game.apply_action(&mut state, &action), "{:?}", action);
    }
    assert_eq!(state.turn(), 1);
    assert_eq!(state.result(), GameResult::Draw);
    assert_eq!(game.outcome_for_player(&state, 0), 0.0);
}

#[test]
fn test_rejections_leave_state_untouched() {
    let game = small();
    let state = advancing(&game, &[]);
    let mut work = state.clone();

    let rejected = [
        Action::Place(0),
        Action::Stance(Stance::Reinforce),
        Action::Move {
            from: 0,
            to: 4,
            amount: 1,
        },
        Action::Move {
            from: 0,
            to: 1,
            amount: 3,
        },
        Action::Move {
            from: 8,
            to: 7,
            amount: 1,
        },
    ];
    for action in rejected {
        assert!(
            game.apply_action_with_undo(&mut work, &action).is_none(),
            "{:?} should be rejected",
            action
        );
        assert_eq!(work, state);
    }
}

#[test]
fn test_undo_every_action_family() {
    let game = small();

    let choosing = game.initial_state();
    assert_eq!(find_undo_violation(&game, &choosing), None);

    let mut reinforcing = game.initial_state();
    game.apply_action(&mut reinforcing, &Action::Stance(Stance::Reinforce));
    assert_eq!(find_undo_violation(&game, &reinforcing), None);

    let fighting = advancing(&game, &[(1, stack(0, 3)), (4, stack(1, 2)), (5, stack(0, 4))]);
    assert_eq!(find_undo_violation(&game, &fighting), None);
}

#[test]
fn test_winning_move_undo_clears_result() {
    let game = small();
    let mut state = advancing(&game, &[(7, stack(0, 4))]);
    let before = state.clone();
    let token = game
        .apply_action_with_undo(
            &mut state,
            &Action::Move {
                from: 7,
                to: 8,
                amount: 4,
            },
        )
        .unwrap();
    assert!(game.is_terminal(&state));
    game.undo_action(&mut state, token);
    assert_eq!(state, before);
}

#[test]
fn test_state_key_transposition() {
    let game = small();
    let script_a = [
        Action::Stance(Stance::Advance),
        Action::Move {
            from: 0,
            to: 1,
            amount: 1,
        },
        Action::Stance(Stance::Reinforce),
        Action::Place(8),
        Action::Stance(Stance::Advance),
        Action::Move {
            from: 0,
            to: 3,
            amount: 1,
        },
    ];
    let script_b = [
        Action::Stance(Stance::Advance),
        Action::Move {
            from: 0,
            to: 3,
            amount: 1,
        },
        Action::Stance(Stance::Reinforce),
        Action::Place(8),
        Action::Stance(Stance::Advance),
        Action::Move {
            from: 0,
            to: 1,
            amount: 1,
        },
    ];

    let mut a = game.initial_state();
    let mut b = game.initial_state();
    for (x, y) in script_a.iter().zip(script_b.iter()) {
        assert!(game.apply_action(&mut a, x));
        assert!(game.apply_action(&mut b, y));
    }
    assert_eq!(a, b);
    assert_eq!(game.state_key(&a), game.state_key(&b));

    let mut c = a.clone();
    game.apply_action(&mut c, &Action::Stance(Stance::Reinforce));
    assert_ne!(game.state_key(&a), game.state_key(&c));
}

#[test]
fn test_action_index_layout() {
    let game = small();
    let index = ActionIndex::build(&game, game.config().max_move_amount);
    // 2 stances + 9 cells + 24 directed pairs * 6 amounts
    assert_eq!(index.len(), 2 + 9 + 24 * 6);
    assert_eq!(index.from_index(0), Some(&Action::Stance(Stance::Reinforce)));
    assert_eq!(index.from_index(2), Some(&Action::Place(0)));
    assert_eq!(
        index.from_index(11),
        Some(&Action::Move {
            from: 0,
            to: 1,
            amount: 1
        })
    );
    for i in 0..index.len() {
        let action = index.from_index(i).unwrap();
        assert_eq!(index.to_index(action), Some(i));
    }
}

#[test]
fn test_legal_actions_always_indexable() {
    let game = small();
    let index = ActionIndex::build(&game, game.config().max_move_amount);
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let mut state = game.initial_state();
    while !game.is_terminal(&state) {
        let legal = game.legal_actions(&state);
        assert_eq!(index.legal_indices(&game, &state).len(), legal.len());
        let action = legal[rng.gen_range(0..legal.len())];
        assert!(game.apply_action(&mut state, &action));
    }
}

#[test]
fn test_tactical_priorities() {
    let game = small();
    let mut state = game.initial_state();
    state.set_cell(5, stack(0, 3));

    assert_eq!(
        game.tactical_priority(&state, &Action::Stance(Stance::Advance), 0),
        WIN_PRIORITY
    );

    let state = advancing(&game, &[(5, stack(0, 3))]);
    let win = Action::Move {
        from: 5,
        to: 8,
        amount: 3,
    };
    let bounce = Action::Move {
        from: 5,
        to: 8,
        amount: 2,
    };
    assert_eq!(game.tactical_priority(&state, &win, 0), WIN_PRIORITY);
    assert_eq!(game.tactical_priority(&state, &bounce, 0), 0);
}

#[test]
fn test_block_when_home_threatened() {
    let game = small();
    let mut state = game.initial_state();
    state.set_cell(1, stack(1, 4));
    assert_eq!(
        game.tactical_priority(&state, &Action::Stance(Stance::Reinforce), 0),
        BLOCK_PRIORITY
    );
    assert_eq!(
        game.tactical_priority(&state, &Action::Place(0), 0),
        BLOCK_PRIORITY
    );

    // Capturing the intruder from next door ranks as defence.
    state.set_cell(2, stack(0, 6));
    let state = {
        let mut s = state;
        game.apply_action(&mut s, &Action::Stance(Stance::Advance));
        s
    };
    let capture = Action::Move {
        from: 2,
        to: 1,
        amount: 5,
    };
    assert_eq!(game.tactical_priority(&state, &capture, 0), DEFEND_PRIORITY);
}

#[test]
fn test_priors_favour_captures() {
    let game = small();
    let state = advancing(&game, &[(1, stack(0, 3)), (4, stack(1, 1))]);
    let capture = Action::Move {
        from: 1,
        to: 4,
        amount: 2,
    };
    let retreat = Action::Move {
        from: 1,
        to: 0,
        amount: 2,
    };
    assert!(game.action_prior(&state, &capture, 0) > game.action_prior(&state, &retreat, 0));
}

#[test]
fn test_evaluate_is_bounded_and_antisymmetric() {
    let game = small();
    let mut state = game.initial_state();
    state.set_cell(4, stack(0, 5));
    state.set_cell(7, stack(1, 1));

    let mine = game.evaluate(&state, 0);
    let theirs = game.evaluate(&state, 1);
    assert!(mine > 0.0 && mine <= 1.0);
    assert!((mine + theirs).abs() < 1e-6);
}

#[test]
fn test_hooks_toggle() {
    assert_eq!(small().hooks(), Hooks::ALL);
    assert_eq!(small().with_heuristics(false).hooks(), Hooks::NONE);
}

#[test]
fn test_weights_round_trip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.json");

    let mut game = small();
    game.weights_mut().set("material", 2.5).unwrap();
    game.weights().save_json(&path).unwrap();

    let mut loaded = default_weights();
    let applied = loaded.load_json(&path).unwrap();
    assert_eq!(applied, DEFAULT_WEIGHTS.len());
    assert_eq!(loaded.get("material"), 2.5);

    let tuned = small().with_weights(loaded);
    let state = advancing(&tuned, &[(4, stack(0, 3))]);
    assert_ne!(tuned.evaluate(&state, 0), small().evaluate(&state, 0));
}

#[test]
fn test_encoder_layout() {
    let game = small();
    let encoder = SkirmishEncoder::new(game.config().clone());
    let features = encoder.encode(&game.initial_state());
    assert_eq!(features.len(), 9 * 4 + 4);
    assert_eq!(features.len(), encoder.feature_size());

    let unit = 2.0 / 6.0;
    assert!((features[0] - unit).abs() < 1e-6); // own stack on home
    assert!((features[9 + 8] - unit).abs() < 1e-6); // enemy stack
    assert_eq!(features[18], 1.0); // own home
    assert_eq!(features[27 + 8], 1.0); // enemy home
    assert_eq!(features[36], 1.0); // no stance yet
}

#[test]
fn test_random_games_invariants() {
    let game = small();
    let limit = (game.config().max_turns as usize) * 4;

    for seed in 0..30 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = game.initial_state();
        let mut plies = 0;

        while !game.is_terminal(&state) {
            assert_eq!(find_undo_violation(&game, &state), None, "seed={}", seed);
            let legal = game.legal_actions(&state);
            assert!(!legal.is_empty(), "seed={} plies={}", seed, plies);
            let action = legal[rng.gen_range(0..legal.len())];
            assert!(game.apply_action(&mut state, &action));
            plies += 1;
            assert!(plies <= limit, "seed={}", seed);
        }

        let total = game.outcome_for_player(&state, 0) + game.outcome_for_player(&state, 1);
        assert_eq!(total, 0.0, "seed={}", seed);
    }
}
