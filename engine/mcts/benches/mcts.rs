//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Plain driver iterations with and without heuristics / transposition reuse
//! - PUCT simulations with the uniform evaluator
//! - Search from different game states (opening, midgame, near-terminal)
//! - Tree operations (allocation, selection, backpropagation, visit policy)

use std::collections::VecDeque;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::{ActionIndex, GameAdapter};
use games_skirmish::{Skirmish, SkirmishConfig, SkirmishEncoder};
use games_tictactoe::{Action, State, TicTacToe, TicTacToeEncoder};
use mcts::{
    visit_policy, MctsConfig, MctsSearch, MctsTree, PuctConfig, PuctSearch, UniformEvaluator,
    ValuePerspective,
};

/// Helper to create a game state after playing a sequence of moves.
fn play_moves(moves: &[u8]) -> State {
    let game = TicTacToe::new();
    let mut state = State::new();
    for &m in moves {
        game.apply_action(&mut state, &Action::Place(m));
    }
    state
}

// =============================================================================
// Plain Driver Benchmarks
// =============================================================================

fn bench_plain_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_iterations");

    for iterations in [50, 100, 200, 400, 800] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("tictactoe", iterations),
            &iterations,
            |b, &iterations| {
                let config = MctsConfig::for_testing()
                    .with_iterations(iterations)
                    .with_transposition(false);
                let mut search = MctsSearch::new(TicTacToe::new(), config).unwrap();
                let state = State::new();

                b.iter(|| black_box(search.select_action(&state).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_plain_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_features");
    let iterations = 400u32;
    let state = State::new();

    for (name, heuristics, transposition) in [
        ("bare", false, false),
        ("heuristics", true, false),
        ("heuristics_tt", true, true),
    ] {
        group.bench_function(name, |b| {
            let config = MctsConfig::for_testing()
                .with_iterations(iterations)
                .with_transposition(transposition);
            let game = TicTacToe::new().with_heuristics(heuristics);
            let mut search = MctsSearch::new(game, config).unwrap();

            b.iter(|| black_box(search.select_action(&state).unwrap()));
        });
    }

    group.finish();
}

fn bench_plain_skirmish(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_skirmish");

    for iterations in [100, 400] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("default_board", iterations),
            &iterations,
            |b, &iterations| {
                let game = Skirmish::new(SkirmishConfig::default());
                let state = game.initial_state();
                let config = MctsConfig::for_testing()
                    .with_iterations(iterations)
                    .with_perspective(ValuePerspective::ByPlayer);
                let mut search = MctsSearch::new(game, config).unwrap();

                b.iter(|| black_box(search.select_action(&state).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_game_phases");
    let iterations = 200u32;

    // Opening (9 moves), midgame (X 4, O 0, X 2, O 6), near-terminal (X wins at 2)
    for (name, moves) in [
        ("opening", &[][..]),
        ("midgame", &[4, 0, 2, 6][..]),
        ("near_terminal", &[0, 3, 1, 4][..]),
    ] {
        group.bench_function(name, |b| {
            let state = play_moves(moves);
            let config = MctsConfig::for_testing().with_iterations(iterations);
            let mut search = MctsSearch::new(TicTacToe::new(), config).unwrap();

            b.iter(|| black_box(search.select_action(&state).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// PUCT Driver Benchmarks
// =============================================================================

fn bench_puct_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("puct_simulations");

    for sims in [50, 100, 200, 400, 800] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("tictactoe", sims), &sims, |b, &sims| {
            let config = PuctConfig::for_testing().with_simulations(sims);
            let mut search = PuctSearch::new(
                TicTacToe::new(),
                TicTacToeEncoder,
                UniformEvaluator::new(),
                TicTacToe::action_index(),
                config,
            )
            .unwrap();
            let state = State::new();

            b.iter(|| black_box(search.search(&state).unwrap()));
        });
    }

    group.bench_function("skirmish_training_200", |b| {
        let game = Skirmish::new(SkirmishConfig::default());
        let index = ActionIndex::build(&game, game.config().max_move_amount);
        let encoder = SkirmishEncoder::new(game.config().clone());
        let state = game.initial_state();
        let config = PuctConfig::for_training()
            .with_simulations(200)
            .with_seed(42)
            .with_perspective(ValuePerspective::ByPlayer);
        let mut search =
            PuctSearch::new(game, encoder, UniformEvaluator::new(), index, config).unwrap();

        b.iter(|| black_box(search.search(&state).unwrap()));
    });

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn untried(n: u8) -> VecDeque<(u8, f32)> {
    (0..n).map(|a| (a, 0.0)).collect()
}

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    // Benchmark node allocation
    group.bench_function("allocate_node", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new(0, None, untried(9));

            // Allocate 100 child nodes
            for i in 0..100u8 {
                tree.add_child(tree.root(), i, 0.11, 1, Some(i as u64), untried(8));
            }

            black_box(tree.len())
        });
    });

    // Benchmark child selection (UCB calculation)
    group.bench_function("select_child", |b| {
        let mut tree = MctsTree::new(0, None, untried(0));

        // Add 9 children with varying visit counts and values
        for i in 0..9u8 {
            let child_id = tree.add_child(tree.root(), i, 0.0, 1, None, untried(0));
            let visits = (i as u32 + 1) * 10;
            tree.seed(child_id, visits, (i as f32 - 4.0) * 0.1 * visits as f32);
        }
        tree.seed(tree.root(), 450, 0.0);

        b.iter(|| {
            black_box(tree.select_child(tree.root(), 1.41, ValuePerspective::AlternatingPlies))
        });
    });

    // Benchmark backpropagation
    group.bench_function("backpropagate_depth_5", |b| {
        b.iter_batched(
            || {
                let mut tree = MctsTree::new(0, None, untried(0));
                let mut parent = tree.root();
                for i in 0..5u8 {
                    parent = tree.add_child(parent, i, 0.0, (i + 1) % 2, None, untried(0));
                }
                (tree, parent)
            },
            |(mut tree, leaf)| {
                tree.backpropagate(leaf, 1.0, ValuePerspective::AlternatingPlies, None);
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    // Benchmark policy extraction with and without temperature scaling
    let counts: Vec<u32> = (1..=9).map(|i| i * 50).collect();
    group.bench_function("visit_policy", |b| {
        b.iter(|| black_box(visit_policy(&counts, 1.0)));
    });
    group.bench_function("visit_policy_temperature", |b| {
        b.iter(|| black_box(visit_policy(&counts, 0.5)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plain_iterations,
    bench_plain_features,
    bench_plain_skirmish,
    bench_game_phases,
    bench_puct_simulations,
    bench_tree_operations,
);
criterion_main!(benches);
