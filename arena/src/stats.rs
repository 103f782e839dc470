//! Serializable reports printed at the end of each command.

use serde::Serialize;
use std::time::Duration;

use crate::matches::MatchSummary;

fn per_second(count: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count / secs
    } else {
        0.0
    }
}

/// Throughput of the plain driver.
#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub decisions: u32,
    pub games: u32,
    pub rollouts: u64,
    pub iterations_per_decision: u32,
    pub use_transposition: bool,
    pub runtime_seconds: f64,
    pub decisions_per_second: f64,
    pub rollouts_per_second: f64,
}

impl BenchReport {
    pub fn new(
        decisions: u32,
        games: u32,
        rollouts: u64,
        iterations_per_decision: u32,
        use_transposition: bool,
        elapsed: Duration,
    ) -> Self {
        Self {
            decisions,
            games,
            rollouts,
            iterations_per_decision,
            use_transposition,
            runtime_seconds: elapsed.as_secs_f64(),
            decisions_per_second: per_second(decisions as f64, elapsed),
            rollouts_per_second: per_second(rollouts as f64, elapsed),
        }
    }
}

/// Outcome of a head-to-head match.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub contenders: [String; 2],
    pub games: u32,
    pub wins: [u32; 2],
    pub draws: u32,
    pub score_rate: [f64; 2],
    pub avg_plies: f64,
    pub runtime_seconds: f64,
    pub games_per_second: f64,
}

impl MatchReport {
    pub fn new(names: [&str; 2], summary: &MatchSummary, elapsed: Duration) -> Self {
        Self {
            contenders: [names[0].to_string(), names[1].to_string()],
            games: summary.games,
            wins: summary.wins,
            draws: summary.draws,
            score_rate: [summary.score_rate(0), summary.score_rate(1)],
            avg_plies: summary.avg_plies(),
            runtime_seconds: elapsed.as_secs_f64(),
            games_per_second: per_second(summary.games as f64, elapsed),
        }
    }
}

/// Result of a tuning run.
#[derive(Debug, Serialize)]
pub struct TuneReport {
    pub rounds: u32,
    pub accepted: u32,
    /// Score rate of the final incumbent's last accepted match (0.5 if none).
    pub best_score: f64,
    pub weights: std::collections::BTreeMap<String, f64>,
    pub runtime_seconds: f64,
}

/// Summary of a self-play run.
#[derive(Debug, Serialize)]
pub struct SelfplayReport {
    pub games: u32,
    pub examples: usize,
    pub player0_wins: u32,
    pub player1_wins: u32,
    pub draws: u32,
    pub output: String,
    pub runtime_seconds: f64,
    pub examples_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_rates() {
        let report = BenchReport::new(10, 1, 400, 40, true, Duration::from_secs(2));
        assert!((report.decisions_per_second - 5.0).abs() < 1e-9);
        assert!((report.rollouts_per_second - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_has_zero_rate() {
        let report = BenchReport::new(10, 1, 400, 40, false, Duration::ZERO);
        assert_eq!(report.decisions_per_second, 0.0);
    }

    #[test]
    fn test_match_report_serializes() {
        let summary = MatchSummary {
            games: 4,
            wins: [3, 0],
            draws: 1,
            plies: 80,
            iterations: 0,
        };
        let report = MatchReport::new(["tt", "no-tt"], &summary, Duration::from_secs(1));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["wins"][0], 3);
        assert_eq!(json["score_rate"][0], 0.875);
        assert_eq!(json["avg_plies"], 20.0);
    }
}
