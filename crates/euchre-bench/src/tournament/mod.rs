mod agents;

pub use agents::AgentError;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use agents::AgentBlueprint;
use euchre_bot::policy::FORCED_VARIANTS;
use euchre_bot::{Policy, Table, TableError};
use euchre_core::game::match_state::{GameError, MatchState};
use euchre_core::game::record::DealRecord;
use euchre_core::model::deal::Deal;
use euchre_core::model::deck::Deck;
use euchre_core::model::player::Seat;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs, RunMode};

/// Primary entry point for seeded simulation runs.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: RunMode,
    /// Matches finished (`matches` mode) or decks swept (`bid_sweep` mode).
    pub units_completed: usize,
    pub deals_played: usize,
    pub rows_written: usize,
    pub match_wins: [u32; 2],
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// One JSONL line: where the deal sits in the run plus its record.
#[derive(Debug, Serialize)]
struct DealRow<'a> {
    run_id: &'a str,
    deal_id: String,
    mode: RunMode,
    unit_index: usize,
    seed: u64,
    game_number: Option<u32>,
    deal_number: Option<u32>,
    variant: Option<u8>,
    seats: &'a [String],
    #[serde(flatten)]
    record: &'a DealRecord,
}

#[derive(Default)]
struct Progress {
    units_completed: usize,
    deals_played: usize,
    rows_written: usize,
    match_wins: [u32; 2],
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if agents.len() != Seat::LOOP.len() {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }
        if config.deals.mode == RunMode::Matches {
            for agent in &agents {
                agent.spawn_policy()?;
            }
        }
        Ok(Self {
            config,
            outputs,
            agents,
        })
    }

    /// Execute the run, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(self.config.deals.mode)?;

        let progress = match self.config.deals.mode {
            RunMode::Matches => self.run_matches(&mut rng, &mut writer, &mut analytics)?,
            RunMode::BidSweep => self.run_bid_sweep(&mut rng, &mut writer, &mut analytics)?,
        };
        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md, &self.config.run_id)?;

        event!(
            target: "euchre_bench::run",
            Level::INFO,
            run_id = %self.config.run_id,
            deals = progress.deals_played,
            rows = progress.rows_written,
            "run complete"
        );

        Ok(RunSummary {
            mode: self.config.deals.mode,
            units_completed: progress.units_completed,
            deals_played: progress.deals_played,
            rows_written: progress.rows_written,
            match_wins: progress.match_wins,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn seat_names(&self) -> Vec<String> {
        self.agents.iter().map(|agent| agent.name.clone()).collect()
    }

    fn heuristic_table(&self) -> Result<Table, RunnerError> {
        let mut policies = Vec::with_capacity(4);
        for agent in &self.agents {
            policies.push(agent.spawn_policy()?);
        }
        let seats: [Box<dyn Policy>; 4] = policies
            .try_into()
            .map_err(|found: Vec<_>| RunnerError::SeatCount { found: found.len() })?;
        Ok(Table::new(seats))
    }

    fn forced_table(&self, variant: u8) -> Result<Table, RunnerError> {
        let policies: Vec<Box<dyn Policy>> = self
            .agents
            .iter()
            .map(|agent| agent.spawn_forced(variant))
            .collect();
        let seats: [Box<dyn Policy>; 4] = policies
            .try_into()
            .map_err(|found: Vec<_>| RunnerError::SeatCount { found: found.len() })?;
        Ok(Table::new(seats))
    }

    fn run_matches(
        &self,
        rng: &mut StdRng,
        writer: &mut BufWriter<File>,
        analytics: &mut AnalyticsCollector,
    ) -> Result<Progress, RunnerError> {
        let mut table = self.heuristic_table()?;
        let match_config = self.config.match_config();
        let max_deals = self.config.deals.max_deals.unwrap_or(usize::MAX);
        let seats = self.seat_names();
        let mut progress = Progress::default();

        'matches: for match_index in 0..self.config.deals.matches {
            let seed = rng.next_u64();
            let mut state = MatchState::with_seed(match_config, seed);

            while state.winner().is_none() {
                if progress.deals_played >= max_deals {
                    break 'matches;
                }
                let (mut deal, mut deal_rng) = state.next_deal()?;
                let game_number = state.game_number();
                table.play_deal(&mut deal, &mut deal_rng)?;
                let record = state.finish_deal(&deal)?;

                let row = DealRow {
                    run_id: &self.config.run_id,
                    deal_id: format!(
                        "M{match_index:04}_G{game_number}_D{:03}",
                        state.deal_number()
                    ),
                    mode: RunMode::Matches,
                    unit_index: match_index,
                    seed,
                    game_number: Some(game_number),
                    deal_number: Some(state.deal_number()),
                    variant: None,
                    seats: &seats,
                    record: &record,
                };
                write_row(writer, &row)?;
                analytics.record_deal(&record, None);
                progress.deals_played += 1;
                progress.rows_written += 1;
            }

            if let Some(team) = state.winner() {
                progress.match_wins[team.index()] += 1;
                progress.units_completed += 1;
                event!(
                    target: "euchre_bench::match",
                    Level::INFO,
                    match_index,
                    seed,
                    winner = %team,
                    games_won = ?state.games_won(),
                    deals = state.deal_number(),
                    "match complete"
                );
            }
        }

        Ok(progress)
    }

    fn run_bid_sweep(
        &self,
        rng: &mut StdRng,
        writer: &mut BufWriter<File>,
        analytics: &mut AnalyticsCollector,
    ) -> Result<Progress, RunnerError> {
        let rules = self.config.rules.deal_rules();
        let max_deals = self.config.deals.max_deals.unwrap_or(usize::MAX);
        let seats = self.seat_names();
        let mut tables = Vec::with_capacity(usize::from(FORCED_VARIANTS));
        for variant in 0..FORCED_VARIANTS {
            tables.push(self.forced_table(variant)?);
        }
        let mut progress = Progress::default();

        for deck_index in 0..self.config.deals.matches {
            if progress.deals_played >= max_deals {
                break;
            }
            let seed = rng.next_u64();
            let deck = Deck::shuffled_with_seed(seed);
            let dealer = Seat::LOOP[deck_index % Seat::LOOP.len()];

            for (variant, table) in (0..FORCED_VARIANTS).zip(tables.iter_mut()) {
                let mut deal = Deal::from_deck(dealer, rules, deck.clone());
                let mut deal_rng = StdRng::seed_from_u64(seed ^ u64::from(variant));
                let record = table.play_deal(&mut deal, &mut deal_rng)?;

                let row = DealRow {
                    run_id: &self.config.run_id,
                    deal_id: format!("S{deck_index:05}_V{variant:02}"),
                    mode: RunMode::BidSweep,
                    unit_index: deck_index,
                    seed,
                    game_number: None,
                    deal_number: None,
                    variant: Some(variant),
                    seats: &seats,
                    record: &record,
                };
                write_row(writer, &row)?;
                analytics.record_deal(&record, Some(variant));
                progress.rows_written += 1;
            }
            progress.deals_played += 1;
            progress.units_completed += 1;
        }

        Ok(progress)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_row(writer: &mut BufWriter<File>, row: &DealRow<'_>) -> Result<(), RunnerError> {
    serde_json::to_writer(&mut *writer, row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("deal execution failed: {0}")]
    Table(#[from] TableError),
    #[error("match progression failed: {0}")]
    Game(#[from] GameError),
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[cfg(test)]
mod tests {
    use super::TournamentRunner;
    use crate::config::BenchmarkConfig;
    use std::fs;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, deals_block: &str) -> BenchmarkConfig {
        let yaml = format!(
            r#"
run_id: "unit"
deals:
{deals_block}
agents:
  - name: "n"
    kind: "heuristic"
  - name: "e"
    kind: "heuristic"
  - name: "s"
    kind: "heuristic"
  - name: "w"
    kind: "heuristic"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
"#,
            jsonl = dir.join("deals.jsonl").display(),
            summary = dir.join("summary.md").display(),
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("yaml");
        cfg.validate().expect("valid");
        cfg
    }

    #[test]
    fn matches_mode_plays_every_match_to_a_winner() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), "  seed: 9\n  matches: 2\n  game_points: 5\n  match_games: 1");
        let outputs = cfg.resolved_outputs();
        let summary = TournamentRunner::new(cfg, outputs)
            .expect("runner")
            .run()
            .expect("run");
        assert_eq!(summary.units_completed, 2);
        assert_eq!(summary.match_wins.iter().sum::<u32>(), 2);
        let lines = fs::read_to_string(&summary.jsonl_path).expect("jsonl");
        assert_eq!(lines.lines().count(), summary.rows_written);
        assert_eq!(summary.rows_written, summary.deals_played);
    }

    #[test]
    fn max_deals_caps_the_run() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), "  seed: 9\n  matches: 50\n  max_deals: 7");
        let outputs = cfg.resolved_outputs();
        let summary = TournamentRunner::new(cfg, outputs)
            .expect("runner")
            .run()
            .expect("run");
        assert_eq!(summary.deals_played, 7);
    }

    #[test]
    fn bid_sweep_writes_one_row_per_variant() {
        let dir = tempdir().expect("temp dir");
        let cfg = config(dir.path(), "  seed: 3\n  matches: 3\n  mode: bid_sweep");
        let outputs = cfg.resolved_outputs();
        let summary = TournamentRunner::new(cfg, outputs)
            .expect("runner")
            .run()
            .expect("run");
        assert_eq!(summary.deals_played, 3);
        assert_eq!(summary.rows_written, 3 * 16);
        let text = fs::read_to_string(&summary.jsonl_path).expect("jsonl");
        for line in text.lines() {
            let value: serde_json::Value = serde_json::from_str(line).expect("json row");
            let variant = value["variant"].as_u64().expect("variant") as u8;
            let position = value["call_position"].as_u64().expect("call position") as u8;
            let expected = if variant < 4 { variant } else { 4 + (variant & 3) };
            assert_eq!(position, expected);
        }
        assert!(summary.summary_path.exists());
    }
}
