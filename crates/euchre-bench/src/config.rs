use euchre_bot::BotParams;
use euchre_core::analysis::AnalysisWeights;
use euchre_core::game::match_state::{
    DEFAULT_GAME_POINTS, DEFAULT_MATCH_GAMES, GameConfig, MatchConfig,
};
use euchre_core::model::deal::DealRules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";
const SEATS: usize = 4;

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_agents(&mut self.agents, self.deals.mode)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            game: GameConfig {
                game_points: self.deals.game_points,
                rules: self.rules.deal_rules(),
            },
            match_games: self.deals.match_games,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Seeded matches played to completion by the configured agents.
    #[default]
    Matches,
    /// Every seeded deck replayed under each forced-bid variant.
    BidSweep,
}

/// Deal sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    pub seed: Option<u64>,
    /// Matches to play, or decks to sweep in `bid_sweep` mode.
    pub matches: usize,
    #[serde(default)]
    pub max_deals: Option<usize>,
    #[serde(default = "default_game_points")]
    pub game_points: u32,
    #[serde(default = "default_match_games")]
    pub match_games: u32,
    #[serde(default)]
    pub mode: RunMode,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.matches == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.matches".to_string(),
                message: "number of matches must be greater than zero".to_string(),
            });
        }

        if self.max_deals == Some(0) {
            return Err(ValidationError::InvalidField {
                field: "deals.max_deals".to_string(),
                message: "max_deals must be at least 1 when set".to_string(),
            });
        }

        if self.game_points == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.game_points".to_string(),
                message: "game_points must be greater than zero".to_string(),
            });
        }

        if self.match_games == 0 {
            return Err(ValidationError::InvalidField {
                field: "deals.match_games".to_string(),
                message: "match_games must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn default_game_points() -> u32 {
    DEFAULT_GAME_POINTS
}

fn default_match_games() -> u32 {
    DEFAULT_MATCH_GAMES
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct RulesConfig {
    #[serde(default)]
    pub stick_the_dealer: bool,
}

impl RulesConfig {
    pub fn deal_rules(&self) -> DealRules {
        DealRules {
            stick_the_dealer: self.stick_the_dealer,
        }
    }
}

/// One seat at the table. Agents are seated North, East, South, West in
/// the order they are listed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl AgentConfig {
    /// Parses `params` into typed overrides.
    pub fn overrides(&self) -> Result<AgentParams, ValidationError> {
        if self.params.is_null() {
            return Ok(AgentParams::default());
        }
        serde_yaml::from_value(self.params.clone()).map_err(|err| ValidationError::InvalidField {
            field: format!("agents[{}].params", self.name),
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
    ForcedBid,
}

/// Optional per-agent overrides on top of the default bot parameters.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AgentParams {
    #[serde(default)]
    pub round1_thresholds: Option<[i32; 4]>,
    #[serde(default)]
    pub round2_thresholds: Option<[i32; 4]>,
    #[serde(default)]
    pub weights: Option<AnalysisWeights>,
    /// Forced-bid variant (0-15) for `forced_bid` agents in `matches` mode.
    #[serde(default)]
    pub variant: Option<u8>,
}

impl AgentParams {
    pub fn apply(&self, base: BotParams) -> BotParams {
        BotParams {
            round1_thresholds: self.round1_thresholds.unwrap_or(base.round1_thresholds),
            round2_thresholds: self.round2_thresholds.unwrap_or(base.round2_thresholds),
            weights: self.weights.unwrap_or(base.weights),
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig], mode: RunMode) -> Result<(), ValidationError> {
    if agents.len() != SEATS {
        return Err(ValidationError::InvalidField {
            field: "agents".to_string(),
            message: format!("exactly {SEATS} agents are required, found {}", agents.len()),
        });
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "agents.name".to_string(),
                message: "agent name must not be empty".to_string(),
            });
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("agents[{}].name", agent.name),
                message: "agent name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "agents".to_string(),
                message: format!("agent name '{}' defined more than once", agent.name),
            });
        }

        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }

        let overrides = agent.overrides()?;
        match (agent.kind, overrides.variant) {
            (AgentKind::Heuristic, Some(_)) => {
                return Err(ValidationError::InvalidField {
                    field: format!("agents[{}].params.variant", agent.name),
                    message: "variant only applies to forced_bid agents".to_string(),
                });
            }
            (AgentKind::ForcedBid, None) if mode == RunMode::Matches => {
                return Err(ValidationError::InvalidField {
                    field: format!("agents[{}].params.variant", agent.name),
                    message: "forced_bid agents need a variant in matches mode".to_string(),
                });
            }
            (AgentKind::ForcedBid, Some(variant)) if variant >= 16 => {
                return Err(ValidationError::InvalidField {
                    field: format!("agents[{}].params.variant", agent.name),
                    message: format!("variant {variant} is outside 0-15"),
                });
            }
            _ => {}
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "stage0_smoke"
deals:
  seed: 123
  matches: 4
agents:
  - name: "north"
    kind: "heuristic"
  - name: "east"
    kind: "heuristic"
    params:
      round1_thresholds: [32, 32, 32, 29]
  - name: "south"
    kind: "heuristic"
    params:
      weights:
        void_weight: 5
  - name: "west"
    kind: "forced_bid"
    params:
      variant: 5
outputs:
  jsonl: "bench/out/{run_id}/deals.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.deals.game_points, DEFAULT_GAME_POINTS);
        assert_eq!(cfg.deals.match_games, DEFAULT_MATCH_GAMES);
        assert_eq!(cfg.deals.mode, RunMode::Matches);
        assert!(!cfg.rules.stick_the_dealer);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/stage0_smoke/deals.jsonl")
        );
    }

    #[test]
    fn params_override_only_named_fields() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");
        let base = BotParams::default();

        let east = cfg.agents[1].overrides().expect("east params").apply(base);
        assert_eq!(east.round1_thresholds, [32, 32, 32, 29]);
        assert_eq!(east.round2_thresholds, base.round2_thresholds);

        let south = cfg.agents[2].overrides().expect("south params").apply(base);
        assert_eq!(south.weights.void_weight, 5);
        assert_eq!(south.weights.trump_weight, base.weights.trump_weight);

        let north = cfg.agents[0].overrides().expect("north params");
        assert_eq!(north, AgentParams::default());
    }

    #[test]
    fn rejects_wrong_seat_count() {
        let yaml = BASIC_YAML.replace(
            "  - name: \"north\"\n    kind: \"heuristic\"\n",
            "",
        );
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("three agents should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "agents"
        ));
    }

    #[test]
    fn rejects_duplicate_agents() {
        let yaml = BASIC_YAML.replace("name: \"south\"", "name: \"north\"");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate agents should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "agents"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("stage0_smoke", "stage 0 smoke");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_unknown_param_and_missing_variant() {
        let yaml = BASIC_YAML.replace("      weights:", "      wieghts:");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("unknown params key");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "agents[south].params"
        ));

        let yaml = BASIC_YAML.replace("      variant: 5\n", "      round1_thresholds: [1, 1, 1, 1]\n");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("forced agent without variant");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "agents[west].params.variant"
        ));
    }

    #[test]
    fn bid_sweep_mode_parses() {
        let yaml = BASIC_YAML.replace("  matches: 4\n", "  matches: 4\n  mode: bid_sweep\n");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.deals.mode, RunMode::BidSweep);
        assert_eq!(cfg.match_config().match_games, DEFAULT_MATCH_GAMES);
    }
}
