use euchre_bot::{BotParams, ForcedBidPolicy, HeuristicPolicy, Policy};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameters for agent '{name}': {message}")]
    InvalidParams { name: String, message: String },
    #[error("forced_bid agent '{name}' needs a variant outside bid_sweep mode")]
    MissingVariant { name: String },
}

/// A validated agent definition that can seat fresh policies.
#[derive(Debug, Clone)]
pub(crate) struct AgentBlueprint {
    pub(crate) name: String,
    kind: AgentKind,
    params: BotParams,
    variant: Option<u8>,
}

impl AgentBlueprint {
    pub(crate) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    pub(crate) fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let overrides = config
            .overrides()
            .map_err(|err| AgentError::InvalidParams {
                name: config.name.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            name: config.name.clone(),
            kind: config.kind,
            params: overrides.apply(BotParams::default()),
            variant: overrides.variant,
        })
    }

    pub(crate) fn spawn_policy(&self) -> Result<Box<dyn Policy>, AgentError> {
        match self.kind {
            AgentKind::Heuristic => Ok(Box::new(HeuristicPolicy::new(self.params))),
            AgentKind::ForcedBid => {
                let variant = self.variant.ok_or_else(|| AgentError::MissingVariant {
                    name: self.name.clone(),
                })?;
                Ok(Box::new(ForcedBidPolicy::new(variant, self.params)))
            }
        }
    }

    /// Seats this agent's parameters behind a given forced-bid variant.
    pub(crate) fn spawn_forced(&self, variant: u8) -> Box<dyn Policy> {
        Box::new(ForcedBidPolicy::new(variant, self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentBlueprint, AgentError};
    use crate::config::{AgentConfig, AgentKind};

    fn config(kind: AgentKind, params: &str) -> AgentConfig {
        AgentConfig {
            name: "tester".to_string(),
            kind,
            params: serde_yaml::from_str(params).expect("params yaml"),
        }
    }

    #[test]
    fn heuristic_params_default_when_empty() {
        let blueprint = AgentBlueprint::from_config(&config(AgentKind::Heuristic, "{}"))
            .expect("blueprint");
        assert_eq!(blueprint.params, euchre_bot::BotParams::default());
        assert!(blueprint.spawn_policy().is_ok());
    }

    #[test]
    fn forced_agent_without_variant_cannot_spawn() {
        let blueprint =
            AgentBlueprint::from_config(&config(AgentKind::ForcedBid, "{}")).expect("blueprint");
        assert!(matches!(
            blueprint.spawn_policy(),
            Err(AgentError::MissingVariant { .. })
        ));
        let _ = blueprint.spawn_forced(7);
    }

    #[test]
    fn malformed_params_are_reported() {
        let err = AgentBlueprint::from_config(&config(
            AgentKind::Heuristic,
            "round1_thresholds: [1, 2]",
        ))
        .expect_err("short threshold array");
        assert!(matches!(err, AgentError::InvalidParams { .. }));
    }
}
