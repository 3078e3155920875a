use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_JSON: &str = include_str!("../assets/config.json");

/// Gesture thresholds, animation timings and prompt settings.
///
/// Distances are in CSS pixels, velocities in pixels per millisecond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub distance_threshold: f64,
    pub velocity_threshold: f64,
    /// Degrees of card rotation per pixel of horizontal drag.
    pub rotation_factor: f64,
    /// Time constant of the rolling velocity estimate, in milliseconds.
    pub velocity_time_constant_ms: f64,
    pub exit_distance: f64,
    pub exit_duration_ms: u32,
    pub spring_back_ms: u32,
    pub prompt_interval: u32,
    pub visible_cards: usize,
    pub toast_duration_ms: u32,
    pub skill_priorities: Vec<String>,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 100.0,
            velocity_threshold: 0.2,
            rotation_factor: 0.05,
            velocity_time_constant_ms: 20.0,
            exit_distance: 600.0,
            exit_duration_ms: 200,
            spring_back_ms: 300,
            prompt_interval: 5,
            visible_cards: 2,
            toast_duration_ms: 2000,
            skill_priorities: vec![
                "UI/UX Design".to_string(),
                "Backend Development".to_string(),
                "Project Management".to_string(),
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl SwipeConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SwipeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("distance_threshold", self.distance_threshold),
            ("velocity_threshold", self.velocity_threshold),
            ("rotation_factor", self.rotation_factor),
            ("exit_distance", self.exit_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a non-negative number, got {value}"),
                ));
            }
        }

        if !(self.velocity_time_constant_ms.is_finite() && self.velocity_time_constant_ms > 0.0) {
            return Err(ConfigError::invalid(
                "velocity_time_constant_ms",
                format!(
                    "expected a positive number, got {}",
                    self.velocity_time_constant_ms
                ),
            ));
        }

        if self.prompt_interval == 0 {
            return Err(ConfigError::invalid("prompt_interval", "must be at least 1"));
        }

        if self.visible_cards == 0 {
            return Err(ConfigError::invalid("visible_cards", "must be at least 1"));
        }

        if self.skill_priorities.is_empty() {
            return Err(ConfigError::invalid(
                "skill_priorities",
                "at least one skill choice is required",
            ));
        }

        if let Some(index) = self
            .skill_priorities
            .iter()
            .position(|skill| skill.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "skill_priorities",
                format!("entry {index} is blank"),
            ));
        }

        Ok(())
    }
}

/// Loads the bundled config, falling back to defaults when it is unusable.
pub fn load_config() -> SwipeConfig {
    match SwipeConfig::from_json(CONFIG_JSON) {
        Ok(config) => config,
        Err(err) => {
            warn!("Falling back to default swipe config: {}", err);
            SwipeConfig::default()
        }
    }
}
