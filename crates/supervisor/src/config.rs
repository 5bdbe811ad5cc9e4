//! Configuration for the supervisor.

use std::env;

use crate::error::SupervisorError;

/// Default maximum number of routing steps per turn.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Supervisor tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Maximum routing decisions per turn before giving up.
    pub max_steps: usize,
    /// Whether the direct responder tells the model today's date.
    pub include_date: bool,
    /// Cap on tracked sessions (None keeps every session).
    pub max_sessions: Option<usize>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            include_date: true,
            max_sessions: None,
        }
    }
}

impl SupervisorConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `HARMONIA_MAX_STEPS` (default: 10, must be at least 1)
    /// - `HARMONIA_INCLUDE_DATE` (default: true)
    /// - `HARMONIA_MAX_SESSIONS` (default: unbounded)
    pub fn from_env() -> Result<Self, SupervisorError> {
        let max_steps = match env::var("HARMONIA_MAX_STEPS") {
            Ok(raw) => parse_positive("HARMONIA_MAX_STEPS", &raw)?,
            Err(_) => DEFAULT_MAX_STEPS,
        };

        let include_date = env::var("HARMONIA_INCLUDE_DATE")
            .ok()
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let max_sessions = match env::var("HARMONIA_MAX_SESSIONS") {
            Ok(raw) => Some(parse_positive("HARMONIA_MAX_SESSIONS", &raw)?),
            Err(_) => None,
        };

        Ok(Self {
            max_steps,
            include_date,
            max_sessions,
        })
    }

    /// Set the maximum number of routing steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Enable or disable the date in the direct responder's instruction.
    pub fn with_include_date(mut self, include_date: bool) -> Self {
        self.include_date = include_date;
        self
    }

    /// Cap the number of tracked sessions.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = Some(max_sessions);
        self
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, SupervisorError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(SupervisorError::Configuration(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
    }
}

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Remove every `HARMONIA_*` tuning variable.
#[cfg(test)]
pub(crate) fn clear_tuning_env() {
    std::env::remove_var("HARMONIA_MAX_STEPS");
    std::env::remove_var("HARMONIA_INCLUDE_DATE");
    std::env::remove_var("HARMONIA_MAX_SESSIONS");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SupervisorConfig::default();
        assert_eq!(config.max_steps, 10);
        assert!(config.include_date);
        assert!(config.max_sessions.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = SupervisorConfig::default()
            .with_max_steps(3)
            .with_include_date(false)
            .with_max_sessions(50);
        assert_eq!(config.max_steps, 3);
        assert!(!config.include_date);
        assert_eq!(config.max_sessions, Some(50));
    }

    // Env vars are process-global, so all scenarios run under one lock.
    #[test]
    fn test_from_env_scenarios() {
        let _guard = env_lock();
        clear_tuning_env();

        assert_eq!(SupervisorConfig::from_env().unwrap(), SupervisorConfig::default());

        std::env::set_var("HARMONIA_MAX_STEPS", "4");
        std::env::set_var("HARMONIA_INCLUDE_DATE", "false");
        std::env::set_var("HARMONIA_MAX_SESSIONS", "100");
        let config = SupervisorConfig::from_env().unwrap();
        assert_eq!(config.max_steps, 4);
        assert!(!config.include_date);
        assert_eq!(config.max_sessions, Some(100));

        clear_tuning_env();
        std::env::set_var("HARMONIA_MAX_STEPS", "0");
        assert!(matches!(
            SupervisorConfig::from_env(),
            Err(SupervisorError::Configuration(msg)) if msg.contains("HARMONIA_MAX_STEPS")
        ));

        std::env::set_var("HARMONIA_MAX_STEPS", "lots");
        assert!(SupervisorConfig::from_env().is_err());

        clear_tuning_env();
    }
}
