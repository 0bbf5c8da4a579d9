use std::env;

/// Match format parameters for the tracked game variant.
///
/// The default is the 5-over, 10-wicket format the live scoreboard runs.
#[derive(Debug, Clone, Copy)]
pub struct MatchFormat {
    /// Overs per innings; reaching this on the batting side ends the innings.
    pub overs_per_innings: u32,
    /// Wickets that dismiss the batting side.
    pub wickets_cap: u32,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self {
            overs_per_innings: 5,
            wickets_cap: 10,
        }
    }
}

/// Runtime configuration for the live tracker, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Delay between polling ticks in milliseconds.
    pub poll_interval_ms: u64,
    /// Consecutive parse failures tolerated while a match is active.
    pub max_consecutive_errors: u32,
    /// Consecutive no-data ticks tolerated while waiting for a match to start.
    pub max_waiting_ticks: u32,
    pub format: MatchFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendType {
    Csv,
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Csv => "CSV",
            BackendType::Jsonl => "JSONL",
            BackendType::Sqlite => "SQLite",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} must be an integer, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    env_u64(name, default as u64).map(|v| v as u32)
}

impl TrackerConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults the live scoreboard was tuned against (2s polling, 20-error
    /// tolerance, 300-tick waiting patience).
    pub fn from_env() -> Result<Self, ConfigError> {
        let poll_interval_ms = env_u64("POLL_INTERVAL_MS", 2000)?;
        let max_consecutive_errors = env_u32("MAX_CONSECUTIVE_ERRORS", 20)?;
        let max_waiting_ticks = env_u32("MAX_WAITING_TICKS", 300)?;
        let overs_per_innings = env_u32("OVERS_PER_INNINGS", 5)?;
        let wickets_cap = env_u32("WICKETS_CAP", 10)?;

        if overs_per_innings == 0 {
            return Err(ConfigError::InvalidValue(
                "OVERS_PER_INNINGS must be at least 1".to_string(),
            ));
        }
        if max_waiting_ticks == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_WAITING_TICKS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            poll_interval_ms,
            max_consecutive_errors,
            max_waiting_ticks,
            format: MatchFormat {
                overs_per_innings,
                wickets_cap,
            },
        })
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_consecutive_errors: 20,
            max_waiting_ticks: 300,
            format: MatchFormat::default(),
        }
    }
}

/// Parse `--backend csv|jsonl|sqlite` from argv, defaulting to CSV.
pub fn parse_backend_from_args(args: &[String]) -> BackendType {
    if let Some(idx) = args.iter().position(|a| a == "--backend") {
        match args.get(idx + 1).map(|s| s.as_str()) {
            Some("sqlite") => return BackendType::Sqlite,
            Some("jsonl") => return BackendType::Jsonl,
            Some("csv") => return BackendType::Csv,
            other => {
                log::warn!("Unknown backend {:?}, defaulting to csv", other);
            }
        }
    }
    BackendType::Csv
}
