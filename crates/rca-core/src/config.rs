//! Configuration types for the automaton, the renderer and the binaries.

use crate::{AutomatonParams, Cell, Lattice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Alphabet size `k`
    pub states: u32,
    /// Neighborhood radius
    pub radius: usize,
    /// Lattice size (number of cells)
    pub size: usize,
    /// Number of time steps to run
    pub steps: usize,
}

impl SimulationConfig {
    pub fn params(&self) -> AutomatonParams {
        AutomatonParams::new(self.states, self.radius)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            states: 2,
            radius: 1,
            size: 64,
            steps: 32,
        }
    }
}

/// Where a rule table comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSpec {
    /// A named entry of the preset catalogue
    Preset(String),
    /// User-authored outputs keyed by neighborhood digit strings; unlisted keys map to 0
    Custom(BTreeMap<String, Cell>),
    /// Seeded random table with the given fraction of non-quiescent outputs
    Random { lambda: f64, seed: u64 },
}

impl Default for RuleSpec {
    fn default() -> Self {
        RuleSpec::Preset("rule90".to_string())
    }
}

/// Image rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side length in pixels of one cell
    pub cell_pixels: u32,
    /// Render value 0 as black instead of white
    pub invert: bool,
    /// Print 0 as '.' in text output
    pub dot_for_zero: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_pixels: 4,
            invert: false,
            dot_for_zero: true,
        }
    }
}

/// Seeded random starting lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomInitial {
    /// Probability that a cell is non-zero
    pub density: f64,
    pub seed: u64,
}

/// A complete batch run, as read by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    /// Starting lattice. Takes precedence over `random_initial`; a single 1
    /// in the middle cell when both are absent.
    pub initial_state: Option<Lattice>,
    pub random_initial: Option<RandomInitial>,
    pub rule: RuleSpec,
    pub render: RenderConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Largest number of steps a single run request may ask for
    pub max_steps: usize,
    /// Largest lattice size a run request may ask for
    pub max_size: usize,
    /// Largest number of states a session's history may hold
    pub max_history_len: usize,
    /// Maximum number of live sessions
    pub max_sessions: usize,
    /// Sessions idle for longer than this are dropped
    pub session_ttl_secs: u64,
    /// Log output format
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Defaults overlaid with `RCA_*` environment variables. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("RCA_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Some(port) = env_parse("RCA_PORT") {
            config.port = port;
        }
        if let Some(max_steps) = env_parse("RCA_MAX_STEPS") {
            config.max_steps = max_steps;
        }
        if let Some(max_size) = env_parse("RCA_MAX_SIZE") {
            config.max_size = max_size;
        }
        if let Some(max_history_len) = env_parse("RCA_MAX_HISTORY") {
            config.max_history_len = max_history_len;
        }
        if let Some(max_sessions) = env_parse("RCA_MAX_SESSIONS") {
            config.max_sessions = max_sessions;
        }
        if let Some(ttl) = env_parse("RCA_SESSION_TTL_SECS") {
            config.session_ttl_secs = ttl;
        }
        if let Some(log_format) = env_parse("RCA_LOG_FORMAT") {
            config.log_format = log_format;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_steps: 10_000,
            max_size: 4096,
            max_history_len: 20_000,
            max_sessions: 1024,
            session_ttl_secs: 3600, // 1 hour
            log_format: LogFormat::Pretty,
        }
    }
}
