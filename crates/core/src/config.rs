use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tracker: TrackerConfig,
    pub engine: EngineConfig,
    pub rules: RulesConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            tracker: TrackerConfig::from_env(),
            engine: EngineConfig::from_env(),
            rules: RulesConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("SERVER_HOST", "0.0.0.0"),
            port: env_u16("SERVER_PORT", 8300),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection settings for the remote work-tracking service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the tracker REST API, without trailing slash.
    pub base_url: String,
    /// Bearer token for authentication.
    pub token: String,
    /// Project all requests are scoped to.
    pub project: String,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or("TRACKER_BASE_URL", "http://localhost:8080"),
            token: env_or("TRACKER_TOKEN", ""),
            project: env_or("TRACKER_PROJECT", "default"),
        }
    }
}

/// Tunables for the rule execution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of webhook jobs held in the in-memory queue.
    /// Enqueue beyond this fails fast with an error to the producer.
    pub max_queue_capacity: usize,
    /// Overall deadline for one scheduled pass, in seconds.
    pub rule_timeout_secs: u64,
    /// Default cadence between scheduled passes, in minutes. Also the
    /// fallback re-execution interval for rules that do not report one.
    pub scheduler_interval_minutes: u32,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            max_queue_capacity: env_usize("MAX_QUEUE_CAPACITY", 500),
            rule_timeout_secs: env_u64("RULE_TIMEOUT_SECS", 600),
            scheduler_interval_minutes: env_u32("SCHEDULER_INTERVAL_MINUTES", 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Directory containing rule definition files (*.json).
    pub rules_dir: PathBuf,
}

impl RulesConfig {
    pub fn from_env() -> Self {
        Self {
            rules_dir: PathBuf::from(env_or("RULES_DIR", "rules")),
        }
    }
}
