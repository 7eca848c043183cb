//! Server configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where processed PDFs wait for download
    pub processed_dir: PathBuf,
    /// Largest accepted upload, per file
    pub max_file_bytes: usize,
    pub artifact_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            processed_dir: PathBuf::from("./processed"),
            max_file_bytes: 32 * MIB,
            artifact_ttl_secs: 600,
            sweep_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Read `OVERLAY_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or unparseable keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        let mut max_file_mb =
            parse_or(&lookup, "OVERLAY_MAX_FILE_MB", defaults.max_file_bytes / MIB);
        if max_file_mb == 0 {
            tracing::warn!("Ignoring invalid OVERLAY_MAX_FILE_MB=0, using default");
            max_file_mb = defaults.max_file_bytes / MIB;
        }

        ServerConfig {
            host: lookup("OVERLAY_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "OVERLAY_PORT", defaults.port),
            processed_dir: lookup("OVERLAY_PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_dir),
            max_file_bytes: max_file_mb.saturating_mul(MIB),
            artifact_ttl_secs: parse_or(
                &lookup,
                "OVERLAY_ARTIFACT_TTL_SECS",
                defaults.artifact_ttl_secs,
            ),
            sweep_interval_secs: parse_or(
                &lookup,
                "OVERLAY_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn artifact_ttl(&self) -> Duration {
        Duration::from_secs(self.artifact_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
