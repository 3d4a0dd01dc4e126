use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "apibench.logs.jsonl";

/// Logging settings, normally read from the environment:
///
/// - `APIBENCH_OBSERVABILITY`: enable/disable flag (default enabled).
/// - `APIBENCH_LOG_LEVEL`: level or filter directive (`info`, `apibench_core=debug`, ...).
/// - `APIBENCH_JSON_LOG_PATH`: if set, logs are JSONL in that file instead of stderr.
/// - `RUST_LOG`: used when `APIBENCH_LOG_LEVEL` is unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    pub filter: Option<String>,
    pub json_path: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: None,
            json_path: None,
        }
    }
}

impl LogSettings {
    /// Loads an optional `.env` file, then reads the variables above.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            enabled: non_empty("APIBENCH_OBSERVABILITY")
                .map(|v| parse_bool_env(&v).unwrap_or(true))
                .unwrap_or(true),
            filter: non_empty("APIBENCH_LOG_LEVEL").or_else(|| non_empty("RUST_LOG")),
            json_path: non_empty("APIBENCH_JSON_LOG_PATH").map(PathBuf::from),
        }
    }

    /// Overrides the filter directive, e.g. from a `--log-level` flag.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        self.filter
            .as_deref()
            .and_then(|raw| EnvFilter::try_new(raw).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Splits a log path into directory and file name, creating the directory.
fn log_file_location(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&dir);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file_name)
}

/// Initialize logging from the environment, once per process.
pub fn init() {
    init_with(LogSettings::from_env());
}

/// Initialize logging with explicit settings. Only the first call in a
/// process has any effect.
///
/// Console output goes to stderr so reports printed on stdout stay clean.
pub fn init_with(settings: LogSettings) {
    INIT.get_or_init(|| {
        if !settings.enabled {
            return;
        }

        let env_filter = settings.env_filter();
        match &settings.json_path {
            Some(path) => {
                let (dir, file_name) = log_file_location(path);
                let writer = tracing_appender::rolling::never(dir, file_name);
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(false)
                    .with_writer(writer);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            None => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init();
            }
        }
    });
}
