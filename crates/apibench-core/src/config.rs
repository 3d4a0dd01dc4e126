use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::BenchError;

/// Which GraphQL schema the server speaks. Only the query text depends on
/// it; responses are decoded by shape either way.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GraphQlDialect {
    /// `posts { … }` with full post fields; media as an inline scalar.
    #[default]
    Posts,
    /// `blog { … }` with title/author/sections; media as `{ url }`.
    Legacy,
}

impl FromStr for GraphQlDialect {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "posts" | "inline" | "default" => Ok(Self::Posts),
            "legacy" | "blog" | "url" => Ok(Self::Legacy),
            other => Err(BenchError::Config(format!(
                "unknown GraphQL dialect: {other}"
            ))),
        }
    }
}

/// Endpoints and client settings for the three backends.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Base URL of the REST server.
    pub rest_base_url: String,
    /// Full URL of the GraphQL endpoint.
    pub graphql_url: String,
    /// Base URL of the gRPC-Web server.
    pub rpc_base_url: String,
    /// Optional HTTP timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub graphql_dialect: GraphQlDialect,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "http://localhost:5125".to_string(),
            graphql_url: "http://localhost:5244/graphql".to_string(),
            rpc_base_url: "http://localhost:5109".to_string(),
            timeout: None,
            graphql_dialect: GraphQlDialect::default(),
        }
    }
}

impl BenchConfig {
    /// Loads an optional `.env` file, then reads `APIBENCH_*` variables over
    /// the defaults.
    ///
    /// - `APIBENCH_REST_URL`, `APIBENCH_GRAPHQL_URL`, `APIBENCH_RPC_URL`
    /// - `APIBENCH_TIMEOUT_MS`: HTTP timeout in milliseconds (`0` disables)
    /// - `APIBENCH_GRAPHQL_DIALECT`: `posts` or `legacy`
    pub fn from_env() -> Result<Self, BenchError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BenchConfig::from_env`] but loads variables from `path` first.
    pub fn from_env_file(path: &Path) -> Result<Self, BenchError> {
        dotenvy::from_path(path)
            .map_err(|e| BenchError::Config(format!("failed to load {}: {e}", path.display())))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BenchError> {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("APIBENCH_REST_URL") {
            config.rest_base_url = url;
        }
        if let Some(url) = non_empty("APIBENCH_GRAPHQL_URL") {
            config.graphql_url = url;
        }
        if let Some(url) = non_empty("APIBENCH_RPC_URL") {
            config.rpc_base_url = url;
        }
        if let Some(raw) = non_empty("APIBENCH_TIMEOUT_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                BenchError::Config(format!("APIBENCH_TIMEOUT_MS is not a number: {raw}"))
            })?;
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(raw) = non_empty("APIBENCH_GRAPHQL_DIALECT") {
            config.graphql_dialect = raw.parse()?;
        }
        Ok(config)
    }

    pub fn rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = url.into();
        self
    }

    pub fn graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = url.into();
        self
    }

    pub fn rpc_base_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn graphql_dialect(mut self, dialect: GraphQlDialect) -> Self {
        self.graphql_dialect = dialect;
        self
    }
}
