// Client configuration.
//
// Everything that used to be process-wide state (API base, response
// charset, TLS verification, failure policy) lives in `ClientConfig`,
// which is read once from the environment and handed to constructors.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://dpcscodes.uoc.edu/dslab-api";
pub const DEFAULT_CHARSET: &str = "UTF-8";

pub const ENV_API_URL: &str = "DSLAB_API_URL";
pub const ENV_CHARSET: &str = "DSLAB_CHARSET";
pub const ENV_INSECURE_TLS: &str = "DSLAB_INSECURE_TLS";
pub const ENV_TIMEOUT_SECS: &str = "DSLAB_TIMEOUT_SECS";
pub const ENV_STRICT: &str = "DSLAB_STRICT";

/// What happens when the compile or evaluate call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and keep going. Only token and submit failures
    /// halt the run.
    #[default]
    Lenient,
    /// Any failed call halts the run, including non-2xx token responses.
    Strict,
}

impl FailurePolicy {
    pub fn is_strict(self) -> bool {
        matches!(self, FailurePolicy::Strict)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    /// Charset used to decode response bodies that do not declare one.
    pub charset: String,
    /// Skip certificate and hostname verification. Opt-in only.
    pub insecure_tls: bool,
    /// `None` keeps the transport's built-in timeout.
    pub timeout: Option<Duration>,
    pub policy: FailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
            insecure_tls: false,
            timeout: None,
            policy: FailurePolicy::Lenient,
        }
    }
}

impl ClientConfig {
    /// Build a config from the `DSLAB_*` environment variables, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`, so tests
    /// do not have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            config.api_url = url;
        }
        if let Some(charset) = non_empty(lookup(ENV_CHARSET)) {
            config.charset = charset;
        }
        if let Some(raw) = non_empty(lookup(ENV_INSECURE_TLS)) {
            config.insecure_tls = parse_bool(ENV_INSECURE_TLS, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_TIMEOUT_SECS,
                value: raw.clone(),
                reason: "expected a whole number of seconds",
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = non_empty(lookup(ENV_STRICT)) {
            if parse_bool(ENV_STRICT, &raw)? {
                config.policy = FailurePolicy::Strict;
            }
        }

        Ok(config)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected true/false, yes/no, on/off or 1/0",
        }),
    }
}

/// URLs of the four DSLab endpoints. Path segments are appended verbatim,
/// the remote API expects them exactly as written here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn token(&self) -> String {
        format!("{}/token", self.base)
    }

    pub fn submit(&self, project: &str) -> String {
        format!("{}/projectes/desa/{}", self.base, project)
    }

    pub fn compile(&self, project_id: &str) -> String {
        format!("{}/projectes/compila/{}", self.base, project_id)
    }

    pub fn evaluate(&self) -> String {
        format!("{}/enviaments/corregeix", self.base)
    }
}
