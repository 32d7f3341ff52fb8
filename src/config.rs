use crate::error::{BadEnvVarSnafu, ParseTimeoutSnafu, RosterResult};
use dotenvy::var;
use secrecy::SecretString;
use snafu::ResultExt;
use std::{sync::Arc, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    api_config: Arc<ApiConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Ok(Self {
            api_config: Arc::new(ApiConfig::new()?),
        })
    }

    pub fn api_config(&self) -> Arc<ApiConfig> {
        self.api_config.clone()
    }
}

/// Where the student collection lives and how to talk to it.
#[derive(Debug)]
pub struct ApiConfig {
    pub collection_url: String,
    pub token: Option<SecretString>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new() -> RosterResult<Self> {
        Self::from_lookup(var)
    }

    fn from_lookup(
        var: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RosterResult<Self> {
        let collection_url = var("ROSTER_API_URL").context(BadEnvVarSnafu {
            name: "ROSTER_API_URL",
        })?;

        let timeout = match var("ROSTER_API_TIMEOUT_SECS") {
            Ok(original) => Duration::from_secs(
                original
                    .trim()
                    .parse()
                    .context(ParseTimeoutSnafu { original: original.clone() })?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            collection_url: collection_url.trim_end_matches('/').to_string(),
            token: var("ROSTER_API_TOKEN").ok().map(SecretString::from),
            timeout,
        })
    }

    #[cfg(test)]
    pub fn with_url(collection_url: impl Into<String>) -> Self {
        Self {
            collection_url: collection_url.into(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
