// Runtime configuration: the bearer token and the API base URL. Built once
// in `main` and handed to `ApiClient::new`; nothing here is global.

use crate::error::{AttachError, Result};
use reqwest::Url;
use std::fmt;

/// Environment variable holding the iLab API bearer token.
pub const TOKEN_ENV: &str = "ILAB_API_TOKEN";

/// Environment variable that overrides the API base URL.
pub const API_BASE_ENV: &str = "ILAB_API_BASE";

pub const DEFAULT_API_BASE: &str = "https://api.ilabsolutions.com/v1/";

/// Opaque API credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: &str) -> Result<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(AttachError::Configuration(format!(
                "{TOKEN_ENV} is set but empty"
            )));
        }
        Ok(BearerToken(token.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub token: BearerToken,
    pub api_base: Url,
}

impl Config {
    pub fn new(token: &str, api_base: &str) -> Result<Self> {
        Ok(Config {
            token: BearerToken::new(token)?,
            api_base: parse_api_base(api_base)?,
        })
    }

    /// Read the token from `ILAB_API_TOKEN`. Fails before any network
    /// activity when it is unset or blank.
    pub fn from_env(api_base: &str) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| {
            AttachError::Configuration(format!("environment variable {TOKEN_ENV} is not set"))
        })?;
        Config::new(&token, api_base)
    }
}

/// Parse the base URL and make sure it ends in `/` so relative endpoint
/// paths join beneath it instead of replacing its last segment.
fn parse_api_base(raw: &str) -> Result<Url> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let url = Url::parse(&base)
        .map_err(|e| AttachError::Configuration(format!("invalid API base URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AttachError::Configuration(format!(
            "unsupported API base URL scheme '{other}'"
        ))),
    }
}
