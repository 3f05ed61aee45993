use serde::{Deserialize, Serialize};

use super::constants;
use crate::client::types::RequestMode;
use crate::stream::assembler::BoundaryPolicy;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    pub port: u16,
    pub api_host: String,
    pub static_dir: String,
    pub timeout_seconds: u64,
    pub max_body_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: constants::port(),
            api_host: constants::api_host(),
            static_dir: constants::static_dir(),
            timeout_seconds: constants::proxy_timeout_seconds(),
            max_body_bytes: constants::max_request_body_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub url: String,
    pub token: String,
    pub mode: RequestMode,
    pub boundary: BoundaryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: constants::chat_url(),
            token: constants::chat_token(),
            mode: parse_or_default(&constants::chat_mode()),
            boundary: parse_or_default(&constants::chat_boundary()),
        }
    }
}

/// Parse a lowercase enum name the same way the YAML file spells it.
fn parse_or_default<T: for<'de> Deserialize<'de> + Default>(name: &str) -> T {
    serde_yaml::from_str(name).unwrap_or_default()
}
