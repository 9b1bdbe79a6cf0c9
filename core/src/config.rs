/// The only file where reading environment variables is allowed
/// Basically, the config for the whole explorer
use std::net::Ipv4Addr;
use std::time::Duration;

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:9944";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATS_REFRESH_SECS: u64 = 6; // one block
pub const DEFAULT_SS58_PREFIX: u8 = 42; // generic substrate prefix used by KOD
pub const TOKEN_SYMBOL: &str = "KOD";

#[derive(Debug, Clone)]
pub struct Config {
    // node connection
    pub ws_url: String,
    pub rpc_timeout: Duration,
    pub ss58_prefix: u8,

    // explorer surface
    pub http_ipv4: Ipv4Addr,
    pub http_port: u16,
    pub stats_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            ss58_prefix: DEFAULT_SS58_PREFIX,
            http_ipv4: Ipv4Addr::LOCALHOST,
            http_port: DEFAULT_HTTP_PORT,
            stats_refresh_secs: DEFAULT_STATS_REFRESH_SECS,
        }
    }
}

impl Config {
    /// Create Config from the process environment, falling back to defaults
    /// for anything missing or unparsable
    pub fn from_env() -> Self {
        let ws_url = std::env::var("KOD_WS_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_WS_URL.to_string());

        // loopback by default, the decrypt form receives recovery phrases
        let http_ipv4 = std::env::var("HTTP_IPV4").ok().and_then(|s| s.parse().ok()).unwrap_or(Ipv4Addr::LOCALHOST);
        let http_port = std::env::var("HTTP_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_HTTP_PORT);

        let rpc_timeout = std::env::var("RPC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_RPC_TIMEOUT_SECS);
        let ss58_prefix =
            std::env::var("SS58_PREFIX").ok().and_then(|s| s.parse::<u8>().ok()).filter(|p| *p < 64).unwrap_or(DEFAULT_SS58_PREFIX);
        let stats_refresh_secs = std::env::var("STATS_REFRESH_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_STATS_REFRESH_SECS);

        Self {
            ws_url,
            rpc_timeout: Duration::from_secs(rpc_timeout),
            ss58_prefix,
            http_ipv4,
            http_port,
            stats_refresh_secs,
        }
    }

    /// Same as [`Config::from_env`] but pointed at an explicit endpoint
    pub fn with_ws_url(ws_url: &str) -> Self {
        Self { ws_url: ws_url.trim().to_string(), ..Self::from_env() }
    }

    pub fn http_addr(&self) -> (Ipv4Addr, u16) {
        (self.http_ipv4, self.http_port)
    }
}

/// Recovery phrase handed over through a named environment variable
pub fn phrase_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.trim().is_empty())
}
