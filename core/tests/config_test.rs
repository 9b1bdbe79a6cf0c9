use kod_core::config::{Config, DEFAULT_HTTP_PORT, DEFAULT_SS58_PREFIX, DEFAULT_WS_URL, phrase_from_env};
use std::net::Ipv4Addr;
use std::time::Duration;

// single test: the process environment is shared between tests in a binary
#[test]
fn test_config_from_env() {
    unsafe {
        std::env::remove_var("KOD_WS_URL");
        std::env::remove_var("HTTP_IPV4");
        std::env::set_var("HTTP_PORT", "not-a-port");
        std::env::set_var("SS58_PREFIX", "200");
        std::env::remove_var("RPC_TIMEOUT_SECS");
    }
    let config = Config::from_env();
    assert_eq!(config.ws_url, DEFAULT_WS_URL);
    assert_eq!(config.http_addr(), (Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT));
    assert_eq!(config.ss58_prefix, DEFAULT_SS58_PREFIX);
    assert_eq!(config.rpc_timeout, Duration::from_secs(30));

    unsafe {
        std::env::set_var("KOD_WS_URL", " wss://rpc.kod.example ");
        std::env::set_var("HTTP_IPV4", "0.0.0.0");
        std::env::set_var("HTTP_PORT", "8080");
        std::env::set_var("SS58_PREFIX", "7");
        std::env::set_var("RPC_TIMEOUT_SECS", "5");
        std::env::set_var("STATS_REFRESH_SECS", "12");
    }
    let config = Config::from_env();
    assert_eq!(config.ws_url, "wss://rpc.kod.example");
    assert_eq!(config.http_addr(), (Ipv4Addr::UNSPECIFIED, 8080));
    assert_eq!(config.ss58_prefix, 7);
    assert_eq!(config.rpc_timeout, Duration::from_secs(5));
    assert_eq!(config.stats_refresh_secs, 12);

    let config = Config::with_ws_url("ws://10.0.0.2:9944");
    assert_eq!(config.ws_url, "ws://10.0.0.2:9944");
    assert_eq!(config.http_port, 8080);

    unsafe {
        std::env::set_var("KOD_TEST_PHRASE", "  ");
    }
    assert_eq!(phrase_from_env("KOD_TEST_PHRASE"), None);
    assert_eq!(phrase_from_env("KOD_TEST_PHRASE_UNSET"), None);
}
