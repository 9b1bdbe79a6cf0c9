use crate::utils::esc;
use crate::views::layout::{self, error_box, lookup_form};
use kod_core::config::TOKEN_SYMBOL;
use kod_core::utils::format::{format_balance_short, group_thousands};
use kod_core::{ChainStats, ConnectionStatus};

pub struct Dashboard<'a> {
    pub status: &'a ConnectionStatus,
    /// Endpoint prefilled in the connect form
    pub endpoint: &'a str,
    pub stats: Option<Result<ChainStats, String>>,
    pub connect_error: Option<&'a str>,
    pub refresh_secs: u64,
}

pub fn page(d: &Dashboard) -> String {
    let stats = match &d.stats {
        Some(Ok(stats)) => stat_cards(stats),
        Some(Err(e)) => format!(r#"<div class="panel">{}</div>"#, error_box(&format!("Failed to load statistics: {e}"))),
        None => String::new(),
    };

    let connect_error = d.connect_error.map(error_box).unwrap_or_default();
    let button = if d.status.connected { "Reconnect" } else { "Connect" };

    let body = format!(
        r#"<div class="panel">
            <h2>Node connection</h2>
            <form class="inline" method="post" action="/connect">
                <input name="ws_url" type="text" placeholder="ws://127.0.0.1:9944" value="{}" required>
                <button type="submit" data-busy="Connecting...">{}</button>
            </form>
            {}
        </div>
        {}
        {}"#,
        esc(d.endpoint),
        button,
        connect_error,
        stats,
        if d.status.connected { lookup_form("") } else { String::new() },
    );

    // counters follow new blocks while a node is attached
    let refresh = match (d.status.connected, d.refresh_secs) {
        (true, secs) if secs > 0 => format!(r#"<meta http-equiv="refresh" content="{secs}">"#),
        _ => String::new(),
    };
    layout::page("Dashboard", d.status, &body, &refresh)
}

fn stat_cards(stats: &ChainStats) -> String {
    format!(
        r#"<div class="cards-grid">
            <div class="card">
                <div class="card-title">Total trades</div>
                <div class="card-main-stat">{}</div>
            </div>
            <div class="card">
                <div class="card-title">Completed</div>
                <div class="card-main-stat">{}</div>
            </div>
            <div class="card">
                <div class="card-title">Total volume</div>
                <div class="card-main-stat">{} {}</div>
            </div>
            <div class="card">
                <div class="card-title">Listings</div>
                <div class="card-main-stat">{}</div>
            </div>
        </div>"#,
        group_thousands(stats.total_trades),
        group_thousands(stats.trades_completed),
        format_balance_short(stats.total_volume),
        TOKEN_SYMBOL,
        group_thousands(stats.total_listings),
    )
}
