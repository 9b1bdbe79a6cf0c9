use kod_core::utils::format::short_addr;

pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&#39;")
}

/// Shortened value that copies the full one to the clipboard on click
pub fn copyable(full: &str) -> String {
    format!(r#"<span class="mono copy" data-copy="{}" title="{}">{}</span>"#, esc(full), esc(full), esc(&short_addr(full)))
}

/// Parse a user supplied trade id, tolerating surrounding whitespace
pub fn parse_trade_id(input: &str) -> Option<u64> {
    input.trim().parse().ok()
}
