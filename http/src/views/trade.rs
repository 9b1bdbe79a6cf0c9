use crate::utils::{copyable, esc};
use crate::views::contract;
use crate::views::layout::{self, detail_row, error_box, lookup_form};
use kod_core::config::TOKEN_SYMBOL;
use kod_core::types::DiagnosticReport;
use kod_core::utils::format::{format_balance, hex0x};
use kod_core::{ConnectionStatus, DecryptedContract, TradeLookup};

pub struct TradePage<'a> {
    pub status: &'a ConnectionStatus,
    /// Raw id input, echoed back into the lookup form
    pub query: &'a str,
    pub lookup: Result<TradeLookup, String>,
    pub decrypt: Option<Result<DecryptedContract, String>>,
    pub ss58_prefix: u8,
}

pub fn page(p: &TradePage) -> String {
    let result = match &p.lookup {
        Ok(lookup) => {
            let mut html = details(lookup, p.ss58_prefix);
            if let Some(diag) = &lookup.diagnostics {
                html.push_str(&diagnostics(diag, p.ss58_prefix));
            }
            // no encrypted blob, no decrypt form
            if lookup.has_encrypted {
                html.push_str(&decrypt_panel(lookup.trade_id, p.decrypt.as_ref()));
            }
            html
        }
        Err(e) => format!(r#"<div class="panel">{}</div>"#, error_box(e)),
    };

    let title = match &p.lookup {
        Ok(lookup) => format!("Trade #{}", lookup.trade_id),
        Err(_) => "Trade lookup".to_string(),
    };
    let body = format!("{}{}", lookup_form(p.query), result);
    layout::page(&title, p.status, &body, "")
}

fn balance(raw: u128) -> String {
    format!("{} {}", esc(&format_balance(raw)), TOKEN_SYMBOL)
}

fn details(lookup: &TradeLookup, prefix: u8) -> String {
    let t = &lookup.trade;
    let status = format!(r#"<span class="badge {}">{}</span>"#, t.status.badge_class(), esc(&t.status.label()));
    let encrypted = match lookup.has_encrypted {
        true => r#"<span class="badge badge-yes">Yes</span>"#,
        false => r#"<span class="badge badge-no">No</span>"#,
    };

    let mut rows = vec![
        detail_row("Status", &status),
        detail_row("Listing", &format!("#{}", t.listing_id)),
        detail_row("Buyer", &copyable(&t.buyer.to_ss58(prefix))),
        detail_row("Seller", &copyable(&t.seller.to_ss58(prefix))),
        detail_row("Price", &balance(t.price)),
        detail_row("Buyer bond", &balance(t.buyer_bond)),
        detail_row("Seller bond", &balance(t.seller_bond)),
    ];
    if t.tl_price > 0 {
        rows.push(detail_row("TL price", &format!("{}.{:02} TL", t.tl_price / 100, t.tl_price % 100)));
    }
    rows.push(detail_row("Created at block", &format!("#{}", t.created_at)));
    rows.push(detail_row("Contract hash", &copyable(&hex0x(&t.contract_hash))));
    let optional_hashes = [
        ("Delivery attestation", &t.delivery_attestation_hash),
        ("Final hash", &t.final_hash),
    ];
    for (label, hash) in optional_hashes {
        if let Some(h) = hash {
            rows.push(detail_row(label, &copyable(&hex0x(h))));
        }
    }
    rows.push(detail_row("Encrypted contract", encrypted));

    format!(
        r#"<div class="panel">
            <h2>Trade #{}</h2>
            {}
        </div>"#,
        lookup.trade_id,
        rows.join("\n")
    )
}

fn diagnostics(d: &DiagnosticReport, prefix: u8) -> String {
    format!(
        r#"<div class="panel">
            <h2>Diagnostics</h2>
            <div class="detail-row"><span class="detail-key">Score</span><span>{score}/100</span></div>
            <div class="bar"><div class="bar-fill" style="width: {score}%"></div></div>
            {}
            {}
            {}
        </div>"#,
        detail_row("Passed / failed", &format!("{} / {} of {}", d.passed_count, d.failed_count, d.total())),
        detail_row("Submitted by", &copyable(&d.submitter.to_ss58(prefix))),
        detail_row("Submitted at block", &format!("#{}", d.submitted_at)),
        score = d.score_pct(),
    )
}

fn decrypt_panel(trade_id: u64, outcome: Option<&Result<DecryptedContract, String>>) -> String {
    let result = match outcome {
        Some(Ok(decrypted)) if decrypted.trade_id != trade_id => {
            error_box(&format!("Decrypted contract belongs to trade #{}, not #{trade_id}", decrypted.trade_id))
        }
        Some(Ok(decrypted)) => contract::render(decrypted),
        Some(Err(e)) => error_box(e),
        None => String::new(),
    };

    // the textarea is never refilled, the phrase is not echoed back
    format!(
        r#"<div class="panel">
            <h2>Decrypt contract</h2>
            <p class="notice">Your recovery phrase is used by this local explorer process only and is never sent to the node.</p>
            <form method="post" action="/trade/{trade_id}/decrypt" autocomplete="off">
                <textarea name="phrase" placeholder="12-word recovery phrase" spellcheck="false" required></textarea>
                <button type="submit" data-busy="Decrypting...">Decrypt</button>
            </form>
            {result}
        </div>"#
    )
}
