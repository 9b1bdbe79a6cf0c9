use crate::utils::{copyable, esc};
use kod_core::DecryptedContract;
use kod_core::contract_view::Section;

pub fn render(decrypted: &DecryptedContract) -> String {
    let raw = serde_json::to_string_pretty(&decrypted.contract).unwrap_or_default();
    format!(
        r#"<div class="contract-section">
            <div class="detail-row"><span class="detail-key">Decrypted as</span>{}</div>
        </div>
        {}
        <details class="contract-section">
            <summary>Raw JSON</summary>
            <pre class="mono">{}</pre>
        </details>"#,
        copyable(&decrypted.address),
        sections(&decrypted.sections),
        esc(&raw),
    )
}

pub fn sections(sections: &[Section]) -> String {
    sections.iter().map(section).collect::<Vec<_>>().join("\n")
}

fn section(s: &Section) -> String {
    let rows: String = s
        .rows
        .iter()
        .map(|r| match r.key.is_empty() {
            true => format!(r#"<div class="contract-row"><span class="contract-val">{}</span></div>"#, esc(&r.value)),
            false => format!(
                r#"<div class="contract-row"><span class="contract-key">{}</span><span class="contract-val">{}</span></div>"#,
                esc(&r.key),
                esc(&r.value)
            ),
        })
        .collect();
    format!(r#"<div class="contract-section"><h4>{}</h4>{}</div>"#, esc(s.title), rows)
}
