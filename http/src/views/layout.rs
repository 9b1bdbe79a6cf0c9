use crate::utils::esc;
use kod_core::ConnectionStatus;

/// Common page shell: styles, header with connection state, client script
pub fn page(title: &str, status: &ConnectionStatus, body: &str, head_extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | KOD Explorer</title>
    {head_extra}
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: #0f1419;
            color: #ffffff;
            line-height: 1.6;
        }}
        a {{ color: #00d4ff; text-decoration: none; }}
        .container {{ max-width: 1100px; margin: 0 auto; padding: 20px; }}
        header {{ display: flex; justify-content: space-between; align-items: center; margin-bottom: 28px; }}
        h1 {{ color: #00d4ff; font-size: 1.8rem; }}
        h2 {{ color: #00d4ff; font-size: 1.2rem; margin-bottom: 14px; }}
        h4 {{ color: #8e8e93; font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.05em; margin-bottom: 8px; }}
        .status {{ font-size: 0.9rem; color: #8e8e93; }}
        .dot {{ display: inline-block; width: 9px; height: 9px; border-radius: 50%; margin-right: 6px; background: #ff4444; }}
        .dot.on {{ background: #00ff88; }}

        .panel {{ background: #1e1e1e; border: 1px solid #333; border-radius: 12px; padding: 22px; margin-bottom: 22px; }}
        .cards-grid {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 18px; margin-bottom: 22px; }}
        .card {{ background: #1e1e1e; border: 1px solid #333; border-radius: 12px; padding: 20px; }}
        .card-title {{ color: #8e8e93; font-size: 0.85rem; }}
        .card-main-stat {{ font-size: 1.6rem; font-weight: 700; margin-top: 6px; }}

        form.inline {{ display: flex; gap: 10px; }}
        input, textarea {{
            flex: 1; background: #0f1419; color: #fff; border: 1px solid #333;
            border-radius: 8px; padding: 10px 12px; font-size: 0.95rem;
        }}
        textarea {{ width: 100%; min-height: 80px; font-family: ui-monospace, monospace; margin-bottom: 10px; }}
        button {{
            background: #00d4ff; color: #0f1419; border: 0; border-radius: 8px;
            padding: 10px 18px; font-weight: 600; cursor: pointer;
        }}
        button:disabled {{ opacity: 0.5; cursor: wait; }}

        .detail-row {{ display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #2a2a2a; gap: 16px; }}
        .detail-row:last-child {{ border-bottom: 0; }}
        .detail-key {{ color: #8e8e93; }}
        .mono {{ font-family: ui-monospace, monospace; font-size: 0.9rem; }}
        .copy {{ cursor: pointer; border-bottom: 1px dashed #555; }}
        .copy.copied {{ color: #00ff88; }}

        .badge {{ padding: 2px 10px; border-radius: 10px; font-size: 0.8rem; font-weight: 600; }}
        .badge-pending {{ background: #3a3a3a; color: #ddd; }}
        .badge-escrow {{ background: #3a2f00; color: #ffcc00; }}
        .badge-completed {{ background: #003a22; color: #00ff88; }}
        .badge-disputed {{ background: #3a0000; color: #ff4444; }}
        .badge-refunded {{ background: #1f2a3a; color: #66aaff; }}
        .badge-yes {{ background: #003a22; color: #00ff88; }}
        .badge-no {{ background: #3a3a3a; color: #aaa; }}

        .bar {{ background: #2a2a2a; border-radius: 6px; height: 10px; overflow: hidden; margin: 8px 0; }}
        .bar-fill {{ background: #00ff88; height: 100%; }}

        .error {{ background: #3a0000; border: 1px solid #ff4444; color: #ffb3b3; border-radius: 8px; padding: 12px; margin-top: 12px; }}
        .notice {{ color: #8e8e93; font-size: 0.85rem; margin-bottom: 10px; }}
        .contract-section {{ margin-top: 16px; }}
        .contract-row {{ display: flex; justify-content: space-between; gap: 16px; padding: 6px 0; border-bottom: 1px solid #2a2a2a; }}
        .contract-key {{ color: #8e8e93; }}
        .contract-val {{ white-space: pre-wrap; text-align: right; }}
        details pre {{ background: #0f1419; padding: 12px; border-radius: 8px; overflow-x: auto; margin-top: 8px; }}

        @media (max-width: 900px) {{
            .cards-grid {{ grid-template-columns: repeat(2, 1fr); }}
        }}
        @media (max-width: 560px) {{
            .container {{ padding: 14px; }}
            .cards-grid {{ grid-template-columns: 1fr; }}
            form.inline {{ flex-direction: column; }}
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1><a href="/">KOD Explorer</a></h1>
            {status}
        </header>
        {body}
    </div>
    <script>
        document.querySelectorAll('form').forEach((form) => {{
            form.addEventListener('submit', () => {{
                form.querySelectorAll('button[type=submit]').forEach((b) => {{
                    b.disabled = true;
                    if (b.dataset.busy) b.textContent = b.dataset.busy;
                }});
            }});
        }});
        document.querySelectorAll('[data-copy]').forEach((el) => {{
            el.addEventListener('click', () => {{
                navigator.clipboard.writeText(el.dataset.copy).then(() => {{
                    el.classList.add('copied');
                    setTimeout(() => el.classList.remove('copied'), 1200);
                }});
            }});
        }});
    </script>
</body>
</html>
"#,
        title = esc(title),
        status = status_line(status),
    )
}

fn status_line(status: &ConnectionStatus) -> String {
    match (&status.chain, status.connected) {
        (Some(chain), true) => {
            let block = status.best_block.map(|b| format!(" · block #{b}")).unwrap_or_default();
            format!(r#"<div class="status"><span class="dot on"></span>{}{}</div>"#, esc(chain), block)
        }
        (Some(_), false) => r#"<div class="status"><span class="dot"></span>connection lost</div>"#.to_string(),
        (None, _) => r#"<div class="status"><span class="dot"></span>not connected</div>"#.to_string(),
    }
}

/// `key: value` row, value is inserted as-is and must already be escaped
pub fn detail_row(key: &str, value_html: &str) -> String {
    format!(
        r#"<div class="detail-row"><span class="detail-key">{}</span><span>{}</span></div>"#,
        esc(key),
        value_html
    )
}

pub fn error_box(msg: &str) -> String {
    format!(r#"<div class="error">{}</div>"#, esc(msg))
}

/// Trade id lookup form shared by the dashboard and the trade page
pub fn lookup_form(value: &str) -> String {
    format!(
        r#"<div class="panel">
            <h2>Trade lookup</h2>
            <form class="inline" method="get" action="/trade">
                <input name="id" type="text" inputmode="numeric" placeholder="Trade ID" value="{}" required>
                <button type="submit" data-busy="Querying...">Query</button>
            </form>
        </div>"#,
        esc(value)
    )
}
