pub fn page() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>404 - Page Not Found | KOD Explorer</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
            background: #0f1419;
            color: #ffffff;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .grid-bg {
            position: fixed;
            inset: 0;
            opacity: 0.08;
            background-image:
                linear-gradient(to right, #8e8e93 1px, transparent 1px),
                linear-gradient(to bottom, #8e8e93 1px, transparent 1px);
            background-size: 32px 32px;
        }
        .container { position: relative; text-align: center; padding: 24px; animation: fadeIn 0.6s ease-out; }
        @keyframes fadeIn {
            from { opacity: 0; transform: translateY(20px); }
            to { opacity: 1; transform: translateY(0); }
        }
        .error-code { font-size: 4rem; font-weight: 700; color: #00d4ff; }
        .error-message { font-size: 1.4rem; margin-bottom: 0.75rem; }
        .error-description { color: #8e8e93; margin-bottom: 2rem; max-width: 460px; }
        .btn {
            display: inline-block;
            padding: 10px 22px;
            border-radius: 8px;
            background: #00d4ff;
            color: #0f1419;
            text-decoration: none;
            font-weight: 600;
        }
    </style>
</head>
<body>
    <div class="grid-bg"></div>
    <div class="container">
        <div class="error-code">404</div>
        <div class="error-message">Page not found</div>
        <p class="error-description">The explorer has no page at this address. Trades are looked up by id from the dashboard.</p>
        <a class="btn" href="/">Back to dashboard</a>
    </div>
</body>
</html>
"#
    .to_string()
}
