//! Turns a decrypted contract document into titled key/value sections.
//!
//! The contract JSON is free-form; well-known keys get their own section
//! and everything else lands in "Other" so nothing is silently dropped.
//! Both the HTML pages and the CLI render from this model.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

const KNOWN_KEYS: &[&str] =
    &["trade", "tradeId", "listing", "diagnostics", "meeting", "device", "notes", "timestamp", "createdAt", "acceptedAt"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Empty for free-text rows such as a single notes string
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<Row>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self { title, rows: Vec::new() }
    }

    fn row(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.rows.push(Row { key: key.into(), value: value.into() });
    }

    /// Adds the row only when the field is present and truthy
    fn field(&mut self, obj: &Map<String, Value>, key: &str, label: &str) {
        if let Some(v) = obj.get(key).filter(|v| truthy(v)) {
            self.row(label, display(v));
        }
    }

    fn id_field(&mut self, obj: &Map<String, Value>, key: &str, label: &str) {
        if let Some(v) = obj.get(key).filter(|v| truthy(v)) {
            self.row(label, format!("#{}", display(v)));
        }
    }
}

/// JavaScript truthiness, the contract producer relies on it for optional fields
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings verbatim, scalars as written, containers pretty-printed
pub fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        other => other.to_string(),
    }
}

/// Millisecond epoch to a UTC timestamp, anything else shown as is
pub fn display_timestamp(v: &Value) -> String {
    let millis = v.as_i64().or_else(|| v.as_f64().map(|f| f as i64));
    match millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => display(v),
    }
}

pub fn sections(contract: &Value) -> Vec<Section> {
    let Some(obj) = contract.as_object() else {
        let mut other = Section::new("Other");
        other.row("contract", display(contract));
        return vec![other];
    };

    let mut out = Vec::new();

    let trade = obj.get("trade").filter(|v| truthy(v));
    if trade.is_some() || obj.get("tradeId").is_some_and(truthy) {
        let mut s = Section::new("Trade");
        s.id_field(obj, "tradeId", "Trade ID");
        if let Some(t) = trade.and_then(Value::as_object) {
            s.id_field(t, "tradeId", "Trade ID");
            s.id_field(t, "listingId", "Listing ID");
            s.field(t, "buyer", "Buyer");
            s.field(t, "seller", "Seller");
            s.field(t, "price", "Price");
            s.field(t, "buyerBond", "Buyer bond");
            s.field(t, "sellerBond", "Seller bond");
            s.field(t, "status", "Status");
        }
        out.push(s);
    }

    if let Some(listing) = obj.get("listing").filter(|v| truthy(v)) {
        let mut s = Section::new("Listing");
        if let Some(l) = listing.as_object() {
            for (key, label) in [
                ("title", "Title"),
                ("description", "Description"),
                ("category", "Category"),
                ("brand", "Brand"),
                ("model", "Model"),
                ("condition", "Condition"),
                ("price", "Price"),
            ] {
                s.field(l, key, label);
            }
        }
        out.push(s);
    }

    if let Some(diag) = obj.get("diagnostics").filter(|v| truthy(v)) {
        let mut s = Section::new("Diagnostics report");
        if let Some(d) = diag.as_object() {
            // presence, not truthiness: a score of 0 is meaningful
            if let Some(score) = d.get("score") {
                s.row("Score", format!("{}/100", display(score)));
            }
            if let Some(passed) = d.get("passedCount") {
                s.row("Passed", display(passed));
            }
            if let Some(failed) = d.get("failedCount") {
                s.row("Failed", display(failed));
            }
            if let Some(tests) = d.get("tests").and_then(Value::as_array) {
                for (i, test) in tests.iter().enumerate() {
                    let pick = |keys: [&str; 2]| keys.iter().find_map(|k| test.get(*k).filter(|v| truthy(v)).map(display));
                    let name = pick(["name", "testId"]).unwrap_or_else(|| format!("Test {}", i + 1));
                    let result = pick(["result", "status"]).unwrap_or_else(|| "-".to_string());
                    s.row(name, result);
                }
            }
        }
        out.push(s);
    }

    if let Some(meeting) = obj.get("meeting").filter(|v| truthy(v)) {
        let mut s = Section::new("Meeting");
        if let Some(m) = meeting.as_object() {
            s.field(m, "location", "Location");
            s.field(m, "date", "Date");
            s.field(m, "time", "Time");
            s.field(m, "notes", "Notes");
        }
        out.push(s);
    }

    if let Some(device) = obj.get("device").filter(|v| truthy(v)) {
        let mut s = Section::new("Device");
        if let Some(dev) = device.as_object() {
            for (k, v) in dev.iter().filter(|(_, v)| truthy(v)) {
                s.row(k.as_str(), display(v));
            }
        }
        out.push(s);
    }

    if let Some(notes) = obj.get("notes").filter(|v| truthy(v)) {
        let mut s = Section::new("Notes / conditions");
        match notes {
            Value::Array(items) => {
                for (i, n) in items.iter().enumerate() {
                    s.row(format!("#{}", i + 1), display(n));
                }
            }
            other => s.row("", display(other)),
        }
        out.push(s);
    }

    let timestamp = obj.get("timestamp").filter(|v| truthy(v));
    let created = obj.get("createdAt").filter(|v| truthy(v));
    let accepted = obj.get("acceptedAt").filter(|v| truthy(v));
    if timestamp.is_some() || created.is_some() || accepted.is_some() {
        let mut s = Section::new("Dates");
        if let Some(ts) = timestamp {
            s.row("Timestamp", display_timestamp(ts));
        }
        if let Some(c) = created {
            s.row("Created", display(c));
        }
        if let Some(a) = accepted {
            s.row("Accepted", display(a));
        }
        out.push(s);
    }

    let mut other = Section::new("Other");
    for (k, v) in obj.iter().filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str())) {
        other.row(k.as_str(), display(v));
    }
    if !other.rows.is_empty() {
        out.push(other);
    }

    out
}

/// Plain text rendering for terminals
pub fn render_text(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&format!("== {} ==\n", section.title));
        let width = section.rows.iter().map(|r| r.key.chars().count()).max().unwrap_or(0);
        for row in &section.rows {
            if row.key.is_empty() {
                out.push_str(&format!("  {}\n", row.value));
            } else if row.value.contains('\n') {
                out.push_str(&format!("  {}:\n", row.key));
                for line in row.value.lines() {
                    out.push_str(&format!("    {line}\n"));
                }
            } else {
                out.push_str(&format!("  {:<width$}  {}\n", row.key, row.value));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titles(s: &[Section]) -> Vec<&'static str> {
        s.iter().map(|s| s.title).collect()
    }

    fn rows(s: &Section) -> Vec<(&str, &str)> {
        s.rows.iter().map(|r| (r.key.as_str(), r.value.as_str())).collect()
    }

    #[test]
    fn test_known_sections_in_order() {
        let contract = json!({
            "acceptedAt": "2025-01-02",
            "notes": ["no returns", "cash only"],
            "listing": { "title": "Pixel 8", "brand": "Google", "price": "" },
            "tradeId": 4,
            "diagnostics": { "score": 0, "passedCount": 3, "failedCount": 1 },
            "meeting": { "location": "Kadikoy", "time": "14:00" },
            "device": { "imei": "3520", "rooted": false, "battery": 91 },
        });
        let s = sections(&contract);
        assert_eq!(titles(&s), vec!["Trade", "Listing", "Diagnostics report", "Meeting", "Device", "Notes / conditions", "Dates"]);
        assert_eq!(rows(&s[0]), vec![("Trade ID", "#4")]);
        // empty strings are skipped
        assert_eq!(rows(&s[1]), vec![("Title", "Pixel 8"), ("Brand", "Google")]);
        assert_eq!(rows(&s[2])[0], ("Score", "0/100"));
        assert_eq!(rows(&s[4]), vec![("battery", "91"), ("imei", "3520")]);
        assert_eq!(rows(&s[5]), vec![("#1", "no returns"), ("#2", "cash only")]);
        assert_eq!(rows(&s[6]), vec![("Accepted", "2025-01-02")]);
    }

    #[test]
    fn test_nested_trade_and_test_rows() {
        let contract = json!({
            "trade": { "tradeId": 9, "listingId": 2, "buyer": "5Grw", "status": "Escrow" },
            "diagnostics": { "tests": [
                { "name": "Screen", "result": "pass" },
                { "testId": "cam", "status": "fail" },
                {}
            ]},
        });
        let s = sections(&contract);
        assert_eq!(rows(&s[0]), vec![("Trade ID", "#9"), ("Listing ID", "#2"), ("Buyer", "5Grw"), ("Status", "Escrow")]);
        assert_eq!(rows(&s[1]), vec![("Screen", "pass"), ("cam", "fail"), ("Test 3", "-")]);
    }

    #[test]
    fn test_unknown_keys_and_plain_notes() {
        let contract = json!({ "notes": "handle with care", "warranty": { "months": 6 }, "escrowAgent": "kod" });
        let s = sections(&contract);
        assert_eq!(titles(&s), vec!["Notes / conditions", "Other"]);
        assert_eq!(rows(&s[0]), vec![("", "handle with care")]);
        assert_eq!(s[1].rows[0], Row { key: "escrowAgent".into(), value: "kod".into() });
        assert_eq!(s[1].rows[1].key, "warranty");
        assert!(s[1].rows[1].value.contains("\"months\": 6"));
    }

    #[test]
    fn test_timestamp_millis_rendered_utc() {
        let s = sections(&json!({ "timestamp": 1_700_000_000_000i64, "createdAt": "yesterday" }));
        assert_eq!(rows(&s[0]), vec![("Timestamp", "2023-11-14 22:13:20 UTC"), ("Created", "yesterday")]);
    }

    #[test]
    fn test_non_object_contract_kept() {
        let s = sections(&json!([1, 2]));
        assert_eq!(titles(&s), vec!["Other"]);
        assert!(sections(&json!({})).is_empty());
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sections(&json!({ "tradeId": 1, "meeting": { "location": "Moda" } })));
        assert!(text.contains("== Trade ==\n  Trade ID  #1\n"));
        assert!(text.contains("== Meeting ==\n  Location  Moda\n"));
    }
}
