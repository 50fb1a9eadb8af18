//! Response extraction. Turns a free-form LLM reply into a [`ContactRecord`].
//!
//! Strategies run in order and the first one that yields a JSON object wins:
//! whole text, ```json fence, first-`{`-to-last-`}` span, then a line scan
//! over bilingual field keywords. Extraction never fails; a reply with
//! nothing recognizable produces an all-empty record.

use serde_json::{Map, Value};
use tracing::debug;

use crate::cards::models::{ContactRecord, CONTACT_FIELDS};

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Keyword sets per field, checked in this order. The first field with a
/// matching keyword claims the line.
const FIELD_KEYWORDS: [(&str, &[&str]); 7] = [
    ("name", &["名前", "氏名", "name"]),
    ("company", &["会社", "company"]),
    ("department", &["部署", "department"]),
    ("position", &["役職", "position", "title"]),
    ("phone", &["電話", "phone", "tel"]),
    ("email", &["メール", "email", "mail"]),
    ("address", &["住所", "address"]),
];

/// Key/value separators in priority order. The first one present in a line
/// is used, regardless of position.
const SEPARATORS: [char; 5] = [':', '：', '=', '→', '-'];

/// Extracts contact fields from `raw`, recording `raw` as the record's
/// `raw_text`.
pub fn extract_contact(raw: &str) -> ContactRecord {
    let mut record = extract_fields(raw);
    record.raw_text = raw.to_string();
    record
}

fn extract_fields(raw: &str) -> ContactRecord {
    if let Some(obj) = parse_object(raw) {
        return record_from_object(&obj);
    }
    debug!("Direct JSON parse failed, trying fenced block");

    if let Some(inner) = fenced_json(raw) {
        if let Some(obj) = parse_object(inner) {
            return record_from_object(&obj);
        }
        debug!("Fenced block is not a JSON object");
    }

    if let Some(span) = brace_span(raw) {
        if let Some(obj) = parse_object(span) {
            return record_from_object(&obj);
        }
        debug!("Brace span is not a JSON object");
    }

    debug!("Falling back to line scan");
    scan_lines(raw)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Interior of the first ```json fence, up to the next closing fence.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(rest[..end].trim())
}

/// Greedy span from the first `{` to the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn record_from_object(obj: &Map<String, Value>) -> ContactRecord {
    let mut record = ContactRecord::default();
    for field in CONTACT_FIELDS {
        if let (Some(slot), Some(value)) = (record.field_mut(field), obj.get(field)) {
            *slot = scalar_text(value);
        }
    }
    record
}

/// Text form of a JSON scalar. Null and containers become empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn scan_lines(text: &str) -> ContactRecord {
    let mut record = ContactRecord::default();
    for line in text.lines() {
        let Some(field) = match_field(line) else {
            continue;
        };
        if let Some(slot) = record.field_mut(field) {
            *slot = extract_value(line);
        }
    }
    record
}

fn match_field(line: &str) -> Option<&'static str> {
    let lower = line.to_lowercase();
    FIELD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(field, _)| *field)
}

/// Everything after the first occurrence of the highest-priority separator
/// present in `line`, trimmed and unquoted. Empty when no separator is present.
fn extract_value(line: &str) -> String {
    let Some((_, rest)) = SEPARATORS
        .iter()
        .find_map(|sep| line.split_once(*sep))
    else {
        return String::new();
    };
    let value = unquote(strip_json_comma(rest.trim()));
    value.trim().to_string()
}

/// Drops the `,` after a quoted value (`"Taro",`). Unquoted values keep it.
fn strip_json_comma(value: &str) -> &str {
    match value.strip_suffix(',').map(str::trim_end) {
        Some(inner) if inner.ends_with('"') || inner.ends_with('\'') => inner,
        _ => value,
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c: char| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_only(mut record: ContactRecord) -> ContactRecord {
        record.raw_text.clear();
        record
    }

    #[test]
    fn test_direct_json_is_used_verbatim() {
        let raw = r#"{"name":"山田太郎","company":"株式会社サンプル","extra":"ignored"}"#;
        let record = extract_contact(raw);
        assert_eq!(record.name, "山田太郎");
        assert_eq!(record.company, "株式会社サンプル");
        assert_eq!(record.department, "");
        assert_eq!(record.address, "");
        assert_eq!(record.raw_text, raw);
    }

    #[test]
    fn test_fenced_block_matches_unwrapped_interior() {
        let interior = r#"{
  "name": "鈴木一郎",
  "position": "部長",
  "email": "ichiro@example.co.jp"
}"#;
        let wrapped = format!("以下が抽出結果です。\n```json\n{interior}\n```\nご確認ください。");
        assert_eq!(
            fields_only(extract_contact(&wrapped)),
            fields_only(extract_contact(interior))
        );
        assert_eq!(extract_contact(&wrapped).position, "部長");
    }

    #[test]
    fn test_brace_span_inside_prose() {
        let raw = r#"Sure! Here is the card: {"email": "a@b.jp", "phone": "03-0000-1111"} Let me know."#;
        let record = extract_contact(raw);
        assert_eq!(record.email, "a@b.jp");
        assert_eq!(record.phone, "03-0000-1111");
    }

    #[test]
    fn test_malformed_fence_falls_through_to_brace_span() {
        let raw = "```json\nnot json at all\n```\nbut here: {\"name\":\"X\"}";
        assert_eq!(extract_contact(raw).name, "X");
    }

    #[test]
    fn test_line_scan_with_japanese_labels() {
        let raw = "氏名: 山田 太郎\n会社：株式会社テスト\n電話 = 03-1234-5678\nメール → taro@example.jp\n住所: 東京都千代田区1-1";
        let record = extract_contact(raw);
        assert_eq!(record.name, "山田 太郎");
        assert_eq!(record.company, "株式会社テスト");
        assert_eq!(record.phone, "03-1234-5678");
        assert_eq!(record.email, "taro@example.jp");
        assert_eq!(record.address, "東京都千代田区1-1");
        assert_eq!(record.department, "");
        assert_eq!(record.position, "");
    }

    #[test]
    fn test_line_scan_only_fills_matched_fields() {
        let record = fields_only(extract_contact("会社: Acme"));
        assert_eq!(
            record,
            ContactRecord {
                company: "Acme".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_first_matching_field_claims_the_line() {
        let record = extract_contact("Company Name: Acme");
        assert_eq!(record.name, "Acme");
        assert_eq!(record.company, "");
    }

    #[test]
    fn test_keywords_match_case_insensitively() {
        let record = extract_contact("TEL：03-9999-0000\nE-MAIL: x@y.z");
        assert_eq!(record.phone, "03-9999-0000");
        assert_eq!(record.email, "x@y.z");
    }

    #[test]
    fn test_later_lines_overwrite_earlier_ones() {
        let record = extract_contact("name: First\nname: Second");
        assert_eq!(record.name, "Second");
    }

    #[test]
    fn test_line_without_separator_clears_the_field() {
        let record = extract_contact("name: Hanako\nname unknown");
        assert_eq!(record.name, "");

        let record = extract_contact("name unknown\nname: Hanako");
        assert_eq!(record.name, "Hanako");
    }

    #[test]
    fn test_unquoted_trailing_comma_is_kept() {
        let record = extract_contact("company: Acme,\nposition: \"CTO\" ,");
        assert_eq!(record.company, "Acme,");
        assert_eq!(record.position, "CTO");
    }

    #[test]
    fn test_quotes_and_trailing_comma_are_stripped() {
        let raw = "\"name\": \"Taro\",\n'position': 'CTO'";
        let record = extract_contact(raw);
        assert_eq!(record.name, "Taro");
        assert_eq!(record.position, "CTO");
    }

    #[test]
    fn test_value_keeps_text_after_first_separator() {
        let record = extract_contact("address: 1-2-3 Shibuya: Tokyo");
        assert_eq!(record.address, "1-2-3 Shibuya: Tokyo");
    }

    #[test]
    fn test_separator_priority_beats_position() {
        // '-' appears first but ':' ranks higher.
        let record = extract_contact("phone - office: 03-1111-2222");
        assert_eq!(record.phone, "03-1111-2222");
    }

    #[test]
    fn test_non_string_values_are_normalized() {
        let record = extract_contact(r#"{"phone": 312345, "email": null, "name": ["x"]}"#);
        assert_eq!(record.phone, "312345");
        assert_eq!(record.email, "");
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_non_object_json_is_not_a_record() {
        let record = extract_contact("[1, 2, 3]");
        assert!(record.is_blank());
    }

    #[test]
    fn test_unrecognizable_text_yields_empty_record() {
        let raw = "申し訳ありませんが、画像を読み取れませんでした。";
        let record = extract_contact(raw);
        assert!(record.is_blank());
        assert_eq!(record.raw_text, raw);
    }

    #[test]
    fn test_empty_input() {
        let record = extract_contact("");
        assert_eq!(record, ContactRecord::default());
    }
}
