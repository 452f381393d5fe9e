//! Response decoding.
//!
//! Structured endpoints answer with a JSON document (`result` plus an optional
//! `errors` list). Export endpoints answer with semicolon-separated text in the
//! legacy Windows-1251 encoding; it goes through [`transcode_legacy_text`] before
//! being split into rows. Row widths are not checked.

use crate::error::ServiceFault;
use crate::operation::ResponseEncoding;
use crate::{Error, Result};
use encoding_rs::WINDOWS_1251;
use serde_json::Value;

/// Field separator of delimited-text responses.
pub const FIELD_DELIMITER: char = ';';

/// One entry of a structured response's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub code: i64,
    pub message: String,
    pub detail: Option<String>,
}

impl ErrorEntry {
    fn from_value(value: &Value) -> Self {
        let code = match value.get("code") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0,
        };
        let message = value
            .get("string")
            .or_else(|| value.get("message"))
            .map(value_text)
            .unwrap_or_default();
        let detail = value
            .get("detail")
            .filter(|v| !v.is_null())
            .map(value_text);
        Self {
            code,
            message,
            detail,
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decoded JSON response.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse {
    /// The `result` member, `null` when absent
    pub result: Value,
    pub errors: Vec<ErrorEntry>,
    /// Whole document as received
    pub raw: Value,
}

impl StructuredResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Decoded response of either encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Structured(StructuredResponse),
    Rows(Vec<Vec<String>>),
}

impl DecodedResponse {
    pub fn as_structured(&self) -> Option<&StructuredResponse> {
        match self {
            DecodedResponse::Structured(s) => Some(s),
            DecodedResponse::Rows(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Vec<String>]> {
        match self {
            DecodedResponse::Rows(rows) => Some(rows),
            DecodedResponse::Structured(_) => None,
        }
    }

    pub fn into_structured(self) -> Result<StructuredResponse> {
        match self {
            DecodedResponse::Structured(s) => Ok(s),
            DecodedResponse::Rows(_) => Err(Error::Server(ServiceFault::local(
                "expected a structured response, got delimited text",
            ))),
        }
    }

    pub fn into_rows(self) -> Result<Vec<Vec<String>>> {
        match self {
            DecodedResponse::Rows(rows) => Ok(rows),
            DecodedResponse::Structured(_) => Err(Error::Server(ServiceFault::local(
                "expected delimited text, got a structured response",
            ))),
        }
    }
}

/// Decode a response body according to the operation's declared encoding.
///
/// Export endpoints report failures as a JSON error document; such a body is
/// returned in structured form so its errors get classified.
pub fn decode(body: &[u8], encoding: ResponseEncoding) -> Result<DecodedResponse> {
    match encoding {
        ResponseEncoding::Structured => decode_structured(body).map(DecodedResponse::Structured),
        ResponseEncoding::DelimitedText => match decode_structured(body) {
            Ok(structured) if structured.has_errors() => {
                Ok(DecodedResponse::Structured(structured))
            }
            _ => Ok(DecodedResponse::Rows(decode_delimited(body))),
        },
    }
}

/// Body text of a failed exchange, transcoded like a successful one.
pub fn failure_text(body: &[u8], encoding: ResponseEncoding) -> String {
    match encoding {
        ResponseEncoding::Structured => String::from_utf8_lossy(body).into_owned(),
        ResponseEncoding::DelimitedText => transcode_legacy_text(body),
    }
}

/// Parse a JSON body. A body that does not parse is a server-side fault.
pub fn decode_structured(body: &[u8]) -> Result<StructuredResponse> {
    let raw: Value = serde_json::from_slice(body).map_err(|e| {
        Error::Server(ServiceFault::local(format!(
            "malformed structured response: {}",
            e
        )))
    })?;

    let errors = raw
        .get("errors")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(ErrorEntry::from_value).collect())
        .unwrap_or_default();
    let result = raw.get("result").cloned().unwrap_or(Value::Null);

    Ok(StructuredResponse {
        result,
        errors,
        raw,
    })
}

/// Transcode and split a delimited-text body into rows of cells.
pub fn decode_delimited(body: &[u8]) -> Vec<Vec<String>> {
    let text = transcode_legacy_text(body);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.split(FIELD_DELIMITER).map(str::to_string).collect())
        .collect()
}

/// Legacy text transcoding: widen the bytes losslessly, re-encode them with the
/// raw-unicode-escape transform, then decode as Windows-1251.
pub fn transcode_legacy_text(body: &[u8]) -> String {
    let widened = widen_latin1(body);
    let bytes = raw_unicode_escape(&widened);
    let (text, _) = WINDOWS_1251.decode_without_bom_handling(&bytes);
    text.into_owned()
}

/// Map every byte to the code point of the same value (ISO-8859-1).
pub fn widen_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Code points below 256 become one byte; others become `\uXXXX` or
/// `\UXXXXXXXX` with lowercase hex digits.
pub fn raw_unicode_escape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let cp = u32::from(ch);
        if cp < 0x100 {
            out.push(cp as u8);
        } else if cp <= 0xFFFF {
            out.extend_from_slice(format!("\\u{:04x}", cp).as_bytes());
        } else {
            out.extend_from_slice(format!("\\U{:08x}", cp).as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // "Москва" and "Россия" in Windows-1251
    const MOSCOW: &[u8] = b"\xcc\xee\xf1\xea\xe2\xe0";
    const RUSSIA: &[u8] = b"\xd0\xee\xf1\xf1\xe8\xff";

    #[test]
    fn widening_then_escaping_restores_the_bytes() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        assert_eq!(raw_unicode_escape(&widen_latin1(&bytes)), bytes);
    }

    #[test]
    fn raw_unicode_escape_pins_escape_sequences() {
        assert_eq!(raw_unicode_escape("a\u{e9}"), b"a\xe9".to_vec());
        assert_eq!(raw_unicode_escape("\u{20ac}"), b"\\u20ac".to_vec());
        assert_eq!(raw_unicode_escape("\u{41f}"), b"\\u041f".to_vec());
        assert_eq!(raw_unicode_escape("\u{1f600}"), b"\\U0001f600".to_vec());
    }

    #[test]
    fn transcodes_windows_1251() {
        assert_eq!(transcode_legacy_text(MOSCOW), "Москва");
        assert_eq!(transcode_legacy_text(RUSSIA), "Россия");
        assert_eq!(transcode_legacy_text(b"abc;123"), "abc;123");
    }

    #[test]
    fn two_rows_of_three_cells() {
        let mut body = Vec::new();
        body.extend_from_slice(b"213;");
        body.extend_from_slice(MOSCOW);
        body.extend_from_slice(b";ru\n225;");
        body.extend_from_slice(RUSSIA);
        body.extend_from_slice(b";ru\n");

        let rows = decode_delimited(&body);
        assert_eq!(
            rows,
            vec![
                vec!["213".to_string(), "Москва".into(), "ru".into()],
                vec!["225".to_string(), "Россия".into(), "ru".into()],
            ]
        );
    }

    #[test]
    fn irregular_rows_pass_through() {
        let rows = decode_delimited(b"a;b;c\nd\ne;f;g;h");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn blank_body_has_no_rows() {
        assert!(decode_delimited(b"").is_empty());
        assert!(decode_delimited(b" \n ").is_empty());
    }

    #[test]
    fn structured_body_with_errors() {
        let body = br#"{"result":null,"errors":[{"code":429,"string":"Too many"},{"code":"53","message":"Auth","detail":{"user":1}}]}"#;
        let decoded = decode_structured(body).unwrap();
        assert_eq!(decoded.errors.len(), 2);
        assert_eq!(
            decoded.errors[0],
            ErrorEntry {
                code: 429,
                message: "Too many".into(),
                detail: None
            }
        );
        assert_eq!(decoded.errors[1].code, 53);
        assert_eq!(decoded.errors[1].message, "Auth");
        assert_eq!(decoded.errors[1].detail.as_deref(), Some(r#"{"user":1}"#));
    }

    #[test]
    fn structured_body_without_errors() {
        let decoded = decode(br#"{"result":[{"id":1}]}"#, ResponseEncoding::Structured).unwrap();
        let structured = decoded.into_structured().unwrap();
        assert!(!structured.has_errors());
        assert_eq!(structured.result, json!([{"id": 1}]));
    }

    #[test]
    fn export_error_document_stays_structured() {
        let body = br#"{"result":null,"errors":[{"code":53,"string":"Authorization failed"}]}"#;
        let decoded = decode(body, ResponseEncoding::DelimitedText).unwrap();
        let structured = decoded.as_structured().unwrap();
        assert_eq!(structured.errors[0].code, 53);

        // JSON without errors, or a bare number, is still export text
        let rows = decode(br#"{"result":1}"#, ResponseEncoding::DelimitedText).unwrap();
        assert!(rows.as_rows().is_some());
        let rows = decode(b"213", ResponseEncoding::DelimitedText).unwrap();
        assert_eq!(rows.as_rows().unwrap(), &[vec!["213".to_string()]]);
    }

    #[test]
    fn failure_text_follows_the_encoding() {
        assert_eq!(failure_text(MOSCOW, ResponseEncoding::DelimitedText), "Москва");
        assert_eq!(failure_text(b"Bad Gateway", ResponseEncoding::Structured), "Bad Gateway");
    }

    #[test]
    fn malformed_structured_body_is_a_server_error() {
        let err = decode(b"<html>oops</html>", ResponseEncoding::Structured).unwrap_err();
        assert!(matches!(err, Error::Server(_)));
        assert!(err.to_string().contains("malformed structured response"));
    }
}
