//! Flat result record and its CSV / JSON / XML envelopes.
//!
//! All three formats render the same ordered field list through one
//! value formatter, so a record reads identically whichever envelope the
//! caller picks.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::ConfigError;

/// Placeholder for fields that do not apply to a run.
pub const NOT_APPLICABLE: &str = "N/A";

/// XML root element.
pub const XML_ROOT: &str = "htstegoresult";

/// Decimal places kept for real-valued fields.
const REAL_PRECISION: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    #[default]
    Json,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// One field value of a [`ResultRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    Real(f64),
    NotApplicable,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// `Some(v)` as text, `None` as [`NOT_APPLICABLE`].
    pub fn optional(value: Option<impl Into<String>>) -> Self {
        value.map_or(FieldValue::NotApplicable, |v| FieldValue::Text(v.into()))
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Flag(b) => Value::Bool(*b),
            FieldValue::Real(r) => Number::from_f64(round_real(*r))
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(format_real(*r))),
            FieldValue::NotApplicable => Value::String(NOT_APPLICABLE.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Real(r) => f.write_str(&format_real(*r)),
            FieldValue::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

fn round_real(value: f64) -> f64 {
    let scale = 10f64.powi(REAL_PRECISION);
    (value * scale).round() / scale
}

/// Shared real formatter: four decimals, `x.0` for whole numbers,
/// `inf` / `-inf` / `nan` for non-finite values.
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rounded = round_real(value);
    let text = format!("{}", rounded);
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Ordered list of named result fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) -> &mut Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Json => self.to_json(),
            OutputFormat::Xml => self.to_xml(),
        }
    }

    /// Header row and one data row.
    pub fn to_csv(&self) -> String {
        let header: Vec<String> = self.fields.iter().map(|(n, _)| csv_escape(n)).collect();
        let row: Vec<String> = self
            .fields
            .iter()
            .map(|(_, v)| csv_escape(&v.to_string()))
            .collect();
        format!("{}\n{}", header.join(","), row.join(","))
    }

    /// Single JSON object with fields in insertion order.
    pub fn to_json(&self) -> String {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect();
        Value::Object(map).to_string()
    }

    /// `<htstegoresult>` with one child element per field.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" ?>");
        out.push_str(&format!("<{}>", XML_ROOT));
        for (name, value) in &self.fields {
            out.push_str(&format!(
                "<{name}>{}</{name}>",
                xml_escape(&value.to_string()),
                name = name
            ));
        }
        out.push_str(&format!("</{}>", XML_ROOT));
        out
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> ResultRecord {
        let mut record = ResultRecord::new();
        record
            .push("status", FieldValue::text("ok"))
            .push("errdiff_kernel", FieldValue::NotApplicable)
            .push("number_of_shares", FieldValue::Integer(4))
            .push("payload_compression", FieldValue::Flag(false))
            .push("cover_file", FieldValue::text("a,b.png"))
            .push("avg_psnr", FieldValue::Real(27.123456));
        record
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(27.123456), "27.1235");
        assert_eq!(format_real(42.0), "42.0");
        assert_eq!(format_real(f64::INFINITY), "inf");
        assert_eq!(format_real(0.99999), "1.0");
    }

    #[test]
    fn test_csv() {
        assert_eq!(
            sample_record().to_csv(),
            "status,errdiff_kernel,number_of_shares,payload_compression,cover_file,avg_psnr\n\
             ok,N/A,4,false,\"a,b.png\",27.1235"
        );
    }

    #[test]
    fn test_json_keeps_order() {
        assert_eq!(
            sample_record().to_json(),
            r#"{"status":"ok","errdiff_kernel":"N/A","number_of_shares":4,"payload_compression":false,"cover_file":"a,b.png","avg_psnr":27.1235}"#
        );
    }

    #[test]
    fn test_json_infinite_real_is_string() {
        let mut record = ResultRecord::new();
        record.push("avg_snr", FieldValue::Real(f64::INFINITY));
        assert_eq!(record.to_json(), r#"{"avg_snr":"inf"}"#);
    }

    #[test]
    fn test_xml() {
        let mut record = ResultRecord::new();
        record
            .push("status", FieldValue::text("payload too long"))
            .push("cover_file", FieldValue::text("<a&b>.png"));
        assert_eq!(
            record.to_xml(),
            "<?xml version=\"1.0\" ?><htstegoresult><status>payload too long</status>\
             <cover_file>&lt;a&amp;b&gt;.png</cover_file></htstegoresult>"
        );
    }

    #[test]
    fn test_format_parity() {
        let record = sample_record();
        let expected: Vec<String> = record.fields().iter().map(|(_, v)| v.to_string()).collect();

        let json: Map<String, Value> = serde_json::from_str(&record.to_json()).unwrap();
        let from_json: Vec<String> = json
            .values()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        assert_eq!(from_json, expected);

        let xml = record.to_xml();
        for (name, value) in record.fields() {
            let element = format!("<{name}>{}</{name}>", xml_escape(&value.to_string()), name = name);
            assert!(xml.contains(&element), "missing {} in {}", element, xml);
        }

        assert!(record.to_csv().ends_with(&expected.last().cloned().unwrap()));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("XML".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
