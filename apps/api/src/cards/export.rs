//! Download formats for an extracted card.

use anyhow::Result;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::cards::models::ContactRecord;

/// CSV header labels, aligned with `CONTACT_FIELDS`.
pub const CSV_HEADERS: [&str; 7] = [
    "氏名",
    "会社名",
    "部署",
    "役職",
    "電話番号",
    "メールアドレス",
    "住所",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// `business_card_<millis>.<ext>`
    pub fn filename(self, timestamp_millis: i64) -> String {
        format!("business_card_{timestamp_millis}.{}", self.extension())
    }

    pub fn render(self, record: &ContactRecord) -> Result<String> {
        match self {
            ExportFormat::Json => to_json(record),
            ExportFormat::Csv => to_csv(record),
        }
    }
}

#[derive(Serialize)]
struct ContactExport<'a> {
    name: &'a str,
    company: &'a str,
    department: &'a str,
    position: &'a str,
    phone: &'a str,
    email: &'a str,
    address: &'a str,
}

/// Pretty-printed JSON of the seven contact fields.
pub fn to_json(record: &ContactRecord) -> Result<String> {
    let export = ContactExport {
        name: &record.name,
        company: &record.company,
        department: &record.department,
        position: &record.position,
        phone: &record.phone,
        email: &record.email,
        address: &record.address,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Header row plus one data row, separated by `\n`. Headers are bare; every
/// data value is quoted.
pub fn to_csv(record: &ContactRecord) -> Result<String> {
    let header = csv_row(&CSV_HEADERS, QuoteStyle::Necessary)?;
    let row = csv_row(&record.contact_values(), QuoteStyle::Always)?;
    Ok(format!("{header}\n{row}"))
}

/// One CSV record without its terminator.
fn csv_row(values: &[&str], style: QuoteStyle) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .from_writer(Vec::new());
    writer.write_record(values)?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut line = String::from_utf8(bytes)?;
    line.truncate(line.trim_end_matches('\n').len());
    Ok(line)
}
