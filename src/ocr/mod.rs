//! OCR entry model
//!
//! The OCR provider returns one [`RawEntry`] per signature row; page and
//! row metadata are attached afterwards to form an [`OcrEntry`], the
//! matching engine's input record. Entries with an empty name are a
//! defined invalid-input case: the batch orchestrator skips them.

pub mod cache;
pub mod provider;

use crate::normalize::normalize;
use serde::{Deserialize, Deserializer, Serialize};

/// One signature row as parsed from a page image, before metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEntry {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Address", default)]
    pub address: String,

    #[serde(rename = "Date", default)]
    pub date: String,

    /// Ward codes are text; providers sometimes emit them as numbers.
    #[serde(rename = "Ward", default, deserialize_with = "ward_as_string")]
    pub ward: String,
}

/// One signatory row with its source metadata attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OcrEntry {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Address", default)]
    pub address: String,

    #[serde(rename = "Date", default)]
    pub date: String,

    #[serde(rename = "Ward", default, deserialize_with = "ward_as_string")]
    pub ward: String,

    #[serde(rename = "Page Number", default)]
    pub page_number: u32,

    #[serde(rename = "Row Number", default)]
    pub row_number: u32,

    #[serde(rename = "Filename", default)]
    pub filename: String,
}

impl OcrEntry {
    /// An entry without a usable name cannot be matched.
    pub fn has_name(&self) -> bool {
        !normalize(&self.name).is_empty()
    }
}

/// Attach 1-based page and row numbers plus the source filename to raw
/// provider output.
pub fn attach_metadata(entries: Vec<RawEntry>, page_index: usize, filename: &str) -> Vec<OcrEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(row, raw)| OcrEntry {
            name: raw.name,
            address: raw.address,
            date: raw.date,
            ward: raw.ward,
            page_number: page_index as u32 + 1,
            row_number: row as u32 + 1,
            filename: filename.to_string(),
        })
        .collect()
}

fn ward_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
