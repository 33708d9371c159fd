//! Generic response envelope shared by every API endpoint

use serde::{Deserialize, Deserializer};

/// Status fields carried next to `result` in every API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<ResponseInfo>,

    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<ResponseInfo>,
}

impl Response {
    /// Join the reported error messages, e.g. `"Authentication error (10000)"`
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }

        Some(
            self.errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// A single error or message entry in the envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseInfo {
    pub code: i64,
    pub message: String,
}

/// Pagination metadata on collection responses
///
/// Decoded for inspection only; the client never follows pages. Every field
/// tolerates `null` so odd metadata never fails an otherwise valid list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResultInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub page: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub per_page: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_pages: u64,
}

/// Decode `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
