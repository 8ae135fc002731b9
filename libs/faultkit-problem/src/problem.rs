//! RFC 9457 Problem Details for HTTP APIs (pure data model, no HTTP framework dependencies)

use http::StatusCode;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::problem_type_for;

/// Members defined by RFC 9457; an extension never takes one of these names.
pub const STANDARD_MEMBERS: [&str; 5] = ["type", "title", "status", "detail", "instance"];

/// Whether `name` is one of the [`STANDARD_MEMBERS`].
#[must_use]
pub fn is_standard_member(name: &str) -> bool {
    STANDARD_MEMBERS.contains(&name)
}

/// RFC 9457 Problem Details for HTTP APIs.
///
/// Every member is optional on the wire. Converters produce problems without
/// a status; the classifiers stamp `status` and `type` once they know the
/// HTTP status of the failure.
///
/// Extensions named like a standard member are never written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[must_use]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type", default)]
    pub type_url: Option<String>,
    /// A short, human-readable summary of the problem type.
    #[serde(default)]
    pub title: Option<String>,
    /// The HTTP status code for this occurrence of the problem.
    #[serde(default)]
    pub status: Option<u16>,
    /// A human-readable explanation specific to this occurrence of the problem.
    #[serde(default)]
    pub detail: Option<String>,
    /// A URI reference that identifies the specific occurrence of the problem.
    #[serde(default)]
    pub instance: Option<String>,
    /// Extension members, written next to the standard members.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Serialize for Problem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(type_url) = &self.type_url {
            map.serialize_entry("type", type_url)?;
        }
        if let Some(title) = &self.title {
            map.serialize_entry("title", title)?;
        }
        if let Some(status) = self.status {
            map.serialize_entry("status", &status)?;
        }
        if let Some(detail) = &self.detail {
            map.serialize_entry("detail", detail)?;
        }
        if let Some(instance) = &self.instance {
            map.serialize_entry("instance", instance)?;
        }
        for (key, value) in &self.extensions {
            if !is_standard_member(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Structured error entry stored under the `errors` extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Key of the offending field as reported by the downstream service
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: Some(description.into()),
        }
    }
}

impl Problem {
    /// Create a problem carrying only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Create a fully stamped problem: status, resolved type and title.
    pub fn for_status(status: StatusCode, title: impl Into<String>) -> Self {
        Self::titled(title).stamped(status)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = Some(type_url.into());
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = Some(uri.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Stamp the numeric status and the type resolved from it.
    ///
    /// A type supplied earlier (for example by a converter) is overwritten;
    /// an unmapped status leaves `type` unset.
    pub fn stamp(&mut self, status: StatusCode) {
        self.status = Some(status.as_u16());
        self.type_url = problem_type_for(status).map(str::to_owned);
    }

    pub fn stamped(mut self, status: StatusCode) -> Self {
        self.stamp(status);
        self
    }

    /// Whether the problem has a non-blank title.
    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Status as a typed code, if present and valid.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.and_then(|s| StatusCode::from_u16(s).ok())
    }
}
