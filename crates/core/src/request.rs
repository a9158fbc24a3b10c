//! Moderation request records as stored in the hosted `request_data` table.
//!
//! Two revisions of the record shape exist in the wild: older rows carry an
//! array of up to six flags, newer rows a single flag object. [`Flags`]
//! accepts both and exposes one API over them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{RequestId, Timestamp};

/// Maximum number of flags carried by an array-form record.
pub const MAX_FLAGS: usize = 6;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Kind of content submitted for moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
        }
    }

    /// Human-readable label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Text => "Text",
            ContentType::Image => "Image",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation category a flag belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FlagType {
    Toxicity,
    Harassment,
    HateSpeech,
    Sexual,
    Violence,
    Spam,
}

impl FlagType {
    /// Every category, in display order.
    pub const ALL: [FlagType; 6] = [
        FlagType::Toxicity,
        FlagType::Harassment,
        FlagType::HateSpeech,
        FlagType::Sexual,
        FlagType::Violence,
        FlagType::Spam,
    ];

    /// Wire name, e.g. `"hate-speech"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Toxicity => "toxicity",
            FlagType::Harassment => "harassment",
            FlagType::HateSpeech => "hate-speech",
            FlagType::Sexual => "sexual",
            FlagType::Violence => "violence",
            FlagType::Spam => "spam",
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlagType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid flag type '{s}'. Must be one of: {}",
                    FlagType::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

/// Review status of a record.
///
/// `Flagged` and `Clean` are the only values the review workflow produces.
/// `Borderline` and any unknown stored value (`External`) are written by the
/// upstream moderation pipeline and are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Flagged,
    Clean,
    Borderline,
    External(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Flagged => "flagged",
            RequestStatus::Clean => "clean",
            RequestStatus::Borderline => "borderline",
            RequestStatus::External(raw) => raw,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "flagged" => RequestStatus::Flagged,
            "clean" => RequestStatus::Clean,
            "borderline" => RequestStatus::Borderline,
            _ => RequestStatus::External(raw),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::External(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// A single category verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: FlagType,
    #[validate(range(min = 0.0, max = 1.0))]
    pub score: f64,
    pub flagged: bool,
}

impl Flag {
    pub fn new(kind: FlagType, score: f64, flagged: bool) -> Self {
        Self {
            kind,
            score,
            flagged,
        }
    }
}

/// The flag payload of a record, in either of its two stored shapes.
///
/// A payload that fits neither shape (an unknown category, a score of the
/// wrong type) is kept verbatim as `External` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flags {
    Single(Flag),
    Many(Vec<Flag>),
    External(serde_json::Value),
}

impl Flags {
    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        match self {
            Flags::Single(flag) => std::slice::from_ref(flag).iter(),
            Flags::Many(flags) => flags.iter(),
            Flags::External(_) => std::slice::Iter::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when at least one flag is raised.
    ///
    /// For an external payload, any object carrying `"flagged": true`
    /// counts as raised.
    pub fn any_flagged(&self) -> bool {
        match self {
            Flags::External(raw) => external_entries(raw)
                .any(|entry| entry.get("flagged").and_then(serde_json::Value::as_bool) == Some(true)),
            _ => self.iter().any(|flag| flag.flagged),
        }
    }

    /// Wire names of every flag category present, including unrecognized
    /// ones in an external payload.
    pub fn type_names(&self) -> Vec<&str> {
        match self {
            Flags::External(raw) => external_entries(raw)
                .filter_map(|entry| entry.get("type").and_then(serde_json::Value::as_str))
                .collect(),
            _ => self.iter().map(|flag| flag.kind.as_str()).collect(),
        }
    }

    pub fn find(&self, kind: FlagType) -> Option<&Flag> {
        self.iter().find(|flag| flag.kind == kind)
    }

    /// Flip the `flagged` bit of the flag of the given kind.
    ///
    /// Returns the new value, or `None` when no flag of that kind exists.
    pub fn toggle(&mut self, kind: FlagType) -> Option<bool> {
        let flag = match self {
            Flags::Single(flag) => Some(flag).filter(|f| f.kind == kind),
            Flags::Many(flags) => flags.iter_mut().find(|f| f.kind == kind),
            Flags::External(_) => None,
        }?;
        flag.flagged = !flag.flagged;
        Some(flag.flagged)
    }

    /// Check scores and, for the array form, size and type uniqueness.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Flags::External(raw) = self {
            return Err(CoreError::Validation(format!("Unrecognized flag payload {raw}")));
        }
        for flag in self.iter() {
            flag.validate()?;
        }

        if let Flags::Many(flags) = self {
            if flags.len() > MAX_FLAGS {
                return Err(CoreError::Validation(format!(
                    "A request carries at most {MAX_FLAGS} flags, got {}",
                    flags.len()
                )));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = flags.iter().find(|f| !seen.insert(f.kind)) {
                return Err(CoreError::Validation(format!(
                    "Duplicate flag type '{}'",
                    dup.kind
                )));
            }
        }

        Ok(())
    }
}

fn external_entries(raw: &serde_json::Value) -> impl Iterator<Item = &serde_json::Value> {
    match raw {
        serde_json::Value::Array(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    }
    .into_iter()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A row from the `request_data` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub id: RequestId,
    pub timestamp: Timestamp,
    pub content_type: ContentType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Optimistic concurrency token. Rows predating the column, or holding
    /// `null`, read as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub version: i64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

impl ModerationRequest {
    /// Merge a partial update into this record.
    pub fn apply(&mut self, patch: &RequestPatch) {
        if let Some(flags) = &patch.flags {
            self.flags = Some(flags.clone());
        }
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(feedback) = &patch.feedback {
            self.feedback = feedback.clone();
        }
    }
}

/// Insert payload: a record without its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewModerationRequest {
    pub timestamp: Timestamp,
    pub content_type: ContentType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl NewModerationRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation(
                "Request content must not be empty".to_string(),
            ));
        }
        if let Some(flags) = &self.flags {
            flags.validate()?;
        }
        Ok(())
    }

    /// Materialize the stored row for a store that assigns `id` and `version`.
    pub fn into_record(self, id: RequestId, version: i64) -> ModerationRequest {
        ModerationRequest {
            id,
            timestamp: self.timestamp,
            content_type: self.content_type,
            content: self.content,
            flags: self.flags,
            status: self.status,
            feedback: self.feedback,
            version,
        }
    }
}

/// Partial update payload. Absent fields are left untouched by the store.
///
/// `feedback: Some(None)` clears the annotation and is sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Flags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
