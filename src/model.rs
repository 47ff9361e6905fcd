//! Board data model and wire schemas
//!
//! | Type | Role |
//! |------|------|
//! | `Target` | one scored entity in a channel |
//! | `Reason` | one `++`/`--` event behind a score |
//! | `TargetDetail` | the reasons + graph for one target, fetched lazily |
//! | `DetailResponse` | normalized `/targetdetailsjson` payload |
//! | `Board` | initial payload: channel + targets (+ fixture details) |

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DetailError, Result};

/// Polarity of a scoring event
///
/// Unrecognized action strings are kept verbatim so they render as the
/// server sent them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    PlusPlus,
    MinusMinus,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::PlusPlus => "++",
            Action::MinusMinus => "--",
            Action::Other(raw) => raw,
        }
    }

    pub fn is_plus_plus(&self) -> bool {
        *self == Action::PlusPlus
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.as_str() {
            "++" => Action::PlusPlus,
            "--" => Action::MinusMinus,
            _ => Action::Other(s),
        }
    }
}

impl From<Action> for String {
    fn from(a: Action) -> Self {
        match a {
            Action::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a target: (channel, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub channel: String,
    pub target: String,
}

impl TargetKey {
    pub fn new(channel: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.target)
    }
}

/// One scored entity. The score is displayed, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub score: i64,
    #[serde(rename = "channelName", default)]
    pub channel_name: String,
}

impl Target {
    pub fn new(channel: impl Into<String>, name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
            channel_name: channel.into(),
        }
    }

    pub fn key(&self) -> TargetKey {
        TargetKey::new(self.channel_name.clone(), self.name.clone())
    }
}

/// One scoring event, immutable once fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub action: Action,
    pub sender: String,
    #[serde(rename = "reason")]
    pub reason_text: String,
    #[serde(rename = "timestampMsec")]
    pub timestamp_msec: i64,
}

/// Detail endpoint payload after normalization
///
/// `problems` lists what had to be dropped or defaulted; an empty list
/// means the payload was well formed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailResponse {
    pub reasons: Vec<Reason>,
    pub graph: Option<String>,
    pub problems: Vec<String>,
}

impl DetailResponse {
    /// Parse a response body.
    ///
    /// Only a body that is not a JSON object at all is an error; missing
    /// or mistyped fields are normalized and recorded in `problems`.
    pub fn from_json(body: &str) -> std::result::Result<Self, DetailError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| DetailError::MalformedResponse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> std::result::Result<Self, DetailError> {
        let Value::Object(mut obj) = value else {
            return Err(DetailError::MalformedResponse(
                "expected a JSON object".to_string(),
            ));
        };

        let mut problems = Vec::new();

        let reasons = match obj.remove("reasons") {
            Some(Value::Array(items)) => {
                let total = items.len();
                let reasons: Vec<Reason> = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect();
                if reasons.len() < total {
                    problems.push(format!(
                        "skipped {} unreadable reason(s)",
                        total - reasons.len()
                    ));
                }
                reasons
            }
            Some(_) => {
                problems.push("`reasons` is not a list".to_string());
                Vec::new()
            }
            None => {
                problems.push("missing `reasons`".to_string());
                Vec::new()
            }
        };

        let graph = match obj.remove("graph") {
            Some(Value::String(url)) => Some(url),
            Some(_) => {
                problems.push("`graph` is not a string".to_string());
                None
            }
            None => {
                problems.push("missing `graph`".to_string());
                None
            }
        };

        Ok(Self {
            reasons,
            graph,
            problems,
        })
    }

    pub fn is_well_formed(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Reasons and graph behind one target's score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDetail {
    pub target: String,
    /// Server-supplied order, never re-sorted
    pub reasons: Vec<Reason>,
    pub graph_image_url: Option<String>,
    /// Set when the payload had to be normalized
    pub notice: Option<String>,
}

impl TargetDetail {
    pub fn from_response(target: impl Into<String>, response: DetailResponse) -> Self {
        let notice = if response.problems.is_empty() {
            None
        } else {
            Some(format!("malformed response: {}", response.problems.join(", ")))
        };
        Self {
            target: target.into(),
            reasons: response.reasons,
            graph_image_url: response.graph,
            notice,
        }
    }

    /// Fallback for a payload that could not be read at all
    pub fn empty(target: impl Into<String>, notice: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reasons: Vec::new(),
            graph_image_url: None,
            notice: Some(notice.into()),
        }
    }
}

/// Target entry as it appears in a board file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardTarget {
    pub name: String,
    pub score: i64,
}

/// Initial payload for one channel's table
///
/// `details` is optional and only consulted by the fixture server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub channel: String,
    #[serde(default)]
    pub targets: Vec<BoardTarget>,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

impl Board {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Targets with the channel name filled in
    pub fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|t| Target::new(self.channel.clone(), t.name.clone(), t.score))
            .collect()
    }

    /// Fixture detail for a target, matched case-insensitively
    pub fn detail_for(&self, target: &str) -> Option<&Value> {
        self.details.get(target).or_else(|| {
            self.details
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
                .map(|(_, v)| v)
        })
    }
}
