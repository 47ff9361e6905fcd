//! Channel list rendering
//!
//! The user-info response lists the channels a user belongs to, each
//! with the alias they go by there and the member count.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One channel membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub alias: String,
    #[serde(rename = "memberCount", default)]
    pub member_count: u32,
}

impl ChannelSummary {
    /// Relative link to the channel's score page
    pub fn link(&self) -> String {
        format!("/channel/{}", self.name)
    }

    /// " as <alias>", plus " with N other(s)" when not alone
    pub fn describe(&self) -> String {
        let others = self.member_count.saturating_sub(1);
        match others {
            0 => format!(" as {}", self.alias),
            1 => format!(" as {} with 1 other", self.alias),
            n => format!(" as {} with {} others", self.alias, n),
        }
    }
}

/// Channel list response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserChannels {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelSummary>,
}

impl UserChannels {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// One line per channel, or a single error line
    pub fn render_lines(&self) -> Vec<String> {
        if let Some(ref error) = self.error {
            return vec![format!("ERROR: {}", error)];
        }
        self.channels
            .iter()
            .map(|c| format!("{}{}", c.name, c.describe()))
            .collect()
    }
}
