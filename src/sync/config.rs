//! Generation settings
//!
//! Loaded from JSON. Every field except `emotes[].name` is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bits::BitWidth;
use crate::Result;

/// Integer parameter holding the locally selected animation id
pub const SEND_ANIM_ID: &str = "OSD_SendAnim";

/// One selectable dance: up to three clips played in sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteEntry {
    /// Menu/display name
    pub name: String,

    /// Clip played once on entry
    #[serde(default)]
    pub entry: Option<String>,

    /// Clip looped until the id changes
    #[serde(default, rename = "loop")]
    pub loop_clip: Option<String>,

    /// Clip played once on the way out
    #[serde(default)]
    pub exit: Option<String>,
}

impl EmoteEntry {
    /// Entry with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            loop_clip: None,
            exit: None,
        }
    }
}

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Tracking key for generated assets
    #[serde(default)]
    pub asset_key: String,

    /// Prefix applied to contact/receive parameter names
    #[serde(default)]
    pub contact_prefix: String,

    /// Whether generated states write defaults
    #[serde(default = "default_write_defaults")]
    pub write_defaults: bool,

    /// Selectable dances; id k (1-based) plays `emotes[k - 1]`
    #[serde(default)]
    pub emotes: Vec<EmoteEntry>,
}

fn default_write_defaults() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            asset_key: String::new(),
            contact_prefix: String::new(),
            write_defaults: default_write_defaults(),
            emotes: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Parse from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Channels needed for the configured emotes plus idle
    pub fn bit_width(&self) -> Result<BitWidth> {
        BitWidth::for_count(self.emotes.len())
    }

    /// Contact receiver parameters: `{prefix}OSD_RecvBit{i}`
    pub fn recv_bit_names(&self) -> Result<Vec<String>> {
        let width = self.bit_width()?.get();
        Ok((0..width)
            .map(|i| format!("{}OSD_RecvBit{i}", self.contact_prefix))
            .collect())
    }

    /// Network-synced bit parameters: `paramSendAnimIdBits_{i}`
    pub fn send_bit_names(&self) -> Result<Vec<String>> {
        let width = self.bit_width()?.get();
        Ok((0..width).map(|i| format!("paramSendAnimIdBits_{i}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncError;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = SyncConfig::from_json_str(r#"{"emotes": [{"name": "Pokedance"}]}"#).unwrap();
        assert!(config.write_defaults);
        assert_eq!(config.contact_prefix, "");
        assert_eq!(config.emotes, vec![EmoteEntry::named("Pokedance")]);
    }

    #[test]
    fn test_loop_field_rename() {
        let config = SyncConfig::from_json_str(
            r#"{"emotes": [{"name": "Arona", "entry": "arona_in", "loop": "arona_loop"}]}"#,
        )
        .unwrap();
        let emote = &config.emotes[0];
        assert_eq!(emote.entry.as_deref(), Some("arona_in"));
        assert_eq!(emote.loop_clip.as_deref(), Some("arona_loop"));
        assert_eq!(emote.exit, None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SyncConfig::from_json_str(r#"{"emotes": 3}"#),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn test_parameter_names() {
        let config = SyncConfig {
            contact_prefix: "Av_".to_string(),
            emotes: (0..5).map(|i| EmoteEntry::named(format!("E{i}"))).collect(),
            ..Default::default()
        };
        assert_eq!(config.bit_width().unwrap().get(), 3);
        assert_eq!(
            config.recv_bit_names().unwrap(),
            vec!["Av_OSD_RecvBit0", "Av_OSD_RecvBit1", "Av_OSD_RecvBit2"]
        );
        assert_eq!(config.send_bit_names().unwrap()[2], "paramSendAnimIdBits_2");
    }
}
