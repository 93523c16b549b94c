//! Controller generations and puck types.

use crate::robot::consts::{SPINE_CAPACITY, UNIPUCK_CAPACITY};
use crate::robot::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Sample changer hardware generation.
///
/// Selected before connecting and fixed for the lifetime of a connection.
/// Every field table and argument layout used by the client depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Model {
    /// CATS: lid addressing, dense digital I/O strings, position/message queries.
    #[default]
    Cats,
    /// ISARA: puck addressing plus a secondary puck-presence input stream.
    Isara,
    /// ISARA2: compact argument lists and comma-separated digital I/O.
    Isara2,
}

impl Model {
    /// Name as reported to operators.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cats => "CATS",
            Self::Isara => "ISARA",
            Self::Isara2 => "ISARA2",
        }
    }

    /// Samples are addressed by puck number instead of lid number.
    #[inline]
    pub const fn uses_puck_addressing(self) -> bool {
        !matches!(self, Self::Cats)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cats" | "a" => Ok(Self::Cats),
            "isara" | "b" => Ok(Self::Isara),
            "isara2" | "c" => Ok(Self::Isara2),
            other => Err(ClientError::InvalidArgument(format!(
                "unknown model '{other}' (expected cats, isara or isara2)"
            ))),
        }
    }
}

impl TryFrom<String> for Model {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Puck type configured for one dewar slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuckType {
    /// Slot not in use.
    Ignore,
    /// SPINE puck, 10 samples.
    Spine,
    /// Unipuck, 16 samples.
    Unipuck,
}

impl PuckType {
    /// Parse one configuration character (`0`, `1` or `2`).
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Ignore),
            '1' => Some(Self::Spine),
            '2' => Some(Self::Unipuck),
            _ => None,
        }
    }

    /// Configuration character for this type.
    pub const fn as_char(self) -> char {
        match self {
            Self::Ignore => '0',
            Self::Spine => '1',
            Self::Unipuck => '2',
        }
    }

    /// Number of samples a puck of this type holds.
    pub const fn capacity(self) -> u8 {
        match self {
            Self::Ignore => 0,
            Self::Spine => SPINE_CAPACITY,
            Self::Unipuck => UNIPUCK_CAPACITY,
        }
    }

    /// Sample type code used by the controller memory commands
    /// (0 = spine/other, 1 = unipuck/Hampton).
    pub const fn sample_type_code(self) -> i64 {
        match self {
            Self::Unipuck => 1,
            Self::Spine | Self::Ignore => 0,
        }
    }

    /// Parse a puck type string, one character per slot.
    ///
    /// Unknown characters are logged and treated as [`PuckType::Ignore`].
    pub fn parse_list(s: &str) -> Vec<Self> {
        s.chars()
            .enumerate()
            .map(|(slot, c)| {
                Self::from_char(c).unwrap_or_else(|| {
                    warn!("Wrong puck type '{}' for slot {}, ignoring it", c, slot + 1);
                    Self::Ignore
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_str_is_case_insensitive() {
        assert_eq!("CATS".parse::<Model>().unwrap(), Model::Cats);
        assert_eq!(" Isara ".parse::<Model>().unwrap(), Model::Isara);
        assert_eq!("isara2".parse::<Model>().unwrap(), Model::Isara2);
        assert!("unicorn".parse::<Model>().is_err());
    }

    #[test]
    fn model_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            model: Model,
        }
        let w: Wrapper = toml::from_str("model = \"isara2\"").unwrap();
        assert_eq!(w.model, Model::Isara2);
    }

    #[test]
    fn only_cats_uses_lid_addressing() {
        assert!(!Model::Cats.uses_puck_addressing());
        assert!(Model::Isara.uses_puck_addressing());
        assert!(Model::Isara2.uses_puck_addressing());
    }

    #[test]
    fn parse_list_maps_unknown_to_ignore() {
        let types = PuckType::parse_list("0129");
        assert_eq!(
            types,
            vec![
                PuckType::Ignore,
                PuckType::Spine,
                PuckType::Unipuck,
                PuckType::Ignore
            ]
        );
    }

    #[test]
    fn capacities() {
        assert_eq!(PuckType::Spine.capacity(), 10);
        assert_eq!(PuckType::Unipuck.capacity(), 16);
        assert_eq!(PuckType::Ignore.capacity(), 0);
    }
}
