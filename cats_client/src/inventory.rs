//! Dewar puck layout and presence.

use crate::decoder::Telemetry;
use crate::profile::{ModelProfile, PresenceSource};
use cats_common::robot::model::PuckType;
use tracing::debug;

/// Configured puck types and the presence bits of the last poll.
///
/// Both vectors always have one entry per configured slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PuckInventory {
    types: Vec<PuckType>,
    presence: Vec<bool>,
}

impl PuckInventory {
    /// Model default layout, nothing present.
    pub fn for_profile(profile: &ModelProfile) -> Self {
        Self::from_types(profile.default_puck_types)
    }

    /// Layout from a configuration string, the model default when `None`.
    pub fn from_config(profile: &ModelProfile, puck_types: Option<&str>) -> Self {
        match puck_types {
            Some(types) => Self::from_types(types),
            None => Self::for_profile(profile),
        }
    }

    fn from_types(puck_types: &str) -> Self {
        let types = PuckType::parse_list(puck_types);
        let presence = vec![false; types.len()];
        Self { types, presence }
    }

    /// Replace the layout. Presence is cleared until the next poll.
    pub fn set_types(&mut self, puck_types: &str) {
        *self = Self::from_types(puck_types);
    }

    pub fn types(&self) -> &[PuckType] {
        &self.types
    }

    pub fn presence(&self) -> &[bool] {
        &self.presence
    }

    pub fn slots(&self) -> usize {
        self.types.len()
    }

    /// Sample capacity per slot.
    pub fn capacities(&self) -> Vec<u8> {
        self.types.iter().map(|t| t.capacity()).collect()
    }

    /// Layout back in configuration form.
    pub fn type_string(&self) -> String {
        self.types.iter().map(|t| t.as_char()).collect()
    }

    /// Sample type code for a CATS lid.
    ///
    /// A CATS lid holds three pucks; the type of its first puck decides.
    /// Unknown lids give 0.
    pub fn type_for_lid(&self, lid: i64) -> i64 {
        usize::try_from(lid - 1)
            .ok()
            .and_then(|lid| self.types.get(lid * 3))
            .map_or(0, |t| t.sample_type_code())
    }

    /// Update presence from a decoded poll.
    pub fn refresh(&mut self, profile: &ModelProfile, telemetry: &Telemetry) {
        let slots = self.types.len();
        self.presence = match profile.presence {
            PresenceSource::Signals { prefix, suffix } => (1..=slots)
                .map(|slot| {
                    telemetry
                        .snapshot
                        .flag(&format!("{prefix}{slot}{suffix}"))
                        .unwrap_or(false)
                })
                .collect(),
            PresenceSource::SecondaryInputs => match telemetry.secondary_inputs.as_deref() {
                Some(bits) if bits.len() == slots => bits.chars().map(|c| c == '1').collect(),
                other => {
                    debug!(
                        "Puck presence has {} bits for {} slots",
                        other.map_or(0, str::len),
                        slots
                    );
                    vec![false; slots]
                }
            },
        };
    }
}
