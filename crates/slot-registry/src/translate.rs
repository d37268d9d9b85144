use device_link::DeviceCommand;
use serde::{Deserialize, Serialize};
use slot_intent::Intent;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("no device code assigned to slot {0}")]
    UnknownSlotCode(u32),
}

/// Which physical step a command drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Rotate the carousel to the slot position.
    Move,
    /// Confirm / retrieve once the motor has settled.
    Confirm,
}

/// Single-letter codes understood by the coded firmware.
pub fn default_slot_codes() -> BTreeMap<u32, String> {
    BTreeMap::from([
        (1, "r".to_string()),
        (2, "s".to_string()),
        (3, "l".to_string()),
    ])
}

/// Address scheme of the controller firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommandScheme {
    /// `M<slot*1000>;` to move, `R<slot*1000>;` to confirm.
    #[default]
    Positional,
    /// One letter per slot; the phase is not encoded.
    Coded {
        #[serde(default = "default_slot_codes")]
        codes: BTreeMap<u32, String>,
    },
}

impl CommandScheme {
    pub fn coded() -> Self {
        CommandScheme::Coded {
            codes: default_slot_codes(),
        }
    }

    pub fn to_device_command(&self, slot: u32, phase: Phase) -> Result<DeviceCommand, TranslateError> {
        match self {
            CommandScheme::Positional => {
                let prefix = match phase {
                    Phase::Move => 'M',
                    Phase::Confirm => 'R',
                };
                let position = u64::from(slot) * 1000;
                Ok(DeviceCommand::new(format!("{prefix}{position};")))
            }
            CommandScheme::Coded { codes } => codes
                .get(&slot)
                .map(|code| DeviceCommand::new(code.clone()))
                .ok_or(TranslateError::UnknownSlotCode(slot)),
        }
    }

    /// Phases emitted for an applied intent, in order.
    ///
    /// The positional firmware needs a settle-then-confirm pair for saves and
    /// is not driven on deletes; the coded firmware gets one code per touch.
    pub fn phases(&self, intent: Intent) -> &'static [Phase] {
        match (self, intent) {
            (CommandScheme::Positional, Intent::Save) => &[Phase::Move, Phase::Confirm],
            (CommandScheme::Positional, Intent::Move) => &[Phase::Move],
            (CommandScheme::Positional, _) => &[],
            (CommandScheme::Coded { .. }, Intent::Unknown) => &[],
            (CommandScheme::Coded { .. }, _) => &[Phase::Move],
        }
    }

    /// Translate every phase for `intent` up front so a missing code is
    /// reported before anything is sent.
    pub fn plan(&self, intent: Intent, slot: u32) -> Result<Vec<(Phase, DeviceCommand)>, TranslateError> {
        self.phases(intent)
            .iter()
            .map(|phase| Ok((*phase, self.to_device_command(slot, *phase)?)))
            .collect()
    }
}
