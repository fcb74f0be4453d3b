//! Per-title game settings and in-game clock helpers.

use serde::{Deserialize, Serialize};

/// The supported game titles.
///
/// Anything that differs between titles is answered here, so callers dispatch
/// on the variant instead of keeping one implementation per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameKind {
    #[default]
    Skyrim,
    #[serde(rename = "SkyrimVR")]
    SkyrimVr,
    Fallout4,
    #[serde(rename = "Fallout4VR")]
    Fallout4Vr,
}

impl GameKind {
    /// Whether this is one of the Fallout 4 titles.
    pub fn is_fallout(&self) -> bool {
        matches!(self, GameKind::Fallout4 | GameKind::Fallout4Vr)
    }

    /// Where a conversation takes place before the game reports a location.
    pub fn default_location(&self) -> &'static str {
        if self.is_fallout() {
            "the Commonwealth"
        } else {
            "Skyrim"
        }
    }

    /// File name of the bundled character database.
    pub fn character_table_file(&self) -> &'static str {
        if self.is_fallout() {
            "fallout4_characters.csv"
        } else {
            "skyrim_characters.csv"
        }
    }

    /// Character table column holding this title's voice folder.
    pub fn voice_folder_column(&self) -> &'static str {
        if self.is_fallout() {
            "fallout4_voice_folder"
        } else {
            "skyrim_voice_folder"
        }
    }

    /// Data folder shared by the flat and VR editions of a title.
    pub fn data_folder(&self) -> &'static str {
        if self.is_fallout() {
            "Fallout4"
        } else {
            "Skyrim"
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameKind::Skyrim => "Skyrim",
            GameKind::SkyrimVr => "SkyrimVR",
            GameKind::Fallout4 => "Fallout4",
            GameKind::Fallout4Vr => "Fallout4VR",
        };
        f.write_str(name)
    }
}

/// Coarse period of the day derived from the in-game hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeGroup {
    EarlyMorning,
    Morning,
    Afternoon,
    EarlyEvening,
    Evening,
    Night,
}

impl TimeGroup {
    /// Bucket an hour of the 24 hour clock. Hours past 23 count as night.
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            0..=4 => TimeGroup::Night,
            5..=7 => TimeGroup::EarlyMorning,
            8..=11 => TimeGroup::Morning,
            12..=14 => TimeGroup::Afternoon,
            15..=19 => TimeGroup::EarlyEvening,
            20..=21 => TimeGroup::Evening,
            _ => TimeGroup::Night,
        }
    }

    /// Phrase used after the hour in narrative text ("The time is 9 in the morning.").
    pub fn phrase(&self) -> &'static str {
        match self {
            TimeGroup::EarlyMorning => "in the early morning",
            TimeGroup::Morning => "in the morning",
            TimeGroup::Afternoon => "in the afternoon",
            TimeGroup::EarlyEvening => "in the early evening",
            TimeGroup::Evening => "in the evening",
            TimeGroup::Night => "at night",
        }
    }
}

impl std::fmt::Display for TimeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.phrase())
    }
}
