use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Stable skill identifier. Lookups key off this, never off a display name.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum SkillId {
    Heal,
    Bite,
    Ignition,
    Drain,
    Destroy,
    Regen,
    SuperHeal,
    Training,
    Strike,
    PoisonMushroom,
}

impl SkillId {
    /// Identifier string used on the wire and in content files.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SkillId::Heal => "Heal",
            SkillId::Bite => "Bite",
            SkillId::Ignition => "Ignition",
            SkillId::Drain => "Drain",
            SkillId::Destroy => "Destroy",
            SkillId::Regen => "Regen",
            SkillId::SuperHeal => "Super Heal",
            SkillId::Training => "Training",
            SkillId::Strike => "Strike",
            SkillId::PoisonMushroom => "Poison Mushroom",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Damage,
    Heal,
    Buff,
}
