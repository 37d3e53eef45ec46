use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// One of the two participant slots of a battle. The left entity acts first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn to_index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Single-slot status effect. Setting a new one overwrites the old one.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum ConditionKind {
    #[default]
    None,
    Poison,
    Fire,
    Regen,
    Stun,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ConditionKind::None => "none",
            ConditionKind::Poison => "poison",
            ConditionKind::Fire => "fire",
            ConditionKind::Regen => "regeneration",
            ConditionKind::Stun => "stun",
        };
        write!(f, "{}", display_name)
    }
}

/// Presentation-only identifier of a visual effect. The core never branches on it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum EffectKey {
    Slash,
    Dodge,
    Heal,
    Bite,
    Flame,
    Drain,
    Explosion,
    Sparkle,
    PowerUp,
    Impact,
    Spores,
    Poisoned,
    Burning,
    Regenerating,
    Stunned,
    Fizzle,
}

impl EffectKey {
    /// Opaque asset key consumed by the presentation layer.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
