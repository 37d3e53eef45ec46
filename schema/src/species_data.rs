use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Species of field monsters controlled by the NPC policy.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum NpcSpecies {
    Slime,
    Bat,
    Wolf,
    Mushroom,
    Golem,
}

/// Role tag of an entity. Everything except `Player` is driven by the NPC policy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRole {
    Player,
    Npc(NpcSpecies),
    FinalBoss,
}

impl EntityRole {
    pub fn is_player_controlled(self) -> bool {
        matches!(self, EntityRole::Player)
    }

    pub fn is_final_boss(self) -> bool {
        matches!(self, EntityRole::FinalBoss)
    }

    /// Opaque sprite key for the asset resolver. Stable across locales.
    pub fn sprite_key(self) -> &'static str {
        match self {
            EntityRole::Player => "player",
            EntityRole::Npc(species) => species.into(),
            EntityRole::FinalBoss => "final_boss",
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRole::Player => write!(f, "Player"),
            EntityRole::Npc(species) => write!(f, "{:?}", species),
            EntityRole::FinalBoss => write!(f, "Final Boss"),
        }
    }
}
