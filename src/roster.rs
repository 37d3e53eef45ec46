//! Prefab entity templates.
//!
//! The built-in roster covers the player hero, the field monsters and the
//! final boss. A roster can also be read from RON, where skills are listed
//! by their stable identifier strings.

use crate::entity::{Entity, EntityId};
use crate::errors::{parse_skill_id, ConfigError};
use schema::{EntityRole, NpcSpecies, SkillId};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTemplate {
    pub name: String,
    pub role: EntityRole,
    pub hit_point: i32,
    pub mana_point: i32,
    pub power: i32,
    pub skills: Vec<SkillId>,
}

impl EntityTemplate {
    fn new(
        name: &str,
        role: EntityRole,
        hit_point: i32,
        mana_point: i32,
        power: i32,
        skills: &[SkillId],
    ) -> Self {
        Self {
            name: name.to_string(),
            role,
            hit_point,
            mana_point,
            power,
            skills: skills.to_vec(),
        }
    }

    /// Creates a fresh entity from this template.
    pub fn spawn(&self, id: EntityId) -> Entity {
        Entity::new(
            id,
            self.name.clone(),
            self.role,
            self.hit_point,
            self.mana_point,
            self.power,
        )
        .with_skills(self.skills.iter().copied())
    }
}

/// On-disk form of a template. Skills stay strings until validated.
#[derive(Debug, Deserialize)]
struct TemplateDef {
    name: String,
    role: EntityRole,
    hit_point: i32,
    mana_point: i32,
    power: i32,
    #[serde(default)]
    skills: Vec<String>,
}

impl TryFrom<TemplateDef> for EntityTemplate {
    type Error = ConfigError;

    fn try_from(def: TemplateDef) -> Result<Self, Self::Error> {
        let skills = def
            .skills
            .iter()
            .map(|raw| parse_skill_id(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: def.name,
            role: def.role,
            hit_point: def.hit_point,
            mana_point: def.mana_point,
            power: def.power,
            skills,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    templates: Vec<EntityTemplate>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Roster {
    pub fn builtin() -> Self {
        use SkillId::*;
        Self {
            templates: vec![
                EntityTemplate::new("Hero", EntityRole::Player, 60, 12, 10, &[Heal, Strike]),
                EntityTemplate::new("Slime", EntityRole::Npc(NpcSpecies::Slime), 30, 6, 5, &[Heal]),
                EntityTemplate::new(
                    "Bat",
                    EntityRole::Npc(NpcSpecies::Bat),
                    25,
                    8,
                    6,
                    &[Bite, Drain],
                ),
                EntityTemplate::new(
                    "Wolf",
                    EntityRole::Npc(NpcSpecies::Wolf),
                    40,
                    8,
                    9,
                    &[Bite, Training],
                ),
                EntityTemplate::new(
                    "Mushroom",
                    EntityRole::Npc(NpcSpecies::Mushroom),
                    35,
                    10,
                    6,
                    &[PoisonMushroom, Regen],
                ),
                EntityTemplate::new(
                    "Golem",
                    EntityRole::Npc(NpcSpecies::Golem),
                    60,
                    12,
                    11,
                    &[Strike, Destroy],
                ),
                EntityTemplate::new(
                    "Dragon",
                    EntityRole::FinalBoss,
                    120,
                    30,
                    15,
                    &[Ignition, Destroy, SuperHeal, Training],
                ),
            ],
        }
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let defs: Vec<TemplateDef> = ron::from_str(text)?;
        let templates = defs
            .into_iter()
            .map(EntityTemplate::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let roster = Self::from_ron_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            templates = roster.templates.len(),
            "loaded roster"
        );
        Ok(roster)
    }

    pub fn templates(&self) -> &[EntityTemplate] {
        &self.templates
    }

    /// First template with the given role.
    pub fn template(&self, role: EntityRole) -> Option<&EntityTemplate> {
        self.templates.iter().find(|template| template.role == role)
    }
}
