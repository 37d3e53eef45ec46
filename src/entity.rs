use crate::battle::state::TurnRng;
use crate::errors::SkillError;
use crate::skills::{randomized_with_offset, Skill, SkillResult};
use schema::{ConditionKind, EntityRole, SkillId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identity, assigned by the owning field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The single active status effect plus its additive power modifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbnormalCondition {
    pub kind: ConditionKind,
    pub power_gain: i32,
}

impl AbnormalCondition {
    pub const NONE: AbnormalCondition = AbnormalCondition {
        kind: ConditionKind::None,
        power_gain: 0,
    };

    pub fn new(kind: ConditionKind, power_gain: i32) -> Self {
        Self { kind, power_gain }
    }
}

/// A mutation applied to one entity. Every mutator returns exactly one of
/// these so callers decide what to animate or replicate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    HitPoint {
        entity: EntityId,
        old: i32,
        new: i32,
    },
    ManaPoint {
        entity: EntityId,
        old: i32,
        new: i32,
    },
    Condition {
        entity: EntityId,
        old: AbnormalCondition,
        new: AbnormalCondition,
    },
}

impl StateChange {
    pub fn entity(&self) -> EntityId {
        match self {
            StateChange::HitPoint { entity, .. }
            | StateChange::ManaPoint { entity, .. }
            | StateChange::Condition { entity, .. } => *entity,
        }
    }

    /// Signed change for vitals, zero for condition changes.
    pub fn delta(&self) -> i32 {
        match self {
            StateChange::HitPoint { old, new, .. } | StateChange::ManaPoint { old, new, .. } => {
                new - old
            }
            StateChange::Condition { .. } => 0,
        }
    }
}

/// Outcome of a basic attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Rolled damage. Zero signals a miss.
    pub damage: i32,
    pub change: StateChange,
}

impl AttackOutcome {
    pub fn is_miss(&self) -> bool {
        self.damage == 0
    }
}

/// A battle participant: vitals, the abnormal-condition slot and an ordered skill set.
///
/// Vitals are private. Consumers go through `set_hit_point`/`set_mana_point`
/// so that every change is reported exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    name: String,
    role: EntityRole,
    hit_point: i32,
    mana_point: i32,
    power: i32,
    condition: AbnormalCondition,
    skills: Vec<SkillId>,
    // Vitals at spawn time, used when a defeated player returns to the field.
    spawn_hit_point: i32,
    spawn_mana_point: i32,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        role: EntityRole,
        hit_point: i32,
        mana_point: i32,
        power: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            hit_point,
            mana_point,
            power,
            condition: AbnormalCondition::NONE,
            skills: Vec::new(),
            spawn_hit_point: hit_point,
            spawn_mana_point: mana_point,
        }
    }

    /// Builder-style skill assignment. Duplicates are dropped.
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        for skill in skills {
            self.learn_skill(skill);
        }
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> EntityRole {
        self.role
    }

    pub fn hit_point(&self) -> i32 {
        self.hit_point
    }

    pub fn mana_point(&self) -> i32 {
        self.mana_point
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn condition(&self) -> AbnormalCondition {
        self.condition
    }

    pub fn skills(&self) -> &[SkillId] {
        &self.skills
    }

    pub fn is_alive(&self) -> bool {
        self.hit_point > 0
    }

    pub fn is_player_controlled(&self) -> bool {
        self.role.is_player_controlled()
    }

    /// Base power plus the condition's power gain.
    pub fn attack_power(&self) -> i32 {
        self.power + self.condition.power_gain
    }

    pub fn has_skill(&self, skill: SkillId) -> bool {
        self.skills.contains(&skill)
    }

    // --- Mutators ---

    /// Sets HP. Negative values are kept so damage logs stay exact.
    pub fn set_hit_point(&mut self, new: i32) -> StateChange {
        let old = self.hit_point;
        self.hit_point = new;
        StateChange::HitPoint {
            entity: self.id,
            old,
            new,
        }
    }

    /// Sets MP. Not clamped: callers check affordability before spending.
    pub fn set_mana_point(&mut self, new: i32) -> StateChange {
        let old = self.mana_point;
        self.mana_point = new;
        StateChange::ManaPoint {
            entity: self.id,
            old,
            new,
        }
    }

    /// Overwrites the condition slot. Conditions never stack.
    pub fn set_abnormal_condition(&mut self, kind: ConditionKind, power_gain: i32) -> StateChange {
        let old = self.condition;
        self.condition = AbnormalCondition::new(kind, power_gain);
        StateChange::Condition {
            entity: self.id,
            old,
            new: self.condition,
        }
    }

    /// Inflicts a condition while keeping the current power gain.
    pub fn inflict(&mut self, kind: ConditionKind) -> StateChange {
        let power_gain = self.condition.power_gain;
        self.set_abnormal_condition(kind, power_gain)
    }

    pub fn reset_abnormal_condition(&mut self) -> StateChange {
        self.set_abnormal_condition(ConditionKind::None, 0)
    }

    /// Appends a skill if it is not already known. Returns whether it was added.
    pub fn learn_skill(&mut self, skill: SkillId) -> bool {
        if self.has_skill(skill) {
            return false;
        }
        self.skills.push(skill);
        true
    }

    /// Restores spawn vitals and clears the condition slot.
    pub fn revive(&mut self) -> Vec<StateChange> {
        vec![
            self.set_hit_point(self.spawn_hit_point),
            self.set_mana_point(self.spawn_mana_point),
            self.reset_abnormal_condition(),
        ]
    }

    // --- Actions ---

    /// Basic attack: `randomized_with_offset(attack_power, offset, miss)` applied to the target.
    pub fn attack(
        &self,
        target: &mut Entity,
        offset_percent: i32,
        miss_percent: i32,
        rng: &mut TurnRng,
    ) -> AttackOutcome {
        let damage = randomized_with_offset(self.attack_power(), offset_percent, miss_percent, rng);
        let change = target.set_hit_point(target.hit_point - damage);
        AttackOutcome { damage, change }
    }

    /// Invokes one of this entity's skills against `target`.
    pub fn use_skill(
        &mut self,
        skill: SkillId,
        target: &mut Entity,
        rng: &mut TurnRng,
    ) -> Result<SkillResult, SkillError> {
        if !self.has_skill(skill) {
            return Err(SkillError::SkillNotFound {
                entity: self.id,
                skill,
            });
        }
        let definition = Skill::get(skill);
        Ok(definition.invoke(self, target, rng))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) HP:{} MP:{} POW:{}",
            self.name,
            self.role,
            self.hit_point,
            self.mana_point,
            self.attack_power()
        )?;
        if self.condition.kind != ConditionKind::None {
            write!(f, " [{}]", self.condition.kind)?;
        }
        Ok(())
    }
}
