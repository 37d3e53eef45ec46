//! The field: where entities live between battles.
//!
//! Ids are handed out by a counter owned by the field, so two fields never
//! share state. Entities move into a `BattleSession` when they engage and come
//! back when it concludes.

use crate::battle::engine::{BattleOutcome, BattleSession};
use crate::battle::state::{BattleStatus, SessionId};
use crate::config::BattleConfig;
use crate::entity::{Entity, EntityId};
use crate::errors::{BattleResult, BattleStateError};
use crate::roster::{EntityTemplate, Roster};
use schema::EntityRole;
use std::collections::BTreeMap;

/// What happened to the participants when a battle handed them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReturn {
    pub outcome: BattleOutcome,
    /// Defeated NPCs, gone for good.
    pub removed: Vec<EntityId>,
    /// Defeated players, restored to their spawn vitals.
    pub revived: Vec<EntityId>,
    pub game_clear: bool,
}

#[derive(Debug)]
pub struct Field {
    entities: BTreeMap<EntityId, Entity>,
    next_entity_id: u32,
    next_session_id: u64,
    config: BattleConfig,
    roster: Roster,
}

impl Field {
    pub fn new(config: BattleConfig, roster: Roster) -> Self {
        Self {
            entities: BTreeMap::new(),
            next_entity_id: 1,
            next_session_id: 1,
            config,
            roster,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn spawn_from(&mut self, template: &EntityTemplate) -> EntityId {
        let id = self.allocate_id();
        let entity = template.spawn(id);
        tracing::debug!(%id, name = entity.name(), "entity spawned");
        self.entities.insert(id, entity);
        id
    }

    /// Spawns the roster's template for `role`, if it has one.
    pub fn spawn(&mut self, role: EntityRole) -> Option<EntityId> {
        let template = self.roster.template(role)?.clone();
        Some(self.spawn_from(&template))
    }

    /// Moves both entities into a new battle. `left` acts first.
    pub fn engage(&mut self, left: EntityId, right: EntityId) -> BattleResult<BattleSession> {
        if left == right || !self.entities.contains_key(&right) {
            return Err(BattleStateError::EntityNotFound(right).into());
        }
        let left_entity = self
            .entities
            .remove(&left)
            .ok_or(BattleStateError::EntityNotFound(left))?;
        let right_entity = self
            .entities
            .remove(&right)
            .ok_or(BattleStateError::EntityNotFound(right))?;

        let session_id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        tracing::info!(session = session_id.0, %left, %right, "entities engaged");
        Ok(BattleSession::new(
            session_id,
            left_entity,
            right_entity,
            self.config.clone(),
        ))
    }

    /// Takes the participants back from a concluded battle.
    pub fn return_from_battle(&mut self, session: BattleSession) -> BattleResult<FieldReturn> {
        let (entities, outcome) = session.into_parts()?;
        let mut removed = Vec::new();
        let mut revived = Vec::new();

        for mut entity in entities {
            let id = entity.id();
            if entity.is_alive() {
                self.entities.insert(id, entity);
            } else if entity.is_player_controlled() {
                entity.revive();
                revived.push(id);
                self.entities.insert(id, entity);
            } else {
                removed.push(id);
            }
        }

        let game_clear = outcome.status == BattleStatus::GameClear;
        if game_clear {
            tracing::info!("final boss defeated");
        }
        Ok(FieldReturn {
            outcome,
            removed,
            revived,
            game_clear,
        })
    }
}
