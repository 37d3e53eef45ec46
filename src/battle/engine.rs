use crate::battle::ai::{Behavior, PriorityPolicy};
use crate::battle::conditions::resolve_turn_boundary;
use crate::battle::rewards::{apply_reward, RewardOffer};
use crate::battle::state::{
    BattleEvent, BattleStatus, EventBus, SessionId, SessionSnapshot, SideNames, TurnRng,
};
use crate::battle::turn::{TurnManager, TurnPhase};
use crate::config::BattleConfig;
use crate::entity::{Entity, EntityId, StateChange};
use crate::errors::{ActionError, BattleResult, BattleStateError, RewardError, SkillError};
use crate::skills::Skill;
use schema::{Side, SkillId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the acting entity does with its turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleAction {
    Attack,
    UseSkill(SkillId),
}

impl fmt::Display for BattleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleAction::Attack => write!(f, "Attack"),
            BattleAction::UseSkill(skill) => write!(f, "Use {}", skill),
        }
    }
}

/// Winner and loser of a decided battle. Set once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    pub status: BattleStatus,
    pub winner: Side,
    pub loser: Side,
}

/// One battle between two entities.
///
/// The session is advanced in explicit steps: `begin`, then `submit_action`
/// for the acting side, then `advance` each time presentation of the
/// previous step has finished. Every step returns the events it produced, in
/// the order the mutations were applied.
#[derive(Debug, Clone)]
pub struct BattleSession {
    id: SessionId,
    entities: [Entity; 2],
    turns: TurnManager,
    turn_count: u32,
    status: BattleStatus,
    outcome: Option<BattleOutcome>,
    reward_offer: Option<RewardOffer>,
    config: BattleConfig,
}

impl BattleSession {
    pub fn new(id: SessionId, left: Entity, right: Entity, config: BattleConfig) -> Self {
        Self {
            id,
            entities: [left, right],
            turns: TurnManager::new(),
            turn_count: 0,
            status: BattleStatus::BeforeAction,
            outcome: None,
            reward_offer: None,
            config,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn entity(&self, side: Side) -> &Entity {
        &self.entities[side.to_index()]
    }

    pub fn entities(&self) -> &[Entity; 2] {
        &self.entities
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn reward_offer(&self) -> Option<&RewardOffer> {
        self.reward_offer.as_ref()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The side expected to act, while an action is pending.
    pub fn acting_side(&self) -> Option<Side> {
        match (self.turns.phase(), self.status) {
            (TurnPhase::TurnInProgress(side), BattleStatus::BeforeAction) => Some(side),
            _ => None,
        }
    }

    pub fn is_concluded(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            turn_count: self.turn_count,
            acting: self.acting_side(),
            entities: self.entities.clone(),
        }
    }

    // --- Transitions ---

    /// Starts the first turn.
    pub fn begin(&mut self) -> BattleResult<EventBus> {
        if self.turns.phase() != TurnPhase::WaitingForFirstTurn {
            return Err(BattleStateError::AlreadyStarted.into());
        }
        tracing::info!(
            session = self.id.0,
            left = self.entities[0].name(),
            right = self.entities[1].name(),
            "battle started"
        );
        let mut bus = EventBus::new();
        self.next_turn(&mut bus);
        Ok(bus)
    }

    /// Resolves the acting side's action and moves to `AfterAction`.
    pub fn submit_action(
        &mut self,
        side: Side,
        action: BattleAction,
        rng: &mut TurnRng,
    ) -> BattleResult<EventBus> {
        if self.is_concluded() {
            return Err(BattleStateError::AlreadyConcluded.into());
        }
        let acting = self.acting_side().ok_or(ActionError::NoActionPending)?;
        if side != acting {
            return Err(ActionError::NotYourTurn(side).into());
        }
        self.check_action(side, action)?;

        let mut bus = EventBus::new();
        let defender = side.opponent();
        let offset = self.config.attack_offset_percent;
        let miss = self.config.attack_miss_percent;
        let (actor, target) = pair_mut(&mut self.entities, side);

        match action {
            BattleAction::Attack => {
                let outcome = actor.attack(target, offset, miss, rng);
                bus.push(BattleEvent::Attacked {
                    attacker: side,
                    defender,
                    damage: outcome.damage,
                });
                bus.push(BattleEvent::StateChanged {
                    side: defender,
                    change: outcome.change,
                });
            }
            BattleAction::UseSkill(skill) => {
                let result = actor.use_skill(skill, target, rng)?;
                let changes = result.changes.clone();
                bus.push(BattleEvent::SkillUsed {
                    user: side,
                    skill: result.skill,
                    effect: result.effect,
                    logs: result.logs,
                });
                for change in changes {
                    bus.push(BattleEvent::StateChanged {
                        side: self.side_of(change.entity()),
                        change,
                    });
                }
            }
        }

        self.set_status(BattleStatus::AfterAction);
        bus.trace_debug(&format!("session {} {} resolved {}", self.id.0, side, action));
        Ok(bus)
    }

    /// Decides the acting NPC's action, if the acting side is NPC-controlled.
    pub fn pending_npc_action(&self, rng: &mut TurnRng) -> Option<BattleAction> {
        let side = self.acting_side()?;
        let actor = self.entity(side);
        if actor.is_player_controlled() {
            return None;
        }
        Some(PriorityPolicy.decide_action(actor, self.entity(side.opponent()), rng))
    }

    /// Called once presentation of the previous step has finished.
    pub fn advance(&mut self, rng: &mut TurnRng) -> BattleResult<EventBus> {
        let mut bus = EventBus::new();
        match self.status {
            BattleStatus::AfterAction => {
                if !self.check_winner(&mut bus) {
                    let report = resolve_turn_boundary(
                        &mut self.entities,
                        self.turns.acting(),
                        self.turns.waiting(),
                        &self.config,
                        rng,
                    );
                    bus.extend(report.events);
                    if report.triggered {
                        self.set_status(BattleStatus::CheckAbnormalCondition);
                    } else {
                        self.next_turn(&mut bus);
                    }
                }
            }
            BattleStatus::CheckAbnormalCondition => {
                if !self.check_winner(&mut bus) {
                    self.next_turn(&mut bus);
                }
            }
            BattleStatus::LeftWin | BattleStatus::RightWin => {
                let outcome = self.outcome.ok_or(BattleStateError::NotConcluded)?;
                let winner = self.entity(outcome.winner);
                if winner.is_player_controlled() {
                    let offer = RewardOffer::generate(
                        outcome.winner,
                        winner,
                        self.entity(outcome.loser),
                        &self.config,
                        rng,
                    );
                    bus.push(BattleEvent::RewardOffered {
                        winner: outcome.winner,
                        options: offer.options().to_vec(),
                    });
                    self.reward_offer = Some(offer);
                    self.set_status(BattleStatus::SelectReward);
                } else {
                    self.finish(BattleStatus::BattleEnding, &mut bus);
                }
            }
            BattleStatus::GameClear | BattleStatus::BattleEnding => {
                return Err(BattleStateError::AlreadyConcluded.into());
            }
            actual @ (BattleStatus::BeforeAction | BattleStatus::SelectReward) => {
                return Err(BattleStateError::UnexpectedStatus {
                    expected: BattleStatus::AfterAction,
                    actual,
                }
                .into());
            }
        }
        bus.trace_debug(&format!("session {} advanced to {:?}", self.id.0, self.status));
        Ok(bus)
    }

    /// Applies the winner's chosen reward and ends the battle.
    pub fn select_reward(&mut self, index: usize) -> BattleResult<EventBus> {
        let offer = self.reward_offer.as_ref().ok_or(RewardError::NoOffer)?;
        let option = offer.choose(index)?;
        let winner = offer.winner();

        let mut bus = EventBus::new();
        let changes = apply_reward(option, &mut self.entities[winner.to_index()]);
        bus.push(BattleEvent::RewardSelected { winner, option });
        for change in changes {
            bus.push(BattleEvent::StateChanged {
                side: winner,
                change,
            });
        }
        tracing::info!(session = self.id.0, %winner, reward = %option.kind, "reward selected");

        self.reward_offer = None;
        self.finish(BattleStatus::BattleEnding, &mut bus);
        Ok(bus)
    }

    /// Picks uniformly among enabled options, used when nobody chooses in time.
    pub fn auto_select_reward(&mut self, rng: &mut TurnRng) -> BattleResult<EventBus> {
        let offer = self.reward_offer.as_ref().ok_or(RewardError::NoOffer)?;
        let index = offer.auto_pick(rng);
        self.select_reward(index)
    }

    /// Hands the entities back once the battle has concluded.
    pub fn into_parts(self) -> BattleResult<([Entity; 2], BattleOutcome)> {
        if !self.is_concluded() {
            return Err(BattleStateError::NotConcluded.into());
        }
        let outcome = self.outcome.ok_or(BattleStateError::NotConcluded)?;
        Ok((self.entities, outcome))
    }

    // --- Internals ---

    fn check_action(&self, side: Side, action: BattleAction) -> BattleResult<()> {
        let BattleAction::UseSkill(skill) = action else {
            return Ok(());
        };
        let actor = self.entity(side);
        if !actor.has_skill(skill) {
            return Err(SkillError::SkillNotFound {
                entity: actor.id(),
                skill,
            }
            .into());
        }
        let cost = Skill::get(skill).mana_cost;
        if cost > actor.mana_point() {
            return Err(ActionError::InsufficientMana {
                skill,
                cost,
                available: actor.mana_point(),
            }
            .into());
        }
        Ok(())
    }

    /// Starts turns until one has an action phase. Stunned turns still count.
    fn next_turn(&mut self, bus: &mut EventBus) {
        loop {
            let start = self.turns.start_new_turn(self.turn_count, &mut self.entities);
            bus.push(BattleEvent::TurnStarted {
                turn_count: start.turn_count,
                acting: start.acting,
            });
            self.turn_count += 1;

            match start.stun_cleared {
                Some(change) => {
                    bus.push(BattleEvent::TurnSkipped { side: start.acting });
                    bus.push(BattleEvent::StateChanged {
                        side: start.acting,
                        change,
                    });
                }
                None => break,
            }
        }
        self.set_status(BattleStatus::BeforeAction);
    }

    /// Left death is checked before right death. Returns whether the battle
    /// was decided.
    fn check_winner(&mut self, bus: &mut EventBus) -> bool {
        let defeated = if !self.entities[0].is_alive() {
            Side::Left
        } else if !self.entities[1].is_alive() {
            Side::Right
        } else {
            return false;
        };
        let winner = defeated.opponent();
        let status = if self.entity(defeated).role().is_final_boss() {
            BattleStatus::GameClear
        } else {
            match winner {
                Side::Left => BattleStatus::LeftWin,
                Side::Right => BattleStatus::RightWin,
            }
        };

        if self.outcome.is_none() {
            self.outcome = Some(BattleOutcome {
                status,
                winner,
                loser: defeated,
            });
        }
        tracing::info!(
            session = self.id.0,
            ?status,
            winner = self.entity(winner).name(),
            loser = self.entity(defeated).name(),
            "battle decided"
        );
        bus.push(BattleEvent::BattleDecided {
            status,
            winner,
            loser: defeated,
        });

        if status == BattleStatus::GameClear {
            self.finish(status, bus);
        } else {
            self.set_status(status);
        }
        true
    }

    /// Clears both condition slots and enters a terminal status.
    fn finish(&mut self, status: BattleStatus, bus: &mut EventBus) {
        for side in [Side::Left, Side::Right] {
            let change = self.entities[side.to_index()].reset_abnormal_condition();
            if let StateChange::Condition { old, new, .. } = change {
                if old != new {
                    bus.push(BattleEvent::StateChanged { side, change });
                }
            }
        }
        self.turns.end();
        self.set_status(status);
        bus.push(BattleEvent::BattleEnded { status });
    }

    fn set_status(&mut self, status: BattleStatus) {
        tracing::debug!(
            session = self.id.0,
            from = ?self.status,
            to = ?status,
            "status transition"
        );
        self.status = status;
    }

    fn side_of(&self, entity: EntityId) -> Side {
        if self.entities[0].id() == entity {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl SideNames for BattleSession {
    fn side_name(&self, side: Side) -> &str {
        self.entity(side).name()
    }
}

/// Mutable access to the entity on `first` and its opponent.
fn pair_mut(entities: &mut [Entity; 2], first: Side) -> (&mut Entity, &mut Entity) {
    let (left, right) = entities.split_at_mut(1);
    match first {
        Side::Left => (&mut left[0], &mut right[0]),
        Side::Right => (&mut right[0], &mut left[0]),
    }
}
