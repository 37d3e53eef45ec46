use crate::battle::engine::{BattleAction, BattleSession};
use crate::battle::state::{BattleEvent, BattleStatus, SessionId, TurnRng};
use crate::config::BattleConfig;
use crate::entity::{Entity, EntityId};
use schema::{ConditionKind, EntityRole, NpcSpecies, SkillId};

/// A builder for creating test entities with common defaults.
///
/// # Example
/// ```ignore
/// let wolf = TestEntityBuilder::npc("Wolf", NpcSpecies::Wolf)
///     .with_skills(vec![SkillId::Bite])
///     .with_condition(ConditionKind::Poison)
///     .build(2);
/// ```
pub struct TestEntityBuilder {
    name: String,
    role: EntityRole,
    hit_point: i32,
    mana_point: i32,
    power: i32,
    skills: Vec<SkillId>,
    condition: Option<ConditionKind>,
}

impl TestEntityBuilder {
    pub fn player(name: &str) -> Self {
        Self::new(name, EntityRole::Player)
    }

    pub fn npc(name: &str, species: NpcSpecies) -> Self {
        Self::new(name, EntityRole::Npc(species))
    }

    pub fn boss(name: &str) -> Self {
        Self::new(name, EntityRole::FinalBoss)
    }

    fn new(name: &str, role: EntityRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            hit_point: 50,
            mana_point: 10,
            power: 10,
            skills: Vec::new(),
            condition: None,
        }
    }

    pub fn with_hp(mut self, hit_point: i32) -> Self {
        self.hit_point = hit_point;
        self
    }

    pub fn with_mp(mut self, mana_point: i32) -> Self {
        self.mana_point = mana_point;
        self
    }

    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    pub fn with_skills(mut self, skills: Vec<SkillId>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_condition(mut self, condition: ConditionKind) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn build(self, id: u32) -> Entity {
        let mut entity = Entity::new(
            EntityId(id),
            self.name,
            self.role,
            self.hit_point,
            self.mana_point,
            self.power,
        )
        .with_skills(self.skills);
        if let Some(condition) = self.condition {
            entity.inflict(condition);
        }
        entity
    }
}

/// Creates a session with ids 1 (left) and 2 (right) and the default config.
pub fn create_test_session(left: TestEntityBuilder, right: TestEntityBuilder) -> BattleSession {
    BattleSession::new(SessionId(1), left.build(1), right.build(2), BattleConfig::default())
}

/// Creates a session and starts its first turn.
pub fn started_session(left: TestEntityBuilder, right: TestEntityBuilder) -> BattleSession {
    let mut session = create_test_session(left, right);
    if let Err(err) = session.begin() {
        panic!("Failed to begin test session: {}", err);
    }
    session
}

pub fn predictable_rng(outcomes: Vec<i32>) -> TurnRng {
    TurnRng::new_for_test(outcomes)
}

/// Drives a session to a terminal status. Players always attack and take an
/// automatic reward; NPCs use the policy.
pub fn run_to_completion(
    session: &mut BattleSession,
    rng: &mut TurnRng,
    max_steps: usize,
) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    for _ in 0..max_steps {
        let step = match session.status() {
            BattleStatus::GameClear | BattleStatus::BattleEnding => return events,
            BattleStatus::BeforeAction => {
                let side = match session.acting_side() {
                    Some(side) => side,
                    None => panic!("BeforeAction without an acting side"),
                };
                let action = session
                    .pending_npc_action(rng)
                    .unwrap_or(BattleAction::Attack);
                session.submit_action(side, action, rng)
            }
            BattleStatus::SelectReward => session.auto_select_reward(rng),
            _ => session.advance(rng),
        };
        match step {
            Ok(bus) => events.extend(bus.into_events()),
            Err(err) => panic!("Step failed in {:?}: {}", session.status(), err),
        }
    }
    panic!("Battle did not conclude within {} steps", max_steps);
}
