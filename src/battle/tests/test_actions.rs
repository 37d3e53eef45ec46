#[cfg(test)]
mod tests {
    use crate::battle::engine::BattleAction;
    use crate::battle::state::{BattleEvent, BattleStatus};
    use crate::battle::tests::common::{predictable_rng, started_session, TestEntityBuilder};
    use crate::entity::{AbnormalCondition, EntityId, StateChange};
    use crate::errors::{ActionError, BattleEngineError, BattleStateError, RewardError, SkillError};
    use pretty_assertions::assert_eq;
    use schema::{ConditionKind, EffectKey, NpcSpecies, Side, SkillId};

    #[test]
    fn test_basic_attack_hits_for_forced_roll() {
        // Arrange
        let mut session = started_session(
            TestEntityBuilder::player("A").with_power(10).with_hp(50),
            TestEntityBuilder::player("B").with_hp(50),
        );
        let mut rng = predictable_rng(vec![10, 99]); // roll 10, miss check passes

        // Act
        let bus = session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");

        // Assert
        assert_eq!(session.entity(Side::Right).hit_point(), 40);
        assert_eq!(session.status(), BattleStatus::AfterAction);
        assert_eq!(
            bus.events(),
            &[
                BattleEvent::Attacked {
                    attacker: Side::Left,
                    defender: Side::Right,
                    damage: 10
                },
                BattleEvent::StateChanged {
                    side: Side::Right,
                    change: StateChange::HitPoint {
                        entity: EntityId(2),
                        old: 50,
                        new: 40
                    }
                },
            ]
        );
        let lines = bus.log_lines(&session);
        assert_eq!(lines, vec!["A attacked B for 10 damage!"]);
        assert!(lines.iter().all(|line| !line.contains("dodged")));
    }

    #[test]
    fn test_missed_attack_logs_a_dodge() {
        let mut session =
            started_session(TestEntityBuilder::player("A"), TestEntityBuilder::player("B"));
        let mut rng = predictable_rng(vec![10, 3]);

        let bus = session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");

        assert_eq!(session.entity(Side::Right).hit_point(), 50);
        assert_eq!(bus.log_lines(&session), vec!["B dodged the attack!"]);
    }

    #[test]
    fn test_ignition_burns_and_costs_two_mana() {
        // Arrange
        let mut session = started_session(
            TestEntityBuilder::player("A")
                .with_power(10)
                .with_mp(5)
                .with_skills(vec![SkillId::Ignition]),
            TestEntityBuilder::player("B").with_hp(50),
        );
        let mut rng = predictable_rng(vec![12, 99]); // roll 12 in [5, 15], hit

        // Act
        let bus = session
            .submit_action(Side::Left, BattleAction::UseSkill(SkillId::Ignition), &mut rng)
            .expect("ignition should resolve");

        // Assert
        let attacker = session.entity(Side::Left);
        let defender = session.entity(Side::Right);
        assert_eq!(attacker.mana_point(), 3);
        assert_eq!(defender.hit_point(), 38);
        assert_eq!(defender.condition().kind, ConditionKind::Fire);

        let changes: Vec<(Side, StateChange)> = bus
            .events()
            .iter()
            .filter_map(|event| match event {
                BattleEvent::StateChanged { side, change } => Some((*side, *change)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (
                    Side::Left,
                    StateChange::ManaPoint {
                        entity: EntityId(1),
                        old: 5,
                        new: 3
                    }
                ),
                (
                    Side::Right,
                    StateChange::HitPoint {
                        entity: EntityId(2),
                        old: 50,
                        new: 38
                    }
                ),
                (
                    Side::Right,
                    StateChange::Condition {
                        entity: EntityId(2),
                        old: AbnormalCondition::NONE,
                        new: AbnormalCondition::new(ConditionKind::Fire, 0)
                    }
                ),
            ]
        );
        assert!(matches!(
            bus.events().first(),
            Some(BattleEvent::SkillUsed {
                user: Side::Left,
                skill: SkillId::Ignition,
                effect: EffectKey::Flame,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_side_is_rejected() {
        let mut session =
            started_session(TestEntityBuilder::player("A"), TestEntityBuilder::player("B"));
        let mut rng = predictable_rng(vec![]);

        let err = session
            .submit_action(Side::Right, BattleAction::Attack, &mut rng)
            .unwrap_err();

        assert_eq!(err, BattleEngineError::Action(ActionError::NotYourTurn(Side::Right)));
        assert_eq!(session.status(), BattleStatus::BeforeAction);
    }

    #[test]
    fn test_unknown_skill_fails_loudly() {
        let mut session = started_session(
            TestEntityBuilder::player("A").with_skills(vec![SkillId::Heal]),
            TestEntityBuilder::player("B"),
        );
        let mut rng = predictable_rng(vec![]);

        let err = session
            .submit_action(Side::Left, BattleAction::UseSkill(SkillId::Destroy), &mut rng)
            .unwrap_err();

        assert_eq!(
            err,
            BattleEngineError::Skill(SkillError::SkillNotFound {
                entity: EntityId(1),
                skill: SkillId::Destroy
            })
        );
    }

    #[test]
    fn test_unaffordable_skill_blocks_the_player() {
        let mut session = started_session(
            TestEntityBuilder::player("A")
                .with_mp(5)
                .with_skills(vec![SkillId::Destroy]),
            TestEntityBuilder::player("B"),
        );
        let mut rng = predictable_rng(vec![]);

        let err = session
            .submit_action(Side::Left, BattleAction::UseSkill(SkillId::Destroy), &mut rng)
            .unwrap_err();

        assert_eq!(
            err,
            BattleEngineError::Action(ActionError::InsufficientMana {
                skill: SkillId::Destroy,
                cost: 8,
                available: 5
            })
        );
        assert_eq!(session.entity(Side::Left).mana_point(), 5);
        assert_eq!(session.status(), BattleStatus::BeforeAction);
    }

    #[test]
    fn test_out_of_order_calls_are_rejected() {
        let mut session =
            started_session(TestEntityBuilder::player("A"), TestEntityBuilder::player("B"));
        let mut rng = predictable_rng(vec![10, 99]);

        assert_eq!(
            session.begin().unwrap_err(),
            BattleEngineError::BattleState(BattleStateError::AlreadyStarted)
        );
        assert_eq!(
            session.advance(&mut rng).unwrap_err(),
            BattleEngineError::BattleState(BattleStateError::UnexpectedStatus {
                expected: BattleStatus::AfterAction,
                actual: BattleStatus::BeforeAction
            })
        );
        assert_eq!(
            session.select_reward(0).unwrap_err(),
            BattleEngineError::Reward(RewardError::NoOffer)
        );

        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");
        assert_eq!(
            session
                .submit_action(Side::Left, BattleAction::Attack, &mut rng)
                .unwrap_err(),
            BattleEngineError::Action(ActionError::NoActionPending)
        );
    }

    #[test]
    fn test_npc_turn_uses_policy_and_players_wait() {
        let mut session = started_session(
            TestEntityBuilder::player("Hero"),
            TestEntityBuilder::npc("Wolf", NpcSpecies::Wolf).with_skills(vec![SkillId::Bite]),
        );
        let mut rng = predictable_rng(vec![10, 99, 1, 0]);

        assert_eq!(session.pending_npc_action(&mut rng), None);
        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");
        session.advance(&mut rng).expect("turn should pass");

        assert_eq!(session.acting_side(), Some(Side::Right));
        assert_eq!(
            session.pending_npc_action(&mut rng),
            Some(BattleAction::UseSkill(SkillId::Bite))
        );
    }
}
