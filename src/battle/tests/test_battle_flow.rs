#[cfg(test)]
mod tests {
    use crate::battle::engine::BattleAction;
    use crate::battle::state::{BattleEvent, BattleStatus, TurnRng};
    use crate::battle::tests::common::{
        predictable_rng, run_to_completion, started_session, TestEntityBuilder,
    };
    use pretty_assertions::assert_eq;
    use schema::{ConditionKind, NpcSpecies, Side, SkillId};

    #[test]
    fn test_first_turn_belongs_to_left() {
        let session =
            started_session(TestEntityBuilder::player("A"), TestEntityBuilder::player("B"));

        assert_eq!(session.status(), BattleStatus::BeforeAction);
        assert_eq!(session.acting_side(), Some(Side::Left));
        assert_eq!(session.turn_count(), 1);
    }

    #[test]
    fn test_quiet_turn_boundary_goes_straight_to_next_turn() {
        let mut session =
            started_session(TestEntityBuilder::player("A"), TestEntityBuilder::player("B"));
        let mut rng = predictable_rng(vec![10, 99, 10, 99]);

        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");
        let bus = session.advance(&mut rng).expect("advance should succeed");

        assert_eq!(
            bus.events(),
            &[BattleEvent::TurnStarted {
                turn_count: 1,
                acting: Side::Right
            }]
        );
        assert_eq!(bus.log_lines(&session), vec!["=== Turn 2 : B ==="]);
        assert_eq!(session.acting_side(), Some(Side::Right));

        session
            .submit_action(Side::Right, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");
        session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(session.acting_side(), Some(Side::Left));
        assert_eq!(session.entity(Side::Left).hit_point(), 40);
        assert_eq!(session.entity(Side::Right).hit_point(), 40);
    }

    #[test]
    fn test_stunned_entity_loses_its_turn() {
        // Arrange: the waiting entity is stunned before its first turn.
        let mut session = started_session(
            TestEntityBuilder::player("A"),
            TestEntityBuilder::player("B").with_condition(ConditionKind::Stun),
        );
        let mut rng = predictable_rng(vec![10, 99]);
        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");

        // Act: the boundary reports the pending stun first.
        let boundary = session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(boundary.events(), &[BattleEvent::StunPending { side: Side::Right }]);
        assert_eq!(session.status(), BattleStatus::CheckAbnormalCondition);
        assert_eq!(session.turn_count(), 1);

        let next = session.advance(&mut rng).expect("advance should succeed");

        // Assert: B's turn was counted and skipped, A acts again.
        assert_eq!(session.entity(Side::Right).condition().kind, ConditionKind::None);
        assert_eq!(session.turn_count(), 3);
        assert_eq!(session.acting_side(), Some(Side::Left));
        let kinds: Vec<&BattleEvent> = next
            .events()
            .iter()
            .filter(|event| !matches!(event, BattleEvent::StateChanged { .. }))
            .collect();
        assert_eq!(
            kinds,
            vec![
                &BattleEvent::TurnStarted {
                    turn_count: 1,
                    acting: Side::Right
                },
                &BattleEvent::TurnSkipped { side: Side::Right },
                &BattleEvent::TurnStarted {
                    turn_count: 2,
                    acting: Side::Left
                },
            ]
        );
    }

    #[test]
    fn test_actor_condition_ticks_after_its_action() {
        let mut session = started_session(
            TestEntityBuilder::player("A").with_condition(ConditionKind::Poison),
            TestEntityBuilder::player("B"),
        );
        let mut rng = predictable_rng(vec![10, 99]);
        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");

        let bus = session.advance(&mut rng).expect("advance should succeed");

        assert_eq!(session.status(), BattleStatus::CheckAbnormalCondition);
        assert_eq!(session.entity(Side::Left).hit_point(), 45);
        assert_eq!(bus.log_lines(&session), vec!["A is hurt by poison! (5 damage)"]);

        session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(session.acting_side(), Some(Side::Right));
        assert_eq!(session.status(), BattleStatus::BeforeAction);
    }

    #[test]
    fn test_burn_that_kills_is_caught_after_condition_check() {
        let mut session = started_session(
            TestEntityBuilder::player("A")
                .with_hp(2)
                .with_condition(ConditionKind::Fire),
            TestEntityBuilder::npc("Bat", NpcSpecies::Bat),
        );
        // Attack misses; burn rolls 6 and lands.
        let mut rng = predictable_rng(vec![10, 0, 6, 99]);
        session
            .submit_action(Side::Left, BattleAction::Attack, &mut rng)
            .expect("attack should resolve");

        session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(session.status(), BattleStatus::CheckAbnormalCondition);
        assert_eq!(session.entity(Side::Left).hit_point(), -4);

        session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(session.status(), BattleStatus::RightWin);
    }

    #[test]
    fn test_training_gain_survives_later_inflictions() {
        let mut session = started_session(
            TestEntityBuilder::player("A")
                .with_power(10)
                .with_skills(vec![SkillId::Training]),
            TestEntityBuilder::player("B")
                .with_power(10)
                .with_skills(vec![SkillId::PoisonMushroom]),
        );
        let mut rng = predictable_rng(vec![5, 99, 5, 99]);

        session
            .submit_action(Side::Left, BattleAction::UseSkill(SkillId::Training), &mut rng)
            .expect("training should resolve");
        session.advance(&mut rng).expect("advance should succeed");
        assert_eq!(session.entity(Side::Left).attack_power(), 15);

        session
            .submit_action(Side::Right, BattleAction::UseSkill(SkillId::PoisonMushroom), &mut rng)
            .expect("poison should resolve");

        let left = session.entity(Side::Left);
        assert_eq!(left.condition().kind, ConditionKind::Poison);
        assert_eq!(left.attack_power(), 15);
    }

    #[test]
    fn test_seeded_battles_always_conclude() {
        for seed in 0..20 {
            let mut session = started_session(
                TestEntityBuilder::player("Hero").with_hp(60).with_power(12),
                TestEntityBuilder::npc("Slime", NpcSpecies::Slime)
                    .with_hp(40)
                    .with_power(6)
                    .with_skills(vec![SkillId::Bite, SkillId::Heal]),
            );
            let mut rng = TurnRng::seeded(seed);

            let events = run_to_completion(&mut session, &mut rng, 1_000);

            assert!(session.is_concluded(), "seed {} did not conclude", seed);
            let outcome = session.outcome().expect("a concluded battle has an outcome");
            assert!(!session.entity(outcome.loser).is_alive());
            assert!(session.entity(outcome.winner).is_alive());
            assert!(matches!(events.last(), Some(BattleEvent::BattleEnded { .. })));
            for side in [Side::Left, Side::Right] {
                assert_eq!(session.entity(side).condition().kind, ConditionKind::None);
            }
        }
    }

    #[test]
    fn test_same_seed_replays_the_same_battle() {
        let play = |seed: u64| {
            let mut session = started_session(
                TestEntityBuilder::player("Hero").with_skills(vec![SkillId::Strike]),
                TestEntityBuilder::npc("Wolf", NpcSpecies::Wolf)
                    .with_skills(vec![SkillId::Bite, SkillId::Training]),
            );
            let mut rng = TurnRng::seeded(seed);
            run_to_completion(&mut session, &mut rng, 1_000)
        };

        assert_eq!(play(99), play(99));
    }
}
