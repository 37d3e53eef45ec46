// Netbattle Schema - Shared identifier definitions
// This crate holds the stable enums shared by the simulation core, the
// replication messages and the presentation collaborators. It has no logic
// beyond naming.

pub use battle_data::*;
pub use skill_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod skill_types;
pub mod species_data;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn skill_ids_round_trip_through_stable_strings() {
        for skill in SkillId::iter() {
            assert_eq!(SkillId::from_str(skill.as_str()), Ok(skill));
        }
        assert!(SkillId::from_str("Super Heal").is_err());
    }

    #[test]
    fn side_opponent_and_index() {
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent().opponent(), Side::Right);
        assert_eq!(Side::Left.to_index(), 0);
        assert_eq!(Side::Right.to_index(), 1);
    }

    #[test]
    fn sprite_keys_are_locale_independent() {
        assert_eq!(EntityRole::Npc(NpcSpecies::Wolf).sprite_key(), "Wolf");
        assert_eq!(EntityRole::FinalBoss.sprite_key(), "final_boss");
        assert_eq!(EffectKey::Flame.as_str(), "Flame");
    }
}
