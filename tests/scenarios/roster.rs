//! Roster scenario tests
//!
//! Participants joining and leaving mid-fight

use gmscreen::combat::{CombatParticipant, EncounterError, ManagerError, ParticipantUpdate};

use crate::harness::TestTable;

fn table_of(size: usize) -> TestTable {
    // Distinct reflexes with a flat die keep the order a, b, c, ...
    let mut table = TestTable::new("Roster", &[5]);
    for i in 0..size {
        let id = ((b'a' + i as u8) as char).to_string();
        table = table.pc(&id, 20 - i as i32);
    }
    table.start();
    table
}

/// Removing the acting participant never leaves the pointer dangling
#[test]
fn test_remove_acting_participant_all_sizes() {
    for size in 1..=6 {
        for turn in 0..size {
            let table = table_of(size);
            for _ in 0..turn {
                table.next();
            }
            let acting = table.acting().unwrap();

            let encounter = table
                .manager
                .remove_participant(&table.encounter_id, &acting)
                .unwrap();

            assert_eq!(encounter.participants().len(), size - 1);
            if size == 1 {
                assert_eq!(encounter.current_turn(), 0);
                assert!(encounter.current_participant().is_none());
            } else {
                assert!(
                    encounter.current_turn() < encounter.participants().len(),
                    "size {size}, turn {turn}: pointer {} out of range",
                    encounter.current_turn()
                );
                assert_ne!(encounter.current_participant().unwrap().id, acting);
            }
        }
    }
}

#[test]
fn test_remove_earlier_participant_keeps_actor() {
    let table = table_of(4);
    table.next();
    table.next();
    assert_eq!(table.acting().as_deref(), Some("c"));

    table
        .manager
        .remove_participant(&table.encounter_id, "a")
        .unwrap();
    assert_eq!(table.acting().as_deref(), Some("c"));
    assert_eq!(table.encounter().current_turn(), 1);
}

#[test]
fn test_remove_unknown_participant_is_noop() {
    let table = table_of(3);
    let before = table.encounter();
    let after = table
        .manager
        .remove_participant(&table.encounter_id, "nobody")
        .unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_join_mid_fight_goes_last_until_sorted() {
    let table = table_of(2);
    let table = table.add(CombatParticipant::npc("late", "Late Arrival", 20).with_reflexes(30));
    assert_eq!(table.order(), vec!["a", "b", "late"]);

    // Give it an initiative and re-sort; the actor stays the actor
    table.next();
    table
        .manager
        .update_participant(
            &table.encounter_id,
            "late",
            ParticipantUpdate {
                initiative: Some(99),
                ..Default::default()
            },
        )
        .unwrap();
    table.manager.sort_by_initiative(&table.encounter_id).unwrap();
    assert_eq!(table.order(), vec!["late", "a", "b"]);
    assert_eq!(table.acting().as_deref(), Some("b"));
}

#[test]
fn test_duplicate_id_rejected() {
    let table = table_of(2);
    let before = table.encounter();
    let err = table
        .manager
        .add_participant(&table.encounter_id, CombatParticipant::new("a", "Impostor", 10))
        .unwrap_err();
    assert_eq!(
        err,
        ManagerError::Encounter(EncounterError::DuplicateParticipant("a".into()))
    );
    assert_eq!(table.encounter(), before);
}

#[test]
fn test_wounds_follow_hit_points() {
    let table = table_of(1);
    let encounter = table
        .manager
        .update_participant(&table.encounter_id, "a", ParticipantUpdate::hit_points(20))
        .unwrap();
    assert!(encounter.participant("a").unwrap().seriously_wounded());

    let encounter = table
        .manager
        .update_participant(&table.encounter_id, "a", ParticipantUpdate::hit_points(-5))
        .unwrap();
    let a = encounter.participant("a").unwrap();
    assert_eq!(a.hit_points(), -5);
    assert!(a.seriously_wounded());

    let encounter = table.manager.heal(&table.encounter_id, "a", 100).unwrap();
    let a = encounter.participant("a").unwrap();
    assert_eq!(a.hit_points(), 40);
    assert!(!a.seriously_wounded());
}
