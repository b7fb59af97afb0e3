//! Turn order scenario tests

use gmscreen::combat::{CombatParticipant, StatusCondition};

use crate::harness::TestTable;

#[test]
fn test_initiative_ties_keep_insertion_order() {
    // Everyone ends up on 12
    let table = TestTable::new("Ties", &[7, 4, 2, 9])
        .pc("first", 5)
        .npc("second", 8)
        .pc("third", 10)
        .npc("fourth", 3);
    table.start();
    assert_eq!(table.order(), vec!["first", "second", "third", "fourth"]);
}

#[test]
fn test_default_reflexes() {
    let table = TestTable::new("Defaults", &[3, 3]).add(CombatParticipant::new("nobody", "Nobody", 10));
    let encounter = table.start();
    assert_eq!(encounter.participants()[0].initiative, 8);
}

#[test]
fn test_start_with_no_participants() {
    let table = TestTable::new("Empty", &[5]);
    let encounter = table.start();
    assert!(!encounter.is_active());
    assert!(encounter.log().is_empty());
}

#[test]
fn test_undo_is_not_time_travel() {
    let table = TestTable::new("Undo", &[5]).pc("a", 9).pc("b", 6);
    table.start();
    table
        .manager
        .add_condition(
            &table.encounter_id,
            "b",
            StatusCondition::timed("Blinded", 2).with_id("blind"),
        )
        .unwrap();

    table.next();
    table.next();
    let forward = table.encounter();
    assert_eq!(forward.round(), 2);

    let back = table.prev();
    assert_eq!(back.round(), 1);
    assert_eq!(back.current_turn(), 1);
    // The round already ticked and stays ticked
    let blinded = back.participant("b").unwrap().conditions.get("blind").unwrap();
    assert_eq!(blinded.duration, Some(1));
    // has_acted was reset by the wrap and is not restored
    assert!(back.participants().iter().all(|p| !p.has_acted));

    // Going forward again ticks a second time
    let again = table.next();
    assert_eq!(again.round(), 2);
    assert!(again.participant("b").unwrap().conditions.is_empty());
}

#[test]
fn test_round_never_drops_below_one() {
    let table = TestTable::new("Floor", &[5]).pc("a", 9).pc("b", 6);
    table.start();
    for _ in 0..5 {
        table.prev();
    }
    assert_eq!(table.encounter().round(), 1);
}

#[test]
fn test_pause_freezes_turns() {
    let table = TestTable::new("Pause", &[5]).pc("a", 9).pc("b", 6);
    table.start();
    let paused = table.manager.pause_combat(&table.encounter_id).unwrap();
    assert!(paused.is_paused());

    table.next();
    assert_eq!(table.acting().as_deref(), Some("a"));

    table.manager.resume_combat(&table.encounter_id).unwrap();
    table.next();
    assert_eq!(table.acting().as_deref(), Some("b"));
}

#[test]
fn test_end_combat_keeps_everything_for_review() {
    let table = TestTable::new("Review", &[5]).pc("a", 9).npc("b", 6);
    table.start();
    table.next();
    table.next();
    table.next();
    let live = table.encounter();

    let ended = table.manager.end_combat(&table.encounter_id).unwrap();
    assert!(!ended.is_active());
    assert_eq!(ended.round(), live.round());
    assert_eq!(ended.participants(), live.participants());
    assert_eq!(ended.log().len(), live.log().len() + 1);
    assert!(ended.current_participant().is_none());

    // Restarting rolls fresh and begins at round 1
    let restarted = table.start();
    assert!(restarted.is_active());
    assert_eq!(restarted.round(), 1);
    assert_eq!(restarted.current_turn(), 0);
}
