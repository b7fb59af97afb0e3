//! Save file scenario tests

use gmscreen::combat::{EncounterManager, ScriptedDice, StatusCondition};
use gmscreen::persist::{PersistError, SaveStore};

use crate::harness::TestTable;

#[tokio::test]
async fn test_save_and_resume_mid_fight() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SaveStore::new(dir.path().join("table.json"), 1 << 20);

    let table = TestTable::new("Rooftop", &[6, 2, 8]).pc("a", 7).npc("b", 7).npc("c", 4);
    table.start();
    table
        .manager
        .add_condition(
            &table.encounter_id,
            "b",
            StatusCondition::persistent("Grappled").with_effect("no movement"),
        )
        .unwrap();
    table.next();
    table.manager.roll_dice("2d6+3").unwrap();

    store
        .save(&table.manager.to_save_file())
        .await
        .expect("Failed to save");

    let resumed = EncounterManager::with_dice(ScriptedDice::new([1]), 10);
    let save = store.load().await.expect("Failed to load").expect("No save");
    resumed.restore(save);

    let original = table.encounter();
    let restored = resumed.get(&table.encounter_id).expect("Encounter missing");
    assert_eq!(restored, original);
    assert_eq!(resumed.dice_history(), table.manager.dice_history());

    // Play continues from where it stopped
    let next = resumed.next_turn(&table.encounter_id).unwrap();
    assert_eq!(next.current_turn(), original.current_turn() + 1);
}

#[tokio::test]
async fn test_quota_protects_existing_save() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("table.json");

    let table = TestTable::new("Small", &[5]).pc("a", 5);
    SaveStore::new(&path, 1 << 20)
        .save(&table.manager.to_save_file())
        .await
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let tiny = SaveStore::new(&path, 16);
    assert!(matches!(
        tiny.save(&table.manager.to_save_file()).await,
        Err(PersistError::TooLarge { .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

    assert!(matches!(tiny.load().await, Err(PersistError::TooLarge { .. })));
}

#[tokio::test]
async fn test_corrupt_save_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("table.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = SaveStore::new(&path, 1 << 20);
    assert!(matches!(store.load().await, Err(PersistError::Json(_))));
}

#[tokio::test]
async fn test_save_with_repeated_participant_refused() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SaveStore::new(dir.path().join("table.json"), 1 << 20);

    let table = TestTable::new("Doubles", &[5]).pc("a", 7).npc("b", 4);
    table.start();
    store.save(&table.manager.to_save_file()).await.unwrap();

    // Hand-edit the save so both entries claim the same id
    let mut value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    value["encounters"][0]["participants"][1]["id"] = "a".into();
    std::fs::write(store.path(), value.to_string()).unwrap();

    match store.load().await {
        Err(PersistError::DuplicateParticipant {
            encounter,
            participant,
        }) => {
            assert_eq!(encounter, table.encounter_id);
            assert_eq!(participant, "a");
        }
        other => panic!("expected duplicate participant error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SaveStore::new(dir.path().join("table.json"), 1 << 20);

    let table = TestTable::new("Tidy", &[5]).pc("a", 7);
    store.save(&table.manager.to_save_file()).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["table.json".to_string()]);
}
