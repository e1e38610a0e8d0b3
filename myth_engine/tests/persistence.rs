use std::path::Path;

use myth_engine::save_files::{SaveFormat, Savefile, collect_save_slots};
use myth_engine::*;
use tempfile::tempdir;

fn sample_world() -> World {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/world.ron");
    load_world(&path).expect("shipped world should load")
}

fn game_in_progress() -> Game {
    let mut game = Game::with_world(sample_world());
    game.register_trigger_action("say", |_| Ok(()));
    game.register_trigger_action("quest_started", |_| Ok(()));
    game.register_trigger_action("quest_finished", |_| Ok(()));
    game.perform_quest_action("cart", "trader").unwrap();
    game.shift_player(Direction::Down).unwrap();
    game
}

#[test]
fn saved_game_restores_world_state() {
    let dir = tempdir().unwrap();
    for format in [SaveFormat::Ron, SaveFormat::Json] {
        let savefile = Savefile::for_slot(dir.path(), "slot1", format);
        let game = game_in_progress();
        assert!(game.save_to_file(&savefile, false).unwrap());

        let mut restored = Game::with_world(sample_world());
        assert!(restored.load_from_file(&savefile));
        assert_eq!(restored.world(), game.world());
        assert_eq!(restored.world().get_quest("cart").unwrap().current_state(), Some("asked"));
        assert_eq!(restored.world().player().unwrap().0, Pos::new(1, 2));
    }

    let slots = collect_save_slots(dir.path()).unwrap();
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|slot| slot.slot == "slot1"));
}

#[test]
fn existing_save_is_kept_unless_forced() {
    let dir = tempdir().unwrap();
    let savefile = Savefile::for_slot(dir.path(), "keep", SaveFormat::Ron);
    let game = game_in_progress();
    assert!(game.save_to_file(&savefile, false).unwrap());
    let first = std::fs::read_to_string(&savefile.path).unwrap();

    let fresh = Game::with_world(sample_world());
    assert!(!fresh.save_to_file(&savefile, false).unwrap());
    assert_eq!(std::fs::read_to_string(&savefile.path).unwrap(), first);

    assert!(fresh.save_to_file(&savefile, true).unwrap());
    assert_ne!(std::fs::read_to_string(&savefile.path).unwrap(), first);
}

#[test]
fn missing_or_broken_save_leaves_world_alone() {
    let dir = tempdir().unwrap();
    let mut game = game_in_progress();
    let before = game.world().clone();

    let missing = Savefile::for_slot(dir.path(), "nothing", SaveFormat::Ron);
    assert!(!game.load_from_file(&missing));

    let broken = Savefile::for_slot(dir.path(), "broken", SaveFormat::Json);
    std::fs::write(&broken.path, "{ not json").unwrap();
    assert!(!game.load_from_file(&broken));

    assert_eq!(game.world(), &before);
}

#[test]
fn save_with_misshapen_terrain_is_rejected() {
    let dir = tempdir().unwrap();
    let savefile = Savefile::for_slot(dir.path(), "tampered", SaveFormat::Json);
    let game = game_in_progress();
    assert!(game.save_to_file(&savefile, false).unwrap());

    let text = std::fs::read_to_string(&savefile.path).unwrap();
    let mut saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    let maps = saved.pointer_mut("/maps").expect("saved maps");
    for map in maps.as_array_mut().unwrap() {
        map["tiles"]["cells"] = serde_json::json!([]);
    }
    std::fs::write(&savefile.path, serde_json::to_string(&saved).unwrap()).unwrap();

    let mut restored = Game::with_world(sample_world());
    let before = restored.world().clone();
    assert!(!restored.load_from_file(&savefile));
    assert_eq!(restored.world(), &before);
    assert!(restored.shift_player(Direction::Right).is_ok());
}
