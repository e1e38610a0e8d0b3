//! Loader utilities for building a `World` from a compiled `WorldDef` (RON).

pub mod maps;
pub mod quests;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use myth_data::WorldDef;

use crate::loader::maps::{build_map, build_player};
use crate::loader::quests::build_quest;
use crate::world::World;

/// Load, validate and build the world stored at `path`.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, validation or building.
pub fn load_world(path: &Path) -> Result<World> {
    let def = load_world_def(path).context("while loading worlddef from file")?;
    build_world(&def).context("while building world from worlddef")
}

/// Read and validate a compiled world definition.
///
/// # Errors
/// - on file IO or RON parsing failure
/// - if validation finds any problem; all problems are listed in one error
pub fn load_world_def(path: &Path) -> Result<WorldDef> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading world data from '{}'", path.display()))?;
    let def: WorldDef = ron::from_str(&raw).with_context(|| format!("parsing world data from '{}'", path.display()))?;
    validate_worlddef(&def)?;
    Ok(def)
}

/// Validate the compiled `WorldDef` and return a single aggregated error.
fn validate_worlddef(def: &WorldDef) -> Result<()> {
    let errors = myth_data::validate_world(def);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("worlddef validation failed:\n{details}");
}

/// Build the runtime world from a validated definition.
///
/// # Errors
/// - on any reference the definition gets wrong (unknown maps, quest states and the like)
pub fn build_world(def: &WorldDef) -> Result<World> {
    let mut world = World::new();
    world.title.clone_from(&def.game.title);

    for map_def in &def.maps {
        world.add_map(build_map(map_def).with_context(|| format!("building map '{}'", map_def.name))?);
    }
    for quest_def in &def.quests {
        world.add_quest(build_quest(quest_def).with_context(|| format!("building quest '{}'", quest_def.id))?);
    }

    let player_def = &def.game.player;
    let player = build_player(player_def).context("while building player from definition")?;
    world
        .get_map_mut(&player_def.map)
        .with_context(|| format!("player start map '{}' not found", player_def.map))?
        .add_actor((player_def.x, player_def.y).into(), player)
        .context("placing player")?;
    info!(
        "player \"{}\" placed on '{}' at ({}, {})",
        player_def.name, player_def.map, player_def.x, player_def.y
    );

    let start_map = if def.game.start_map.is_empty() {
        &player_def.map
    } else {
        &def.game.start_map
    };
    world.set_current_map(start_map)?;

    info!("{} maps added to World", world.maps().count());
    info!("{} quests added to World", world.quests().len());
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Pos;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TINY_WORLD: &str = r#"(
        game: (
            title: "Tiny",
            player: (name: "Hero", sprite: "hero", map: "home", x: 1, y: 1),
        ),
        maps: [
            (name: "home", width: 3, height: 3),
            (name: "shed", width: 2, height: 2),
        ],
    )"#;

    #[test]
    fn builds_world_and_places_player() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(TINY_WORLD.as_bytes())?;
        let world = load_world(file.path())?;
        assert_eq!(world.title, "Tiny");
        assert_eq!(world.current_map_name(), Some("home"));
        assert_eq!(world.player().map(|(pos, _)| pos), Some(Pos::new(1, 1)));
        Ok(())
    }

    #[test]
    fn start_map_overrides_player_map() -> Result<()> {
        let mut def: WorldDef = ron::from_str(TINY_WORLD)?;
        def.game.start_map = "shed".into();
        let world = build_world(&def)?;
        assert_eq!(world.current_map_name(), Some("shed"));
        Ok(())
    }

    #[test]
    fn validation_errors_are_aggregated() -> Result<()> {
        let mut def: WorldDef = ron::from_str(TINY_WORLD)?;
        def.game.player.x = 10;
        def.game.start_map = "nowhere".into();
        let err = validate_worlddef(&def).unwrap_err().to_string();
        assert!(err.contains("worlddef validation failed"));
        assert!(err.contains("outside map 'home'"));
        assert!(err.contains("missing map 'nowhere'"));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_world(Path::new("/definitely/not/here/world.ron")).is_err());
    }
}
