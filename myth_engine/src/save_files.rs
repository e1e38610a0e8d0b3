//! Save-game files.
//!
//! A save is the whole [`World`] serialized as RON or pretty JSON. Slots are plain files in a
//! save directory named `<slot>.ron` or `<slot>.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::MYTH_VERSION;
use crate::world::World;

/// On-disk encoding of a save file.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    #[default]
    Ron,
    Json,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Ron => "ron",
            SaveFormat::Json => "json",
        }
    }

    pub fn from_extension(ext: &str) -> Option<SaveFormat> {
        match ext {
            "ron" => Some(SaveFormat::Ron),
            "json" => Some(SaveFormat::Json),
            _ => None,
        }
    }

    fn encode(self, world: &World) -> Result<String> {
        match self {
            SaveFormat::Ron => ron::ser::to_string_pretty(world, ron::ser::PrettyConfig::default())
                .context("error converting World to 'ron' format"),
            SaveFormat::Json => serde_json::to_string_pretty(world).context("error converting World to JSON"),
        }
    }

    fn decode(self, raw: &str) -> Result<World> {
        match self {
            SaveFormat::Ron => ron::from_str(raw).context("parsing RON save"),
            SaveFormat::Json => serde_json::from_str(raw).context("parsing JSON save"),
        }
    }
}

/// A save file location and its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savefile {
    pub path: PathBuf,
    pub format: SaveFormat,
}

impl Savefile {
    pub fn new(path: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// The save file for `slot` in `dir`.
    pub fn for_slot(dir: &Path, slot: &str, format: SaveFormat) -> Self {
        Self::new(dir.join(format!("{slot}.{}", format.extension())), format)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write `world` to disk, creating the parent directory if needed.
    ///
    /// # Errors
    /// - on serialization failure or any filesystem error
    pub fn save(&self, world: &World) -> Result<()> {
        let encoded = self.format.encode(world)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating save directory {}", parent.display()))?;
        }
        fs::write(&self.path, encoded).with_context(|| format!("writing save file {}", self.path.display()))?;
        info!("saved world to {}", self.path.display());
        Ok(())
    }

    /// Read a world back. A missing file is `Ok(None)`.
    ///
    /// A save written by a different engine version still loads, with a warning.
    ///
    /// # Errors
    /// - if the file exists but can't be read or parsed
    pub fn load(&self) -> Result<Option<World>> {
        if !self.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).with_context(|| format!("reading save file {}", self.path.display()))?;
        let world = self
            .format
            .decode(&raw)
            .with_context(|| format!("loading save file {}", self.path.display()))?;
        if world.version != MYTH_VERSION {
            warn!(
                "save file {} was written by engine {} (running {MYTH_VERSION})",
                self.path.display(),
                world.version
            );
        }
        info!("loaded world from {}", self.path.display());
        Ok(Some(world))
    }
}

/// A save file found in a save directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub format: SaveFormat,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl SaveSlot {
    pub fn savefile(&self) -> Savefile {
        Savefile::new(self.path.clone(), self.format)
    }
}

/// List the save slots in `dir`, sorted by slot name. A missing directory has no slots.
///
/// # Errors
/// Returns an error if the directory contents cannot be read or enumerated.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.format.extension().cmp(b.format.extension())));
    Ok(slots)
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() {
        return None;
    }
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SaveFormat::from_extension)?;
    let slot = path.file_stem().and_then(|stem| stem.to_str())?.to_string();
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot,
        format,
        path,
        modified,
    })
}

/// Format a human-friendly modified time relative to now.
pub fn format_modified(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(delta) => format_duration(delta),
        Err(_) => "in the future".to_string(),
    }
}

fn format_duration(duration: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;

    let secs = duration.as_secs();
    if secs < 30 {
        "just now".to_string()
    } else if secs < MINUTE {
        format!("{secs}s ago")
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Direction, Player};
    use crate::grid::{Pos, Size};
    use crate::map::Map;
    use tempfile::tempdir;

    fn small_world() -> World {
        let mut map = Map::new("yard", Size::new(3, 3));
        let mut player = Player::new("Hero", "hero");
        player.face(Direction::Left);
        map.add_actor(Pos::new(1, 1), player).unwrap();
        let mut world = World::new();
        world.add_map(map);
        world
    }

    #[test]
    fn collect_save_slots_handles_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let slots = collect_save_slots(&dir.path().join("missing"))?;
        assert!(slots.is_empty());
        Ok(())
    }

    #[test]
    fn collect_save_slots_skips_invalid_files() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path();
        fs::write(path.join("beta.json"), "{}")?;
        fs::write(path.join("alpha.ron"), "()")?;
        fs::write(path.join("notes.txt"), "ignore me")?;
        fs::create_dir_all(path.join("nested.ron"))?;

        let slots = collect_save_slots(path)?;
        let names: Vec<_> = slots.iter().map(|s| (s.slot.as_str(), s.format)).collect();
        assert_eq!(names, vec![("alpha", SaveFormat::Ron), ("beta", SaveFormat::Json)]);
        Ok(())
    }

    #[test]
    fn missing_save_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        let save = Savefile::for_slot(dir.path(), "nothing", SaveFormat::Ron);
        assert!(!save.exists());
        assert!(save.load()?.is_none());
        Ok(())
    }

    #[test]
    fn save_creates_directory_and_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let world = small_world();
        for format in [SaveFormat::Ron, SaveFormat::Json] {
            let save = Savefile::for_slot(&dir.path().join("slots"), "one", format);
            save.save(&world)?;
            assert!(save.exists());
            assert_eq!(save.load()?, Some(world.clone()));
        }
        Ok(())
    }

    #[test]
    fn corrupted_save_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.ron");
        fs::write(&path, "this is not valid ron")?;
        assert!(Savefile::new(path, SaveFormat::Ron).load().is_err());
        Ok(())
    }

    #[test]
    fn other_version_still_loads() -> Result<()> {
        let dir = tempdir()?;
        let mut world = small_world();
        world.version = "0.0.1".into();
        let save = Savefile::for_slot(dir.path(), "old", SaveFormat::Json);
        save.save(&world)?;
        let loaded = save.load()?.unwrap();
        assert_eq!(loaded.version, "0.0.1");
        Ok(())
    }

    #[test]
    fn durations_are_compact() {
        assert_eq!(format_duration(Duration::from_secs(5)), "just now");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m ago");
        assert_eq!(format_duration(Duration::from_secs(3 * 86_400)), "3d ago");
    }
}
