//! Game module --
//!
//! `Game` ties a [`World`] to the trigger callbacks registered by the front end. Every
//! public operation runs one dispatch into the world and then applies the [`WorldEdit`]s
//! the fired callbacks queued along the way.

use log::{info, warn};

use crate::actor::{Direction, Shift};
use crate::error::{EngineError, EngineResult};
use crate::item::Item;
use crate::map::{Map, MoveOutcome};
use crate::save_files::Savefile;
use crate::trigger::{TriggerActions, TriggerContext, WorldEdit};
use crate::world::World;

/// Most rounds of queued edits applied after a single dispatch.
pub const MAX_EDIT_ROUNDS: usize = 64;

type ChangeMapCallback = Box<dyn FnMut(&Map)>;

/// The composition root: a world plus the callbacks its content refers to by name.
#[derive(Default)]
pub struct Game {
    world: World,
    trigger_actions: TriggerActions,
    on_change_map: Option<ChangeMapCallback>,
    messages: Vec<String>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_world(world: World) -> Self {
        Self {
            world,
            ..Self::default()
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Replace the world, then tell the change-map callback about the new current map.
    pub fn load_world(&mut self, world: World) {
        self.world = world;
        self.trigger_actions.take_edits();
        info!(
            "world loaded, current map {:?}",
            self.world.current_map_name().unwrap_or("<none>")
        );
        if let (Some(callback), Some(map)) = (self.on_change_map.as_mut(), self.world.current_map()) {
            callback(map);
        }
    }

    /// Set the callback run whenever the current map changes.
    pub fn on_change_map<F>(&mut self, callback: F)
    where
        F: FnMut(&Map) + 'static,
    {
        self.on_change_map = Some(Box::new(callback));
    }

    /// Register a callback that map and quest content can invoke by `name`.
    pub fn register_trigger_action<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut TriggerContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.trigger_actions.register(name, callback);
    }

    pub fn has_trigger_action(&self, name: &str) -> bool {
        self.trigger_actions.contains(name)
    }

    /// Messages queued by callbacks since the last call.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Move the player one step.
    ///
    /// # Errors
    /// - anything [`World::shift_player`] or a queued edit reports
    pub fn shift_player(&mut self, direction: Direction) -> EngineResult<MoveOutcome> {
        self.shift(Shift::Dir(direction))
    }

    /// Move the player by a relative offset along one axis.
    ///
    /// # Errors
    /// - `InvalidShift` for a diagonal or zero offset, or anything `shift_player` reports
    pub fn shift_player_by(&mut self, dx: i32, dy: i32) -> EngineResult<MoveOutcome> {
        self.shift(Shift::By(dx, dy))
    }

    fn shift(&mut self, shift: Shift) -> EngineResult<MoveOutcome> {
        let on_change = self
            .on_change_map
            .as_mut()
            .map(|cb| &mut **cb as &mut dyn FnMut(&Map));
        let outcome = self.world.shift_player(shift, &mut self.trigger_actions, on_change);
        self.settle(outcome)
    }

    /// # Errors
    /// - `NoCurrentMap` / `NoPlayer`
    pub fn pick_item(&mut self, name: Option<&str>) -> EngineResult<Option<Item>> {
        self.world.player_pick_item(name)
    }

    /// # Errors
    /// - `NoCurrentMap` / `NoPlayer`
    pub fn drop_item(&mut self, name: &str, amount: u32) -> EngineResult<Option<Item>> {
        self.world.player_drop_item(name, amount)
    }

    /// Perform a quest action directly, as if a trigger had fired it.
    ///
    /// # Errors
    /// - `UnknownQuest`, `UnknownAction`, or any callback failure
    pub fn perform_quest_action(&mut self, quest: &str, action: &str) -> EngineResult<()> {
        let result = self
            .world
            .perform_quest_action(quest, action, &mut self.trigger_actions);
        self.settle(result)
    }

    /// Save the world. Returns `false` without writing if the file exists and `force` is off.
    ///
    /// # Errors
    /// - on serialization or filesystem failure
    pub fn save_to_file(&self, savefile: &Savefile, force: bool) -> anyhow::Result<bool> {
        if savefile.exists() && !force {
            warn!("refusing to overwrite {}", savefile.path.display());
            return Ok(false);
        }
        savefile.save(&self.world)?;
        Ok(true)
    }

    /// Load a saved world. Returns `false`, leaving the current world as is, if the save is
    /// missing or unreadable.
    pub fn load_from_file(&mut self, savefile: &Savefile) -> bool {
        match savefile.load() {
            Ok(Some(world)) => {
                self.load_world(world);
                true
            },
            Ok(None) => {
                warn!("no save file at {}", savefile.path.display());
                false
            },
            Err(err) => {
                warn!("failed to load {}: {err:#}", savefile.path.display());
                false
            },
        }
    }

    /// Apply pending edits after a dispatch, or throw them away if it failed.
    fn settle<T>(&mut self, result: EngineResult<T>) -> EngineResult<T> {
        match result {
            Ok(value) => {
                self.apply_edits()?;
                Ok(value)
            },
            Err(err) => {
                let dropped = self.trigger_actions.take_edits();
                if !dropped.is_empty() {
                    warn!("discarding {} world edits after error: {err}", dropped.len());
                }
                Err(err)
            },
        }
    }

    fn apply_edits(&mut self) -> EngineResult<()> {
        let mut rounds = 0;
        loop {
            let edits = self.trigger_actions.take_edits();
            if edits.is_empty() {
                return Ok(());
            }
            rounds += 1;
            if rounds > MAX_EDIT_ROUNDS {
                return Err(EngineError::EditLoop(MAX_EDIT_ROUNDS));
            }
            for edit in edits {
                self.apply_edit(edit)?;
            }
        }
    }

    fn apply_edit(&mut self, edit: WorldEdit) -> EngineResult<()> {
        match edit {
            WorldEdit::RemoveActor { name } => {
                self.world
                    .current_map_mut()
                    .ok_or(EngineError::NoCurrentMap)?
                    .remove_actor(&name)?;
            },
            WorldEdit::SetNpcTrigger { name, trigger } => {
                self.world
                    .current_map_mut()
                    .ok_or(EngineError::NoCurrentMap)?
                    .set_npc_trigger(&name, trigger)?;
            },
            WorldEdit::PerformQuestAction { quest, action } => {
                self.world
                    .perform_quest_action(&quest, &action, &mut self.trigger_actions)?;
            },
            WorldEdit::GiveItem(item) => {
                let player = self.world.player_mut()?;
                info!("'{}' received {} x{}", player.name, item.name, item.amount());
                player.inventory.add(item);
            },
            WorldEdit::Message(text) => {
                info!("message: {text}");
                self.messages.push(text);
            },
        }
        Ok(())
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("world", &self.world)
            .field("trigger_actions", &self.trigger_actions)
            .field("on_change_map", &self.on_change_map.is_some())
            .field("messages", &self.messages)
            .finish()
    }
}
