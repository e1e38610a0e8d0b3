//! Map module --
//!
//! A map is a fixed-size grid of terrain with actors, items, portals and tile triggers
//! placed on it. All player movement goes through [`Map::shift_player`], which resolves
//! what happens at the destination cell in a fixed priority order:
//!
//! 1. bounds
//! 2. passability
//! 3. another actor (interaction)
//! 4. portal
//! 5. plain move, then the tile trigger if any
//!
//! Crossing a portal is reported back as [`MoveOutcome::Portalled`]; the map never moves an
//! actor onto another map itself.

use std::fmt::Display;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Player, Shift};
use crate::error::{EngineError, EngineResult};
use crate::grid::{Grid, Pos, Size};
use crate::item::Item;
use crate::trigger::{QuestRegistry, Trigger, TriggerParams, TriggerRegistry};

/// Static content of one cell: images in paint order and whether it can be walked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    pub images: Vec<String>,
    pub passable: bool,
}
impl Terrain {
    pub fn new<S: Into<String>>(images: impl IntoIterator<Item = S>, passable: bool) -> Self {
        Self {
            images: images.into_iter().map(Into::into).collect(),
            passable,
        }
    }

    pub fn wall() -> Self {
        Self {
            images: Vec::new(),
            passable: false,
        }
    }
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            passable: true,
        }
    }
}

/// Exit to a cell on another map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub dest_map: String,
    pub entrance: Pos,
}
impl Portal {
    pub fn new(dest_map: impl Into<String>, entrance: impl Into<Pos>) -> Self {
        Self {
            dest_map: dest_map.into(),
            entrance: entrance.into(),
        }
    }
}

/// Something placed at a position on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placed<T> {
    pub pos: Pos,
    pub obj: T,
}

/// Why a move did not happen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockReason {
    OutOfBounds,
    Impassable,
}

/// Result of a single movement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player advanced one cell.
    Moved { from: Pos, to: Pos },
    /// The player stayed put; only the facing changed.
    Blocked(BlockReason),
    /// Another actor was in the way and was interacted with instead.
    Interacted { with: String },
    /// The player stepped onto a portal. Moving the actor is up to the caller.
    Portalled { actor: String, portal: Portal },
}
impl Display for MoveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveOutcome::Moved { from, to } => write!(f, "moved {from} -> {to}"),
            MoveOutcome::Blocked(BlockReason::OutOfBounds) => write!(f, "blocked by map edge"),
            MoveOutcome::Blocked(BlockReason::Impassable) => write!(f, "blocked by terrain"),
            MoveOutcome::Interacted { with } => write!(f, "interacted with {with}"),
            MoveOutcome::Portalled { actor, portal } => {
                write!(f, "{actor} portalled to '{}' {}", portal.dest_map, portal.entrance)
            },
        }
    }
}

/// A single tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
    tiles: Grid<Terrain>,
    actors: Vec<Placed<Actor>>,
    items: Vec<Placed<Item>>,
    portals: Vec<Placed<Portal>>,
    triggers: Vec<Placed<Trigger>>,
}

impl Map {
    /// Create an empty map with passable, image-less terrain everywhere.
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            tiles: Grid::new(size, Terrain::default()),
            actors: Vec::new(),
            items: Vec::new(),
            portals: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.tiles.size()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.tiles.contains(pos)
    }

    fn check_bounds(&self, pos: Pos) -> EngineResult<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds { pos, size: self.size() })
        }
    }

    pub fn tile(&self, pos: Pos) -> Option<&Terrain> {
        self.tiles.cell(pos)
    }

    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    pub fn set_tile(&mut self, pos: Pos, terrain: Terrain) -> EngineResult<()> {
        self.tiles.set_cell(pos, terrain)
    }

    pub fn is_passable(&self, pos: Pos) -> bool {
        self.tile(pos).is_some_and(|terrain| terrain.passable)
    }

    pub fn iter_tiles(&self) -> impl Iterator<Item = (Pos, &Terrain)> {
        self.tiles.iter()
    }

    // ---- actors ----

    /// Place an actor.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    /// - `DuplicatePlayer` if the actor is a player and the map already has one
    /// - `DuplicateActor` if another actor already has this name
    pub fn add_actor(&mut self, pos: Pos, actor: impl Into<Actor>) -> EngineResult<()> {
        let actor = actor.into();
        self.check_bounds(pos)?;
        if actor.is_player() && self.find_player().is_some() {
            return Err(EngineError::DuplicatePlayer);
        }
        if self.find_actor(actor.name()).is_some() {
            return Err(EngineError::DuplicateActor(actor.name().to_string()));
        }
        debug!("map '{}': placed '{}' at {pos}", self.name, actor.name());
        self.actors.push(Placed { pos, obj: actor });
        Ok(())
    }

    /// Take an actor off the map, returning it with its last position.
    ///
    /// # Errors
    /// - `ActorNotFound` if no actor has this name
    pub fn remove_actor(&mut self, name: &str) -> EngineResult<(Pos, Actor)> {
        let idx = self
            .actors
            .iter()
            .position(|placed| placed.obj.name() == name)
            .ok_or_else(|| EngineError::ActorNotFound(name.to_string()))?;
        let placed = self.actors.remove(idx);
        info!("map '{}': removed '{name}' from {}", self.name, placed.pos);
        Ok((placed.pos, placed.obj))
    }

    /// Take the player off the map, returning it with its last position.
    ///
    /// # Errors
    /// - `NoPlayer` if the map has no player
    pub fn remove_player(&mut self) -> EngineResult<(Pos, Actor)> {
        let idx = self
            .actors
            .iter()
            .position(|placed| placed.obj.is_player())
            .ok_or(EngineError::NoPlayer)?;
        let placed = self.actors.remove(idx);
        info!("map '{}': removed player '{}' from {}", self.name, placed.obj.name(), placed.pos);
        Ok((placed.pos, placed.obj))
    }

    pub fn find_actor(&self, name: &str) -> Option<&Actor> {
        self.actors
            .iter()
            .find(|placed| placed.obj.name() == name)
            .map(|placed| &placed.obj)
    }

    pub fn find_actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|placed| placed.obj.name() == name)
            .map(|placed| &mut placed.obj)
    }

    pub fn find_actor_pos(&self, name: &str) -> Option<Pos> {
        self.actors
            .iter()
            .find(|placed| placed.obj.name() == name)
            .map(|placed| placed.pos)
    }

    /// The player on this map and where it stands.
    pub fn find_player(&self) -> Option<(Pos, &Player)> {
        self.actors
            .iter()
            .find_map(|placed| placed.obj.as_player().map(|player| (placed.pos, player)))
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.actors.iter_mut().find_map(|placed| placed.obj.as_player_mut())
    }

    pub fn actors_at(&self, pos: Pos) -> impl Iterator<Item = &Actor> {
        self.actors
            .iter()
            .filter(move |placed| placed.pos == pos)
            .map(|placed| &placed.obj)
    }

    pub fn iter_actors(&self) -> impl Iterator<Item = (Pos, &Actor)> {
        self.actors.iter().map(|placed| (placed.pos, &placed.obj))
    }

    /// Re-bind (or clear) the interaction trigger of an NPC.
    ///
    /// # Errors
    /// - `ActorNotFound` if there is no NPC with this name
    pub fn set_npc_trigger(&mut self, name: &str, trigger: Option<Trigger>) -> EngineResult<()> {
        let npc = self
            .find_actor_mut(name)
            .and_then(Actor::as_npc_mut)
            .ok_or_else(|| EngineError::ActorNotFound(name.to_string()))?;
        info!("npc '{name}' trigger set to {trigger:?}");
        npc.set_trigger(trigger);
        Ok(())
    }

    // ---- items ----

    /// Place an item on top of whatever already lies at `pos`.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    pub fn add_item(&mut self, pos: Pos, item: Item) -> EngineResult<()> {
        self.check_bounds(pos)?;
        self.items.push(Placed { pos, obj: item });
        Ok(())
    }

    /// Put an item down, merging a collectible into a matching stack already at `pos`.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    pub fn drop_item(&mut self, pos: Pos, item: Item) -> EngineResult<()> {
        self.check_bounds(pos)?;
        let leftover = match self
            .items
            .iter_mut()
            .find(|placed| placed.pos == pos && placed.obj.stacks_with(&item))
        {
            Some(stack) => stack.obj.merge(item),
            None => Some(item),
        };
        if let Some(item) = leftover {
            self.items.push(Placed { pos, obj: item });
        }
        Ok(())
    }

    /// Take an item off `pos`. Without a name, the topmost (last placed) item is taken.
    /// Returns `None` when there is nothing matching.
    pub fn pick_item(&mut self, pos: Pos, name: Option<&str>) -> Option<Item> {
        let idx = self
            .items
            .iter()
            .rposition(|placed| placed.pos == pos && name.is_none_or(|name| placed.obj.name == name))?;
        Some(self.items.remove(idx).obj)
    }

    /// Items at `pos`, bottom first.
    pub fn items_at_pos(&self, pos: Pos) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|placed| placed.pos == pos)
            .map(|placed| &placed.obj)
            .collect()
    }

    pub fn iter_items(&self) -> impl Iterator<Item = (Pos, &Item)> {
        self.items.iter().map(|placed| (placed.pos, &placed.obj))
    }

    // ---- portals and tile triggers ----

    /// Place a portal. A portal already at `pos` is replaced.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    pub fn add_portal(&mut self, pos: Pos, portal: Portal) -> EngineResult<()> {
        self.check_bounds(pos)?;
        replace_or_push(&mut self.portals, pos, portal, &self.name, "portal");
        Ok(())
    }

    /// Place a tile trigger. A trigger already at `pos` is replaced.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the map
    pub fn add_trigger(&mut self, pos: Pos, trigger: Trigger) -> EngineResult<()> {
        self.check_bounds(pos)?;
        replace_or_push(&mut self.triggers, pos, trigger, &self.name, "trigger");
        Ok(())
    }

    pub fn portal_at(&self, pos: Pos) -> Option<&Portal> {
        self.portals
            .iter()
            .find(|placed| placed.pos == pos)
            .map(|placed| &placed.obj)
    }

    pub fn trigger_at(&self, pos: Pos) -> Option<&Trigger> {
        self.triggers
            .iter()
            .find(|placed| placed.pos == pos)
            .map(|placed| &placed.obj)
    }

    pub fn iter_portals(&self) -> impl Iterator<Item = (Pos, &Portal)> {
        self.portals.iter().map(|placed| (placed.pos, &placed.obj))
    }

    pub fn iter_triggers(&self) -> impl Iterator<Item = (Pos, &Trigger)> {
        self.triggers.iter().map(|placed| (placed.pos, &placed.obj))
    }

    // ---- movement ----

    /// Try to move the player one step.
    ///
    /// The player turns to face the move direction even when the move is blocked.
    /// Interaction and tile triggers fire before this returns; a portal does not move
    /// anything and is reported back instead.
    ///
    /// # Errors
    /// - `InvalidShift` for a shift along neither or both axes
    /// - `NoPlayer` if the map has no player
    /// - any error raised while firing a trigger
    pub fn shift_player(
        &mut self,
        shift: impl Into<Shift>,
        quests: &mut dyn QuestRegistry,
        triggers: &mut dyn TriggerRegistry,
    ) -> EngineResult<MoveOutcome> {
        let direction = shift.into().direction()?;
        let idx = self
            .actors
            .iter()
            .position(|placed| placed.obj.is_player())
            .ok_or(EngineError::NoPlayer)?;
        let mover = &mut self.actors[idx];
        if let Some(player) = mover.obj.as_player_mut() {
            player.face(direction);
        }
        let from = mover.pos;
        let to = from + direction.shift();
        let mover_name = mover.obj.name().to_string();

        if !self.contains(to) {
            debug!("'{mover_name}' bumped into the edge of '{}' at {to}", self.name);
            return Ok(MoveOutcome::Blocked(BlockReason::OutOfBounds));
        }
        if !self.is_passable(to) {
            debug!("'{mover_name}' bumped into impassable terrain at {to}");
            return Ok(MoveOutcome::Blocked(BlockReason::Impassable));
        }

        if let Some(occupant) = self.actors.iter().find(|placed| placed.pos == to) {
            let with = occupant.obj.name().to_string();
            info!("'{mover_name}' interacts with '{with}' at {to}");
            if let Some(trigger) = occupant.obj.as_npc().and_then(|npc| npc.trigger.as_ref()) {
                let params = TriggerParams::from([("actor".to_string(), with.clone())]);
                trigger.activate(quests, triggers, &params)?;
            }
            return Ok(MoveOutcome::Interacted { with });
        }

        if let Some(portal) = self.portal_at(to) {
            info!(
                "'{mover_name}' entered portal at {to} on '{}' leading to '{}' {}",
                self.name, portal.dest_map, portal.entrance
            );
            return Ok(MoveOutcome::Portalled {
                actor: mover_name,
                portal: portal.clone(),
            });
        }

        self.actors[idx].pos = to;
        info!("'{mover_name}' moved {direction} {from} -> {to}");
        if let Some(trigger) = self.trigger_at(to) {
            trigger.activate(quests, triggers, &TriggerParams::new())?;
        }
        Ok(MoveOutcome::Moved { from, to })
    }
}

fn replace_or_push<T>(list: &mut Vec<Placed<T>>, pos: Pos, obj: T, map: &str, what: &str) {
    if let Some(existing) = list.iter_mut().find(|placed| placed.pos == pos) {
        warn!("map '{map}': replacing {what} at {pos}");
        existing.obj = obj;
    } else {
        list.push(Placed { pos, obj });
    }
}
