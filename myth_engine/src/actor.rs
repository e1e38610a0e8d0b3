//! Actors: the player and non-player characters placed on a map.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::error::{EngineError, EngineResult};
use crate::grid::Pos;
use crate::item::Inventory;
use crate::trigger::Trigger;

/// One of the four grid directions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit offset of one step in this direction.
    pub const fn shift(self) -> Pos {
        match self {
            Direction::Up => Pos::new(0, -1),
            Direction::Down => Pos::new(0, 1),
            Direction::Left => Pos::new(-1, 0),
            Direction::Right => Pos::new(1, 0),
        }
    }

    /// Direction of a relative shift. Only the sign of the nonzero component matters.
    ///
    /// # Errors
    /// - `InvalidShift` unless exactly one of `dx`, `dy` is nonzero
    pub fn from_shift(dx: i32, dy: i32) -> EngineResult<Direction> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Ok(Direction::Up),
            (0, 1) => Ok(Direction::Down),
            (-1, 0) => Ok(Direction::Left),
            (1, 0) => Ok(Direction::Right),
            _ => Err(EngineError::InvalidShift { dx, dy }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "north" => Ok(Direction::Up),
            "down" | "south" => Ok(Direction::Down),
            "left" | "west" => Ok(Direction::Left),
            "right" | "east" => Ok(Direction::Right),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// A movement request: a direction, or a raw offset to be resolved into one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shift {
    Dir(Direction),
    By(i32, i32),
}

impl Shift {
    /// # Errors
    /// - `InvalidShift` for an offset that isn't along exactly one axis
    pub fn direction(self) -> EngineResult<Direction> {
        match self {
            Shift::Dir(dir) => Ok(dir),
            Shift::By(dx, dy) => Direction::from_shift(dx, dy),
        }
    }
}

impl From<Direction> for Shift {
    fn from(value: Direction) -> Self {
        Shift::Dir(value)
    }
}

impl From<(i32, i32)> for Shift {
    fn from((dx, dy): (i32, i32)) -> Self {
        Shift::By(dx, dy)
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub default_sprite: String,
    pub directional_sprites: BTreeMap<Direction, String>,
    pub direction: Direction,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(name: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_sprite: sprite.into(),
            directional_sprites: BTreeMap::new(),
            direction: Direction::default(),
            inventory: Inventory::new(),
        }
    }

    #[must_use]
    pub fn with_directional_sprite(mut self, direction: Direction, sprite: impl Into<String>) -> Self {
        self.directional_sprites.insert(direction, sprite.into());
        self
    }

    /// Sprite for the current facing, falling back to the default sprite.
    pub fn sprite(&self) -> &str {
        self.directional_sprites
            .get(&self.direction)
            .unwrap_or(&self.default_sprite)
    }

    pub fn face(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

/// A non-player character. Bumping into it fires its trigger, if it has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    pub sprite: String,
    pub trigger: Option<Trigger>,
    pub message: Option<String>,
}

impl Npc {
    pub fn new(name: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprite: sprite.into(),
            trigger: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn set_trigger(&mut self, trigger: Option<Trigger>) {
        self.trigger = trigger;
    }
}

/// Anything that occupies a cell and blocks movement into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Variantly)]
pub enum Actor {
    Player(Player),
    Npc(Npc),
}

impl Actor {
    pub fn name(&self) -> &str {
        match self {
            Actor::Player(player) => &player.name,
            Actor::Npc(npc) => &npc.name,
        }
    }

    pub fn sprite(&self) -> &str {
        match self {
            Actor::Player(player) => player.sprite(),
            Actor::Npc(npc) => &npc.sprite,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Actor::Player(player) => Some(player),
            Actor::Npc(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Actor::Player(player) => Some(player),
            Actor::Npc(_) => None,
        }
    }

    pub fn as_npc(&self) -> Option<&Npc> {
        match self {
            Actor::Npc(npc) => Some(npc),
            Actor::Player(_) => None,
        }
    }

    pub fn as_npc_mut(&mut self) -> Option<&mut Npc> {
        match self {
            Actor::Npc(npc) => Some(npc),
            Actor::Player(_) => None,
        }
    }
}

impl From<Player> for Actor {
    fn from(value: Player) -> Self {
        Actor::Player(value)
    }
}

impl From<Npc> for Actor {
    fn from(value: Npc) -> Self {
        Actor::Npc(value)
    }
}
