#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const MYTH_VERSION: &str = env!("CARGO_PKG_VERSION");

// Gameplay core
pub mod actor;
pub mod error;
pub mod game;
pub mod grid;
pub mod item;
pub mod map;
pub mod quest;
pub mod trigger;
pub mod world;

// Content, persistence and front end
pub mod command;
pub mod config;
pub mod loader;
pub mod repl;
pub mod save_files;
pub mod style;

// Re-exports for convenience
pub use actor::{Actor, Direction, Npc, Player, Shift};
pub use error::{EngineError, EngineResult};
pub use game::Game;
pub use grid::{Pos, Size};
pub use item::{Inventory, Item, ItemKind};
pub use loader::load_world;
pub use map::{BlockReason, Map, MoveOutcome, Portal, Terrain};
pub use quest::{Effect, ExternalAction, Quest, QuestBook};
pub use repl::run_repl;
pub use trigger::{Trigger, TriggerContext, TriggerParams, WorldEdit};
pub use world::World;
