//! Engine error type.
//!
//! Every variant here is a content or wiring bug (a quest action that was never declared,
//! a trigger name nobody registered, a portal into a map that doesn't exist). Ordinary
//! gameplay outcomes such as bumping into a wall are not errors and never show up here.

use thiserror::Error;

use crate::grid::{Pos, Size};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("quest '{quest}' has no action named '{action}'")]
    UnknownAction { quest: String, action: String },
    #[error("quest '{quest}' has no state named '{state}'")]
    UnknownState { quest: String, state: String },
    #[error("no trigger action registered under '{0}'")]
    UnknownTrigger(String),
    #[error("no quest registered under '{0}'")]
    UnknownQuest(String),
    #[error("no map registered under '{0}'")]
    UnknownMap(String),
    #[error("cannot derive a direction from shift ({dx}, {dy}): exactly one component must be nonzero")]
    InvalidShift { dx: i32, dy: i32 },
    #[error("position {pos} is outside a {size} grid")]
    OutOfBounds { pos: Pos, size: Size },
    #[error("no actor named '{0}' on this map")]
    ActorNotFound(String),
    #[error("map already has a player")]
    DuplicatePlayer,
    #[error("map already has an actor named '{0}'")]
    DuplicateActor(String),
    #[error("no player on the current map")]
    NoPlayer,
    #[error("world has no current map")]
    NoCurrentMap,
    #[error("world edits still pending after {0} rounds")]
    EditLoop(usize),
    #[error("trigger action '{name}' failed")]
    Callback {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
