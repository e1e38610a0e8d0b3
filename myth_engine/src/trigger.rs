//! Trigger module --
//!
//! Map content (NPCs, tiles) and quest content refer to behavior by name only. A [`Trigger`]
//! is either the name of a callback registered with the game, or a request to advance a
//! quest by one of its actions. Both resolve through registries handed down the call chain,
//! so nothing in a map or quest depends on the code that implements the behavior.
//!
//! Callbacks can't touch the world while it is mid-dispatch, so they queue [`WorldEdit`]s
//! on their [`TriggerContext`] instead. The game applies those once the dispatch returns.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::item::Item;
use crate::quest::Quest;

/// Keyword parameters passed to a trigger callback.
pub type TriggerParams = BTreeMap<String, String>;

/// Boxed callback stored in [`TriggerActions`].
pub type TriggerCallback = Box<dyn FnMut(&mut TriggerContext<'_>) -> anyhow::Result<()>>;

/// Something that happens when an actor is interacted with or a tile is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Call the callback registered under this name. An empty name does nothing.
    Callback(String),
    /// Perform `action` on the quest registered as `quest`.
    QuestStateChange { quest: String, action: String },
}

impl Trigger {
    pub fn callback(name: impl Into<String>) -> Self {
        Trigger::Callback(name.into())
    }

    pub fn quest(quest: impl Into<String>, action: impl Into<String>) -> Self {
        Trigger::QuestStateChange {
            quest: quest.into(),
            action: action.into(),
        }
    }

    /// Fire the trigger.
    ///
    /// Plain callbacks receive `params`; quest state changes ignore them and go through
    /// the quest registry instead.
    ///
    /// # Errors
    /// - unknown callback or quest names, unknown quest actions
    /// - any failure raised by the invoked callback
    pub fn activate(
        &self,
        quests: &mut dyn QuestRegistry,
        triggers: &mut dyn TriggerRegistry,
        params: &TriggerParams,
    ) -> EngineResult<()> {
        match self {
            Trigger::Callback(name) if name.is_empty() => Ok(()),
            Trigger::Callback(name) => {
                info!("Trigger fired: {name}");
                triggers.invoke(name, params)
            },
            Trigger::QuestStateChange { quest, action } => {
                info!("Trigger fired: quest '{quest}' <- '{action}'");
                quests.quest_mut(quest)?.perform_action(action, triggers)
            },
        }
    }
}

/// Name-indexed lookup of externally registered callbacks.
pub trait TriggerRegistry {
    /// Invoke the callback registered under `name` with `params`.
    ///
    /// # Errors
    /// - `UnknownTrigger` if nothing is registered under `name`
    /// - `Callback` if the callback itself fails
    fn invoke(&mut self, name: &str, params: &TriggerParams) -> EngineResult<()>;
}

/// Id-indexed lookup of quests.
pub trait QuestRegistry {
    /// # Errors
    /// - `UnknownQuest` if no quest has this id
    fn quest_mut(&mut self, id: &str) -> EngineResult<&mut Quest>;
}

/// Changes to the world requested by a callback, applied after the current dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEdit {
    /// Take the named actor off the current map.
    RemoveActor { name: String },
    /// Re-bind (or clear) the interaction trigger of an NPC on the current map.
    SetNpcTrigger { name: String, trigger: Option<Trigger> },
    /// Perform an action on a quest.
    PerformQuestAction { quest: String, action: String },
    /// Put an item into the player's inventory.
    GiveItem(Item),
    /// Text for the presentation layer to show.
    Message(String),
}

/// What a callback sees while it runs.
pub struct TriggerContext<'a> {
    name: &'a str,
    params: &'a TriggerParams,
    edits: &'a mut Vec<WorldEdit>,
}

impl<'a> TriggerContext<'a> {
    pub fn new(name: &'a str, params: &'a TriggerParams, edits: &'a mut Vec<WorldEdit>) -> Self {
        Self { name, params, edits }
    }

    /// Name the callback was invoked under.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn params(&self) -> &TriggerParams {
        self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Queue a world edit.
    pub fn push(&mut self, edit: WorldEdit) {
        self.edits.push(edit);
    }

    /// Queue a message for the player.
    pub fn say(&mut self, text: impl Into<String>) {
        self.push(WorldEdit::Message(text.into()));
    }
}

/// The game's registry of trigger callbacks, plus the edits they have queued.
#[derive(Default)]
pub struct TriggerActions {
    callbacks: HashMap<String, TriggerCallback>,
    pending: Vec<WorldEdit>,
}

impl TriggerActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut TriggerContext<'_>) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        info!("registered trigger action '{name}'");
        self.callbacks.insert(name, Box::new(callback));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Drain the edits queued so far.
    pub fn take_edits(&mut self) -> Vec<WorldEdit> {
        std::mem::take(&mut self.pending)
    }
}

impl TriggerRegistry for TriggerActions {
    fn invoke(&mut self, name: &str, params: &TriggerParams) -> EngineResult<()> {
        let callback = self
            .callbacks
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownTrigger(name.to_string()))?;
        let mut ctx = TriggerContext::new(name, params, &mut self.pending);
        callback(&mut ctx).map_err(|source| EngineError::Callback {
            name: name.to_string(),
            source,
        })
    }
}

impl Debug for TriggerActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("TriggerActions")
            .field("callbacks", &names)
            .field("pending", &self.pending)
            .finish()
    }
}
