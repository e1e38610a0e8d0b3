//! Quests.
//!
//! A [`Quest`] is a finite state machine. Its states are the intermediate steps of the
//! quest, its actions are the things that can happen to it (an NPC spoken to, a tile
//! stepped on). Each `(action, state)` cell of the transition table holds an ordered list of
//! [`Effect`]s that fire, in registration order, when the action is performed in that state.
//!
//! The "not started" state is the sentinel `None`; it is never listed among `states`.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::trigger::{QuestRegistry, TriggerParams, TriggerRegistry};

/// Reference to a callback registered outside the quest, with bound keyword parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAction {
    pub name: String,
    pub params: TriggerParams,
}

impl ExternalAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: TriggerParams::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    fn call(&self, triggers: &mut dyn TriggerRegistry) -> EngineResult<()> {
        triggers.invoke(&self.name, &self.params)
    }
}

/// One consequence of performing an action in a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Move the quest to the named state.
    Transition(String),
    /// Invoke an external callback.
    External(ExternalAction),
    /// Append a line to the quest history.
    History(String),
}

impl Effect {
    pub fn transition(state: impl Into<String>) -> Self {
        Effect::Transition(state.into())
    }

    pub fn external(name: impl Into<String>) -> Self {
        Effect::External(ExternalAction::new(name))
    }

    pub fn history(message: impl Into<String>) -> Self {
        Effect::History(message.into())
    }
}

/// A player's quest as a state machine over named states and actions.
///
/// Deserializing checks the table shape and that the current and finish states are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestData")]
pub struct Quest {
    pub id: String,
    pub title: String,
    states: Vec<String>,
    actions: Vec<String>,
    /// `table[action][state]`, where state index 0 is "not started".
    table: Vec<Vec<Vec<Effect>>>,
    finish_states: Vec<String>,
    start_hook: Option<ExternalAction>,
    finish_hook: Option<ExternalAction>,
    current_state: Option<String>,
    history: Vec<String>,
}

#[derive(Deserialize)]
struct QuestData {
    id: String,
    title: String,
    states: Vec<String>,
    actions: Vec<String>,
    table: Vec<Vec<Vec<Effect>>>,
    finish_states: Vec<String>,
    start_hook: Option<ExternalAction>,
    finish_hook: Option<ExternalAction>,
    current_state: Option<String>,
    history: Vec<String>,
}

impl TryFrom<QuestData> for Quest {
    type Error = String;

    fn try_from(data: QuestData) -> Result<Self, Self::Error> {
        let id = &data.id;
        if data.table.len() != data.actions.len() {
            return Err(format!(
                "quest '{id}': table has {} rows for {} actions",
                data.table.len(),
                data.actions.len()
            ));
        }
        let columns = data.states.len() + 1;
        if let Some(row) = data.table.iter().find(|row| row.len() != columns) {
            return Err(format!(
                "quest '{id}': table row has {} cells, expected {columns}",
                row.len()
            ));
        }
        let known = |state: &String| data.states.contains(state);
        if let Some(state) = data.current_state.iter().chain(&data.finish_states).find(|s| !known(s)) {
            return Err(format!("quest '{id}': unknown state '{state}'"));
        }
        Ok(Self {
            id: data.id,
            title: data.title,
            states: data.states,
            actions: data.actions,
            table: data.table,
            finish_states: data.finish_states,
            start_hook: data.start_hook,
            finish_hook: data.finish_hook,
            current_state: data.current_state,
            history: data.history,
        })
    }
}

impl Quest {
    /// Create a quest in the "not started" state. The state and action sets are fixed from here on.
    pub fn new<S, A>(
        id: impl Into<String>,
        title: impl Into<String>,
        states: impl IntoIterator<Item = S>,
        actions: impl IntoIterator<Item = A>,
    ) -> Self
    where
        S: Into<String>,
        A: Into<String>,
    {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        let actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        let table = vec![vec![Vec::new(); states.len() + 1]; actions.len()];
        Self {
            id: id.into(),
            title: title.into(),
            states,
            actions,
            table,
            finish_states: Vec::new(),
            start_hook: None,
            finish_hook: None,
            current_state: None,
            history: Vec::new(),
        }
    }

    /// Mark states that complete the quest. Names that aren't states of this quest are ignored.
    #[must_use]
    pub fn with_finish_states<S: Into<String>>(mut self, finish_states: impl IntoIterator<Item = S>) -> Self {
        for state in finish_states.into_iter().map(Into::into) {
            if self.states.contains(&state) {
                self.finish_states.push(state);
            } else {
                warn!("quest '{}': ignoring unknown finish state '{state}'", self.id);
            }
        }
        self
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn finish_states(&self) -> &[String] {
        &self.finish_states
    }

    /// Current state, or `None` if the quest hasn't started.
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    /// True once started and until a finish state is reached.
    pub fn is_active(&self) -> bool {
        self.current_state
            .as_ref()
            .is_some_and(|state| !self.finish_states.contains(state))
    }

    pub fn is_finished(&self) -> bool {
        self.current_state
            .as_ref()
            .is_some_and(|state| self.finish_states.contains(state))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn last_history_entry(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    /// Register the callback fired when the quest first leaves the "not started" state.
    /// It receives `quest=<id>`.
    pub fn on_start(&mut self, callback: impl Into<String>) {
        self.start_hook = Some(ExternalAction::new(callback).with_param("quest", self.id.clone()));
    }

    /// Register the callback fired on every transition into a finish state.
    /// It receives `quest=<id>`.
    pub fn on_finish(&mut self, callback: impl Into<String>) {
        self.finish_hook = Some(ExternalAction::new(callback).with_param("quest", self.id.clone()));
    }

    /// Append `effect` to the cell for `(state, action)`. `state = None` is "not started".
    ///
    /// # Errors
    /// - `UnknownAction` / `UnknownState` for names outside the quest's vocabulary,
    ///   including the target of a transition
    pub fn on_state(&mut self, state: Option<&str>, action: &str, effect: Effect) -> EngineResult<()> {
        if let Effect::Transition(target) = &effect {
            self.state_index(Some(target))?;
        }
        let state_idx = self.state_index(state)?;
        let action_idx = self.action_index(action)?;
        self.table[action_idx][state_idx].push(effect);
        Ok(())
    }

    /// Perform `action` in the current state, firing every effect registered for it in order.
    ///
    /// An action with nothing registered for the current state is a no-op.
    ///
    /// # Errors
    /// - `UnknownAction` if `action` isn't one of this quest's actions
    /// - any error from an invoked callback; effects after it don't run
    pub fn perform_action(&mut self, action: &str, triggers: &mut dyn TriggerRegistry) -> EngineResult<()> {
        let action_idx = self.action_index(action)?;
        let state_idx = self.state_index(self.current_state.as_deref())?;
        let effects = self.table[action_idx][state_idx].clone();
        if effects.is_empty() {
            info!(
                "quest '{}': '{action}' has no effect in state {:?}",
                self.id, self.current_state
            );
        }

        for effect in effects {
            match effect {
                Effect::Transition(target) => self.enter_state(target, action, triggers)?,
                Effect::History(message) => {
                    info!("quest '{}' history: {message}", self.id);
                    self.history.push(message);
                },
                Effect::External(external) => external.call(triggers)?,
            }
        }
        Ok(())
    }

    fn enter_state(&mut self, target: String, action: &str, triggers: &mut dyn TriggerRegistry) -> EngineResult<()> {
        let was_unstarted = self.current_state.is_none();
        info!(
            "quest '{}': {:?} -> '{target}' via '{action}'",
            self.id, self.current_state
        );
        self.current_state = Some(target);

        if was_unstarted && let Some(hook) = &self.start_hook {
            info!("quest '{}' started", self.id);
            hook.call(triggers)?;
        }
        if self.is_finished() && let Some(hook) = &self.finish_hook {
            info!("quest '{}' finished", self.id);
            hook.call(triggers)?;
        }
        Ok(())
    }

    fn state_index(&self, state: Option<&str>) -> EngineResult<usize> {
        match state {
            None => Ok(0),
            Some(name) => self
                .states
                .iter()
                .position(|s| s == name)
                .map(|idx| idx + 1)
                .ok_or_else(|| EngineError::UnknownState {
                    quest: self.id.clone(),
                    state: name.to_string(),
                }),
        }
    }

    fn action_index(&self, action: &str) -> EngineResult<usize> {
        self.actions
            .iter()
            .position(|a| a == action)
            .ok_or_else(|| EngineError::UnknownAction {
                quest: self.id.clone(),
                action: action.to_string(),
            })
    }
}

/// All quests of a world, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestBook {
    quests: Vec<Quest>,
}

impl QuestBook {
    /// Register a quest under its id, replacing any quest with the same id.
    pub fn add(&mut self, quest: Quest) {
        if let Some(existing) = self.quests.iter_mut().find(|q| q.id == quest.id) {
            warn!("replacing quest '{}'", quest.id);
            *existing = quest;
        } else {
            self.quests.push(quest);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter()
    }

    /// Quests that are started and not finished, in registration order.
    pub fn active(&self) -> Vec<&Quest> {
        self.quests.iter().filter(|q| q.is_active()).collect()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

impl QuestRegistry for QuestBook {
    fn quest_mut(&mut self, id: &str) -> EngineResult<&mut Quest> {
        self.get_mut(id).ok_or_else(|| EngineError::UnknownQuest(id.to_string()))
    }
}
