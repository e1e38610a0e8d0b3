//! Building quests from their state diagrams.
//!
//! The start node stands for "not started" and is not a state of its own. Each edge fires
//! its callback (and records its history line) when its trigger is performed in its source
//! state, and moves the quest to its target unless the edge loops back to its source.
//! Parallel edges with the same trigger and target share one transition.

use anyhow::{Context, Result};
use log::info;
use myth_data::QuestDef;

use crate::quest::{Effect, ExternalAction, Quest};

/// Build a runtime quest from a quest diagram.
///
/// # Errors
/// - if the diagram has no start node
/// - if an edge refers to a node that isn't a state (including an edge back into the start node)
pub fn build_quest(def: &QuestDef) -> Result<Quest> {
    let start = def
        .start_node()
        .with_context(|| format!("quest '{}' has no start node", def.id))?;
    let state_of = |node: &str| (node != start).then(|| node.to_string());

    let states = def.nodes.iter().filter(|n| n.id != start).map(|n| n.id.clone());
    let finish_states = def
        .nodes
        .iter()
        .filter(|n| n.point == Some(myth_data::NodePoint::Finish))
        .map(|n| n.id.clone());
    let mut quest = Quest::new(def.id.clone(), def.title.clone(), states, def.actions()).with_finish_states(finish_states);

    for edge in &def.edges {
        let source = state_of(&edge.source);
        let external = ExternalAction {
            name: edge.action.clone(),
            params: edge.params.clone(),
        };
        quest.on_state(source.as_deref(), &edge.trigger, Effect::External(external))?;
        if let Some(history) = &edge.history {
            quest.on_state(source.as_deref(), &edge.trigger, Effect::history(history.clone()))?;
        }
    }
    let mut transitions: Vec<(&str, &str, &str)> = Vec::new();
    for edge in def.edges.iter().filter(|e| e.source != e.target) {
        let key = (edge.source.as_str(), edge.trigger.as_str(), edge.target.as_str());
        if transitions.contains(&key) {
            continue;
        }
        transitions.push(key);
        quest
            .on_state(
                state_of(&edge.source).as_deref(),
                &edge.trigger,
                Effect::transition(edge.target.clone()),
            )
            .with_context(|| format!("edge '{}' -> '{}'", edge.source, edge.target))?;
    }

    if let Some(hook) = &def.on_start {
        quest.on_start(hook.clone());
    }
    if let Some(hook) = &def.on_finish {
        quest.on_finish(hook.clone());
    }
    info!(
        "quest '{}' built: {} states, {} actions",
        quest.id,
        quest.states().len(),
        quest.actions().len()
    );
    Ok(quest)
}
