use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a `WorldDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    OutOfBounds { map: String, x: i32, y: i32, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::OutOfBounds { map, x, y, context } => {
                write!(f, "position ({x}, {y}) outside map '{map}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `WorldDef`.
///
/// ```
/// use myth_data::{GameDef, MapDef, PlayerDef, WorldDef, validate_world};
///
/// let world = WorldDef {
///     game: GameDef {
///         title: "Demo".into(),
///         start_map: "home".into(),
///         player: PlayerDef {
///             name: "You".into(),
///             sprite: "rogue".into(),
///             map: "home".into(),
///             ..PlayerDef::default()
///         },
///     },
///     maps: vec![MapDef {
///         name: "home".into(),
///         width: 5,
///         height: 5,
///         ..MapDef::default()
///     }],
///     ..WorldDef::default()
/// };
/// assert!(validate_world(&world).is_empty());
/// ```
pub fn validate_world(world: &WorldDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut map_ids = HashSet::new();
    let mut quest_ids = HashSet::new();
    track_ids("map", world.maps.iter().map(|m| m.name.as_str()), &mut map_ids, &mut errors);
    track_ids(
        "quest",
        world.quests.iter().map(|q| q.id.as_str()),
        &mut quest_ids,
        &mut errors,
    );

    let maps: HashMap<&str, &MapDef> = world.maps.iter().map(|m| (m.name.as_str(), m)).collect();
    let quest_actions: HashMap<&str, Vec<&str>> = world.quests.iter().map(|q| (q.id.as_str(), q.actions())).collect();

    let player = &world.game.player;
    if player.map.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "player start map missing".to_string(),
        });
    } else if let Some(map) = maps.get(player.map.as_str()) {
        check_pos(map, player.x, player.y, "player start", &mut errors);
    } else {
        errors.push(ValidationError::MissingReference {
            kind: "map",
            id: player.map.clone(),
            context: "player start map".to_string(),
        });
    }
    if !world.game.start_map.is_empty() && !maps.contains_key(world.game.start_map.as_str()) {
        errors.push(ValidationError::MissingReference {
            kind: "map",
            id: world.game.start_map.clone(),
            context: "game start map".to_string(),
        });
    }

    for map in &world.maps {
        if map.width == 0 || map.height == 0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("map '{}' has zero size", map.name),
            });
        }
        for tile in &map.tiles {
            check_pos(map, tile.x, tile.y, "tile", &mut errors);
        }
        let player_here = (player.map == map.name).then_some(player.name.as_str());
        let mut actor_names = HashSet::new();
        track_ids(
            "actor",
            player_here.into_iter().chain(map.npcs.iter().map(|n| n.name.as_str())),
            &mut actor_names,
            &mut errors,
        );
        for npc in &map.npcs {
            let context = format!("npc '{}'", npc.name);
            check_pos(map, npc.x, npc.y, &context, &mut errors);
            if let Some(trigger) = &npc.trigger {
                validate_trigger(trigger, &quest_actions, &context, &mut errors);
            }
        }
        for item in &map.items {
            check_pos(map, item.x, item.y, &format!("item '{}'", item.name), &mut errors);
            if item.amount == Some(0) {
                errors.push(ValidationError::InvalidValue {
                    context: format!("item '{}' on map '{}' has zero amount", item.name, map.name),
                });
            }
        }
        for portal in &map.portals {
            check_pos(map, portal.x, portal.y, "portal", &mut errors);
            let context = format!("portal at ({}, {}) on map '{}'", portal.x, portal.y, map.name);
            match maps.get(portal.dest_map.as_str()) {
                Some(dest) => check_pos(dest, portal.dest_x, portal.dest_y, &context, &mut errors),
                None => errors.push(ValidationError::MissingReference {
                    kind: "map",
                    id: portal.dest_map.clone(),
                    context,
                }),
            }
        }
        for tile_trigger in &map.triggers {
            let context = format!("trigger at ({}, {}) on map '{}'", tile_trigger.x, tile_trigger.y, map.name);
            check_pos(map, tile_trigger.x, tile_trigger.y, "trigger", &mut errors);
            validate_trigger(&tile_trigger.trigger, &quest_actions, &context, &mut errors);
        }
    }

    for quest in &world.quests {
        validate_quest(quest, &mut errors);
    }

    errors
}

fn validate_quest(quest: &QuestDef, errors: &mut Vec<ValidationError>) {
    let mut nodes = HashSet::new();
    track_ids(
        "quest node",
        quest.nodes.iter().map(|n| n.id.as_str()),
        &mut nodes,
        errors,
    );

    let starts = quest
        .nodes
        .iter()
        .filter(|n| n.point == Some(NodePoint::Start))
        .count();
    if starts != 1 {
        errors.push(ValidationError::InvalidValue {
            context: format!("quest '{}' needs exactly one start node, found {starts}", quest.id),
        });
    }

    for edge in &quest.edges {
        let context = format!("quest '{}' edge '{}'", quest.id, edge.trigger);
        check_ref("quest node", &edge.source, &nodes, context.clone(), errors);
        check_ref("quest node", &edge.target, &nodes, context.clone(), errors);
        if edge.trigger.trim().is_empty() || edge.action.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("{context}: trigger and action are required"),
            });
        }
    }
}

fn validate_trigger(
    trigger: &TriggerDef,
    quest_actions: &HashMap<&str, Vec<&str>>,
    context: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let TriggerDef::Quest { quest, action } = trigger {
        match quest_actions.get(quest.as_str()) {
            Some(actions) if actions.contains(&action.as_str()) => {},
            Some(_) => errors.push(ValidationError::MissingReference {
                kind: "quest action",
                id: action.clone(),
                context: format!("{context} (quest '{quest}')"),
            }),
            None => errors.push(ValidationError::MissingReference {
                kind: "quest",
                id: quest.clone(),
                context: context.to_string(),
            }),
        }
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}

fn check_pos(map: &MapDef, x: i32, y: i32, context: &str, errors: &mut Vec<ValidationError>) {
    if !map.contains(x, y) {
        errors.push(ValidationError::OutOfBounds {
            map: map.name.clone(),
            x,
            y,
            context: context.to_string(),
        });
    }
}
