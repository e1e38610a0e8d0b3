use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier used across `WorldDef` references.
pub type Id = String;

/// Top-level compiled world data loaded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldDef {
    pub game: GameDef,
    #[serde(default)]
    pub maps: Vec<MapDef>,
    #[serde(default)]
    pub quests: Vec<QuestDef>,
}

/// Game-level metadata and startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameDef {
    pub title: String,
    /// Map shown first. Defaults to the player's map when empty.
    #[serde(default)]
    pub start_map: Id,
    pub player: PlayerDef,
}

/// Player character and where it starts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerDef {
    pub name: String,
    pub sprite: String,
    /// Sprites keyed by facing: "up", "down", "left", "right".
    #[serde(default)]
    pub directional_sprites: BTreeMap<String, String>,
    pub map: Id,
    pub x: i32,
    pub y: i32,
}

/// A single tile map.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapDef {
    pub name: Id,
    pub width: u32,
    pub height: u32,
    /// Images painted on every tile not listed in `tiles`.
    #[serde(default)]
    pub default_terrain: Vec<String>,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub portals: Vec<PortalDef>,
    #[serde(default)]
    pub triggers: Vec<TileTriggerDef>,
}

fn default_passable() -> bool {
    true
}

/// Terrain override for one grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDef {
    pub x: i32,
    pub y: i32,
    pub images: Vec<String>,
    #[serde(default = "default_passable")]
    pub passable: bool,
}

/// Non-player character placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcDef {
    pub name: String,
    pub sprite: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub trigger: Option<TriggerDef>,
    /// Line shown when the player bumps into this NPC.
    #[serde(default)]
    pub message: Option<String>,
}

/// Item placement. Items with an `amount` are collectible stacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    pub sprite: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub amount: Option<u32>,
}

/// Map exit leading to another map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalDef {
    pub x: i32,
    pub y: i32,
    pub dest_map: Id,
    pub dest_x: i32,
    pub dest_y: i32,
}

/// Trigger fired when the player steps on a tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileTriggerDef {
    pub x: i32,
    pub y: i32,
    pub trigger: TriggerDef,
}

/// Reference to behavior registered outside the content files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerDef {
    /// Name of a callback registered with the game.
    Callback(String),
    /// Advance `quest` by performing `action` on it.
    Quest { quest: Id, action: String },
}

/// Quest state diagram: nodes are states, edges are actions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuestDef {
    pub id: Id,
    pub title: String,
    pub nodes: Vec<QuestNodeDef>,
    #[serde(default)]
    pub edges: Vec<QuestEdgeDef>,
    /// Callback fired once when the quest leaves the start node.
    #[serde(default)]
    pub on_start: Option<String>,
    /// Callback fired whenever a finish node is entered.
    #[serde(default)]
    pub on_finish: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestNodeDef {
    pub id: Id,
    #[serde(default)]
    pub point: Option<NodePoint>,
}

/// Special role of a quest node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodePoint {
    Start,
    Finish,
}

/// Quest edge. `trigger` names the quest action, `action` the external callback.
/// Any `params` are handed to the callback as keyword parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestEdgeDef {
    pub source: Id,
    pub target: Id,
    pub trigger: String,
    pub action: String,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl QuestDef {
    /// Returns the id of the first node marked as the start point.
    pub fn start_node(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.point == Some(NodePoint::Start))
            .map(|node| node.id.as_str())
    }

    /// Distinct edge triggers, in the order they first appear.
    pub fn actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = Vec::new();
        for edge in &self.edges {
            if !actions.contains(&edge.trigger.as_str()) {
                actions.push(&edge.trigger);
            }
        }
        actions
    }
}

impl MapDef {
    /// True if `(x, y)` lies on this map's grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        u32::try_from(x).is_ok_and(|x| x < self.width)
            && u32::try_from(y).is_ok_and(|y| y < self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, trigger: &str) -> QuestEdgeDef {
        QuestEdgeDef {
            source: source.into(),
            target: target.into(),
            trigger: trigger.into(),
            action: "noop".into(),
            history: None,
            params: BTreeMap::new(),
        }
    }

    #[test]
    fn actions_keep_first_seen_order_without_duplicates() {
        let quest = QuestDef {
            id: "q".into(),
            title: "Q".into(),
            nodes: Vec::new(),
            edges: vec![edge("a", "b", "talk"), edge("b", "c", "push"), edge("c", "c", "talk")],
            ..QuestDef::default()
        };
        assert_eq!(quest.actions(), vec!["talk", "push"]);
    }

    #[test]
    fn map_contains_checks_both_axes() {
        let map = MapDef {
            name: "m".into(),
            width: 3,
            height: 2,
            ..MapDef::default()
        };
        assert!(map.contains(0, 0));
        assert!(map.contains(2, 1));
        assert!(!map.contains(3, 0));
        assert!(!map.contains(0, 2));
        assert!(!map.contains(-1, 0));
    }

    #[test]
    fn quest_def_parses_from_ron() {
        let text = r#"(
            id: "cart",
            title: "Stuck cart",
            nodes: [(id: "idle", point: Some(Start)), (id: "pushing"), (id: "done", point: Some(Finish))],
            edges: [
                (source: "idle", target: "pushing", trigger: "trader", action: "say", history: Some("Asked to help."), params: {"text": "Help!"}),
            ],
        )"#;
        let quest: QuestDef = ron::from_str(text).expect("quest RON should parse");
        assert_eq!(quest.start_node(), Some("idle"));
        assert_eq!(quest.edges[0].params.get("text").map(String::as_str), Some("Help!"));
        assert!(quest.on_finish.is_none());
    }
}
