//! Building maps and the player from their definitions.

use anyhow::{Context, Result, anyhow};
use log::info;
use myth_data::{MapDef, PlayerDef, TriggerDef};

use crate::actor::{Direction, Npc, Player};
use crate::grid::{Pos, Size};
use crate::item::Item;
use crate::map::{Map, Portal, Terrain};
use crate::trigger::Trigger;

/// Convert a content trigger reference into a runtime trigger.
pub fn build_trigger(def: &TriggerDef) -> Trigger {
    match def {
        TriggerDef::Callback(name) => Trigger::callback(name.clone()),
        TriggerDef::Quest { quest, action } => Trigger::quest(quest.clone(), action.clone()),
    }
}

/// Build a map with its terrain, NPCs, items, portals and tile triggers.
///
/// # Errors
/// - if anything is placed outside the map
pub fn build_map(def: &MapDef) -> Result<Map> {
    let mut map = Map::new(def.name.clone(), Size::new(def.width, def.height));

    if !def.default_terrain.is_empty() {
        let cells: Vec<Pos> = map.iter_tiles().map(|(pos, _)| pos).collect();
        for pos in cells {
            map.set_tile(pos, Terrain::new(def.default_terrain.iter().cloned(), true))?;
        }
    }
    for tile in &def.tiles {
        map.set_tile(
            Pos::new(tile.x, tile.y),
            Terrain::new(tile.images.iter().cloned(), tile.passable),
        )
        .with_context(|| format!("tile at ({}, {})", tile.x, tile.y))?;
    }

    for npc_def in &def.npcs {
        let mut npc = Npc::new(npc_def.name.clone(), npc_def.sprite.clone());
        npc.set_trigger(npc_def.trigger.as_ref().map(build_trigger));
        npc.message.clone_from(&npc_def.message);
        map.add_actor(Pos::new(npc_def.x, npc_def.y), npc)
            .with_context(|| format!("placing npc '{}'", npc_def.name))?;
    }

    for item_def in &def.items {
        let item = match item_def.amount {
            Some(amount) => Item::collectible(item_def.name.clone(), item_def.sprite.clone(), amount),
            None => Item::plain(item_def.name.clone(), item_def.sprite.clone()),
        };
        map.add_item(Pos::new(item_def.x, item_def.y), item)
            .with_context(|| format!("placing item '{}'", item_def.name))?;
    }

    for portal in &def.portals {
        map.add_portal(
            Pos::new(portal.x, portal.y),
            Portal::new(portal.dest_map.clone(), (portal.dest_x, portal.dest_y)),
        )
        .with_context(|| format!("placing portal to '{}'", portal.dest_map))?;
    }

    for tile_trigger in &def.triggers {
        map.add_trigger(
            Pos::new(tile_trigger.x, tile_trigger.y),
            build_trigger(&tile_trigger.trigger),
        )
        .with_context(|| format!("placing trigger at ({}, {})", tile_trigger.x, tile_trigger.y))?;
    }

    info!(
        "map '{}' ({}) built: {} npcs, {} items, {} portals, {} triggers",
        map.name,
        map.size(),
        def.npcs.len(),
        def.items.len(),
        def.portals.len(),
        def.triggers.len()
    );
    Ok(map)
}

/// Build the player character.
///
/// # Errors
/// - if a directional sprite is keyed by something other than a direction
pub fn build_player(def: &PlayerDef) -> Result<Player> {
    let mut player = Player::new(def.name.clone(), def.sprite.clone());
    for (key, sprite) in &def.directional_sprites {
        let direction: Direction = key
            .parse()
            .map_err(|err: String| anyhow!(err))
            .with_context(|| format!("directional sprite for player '{}'", def.name))?;
        player = player.with_directional_sprite(direction, sprite.clone());
    }
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use myth_data::{ItemDef, NpcDef, PortalDef, TileDef, TileTriggerDef};

    fn lab() -> MapDef {
        MapDef {
            name: "lab".into(),
            width: 4,
            height: 3,
            default_terrain: vec!["floor".into()],
            tiles: vec![TileDef {
                x: 0,
                y: 0,
                images: vec!["floor".into(), "crate".into()],
                passable: false,
            }],
            npcs: vec![NpcDef {
                name: "Scientist".into(),
                sprite: "scientist".into(),
                x: 3,
                y: 0,
                trigger: Some(TriggerDef::Callback("say".into())),
                message: Some("Mind the crates.".into()),
            }],
            items: vec![
                ItemDef {
                    name: "coin".into(),
                    sprite: "coin".into(),
                    x: 1,
                    y: 1,
                    amount: Some(3),
                },
                ItemDef {
                    name: "key".into(),
                    sprite: "key".into(),
                    x: 1,
                    y: 1,
                    amount: None,
                },
            ],
            portals: vec![PortalDef {
                x: 3,
                y: 2,
                dest_map: "warehouse".into(),
                dest_x: 0,
                dest_y: 0,
            }],
            triggers: vec![TileTriggerDef {
                x: 2,
                y: 2,
                trigger: TriggerDef::Quest {
                    quest: "cart".into(),
                    action: "plate".into(),
                },
            }],
        }
    }

    #[test]
    fn map_def_becomes_runtime_map() {
        let map = build_map(&lab()).unwrap();
        assert_eq!(map.size(), Size::new(4, 3));
        assert!(!map.is_passable(Pos::new(0, 0)));
        assert_eq!(map.tile(Pos::new(2, 1)).unwrap().images, vec!["floor".to_string()]);
        assert_eq!(map.tile(Pos::new(0, 0)).unwrap().images.len(), 2);

        let npc = map.find_actor("Scientist").and_then(|a| a.as_npc()).unwrap();
        assert_eq!(npc.trigger, Some(Trigger::callback("say")));
        assert_eq!(npc.message.as_deref(), Some("Mind the crates."));

        let items = map.items_at_pos(Pos::new(1, 1));
        assert_eq!(items.len(), 2);
        assert!(items[0].kind.is_collectible());
        assert!(items[1].kind.is_plain());

        assert_eq!(map.portal_at(Pos::new(3, 2)).unwrap().dest_map, "warehouse");
        assert_eq!(
            map.trigger_at(Pos::new(2, 2)),
            Some(&Trigger::quest("cart", "plate"))
        );
    }

    #[test]
    fn out_of_bounds_placement_fails() {
        let mut def = lab();
        def.npcs[0].x = 9;
        let err = build_map(&def).unwrap_err();
        assert!(format!("{err:#}").contains("placing npc 'Scientist'"));
    }

    #[test]
    fn player_directional_sprites_are_parsed() {
        let mut def = PlayerDef {
            name: "Hero".into(),
            sprite: "hero".into(),
            ..PlayerDef::default()
        };
        def.directional_sprites.insert("up".into(), "hero_up".into());
        let mut player = build_player(&def).unwrap();
        player.face(Direction::Up);
        assert_eq!(player.sprite(), "hero_up");

        def.directional_sprites.insert("diagonal".into(), "nope".into());
        assert!(build_player(&def).is_err());
    }
}
