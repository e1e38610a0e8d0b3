//! REPL and command handling.
//!
//! The terminal front end: draws the current map as a character grid, reads a command,
//! runs it against the [`Game`] and prints whatever happened.

mod input;

use anyhow::Result;
use colored::Colorize;
use log::{info, warn};
use textwrap::{fill, termwidth};

use crate::actor::Direction;
use crate::command::{Command, parse_command};
use crate::config::EngineConfig;
use crate::game::Game;
use crate::map::{BlockReason, Map, MoveOutcome};
use crate::save_files::{Savefile, collect_save_slots, format_modified};
use crate::style::GameStyle;

use input::{InputEvent, InputManager};

/// Control flow signal used by handlers to exit the REPL.
pub enum ReplControl {
    Continue,
    Quit,
}

/// Run the main read-eval-print loop until the user quits.
///
/// # Errors
/// - content errors raised by the game (unknown triggers, quests, maps and the like)
pub fn run_repl(game: &mut Game, config: &EngineConfig) -> Result<()> {
    let mut input_manager = InputManager::new(config.history_path(), config.save_dir.clone());
    print_map(game);

    loop {
        let prompt = format!("\n[{}]>> ", game.world().current_map_name().unwrap_or("?"))
            .prompt_style()
            .to_string();
        let line = match input_manager.read_line(&prompt) {
            Ok(InputEvent::Line(line)) => line,
            Ok(InputEvent::Eof) => "quit".to_string(),
            Ok(InputEvent::Interrupted) => {
                println!("Command canceled.");
                continue;
            },
            Err(err) => {
                println!("{}", format!("Failed to read input ({err}). Try again.").error_style());
                continue;
            },
        };

        let command = parse_command(&line);
        info!("player command: {command:?}");
        if let ReplControl::Quit = handle_command(game, config, &command)? {
            break;
        }
        for message in game.take_messages() {
            println!("{}", fill(&message, termwidth()).message_style());
        }
    }
    Ok(())
}

/// Run one parsed command.
///
/// # Errors
/// - content errors raised by the game
pub fn handle_command(game: &mut Game, config: &EngineConfig, command: &Command) -> Result<ReplControl> {
    match command {
        Command::Go(direction) => move_handler(game, *direction)?,
        Command::Pick(name) => match game.pick_item(name.as_deref())? {
            Some(item) => println!("You pick up {} (x{}).", item.name.item_style(), item.amount()),
            None => println!("{}", "There's nothing like that here.".denied_style()),
        },
        Command::Drop { item, amount } => match game.drop_item(item, *amount)? {
            Some(dropped) => println!("You drop {} (x{}).", dropped.name.item_style(), dropped.amount()),
            None => println!("{}", format!("You aren't carrying any {item}.").denied_style()),
        },
        Command::Inventory => inventory_handler(game),
        Command::Quests => quests_handler(game),
        Command::History(quest) => history_handler(game, quest),
        Command::Look => print_map(game),
        Command::Save(slot) => save_handler(game, config, slot),
        Command::Load(slot) => load_handler(game, config, slot),
        Command::Saves => saves_handler(config),
        Command::Help => help_handler(),
        Command::Quit => {
            println!("Goodbye.");
            return Ok(ReplControl::Quit);
        },
        Command::Unknown => println!("{}", "Didn't understand that. Type 'help' for commands.".denied_style()),
    }
    Ok(ReplControl::Continue)
}

fn move_handler(game: &mut Game, direction: Direction) -> Result<()> {
    match game.shift_player(direction)? {
        MoveOutcome::Moved { .. } => {},
        MoveOutcome::Blocked(BlockReason::OutOfBounds) => {
            println!("{}", "You can't go any further that way.".denied_style());
        },
        MoveOutcome::Blocked(BlockReason::Impassable) => println!("{}", "Something blocks your way.".denied_style()),
        MoveOutcome::Interacted { with } => {
            let message = game
                .world()
                .current_map()
                .and_then(|map| map.find_actor(&with))
                .and_then(|actor| actor.as_npc())
                .and_then(|npc| npc.message.clone());
            match message {
                Some(text) => {
                    let text = fill(&format!("{with}: {text}"), termwidth());
                    let spoken = text.strip_prefix(&format!("{with}: ")).unwrap_or(&text);
                    println!("{}: {}", with.npc_style(), spoken.message_style());
                },
                None => println!("You bump into {}.", with.npc_style()),
            }
        },
        MoveOutcome::Portalled { portal, .. } => {
            println!("You travel to {}.", portal.dest_map.map_title_style());
            print_map(game);
        },
    }
    Ok(())
}

fn inventory_handler(game: &Game) {
    let Some((_, player)) = game.world().player() else {
        println!("{}", "There is no one here to carry anything.".denied_style());
        return;
    };
    println!("{}", "Inventory".section_style());
    if player.inventory.is_empty() {
        println!("  (empty)");
    }
    for item in player.inventory.iter() {
        println!("  {} x{}", item.name.item_style(), item.amount());
    }
}

fn quests_handler(game: &Game) {
    println!("{}", "Quests".section_style());
    let quests = game.world().quests();
    let mut any = false;
    for quest in quests.iter().filter(|q| q.current_state().is_some()) {
        any = true;
        if quest.is_active() {
            let last = quest.last_history_entry().unwrap_or("");
            println!("  {} {}", quest.title.quest_active_style(), last.history_style());
        } else {
            println!("  {}", quest.title.quest_complete_style());
        }
    }
    if !any {
        println!("  (no quests started)");
    }
}

fn history_handler(game: &Game, quest_id: &str) {
    let Some(quest) = game.world().get_quest(quest_id) else {
        println!("{}", format!("No quest called '{quest_id}'.").denied_style());
        return;
    };
    println!("{}", quest.title.section_style());
    for entry in quest.history() {
        println!("  {}", entry.history_style());
    }
}

fn save_handler(game: &Game, config: &EngineConfig, slot: &str) {
    let savefile = Savefile::for_slot(&config.save_dir, slot, config.save_format);
    match game.save_to_file(&savefile, true) {
        Ok(_) => println!("Game saved as {}", slot.underline()),
        Err(err) => {
            warn!("save to slot '{slot}' failed: {err:#}");
            println!("{}", format!("Unable to save '{slot}': {err}").error_style());
        },
    }
}

fn load_handler(game: &mut Game, config: &EngineConfig, slot: &str) {
    let mut savefile = Savefile::for_slot(&config.save_dir, slot, config.save_format);
    if !savefile.exists()
        && let Ok(slots) = collect_save_slots(&config.save_dir)
        && let Some(found) = slots.into_iter().find(|s| s.slot == slot)
    {
        savefile = found.savefile();
    }
    if game.load_from_file(&savefile) {
        println!("Loaded {}.", slot.underline());
        print_map(game);
    } else {
        println!("{}", format!("Unable to load save '{slot}'.").error_style());
    }
}

fn saves_handler(config: &EngineConfig) {
    println!("{}", "Saved games".section_style());
    match collect_save_slots(&config.save_dir) {
        Ok(slots) if slots.is_empty() => println!("  (none)"),
        Ok(slots) => {
            for slot in slots {
                let age = slot.modified.map(format_modified).unwrap_or_default();
                println!("  {} [{}] {}", slot.slot.underline(), slot.format.extension(), age.dimmed());
            }
        },
        Err(err) => println!("{}", format!("Unable to read saves: {err}").error_style()),
    }
}

fn help_handler() {
    println!("{}", "Commands".section_style());
    for (cmd, what) in [
        ("w/a/s/d, go <dir>", "move or bump into whoever is there"),
        ("take [item]", "pick up the top item (or the named one)"),
        ("drop [amount] <item>", "put something down"),
        ("inv", "list what you carry"),
        ("quests", "show started quests"),
        ("history <quest>", "show a quest's log"),
        ("look", "draw the map again"),
        ("save/load <slot>", "save or restore the game"),
        ("saves", "list saved games"),
        ("quit", "leave"),
    ] {
        println!("  {:<22} {}", cmd.bold(), what);
    }
}

/// One character per cell: `@` player, NPC initial, `*` item, `O` portal, `#` wall, `.` floor.
pub fn map_glyphs(map: &Map) -> Vec<Vec<char>> {
    let size = map.size();
    let mut rows = vec![vec!['.'; size.width as usize]; size.height as usize];
    let mut put = |x: i32, y: i32, glyph: char| {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
            && let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x))
        {
            *cell = glyph;
        }
    };
    for (pos, terrain) in map.iter_tiles() {
        if !terrain.passable {
            put(pos.x, pos.y, '#');
        }
    }
    for (pos, _) in map.iter_portals() {
        put(pos.x, pos.y, 'O');
    }
    for (pos, _) in map.iter_items() {
        put(pos.x, pos.y, '*');
    }
    for (pos, actor) in map.iter_actors() {
        let glyph = if actor.is_player() {
            '@'
        } else {
            actor.name().chars().next().map_or('?', |c| c.to_ascii_uppercase())
        };
        put(pos.x, pos.y, glyph);
    }
    rows
}

fn print_map(game: &Game) {
    let Some(map) = game.world().current_map() else {
        println!("{}", "You are nowhere.".error_style());
        return;
    };
    println!("{}", map.name.map_title_style());
    for row in map_glyphs(map) {
        let line: String = row
            .into_iter()
            .map(|glyph| {
                let cell = glyph.to_string();
                match glyph {
                    '@' => cell.player_style().to_string(),
                    '*' => cell.item_style().to_string(),
                    'O' => cell.portal_style().to_string(),
                    '#' => cell.wall_style().to_string(),
                    '.' => cell.floor_style().to_string(),
                    _ => cell.npc_style().to_string(),
                }
            })
            .collect();
        println!("  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Npc, Player};
    use crate::grid::{Pos, Size};
    use crate::item::Item;
    use crate::map::{Portal, Terrain};
    use crate::world::World;

    fn glyph_map() -> Map {
        let mut map = Map::new("lab", Size::new(4, 2));
        map.set_tile(Pos::new(0, 0), Terrain::wall()).unwrap();
        map.add_actor(Pos::new(1, 0), Player::new("Hero", "hero")).unwrap();
        map.add_actor(Pos::new(2, 0), Npc::new("trader", "trader")).unwrap();
        map.add_item(Pos::new(3, 0), Item::plain("key", "key")).unwrap();
        map.add_portal(Pos::new(0, 1), Portal::new("yard", (0, 0))).unwrap();
        map
    }

    #[test]
    fn glyphs_show_everything_on_the_map() {
        let rows: Vec<String> = map_glyphs(&glyph_map())
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        assert_eq!(rows, vec!["#@T*".to_string(), "O...".to_string()]);
    }

    #[test]
    fn quit_command_stops_the_loop() {
        let mut world = World::new();
        world.add_map(glyph_map());
        let mut game = Game::with_world(world);
        let config = EngineConfig::default();
        assert!(matches!(
            handle_command(&mut game, &config, &Command::Quit).unwrap(),
            ReplControl::Quit
        ));
        assert!(matches!(
            handle_command(&mut game, &config, &Command::Go(Direction::Up)).unwrap(),
            ReplControl::Continue
        ));
    }

    #[test]
    fn failed_save_keeps_the_loop_running() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let mut world = World::new();
        world.add_map(glyph_map());
        let mut game = Game::with_world(world);
        let config = EngineConfig {
            save_dir: blocker.path().to_path_buf(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            handle_command(&mut game, &config, &Command::Save("slot".into())).unwrap(),
            ReplControl::Continue
        ));
        assert!(blocker.path().is_file());
    }
}
