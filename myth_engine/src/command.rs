//! Command module
//!
//! Describes the commands a player can type at the prompt.

use crate::actor::Direction;

/// Commands that can be executed by the player.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum Command {
    Drop { item: String, amount: u32 },
    Help,
    History(String),
    Inventory,
    Load(String),
    Look,
    Go(Direction),
    Pick(Option<String>),
    Quests,
    Quit,
    Save(String),
    Saves,
    Unknown,
}

/// Parses an input string and returns the corresponding `Command`.
pub fn parse_command(input: &str) -> Command {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    match words.as_slice() {
        ["w"] => Command::Go(Direction::Up),
        ["a"] => Command::Go(Direction::Left),
        ["s"] => Command::Go(Direction::Down),
        ["d"] => Command::Go(Direction::Right),
        ["go" | "move" | "walk", dir] | [dir @ ("up" | "down" | "left" | "right" | "north" | "south" | "east" | "west")] => {
            dir.parse().map_or(Command::Unknown, Command::Go)
        },
        ["take" | "pick" | "get"] | ["pick", "up"] => Command::Pick(None),
        ["take" | "get" | "pick", item] | ["pick", "up", item] => Command::Pick(Some((*item).to_string())),
        ["drop", item] => Command::Drop {
            item: (*item).to_string(),
            amount: 1,
        },
        ["drop", amount, item] => amount.parse().map_or(Command::Unknown, |amount| Command::Drop {
            item: (*item).to_string(),
            amount,
        }),
        ["inventory" | "inv" | "i"] => Command::Inventory,
        ["quests" | "journal" | "q"] => Command::Quests,
        ["history", quest] => Command::History((*quest).to_string()),
        ["look" | "l" | "map"] => Command::Look,
        ["save", slot] => Command::Save((*slot).to_string()),
        ["load", slot] => Command::Load((*slot).to_string()),
        ["saves" | "load"] => Command::Saves,
        ["help" | "?"] => Command::Help,
        ["quit" | "exit"] => Command::Quit,
        _ => Command::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_names_move() {
        assert_eq!(parse_command("w"), Command::Go(Direction::Up));
        assert_eq!(parse_command("D"), Command::Go(Direction::Right));
        assert_eq!(parse_command("left"), Command::Go(Direction::Left));
        assert_eq!(parse_command("go south"), Command::Go(Direction::Down));
        assert_eq!(parse_command("go sideways"), Command::Unknown);
        assert!(parse_command("s").is_go());
    }

    #[test]
    fn item_commands() {
        assert_eq!(parse_command("take"), Command::Pick(None));
        assert_eq!(parse_command("pick up coin"), Command::Pick(Some("coin".into())));
        assert_eq!(
            parse_command("drop 3 coin"),
            Command::Drop {
                item: "coin".into(),
                amount: 3
            }
        );
        assert_eq!(
            parse_command("drop key"),
            Command::Drop {
                item: "key".into(),
                amount: 1
            }
        );
        assert_eq!(parse_command("drop many coin"), Command::Unknown);
    }

    #[test]
    fn system_commands() {
        assert!(parse_command("inv").is_inventory());
        assert!(parse_command("quests").is_quests());
        assert_eq!(parse_command("history cart"), Command::History("cart".into()));
        assert_eq!(parse_command("save slot1"), Command::Save("slot1".into()));
        assert_eq!(parse_command("load slot1"), Command::Load("slot1".into()));
        assert!(parse_command("load").is_saves());
        assert!(parse_command("quit").is_quit());
        assert!(parse_command("dance wildly").is_unknown());
    }
}
