#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Myth **
//! Tile-map adventure engine

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use myth_engine::config::{config_path, load_config};
use myth_engine::style::GameStyle;
use myth_engine::{Game, WorldEdit, load_world, run_repl};

fn main() -> Result<()> {
    env_logger::init();
    let config = load_config(&config_path());
    info!("Start: loading world from '{}'...", config.world_file.display());
    let world = load_world(&config.world_file).context("while loading World")?;
    info!("World loaded successfully.");

    let mut game = Game::with_world(world);
    register_builtin_actions(&mut game);

    // clear the screen
    print!("\x1B[2J\x1B[H");
    std::io::stdout().flush().context("flushing stdout")?;
    info!("Starting the game!");

    let title = game.world().title.to_uppercase();
    println!("{:^60}", title.bright_yellow().underline());
    if let Some((_, player)) = game.world().player() {
        println!("\nYou are {}. Type 'help' for commands.\n", player.name.player_style());
    }

    run_repl(&mut game, &config)
}

/// Callbacks every shipped world may refer to.
fn register_builtin_actions(game: &mut Game) {
    game.register_trigger_action("say", |ctx| {
        if let Some(text) = ctx.param("text") {
            let text = text.to_string();
            ctx.say(text);
        }
        Ok(())
    });
    game.register_trigger_action("quest_started", |ctx| {
        let quest = ctx.param("quest").unwrap_or("a quest").to_string();
        ctx.say(format!("New quest: {quest}"));
        Ok(())
    });
    game.register_trigger_action("quest_finished", |ctx| {
        let quest = ctx.param("quest").unwrap_or("a quest").to_string();
        ctx.say(format!("Quest complete: {quest}"));
        Ok(())
    });
    game.register_trigger_action("leave", |ctx| {
        if let Some(actor) = ctx.param("actor") {
            let actor = actor.to_string();
            ctx.say(format!("{actor} wanders off."));
            ctx.push(WorldEdit::RemoveActor { name: actor });
        }
        Ok(())
    });
}
