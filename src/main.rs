//! Text-mode driver: reads commands from stdin and plays them on a standard
//! board.
//!
//! Commands:
//!
//! - `d`: dump the board
//! - `moves <square>`: legal destinations of the piece on the square
//! - `playable`: all moves of the side to move
//! - `move <from> <to>` or `<from><to>` (e.g. `e2e4`): play a move
//! - `undo [count]`: take moves back
//! - `new`: start over
//! - `quit`

use std::io::{self, BufRead};

use anyhow::{bail, Context};
use itertools::Itertools;
use rookery::{Board, Config, Game, Square};
use tracing_subscriber::EnvFilter;

fn new_game() -> anyhow::Result<Game> {
    let mut game = Game::new(Board::standard(), Config::default())?;
    game.on_game_end(|color, outcome| println!("{outcome}, last move by {color}"));
    Ok(game)
}

fn square(game: &Game, input: &str) -> anyhow::Result<Square> {
    Square::from_algebraic(input, game.board().size().height)
}

/// Splits "e2e4" into its two squares.
fn parse_move(game: &Game, input: &str) -> anyhow::Result<(Square, Square)> {
    let Some(split) = input
        .char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_lowercase())
        .map(|(index, _)| index)
    else {
        bail!("expected a move like \"e2e4\", got \"{input}\"");
    };
    Ok((square(game, &input[..split])?, square(game, &input[split..])?))
}

fn play(game: &mut Game, from: Square, to: Square) -> anyhow::Result<()> {
    let height = game.board().size().height;
    let played = game.attempt_move(from, to).with_context(|| {
        format!(
            "playing {}{}",
            from.to_algebraic(height),
            to.to_algebraic(height)
        )
    })?;
    if played {
        println!("ok");
    }
    Ok(())
}

fn execute(game: &mut Game, line: &str) -> anyhow::Result<bool> {
    let tokens = line.split_whitespace().collect_vec();
    let height = game.board().size().height;
    match tokens.as_slice() {
        [] => {},
        ["quit"] => return Ok(false),
        ["new"] => *game = new_game()?,
        ["d"] => {
            println!("{:?}", game.board());
            println!("{} to move, {:?}", game.turn(), game.state());
        },
        ["moves", from] => {
            let from = square(game, from)?;
            let moves = game.legal_moves(from)?;
            println!(
                "{}",
                moves
                    .iter()
                    .sorted()
                    .map(|to| to.to_algebraic(height))
                    .join(" ")
            );
        },
        ["playable"] => {
            let moves = game.playable_moves();
            println!(
                "{}",
                moves
                    .into_iter()
                    .map(|(from, to)| {
                        format!("{}{}", from.to_algebraic(height), to.to_algebraic(height))
                    })
                    .join(" ")
            );
        },
        ["undo"] => println!("undone {}", game.undo(1)?),
        ["undo", count] => {
            let count = count.parse().context("undo count should be a number")?;
            println!("undone {}", game.undo(count)?);
        },
        ["move", from, to] => {
            let (from, to) = (square(game, from)?, square(game, to)?);
            play(game, from, to)?;
        },
        [input] => {
            let (from, to) = parse_move(game, input)?;
            play(game, from, to)?;
        },
        _ => bail!("unknown command: \"{line}\""),
    }
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    rookery::print_engine_info();
    rookery::print_binary_info();

    let mut game = new_game()?;
    for line in io::stdin().lock().lines() {
        match execute(&mut game, &line?) {
            Ok(true) => {},
            Ok(false) => break,
            Err(e) => println!("error: {e:#}"),
        }
    }
    Ok(())
}
