#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rookery::{Board, Color, Config, ErrorPolicy, Game, GameState};

// Every pair of bytes is a move attempt: three bits per coordinate.
fuzz_target!(|data: &[u8]| {
    let config = Config {
        errors: ErrorPolicy::Ignore,
        ..Config::default()
    };
    let mut game = Game::new(Board::standard(), config).unwrap();
    for chunk in data.chunks_exact(2) {
        let coordinate = |byte: u8, shift: u8| i32::from((byte >> shift) & 0b111);
        let (from_x, from_y) = (coordinate(chunk[0], 0), coordinate(chunk[0], 3));
        let (to_x, to_y) = (coordinate(chunk[1], 0), coordinate(chunk[1], 3));
        let before = game.board().clone();
        let played = game.attempt_move_at(from_x, from_y, to_x, to_y).unwrap();
        if !played {
            assert_eq!(game.board(), &before);
        }
        for color in Color::ALL {
            assert!(game.board().king(color).is_some());
        }
        if game.state() != GameState::InProgress {
            assert!(game.playable_moves().is_empty());
        }
    }
    let played = game.history().len();
    assert_eq!(game.undo(played).unwrap(), played);
    assert_eq!(game.board(), &Board::standard());
});
