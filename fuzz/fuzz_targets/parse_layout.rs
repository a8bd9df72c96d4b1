#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rookery::Board;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = Board::from_layout(input) else {
        return;
    };
    // Printing the board back produces an equivalent layout.
    assert_eq!(Board::from_layout(&board.to_string()).unwrap(), board);
});
