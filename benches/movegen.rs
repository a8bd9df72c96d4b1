//! Criterion benchmarks measure time of legal move generation and perft
//! calculation on the real game (including undo).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rookery::{Board, Color, Config, Game};

const POSITIONS: [(&str, Color); 4] = [
    (
        "rnbqkbnr\n\
         pppppppp\n\
         ........\n\
         ........\n\
         ........\n\
         ........\n\
         PPPPPPPP\n\
         RNBQKBNR",
        Color::White,
    ),
    // Kiwipete without en passant.
    (
        "r...k..r\n\
         p.ppqpb.\n\
         bn..pnp.\n\
         ...PN...\n\
         .p..P...\n\
         ..N..Q.p\n\
         PPPBBPPP\n\
         R...K..R",
        Color::White,
    ),
    (
        "........\n\
         ..p.....\n\
         ...p....\n\
         KP.....r\n\
         .R...p.k\n\
         ........\n\
         ....P.P.\n\
         ........",
        Color::White,
    ),
    (
        "r....rk.\n\
         .pp.qppp\n\
         p.np.n..\n\
         ..b.p.B.\n\
         ..B.P.b.\n\
         P.NP.N..\n\
         .PP.QPPP\n\
         R....RK.",
        Color::White,
    ),
];

fn games() -> Vec<Game> {
    POSITIONS
        .iter()
        .map(|&(layout, turn)| {
            Game::with_turn(Board::from_layout(layout).unwrap(), Config::default(), turn).unwrap()
        })
        .collect()
}

fn perft(game: &mut Game, depth: u8) -> u64 {
    let moves = game.playable_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for (from, to) in moves {
        let _ = game.attempt_move(from, to).unwrap();
        nodes += perft(game, depth - 1);
        let _ = game.undo(1).unwrap();
    }
    nodes
}

fn movegen_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Move generation");
    let layouts = POSITIONS.iter().map(|&(layout, _)| layout).collect::<Vec<_>>();
    let _ = group.throughput(criterion::Throughput::Elements(layouts.len() as u64));
    // Fresh boards every iteration: cached move lists would make this a
    // lookup benchmark.
    let _ = group.bench_with_input(
        BenchmarkId::new("legal_moves", format!("{} positions", layouts.len())),
        &layouts,
        |b, layouts| {
            b.iter(|| {
                for layout in layouts {
                    let mut board = Board::from_layout(layout).unwrap();
                    let squares = board.pieces().map(|piece| piece.square()).collect::<Vec<_>>();
                    for square in squares {
                        let _ = std::hint::black_box(board.legal_moves(square).unwrap().len());
                    }
                }
            });
        },
    );
    group.finish();
}

fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Perft");
    let _ = group.sample_size(10);
    for depth in 1..=2 {
        let _ = group.bench_with_input(BenchmarkId::new("perft", depth), &depth, |b, &depth| {
            b.iter(|| {
                for mut game in games() {
                    let _ = std::hint::black_box(perft(&mut game, depth));
                }
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = movegen;
    config = Criterion::default();
    targets = movegen_bench, perft_bench
}
criterion_main!(movegen);
