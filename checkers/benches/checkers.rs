use criterion::{black_box, criterion_group, criterion_main, Criterion};
use owlcheckers::{
    eval::Evaluator,
    metrics::NullMetrics,
    movegen::{self, candidates},
    moves, Board, Make, MoveChain,
};

use std::str::FromStr;

const BOARDS: [(&str, &str); 5] = [
    ("initial", "122222222222200000000111111111111"),
    ("opening", "122222222202202001000011111111111"),
    ("jumps", "100000000222200002222111100000000"),
    ("kings", "100000000440004400000033000330000"),
    ("sparse", "200000300000000100000020000040000"),
];

fn boards() -> impl Iterator<Item = (&'static str, Board)> {
    BOARDS
        .iter()
        .map(|&(name, s)| (name, Board::from_str(s).unwrap()))
}

fn bench_gen_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_moves");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::legal_moves(&board).len()))
        });
    }
}

fn bench_gen_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_candidates");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(candidates::gen_jumps(&board).len());
                black_box(candidates::gen_simple(&board).len())
            })
        });
    }
}

fn bench_has_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_legal_moves");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(movegen::has_legal_moves(&board)))
        });
    }
}

fn bench_make_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move");
    for (name, mut board) in boards() {
        let moves = movegen::legal_moves(&board);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    let u = moves::make_move_unchecked(&mut board, *mv);
                    moves::unmake_move_unchecked(&mut board, *mv, u)
                }
            })
        });
    }
}

fn bench_make_move_checked(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move_checked");
    for (name, board) in boards() {
        let moves = movegen::legal_moves(&board);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    black_box(mv.make(&board).unwrap());
                }
            })
        });
    }
}

fn bench_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick");
    for (name, board) in boards() {
        let chain = MoveChain::new(board);
        let mut eval = Evaluator::new(Some(1));
        group.bench_function(name, |b| {
            b.iter(|| black_box(eval.pick(&chain, &mut NullMetrics)))
        });
    }
}

criterion_group!(
    checkers,
    bench_gen_moves,
    bench_gen_candidates,
    bench_has_legal_moves,
    bench_make_move,
    bench_make_move_checked,
    bench_pick,
);

criterion_main!(checkers);
