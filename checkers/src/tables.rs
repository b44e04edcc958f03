//! Precomputed neighbours of every playable square

const NONE: u8 = 0xff;

include!(concat!(env!("OUT_DIR"), "/neighbors.rs"));

/// Returns the playable index one diagonal step away from `idx` in direction `dir`
#[inline]
pub fn step(idx: usize, dir: usize) -> Option<usize> {
    match STEPS[idx][dir] {
        NONE => None,
        val => Some(val as usize),
    }
}

/// Returns the jumped-over square and the landing square of a jump from `idx` in direction `dir`
#[inline]
pub fn jump(idx: usize, dir: usize) -> Option<(usize, usize)> {
    match JUMPS[idx][dir] {
        NONE => None,
        val => Some((STEPS[idx][dir] as usize, val as usize)),
    }
}
