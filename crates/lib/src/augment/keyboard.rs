//! QWERTY keyboard adjacency for simulated typos.
//!
//! Only lowercase letters are candidates; digits and special characters are never produced.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const QWERTY_NEIGHBOURS: &[(char, &str)] = &[
    ('q', "wa"),
    ('w', "qeasd"),
    ('e', "wrsdf"),
    ('r', "etdfg"),
    ('t', "ryfgh"),
    ('y', "tughj"),
    ('u', "yihjk"),
    ('i', "uojkl"),
    ('o', "ipkl"),
    ('p', "ol"),
    ('a', "qwsz"),
    ('s', "qweadzx"),
    ('d', "wersfxc"),
    ('f', "ertdgcv"),
    ('g', "rtyfhvb"),
    ('h', "tyugjbn"),
    ('j', "yuihknm"),
    ('k', "uiojlm"),
    ('l', "iopk"),
    ('z', "asx"),
    ('x', "zsdc"),
    ('c', "xdfv"),
    ('v', "cfgb"),
    ('b', "vghn"),
    ('n', "bhjm"),
    ('m', "njk"),
];

/// Lowercase neighbours of `c` on a QWERTY keyboard; empty for non-letters.
pub fn neighbours(c: char) -> &'static str {
    let lower = c.to_ascii_lowercase();
    QWERTY_NEIGHBOURS
        .iter()
        .find(|(k, _)| *k == lower)
        .map(|(_, n)| *n)
        .unwrap_or("")
}

/// A plausible mistyping of `c`, keeping its case. `None` when `c` has no neighbours.
pub fn typo(c: char, rng: &mut StdRng) -> Option<char> {
    let candidates: Vec<char> = neighbours(c).chars().collect();
    let picked = *candidates.choose(rng)?;
    Some(if c.is_ascii_uppercase() {
        picked.to_ascii_uppercase()
    } else {
        picked
    })
}
