use rand::seq::SliceRandom;
use rand::Rng;

use crate::alphabet::{Letter, LetterPool};

/// Builds the multiple-choice set for `target`: `option_count - 1` distinct
/// distractors drawn uniformly from the rest of the pool, with the target
/// placed at a uniformly random position.
///
/// If the pool is too small the set is simply shorter; callers validate the
/// pool size against the tier before a session starts.
pub fn generate_options<R: Rng + ?Sized>(
    target: &Letter,
    pool: &LetterPool,
    option_count: usize,
    rng: &mut R,
) -> Vec<Letter> {
    let mut candidates: Vec<&Letter> = pool
        .letters()
        .iter()
        .filter(|l| !l.same_glyph(target))
        .collect();

    let wanted = option_count.saturating_sub(1).min(candidates.len());
    let (distractors, _) = candidates.partial_shuffle(rng, wanted);

    let mut options: Vec<Letter> = distractors.iter().map(|l| (*l).clone()).collect();
    let slot = rng.gen_range(0..=options.len());
    options.insert(slot, target.clone());
    options
}

/// Uniform permutation of the whole pool (Fisher-Yates).
pub fn shuffled_order<R: Rng + ?Sized>(pool: &LetterPool, rng: &mut R) -> Vec<Letter> {
    let mut order = pool.letters().to_vec();
    order.shuffle(rng);
    order
}
