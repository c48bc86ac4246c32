//! Bounded random selection of invitees.

use rand::Rng;

/// Pick at most `limit` items uniformly at random.
///
/// When `candidates` holds more than `limit` items a Fisher–Yates shuffle runs
/// over the whole list (for `i` from the last index down to 1, swap with a
/// uniformly chosen `j` in `0..=i`) and the result is truncated. Otherwise
/// every candidate is returned in input order.
///
/// # Examples
/// ```
/// use chatmap::domain::select_invitees;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let picked = select_invitees((0..15).collect::<Vec<_>>(), 10, &mut rng);
/// assert_eq!(picked.len(), 10);
/// ```
pub fn select_invitees<T, R>(mut candidates: Vec<T>, limit: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    if candidates.len() <= limit {
        return candidates;
    }
    for i in (1..candidates.len()).rev() {
        let j = rng.gen_range(0..=i);
        candidates.swap(i, j);
    }
    candidates.truncate(limit);
    candidates
}
