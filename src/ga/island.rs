//! Island-model migration.
//!
//! Islands form a fixed ring `0 → 1 → … → n-1 → 0`. At every migration
//! epoch each island receives a batch of candidates from its predecessor
//! into its tail slots. Sizes never change.

use crate::random::shuffle;
use rand::Rng;

/// Number of migrants an island of `len` candidates sends out.
pub fn migrant_count(len: usize, migration_fraction: f64) -> usize {
    (len as f64 * migration_fraction).floor() as usize
}

/// Performs one ring migration across `islands`.
///
/// The last island is shuffled first and its leading slice becomes the
/// batch for island 0. Then each island in index order is shuffled, copies
/// its own leading slice as its outgoing batch, and receives the incoming
/// batch into its tail. The batch taken from the last island up front is
/// what closes the ring, so the last island's in-loop batch is dropped.
///
/// Returns the number of migrants each island received.
pub fn migrate<I: Clone, R: Rng>(
    islands: &mut [Vec<I>],
    migration_fraction: f64,
    rng: &mut R,
) -> Vec<usize> {
    let Some(last) = islands.last_mut() else {
        return Vec::new();
    };
    shuffle(last, rng);
    let k = migrant_count(last.len(), migration_fraction);
    let mut in_transit: Vec<I> = last[..k].to_vec();

    let mut received = Vec::with_capacity(islands.len());
    for island in islands.iter_mut() {
        shuffle(island, rng);
        let k = migrant_count(island.len(), migration_fraction);
        let outgoing = island[..k].to_vec();

        let incoming = in_transit.len().min(island.len());
        let start = island.len() - incoming;
        for (slot, migrant) in island[start..].iter_mut().zip(in_transit) {
            *slot = migrant;
        }
        received.push(incoming);
        in_transit = outgoing;
    }
    received
}
