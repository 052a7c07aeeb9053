// THEORY:
// The `IdentityTracker` gives eyes "object permanence". Every frame brings a fresh
// list of eye regions with no ids. The tracker matches each one to the eyes of the
// previous frame so that an eye keeps the same id for as long as it stays in view.
//
// Key architectural principles:
// 1.  **Nearest Centroid**: Each current eye's candidate is the previous eye whose
//     region centroid is closest to its own (ties go to the first one).
// 2.  **Greedy Claiming**: Candidates are resolved in current-eye order. A previous
//     eye can be claimed once; a later current eye that wanted the same previous
//     eye gets a fresh id instead. This is O(n * m) and not globally optimal, but
//     with a handful of eyes per frame it costs next to nothing and needs one pass.
// 3.  **Lifecycle**: Unmatched current eyes are born with a new id. Unclaimed
//     previous eyes are reported back as lost so the caller can clean up after them.
// 4.  **Injected Entropy**: Ids come from an `IdGenerator`, random UUIDs in
//     production and a plain counter in tests.

use crate::core_modules::eye::{Eye, EyeId};
use crate::core_modules::keyed_set::KeyedSet;
use log::debug;
use uuid::Uuid;

/// Source of fresh eye ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> EyeId;
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> EyeId {
        EyeId::new(Uuid::new_v4())
    }
}

/// Deterministic ids `1, 2, 3, ...` encoded as UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIdGenerator {
    issued: u128,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> EyeId {
        self.issued += 1;
        EyeId::new(Uuid::from_u128(self.issued))
    }
}

/// Previous eyes are keyed by their position in the previous frame; ids may be unset.
fn slot_key(entry: &(usize, Eye)) -> usize {
    entry.0
}

/// Matches the eyes of consecutive frames.
pub struct IdentityTracker<G: IdGenerator> {
    ids: G,
}

impl Default for IdentityTracker<RandomIdGenerator> {
    fn default() -> Self {
        Self::new(RandomIdGenerator)
    }
}

impl<G: IdGenerator> IdentityTracker<G> {
    pub fn new(ids: G) -> Self {
        Self { ids }
    }

    /// Assigns an id to every eye in `current`, inheriting ids from `previous`
    /// where possible. Returns the previous eyes that no current eye claimed.
    pub fn assign_ids(&mut self, current: &mut [Eye], previous: &[Eye]) -> Vec<Eye> {
        if current.is_empty() {
            return Vec::new();
        }

        if previous.is_empty() {
            for eye in current.iter_mut() {
                eye.assign_id(self.ids.next_id());
            }
            debug!("first frame: {} eyes get fresh ids", current.len());
            return Vec::new();
        }

        let nearest: Vec<usize> = current
            .iter()
            .map(|eye| Self::nearest_previous(eye, previous))
            .collect();

        let mut claimed: Vec<usize> = Vec::with_capacity(current.len());
        for (eye, &candidate) in current.iter_mut().zip(&nearest) {
            if eye.id().is_some() || claimed.contains(&candidate) {
                continue;
            }
            claimed.push(candidate);
            if let Some(id) = previous[candidate].id() {
                eye.assign_id(id);
            }
        }

        let mut born = 0;
        for eye in current.iter_mut() {
            if eye.id().is_none() {
                eye.assign_id(self.ids.next_id());
                born += 1;
            }
        }

        let previous_set = KeyedSet::from_values(slot_key, previous.iter().cloned().enumerate());
        let claimed_set =
            KeyedSet::from_values(slot_key, claimed.iter().map(|&index| (index, previous[index].clone())));
        let lost: Vec<Eye> = previous_set
            .difference(&claimed_set)
            .into_vec()
            .into_iter()
            .map(|(_, eye)| eye)
            .collect();

        debug!(
            "matched {} eyes, {} new, {} lost",
            claimed.len(),
            born,
            lost.len()
        );
        lost
    }

    fn nearest_previous(eye: &Eye, previous: &[Eye]) -> usize {
        let center = eye.region_centroid();
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, candidate) in previous.iter().enumerate() {
            let distance = center.distance_to(&candidate.region_centroid());
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }
        best_index
    }
}
