// THEORY:
// The `UnionFind` is the equivalence bookkeeping behind single-pass connected
// component labeling. Every key points directly at the leader of its group and every
// leader owns the explicit list of its members, so once a raster scan is finished
// the groups can be enumerated as-is with no second relabeling sweep.
//
// Key architectural principles:
// 1.  **Direct Leader Storage**: A key's leader is always a group head. Merging two
//     groups rewrites the leader of every moved member, which keeps
//     `leader_of(leader_of(k)) == leader_of(k)` true at all times.
// 2.  **Smaller Into Larger**: A merge moves the smaller member list into the larger
//     one by concatenation. Member order inside a group is enumeration order, not
//     pixel order.
// 3.  **Deterministic Enumeration**: Groups are kept in a `BTreeMap` keyed by leader,
//     so iterating them always yields the same order for the same input.
// 4.  **Fail Fast**: A leader without a member list means the structure is corrupt.
//     That is a programming error and panics immediately.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Disjoint-set forest with explicit per-leader member lists.
#[derive(Debug, Clone)]
pub struct UnionFind<K> {
    leader: HashMap<K, K>,
    groups: BTreeMap<K, Vec<K>>,
}

impl<K> Default for UnionFind<K> {
    fn default() -> Self {
        Self {
            leader: HashMap::new(),
            groups: BTreeMap::new(),
        }
    }
}

impl<K> UnionFind<K>
where
    K: Copy + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` as its own group. No-op if the key is already known.
    pub fn make_singleton(&mut self, key: K) {
        if self.leader.contains_key(&key) {
            return;
        }
        self.leader.insert(key, key);
        self.groups.insert(key, vec![key]);
    }

    /// Joins the groups of `a` and `b`, adding whichever key is still unknown.
    pub fn union(&mut self, a: K, b: K) {
        match (self.leader_of(a), self.leader_of(b)) {
            (Some(leader_a), Some(leader_b)) => {
                if leader_a != leader_b {
                    self.merge(leader_a, leader_b);
                }
            }
            (Some(leader_a), None) => self.attach(leader_a, b),
            (None, Some(leader_b)) => self.attach(leader_b, a),
            (None, None) => {
                if a == b {
                    self.make_singleton(a);
                    return;
                }
                self.leader.insert(a, a);
                self.leader.insert(b, a);
                self.groups.insert(a, vec![a, b]);
            }
        }
    }

    /// Leader of the group containing `key`, or `None` if the key was never added.
    pub fn leader_of(&self, key: K) -> Option<K> {
        self.leader.get(&key).copied()
    }

    /// Members of the group headed by `leader`.
    pub fn group_of(&self, leader: K) -> Option<&[K]> {
        self.groups.get(&leader).map(Vec::as_slice)
    }

    /// Members of the group `key` belongs to, resolving its leader first.
    pub fn group_containing(&self, key: K) -> Option<&[K]> {
        let leader = self.leader_of(key)?;
        Some(self.members(leader))
    }

    pub fn contains(&self, key: K) -> bool {
        self.leader.contains_key(&key)
    }

    /// Number of keys added so far.
    pub fn len(&self) -> usize {
        self.leader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leader.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All groups in ascending leader order.
    pub fn groups(&self) -> impl Iterator<Item = &[K]> + '_ {
        self.groups.values().map(Vec::as_slice)
    }

    pub fn into_groups(self) -> Vec<Vec<K>> {
        self.groups.into_values().collect()
    }

    fn members(&self, leader: K) -> &[K] {
        match self.groups.get(&leader) {
            Some(members) => members,
            None => panic!("union-find leader has no member list; labeling state is corrupt"),
        }
    }

    fn attach(&mut self, leader: K, key: K) {
        match self.groups.get_mut(&leader) {
            Some(members) => members.push(key),
            None => panic!("union-find leader has no member list; labeling state is corrupt"),
        }
        self.leader.insert(key, leader);
    }

    fn merge(&mut self, leader_a: K, leader_b: K) {
        let size_a = self.members(leader_a).len();
        let size_b = self.members(leader_b).len();
        let (winner, loser) = if size_b > size_a {
            (leader_b, leader_a)
        } else {
            (leader_a, leader_b)
        };

        let Some(moved) = self.groups.remove(&loser) else {
            panic!("union-find leader has no member list; labeling state is corrupt");
        };
        for member in &moved {
            self.leader.insert(*member, winner);
        }
        match self.groups.get_mut(&winner) {
            Some(members) => members.extend(moved),
            None => panic!("union-find leader has no member list; labeling state is corrupt"),
        }
    }
}
