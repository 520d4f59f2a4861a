use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::errors::{MerkleError, MerkleResult, RecordViolation};
use crate::hasher::{hash_pair, hash_to_hex, Hash32, LeafEncoding};
use crate::proof::MerkleProof;
use crate::{Address, AllocationRecord};

/// A node in the tree grid. `level` 0 is the leaf level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub hash: Hash32,
    pub level: usize,
    pub position: usize,
}

/// How a caller identifies a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafQuery {
    Recipient(Address),
    Index(u64),
}

impl From<Address> for LeafQuery {
    fn from(address: Address) -> Self {
        LeafQuery::Recipient(address)
    }
}

impl From<u64> for LeafQuery {
    fn from(index: u64) -> Self {
        LeafQuery::Index(index)
    }
}

/// Binary Merkle tree over a campaign's allocation records.
///
/// ## Construction
///
/// - Records are sorted by `index`, so the root depends only on the record set
/// - Leaves are hashed with the campaign's [`LeafEncoding`]
/// - Parents are `hash_pair(left, right)` (sorted pair, order independent)
/// - The last node of an odd level is paired with itself
///
/// The full level grid is kept, so a proof is an O(log n) walk with no
/// rehashing. The tree is never mutated after construction; share it behind an
/// `Arc` and rebuild to change it.
#[derive(Debug, Clone)]
pub struct AllocationTree {
    encoding: LeafEncoding,
    /// Records in leaf order (ascending index)
    records: Vec<AllocationRecord>,
    /// `levels[0]` = leaf hashes, last level = `[root]`
    levels: Vec<Vec<Hash32>>,
    recipient_positions: HashMap<Address, usize>,
    index_positions: HashMap<u64, usize>,
}

impl AllocationTree {
    /// Validates the recipient set and builds the tree.
    ///
    /// Every duplicate index, duplicate recipient and zero amount is reported
    /// in a single [`MerkleError::InvalidRecords`].
    pub fn build(records: Vec<AllocationRecord>, encoding: LeafEncoding) -> MerkleResult<Self> {
        if records.is_empty() {
            return Err(MerkleError::EmptyRecipientSet);
        }

        let violations = find_violations(&records);
        if !violations.is_empty() {
            return Err(MerkleError::InvalidRecords(violations));
        }

        records
            .iter()
            .try_fold(0u128, |acc, r| acc.checked_add(r.amount))
            .ok_or(MerkleError::TotalOverflow)?;

        Ok(Self::assemble(records, encoding))
    }

    /// Builds without structural validation.
    ///
    /// Meant for auditing data produced elsewhere: run
    /// [`AllocationTree::validate_integrity`] on the result. Lookups on a
    /// duplicated recipient or index resolve to the first leaf in index order.
    pub fn build_unvalidated(
        records: Vec<AllocationRecord>,
        encoding: LeafEncoding,
    ) -> MerkleResult<Self> {
        if records.is_empty() {
            return Err(MerkleError::EmptyRecipientSet);
        }
        Ok(Self::assemble(records, encoding))
    }

    fn assemble(mut records: Vec<AllocationRecord>, encoding: LeafEncoding) -> Self {
        records.sort_by_key(|r| r.index);

        let leaves: Vec<Hash32> = records.iter().map(|r| r.leaf_hash(encoding)).collect();
        let levels = build_levels(leaves);

        let mut recipient_positions = HashMap::with_capacity(records.len());
        let mut index_positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            recipient_positions.entry(record.recipient).or_insert(position);
            index_positions.entry(record.index).or_insert(position);
        }

        let tree = Self {
            encoding,
            records,
            levels,
            recipient_positions,
            index_positions,
        };

        debug!(
            "Built allocation tree: {} leaves, depth {}, encoding {}, root {}",
            tree.leaf_count(),
            tree.depth(),
            encoding,
            hash_to_hex(&tree.root())
        );

        tree
    }

    pub fn root(&self) -> Hash32 {
        // levels always ends with a single-node level
        self.levels[self.levels.len() - 1][0]
    }

    pub fn encoding(&self) -> LeafEncoding {
        self.encoding
    }

    /// Records in leaf order.
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    pub fn levels(&self) -> &[Vec<Hash32>] {
        &self.levels
    }

    #[cfg(test)]
    pub(crate) fn levels_mut(&mut self) -> &mut [Vec<Hash32>] {
        &mut self.levels
    }

    pub fn leaf_count(&self) -> usize {
        self.records.len()
    }

    /// Number of levels above the leaves (0 for a single leaf).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn node(&self, level: usize, position: usize) -> Option<TreeNode> {
        let hash = *self.levels.get(level)?.get(position)?;
        Some(TreeNode {
            hash,
            level,
            position,
        })
    }

    /// Children of an internal node. On an odd level the last parent has the
    /// same node as both children.
    pub fn children(&self, node: &TreeNode) -> Option<(TreeNode, TreeNode)> {
        if node.level == 0 {
            return None;
        }
        let left = self.node(node.level - 1, node.position * 2)?;
        let right = self
            .node(node.level - 1, node.position * 2 + 1)
            .unwrap_or(left);
        Some((left, right))
    }

    pub fn leaf_for_recipient(&self, recipient: &Address) -> Option<&AllocationRecord> {
        let position = self.recipient_positions.get(recipient)?;
        self.records.get(*position)
    }

    pub fn leaf_for_index(&self, index: u64) -> Option<&AllocationRecord> {
        let position = self.index_positions.get(&index)?;
        self.records.get(*position)
    }

    pub fn contains(&self, recipient: &Address) -> bool {
        self.recipient_positions.contains_key(recipient)
    }

    /// Proof for a recipient, `None` if the address is not in the set.
    pub fn proof_for_recipient(&self, recipient: &Address) -> Option<MerkleProof> {
        let position = *self.recipient_positions.get(recipient)?;
        Some(self.proof_at(position))
    }

    /// Proof for a claim index, `None` if no record has that index.
    pub fn proof_for_index(&self, index: u64) -> Option<MerkleProof> {
        let position = *self.index_positions.get(&index)?;
        Some(self.proof_at(position))
    }

    pub fn proof_for(&self, query: &LeafQuery) -> Option<MerkleProof> {
        match query {
            LeafQuery::Recipient(recipient) => self.proof_for_recipient(recipient),
            LeafQuery::Index(index) => self.proof_for_index(*index),
        }
    }

    /// Proofs for every leaf, in leaf order.
    pub fn proofs_for_all(&self) -> Vec<MerkleProof> {
        (0..self.records.len()).map(|p| self.proof_at(p)).collect()
    }

    /// Walks from the leaf at `position` to the root collecting one sibling
    /// per level.
    pub(crate) fn proof_at(&self, position: usize) -> MerkleProof {
        MerkleProof {
            leaf: self.records[position],
            siblings: self.sibling_path(position),
            root: self.root(),
        }
    }

    pub(crate) fn sibling_path(&self, position: usize) -> Vec<Hash32> {
        let mut siblings = Vec::with_capacity(self.depth());
        let mut current = position;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = if current % 2 == 0 {
                current + 1
            } else {
                current - 1
            };
            // Odd level: the last node was paired with itself
            let sibling = level.get(sibling_index).unwrap_or(&level[current]);
            siblings.push(*sibling);
            current /= 2;
        }

        siblings
    }
}

/// Hashes `leaves` level by level up to a single root.
pub fn build_levels(leaves: Vec<Hash32>) -> Vec<Vec<Hash32>> {
    let mut levels = vec![leaves];

    while levels[levels.len() - 1].len() > 1 {
        let current = &levels[levels.len() - 1];
        let next: Vec<Hash32> = current
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hash_pair(left, right)
            })
            .collect();
        levels.push(next);
    }

    levels
}

/// Collects every structural problem in a recipient set.
pub fn find_violations(records: &[AllocationRecord]) -> Vec<RecordViolation> {
    let mut index_counts: BTreeMap<u64, usize> = BTreeMap::new();
    let mut recipient_indices: BTreeMap<Address, Vec<u64>> = BTreeMap::new();
    let mut violations = Vec::new();

    for record in records {
        *index_counts.entry(record.index).or_default() += 1;
        recipient_indices
            .entry(record.recipient)
            .or_default()
            .push(record.index);
    }

    for (index, occurrences) in index_counts {
        if occurrences > 1 {
            violations.push(RecordViolation::DuplicateIndex { index, occurrences });
        }
    }

    for (recipient, mut indices) in recipient_indices {
        if indices.len() > 1 {
            indices.sort_unstable();
            violations.push(RecordViolation::DuplicateRecipient { recipient, indices });
        }
    }

    let mut zero: Vec<&AllocationRecord> = records.iter().filter(|r| r.amount == 0).collect();
    zero.sort_by_key(|r| r.index);
    violations.extend(zero.into_iter().map(|r| RecordViolation::ZeroAmount {
        index: r.index,
        recipient: r.recipient,
    }));

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x10;
        bytes[19] = seed;
        Address(bytes)
    }

    fn records(count: u64) -> Vec<AllocationRecord> {
        (0..count)
            .map(|i| AllocationRecord::new(i, addr(i as u8 + 1), (i as u128 + 1) * 100))
            .collect()
    }

    #[test]
    fn test_single_leaf_tree() {
        let recs = records(1);
        let tree = AllocationTree::build(recs.clone(), LeafEncoding::Packed).unwrap();

        assert_eq!(tree.root(), recs[0].leaf_hash(LeafEncoding::Packed));
        assert_eq!(tree.depth(), 0);
        let proof = tree.proof_for_recipient(&recs[0].recipient).unwrap();
        assert!(proof.siblings.is_empty());
    }

    #[test]
    fn test_levels_shape_with_odd_counts() {
        let tree = AllocationTree::build(records(5), LeafEncoding::Packed).unwrap();
        let widths: Vec<usize> = tree.levels().iter().map(|l| l.len()).collect();
        assert_eq!(widths, vec![5, 3, 2, 1]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_odd_level_duplicates_last_node() {
        let recs = records(3);
        let tree = AllocationTree::build(recs.clone(), LeafEncoding::Packed).unwrap();
        let leaves: Vec<Hash32> = recs
            .iter()
            .map(|r| r.leaf_hash(LeafEncoding::Packed))
            .collect();

        let expected = hash_pair(
            &hash_pair(&leaves[0], &leaves[1]),
            &hash_pair(&leaves[2], &leaves[2]),
        );
        assert_eq!(tree.root(), expected);

        // The lone leaf's first sibling is itself
        let proof = tree.proof_for_index(2).unwrap();
        assert_eq!(proof.siblings[0], leaves[2]);
        assert_eq!(proof.siblings.len(), 2);
    }

    #[test]
    fn test_children_navigation() {
        let tree = AllocationTree::build(records(3), LeafEncoding::Packed).unwrap();
        let root = tree.node(tree.depth(), 0).unwrap();
        let (left, right) = tree.children(&root).unwrap();
        assert_eq!(hash_pair(&left.hash, &right.hash), root.hash);

        let (l2, r2) = tree.children(&right).unwrap();
        assert_eq!(l2, r2, "odd level pairs the last node with itself");
        assert!(tree.children(&l2).is_none());
        assert!(tree.node(0, 3).is_none());
    }

    #[test]
    fn test_root_ignores_input_order() {
        let mut recs = records(9);
        let tree1 = AllocationTree::build(recs.clone(), LeafEncoding::Packed).unwrap();
        recs.reverse();
        recs.swap(1, 6);
        let tree2 = AllocationTree::build(recs, LeafEncoding::Packed).unwrap();
        assert_eq!(tree1.root(), tree2.root());
        assert_eq!(tree1.records(), tree2.records());
    }

    #[test]
    fn test_build_rejects_empty() {
        let result = AllocationTree::build(vec![], LeafEncoding::Packed);
        assert_eq!(result.unwrap_err(), MerkleError::EmptyRecipientSet);
    }

    #[test]
    fn test_build_reports_every_violation() {
        let mut recs = records(4);
        recs[1].index = 0; // duplicate index 0
        recs[3].recipient = recs[2].recipient; // duplicate recipient
        recs[2].amount = 0;
        recs[3].amount = 0;

        let violations = match AllocationTree::build(recs, LeafEncoding::Packed) {
            Err(MerkleError::InvalidRecords(violations)) => violations,
            other => panic!("expected InvalidRecords, got {:?}", other),
        };

        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&RecordViolation::DuplicateIndex {
            index: 0,
            occurrences: 2
        }));
        assert!(violations.contains(&RecordViolation::DuplicateRecipient {
            recipient: addr(3),
            indices: vec![2, 3]
        }));
        assert_eq!(
            violations
                .iter()
                .filter(|v| matches!(v, RecordViolation::ZeroAmount { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_build_rejects_total_overflow() {
        let recs = vec![
            AllocationRecord::new(0, addr(1), u128::MAX),
            AllocationRecord::new(1, addr(2), 1),
        ];
        let result = AllocationTree::build(recs, LeafEncoding::Packed);
        assert_eq!(result.unwrap_err(), MerkleError::TotalOverflow);
    }

    #[test]
    fn test_unvalidated_build_keeps_first_duplicate() {
        let mut recs = records(3);
        recs[2].recipient = recs[0].recipient;
        let tree = AllocationTree::build_unvalidated(recs, LeafEncoding::Packed).unwrap();
        assert_eq!(tree.leaf_for_recipient(&addr(1)).unwrap().index, 0);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_lookup_by_index_and_recipient_agree() {
        let tree = AllocationTree::build(records(6), LeafEncoding::DoubleHashed).unwrap();
        let by_index = tree.proof_for(&LeafQuery::Index(4)).unwrap();
        let by_recipient = tree.proof_for(&LeafQuery::Recipient(addr(5))).unwrap();
        assert_eq!(by_index, by_recipient);
        assert!(tree.proof_for(&LeafQuery::Index(60)).is_none());
        assert!(tree.proof_for(&addr(99).into()).is_none());
    }
}
