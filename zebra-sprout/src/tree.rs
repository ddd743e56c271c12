//! Note Commitment Trees.
//!
//! A note commitment tree is an incremental Merkle tree of fixed depth
//! used to store note commitments that JoinSplit transfers produce. Just
//! as the unspent transaction output set (UTXO set) used in Bitcoin, it is
//! used to express the existence of value and the capability to spend it.
//! However, unlike the UTXO set, it is not the job of this tree to protect
//! against double-spending, as it is append-only.
//!
//! Every root the tree has ever had is an anchor. A JoinSplit can spend a
//! note against any anchor that was produced after the note was appended.

use std::{
    collections::{BTreeMap, HashSet},
    fmt, io,
};

use incrementalmerkletree::{frontier::Frontier, Hashable, Level};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    commitment::NoteCommitment,
    config::Config,
    prf::sha256_compress,
    serialization::{ReadZcashExt, SerializationError, ZcashDeserialize, ZcashSerialize},
};

mod witness;


pub use witness::Witness;
use witness::IncrementalWitness;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// Sprout note commitment trees have a max depth of 29.
///
/// <https://zips.z.cash/protocol/protocol.pdf#constants>
pub const MERKLE_DEPTH: u8 = 29;

/// [MerkleCRH^Sprout] Hash Function.
///
/// Creates nodes of the note commitment tree.
///
/// MerkleCRH^Sprout(layer, left, right) := SHA256Compress(left || right).
///
/// Note: the implementation of MerkleCRH^Sprout does not use the `layer`
/// argument from the definition above since the argument does not affect the output.
///
/// [MerkleCRH^Sprout]: https://zips.z.cash/protocol/protocol.pdf#merklecrh
fn merkle_crh_sprout(left: [u8; 32], right: [u8; 32]) -> [u8; 32] {
    sha256_compress(&left, &right)
}

lazy_static! {
    /// List of "empty" Sprout note commitment roots (nodes), one for each layer.
    ///
    /// The list is indexed by the layer number (0: root; `MERKLE_DEPTH`: leaf).
    pub(crate) static ref EMPTY_ROOTS: Vec<[u8; 32]> = {
        // The empty leaf node at layer `MERKLE_DEPTH`.
        let mut v = vec![uncommitted()];

        // Starting with layer `MERKLE_DEPTH` - 1 (the first internal layer, after the leaves),
        // generate the empty roots up to layer 0, the root.
        for _ in 0..MERKLE_DEPTH {
            // The vector is generated from the end, pushing new nodes to its beginning.
            // For this reason, the layer below is v[0].
            v.insert(0, merkle_crh_sprout(v[0], v[0]));
        }

        v
    };
}

/// Returns an as-yet unused leaf node value of a Sprout note commitment tree.
///
/// Uncommitted^Sprout = \[0\]^(l^[Sprout_Merkle]).
///
/// [Sprout_Merkle]: https://zips.z.cash/protocol/protocol.pdf#constants
pub fn uncommitted() -> [u8; 32] {
    [0; 32]
}

/// Sprout note commitment tree root node hash.
///
/// The root hash in LEBS2OSP256(rt) encoding of the Sprout note
/// commitment tree. Used as the anchor of JoinSplit descriptions.
#[derive(Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub struct Root([u8; 32]);

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Root").field(&hex::encode(self.0)).finish()
    }
}

impl From<[u8; 32]> for Root {
    fn from(bytes: [u8; 32]) -> Root {
        Self(bytes)
    }
}

impl From<Root> for [u8; 32] {
    fn from(rt: Root) -> [u8; 32] {
        rt.0
    }
}

impl From<&Root> for [u8; 32] {
    fn from(root: &Root) -> Self {
        (*root).into()
    }
}

impl From<Node> for Root {
    fn from(node: Node) -> Root {
        Self(node.0)
    }
}

impl ZcashSerialize for Root {
    fn zcash_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0)
    }
}

impl ZcashDeserialize for Root {
    fn zcash_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Self(reader.read_32_bytes()?))
    }
}

/// A node of the Sprout note commitment tree.
#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Node([u8; 32]);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Node").field(&hex::encode(self.0)).finish()
    }
}

impl Hashable for Node {
    /// Returns an empty leaf.
    fn empty_leaf() -> Self {
        Self(uncommitted())
    }

    /// Combines two nodes to generate a new node using [MerkleCRH^Sprout].
    ///
    /// Note that Sprout does not use the `level` argument.
    ///
    /// [MerkleCRH^Sprout]: https://zips.z.cash/protocol/protocol.pdf#sproutmerklecrh
    fn combine(_level: Level, a: &Self, b: &Self) -> Self {
        Self(merkle_crh_sprout(a.0, b.0))
    }

    /// Returns the root of an empty subtree of height `level`.
    fn empty_root(level: Level) -> Self {
        let layer = usize::from(MERKLE_DEPTH) - usize::from(u8::from(level));
        Self(EMPTY_ROOTS[layer])
    }
}

impl From<NoteCommitment> for Node {
    fn from(cm: NoteCommitment) -> Self {
        Node(cm.into())
    }
}

/// Combine two nodes at height `height`.
pub(crate) fn combine(height: u8, left: &Node, right: &Node) -> Node {
    Node::combine(Level::from(height), left, right)
}

/// The root of an empty subtree of height `height`.
pub(crate) fn empty_root(height: u8) -> Node {
    Node::empty_root(Level::from(height))
}

#[derive(Error, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum NoteCommitmentTreeError {
    #[error("the note commitment tree is full")]
    FullTree,

    #[error("no witness is tracked for the leaf at position {0}")]
    UntrackedLeaf(u64),
}

/// A set of anchors that JoinSplits are allowed to spend against.
///
/// The ledger decides which roots are valid. This crate only needs to ask
/// whether a given root is one of them.
pub trait AnchorSet {
    /// Returns `true` if `anchor` is a root that the tree has had.
    fn contains_anchor(&self, anchor: &Root) -> bool;
}

impl AnchorSet for HashSet<Root> {
    fn contains_anchor(&self, anchor: &Root) -> bool {
        self.contains(anchor)
    }
}

impl<const DEPTH: u8> AnchorSet for NoteCommitmentTree<DEPTH> {
    fn contains_anchor(&self, anchor: &Root) -> bool {
        self.is_anchor(anchor)
    }
}

/// [Sprout Note Commitment Tree].
///
/// An incremental Merkle tree of fixed depth used to store Sprout note commitments.
/// It is used to express the existence of value and the capability to spend it. It is _not_ the
/// job of this tree to protect against double-spending, as it is append-only; double-spending
/// is prevented by maintaining the [nullifier set] for each shielded pool.
///
/// Internally this wraps [`incrementalmerkletree::frontier::Frontier`], so that we can maintain and increment
/// the full tree with only the minimal amount of non-empty nodes/leaves required.
/// The tree also keeps every root it has had, and the witnesses of the leaves
/// it was asked to track.
///
/// Appends take `&mut self`, so a tree shared between threads needs a lock.
/// Witnesses returned by the tree are owned values, and stay valid for their
/// anchor while the tree keeps growing.
///
/// `DEPTH` is [`MERKLE_DEPTH`] on the ledger. Smaller trees are useful for tests.
///
/// [Sprout Note Commitment Tree]: https://zips.z.cash/protocol/protocol.pdf#merkletree
/// [nullifier set]: https://zips.z.cash/protocol/protocol.pdf#nullifierset
#[derive(Clone, Debug)]
pub struct NoteCommitmentTree<const DEPTH: u8 = MERKLE_DEPTH> {
    /// The tree represented as a [`incrementalmerkletree::frontier::Frontier`].
    ///
    /// # Consensus
    ///
    /// > A block MUST NOT add Sprout note commitments that would result in the Sprout note commitment tree
    /// > exceeding its capacity of 2^(MerkleDepth^Sprout) leaf nodes.
    ///
    /// <https://zips.z.cash/protocol/protocol.pdf#merkletree>
    inner: Frontier<Node, DEPTH>,

    /// Every root of the tree, indexed by the number of leaves at the time.
    roots: Vec<Root>,

    /// The same roots, for anchor lookups.
    anchors: HashSet<Root>,

    /// Witnesses that are updated on each append, by leaf position.
    witnesses: BTreeMap<u64, IncrementalWitness>,

    /// Whether [`Self::append`] starts tracking the new leaf.
    track_witnesses: bool,
}

impl<const DEPTH: u8> NoteCommitmentTree<DEPTH> {
    const DEPTH_IS_SUPPORTED: () = assert!(
        DEPTH <= MERKLE_DEPTH,
        "Sprout note commitment trees are at most 29 levels deep"
    );

    /// Creates an empty tree.
    ///
    /// If `track_witnesses` is `false`, [`Self::append`] still returns the
    /// witness of the new leaf, but the tree does not keep it up to date.
    pub fn new(track_witnesses: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::DEPTH_IS_SUPPORTED;

        let root = Root::from(Frontier::<Node, DEPTH>::empty().root());

        Self {
            inner: Frontier::empty(),
            roots: vec![root],
            anchors: [root].into_iter().collect(),
            witnesses: BTreeMap::new(),
            track_witnesses,
        }
    }

    /// Creates an empty tree using the witness policy in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.track_witnesses)
    }

    /// Appends a note commitment to the leafmost layer of the tree.
    ///
    /// Returns the new root, and the witness of the new leaf against it.
    /// The leaf is tracked, so [`Self::witness_at`] returns its witness
    /// against later roots, unless witness tracking is disabled.
    ///
    /// Returns an error if the tree is full.
    pub fn append(&mut self, cm: NoteCommitment) -> Result<(Root, Witness), NoteCommitmentTreeError> {
        let root = self.push(cm)?;

        let frontier = self
            .inner
            .value()
            .expect("a leaf was just appended to the tree");
        let incremental = IncrementalWitness::from_frontier(frontier);
        let witness = incremental.witness::<DEPTH>(root);

        if self.track_witnesses {
            self.witnesses.insert(witness.position(), incremental);
        }

        tracing::trace!(
            position = witness.position(),
            ?root,
            tracked = self.track_witnesses,
            "appended note commitment"
        );

        Ok((root, witness))
    }

    /// Appends a note commitment without tracking its witness.
    ///
    /// Outstanding witnesses are still updated.
    pub fn push(&mut self, cm: NoteCommitment) -> Result<Root, NoteCommitmentTreeError> {
        let node = Node::from(cm);

        if !self.inner.append(node) {
            return Err(NoteCommitmentTreeError::FullTree);
        }

        for witness in self.witnesses.values_mut() {
            witness.append(node);
        }

        let root = Root::from(self.inner.root());
        self.roots.push(root);
        self.anchors.insert(root);

        Ok(root)
    }

    /// Returns the current root of the tree; used as an anchor in Sprout
    /// shielded transactions.
    pub fn root(&self) -> Root {
        *self
            .roots
            .last()
            .expect("the root of the empty tree is always recorded")
    }

    /// Returns the root the tree had when it held `count` leaves.
    pub fn root_at(&self, count: u64) -> Option<Root> {
        let count = usize::try_from(count).ok()?;
        self.roots.get(count).copied()
    }

    /// Returns `true` if `anchor` is a current or historical root of this tree.
    pub fn is_anchor(&self, anchor: &Root) -> bool {
        self.anchors.contains(anchor)
    }

    /// Returns the witness of the tracked leaf at `position`, against the
    /// current root.
    pub fn witness_at(&self, position: u64) -> Result<Witness, NoteCommitmentTreeError> {
        self.witnesses
            .get(&position)
            .map(|witness| witness.witness::<DEPTH>(self.root()))
            .ok_or(NoteCommitmentTreeError::UntrackedLeaf(position))
    }

    /// Stops updating the witness of the leaf at `position`, for example
    /// after its note was spent.
    ///
    /// Returns `true` if the leaf was tracked.
    pub fn forget(&mut self, position: u64) -> bool {
        self.witnesses.remove(&position).is_some()
    }

    /// Returns the positions of the leaves whose witnesses are tracked.
    pub fn tracked_positions(&self) -> impl Iterator<Item = u64> + '_ {
        self.witnesses.keys().copied()
    }

    /// Counts the note commitments in the tree.
    ///
    /// For Sprout, the tree is [capped at 2^29 leaf nodes][spec].
    ///
    /// [spec]: https://zips.z.cash/protocol/protocol.pdf#merkletree
    pub fn count(&self) -> u64 {
        self.inner
            .value()
            .map_or(0, |x| u64::from(x.position()) + 1)
    }
}

impl<const DEPTH: u8> Default for NoteCommitmentTree<DEPTH> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<const DEPTH: u8> PartialEq for NoteCommitmentTree<DEPTH> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<const DEPTH: u8> Eq for NoteCommitmentTree<DEPTH> {}

impl<const DEPTH: u8> TryFrom<Vec<NoteCommitment>> for NoteCommitmentTree<DEPTH> {
    type Error = NoteCommitmentTreeError;

    /// Builds the tree from a vector of commitments at once, without
    /// tracking any witnesses.
    ///
    /// Returns an error if the commitments don't fit in the tree.
    fn try_from(values: Vec<NoteCommitment>) -> Result<Self, Self::Error> {
        let mut tree = Self::new(false);

        for cm in values {
            tree.push(cm)?;
        }

        Ok(tree)
    }
}
