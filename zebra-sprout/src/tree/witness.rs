//! Authentication paths for leaves of the note commitment tree.

use incrementalmerkletree::frontier::NonEmptyFrontier;

use crate::commitment::NoteCommitment;

use super::{combine, empty_root, Node, Root, MERKLE_DEPTH};

/// An authentication path from a note commitment to an anchor.
///
/// `auth_path[h]` is the sibling at height `h` of the path from the leaf
/// at `position` to the root. The bits of `position` say whether each
/// sibling is on the left or the right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    position: u64,
    auth_path: Vec<Node>,
    anchor: Root,
}

impl Witness {
    /// The position of the witnessed leaf.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The sibling nodes, from the leaf layer upwards.
    pub fn auth_path(&self) -> &[Node] {
        &self.auth_path
    }

    /// The anchor this witness was produced for.
    pub fn anchor(&self) -> Root {
        self.anchor
    }

    /// Returns the root obtained by hashing `cm` up this path.
    pub fn root(&self, cm: NoteCommitment) -> Root {
        let root = self
            .auth_path
            .iter()
            .enumerate()
            .fold(Node::from(cm), |node, (height, sibling)| {
                let height = height as u8;
                if self.is_right_child(height) {
                    combine(height, sibling, &node)
                } else {
                    combine(height, &node, sibling)
                }
            });

        Root::from(root)
    }

    /// Returns `true` if `cm` is the leaf this witness authenticates against
    /// its anchor.
    pub fn authenticates(&self, cm: NoteCommitment) -> bool {
        self.root(cm) == self.anchor
    }

    fn is_right_child(&self, height: u8) -> bool {
        (self.position >> height) & 1 == 1
    }
}

/// A witness that is kept up to date as leaves are appended after it.
///
/// Left siblings never change once the leaf is appended. Right siblings
/// are filled in one subtree at a time: `cursor` accumulates the subtree
/// that is currently being appended to, and moves its root to `filled`
/// once it is complete. Each append costs at most one hash per level.
#[derive(Clone, Debug)]
pub(super) struct IncrementalWitness {
    position: u64,
    /// Left siblings, lowest first.
    ommers: Vec<Node>,
    /// Completed right siblings, lowest first.
    filled: Vec<Node>,
    cursor: Option<Cursor>,
}

impl IncrementalWitness {
    /// Start witnessing the rightmost leaf of `frontier`.
    pub(super) fn from_frontier(frontier: &NonEmptyFrontier<Node>) -> Self {
        Self {
            position: u64::from(frontier.position()),
            ommers: frontier.ommers().to_vec(),
            filled: Vec::new(),
            cursor: None,
        }
    }

    /// Update the witness with a leaf appended to the tree after it.
    pub(super) fn append(&mut self, node: Node) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.append(node);

            if let Some(root) = cursor.complete_root() {
                self.filled.push(root);
                self.cursor = None;
            }

            return;
        }

        match self.next_height() {
            Some(0) => self.filled.push(node),
            Some(height) => {
                let mut cursor = Cursor::new(height);
                cursor.append(node);
                self.cursor = Some(cursor);
            }
            // Every right sibling is filled, so the tree is full.
            None => {}
        }
    }

    /// Returns the height of the next right sibling that is still empty.
    fn next_height(&self) -> Option<u8> {
        (0..MERKLE_DEPTH)
            .filter(|height| (self.position >> height) & 1 == 0)
            .nth(self.filled.len())
    }

    /// Returns the authentication path against the current `anchor` of a
    /// tree of depth `DEPTH`.
    pub(super) fn witness<const DEPTH: u8>(&self, anchor: Root) -> Witness {
        let mut ommers = self.ommers.iter();
        let mut filled = self.filled.iter();
        let mut cursor = self.cursor.as_ref().map(Cursor::root);

        let auth_path = (0..DEPTH)
            .map(|height| {
                if (self.position >> height) & 1 == 1 {
                    *ommers
                        .next()
                        .expect("the frontier has an ommer for each left sibling")
                } else if let Some(node) = filled.next() {
                    *node
                } else if let Some(node) = cursor.take() {
                    node
                } else {
                    empty_root(height)
                }
            })
            .collect();

        Witness {
            position: self.position,
            auth_path,
            anchor,
        }
    }
}

/// A partially filled subtree of height `height`.
///
/// `parents[h]` is a complete subtree of height `h` that is waiting for
/// its right sibling. `parents[height]` is the root, once every leaf is
/// appended.
#[derive(Clone, Debug)]
struct Cursor {
    height: u8,
    parents: Vec<Option<Node>>,
}

impl Cursor {
    fn new(height: u8) -> Self {
        Self {
            height,
            parents: vec![None; usize::from(height) + 1],
        }
    }

    fn append(&mut self, node: Node) {
        let mut carry = node;

        for (height, parent) in self.parents.iter_mut().enumerate() {
            match parent.take() {
                None => {
                    *parent = Some(carry);
                    return;
                }
                Some(left) => carry = combine(height as u8, &left, &carry),
            }
        }
    }

    fn complete_root(&self) -> Option<Node> {
        self.parents[usize::from(self.height)]
    }

    /// The root of the subtree, with empty leaves after the appended ones.
    fn root(&self) -> Node {
        if let Some(root) = self.complete_root() {
            return root;
        }

        let mut acc = None;
        for height in 0..self.height {
            acc = match (self.parents[usize::from(height)], acc) {
                (Some(left), Some(right)) => Some(combine(height, &left, &right)),
                (Some(left), None) => Some(combine(height, &left, &empty_root(height))),
                (None, Some(left)) => Some(combine(height, &left, &empty_root(height))),
                (None, None) => None,
            };
        }

        acc.unwrap_or_else(|| empty_root(self.height))
    }
}
