//! Union-Find (disjoint set) data structure used to group same-target
//! references into one logical target during a merge.
//!
//! [`crate::merge_pipeline`]'s target remapper (P4) unions every
//! `(file, local target ID)` pair that refers to a content-equal `Target`,
//! so that each connected component becomes exactly one row in the output
//! `OI_TARGET` table (SPEC_FULL.md §4.4).
//!
//! Path compression uses iterative path-halving: during [`UnionFind::find`] each
//! visited node is pointed directly at its grandparent, halving the path length
//! without needing a second pass or recursion. Union-by-rank keeps trees shallow;
//! when ranks are equal the **lower ordinal** becomes the root, ensuring that
//! [`UnionFind::find`] returns a deterministic representative regardless of
//! operation order (required for commutativity).

/// A union-find (disjoint set) structure with path-halving and union-by-rank.
///
/// Each element is identified by a `usize` ordinal in `[0, n)` where `n` is
/// the number of elements supplied at construction time.
///
/// # Determinism
///
/// When two sets of equal rank are merged, the lower ordinal is chosen as the
/// new root. This guarantees that `find` returns the same representative for
/// any given merge history, independent of the order in which `union` is called.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates a new `UnionFind` with `n` singleton sets.
    ///
    /// Each element `i` is initially its own representative (`parent[i] == i`,
    /// `rank[i] == 0`).
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0u8; n],
        }
    }

    /// Returns the representative of the set containing `x`.
    ///
    /// Uses iterative path-halving: each node visited during the traversal is
    /// linked directly to its grandparent. This achieves the inverse-Ackermann
    /// amortized bound without recursion.
    ///
    /// # Panics
    ///
    /// Does not panic. If `x >= n` the caller has a logic error; however this
    /// function will still terminate (with an out-of-bounds index panic from the
    /// Vec, which is acceptable for a logic error in the caller).
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merges the sets containing `a` and `b`.
    ///
    /// Uses union-by-rank. When ranks are equal, the **lower ordinal** becomes
    /// the new root, providing a deterministic tie-break for commutativity.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);

        if ra == rb {
            return;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => {
                self.parent[ra] = rb;
            }
            std::cmp::Ordering::Greater => {
                self.parent[rb] = ra;
            }
            std::cmp::Ordering::Equal => {
                if ra < rb {
                    self.parent[rb] = ra;
                    self.rank[ra] += 1;
                } else {
                    self.parent[ra] = rb;
                    self.rank[rb] += 1;
                }
            }
        }
    }

    /// Returns the number of elements in this `UnionFind`.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` if this `UnionFind` contains no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}
