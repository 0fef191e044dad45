// Block index over the source buffer.
//
// The source is partitioned into N = len/W non-overlapping W-byte blocks;
// block k occupies bytes [k*W, k*W + W). Each block hashes into one of N
// slots, with same-slot blocks linked through a collision chain. Blocks
// are inserted in ascending order and pushed onto the chain head, so a
// probe sees the highest source offsets first.
//
// The index never compares bytes: a probe can surface false positives,
// which the encoder eliminates with an exact window comparison.

use super::rolling::hash_once;

/// Chain terminator.
const EMPTY: i32 = -1;

/// Hash-to-block index over non-overlapping source blocks.
pub struct BlockIndex {
    /// Slot heads: `landmark[h % N]` is the most recently inserted block
    /// whose window hash lands in that slot, or -1.
    landmark: Vec<i32>,
    /// Chain links: `collide[k]` is the next block in k's slot, or -1.
    collide: Vec<i32>,
}

impl BlockIndex {
    /// Index `source` in W-byte blocks. The caller guarantees
    /// `source.len() > window`, so at least one full block exists.
    pub fn build(source: &[u8], window: usize) -> Self {
        let nblocks = source.len() / window;
        let mut landmark = vec![EMPTY; nblocks];
        let mut collide = vec![EMPTY; nblocks];
        for k in 0..nblocks {
            let start = k * window;
            let hv = hash_once(&source[start..start + window]) as usize % nblocks;
            collide[k] = landmark[hv];
            landmark[hv] = k as i32;
        }
        Self { landmark, collide }
    }

    /// Head of the chain for hash `h`, or `None` if the slot is empty.
    #[inline]
    pub fn probe(&self, h: u32) -> Option<usize> {
        let slot = h as usize % self.landmark.len();
        match self.landmark[slot] {
            EMPTY => None,
            k => Some(k as usize),
        }
    }

    /// Next block in `k`'s collision chain, or `None` at the end.
    #[inline]
    pub fn next(&self, k: usize) -> Option<usize> {
        match self.collide[k] {
            EMPTY => None,
            n => Some(n as usize),
        }
    }

    /// Number of indexed blocks (equal to the number of slots).
    pub fn blocks(&self) -> usize {
        self.collide.len()
    }
}
