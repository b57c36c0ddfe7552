//! Inspect what a population finalized after a run.
//!
//! Safety holds if the finalized blocks of all (honest) nodes form at most one chain.

use crate::{
    types::{Block, BlockId},
    Node,
};
use std::collections::{HashMap, HashSet};

/// Union of several finalized lists, deduplicated and sorted by epoch.
pub fn finalized_union<'a>(lists: impl IntoIterator<Item = &'a [Block]>) -> Vec<Block> {
    let mut seen = HashSet::new();
    let mut union = Vec::new();
    for list in lists {
        for block in list {
            if seen.insert(block) {
                union.push(block.clone());
            }
        }
    }
    union.sort_by_key(|block| block.epoch);
    union
}

/// Every root-to-leaf path through the parent links of `blocks`.
///
/// Roots are blocks whose parent is not part of `blocks`. Leaves are blocks no other block
/// extends.
pub fn chains(blocks: &[Block]) -> Vec<Vec<Block>> {
    let ids: HashSet<BlockId> = blocks.iter().map(|block| block.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<BlockId, Vec<&Block>> = HashMap::new();
    for block in blocks {
        match block.parent {
            Some(parent) if parent != block.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(block);
            }
            _ => roots.push(block),
        }
    }

    let mut chains = Vec::new();
    for root in roots {
        let mut stack = vec![vec![root]];
        while let Some(path) = stack.pop() {
            let Some(tip) = path.last() else {
                continue;
            };
            match children.get(&tip.id) {
                Some(next) => {
                    for child in next.iter().rev() {
                        let mut extended = path.clone();
                        extended.push(*child);
                        stack.push(extended);
                    }
                }
                None => chains.push(path.into_iter().cloned().collect()),
            }
        }
    }
    chains
}

/// Chains formed by everything `nodes` finalized.
pub fn finalized_chains<N: Node>(nodes: &[N]) -> Vec<Vec<Block>> {
    chains(&finalized_union(nodes.iter().map(|node| node.finalized())))
}
