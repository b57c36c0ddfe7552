//! Local view of notarized blocks.

use crate::types::{Block, BlockId};
use std::collections::HashMap;

/// Arena of notarized blocks linked parent to child.
///
/// The first block inserted is the root. Every later block is linked to its parent if the
/// parent is already notarized, otherwise it stays unlinked (and is not part of any chain
/// reachable from the root). Because a parent is always inserted before its children,
/// insertion order is a topological order.
#[derive(Default)]
pub struct Notarized {
    blocks: HashMap<BlockId, Block>,
    order: Vec<BlockId>,
    children: HashMap<BlockId, Vec<BlockId>>,

    /// Number of edges on the longest path ending at each block.
    depths: HashMap<BlockId, usize>,
}

impl Notarized {
    /// Insert a notarized block, returning `false` if it was already present.
    pub fn insert(&mut self, block: Block) -> bool {
        let id = block.id;
        if self.blocks.contains_key(&id) {
            return false;
        }
        let mut depth = 0;
        if let Some(parent) = block.parent {
            if let Some(parent_depth) = self.depths.get(&parent) {
                depth = parent_depth + 1;
                self.children.entry(parent).or_default().push(id);
            }
        }
        self.depths.insert(id, depth);
        self.order.push(id);
        self.blocks.insert(id, block);
        true
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The first block notarized.
    pub fn root(&self) -> Option<&Block> {
        self.order.first().and_then(|id| self.blocks.get(id))
    }

    /// Last block of the longest path (by edge count), preferring the earliest notarized
    /// block on ties.
    pub fn head(&self) -> Option<&Block> {
        let mut head: Option<(&BlockId, usize)> = None;
        for id in &self.order {
            let depth = self.depths.get(id).copied().unwrap_or_default();
            match head {
                Some((_, best)) if depth <= best => {}
                _ => head = Some((id, depth)),
            }
        }
        head.and_then(|(id, _)| self.blocks.get(id))
    }

    /// Every path from the root to a leaf, ordered root first.
    pub fn chains(&self) -> Vec<Vec<&Block>> {
        let mut chains = Vec::new();
        if let Some(root) = self.order.first() {
            let mut path = Vec::new();
            self.walk(root, &mut path, &mut chains);
        }
        chains
    }

    fn walk<'a>(
        &'a self,
        id: &BlockId,
        path: &mut Vec<&'a Block>,
        chains: &mut Vec<Vec<&'a Block>>,
    ) {
        let Some(block) = self.blocks.get(id) else {
            return;
        };
        path.push(block);
        match self.children.get(id) {
            Some(children) => {
                for child in children {
                    self.walk(child, path, chains);
                }
            }
            None => chains.push(path.clone()),
        }
        path.pop();
    }
}
