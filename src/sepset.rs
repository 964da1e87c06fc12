//! Separating-set cache.
//!
//! Maps an unordered node pair to the conditioning set most recently found
//! to separate them. Purely a memoization aid: entries are overwritten when
//! a fresh search recomputes them, and absence means only "not cached".

use crate::graph::NodeId;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct SepsetMap {
    map: FxHashMap<(NodeId, NodeId), Vec<NodeId>>,
}

impl SepsetMap {
    pub fn new() -> Self {
        SepsetMap::default()
    }

    fn key(x: NodeId, y: NodeId) -> (NodeId, NodeId) {
        if x <= y {
            (x, y)
        } else {
            (y, x)
        }
    }

    pub fn get(&self, x: NodeId, y: NodeId) -> Option<&[NodeId]> {
        self.map.get(&Self::key(x, y)).map(Vec::as_slice)
    }

    pub fn set(&mut self, x: NodeId, y: NodeId, sepset: Vec<NodeId>) {
        self.map.insert(Self::key(x, y), sepset);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
