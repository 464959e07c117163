//! The Dependency Graph
//!
//! [`Depsgraph`] owns the ID nodes of one scene and view layer, plus the
//! per-graph tagging state: which datablock kinds were updated, which
//! operations were tagged, and what editors must be told about.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;

use super::node::{EntryTags, IdNode, IdNodeIndex, OperationKey};
use crate::config::{DebugFlags, DepsgraphConfig};
use crate::id::{Datablock, DatablockId, IdKind, IdKindSet};

/// A dependency graph.
///
/// Nodes live in an arena indexed by [`IdNodeIndex`], with a hash from
/// datablock identity to arena position for lookups.
#[derive(Debug)]
pub struct Depsgraph {
    config: DepsgraphConfig,

    /// All ID nodes, in creation order.
    pub(crate) id_nodes: Vec<IdNode>,

    /// Datablock identity to arena position.
    id_hash: HashMap<DatablockId, IdNodeIndex>,

    /// Kinds of datablocks tagged since the last clear.
    pub(crate) id_type_updated: IdKindSet,

    pub(crate) entry_tags: EntryTags,
    editor_updates: IndexSet<DatablockId>,

    need_update_relations: bool,
    need_update_time: bool,
    is_evaluating: bool,
}

impl Depsgraph {
    /// Create an empty graph with default configuration under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(DepsgraphConfig::new(name))
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: DepsgraphConfig) -> Self {
        Self {
            config,
            id_nodes: Vec::new(),
            id_hash: HashMap::new(),
            id_type_updated: IdKindSet::empty(),
            entry_tags: EntryTags::default(),
            editor_updates: IndexSet::new(),
            need_update_relations: false,
            need_update_time: false,
            is_evaluating: false,
        }
    }

    /// Graph name, used in logs.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Get the graph configuration.
    pub fn config(&self) -> &DepsgraphConfig {
        &self.config
    }

    /// Debug flags that gate tag and evaluation logging.
    pub fn debug_flags(&self) -> DebugFlags {
        self.config.debug
    }

    /// Replace the debug flags of this graph.
    pub fn set_debug_flags(&mut self, debug: DebugFlags) {
        self.config.debug = debug;
    }

    /// Add the node of a datablock, or return the existing one.
    pub fn add_id_node(&mut self, id: Arc<Datablock>) -> &mut IdNode {
        let index = match self.id_hash.get(&id.id()) {
            Some(index) => *index,
            None => {
                let index = IdNodeIndex::new(self.id_nodes.len());
                self.id_hash.insert(id.id(), index);
                self.id_nodes.push(IdNode::new(index, id));
                index
            }
        };
        &mut self.id_nodes[index.index()]
    }

    /// Find the node of a datablock.
    ///
    /// Absence is normal: the datablock may not be part of this graph, or
    /// may not be linked in until relations are rebuilt.
    pub fn find_id_node(&self, id: &Datablock) -> Option<&IdNode> {
        self.find_id_node_index(id.id()).map(|index| &self.id_nodes[index.index()])
    }

    /// Find the node of a datablock, mutably.
    pub fn find_id_node_mut(&mut self, id: &Datablock) -> Option<&mut IdNode> {
        let index = self.find_id_node_index(id.id())?;
        Some(&mut self.id_nodes[index.index()])
    }

    /// Find the arena index of a datablock's node.
    pub fn find_id_node_index(&self, id: DatablockId) -> Option<IdNodeIndex> {
        self.id_hash.get(&id).copied()
    }

    /// Get a node by arena index.
    pub fn id_node(&self, index: IdNodeIndex) -> Option<&IdNode> {
        self.id_nodes.get(index.index())
    }

    /// Get a node by arena index, mutably.
    pub fn id_node_mut(&mut self, index: IdNodeIndex) -> Option<&mut IdNode> {
        self.id_nodes.get_mut(index.index())
    }

    /// Iterate over all ID nodes in insertion order.
    pub fn id_nodes(&self) -> impl Iterator<Item = &IdNode> {
        self.id_nodes.iter()
    }

    /// Number of ID nodes.
    pub fn len(&self) -> usize {
        self.id_nodes.len()
    }

    /// Check if the graph has no ID nodes.
    pub fn is_empty(&self) -> bool {
        self.id_nodes.is_empty()
    }

    /// Borrow a node together with the entry tags it records into.
    pub(crate) fn node_and_tags_mut(&mut self, index: IdNodeIndex) -> Option<(&mut IdNode, &mut EntryTags)> {
        let node = self.id_nodes.get_mut(index.index())?;
        Some((node, &mut self.entry_tags))
    }

    /// Whether any datablock of the given kind was tagged since the last clear.
    pub fn id_type_updated(&self, kind: IdKind) -> bool {
        self.id_type_updated.contains(kind.into())
    }

    /// Whether any datablock at all was tagged since the last clear.
    pub fn id_type_any_updated(&self) -> bool {
        !self.id_type_updated.is_empty()
    }

    /// Kinds tagged since the last clear.
    pub fn updated_id_types(&self) -> IdKindSet {
        self.id_type_updated
    }

    /// Operations tagged since the entry tags were last drained.
    pub fn entry_tags(&self) -> &EntryTags {
        &self.entry_tags
    }

    /// Drain the tagged operations for evaluation.
    pub fn take_entry_tags(&mut self) -> Vec<OperationKey> {
        self.entry_tags.take()
    }

    pub(crate) fn queue_editor_update(&mut self, id: DatablockId) {
        self.editor_updates.insert(id);
    }

    /// Drain the datablocks editors must be notified about.
    pub fn take_editor_updates(&mut self) -> Vec<DatablockId> {
        std::mem::take(&mut self.editor_updates).into_iter().collect()
    }

    /// Request a rebuild of relations before the next evaluation.
    pub fn tag_relations_update(&mut self) {
        self.need_update_relations = true;
    }

    /// Whether relations must be rebuilt before the next evaluation.
    pub fn needs_relations_update(&self) -> bool {
        self.need_update_relations
    }

    /// Called by the builder once relations are rebuilt.
    pub fn clear_relations_update(&mut self) {
        self.need_update_relations = false;
    }

    /// Request re-evaluation of everything that depends on time.
    pub fn tag_time_update(&mut self) {
        self.need_update_time = true;
    }

    /// Whether time-dependent data must be re-evaluated.
    pub fn needs_time_update(&self) -> bool {
        self.need_update_time
    }

    /// Called by the evaluator once time-dependent data is up to date.
    pub fn clear_time_update(&mut self) {
        self.need_update_time = false;
    }

    /// Mark the graph as being evaluated. Tags are ignored meanwhile.
    pub fn set_evaluating(&mut self, evaluating: bool) {
        self.is_evaluating = evaluating;
    }

    /// Whether the graph is being evaluated.
    pub fn is_evaluating(&self) -> bool {
        self.is_evaluating
    }
}
