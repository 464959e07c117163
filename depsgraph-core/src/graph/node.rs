//! Graph Nodes
//!
//! This module defines the node types that live in the dependency graph:
//! one [`IdNode`] per datablock, split into [`ComponentNode`]s, each of which
//! holds the [`OperationNode`]s the evaluator runs.
//!
//! Nodes are created by the graph builder and live as long as the graph.
//! Tagging only ever touches their update state.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::component::{ComponentMask, ComponentType, OperationCode};
use crate::id::{Datablock, UpdateSource};

bitflags::bitflags! {
    /// Update state of an operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperationFlags: u8 {
        /// The operation must run on the next evaluation.
        const NEEDS_UPDATE = 1 << 0;
        /// The update was requested by a user edit.
        const USER_MODIFIED = 1 << 1;
    }
}

/// Position of an ID node in its graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdNodeIndex(u32);

impl IdNodeIndex {
    pub(crate) fn new(position: usize) -> Self {
        debug_assert!(position <= u32::MAX as usize);
        Self(position as u32)
    }

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fully qualified address of an operation in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub id_node: IdNodeIndex,
    pub component: ComponentType,
    pub operation: OperationCode,
}

/// Operations tagged since the evaluator last drained them.
///
/// The evaluator flushes updates outwards from these entry points. Each
/// operation is recorded once no matter how often it is tagged.
#[derive(Debug, Default, Clone)]
pub struct EntryTags(IndexSet<OperationKey>);

impl EntryTags {
    pub(crate) fn insert(&mut self, key: OperationKey) -> bool {
        self.0.insert(key)
    }

    pub fn contains(&self, key: &OperationKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in tagging order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationKey> {
        self.0.iter()
    }

    pub(crate) fn take(&mut self) -> Vec<OperationKey> {
        std::mem::take(&mut self.0).into_iter().collect()
    }
}

/// The finest unit of work the evaluator runs.
#[derive(Debug)]
pub struct OperationNode {
    key: OperationKey,
    flags: OperationFlags,
}

impl OperationNode {
    fn new(key: OperationKey) -> Self {
        Self {
            key,
            flags: OperationFlags::empty(),
        }
    }

    pub fn key(&self) -> OperationKey {
        self.key
    }

    pub fn code(&self) -> OperationCode {
        self.key.operation
    }

    pub fn flags(&self) -> OperationFlags {
        self.flags
    }

    pub fn needs_update(&self) -> bool {
        self.flags.contains(OperationFlags::NEEDS_UPDATE)
    }

    /// Mark the operation as needing to re-run and record it as an entry point.
    pub fn tag_update(&mut self, tags: &mut EntryTags, source: UpdateSource) {
        self.flags |= OperationFlags::NEEDS_UPDATE;
        if source == UpdateSource::UserEdit {
            self.flags |= OperationFlags::USER_MODIFIED;
        }
        tags.insert(self.key);
    }

    /// Reset the update state once the operation ran.
    pub fn clear_tag(&mut self) {
        self.flags = OperationFlags::empty();
    }
}

/// An independently invalidated part of a datablock's evaluation.
#[derive(Debug)]
pub struct ComponentNode {
    owner: IdNodeIndex,
    component_type: ComponentType,
    needs_update: bool,
    operations: IndexMap<OperationCode, OperationNode>,
}

impl ComponentNode {
    fn new(owner: IdNodeIndex, component_type: ComponentType) -> Self {
        Self {
            owner,
            component_type,
            needs_update: false,
            operations: IndexMap::new(),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Add an operation, or return the existing one with the same code.
    pub fn add_operation(&mut self, code: OperationCode) -> &mut OperationNode {
        debug_assert_ne!(code, OperationCode::Operation, "whole-component sentinel is not an operation");
        let key = OperationKey {
            id_node: self.owner,
            component: self.component_type,
            operation: code,
        };
        self.operations
            .entry(code)
            .or_insert_with(|| OperationNode::new(key))
    }

    pub fn find_operation(&self, code: OperationCode) -> Option<&OperationNode> {
        self.operations.get(&code)
    }

    pub fn find_operation_mut(&mut self, code: OperationCode) -> Option<&mut OperationNode> {
        self.operations.get_mut(&code)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationNode> {
        self.operations.values()
    }

    pub fn needs_cow_before_update(&self) -> bool {
        self.component_type.needs_cow_before_update()
    }

    /// Whether the whole component was tagged.
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Mark the whole component, and every operation in it, as needing update.
    pub fn tag_update(&mut self, tags: &mut EntryTags, source: UpdateSource) {
        self.needs_update = true;
        for operation in self.operations.values_mut() {
            operation.tag_update(tags, source);
        }
    }

    /// Reset the update state of the component and its operations.
    pub fn clear_tags(&mut self) {
        self.needs_update = false;
        for operation in self.operations.values_mut() {
            operation.clear_tag();
        }
    }
}

/// The node of a single datablock.
///
/// Holds the original datablock, the graph's copy-on-write twin of it, and
/// the components the builder created for it.
#[derive(Debug)]
pub struct IdNode {
    index: IdNodeIndex,
    id_orig: Arc<Datablock>,
    id_cow: Datablock,
    cow_expanded: bool,
    components: IndexMap<ComponentType, ComponentNode>,

    /// Components that contribute to something visible.
    visible_components_mask: ComponentMask,

    /// `visible_components_mask` as of the last visibility reconciliation.
    previously_visible_components_mask: ComponentMask,

    is_user_modified: bool,
    is_cow_explicitly_tagged: bool,
}

impl IdNode {
    pub(crate) fn new(index: IdNodeIndex, id_orig: Arc<Datablock>) -> Self {
        let id_cow = id_orig.cow_twin();
        Self {
            index,
            id_orig,
            id_cow,
            cow_expanded: false,
            components: IndexMap::new(),
            visible_components_mask: ComponentMask::empty(),
            previously_visible_components_mask: ComponentMask::empty(),
            is_user_modified: false,
            is_cow_explicitly_tagged: false,
        }
    }

    pub fn index(&self) -> IdNodeIndex {
        self.index
    }

    /// The original datablock, as edited by the user.
    pub fn id_orig(&self) -> &Arc<Datablock> {
        &self.id_orig
    }

    /// The copy-on-write twin the evaluator works on.
    pub fn id_cow(&self) -> &Datablock {
        &self.id_cow
    }

    /// Whether the copy-on-write twin holds an expanded copy of the original.
    pub fn is_cow_expanded(&self) -> bool {
        self.cow_expanded
    }

    /// Called by the expansion collaborator once the twin is (re)built.
    pub fn set_cow_expanded(&mut self, expanded: bool) {
        self.cow_expanded = expanded;
    }

    /// Add a component, or return the existing one of the same type.
    pub fn add_component(&mut self, component_type: ComponentType) -> &mut ComponentNode {
        debug_assert!(
            component_type.info().is_some(),
            "sentinel {component_type:?} cannot be added as a component"
        );
        let owner = self.index;
        self.components
            .entry(component_type)
            .or_insert_with(|| ComponentNode::new(owner, component_type))
    }

    pub fn find_component(&self, component_type: ComponentType) -> Option<&ComponentNode> {
        self.components.get(&component_type)
    }

    pub fn find_component_mut(&mut self, component_type: ComponentType) -> Option<&mut ComponentNode> {
        self.components.get_mut(&component_type)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentNode> {
        self.components.values()
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut ComponentNode> {
        self.components.values_mut()
    }

    /// Components visible in the view layer.
    pub fn visible_components_mask(&self) -> ComponentMask {
        self.visible_components_mask
    }

    pub fn previously_visible_components_mask(&self) -> ComponentMask {
        self.previously_visible_components_mask
    }

    /// Set by the builder from what is visible in the view layer.
    pub fn set_visible_components_mask(&mut self, mask: ComponentMask) {
        self.visible_components_mask = mask;
    }

    pub(crate) fn sync_previously_visible(&mut self) {
        self.previously_visible_components_mask = self.visible_components_mask;
    }

    /// Whether a user edit tagged this node since the last clear.
    pub fn is_user_modified(&self) -> bool {
        self.is_user_modified
    }

    pub(crate) fn mark_user_modified(&mut self) {
        self.is_user_modified = true;
    }

    /// Whether the copy-on-write component was tagged directly since the last clear.
    pub fn is_cow_explicitly_tagged(&self) -> bool {
        self.is_cow_explicitly_tagged
    }

    pub(crate) fn mark_cow_explicitly_tagged(&mut self) {
        self.is_cow_explicitly_tagged = true;
    }

    /// Tag every component of the node.
    ///
    /// Relation rebuilds leave animation alone so unkeyed changes survive.
    pub fn tag_update(&mut self, tags: &mut EntryTags, source: UpdateSource) {
        for component in self.components.values_mut() {
            if component.component_type == ComponentType::Animation && source == UpdateSource::Relations {
                continue;
            }
            component.tag_update(tags, source);
        }
    }

    /// Reset the recalc masks of the original, the twin, and their embedded
    /// node trees, along with the per-pass node bookkeeping.
    pub(crate) fn clear_recalc(&mut self) {
        clear_id_recalc(&self.id_orig);
        clear_id_recalc(&self.id_cow);
        self.is_user_modified = false;
        self.is_cow_explicitly_tagged = false;
    }
}

fn clear_id_recalc(id: &Datablock) {
    id.clear_recalc();
    if let Some(node_tree) = id.node_tree() {
        node_tree.clear_recalc();
    }
}
