//! Tag propagation.
//!
//! Entry points that turn "this datablock changed in these ways" into marks
//! on the graph. A request is decomposed into single change-kind bits, each
//! classified and applied to the datablock's node independently.
//!
//! # Algorithm
//!
//! For one datablock and flag mask:
//!
//! 1. Look up the node (absence is fine) and mark the datablock's kind as updated
//! 2. A zero mask goes to the zero handler and stops there
//! 3. OR the mask into the datablock's recalc mask, and its twin's
//! 4. Classify and tag every set bit, lowest first
//! 5. Geometry or zero on objects and geometry data also zero-tags the
//!    object data or shape keys
//! 6. User edits invalidate point caches, unless only shading changed
//! 7. An embedded node tree gets the same mask
//!
//! Steps 5 and 7 queue further datablocks on a work-list instead of recursing.

use std::sync::Arc;

use smallvec::{smallvec, SmallVec};
use tracing::{info, warn};

use super::classify::classify;
use super::zero::tag_node_zero;
use crate::config::DebugFlags;
use crate::graph::{Depsgraph, IdNodeIndex};
use crate::id::{Datablock, IdKind, Recalc, UpdateSource};

/// Datablocks still to be tagged, with the mask to tag them with.
pub(crate) type Worklist = SmallVec<[(Arc<Datablock>, Recalc); 4]>;

/// Tag a datablock in a graph, or only on the datablock itself when `graph`
/// is `None`.
///
/// An empty `flags` mask is the zero change-kind: invalidate the node
/// broadly without decomposing anything.
pub fn graph_id_tag_update(
    mut graph: Option<&mut Depsgraph>,
    id: &Arc<Datablock>,
    flags: Recalc,
    source: UpdateSource,
) {
    let mut pending: Worklist = smallvec![(Arc::clone(id), flags)];
    while let Some((id, flags)) = pending.pop() {
        tag_id(graph.as_deref_mut(), &id, flags, source, &mut pending);
    }
}

impl Depsgraph {
    /// Tag a datablock in this graph as changed by a user edit.
    pub fn id_tag_update(&mut self, id: &Arc<Datablock>, flags: Recalc) {
        graph_id_tag_update(Some(self), id, flags, UpdateSource::UserEdit);
    }

    /// Tag a datablock in this graph with an explicit update source.
    pub fn id_tag_update_with_source(&mut self, id: &Arc<Datablock>, flags: Recalc, source: UpdateSource) {
        graph_id_tag_update(Some(self), id, flags, source);
    }

    /// Mark that some datablock of the given kind changed.
    ///
    /// Node trees are embedded in materials, textures, lamps, worlds and
    /// scenes, so passes over those kinds must not skip a node tree change.
    pub fn tag_id_type(&mut self, kind: IdKind) {
        if kind == IdKind::NodeTree {
            for owner in IdKind::ALL.into_iter().filter(|owner| owner.may_embed_node_tree()) {
                self.id_type_updated.insert(owner.into());
            }
        }
        self.id_type_updated.insert(kind.into());
    }
}

fn tag_id(
    mut graph: Option<&mut Depsgraph>,
    id: &Arc<Datablock>,
    flags: Recalc,
    source: UpdateSource,
    pending: &mut Worklist,
) {
    let debug = graph
        .as_deref()
        .map_or_else(DebugFlags::process_default, Depsgraph::debug_flags);

    if let Some(graph) = graph.as_deref() {
        if graph.is_evaluating() {
            if debug.contains(DebugFlags::EVAL) {
                warn!(
                    "graph_id_tag_update: id={} tagged during evaluation of {}, ignoring",
                    id.name(),
                    graph.name()
                );
            }
            return;
        }
    }
    if debug.contains(DebugFlags::TAG) {
        info!(
            target: "depsgraph::tag",
            "graph_id_tag_update: id={} flags={} source={}",
            id.name(),
            flags,
            source
        );
    }

    let node = graph.as_deref().and_then(|graph| graph.find_id_node_index(id.id()));
    if let Some(graph) = graph.as_deref_mut() {
        graph.tag_id_type(id.kind());
    }

    if flags.is_empty() {
        if let Some(graph) = graph {
            tag_node_zero(graph, node, source, pending);
        }
        return;
    }

    id.recalc_insert(flags);
    if let (Some(graph), Some(node)) = (graph.as_deref_mut(), node) {
        if let Some(id_node) = graph.id_node_mut(node) {
            id_node.id_cow().recalc_insert(flags);
            if source == UpdateSource::UserEdit {
                id_node.mark_user_modified();
            }
        }
    }

    for flag in flags.single_bits() {
        tag_single_flag(graph.as_deref_mut(), id, node, flag, source);
    }

    push_legacy_compat(id, flags, pending);

    // Anything but a pure shading edit invalidates simulated caches.
    if source == UpdateSource::UserEdit && flags != Recalc::SHADING {
        id.recalc_insert(Recalc::POINT_CACHE);
        tag_single_flag(graph.as_deref_mut(), id, node, Recalc::POINT_CACHE, source);
    }

    if let Some(node_tree) = id.node_tree() {
        pending.push((Arc::clone(node_tree), flags));
    }
}

fn tag_single_flag(
    graph: Option<&mut Depsgraph>,
    id: &Datablock,
    node: Option<IdNodeIndex>,
    flag: Recalc,
    source: UpdateSource,
) {
    if flag == Recalc::EDITORS {
        if let Some(graph) = graph {
            graph.queue_editor_update(id.id());
        }
        return;
    }

    let (component, operation) = classify(id, flag);
    if !component.is_defined() {
        return;
    }
    let Some(info) = component.info() else {
        debug_assert!(false, "{flag} on {} classified to {component:?}, which has no component info", id.name());
        return;
    };
    let (Some(graph), Some(node)) = (graph, node) else {
        return;
    };
    // The evaluator reads what a component implies from the twin. The
    // original only records what was applied to it.
    if let Some(id_node) = graph.id_node(node) {
        id_node.id_cow().recalc_insert(info.id_recalc_tag);
    }
    graph.tag_component(node, component, operation, source);
}

/// Editing geometry of an object edits its data, and editing geometry data
/// edits its shape keys.
pub(crate) fn push_legacy_compat(id: &Datablock, flags: Recalc, pending: &mut Worklist) {
    if !(flags.is_empty() || flags == Recalc::GEOMETRY) {
        return;
    }
    if let Some(owned) = id.legacy_owned() {
        pending.push((Arc::clone(owned), Recalc::empty()));
    }
}
