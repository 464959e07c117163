//! The zero change-kind.
//!
//! An empty mask means "something changed". Every component of the node is
//! tagged except animation, which would otherwise discard unkeyed edits.

use std::sync::Arc;

use super::propagate::{push_legacy_compat, Worklist};
use crate::graph::{ComponentType, Depsgraph, IdNodeIndex};
use crate::id::{Recalc, UpdateSource};

/// Tag every component of a node directly. The zero mask already holds the
/// copy-on-write bit, so no cascade runs and the twin is not marked as
/// explicitly tagged.
pub(crate) fn tag_node_zero(
    graph: &mut Depsgraph,
    node: Option<IdNodeIndex>,
    source: UpdateSource,
    pending: &mut Worklist,
) {
    let Some((id_node, tags)) = node.and_then(|node| graph.node_and_tags_mut(node)) else {
        return;
    };
    let id = Arc::clone(id_node.id_orig());

    let flags = Recalc::zero_invalidation();
    id.recalc_insert(flags);
    id_node.id_cow().recalc_insert(flags);

    for component in id_node.components_mut() {
        if component.component_type() != ComponentType::Animation {
            component.tag_update(tags, source);
        }
    }

    push_legacy_compat(&id, Recalc::empty(), pending);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::OperationCode;
    use crate::id::{Datablock, IdKind};

    #[test]
    fn tags_everything_but_animation() {
        let mut graph = Depsgraph::new("test");
        let mesh = Datablock::new(IdKind::Mesh, "Cube").into_shared();
        let node = graph.add_id_node(Arc::clone(&mesh));
        node.add_component(ComponentType::Geometry)
            .add_operation(OperationCode::GeometryEval);
        node.add_component(ComponentType::Animation)
            .add_operation(OperationCode::AnimationEval);
        node.add_component(ComponentType::Parameters)
            .add_operation(OperationCode::ParametersEval);
        let index = node.index();

        let mut pending = Worklist::new();
        tag_node_zero(&mut graph, Some(index), UpdateSource::UserEdit, &mut pending);

        let node = graph.id_node(index).unwrap();
        assert!(node.find_component(ComponentType::Geometry).unwrap().needs_update());
        assert!(node.find_component(ComponentType::Parameters).unwrap().needs_update());
        assert!(!node.find_component(ComponentType::Animation).unwrap().needs_update());
        assert_eq!(graph.entry_tags().len(), 2);

        let recalc = mesh.recalc();
        assert!(recalc.contains(Recalc::GEOMETRY | Recalc::TRANSFORM | Recalc::COPY_ON_WRITE));
        assert!(!recalc.intersects(Recalc::PSYS_ALL | Recalc::ANIMATION));
        assert_eq!(node.id_cow().recalc(), Recalc::zero_invalidation());
        assert!(pending.is_empty());
    }

    #[test]
    fn twin_is_not_explicitly_tagged() {
        let mut graph = Depsgraph::new("test");
        let mesh = Datablock::new(IdKind::Mesh, "Cube").into_shared();
        let node = graph.add_id_node(Arc::clone(&mesh));
        node.add_component(ComponentType::Geometry)
            .add_operation(OperationCode::GeometryEval);
        node.add_component(ComponentType::CopyOnWrite)
            .add_operation(OperationCode::CopyOnWrite);
        let index = node.index();

        let mut pending = Worklist::new();
        tag_node_zero(&mut graph, Some(index), UpdateSource::UserEdit, &mut pending);

        let node = graph.id_node(index).unwrap();
        assert!(node.find_component(ComponentType::CopyOnWrite).unwrap().needs_update());
        assert!(!node.is_cow_explicitly_tagged());
        assert!(mesh.recalc().contains(Recalc::COPY_ON_WRITE));
        assert_eq!(graph.entry_tags().len(), 2);
    }

    #[test]
    fn queues_shape_keys() {
        let mut graph = Depsgraph::new("test");
        let key = Datablock::new(IdKind::Key, "Key").into_shared();
        let mesh = Datablock::new(IdKind::Mesh, "Cube")
            .with_shape_key(Arc::clone(&key))
            .into_shared();
        let index = graph.add_id_node(mesh).index();

        let mut pending = Worklist::new();
        tag_node_zero(&mut graph, Some(index), UpdateSource::UserEdit, &mut pending);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0.id(), key.id());
        assert!(pending[0].1.is_empty());
    }

    #[test]
    fn absent_node_is_noop() {
        let mut graph = Depsgraph::new("test");
        let mut pending = Worklist::new();

        tag_node_zero(&mut graph, None, UpdateSource::UserEdit, &mut pending);

        assert!(graph.entry_tags().is_empty());
        assert!(pending.is_empty());
    }
}
