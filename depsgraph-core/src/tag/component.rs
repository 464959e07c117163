//! Component tagging.
//!
//! Marks a single component, or one operation inside it, and cascades to the
//! copy-on-write component when the tagged component evaluates from the twin.

use crate::graph::{ComponentType, Depsgraph, EntryTags, IdNode, IdNodeIndex, OperationCode};
use crate::id::{Recalc, UpdateSource};

impl Depsgraph {
    /// Tag a component of a node, or a single operation when `operation` is
    /// not [`OperationCode::Operation`].
    ///
    /// Missing nodes, components and operations are skipped. As long as the
    /// component exists, the copy-on-write cascade runs even if the requested
    /// operation does not.
    pub fn tag_component(
        &mut self,
        node: IdNodeIndex,
        component_type: ComponentType,
        operation: OperationCode,
        source: UpdateSource,
    ) {
        let Some((id_node, tags)) = self.node_and_tags_mut(node) else {
            return;
        };
        let Some(component) = id_node.find_component_mut(component_type) else {
            return;
        };

        if operation == OperationCode::Operation {
            component.tag_update(tags, source);
        } else if let Some(operation) = component.find_operation_mut(operation) {
            operation.tag_update(tags, source);
        }

        if component.needs_cow_before_update() {
            tag_copy_on_write(id_node, tags, source);
        }
        if component_type == ComponentType::CopyOnWrite {
            id_node.mark_cow_explicitly_tagged();
        }
    }
}

/// Schedule re-expansion of the node's copy-on-write twin.
fn tag_copy_on_write(id_node: &mut IdNode, tags: &mut EntryTags, source: UpdateSource) {
    if let Some(cow) = id_node.find_component_mut(ComponentType::CopyOnWrite) {
        cow.tag_update(tags, source);
    }
    id_node.id_orig().recalc_insert(Recalc::COPY_ON_WRITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{Datablock, IdKind, ObjectType};

    fn object_graph() -> (Depsgraph, IdNodeIndex) {
        let mut graph = Depsgraph::new("test");
        let object = Datablock::object("Cube", ObjectType::Mesh).into_shared();
        let node = graph.add_id_node(object);
        node.add_component(ComponentType::Transform)
            .add_operation(OperationCode::TransformFinal);
        node.add_component(ComponentType::ObjectFromLayer)
            .add_operation(OperationCode::ObjectBaseFlags);
        node.add_component(ComponentType::CopyOnWrite)
            .add_operation(OperationCode::CopyOnWrite);
        let index = node.index();
        (graph, index)
    }

    fn component_tagged(graph: &Depsgraph, node: IdNodeIndex, ty: ComponentType) -> bool {
        graph.id_node(node).unwrap().find_component(ty).unwrap().needs_update()
    }

    #[test]
    fn whole_component_cascades_to_cow() {
        let (mut graph, node) = object_graph();

        graph.tag_component(node, ComponentType::Transform, OperationCode::Operation, UpdateSource::UserEdit);

        assert!(component_tagged(&graph, node, ComponentType::Transform));
        assert!(component_tagged(&graph, node, ComponentType::CopyOnWrite));
        let id_node = graph.id_node(node).unwrap();
        assert!(id_node.id_orig().recalc().contains(Recalc::COPY_ON_WRITE));
        assert!(!id_node.is_cow_explicitly_tagged());
    }

    #[test]
    fn single_operation_is_tagged_alone() {
        let (mut graph, node) = object_graph();

        graph.tag_component(
            node,
            ComponentType::ObjectFromLayer,
            OperationCode::ObjectBaseFlags,
            UpdateSource::UserEdit,
        );

        let id_node = graph.id_node(node).unwrap();
        let component = id_node.find_component(ComponentType::ObjectFromLayer).unwrap();
        assert!(!component.needs_update());
        assert!(component.find_operation(OperationCode::ObjectBaseFlags).unwrap().needs_update());

        // Base flags do not evaluate from the copy-on-write twin.
        assert!(!component_tagged(&graph, node, ComponentType::CopyOnWrite));
        assert!(id_node.id_orig().recalc().is_empty());
    }

    #[test]
    fn missing_operation_still_cascades() {
        let (mut graph, node) = object_graph();

        graph.tag_component(node, ComponentType::Transform, OperationCode::TransformLocal, UpdateSource::Time);

        assert!(!component_tagged(&graph, node, ComponentType::Transform));
        assert!(component_tagged(&graph, node, ComponentType::CopyOnWrite));
    }

    #[test]
    fn missing_component_is_skipped() {
        let (mut graph, node) = object_graph();

        graph.tag_component(node, ComponentType::Geometry, OperationCode::Operation, UpdateSource::UserEdit);

        assert!(graph.entry_tags().is_empty());
        assert!(graph.id_node(node).unwrap().id_orig().recalc().is_empty());
    }

    #[test]
    fn direct_cow_tag_is_explicit() {
        let (mut graph, node) = object_graph();

        graph.tag_component(node, ComponentType::CopyOnWrite, OperationCode::Operation, UpdateSource::UserEdit);

        let id_node = graph.id_node(node).unwrap();
        assert!(id_node.is_cow_explicitly_tagged());
        assert!(component_tagged(&graph, node, ComponentType::CopyOnWrite));
    }

    #[test]
    fn cascade_without_cow_component_still_sets_recalc() {
        let mut graph = Depsgraph::new("test");
        let mesh = Datablock::new(IdKind::Mesh, "Cube").into_shared();
        let node = graph.add_id_node(mesh);
        node.add_component(ComponentType::Geometry);
        let index = node.index();

        graph.tag_component(index, ComponentType::Geometry, OperationCode::Operation, UpdateSource::Time);

        let id_node = graph.id_node(index).unwrap();
        assert!(id_node.id_orig().recalc().contains(Recalc::COPY_ON_WRITE));
    }
}
