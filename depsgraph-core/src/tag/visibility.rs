//! Visibility reconciliation.
//!
//! Nodes whose visible components changed since the last pass are re-tagged
//! so that newly visible data gets evaluated.

use std::sync::Arc;

use super::propagate::graph_id_tag_update;
use crate::graph::{Depsgraph, IdNodeIndex};
use crate::id::{IdKind, Recalc, UpdateSource};

impl Depsgraph {
    /// Re-tag every node whose visibility changed since the previous call.
    ///
    /// Nodes that are not visible at all are skipped and keep their
    /// previous mask, so they are picked up once they become visible.
    pub fn on_visible_update(&mut self) {
        for position in 0..self.id_nodes.len() {
            let node = &self.id_nodes[position];
            let visible = node.visible_components_mask();
            if visible.is_empty() || visible == node.previously_visible_components_mask() {
                continue;
            }

            let mut flags = Recalc::empty();
            if !node.is_cow_expanded() {
                flags |= Recalc::COPY_ON_WRITE | Recalc::ANIMATION;
            }
            let id = Arc::clone(node.id_orig());
            if id.kind() == IdKind::Object {
                flags |= Recalc::TRANSFORM | Recalc::GEOMETRY;
            }

            graph_id_tag_update(Some(self), &id, flags, UpdateSource::Visibility);

            // Scenes carry view layer state that no flag above reaches.
            if id.kind() == IdKind::Scene {
                if let Some((node, tags)) = self.node_and_tags_mut(IdNodeIndex::new(position)) {
                    node.tag_update(tags, UpdateSource::Visibility);
                }
            }
            self.id_nodes[position].sync_previously_visible();
        }
    }
}
