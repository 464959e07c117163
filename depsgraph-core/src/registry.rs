//! Graph Registry
//!
//! Every scene has one or more view layers, and each view layer may have a
//! dependency graph once something asked for it to be evaluated. The
//! registry owns all of them and provides the process-wide tagging entry
//! points: a tag request is applied to the datablock with no graph, then
//! repeated on every graph that has been built.
//!
//! View layers whose graph was never built are skipped. When their graph is
//! built later it starts out fully tagged anyway.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{DebugFlags, DepsgraphConfig};
use crate::error::{DepsgraphError, Result};
use crate::graph::Depsgraph;
use crate::id::{Datablock, DatablockId, IdKind, Recalc, UpdateSource};
use crate::tag::graph_id_tag_update;

#[derive(Debug)]
struct SceneEntry {
    scene: Arc<Datablock>,
    view_layers: IndexMap<String, Option<Depsgraph>>,
}

/// All scenes, their view layers, and the graphs built for them.
#[derive(Debug)]
pub struct GraphRegistry {
    scenes: IndexMap<DatablockId, SceneEntry>,

    /// Debug flags given to newly built graphs.
    debug: DebugFlags,
}

impl Default for GraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphRegistry {
    /// Empty registry. New graphs use the process-wide debug flags.
    pub fn new() -> Self {
        Self {
            scenes: IndexMap::new(),
            debug: DebugFlags::process_default(),
        }
    }

    /// Use the given debug flags for graphs built from now on.
    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    /// Register a scene. Fails for non-scenes and for scenes already added.
    pub fn add_scene(&mut self, scene: Arc<Datablock>) -> Result<()> {
        if scene.kind() != IdKind::Scene {
            return Err(DepsgraphError::NotAScene {
                name: scene.name().to_string(),
            });
        }
        if self.scenes.contains_key(&scene.id()) {
            return Err(DepsgraphError::DuplicateScene {
                name: scene.name().to_string(),
            });
        }

        self.scenes.insert(
            scene.id(),
            SceneEntry {
                scene,
                view_layers: IndexMap::new(),
            },
        );
        Ok(())
    }

    /// Iterate over registered scenes in insertion order.
    pub fn scenes(&self) -> impl Iterator<Item = &Arc<Datablock>> {
        self.scenes.values().map(|entry| &entry.scene)
    }

    /// Add a view layer to a scene. Its graph is built on first use.
    pub fn add_view_layer(&mut self, scene: DatablockId, layer: impl Into<String>) -> Result<()> {
        let entry = self
            .scenes
            .get_mut(&scene)
            .ok_or(DepsgraphError::SceneNotFound(scene))?;

        let layer = layer.into();
        if entry.view_layers.contains_key(&layer) {
            return Err(DepsgraphError::DuplicateViewLayer {
                scene: entry.scene.name().to_string(),
                layer,
            });
        }
        entry.view_layers.insert(layer, None);
        Ok(())
    }

    /// The graph of a view layer, built empty if it does not exist yet.
    pub fn ensure_graph(&mut self, scene: DatablockId, layer: &str) -> Result<&mut Depsgraph> {
        let debug = self.debug;
        let entry = self
            .scenes
            .get_mut(&scene)
            .ok_or(DepsgraphError::SceneNotFound(scene))?;

        let name = format!("{}/{}", entry.scene.name(), layer);
        let slot = entry
            .view_layers
            .get_mut(layer)
            .ok_or_else(|| DepsgraphError::ViewLayerNotFound {
                scene: entry.scene.name().to_string(),
                layer: layer.to_string(),
            })?;

        Ok(slot.get_or_insert_with(|| {
            debug!("Building graph {}", name);
            Depsgraph::with_config(DepsgraphConfig::new(name).with_debug(debug))
        }))
    }

    /// The graph of a view layer, if it was built.
    pub fn graph(&self, scene: DatablockId, layer: &str) -> Option<&Depsgraph> {
        self.scenes.get(&scene)?.view_layers.get(layer)?.as_ref()
    }

    /// The graph of a view layer, mutably, if it was built.
    pub fn graph_mut(&mut self, scene: DatablockId, layer: &str) -> Option<&mut Depsgraph> {
        self.scenes.get_mut(&scene)?.view_layers.get_mut(layer)?.as_mut()
    }

    /// Every built graph, scene by scene.
    pub fn graphs(&self) -> impl Iterator<Item = &Depsgraph> {
        self.scenes
            .values()
            .flat_map(|entry| entry.view_layers.values())
            .flatten()
    }

    /// Every built graph, mutably.
    pub fn graphs_mut(&mut self) -> impl Iterator<Item = &mut Depsgraph> {
        self.scenes
            .values_mut()
            .flat_map(|entry| entry.view_layers.values_mut())
            .flatten()
    }

    /// Tag a datablock as changed by a user edit, everywhere.
    pub fn tag_update(&mut self, id: &Arc<Datablock>, flags: Recalc) {
        self.tag_update_with_source(id, flags, UpdateSource::UserEdit);
    }

    /// Tag a datablock everywhere with an explicit update source.
    pub fn tag_update_with_source(&mut self, id: &Arc<Datablock>, flags: Recalc, source: UpdateSource) {
        graph_id_tag_update(None, id, flags, source);
        for graph in self.graphs_mut() {
            graph.id_tag_update_with_source(id, flags, source);
        }
    }

    /// Mark a datablock kind as updated in every graph.
    pub fn tag_id_type(&mut self, kind: IdKind) {
        for graph in self.graphs_mut() {
            graph.tag_id_type(kind);
        }
    }

    /// Reconcile visibility in every built graph.
    pub fn on_visible_update(&mut self) {
        for graph in self.graphs_mut() {
            graph.on_visible_update();
        }
    }

    /// Clear recalc masks in every built graph.
    pub fn clear_recalc(&mut self) {
        for graph in self.graphs_mut() {
            graph.clear_recalc();
        }
    }

    /// Request a relations rebuild in every built graph.
    pub fn tag_relations_update(&mut self) {
        for graph in self.graphs_mut() {
            graph.tag_relations_update();
        }
    }

    /// Request a time update in every built graph.
    pub fn tag_time_update(&mut self) {
        for graph in self.graphs_mut() {
            graph.tag_time_update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ComponentType;
    use crate::id::ObjectType;

    fn registry_with_layers(layers: &[&str]) -> (GraphRegistry, DatablockId) {
        let mut registry = GraphRegistry::new().with_debug(DebugFlags::empty());
        let scene = Datablock::new(IdKind::Scene, "Scene").into_shared();
        let scene_id = scene.id();
        registry.add_scene(scene).unwrap();
        for layer in layers {
            registry.add_view_layer(scene_id, *layer).unwrap();
        }
        (registry, scene_id)
    }

    #[test]
    fn rejects_bad_registrations() {
        let (mut registry, scene) = registry_with_layers(&["ViewLayer"]);

        let mesh = Datablock::new(IdKind::Mesh, "Cube").into_shared();
        assert!(matches!(registry.add_scene(mesh), Err(DepsgraphError::NotAScene { .. })));

        let duplicate = Arc::clone(registry.scenes().next().unwrap());
        assert!(matches!(
            registry.add_scene(duplicate),
            Err(DepsgraphError::DuplicateScene { .. })
        ));

        assert!(matches!(
            registry.add_view_layer(scene, "ViewLayer"),
            Err(DepsgraphError::DuplicateViewLayer { .. })
        ));
        assert!(matches!(
            registry.add_view_layer(DatablockId::from(u64::MAX), "ViewLayer"),
            Err(DepsgraphError::SceneNotFound(_))
        ));
        assert!(matches!(
            registry.ensure_graph(scene, "Missing"),
            Err(DepsgraphError::ViewLayerNotFound { .. })
        ));
    }

    #[test]
    fn graphs_are_built_lazily() {
        let (mut registry, scene) = registry_with_layers(&["ViewLayer", "Render"]);
        assert_eq!(registry.graphs().count(), 0);
        assert!(registry.graph(scene, "ViewLayer").is_none());

        registry.ensure_graph(scene, "ViewLayer").unwrap();
        registry.ensure_graph(scene, "ViewLayer").unwrap();

        assert_eq!(registry.graphs().count(), 1);
        assert_eq!(registry.graph(scene, "ViewLayer").unwrap().name(), "Scene/ViewLayer");
        assert_eq!(registry.graph(scene, "ViewLayer").unwrap().debug_flags(), DebugFlags::empty());
    }

    #[test]
    fn process_wide_tag_reaches_every_built_graph() {
        let (mut registry, scene) = registry_with_layers(&["ViewLayer", "Render", "Unused"]);
        let object = Datablock::object("Cube", ObjectType::Mesh).into_shared();
        for layer in ["ViewLayer", "Render"] {
            registry
                .ensure_graph(scene, layer)
                .unwrap()
                .add_id_node(Arc::clone(&object))
                .add_component(ComponentType::Transform);
        }

        registry.tag_update(&object, Recalc::TRANSFORM);

        assert!(object.recalc().contains(Recalc::TRANSFORM | Recalc::POINT_CACHE));
        for graph in registry.graphs() {
            let node = graph.find_id_node(&object).unwrap();
            assert!(node.find_component(ComponentType::Transform).unwrap().needs_update());
            assert!(graph.id_type_updated(IdKind::Object));
        }
    }

    #[test]
    fn fan_out_operations() {
        let (mut registry, scene) = registry_with_layers(&["ViewLayer", "Render"]);
        registry.ensure_graph(scene, "ViewLayer").unwrap();
        registry.ensure_graph(scene, "Render").unwrap();

        registry.tag_id_type(IdKind::Mesh);
        registry.tag_relations_update();
        registry.tag_time_update();
        for graph in registry.graphs() {
            assert!(graph.id_type_updated(IdKind::Mesh));
            assert!(graph.needs_relations_update());
            assert!(graph.needs_time_update());
        }

        registry.clear_recalc();
        assert!(registry.graphs().all(|graph| !graph.id_type_any_updated()));
    }
}
