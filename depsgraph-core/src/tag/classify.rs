//! Change-kind classification.
//!
//! Maps a single change-kind bit on a datablock to the component, and
//! optionally the single operation, it invalidates. The mapping is static
//! and never looks at a graph.

use crate::graph::{ComponentType, OperationCode};
use crate::id::{Datablock, IdKind, ObjectType, Recalc};

/// Classify a single change-kind bit on a datablock.
///
/// Returns [`ComponentType::Undefined`] when the datablock kind has no
/// component for the change; callers skip such bits. The zero change-kind
/// is handled separately and classifies to the whole ID.
pub fn classify(id: &Datablock, flag: Recalc) -> (ComponentType, OperationCode) {
    classify_kind(id.kind(), id.object_type(), flag)
}

/// [`classify`] on the kind and object sub-type alone.
pub fn classify_kind(kind: IdKind, object_type: ObjectType, flag: Recalc) -> (ComponentType, OperationCode) {
    use ComponentType as C;
    use OperationCode as Op;

    if flag.is_empty() {
        return (C::IdRef, Op::Operation);
    }
    debug_assert_eq!(flag.bits().count_ones(), 1, "classify takes one bit at a time, got {flag}");

    let whole = |component| (component, Op::Operation);
    if flag == Recalc::TRANSFORM {
        whole(C::Transform)
    } else if flag == Recalc::GEOMETRY {
        whole(geometry_component(kind, object_type))
    } else if flag == Recalc::ANIMATION {
        whole(C::Animation)
    } else if Recalc::PSYS_ALL.contains(flag) {
        match kind {
            IdKind::ParticleSettings => (C::ParticleSettings, particle_settings_operation(flag)),
            _ => whole(C::ParticleSystem),
        }
    } else if flag == Recalc::SHADING {
        match kind {
            IdKind::NodeTree => whole(C::ShadingParameters),
            _ => whole(C::Shading),
        }
    } else if flag == Recalc::SELECT {
        select_component(kind, true)
    } else if flag == Recalc::BASE_FLAGS {
        select_component(kind, false)
    } else if flag == Recalc::POINT_CACHE {
        whole(C::PointCache)
    } else if flag == Recalc::COPY_ON_WRITE {
        whole(C::CopyOnWrite)
    } else if flag == Recalc::SEQUENCER_STRIPS {
        whole(C::Sequencer)
    } else if Recalc::AUDIO.contains(flag) {
        whole(C::Audio)
    } else if flag == Recalc::PARAMETERS || flag == Recalc::SOURCE {
        whole(C::Parameters)
    } else {
        // EDITORS has no component; unknown bits are not ours to judge.
        whole(C::Undefined)
    }
}

fn geometry_component(kind: IdKind, object_type: ObjectType) -> ComponentType {
    match kind {
        IdKind::Object => match object_type {
            ObjectType::Mesh
            | ObjectType::Curve
            | ObjectType::Surface
            | ObjectType::Font
            | ObjectType::Lattice
            | ObjectType::MetaBall
            | ObjectType::GreasePencil => ComponentType::Geometry,
            ObjectType::Armature => ComponentType::EvalPose,
            _ => ComponentType::Undefined,
        },
        IdKind::Mesh | IdKind::Curve | IdKind::Lattice | IdKind::MetaBall | IdKind::GreasePencil => {
            ComponentType::Geometry
        }
        IdKind::LightProbe | IdKind::Palette | IdKind::Mask => ComponentType::Parameters,
        _ => ComponentType::Undefined,
    }
}

fn particle_settings_operation(flag: Recalc) -> OperationCode {
    if flag == Recalc::PSYS_RESET {
        OperationCode::ParticleSettingsReset
    } else {
        // Redo, child and physics changes re-run the settings evaluation.
        OperationCode::ParticleSettingsEval
    }
}

/// Selection and base flags of a datablock.
///
/// Scenes flush base flags to every object through the view layer; objects
/// update their own base flags; geometry redraws its selection.
fn select_component(kind: IdKind, is_select: bool) -> (ComponentType, OperationCode) {
    match kind {
        IdKind::Scene => (ComponentType::LayerCollections, OperationCode::ViewLayerEval),
        IdKind::Object => (ComponentType::ObjectFromLayer, OperationCode::ObjectBaseFlags),
        IdKind::MovieClip if is_select => (ComponentType::BatchCache, OperationCode::MovieClipSelectUpdate),
        kind if kind.is_selectable_geometry() => (ComponentType::BatchCache, OperationCode::GeometrySelectUpdate),
        _ => (ComponentType::CopyOnWrite, OperationCode::CopyOnWrite),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_single_bits() -> Vec<Recalc> {
        Recalc::all().single_bits().collect()
    }

    #[test]
    fn classification_is_total() {
        let object_types = [
            ObjectType::Empty,
            ObjectType::Mesh,
            ObjectType::Armature,
            ObjectType::Camera,
            ObjectType::GreasePencil,
        ];
        for kind in IdKind::ALL {
            for object_type in object_types {
                for flag in named_single_bits() {
                    let (component, operation) = classify_kind(kind, object_type, flag);
                    // Either the sentinel or a component with static info.
                    assert!(
                        component == ComponentType::Undefined || component.info().is_some(),
                        "{kind:?}/{flag} classified to {component:?}"
                    );
                    if component == ComponentType::Undefined {
                        assert_eq!(operation, OperationCode::Operation);
                    }
                }
            }
        }
    }

    #[test]
    fn zero_classifies_to_whole_id() {
        assert_eq!(
            classify_kind(IdKind::Mesh, ObjectType::Empty, Recalc::empty()),
            (ComponentType::IdRef, OperationCode::Operation)
        );
    }

    #[test]
    fn object_geometry_follows_sub_type() {
        let geometry = |object_type| classify_kind(IdKind::Object, object_type, Recalc::GEOMETRY).0;
        assert_eq!(geometry(ObjectType::Mesh), ComponentType::Geometry);
        assert_eq!(geometry(ObjectType::Font), ComponentType::Geometry);
        assert_eq!(geometry(ObjectType::GreasePencil), ComponentType::Geometry);
        assert_eq!(geometry(ObjectType::Armature), ComponentType::EvalPose);
        assert_eq!(geometry(ObjectType::Camera), ComponentType::Undefined);
    }

    #[test]
    fn data_geometry() {
        let geometry = |kind| classify_kind(kind, ObjectType::Empty, Recalc::GEOMETRY).0;
        assert_eq!(geometry(IdKind::Mesh), ComponentType::Geometry);
        assert_eq!(geometry(IdKind::Lattice), ComponentType::Geometry);
        assert_eq!(geometry(IdKind::Palette), ComponentType::Parameters);
        assert_eq!(geometry(IdKind::ParticleSettings), ComponentType::Undefined);
        assert_eq!(geometry(IdKind::Material), ComponentType::Undefined);
    }

    #[test]
    fn particle_changes_split_by_owner() {
        let settings = |flag| classify_kind(IdKind::ParticleSettings, ObjectType::Empty, flag);
        assert_eq!(
            settings(Recalc::PSYS_RESET),
            (ComponentType::ParticleSettings, OperationCode::ParticleSettingsReset)
        );
        for flag in [Recalc::PSYS_REDO, Recalc::PSYS_CHILD, Recalc::PSYS_PHYS] {
            assert_eq!(
                settings(flag),
                (ComponentType::ParticleSettings, OperationCode::ParticleSettingsEval)
            );
        }

        assert_eq!(
            classify_kind(IdKind::Object, ObjectType::Mesh, Recalc::PSYS_REDO),
            (ComponentType::ParticleSystem, OperationCode::Operation)
        );
    }

    #[test]
    fn shading_split_by_node_tree() {
        assert_eq!(
            classify_kind(IdKind::NodeTree, ObjectType::Empty, Recalc::SHADING).0,
            ComponentType::ShadingParameters
        );
        assert_eq!(
            classify_kind(IdKind::Material, ObjectType::Empty, Recalc::SHADING).0,
            ComponentType::Shading
        );
    }

    #[test]
    fn selection_redirects() {
        let select = |kind| classify_kind(kind, ObjectType::Empty, Recalc::SELECT);
        assert_eq!(
            select(IdKind::Scene),
            (ComponentType::LayerCollections, OperationCode::ViewLayerEval)
        );
        assert_eq!(
            select(IdKind::Object),
            (ComponentType::ObjectFromLayer, OperationCode::ObjectBaseFlags)
        );
        assert_eq!(
            select(IdKind::Mesh),
            (ComponentType::BatchCache, OperationCode::GeometrySelectUpdate)
        );
        assert_eq!(
            select(IdKind::MovieClip),
            (ComponentType::BatchCache, OperationCode::MovieClipSelectUpdate)
        );
        assert_eq!(select(IdKind::Camera), (ComponentType::CopyOnWrite, OperationCode::CopyOnWrite));
    }

    #[test]
    fn base_flags_redirects() {
        let base_flags = |kind| classify_kind(kind, ObjectType::Empty, Recalc::BASE_FLAGS);
        assert_eq!(
            base_flags(IdKind::Object),
            (ComponentType::ObjectFromLayer, OperationCode::ObjectBaseFlags)
        );
        assert_eq!(
            base_flags(IdKind::MovieClip),
            (ComponentType::CopyOnWrite, OperationCode::CopyOnWrite)
        );
    }

    #[test]
    fn editors_and_unknown_bits_are_undefined() {
        assert_eq!(
            classify_kind(IdKind::Mesh, ObjectType::Empty, Recalc::EDITORS).0,
            ComponentType::Undefined
        );
        assert_eq!(
            classify_kind(IdKind::Mesh, ObjectType::Empty, Recalc::from_bits_retain(1 << 8)).0,
            ComponentType::Undefined
        );
    }

    #[test]
    fn audio_and_parameters() {
        for flag in Recalc::AUDIO.single_bits() {
            assert_eq!(classify_kind(IdKind::Sound, ObjectType::Empty, flag).0, ComponentType::Audio);
        }
        assert_eq!(
            classify_kind(IdKind::Text, ObjectType::Empty, Recalc::SOURCE).0,
            ComponentType::Parameters
        );
    }
}
