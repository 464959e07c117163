//! Component and Operation Types
//!
//! Static description of the node taxonomy: which components a datablock
//! can be split into, which operations live inside them, and the per-type
//! properties tagging relies on.

use crate::id::Recalc;

/// The type of a component node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ComponentType {
    /// Sentinel: the change-kind does not map to any component.
    Undefined,
    /// Sentinel: the whole ID node rather than one component.
    IdRef,

    Parameters,
    Animation,
    Transform,
    Geometry,
    /// Evaluated pose of an armature object.
    EvalPose,
    Sequencer,
    Audio,
    LayerCollections,
    CopyOnWrite,
    /// Base flags an object inherits from the view layer.
    ObjectFromLayer,
    Shading,
    ShadingParameters,
    Cache,
    PointCache,
    /// Drawing caches, including selection state of edit geometry.
    BatchCache,
    ParticleSystem,
    ParticleSettings,
}

bitflags::bitflags! {
    /// Component types visible in a view layer, one bit per defined
    /// [`ComponentType`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u64 {
        const PARAMETERS = 1 << ComponentType::Parameters as u64;
        const ANIMATION = 1 << ComponentType::Animation as u64;
        const TRANSFORM = 1 << ComponentType::Transform as u64;
        const GEOMETRY = 1 << ComponentType::Geometry as u64;
        const EVAL_POSE = 1 << ComponentType::EvalPose as u64;
        const SEQUENCER = 1 << ComponentType::Sequencer as u64;
        const AUDIO = 1 << ComponentType::Audio as u64;
        const LAYER_COLLECTIONS = 1 << ComponentType::LayerCollections as u64;
        const COPY_ON_WRITE = 1 << ComponentType::CopyOnWrite as u64;
        const OBJECT_FROM_LAYER = 1 << ComponentType::ObjectFromLayer as u64;
        const SHADING = 1 << ComponentType::Shading as u64;
        const SHADING_PARAMETERS = 1 << ComponentType::ShadingParameters as u64;
        const CACHE = 1 << ComponentType::Cache as u64;
        const POINT_CACHE = 1 << ComponentType::PointCache as u64;
        const BATCH_CACHE = 1 << ComponentType::BatchCache as u64;
        const PARTICLE_SYSTEM = 1 << ComponentType::ParticleSystem as u64;
        const PARTICLE_SETTINGS = 1 << ComponentType::ParticleSettings as u64;
    }
}

impl From<ComponentType> for ComponentMask {
    fn from(component_type: ComponentType) -> Self {
        Self::from_bits_retain(1 << component_type as u64)
    }
}

/// Static properties of a defined component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Human-readable name.
    pub name: &'static str,

    /// Change-kinds recorded on the datablock whenever this component is tagged.
    pub id_recalc_tag: Recalc,

    /// Whether the copy-on-write twin must be re-expanded before this
    /// component can be evaluated.
    pub needs_cow_before_update: bool,
}

const fn component_info(name: &'static str, id_recalc_tag: Recalc) -> ComponentInfo {
    ComponentInfo {
        name,
        id_recalc_tag,
        needs_cow_before_update: true,
    }
}

const fn component_info_no_cow(name: &'static str, id_recalc_tag: Recalc) -> ComponentInfo {
    ComponentInfo {
        name,
        id_recalc_tag,
        needs_cow_before_update: false,
    }
}

impl ComponentType {
    /// Every defined (non-sentinel) component type.
    pub const DEFINED: [ComponentType; 17] = [
        ComponentType::Parameters,
        ComponentType::Animation,
        ComponentType::Transform,
        ComponentType::Geometry,
        ComponentType::EvalPose,
        ComponentType::Sequencer,
        ComponentType::Audio,
        ComponentType::LayerCollections,
        ComponentType::CopyOnWrite,
        ComponentType::ObjectFromLayer,
        ComponentType::Shading,
        ComponentType::ShadingParameters,
        ComponentType::Cache,
        ComponentType::PointCache,
        ComponentType::BatchCache,
        ComponentType::ParticleSystem,
        ComponentType::ParticleSettings,
    ];

    /// Static properties, or `None` for the sentinels.
    pub const fn info(self) -> Option<ComponentInfo> {
        let info = match self {
            ComponentType::Undefined | ComponentType::IdRef => return None,
            ComponentType::Parameters => component_info("PARAMETERS", Recalc::empty()),
            ComponentType::Animation => component_info("ANIMATION", Recalc::ANIMATION),
            ComponentType::Transform => component_info("TRANSFORM", Recalc::TRANSFORM),
            ComponentType::Geometry => component_info("GEOMETRY", Recalc::GEOMETRY),
            ComponentType::EvalPose => component_info("EVAL_POSE", Recalc::GEOMETRY),
            ComponentType::Sequencer => component_info("SEQUENCER", Recalc::SEQUENCER_STRIPS),
            ComponentType::Audio => component_info("AUDIO", Recalc::empty()),
            ComponentType::LayerCollections => component_info("LAYER_COLLECTIONS", Recalc::empty()),
            ComponentType::CopyOnWrite => component_info_no_cow("COPY_ON_WRITE", Recalc::COPY_ON_WRITE),
            ComponentType::ObjectFromLayer => component_info_no_cow("OBJECT_FROM_LAYER", Recalc::empty()),
            ComponentType::Shading => component_info("SHADING", Recalc::SHADING),
            ComponentType::ShadingParameters => component_info("SHADING_PARAMETERS", Recalc::SHADING),
            ComponentType::Cache => component_info("CACHE", Recalc::empty()),
            ComponentType::PointCache => component_info("POINT_CACHE", Recalc::empty()),
            ComponentType::BatchCache => component_info_no_cow("BATCH_CACHE", Recalc::SHADING),
            ComponentType::ParticleSystem => component_info("PARTICLE_SYSTEM", Recalc::GEOMETRY),
            ComponentType::ParticleSettings => component_info("PARTICLE_SETTINGS", Recalc::empty()),
        };
        Some(info)
    }

    /// Whether this is a real component rather than the `Undefined` sentinel.
    pub fn is_defined(self) -> bool {
        self != ComponentType::Undefined
    }

    /// See [`ComponentInfo::needs_cow_before_update`]. False for sentinels.
    pub fn needs_cow_before_update(self) -> bool {
        match self.info() {
            Some(info) => info.needs_cow_before_update,
            None => false,
        }
    }

    /// Visibility mask covering the given component types.
    pub fn mask_of(types: &[ComponentType]) -> ComponentMask {
        types.iter().fold(ComponentMask::empty(), |mask, ty| mask | ComponentMask::from(*ty))
    }
}

/// The code of an operation inside a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationCode {
    /// Sentinel: the whole component rather than a single operation.
    Operation,

    ParametersEval,
    AnimationEval,
    TransformLocal,
    TransformFinal,
    GeometryEval,
    PoseInit,
    PoseDone,
    SequencesEval,
    SoundEval,
    ViewLayerEval,
    CopyOnWrite,
    ObjectBaseFlags,
    ShadingUpdate,
    MaterialUpdate,
    PointCacheReset,
    GeometrySelectUpdate,
    MovieClipSelectUpdate,
    ParticleSystemEval,
    ParticleSettingsInit,
    ParticleSettingsEval,
    ParticleSettingsReset,
}
