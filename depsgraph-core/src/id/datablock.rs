//! Datablocks
//!
//! This module defines the application data that participates in the
//! dependency graph, and the identity used to look it up.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use super::recalc::Recalc;

/// Unique identifier for a datablock.
///
/// The copy-on-write twin of a datablock shares the identifier of its
/// original, which is what every graph keys its nodes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatablockId(u64);

impl DatablockId {
    /// Generate a new unique datablock ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for DatablockId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for DatablockId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DatablockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a datablock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum IdKind {
    Action,
    Armature,
    Camera,
    Collection,
    Curve,
    GreasePencil,
    Image,
    /// Shape key block owned by a mesh, curve or lattice.
    Key,
    Lamp,
    Lattice,
    LightProbe,
    Mask,
    Material,
    Mesh,
    MetaBall,
    MovieClip,
    NodeTree,
    Object,
    Palette,
    ParticleSettings,
    Scene,
    Sound,
    Text,
    Texture,
    World,
}

impl IdKind {
    /// Every kind, in declaration order.
    pub const ALL: [IdKind; 25] = [
        IdKind::Action,
        IdKind::Armature,
        IdKind::Camera,
        IdKind::Collection,
        IdKind::Curve,
        IdKind::GreasePencil,
        IdKind::Image,
        IdKind::Key,
        IdKind::Lamp,
        IdKind::Lattice,
        IdKind::LightProbe,
        IdKind::Mask,
        IdKind::Material,
        IdKind::Mesh,
        IdKind::MetaBall,
        IdKind::MovieClip,
        IdKind::NodeTree,
        IdKind::Object,
        IdKind::Palette,
        IdKind::ParticleSettings,
        IdKind::Scene,
        IdKind::Sound,
        IdKind::Text,
        IdKind::Texture,
        IdKind::World,
    ];

    /// Number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index of this kind, in `0..COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Geometry kinds whose selection state lives in a drawing batch cache.
    pub fn is_selectable_geometry(self) -> bool {
        matches!(
            self,
            IdKind::Mesh | IdKind::Curve | IdKind::MetaBall | IdKind::Lattice | IdKind::GreasePencil
        )
    }

    /// Kinds that may carry an embedded node tree.
    pub fn may_embed_node_tree(self) -> bool {
        matches!(
            self,
            IdKind::Material | IdKind::Texture | IdKind::Lamp | IdKind::World | IdKind::Scene
        )
    }
}

/// Sub-type of an object datablock, describing what its data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectType {
    #[default]
    Empty,
    Mesh,
    Curve,
    Surface,
    Font,
    MetaBall,
    Lattice,
    Armature,
    GreasePencil,
    Camera,
    Lamp,
    LightProbe,
    Speaker,
}

bitflags::bitflags! {
    /// A set of datablock kinds, one bit per [`IdKind`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct IdKindSet: u32 {
        const ACTION = 1 << IdKind::Action as u32;
        const ARMATURE = 1 << IdKind::Armature as u32;
        const CAMERA = 1 << IdKind::Camera as u32;
        const COLLECTION = 1 << IdKind::Collection as u32;
        const CURVE = 1 << IdKind::Curve as u32;
        const GREASE_PENCIL = 1 << IdKind::GreasePencil as u32;
        const IMAGE = 1 << IdKind::Image as u32;
        const KEY = 1 << IdKind::Key as u32;
        const LAMP = 1 << IdKind::Lamp as u32;
        const LATTICE = 1 << IdKind::Lattice as u32;
        const LIGHT_PROBE = 1 << IdKind::LightProbe as u32;
        const MASK = 1 << IdKind::Mask as u32;
        const MATERIAL = 1 << IdKind::Material as u32;
        const MESH = 1 << IdKind::Mesh as u32;
        const META_BALL = 1 << IdKind::MetaBall as u32;
        const MOVIE_CLIP = 1 << IdKind::MovieClip as u32;
        const NODE_TREE = 1 << IdKind::NodeTree as u32;
        const OBJECT = 1 << IdKind::Object as u32;
        const PALETTE = 1 << IdKind::Palette as u32;
        const PARTICLE_SETTINGS = 1 << IdKind::ParticleSettings as u32;
        const SCENE = 1 << IdKind::Scene as u32;
        const SOUND = 1 << IdKind::Sound as u32;
        const TEXT = 1 << IdKind::Text as u32;
        const TEXTURE = 1 << IdKind::Texture as u32;
        const WORLD = 1 << IdKind::World as u32;
    }
}

impl From<IdKind> for IdKindSet {
    fn from(kind: IdKind) -> Self {
        Self::from_bits_retain(1 << kind.index())
    }
}

impl IdKindSet {
    /// Iterate over the kinds in the set, in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = IdKind> {
        IdKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(IdKindSet::from(*kind)))
    }
}

/// A piece of mutable application data.
///
/// Datablocks are shared between every graph that references them, so the
/// recalc mask is atomic and datablocks are handed around as `Arc`s. Owned
/// references (object data, shape keys, embedded node trees) are fixed at
/// construction time.
#[derive(Debug)]
pub struct Datablock {
    id: DatablockId,
    kind: IdKind,
    name: String,
    object_type: ObjectType,

    /// Union of every change-kind applied since the last clear.
    recalc: AtomicU32,

    /// The data of an object (mesh, curve, armature, ...).
    data: Option<Arc<Datablock>>,

    /// Shape keys of a mesh, curve or lattice.
    shape_key: Option<Arc<Datablock>>,

    /// Node tree embedded in a material, texture, lamp, world or scene.
    node_tree: Option<Arc<Datablock>>,
}

impl Datablock {
    /// Create a new datablock of the given kind.
    pub fn new(kind: IdKind, name: impl Into<String>) -> Self {
        Self {
            id: DatablockId::new(),
            kind,
            name: name.into(),
            object_type: ObjectType::Empty,
            recalc: AtomicU32::new(0),
            data: None,
            shape_key: None,
            node_tree: None,
        }
    }

    /// Create a new object datablock of the given sub-type.
    pub fn object(name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            object_type,
            ..Self::new(IdKind::Object, name)
        }
    }

    /// Attach the object's data.
    pub fn with_data(mut self, data: Arc<Datablock>) -> Self {
        debug_assert_eq!(self.kind, IdKind::Object, "only objects own object data");
        self.data = Some(data);
        self
    }

    /// Attach a shape key block.
    pub fn with_shape_key(mut self, key: Arc<Datablock>) -> Self {
        debug_assert_eq!(key.kind, IdKind::Key);
        self.shape_key = Some(key);
        self
    }

    /// Attach an embedded node tree.
    pub fn with_node_tree(mut self, node_tree: Arc<Datablock>) -> Self {
        debug_assert_eq!(node_tree.kind, IdKind::NodeTree);
        self.node_tree = Some(node_tree);
        self
    }

    /// Wrap the datablock for sharing between graphs.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Get the datablock's unique identifier.
    pub fn id(&self) -> DatablockId {
        self.id
    }

    /// Get the datablock kind.
    pub fn kind(&self) -> IdKind {
        self.kind
    }

    /// Human-readable name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object sub-type. Always [`ObjectType::Empty`] for non-objects.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Object data, such as the mesh of a mesh object.
    pub fn data(&self) -> Option<&Arc<Datablock>> {
        self.data.as_ref()
    }

    /// Shape keys of geometry data.
    pub fn shape_key(&self) -> Option<&Arc<Datablock>> {
        self.shape_key.as_ref()
    }

    /// Embedded node tree, tagged along with its owner.
    pub fn node_tree(&self) -> Option<&Arc<Datablock>> {
        self.node_tree.as_ref()
    }

    /// The datablock implicitly changed together with this one when its
    /// geometry changes: the data of an object, the shape keys of geometry.
    pub fn legacy_owned(&self) -> Option<&Arc<Datablock>> {
        match self.kind {
            IdKind::Object => self.data.as_ref(),
            IdKind::Mesh | IdKind::Lattice | IdKind::Curve => self.shape_key.as_ref(),
            _ => None,
        }
    }

    /// Current recalc mask.
    pub fn recalc(&self) -> Recalc {
        Recalc::from_bits_retain(self.recalc.load(Ordering::Relaxed))
    }

    /// OR change-kinds into the recalc mask.
    pub fn recalc_insert(&self, flags: Recalc) {
        if !flags.is_empty() {
            self.recalc.fetch_or(flags.bits(), Ordering::Relaxed);
        }
    }

    /// Reset the recalc mask to zero.
    pub fn clear_recalc(&self) {
        self.recalc.store(0, Ordering::Relaxed);
    }

    /// Create the copy-on-write twin of this datablock.
    ///
    /// The twin shares the identifier, starts with an empty recalc mask, and
    /// gets its own twin of the embedded node tree. Other references still
    /// point at originals until the expansion collaborator remaps them.
    pub fn cow_twin(&self) -> Datablock {
        Datablock {
            id: self.id,
            kind: self.kind,
            name: self.name.clone(),
            object_type: self.object_type,
            recalc: AtomicU32::new(0),
            data: self.data.clone(),
            shape_key: self.shape_key.clone(),
            node_tree: self
                .node_tree
                .as_ref()
                .map(|node_tree| Arc::new(node_tree.cow_twin())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datablock_ids_are_unique() {
        let id1 = DatablockId::new();
        let id2 = DatablockId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn recalc_accumulates_until_cleared() {
        let mesh = Datablock::new(IdKind::Mesh, "Cube");
        assert!(mesh.recalc().is_empty());

        mesh.recalc_insert(Recalc::GEOMETRY);
        mesh.recalc_insert(Recalc::SHADING);
        assert_eq!(mesh.recalc(), Recalc::GEOMETRY | Recalc::SHADING);

        mesh.clear_recalc();
        assert!(mesh.recalc().is_empty());
    }

    #[test]
    fn legacy_owned_follows_kind() {
        let key = Datablock::new(IdKind::Key, "Key").into_shared();
        let mesh = Datablock::new(IdKind::Mesh, "Cube")
            .with_shape_key(Arc::clone(&key))
            .into_shared();
        let object = Datablock::object("Cube", ObjectType::Mesh).with_data(Arc::clone(&mesh));

        assert_eq!(object.legacy_owned().map(|d| d.id()), Some(mesh.id()));
        assert_eq!(mesh.legacy_owned().map(|d| d.id()), Some(key.id()));

        // Materials keep their node tree separately.
        let material = Datablock::new(IdKind::Material, "Material")
            .with_node_tree(Datablock::new(IdKind::NodeTree, "Shader Nodetree").into_shared());
        assert!(material.legacy_owned().is_none());
    }

    #[test]
    fn cow_twin_has_fresh_state() {
        let node_tree = Datablock::new(IdKind::NodeTree, "Shader Nodetree").into_shared();
        let material = Datablock::new(IdKind::Material, "Material").with_node_tree(Arc::clone(&node_tree));
        material.recalc_insert(Recalc::SHADING);
        node_tree.recalc_insert(Recalc::SHADING);

        let twin = material.cow_twin();
        assert_eq!(twin.id(), material.id());
        assert!(twin.recalc().is_empty());

        // The twin's node tree is a separate instance.
        let twin_tree = twin.node_tree().unwrap();
        assert!(!Arc::ptr_eq(twin_tree, &node_tree));
        assert!(twin_tree.recalc().is_empty());
    }

    #[test]
    fn kind_set_membership() {
        let mut set = IdKindSet::empty();
        assert!(set.is_empty());

        set.insert(IdKind::Material.into());
        set.insert(IdKind::World.into());
        assert!(set.contains(IdKind::Material.into()));
        assert!(!set.contains(IdKind::Mesh.into()));
        assert_eq!(set, IdKindSet::MATERIAL | IdKindSet::WORLD);
        assert_eq!(set.kinds().collect::<Vec<_>>(), vec![IdKind::Material, IdKind::World]);
    }

    #[test]
    fn kind_set_covers_every_kind() {
        let every = IdKind::ALL
            .into_iter()
            .fold(IdKindSet::empty(), |set, kind| set | kind.into());
        assert_eq!(every, IdKindSet::all());
        assert_eq!(every.kinds().count(), IdKind::COUNT);
    }

    #[test]
    fn kind_indices_are_dense() {
        for (position, kind) in IdKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
        assert!(IdKind::COUNT <= 32);
    }
}
