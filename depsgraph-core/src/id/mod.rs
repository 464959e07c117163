//! Datablocks and Change-Kinds
//!
//! This module defines the application data the dependency graph observes,
//! and the vocabulary used to describe how that data changed.
//!
//! # Overview
//!
//! - A [`Datablock`] is any independently identified unit of application
//!   data: an object, a mesh, a material, a node tree, a scene.
//! - Every datablock carries a [`Recalc`] mask: the union of every change-kind
//!   applied to it since the last evaluation pass cleared it.
//! - An [`UpdateSource`] records where a tag request came from, which decides
//!   secondary invalidation such as point caches on user edits.
//!
//! # Ownership
//!
//! The same datablock can be referenced by several graphs (one per scene and
//! view layer), and its recalc mask is shared by all of them. Datablocks are
//! therefore passed around as `Arc<Datablock>` and the mask is atomic. Each
//! graph keeps its own copy-on-write twin for evaluation.

mod datablock;
mod recalc;

pub use datablock::{Datablock, DatablockId, IdKind, IdKindSet, ObjectType};
pub use recalc::{Recalc, SingleBits, UpdateSource};
