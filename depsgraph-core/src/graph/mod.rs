//! Dependency Graph
//!
//! This module implements the node structure that tagging operates on.
//!
//! # Overview
//!
//! The graph is a three-level hierarchy:
//!
//! - [`IdNode`]: one per datablock, holding the original and the graph's
//!   copy-on-write twin
//! - [`ComponentNode`]: an independently invalidated part of the datablock's
//!   evaluation (transform, geometry, shading, ...)
//! - [`OperationNode`]: the unit of work the evaluator runs
//!
//! Relations between operations are the builder's and evaluator's concern and
//! are not represented here.
//!
//! # Design Decisions
//!
//! 1. ID nodes live in an arena (`Vec<IdNode>`) addressed by [`IdNodeIndex`],
//!    so bulk passes can split the arena across threads without any
//!    per-node synchronization.
//!
//! 2. Component and operation maps are insertion-ordered, so tagging a whole
//!    node records entry tags in a deterministic order.
//!
//! 3. The static per-type properties (`needs_cow_before_update`, the recalc
//!    bits a component contributes) live in one table on [`ComponentType`].

mod component;
mod depsgraph;
mod node;

pub use component::{ComponentInfo, ComponentMask, ComponentType, OperationCode};
pub use depsgraph::Depsgraph;
pub use node::{
    ComponentNode, EntryTags, IdNode, IdNodeIndex, OperationFlags, OperationKey, OperationNode,
};
