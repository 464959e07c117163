//! Tagging
//!
//! Everything that marks parts of a graph as needing re-evaluation, and
//! resets those marks once evaluation is done.
//!
//! # Overview
//!
//! - [`classify`]: maps one change-kind bit to a component and operation
//! - [`graph_id_tag_update`]: the entry point; decomposes a mask and tags
//!   the datablock's node, its implicitly owned datablocks and its embedded
//!   node tree
//! - [`Depsgraph::tag_component`]: tags one component or operation and
//!   cascades to copy-on-write
//! - [`Depsgraph::on_visible_update`]: re-tags nodes whose visibility changed
//! - [`Depsgraph::clear_recalc`]: resets recalc masks in parallel
//!
//! Tagging never fails. Datablocks without a node, components the builder
//! did not create and change-kinds without a component are all skipped.
//!
//! [`Depsgraph::tag_component`]: crate::graph::Depsgraph::tag_component
//! [`Depsgraph::on_visible_update`]: crate::graph::Depsgraph::on_visible_update
//! [`Depsgraph::clear_recalc`]: crate::graph::Depsgraph::clear_recalc

mod classify;
mod clear;
mod component;
mod propagate;
mod visibility;
mod zero;

pub use classify::{classify, classify_kind};
pub use clear::CLEAR_RECALC_MIN_CHUNK;
pub use propagate::graph_id_tag_update;
