//! Depsgraph Core
//!
//! This crate provides change tagging for a copy-on-write dependency graph.
//! It implements:
//!
//! - Classification of change-kinds into graph components and operations
//! - Tagging of components and operations, with copy-on-write cascades
//! - Broad invalidation for unspecified changes
//! - Re-tagging of nodes whose visibility changed
//! - Parallel reset of recalc state after evaluation
//!
//! Building the graph and evaluating it are left to collaborators. This
//! crate only decides what must be re-evaluated.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `id`: Datablocks, their change-kind masks and update sources
//! - `graph`: ID, component and operation nodes, and the graph that owns them
//! - `tag`: Everything that marks nodes for re-evaluation and clears the marks
//! - `registry`: Graphs of every scene and view layer, process-wide tagging
//! - `config`: Per-graph debug configuration
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use depsgraph_core::graph::{ComponentType, Depsgraph};
//! use depsgraph_core::id::{Datablock, ObjectType, Recalc};
//!
//! let object = Datablock::object("Cube", ObjectType::Mesh).into_shared();
//!
//! let mut graph = Depsgraph::new("Scene/ViewLayer");
//! let node = graph.add_id_node(Arc::clone(&object));
//! node.add_component(ComponentType::Transform);
//! node.add_component(ComponentType::CopyOnWrite);
//!
//! // The user moved the object
//! graph.id_tag_update(&object, Recalc::TRANSFORM);
//!
//! let node = graph.find_id_node(&object).unwrap();
//! assert!(node.find_component(ComponentType::Transform).unwrap().needs_update());
//! assert!(node.find_component(ComponentType::CopyOnWrite).unwrap().needs_update());
//! assert!(object.recalc().contains(Recalc::TRANSFORM | Recalc::COPY_ON_WRITE));
//!
//! // Evaluation done
//! graph.clear_recalc();
//! assert!(object.recalc().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod id;
pub mod registry;
pub mod tag;

pub use config::{DebugFlags, DepsgraphConfig};
pub use error::{DepsgraphError, Result};
pub use graph::Depsgraph;
pub use id::{Datablock, Recalc, UpdateSource};
pub use registry::GraphRegistry;
