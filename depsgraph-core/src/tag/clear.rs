//! Bulk clear of recalc masks after evaluation.

use rayon::prelude::*;
use tracing::trace;

use crate::graph::{Depsgraph, IdNode};
use crate::id::IdKindSet;

/// Smallest number of nodes a clear worker takes at once.
///
/// Clearing a node is a handful of atomic stores, so splitting finer than
/// this costs more than it saves.
pub const CLEAR_RECALC_MIN_CHUNK: usize = 1024;

impl Depsgraph {
    /// Reset the recalc masks of every node once evaluation is done, and
    /// forget which datablock kinds were updated.
    ///
    /// Does nothing when no kind was updated since the last clear.
    pub fn clear_recalc(&mut self) {
        if !self.id_type_any_updated() {
            return;
        }

        self.id_nodes
            .par_iter_mut()
            .with_min_len(CLEAR_RECALC_MIN_CHUNK)
            .for_each(IdNode::clear_recalc);
        self.id_type_updated = IdKindSet::empty();

        trace!("{}: cleared recalc of {} nodes", self.name(), self.id_nodes.len());
    }
}
