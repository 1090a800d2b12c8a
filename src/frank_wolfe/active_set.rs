//! Bookkeeping for the sparse convex combination behind away-step and
//! pairwise Frank-Wolfe.

use ndarray::prelude::*;
use ndarray::NdFloat;

/// Fixed-capacity arena of active vertices and their convex weights.
///
/// Vertices live in the leading `len` columns of a preallocated
/// `dimension × capacity` matrix, so a run never reallocates: the
/// capacity is chosen up front from the vertex count of the region and
/// the iteration budget. Weights stay strictly positive and sum to one;
/// a slot whose weight reaches zero is swap-removed.
#[derive(Debug, Clone)]
pub struct ActiveSet<S> {
    vertices: Array2<S>,
    weights: Array1<S>,
    len: usize,
}

impl<S: NdFloat> ActiveSet<S> {
    /// Seeds the arena with a single vertex at weight one.
    pub fn new(capacity: usize, initial_vertex: ArrayView1<S>) -> Self {
        let dimension = initial_vertex.len();
        let mut vertices = Array2::zeros((dimension, capacity));
        vertices.column_mut(0).assign(&initial_vertex);
        let mut weights = Array1::zeros(capacity);
        weights[0] = S::one();
        ActiveSet {
            vertices,
            weights,
            len: 1,
        }
    }

    /// The active vertices as columns, in slot order.
    pub fn active_vertices(&self) -> ArrayView2<S> {
        self.vertices.slice(s![.., ..self.len])
    }

    /// Number of active vertices.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Weight of the vertex in `slot`.
    pub fn weight(&self, slot: usize) -> S {
        self.weights[slot]
    }

    /// Appends a vertex at weight zero and returns its slot. The caller
    /// moves mass onto it in the same iteration.
    pub fn insert(&mut self, vertex: ArrayView1<S>) -> usize {
        let slot = self.len;
        self.vertices.column_mut(slot).assign(&vertex);
        self.weights[slot] = S::zero();
        self.len += 1;
        slot
    }

    /// `x ← x + γ(v − x)` for the vertex in `slot`: every weight scales
    /// by `1 − γ` and the slot gains `γ`. Slots emptied by a full step
    /// are removed, so slot indices do not survive the call.
    pub fn forward_step(&mut self, slot: usize, gamma: S) {
        self.scale(S::one() - gamma);
        self.weights[slot] += gamma;
        self.prune();
    }

    /// `x ← x + γ(x − a)` for the vertex in `slot`: every weight scales
    /// by `1 + γ` and the slot loses `γ`. The caller keeps
    /// `γ < weight/(1 − weight)` so the slot stays positive; rounding
    /// at that bound is cleaned up by the prune.
    pub fn away_step(&mut self, slot: usize, gamma: S) {
        self.scale(S::one() + gamma);
        self.weights[slot] -= gamma;
        self.prune();
    }

    /// An away step whose size cap binds: the vertex in `slot` leaves
    /// the set outright and the survivors rescale by `1 + γ`, which
    /// restores the unit sum without leaving rounding dust in the
    /// emptied slot.
    pub fn drop_step(&mut self, slot: usize, gamma: S) {
        self.remove(slot);
        self.scale(S::one() + gamma);
    }

    /// Moves `γ` of mass from one slot to another, all other weights
    /// untouched. At `γ = weight(from)` the source empties exactly and
    /// is removed.
    pub fn pairwise_step(&mut self, from: usize, to: usize, gamma: S) {
        self.weights[from] -= gamma;
        self.weights[to] += gamma;
        self.prune();
    }

    fn scale(&mut self, factor: S) {
        self.weights
            .slice_mut(s![..self.len])
            .mapv_inplace(|w| w * factor);
    }

    fn prune(&mut self) {
        let mut slot = 0;
        while slot < self.len {
            if self.weights[slot] <= S::zero() {
                self.remove(slot);
            } else {
                slot += 1;
            }
        }
    }

    fn remove(&mut self, slot: usize) {
        let last = self.len - 1;
        if slot != last {
            let (mut kept, tail) = self.vertices.view_mut().split_at(Axis(1), last);
            kept.column_mut(slot).assign(&tail.column(0));
            self.weights[slot] = self.weights[last];
        }
        self.len = last;
    }
}
