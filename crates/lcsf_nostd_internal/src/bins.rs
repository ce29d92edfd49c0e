//! Time-lag bins.
//!
//! [`LagBins`] is the lookup interface. [`UniformBins`] describes bins of
//! equal width without storing any edges, while [`EdgeSlice`] borrows an
//! arbitrary sequence of edges. Every bin is a half-open interval
//! `[left, right)`.

/// Maps a time lag onto the index of the bin that holds it
pub trait LagBins {
    /// the index of the bin holding `lag`, or `None` if `lag` lies outside
    /// of every bin (or is NaN). A lag on an interior edge belongs to the bin
    /// on the right.
    fn bin_of(&self, lag: f64) -> Option<usize>;

    fn n_bins(&self) -> usize;

    /// the left edge of bin `index`; `index == n_bins()` gives the right
    /// edge of the last bin
    fn edge(&self, index: usize) -> f64;
}

/// `n_bins` bins of equal width spanning `[start, stop)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformBins {
    start: f64,
    stop: f64,
    width: f64,
    n_bins: usize,
}

impl UniformBins {
    pub fn new(start: f64, stop: f64, n_bins: usize) -> Result<Self, &'static str> {
        if n_bins == 0 {
            return Err("at least one bin is required");
        }
        if !(start.is_finite() && stop.is_finite()) {
            return Err("the outer edges must be finite");
        }
        if stop <= start {
            return Err("the right edge must exceed the left edge");
        }
        Ok(Self {
            start,
            stop,
            width: (stop - start) / n_bins as f64,
            n_bins,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// every edge, from `start` to `stop`
    pub fn edges(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.n_bins).map(|i| self.edge(i))
    }
}

impl LagBins for UniformBins {
    fn bin_of(&self, lag: f64) -> Option<usize> {
        if !(self.start..self.stop).contains(&lag) {
            return None;
        }
        // rounding can push a lag just below `stop` past the last bin
        let index = ((lag - self.start) / self.width) as usize;
        Some(index.min(self.n_bins - 1))
    }

    fn n_bins(&self) -> usize {
        self.n_bins
    }

    fn edge(&self, index: usize) -> f64 {
        match index {
            i if i >= self.n_bins => self.stop,
            i => self.start + (i as f64) * self.width,
        }
    }
}

/// Checks that `edges` describes at least one bin: there must be 2 or more
/// edges, all finite, in strictly increasing order
pub fn check_edges(edges: &[f64]) -> Result<(), &'static str> {
    if edges.len() < 2 {
        Err("at least 2 bin edges are required")
    } else if !edges.iter().all(|edge| edge.is_finite()) {
        Err("every bin edge must be finite")
    } else if !edges.windows(2).all(|w| w[0] < w[1]) {
        Err("bin edges must be strictly increasing")
    } else {
        Ok(())
    }
}

/// Bins described by a borrowed sequence of edges
#[derive(Clone, Copy, Debug)]
pub struct EdgeSlice<'a> {
    edges: &'a [f64],
}

impl<'a> EdgeSlice<'a> {
    pub fn new(edges: &'a [f64]) -> Result<Self, &'static str> {
        check_edges(edges)?;
        Ok(Self { edges })
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.edges
    }
}

impl LagBins for EdgeSlice<'_> {
    fn bin_of(&self, lag: f64) -> Option<usize> {
        let (first, last) = (self.edges[0], self.edges[self.edges.len() - 1]);
        if !(first..last).contains(&lag) {
            return None;
        }
        // the number of edges <= lag is at least 1 (first <= lag) and at most
        // n_bins (lag < last)
        Some(self.edges.partition_point(|&edge| edge <= lag) - 1)
    }

    fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    fn edge(&self, index: usize) -> f64 {
        self.edges[index.min(self.edges.len() - 1)]
    }
}
