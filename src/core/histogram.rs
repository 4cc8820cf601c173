/// Largest number of bins a histogram may have.
pub const MAX_BINS: u64 = 1_000_000;

/// Unit-width integer bin edges `0, 1, ..., top`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BinEdges {
    top: u64,
}

impl BinEdges {
    /// Edges from 0 to `ceil(max) + 2`.
    pub fn covering(max: f64) -> Result<Self, NoHistogram> {
        let top = max.ceil() + 2.0;
        if top.is_nan() || top < 1.0 {
            return Err(NoHistogram::NoBins);
        }
        if top > MAX_BINS as f64 {
            return Err(NoHistogram::TooWide);
        }
        Ok(Self { top: top as u64 })
    }

    pub fn top(&self) -> u64 {
        self.top
    }

    pub fn bins(&self) -> usize {
        self.top as usize
    }

    pub fn edges(&self) -> impl Iterator<Item = u64> {
        0..=self.top
    }

    /// Bin index for a sample. Bins are `[lo, hi)` except the last, which
    /// also takes its upper edge.
    fn index_of(&self, v: f64) -> Option<usize> {
        let top = self.top as f64;
        if v < 0.0 || v > top {
            return None;
        }
        if v == top {
            return Some(self.bins() - 1);
        }
        Some(v.floor() as usize)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub edges: BinEdges,
    pub heights: Vec<u64>,
    pub samples: usize,
    pub max: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoHistogram {
    NoSamples,
    NoBins,
    /// The maximum needs more than [`MAX_BINS`] bins.
    TooWide,
}

impl Histogram {
    /// Counts already-cleaned samples (missing values dropped) into bins
    /// sized from the sample maximum.
    pub fn from_samples(samples: &[f64]) -> Result<Self, NoHistogram> {
        let max = samples
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if samples.is_empty() {
            return Err(NoHistogram::NoSamples);
        }
        let edges = BinEdges::covering(max)?;
        let mut heights = vec![0u64; edges.bins()];
        for &v in samples {
            if let Some(i) = edges.index_of(v) {
                heights[i] += 1;
            }
        }
        Ok(Self {
            edges,
            heights,
            samples: samples.len(),
            max,
        })
    }

    pub fn tallest(&self) -> u64 {
        self.heights.iter().copied().max().unwrap_or(0)
    }
}
