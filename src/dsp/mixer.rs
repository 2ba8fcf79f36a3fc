//! Mixer — master bus for a render: collects summed blocks, then soft
//! clips and scales the whole buffer once.

/// Drive applied before the tanh soft clipper.
pub const SOFT_CLIP_DRIVE: f64 = 0.5;

/// Output bus of fixed length. Blocks are written as they are rendered;
/// [`Mixer::finish`] turns the raw sums into output samples.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_volume: f64,
    sums: Vec<f64>,
}

impl Mixer {
    /// A silent bus of `num_samples`.
    pub fn new(master_volume: f64, num_samples: usize) -> Self {
        Mixer {
            master_volume,
            sums: vec![0.0; num_samples],
        }
    }

    /// Accumulate `block` starting at sample `offset`. Samples past the end
    /// of the bus are ignored.
    pub fn add_block(&mut self, offset: usize, block: &[f64]) {
        let Some(dest) = self.sums.get_mut(offset..) else {
            return;
        };
        for (slot, &s) in dest.iter_mut().zip(block) {
            *slot += s;
        }
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Soft clip and apply master volume in place, yielding the output.
    pub fn finish(self) -> Vec<f64> {
        let volume = self.master_volume;
        let mut out = self.sums;
        for s in &mut out {
            *s = soft_clip(*s) * volume;
        }
        out
    }
}

/// `tanh(0.5·x)`: bounded to (-1, 1) and near-linear for small sums.
pub fn soft_clip(x: f64) -> f64 {
    (SOFT_CLIP_DRIVE * x).tanh()
}
