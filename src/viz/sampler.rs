//! Per-frame spectral snapshot acquisition

/// A live frequency-analysis node the sampler can read from.
///
/// Implemented by [`crate::audio::SpectrumAnalyser`]; tests implement it
/// with fixed synthetic snapshots to drive the pipeline without a device.
pub trait AnalysisNode {
    /// Number of magnitude bins a snapshot holds.
    fn frequency_bin_count(&self) -> usize;

    /// Write the current byte-magnitude spectrum into `out`.
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

/// Reads one magnitude snapshot per frame into a reused buffer.
///
/// No side effects beyond the read; the snapshot is only valid until the
/// next call.
pub struct SpectralSampler {
    buf: Vec<u8>,
}

impl SpectralSampler {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn sample(&mut self, node: &mut dyn AnalysisNode) -> &[u8] {
        self.buf.resize(node.frequency_bin_count(), 0);
        node.byte_frequency_data(&mut self.buf);
        &self.buf
    }
}

impl Default for SpectralSampler {
    fn default() -> Self {
        Self::new()
    }
}
