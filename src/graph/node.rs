/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Audio-clock time of the first sample in the block, in seconds
/// - filter_octaves: Bus LFO offset for filters that track it (lfo × depth)
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
    pub filter_octaves: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self {
            sample_rate,
            time,
            filter_octaves: 0.0,
        }
    }

    pub fn with_filter_octaves(mut self, octaves: f32) -> Self {
        self.filter_octaves = octaves;
        self
    }

    /// Absolute time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Absolute time just past the end of a block of `frames` samples.
    #[inline]
    pub fn block_end(&self, frames: usize) -> f64 {
        self.sample_time(frames)
    }
}

/// Core trait for audio processing graph nodes
///
/// Sources overwrite `out`; processors transform it in place.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node can still produce sound
    ///
    /// Used by the bus to retire voices whose sources have all ended.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
