use std::sync::Arc;

use crate::{
    dsp::distortion::Waveshaper,
    graph::node::{GraphNode, RenderCtx},
};

/// In-place waveshaping through a shared curve (see `dsp::distortion`).
pub struct ShaperNode {
    shaper: Waveshaper,
}

impl ShaperNode {
    pub fn new(curve: Arc<[f32]>) -> Self {
        Self {
            shaper: Waveshaper::new(curve),
        }
    }

    pub fn curve(&self) -> &Arc<[f32]> {
        self.shaper.curve()
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.shaper.render(out);
    }
}
