use crate::{
    dsp::mix::sum_in_place,
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Sum
============

Renders several sources and adds them together at equal level:

    out = Σ source_i

Unison stacks use this (detuned copies into one filter), and so do drum
voices that layer a tonal body with a noise burst. Levels are set upstream
by each layer's own gain stage, so there is no balance control here and the
sum can exceed ±1 until the bus compressor has its say.

  Sum: [Osc 1] ──┐
       [Osc 2] ──┼──→ (+) ──→ output
       [Noise] ──┘
*/

pub struct Sum {
    sources: Vec<Box<dyn GraphNode>>,
    temp_buffer: Vec<f32>,
}

impl Sum {
    pub fn new(sources: Vec<Box<dyn GraphNode>>) -> Self {
        Self {
            sources,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl GraphNode for Sum {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        let frames = &mut self.temp_buffer[..out.len()];
        for source in self.sources.iter_mut() {
            source.render_block(frames, ctx);
            sum_in_place(out, frames);
        }
    }

    fn is_active(&self) -> bool {
        self.sources.iter().any(|s| s.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::automation::AutomationParam;
    use crate::graph::{extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn sums_all_sources() {
        let a = OscNode::square(100.0).amplify(AutomationParam::constant(0.25));
        let b = OscNode::square(100.0).amplify(AutomationParam::constant(0.5));
        let mut sum = Sum::new(vec![a.boxed(), b.boxed()]);

        let mut buffer = vec![0.0; 32];
        sum.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));
        assert!(buffer.iter().all(|s| (s.abs() - 0.75).abs() < 1e-6));
    }

    #[test]
    fn active_while_any_source_is() {
        let short = OscNode::sine(100.0).play(0.0, 0.001);
        let long = OscNode::sine(100.0).play(0.0, 1.0);
        let mut sum = Sum::new(vec![short.boxed(), long.boxed()]);

        let mut buffer = vec![0.0; 128];
        sum.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));
        assert!(sum.is_active());

        let mut empty = Sum::new(Vec::new());
        empty.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));
        assert!(!empty.is_active());
        assert!(buffer.iter().all(|&s| s == 0.0));
    }
}
