use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Chain
============

`source.through(processor)` renders the source into the block, then lets the
processor rewrite that same block in place. Nothing is mixed or multiplied:
the processor sees exactly what the source produced.

    block after source:     [0.5, 0.8, -0.3, 0.9, ...]
    block after processor:  [0.4, 0.6, -0.2, 0.7, ...]   (e.g. lowpassed)

A chain is only as alive as its source. Filters and shapers have no notion of
"done"; once the oscillators have stopped, the voice can be retired.

Every voice in this crate is a Through chain at heart:

  melodic:  oscillators ──→ filter ──→ gain envelope
  analog:   oscillator ──→ filter sweep ──→ gain envelope
  digital:  oscillator ──→ shaper (k = 10) ──→ gain envelope

  Through: [Source] ──→ [Processor] ──→ output
*/

pub struct Through<S, F> {
    source: S,
    processor: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, processor: F) -> Self {
        Self { source, processor }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.processor.render_block(out, ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, filter::FilterNode, oscillator::OscNode};

    #[test]
    fn renders_source_then_processor() {
        let mut node = OscNode::sawtooth(5000.0).through(FilterNode::lowpass(200.0));
        let mut buffer = vec![1.0; 512];
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));

        assert!(buffer.iter().all(|&sample| sample.is_finite()));
        let tail_peak = buffer[256..].iter().fold(0.0f32, |a, &x| a.max(x.abs()));
        assert!(tail_peak < 0.1, "processor should shape the source, got {tail_peak}");
    }

    #[test]
    fn activity_follows_the_source() {
        let mut node = OscNode::sine(440.0)
            .play(0.0, 0.001)
            .through(FilterNode::lowpass(1000.0));
        assert!(node.is_active());

        let mut buffer = vec![0.0; 128];
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));
        assert!(!node.is_active());
    }
}
