use crate::graph::node::{GraphNode, RenderCtx};

/// One-shot playback of a pre-generated noise table.
///
/// Drum voices build their noise on the control thread (`dsp::noise`) and the
/// node plays it once from `start`, then falls silent.
pub struct NoiseNode {
    table: Vec<f32>,
    start: f64,
    position: usize,
}

impl NoiseNode {
    pub fn new(table: Vec<f32>, start: f64) -> Self {
        Self {
            table,
            start,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Time the last sample plays.
    pub fn end_time(&self, sample_rate: f32) -> f64 {
        self.start + self.table.len() as f64 / sample_rate as f64
    }
}

impl GraphNode for NoiseNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            if ctx.sample_time(i) < self.start {
                *sample = 0.0;
                continue;
            }
            *sample = match self.table.get(self.position) {
                Some(&value) => {
                    self.position += 1;
                    value
                }
                None => 0.0,
            };
        }
    }

    fn is_active(&self) -> bool {
        self.position < self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_table_once_from_start() {
        let mut node = NoiseNode::new(vec![0.5, -0.5, 0.25], 2.0 / 48_000.0);
        let mut buffer = vec![1.0; 8];
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));

        assert_eq!(buffer, vec![0.0, 0.0, 0.5, -0.5, 0.25, 0.0, 0.0, 0.0]);
        assert!(!node.is_active());
    }

    #[test]
    fn continues_across_blocks() {
        let mut node = NoiseNode::new(vec![0.1, 0.2, 0.3, 0.4], 0.0);
        let mut first = vec![0.0; 2];
        let mut second = vec![0.0; 2];
        node.render_block(&mut first, &RenderCtx::new(48_000.0, 0.0));
        assert!(node.is_active());
        node.render_block(&mut second, &RenderCtx::new(48_000.0, 2.0 / 48_000.0));
        assert_eq!(second, vec![0.3, 0.4]);
    }
}
