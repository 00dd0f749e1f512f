use crate::graph::node::{GraphNode, RenderCtx};

/// Which effect sends a voice feeds, fixed at trigger time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sends {
    pub delay: bool,
    pub distortion: bool,
    pub reverb: bool,
}

impl Sends {
    pub fn any(&self) -> bool {
        self.delay || self.distortion || self.reverb
    }
}

/// One sounding note or drum hit with a fixed place on the audio clock.
///
/// Everything about the voice (pitch, envelope, filter motion) was scheduled
/// when it was triggered, so the bus only renders it until `stop` and then
/// drops it. There is no note-off.
pub struct Voice {
    graph: Box<dyn GraphNode>,
    start: f64,
    stop: f64,
    sends: Sends,
}

impl Voice {
    pub fn new(graph: Box<dyn GraphNode>, start: f64, stop: f64) -> Self {
        Self {
            graph,
            start,
            stop: stop.max(start),
            sends: Sends::default(),
        }
    }

    pub fn with_sends(mut self, sends: Sends) -> Self {
        self.sends = sends;
        self
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn stop_time(&self) -> f64 {
        self.stop
    }

    /// Seconds from start to stop.
    pub fn lifetime(&self) -> f64 {
        self.stop - self.start
    }

    pub fn sends(&self) -> Sends {
        self.sends
    }

    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.graph.render_block(out, ctx);
    }

    /// True once the clock has passed `stop` or every source has ended.
    pub fn is_finished(&self, time: f64) -> bool {
        time >= self.stop || !self.graph.is_active()
    }
}
