use crate::{
    dsp::{automation::AutomationParam, envelope::Breakpoint},
    graph::node::{GraphNode, RenderCtx},
};

/*
Gain Stage
==========

Multiplies a signal by a gain that follows an automation timeline. This is
where every voice gets its amplitude envelope:

    out(t) = signal(t) · gain(t)

  signal:  [ 0.5,  0.8, -0.3,  0.9, ...]
  gain:    [ 0.0,  0.1,  0.2,  0.3, ...]   (attack ramp)
  out:     [ 0.0, 0.08, -0.06, 0.27, ...]

The gain timeline is absolute audio-clock time, so a voice's envelope is
fully scheduled the moment it is triggered.
*/

pub struct Amplify<N> {
    pub signal: N,
    gain: AutomationParam,
}

impl<N> Amplify<N> {
    pub fn new(signal: N, gain: AutomationParam) -> Self {
        Self { signal, gain }
    }

    /// Envelope from breakpoints offset to `start`.
    pub fn with_envelope(signal: N, breakpoints: &[Breakpoint], start: f64) -> Self {
        Self::new(signal, AutomationParam::from_breakpoints(breakpoints, start))
    }
}

impl<N: GraphNode> GraphNode for Amplify<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        for (i, sample) in out.iter_mut().enumerate() {
            *sample *= self.gain.value_at(ctx.sample_time(i));
        }
    }

    fn is_active(&self) -> bool {
        self.signal.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::adsr;
    use crate::graph::{extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn envelope_shapes_amplitude() {
        let bps = adsr(0.01, 0.01, 0.5, 0.01, 1.0);
        let mut voice = OscNode::square(1000.0).amplify(AutomationParam::from_breakpoints(&bps, 0.0));
        let mut buffer = vec![0.0; 1920];
        voice.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));

        // Square wave magnitude equals the gain.
        assert!(buffer[0].abs() < 1e-6);
        assert!((buffer[480].abs() - 1.0).abs() < 1e-2, "peak at attack end");
        assert!((buffer[960].abs() - 0.5).abs() < 1e-2, "sustain after decay");
        assert!(buffer[1500..].iter().all(|s| s.abs() < 1e-6), "silent after release");
    }

    #[test]
    fn constant_gain_scales_signal() {
        let mut voice = OscNode::square(100.0).amplify(AutomationParam::constant(0.25));
        let mut buffer = vec![0.0; 64];
        voice.render_block(&mut buffer, &RenderCtx::new(48_000.0, 0.0));
        assert!(buffer.iter().all(|s| (s.abs() - 0.25).abs() < 1e-6));
    }
}
