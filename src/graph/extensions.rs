use std::sync::Arc;

use crate::{
    dsp::automation::AutomationParam,
    graph::{amplify::Amplify, node::GraphNode, shaper::ShaperNode, through::Through},
};

pub trait NodeExt: GraphNode + Sized {
    fn amplify(self, gain: AutomationParam) -> Amplify<Self> {
        Amplify::new(self, gain)
    }

    fn through<F: GraphNode>(self, processor: F) -> Through<Self, F> {
        Through::new(self, processor)
    }

    fn shape(self, curve: Arc<[f32]>) -> Through<Self, ShaperNode> {
        Through::new(self, ShaperNode::new(curve))
    }

    fn boxed(self) -> Box<dyn GraphNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: GraphNode> NodeExt for T {}
