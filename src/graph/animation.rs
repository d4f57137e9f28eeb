//! Animation output: clips with channels bound to graph nodes.

use crate::document::{Interpolation, TargetPath};
use crate::graph::scene::NodeId;

/// One sampled channel wired to its target node.
#[derive(Debug, Clone)]
pub struct ChannelBinding {
    /// The node this channel drives.
    pub target: NodeId,
    /// Palette slot when the target is a joint and the path is a
    /// transform, so joint matrices stay animated through the shared
    /// palette.
    pub joint: Option<u32>,
    pub path: TargetPath,
    pub interpolation: Interpolation,
    /// Keyframe times in seconds, ascending.
    pub times: Vec<f32>,
    /// Keyframe values, `components` floats per key.
    pub values: Vec<f32>,
    /// Components per keyframe value (3 for translation/scale, 4 for
    /// rotation, morph-target count for weights).
    pub components: usize,
}

impl ChannelBinding {
    /// Keyframe count, bounded by whichever stream is shorter.
    pub fn num_keys(&self) -> usize {
        if self.components == 0 {
            return 0;
        }
        self.times.len().min(self.values.len() / self.components)
    }

    /// End time of the channel, 0.0 when empty.
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

/// A named group of channels meant to play together.
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    pub name: Option<String>,
    pub channels: Vec<ChannelBinding>,
}

impl AnimationClip {
    /// Longest channel duration in the clip.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(ChannelBinding::duration)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_count_bounded_by_values() {
        let channel = ChannelBinding {
            target: NodeId(0),
            joint: None,
            path: TargetPath::Translation,
            interpolation: Interpolation::Linear,
            times: vec![0.0, 0.5, 1.0],
            values: vec![0.0; 6],
            components: 3,
        };
        assert_eq!(channel.num_keys(), 2);
        assert_eq!(channel.duration(), 1.0);
    }
}
