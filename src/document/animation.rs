//! Animations: channels bound to keyframe samplers.

use serde_json::Value;

use super::json;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};
use super::ElementId;

/// Which node property an animation channel drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetPath {
    #[default]
    Translation,
    Rotation,
    Scale,
    /// Morph target weights.
    Weights,
}

impl TargetPath {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "weights" => Some(Self::Weights),
            _ => None,
        }
    }

    /// True for the paths that alter a node's local transform.
    #[inline]
    pub const fn is_transform(self) -> bool {
        matches!(self, Self::Translation | Self::Rotation | Self::Scale)
    }
}

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LINEAR" => Some(Self::Linear),
            "STEP" => Some(Self::Step),
            "CUBICSPLINE" => Some(Self::CubicSpline),
            _ => None,
        }
    }
}

/// What a channel points at: a node plus a property path.
#[derive(Debug, Clone, Default)]
pub struct ChannelTarget {
    pub node: ElementId,
    pub path: TargetPath,
    pub base: ElementBase,
}

impl PropertySink for ChannelTarget {
    const KIND: &'static str = "target";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "node" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.node);
            }
            "path" => match value.as_str().and_then(TargetPath::from_name) {
                Some(path) => self.path = path,
                None => cx.invalid(format!("unknown target path {value}")),
            },
            _ => cx.unknown_property(name),
        }
    }
}

/// Binds a sampler to a target.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub sampler: ElementId,
    pub target: ChannelTarget,
    pub base: ElementBase,
}

impl PropertySink for Channel {
    const KIND: &'static str = "channels";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "sampler" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.sampler);
            }
            "target" => {
                cx.enter("target");
                parse_into(&mut self.target, value, cx);
                cx.leave();
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// An input/output accessor pair plus interpolation mode.
#[derive(Debug, Clone, Default)]
pub struct AnimationSampler {
    /// Keyframe times (scalar float seconds).
    pub input: ElementId,
    /// Keyframe values.
    pub output: ElementId,
    pub interpolation: Interpolation,
    pub base: ElementBase,
}

impl PropertySink for AnimationSampler {
    const KIND: &'static str = "samplers";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "input" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.input);
            }
            "output" => {
                let parsed = json::as_id(value);
                cx.store(name, value, parsed, &mut self.output);
            }
            "interpolation" => match value.as_str().and_then(Interpolation::from_name) {
                Some(mode) => self.interpolation = mode,
                None => cx.invalid(format!("unknown interpolation {value}")),
            },
            _ => cx.unknown_property(name),
        }
    }
}

/// A named set of channels and samplers.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
    pub base: ElementBase,
}

impl PropertySink for Animation {
    const KIND: &'static str = "animations";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "channels" => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        cx.enter(format!("channels[{i}]"));
                        let mut channel = Channel::default();
                        parse_into(&mut channel, item, cx);
                        self.channels.push(channel);
                        cx.leave();
                    }
                }
                None => cx.type_mismatch(name, value),
            },
            "samplers" => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        cx.enter(format!("samplers[{i}]"));
                        let mut sampler = AnimationSampler::default();
                        parse_into(&mut sampler, item, cx);
                        self.samplers.push(sampler);
                        cx.leave();
                    }
                }
                None => cx.type_mismatch(name, value),
            },
            _ => cx.unknown_property(name),
        }
    }
}
