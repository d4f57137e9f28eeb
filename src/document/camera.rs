//! Cameras.

use serde_json::Value;

use super::json;
use super::sink::{parse_into, ElementBase, ParseCx, PropertySink};

/// Perspective projection parameters.
#[derive(Debug, Clone)]
pub struct Perspective {
    /// Vertical field of view in radians.
    pub yfov: f32,
    pub aspect_ratio: Option<f32>,
    pub znear: f32,
    /// None means an infinite projection.
    pub zfar: Option<f32>,
    pub base: ElementBase,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            yfov: std::f32::consts::FRAC_PI_4,
            aspect_ratio: None,
            znear: 0.01,
            zfar: None,
            base: ElementBase::default(),
        }
    }
}

impl PropertySink for Perspective {
    const KIND: &'static str = "perspective";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "yfov" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.yfov);
            }
            "aspectRatio" => {
                let parsed = json::as_f32(value);
                cx.store_some(name, value, parsed, &mut self.aspect_ratio);
            }
            "znear" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.znear);
            }
            "zfar" => {
                let parsed = json::as_f32(value);
                cx.store_some(name, value, parsed, &mut self.zfar);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// Orthographic projection parameters.
#[derive(Debug, Clone, Default)]
pub struct Orthographic {
    pub xmag: f32,
    pub ymag: f32,
    pub znear: f32,
    pub zfar: f32,
    pub base: ElementBase,
}

impl PropertySink for Orthographic {
    const KIND: &'static str = "orthographic";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "xmag" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.xmag);
            }
            "ymag" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.ymag);
            }
            "znear" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.znear);
            }
            "zfar" => {
                let parsed = json::as_f32(value);
                cx.store(name, value, parsed, &mut self.zfar);
            }
            _ => cx.unknown_property(name),
        }
    }
}

/// A camera: one of the two projection kinds.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    /// The declared `type` string.
    pub kind: String,
    pub perspective: Option<Perspective>,
    pub orthographic: Option<Orthographic>,
    pub base: ElementBase,
}

impl Camera {
    /// True when the declared kind is perspective (or undeclared but a
    /// perspective block is present).
    pub fn is_perspective(&self) -> bool {
        match self.kind.as_str() {
            "perspective" => true,
            "orthographic" => false,
            _ => self.perspective.is_some(),
        }
    }
}

impl PropertySink for Camera {
    const KIND: &'static str = "cameras";

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx) {
        match name {
            "type" => {
                let parsed = json::as_str(value);
                cx.store(name, value, parsed, &mut self.kind);
            }
            "perspective" => {
                cx.enter("perspective");
                let mut p = Perspective::default();
                parse_into(&mut p, value, cx);
                cx.leave();
                self.perspective = Some(p);
            }
            "orthographic" => {
                cx.enter("orthographic");
                let mut o = Orthographic::default();
                parse_into(&mut o, value, cx);
                cx.leave();
                self.orthographic = Some(o);
            }
            _ => cx.unknown_property(name),
        }
    }
}
