//! The property-sink contract driving schema dispatch.
//!
//! Every element type implements [`PropertySink`]: it receives each named
//! JSON value in turn and either consumes it into a typed field or reports
//! it as unrecognized. Name, extensions and extras capture is shared base
//! behavior handled by the dispatch driver through [`ElementBase`] field
//! embedding, so element types stay flat (no layered inheritance).

use serde_json::Value;

use super::diagnostics::{DiagnosticKind, Diagnostics};
use super::extensions::{Extension, ExtensionRegistry};
use super::json;

/// Shared name/extensions/extras state embedded in most element types.
#[derive(Default, Debug, Clone)]
pub struct ElementBase {
    /// Optional author-facing name.
    pub name: Option<String>,
    /// Parsed extension objects, known variants and generic captures alike.
    pub extensions: Vec<Extension>,
    /// Application-specific extras, preserved verbatim.
    pub extras: Option<Value>,
}

impl ElementBase {
    /// Find a parsed extension by predicate.
    pub fn find_extension<'a, T>(&'a self, f: impl Fn(&'a Extension) -> Option<T>) -> Option<T> {
        self.extensions.iter().find_map(f)
    }
}

/// Mutable parse state threaded through schema dispatch.
pub struct ParseCx<'a> {
    pub(crate) registry: &'a ExtensionRegistry,
    pub(crate) diags: &'a mut Diagnostics,
    path: Vec<String>,
}

impl<'a> ParseCx<'a> {
    pub(crate) fn new(registry: &'a ExtensionRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags, path: Vec::new() }
    }

    pub(crate) fn enter(&mut self, label: impl Into<String>) {
        self.path.push(label.into());
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Record an unrecognized property name.
    pub fn unknown_property(&mut self, name: &str) {
        let path = self.path_string();
        self.diags.push(
            DiagnosticKind::UnknownProperty,
            path,
            format!("unrecognized property \"{name}\""),
        );
    }

    /// Record a value-kind mismatch.
    pub fn type_mismatch(&mut self, name: &str, got: &Value) {
        let path = self.path_string();
        self.diags.push(
            DiagnosticKind::TypeMismatch,
            path,
            format!("property \"{name}\" has unexpected {} value", json::kind_name(got)),
        );
    }

    /// Record any other non-fatal schema problem.
    pub fn invalid(&mut self, message: impl Into<String>) {
        let path = self.path_string();
        self.diags.push(DiagnosticKind::Invalid, path, message);
    }

    /// Consume a parsed value into a required slot, or diagnose.
    pub(crate) fn store<T>(&mut self, name: &str, raw: &Value, parsed: Option<T>, slot: &mut T) {
        match parsed {
            Some(v) => *slot = v,
            None => self.type_mismatch(name, raw),
        }
    }

    /// Consume a parsed value into an optional slot, or diagnose.
    pub(crate) fn store_some<T>(
        &mut self,
        name: &str,
        raw: &Value,
        parsed: Option<T>,
        slot: &mut Option<T>,
    ) {
        match parsed {
            Some(v) => *slot = Some(v),
            None => self.type_mismatch(name, raw),
        }
    }
}

/// Per-element property consumption.
pub(crate) trait PropertySink {
    /// Element kind label used in diagnostic paths, e.g. `"accessors"`.
    const KIND: &'static str;

    /// Embedded shared state, if this element carries one.
    fn base_mut(&mut self) -> &mut ElementBase;

    /// Consume one named property. Unrecognized names go through
    /// [`ParseCx::unknown_property`].
    fn property(&mut self, name: &str, value: &Value, cx: &mut ParseCx);
}

/// Dispatch every member of a JSON object into a sink.
///
/// `name`, `extensions` and `extras` route to the embedded [`ElementBase`];
/// everything else goes to the sink's own `property` hook.
pub(crate) fn parse_into<S: PropertySink>(sink: &mut S, value: &Value, cx: &mut ParseCx) {
    let Some(map) = value.as_object() else {
        cx.invalid(format!("expected object, got {}", json::kind_name(value)));
        return;
    };

    for (name, v) in map {
        match name.as_str() {
            "name" => {
                let parsed = json::as_str(v);
                cx.store_some(name, v, parsed, &mut sink.base_mut().name);
            }
            "extensions" => parse_extensions(sink.base_mut(), v, cx),
            "extras" => sink.base_mut().extras = Some(v.clone()),
            _ => sink.property(name, v, cx),
        }
    }
}

/// Parse an `extensions` object through the registry.
///
/// Each member name is looked up in the registry; a hit produces a typed
/// variant, a miss produces a generic key/value capture so vendor data
/// survives as opaque metadata.
fn parse_extensions(base: &mut ElementBase, value: &Value, cx: &mut ParseCx) {
    let Some(map) = value.as_object() else {
        cx.invalid(format!("\"extensions\" is not an object ({})", json::kind_name(value)));
        return;
    };

    for (ext_name, ext_value) in map {
        cx.enter(format!("extensions.{ext_name}"));
        let registry = cx.registry;
        let ext = registry.parse(ext_name, ext_value, cx);
        cx.leave();
        base.extensions.push(ext);
    }
}

/// Parse a top-level element array into typed records.
pub(crate) fn parse_array<S: PropertySink + Default>(
    value: &Value,
    out: &mut Vec<S>,
    cx: &mut ParseCx,
) {
    let Some(items) = value.as_array() else {
        cx.enter(S::KIND);
        cx.invalid(format!("expected array, got {}", json::kind_name(value)));
        cx.leave();
        return;
    };

    out.reserve(items.len());
    for (i, item) in items.iter().enumerate() {
        cx.enter(format!("{}[{i}]", S::KIND));
        let mut element = S::default();
        parse_into(&mut element, item, cx);
        out.push(element);
        cx.leave();
    }
}
