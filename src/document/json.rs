//! Small pull-helpers over the JSON value tree.
//!
//! The generic JSON tokenizer lives outside this crate; schema dispatch
//! receives an already-built [`serde_json::Value`] tree and pulls typed
//! fields out of it. Every helper returns `None` on a kind mismatch so the
//! caller can turn it into a diagnostic.

use serde_json::Value;

use super::ElementId;

pub(crate) fn as_str(v: &Value) -> Option<String> {
    v.as_str().map(str::to_owned)
}

pub(crate) fn as_bool(v: &Value) -> Option<bool> {
    v.as_bool()
}

pub(crate) fn as_f32(v: &Value) -> Option<f32> {
    v.as_f64().map(|f| f as f32)
}

pub(crate) fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64().and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn as_usize(v: &Value) -> Option<usize> {
    v.as_u64().and_then(|n| usize::try_from(n).ok())
}

/// An element cross-reference: a non-negative integer index.
pub(crate) fn as_id(v: &Value) -> Option<ElementId> {
    as_u32(v).map(ElementId::new)
}

pub(crate) fn as_f32_array<const N: usize>(v: &Value) -> Option<[f32; N]> {
    let arr = v.as_array()?;
    if arr.len() != N {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(arr) {
        *slot = as_f32(item)?;
    }
    Some(out)
}

pub(crate) fn as_f32_vec(v: &Value) -> Option<Vec<f32>> {
    v.as_array()?.iter().map(as_f32).collect()
}

pub(crate) fn as_index_vec(v: &Value) -> Option<Vec<u32>> {
    v.as_array()?.iter().map(as_u32).collect()
}

pub(crate) fn as_string_vec(v: &Value) -> Option<Vec<String>> {
    v.as_array()?.iter().map(as_str).collect()
}

/// Describe a JSON value's kind for diagnostics.
pub(crate) fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(as_f32(&json!(1.5)), Some(1.5));
        assert_eq!(as_u32(&json!(7)), Some(7));
        assert_eq!(as_u32(&json!(-1)), None);
        assert_eq!(as_usize(&json!("x")), None);
        assert_eq!(as_id(&json!(3)), Some(ElementId::new(3)));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(as_f32_array::<3>(&json!([1, 2, 3])), Some([1.0, 2.0, 3.0]));
        assert_eq!(as_f32_array::<3>(&json!([1, 2])), None);
        assert_eq!(as_index_vec(&json!([0, 2, 4])), Some(vec![0, 2, 4]));
        assert_eq!(as_string_vec(&json!(["a", "b"])), Some(vec!["a".into(), "b".into()]));
    }
}
