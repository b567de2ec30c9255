use indexmap::IndexMap;

/// Dynamically typed property value carried by styles and custom record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Numeric reading of a scalar.
    ///
    /// Text is read like a lenient float parse: leading whitespace is skipped and the
    /// longest numeric prefix wins (`"12px"` reads as `12`). Booleans, containers and
    /// NaN have no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Text(s) => parse_float_prefix(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Deep merge with overwrite.
    ///
    /// Maps merge key by key, arrays are overwritten element by element (growing when
    /// the patch is longer), every other combination replaces `self`.
    pub fn merge(&mut self, patch: Value) {
        match (self, patch) {
            (Value::Map(dst), Value::Map(src)) => merge_maps(dst, src),
            (Value::Array(dst), Value::Array(src)) => {
                for (i, item) in src.into_iter().enumerate() {
                    match dst.get_mut(i) {
                        Some(slot) => slot.merge(item),
                        None => dst.push(item),
                    }
                }
            }
            (slot, patch) => *slot = patch,
        }
    }
}

/// Key-by-key deep merge of `src` into `dst`.
pub(crate) fn merge_maps(dst: &mut IndexMap<String, Value>, src: IndexMap<String, Value>) {
    for (key, value) in src {
        match dst.get_mut(&key) {
            Some(slot) => slot.merge(value),
            None => {
                dst.insert(key, value);
            }
        }
    }
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .map_or(s.len(), |(i, _)| i);
    // Every candidate char is ASCII, so each byte offset is a char boundary.
    (1..=end).rev().find_map(|i| s[..i].parse::<f64>().ok().filter(|n| !n.is_nan()))
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Value::Array(v.iter().copied().map(Value::Number).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Value)]) -> Value {
        Value::Map(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    // ── as_number ─────────────────────────────────────────────────────────

    #[test]
    fn number_reading_of_text_uses_leading_prefix() {
        assert_eq!(Value::from("12px").as_number(), Some(12.0));
        assert_eq!(Value::from("  -3.5e2xyz").as_number(), Some(-350.0));
        assert_eq!(Value::from("1e").as_number(), Some(1.0));
        assert_eq!(Value::from("px12").as_number(), None);
    }

    #[test]
    fn non_scalars_have_no_number() {
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::from(vec![1.0]).as_number(), None);
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
    }

    // ── merge ─────────────────────────────────────────────────────────────

    #[test]
    fn merge_overwrites_arrays_element_wise() {
        let mut v = Value::from([1.0, 2.0, 3.0]);
        v.merge(Value::from([9.0]));
        assert_eq!(v, Value::from([9.0, 2.0, 3.0]));

        v.merge(Value::from([0.0, 0.0, 0.0, 4.0]));
        assert_eq!(v, Value::from([0.0, 0.0, 0.0, 4.0]));
    }

    #[test]
    fn merge_recurses_into_maps() {
        let mut v = map(&[("r", 10.0.into()), ("inner", map(&[("a", 1.0.into()), ("b", 2.0.into())]))]);
        v.merge(map(&[("inner", map(&[("b", 5.0.into())])), ("color", "red".into())]));

        let expected = map(&[
            ("r", 10.0.into()),
            ("inner", map(&[("a", 1.0.into()), ("b", 5.0.into())])),
            ("color", "red".into()),
        ]);
        assert_eq!(v, expected);
    }

    #[test]
    fn merge_replaces_mismatched_kinds() {
        let mut v = Value::from([1.0, 2.0]);
        v.merge(Value::from("flat"));
        assert_eq!(v, Value::from("flat"));
    }
}
