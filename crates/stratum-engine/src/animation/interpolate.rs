use crate::scene::Value;

/// Value between `prev` and `next` at progress `p`.
///
/// - Two arrays interpolate element-wise up to the shorter length; the longer array's
///   extra trailing elements are copied as they are.
/// - Array elements without a numeric reading keep the target's current element
///   (`current`), falling back to `prev`'s.
/// - Two scalars interpolate linearly when both read as numbers.
///
/// Returns `None` when nothing should be written (non-numeric scalars, or an array paired
/// with a scalar).
pub fn interpolate(prev: &Value, next: &Value, p: f64, current: Option<&Value>) -> Option<Value> {
    match (prev, next) {
        (Value::Array(a), Value::Array(b)) => {
            let shared = a.len().min(b.len());
            let longer = if a.len() >= b.len() { a } else { b };
            let current = current.and_then(Value::as_array);

            let mut out = Vec::with_capacity(longer.len());
            for (i, (x, y)) in a.iter().zip(b).enumerate() {
                let here = current.and_then(|c| c.get(i));
                let value = interpolate(x, y, p, here)
                    .or_else(|| here.cloned())
                    .unwrap_or_else(|| x.clone());
                out.push(value);
            }
            out.extend_from_slice(&longer[shared..]);
            Some(Value::Array(out))
        }
        _ => {
            let from = prev.as_number()?;
            let to = next.as_number()?;
            Some(Value::Number(from + (to - from) * p))
        }
    }
}
