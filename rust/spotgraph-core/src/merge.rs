use serde_json::{Map, Value};

/// Combines a base map info document with a supplemental one.
///
/// Fields holding arrays in both documents are concatenated, base first. Every other
/// field takes the supplement's value when present, else the base's. Neither input is
/// modified. When either side is not an object the supplement wins wholesale.
pub fn merge_info(base: &Value, supplement: &Value) -> Value {
    let (Value::Object(b), Value::Object(s)) = (base, supplement) else {
        return supplement.clone();
    };
    let mut out: Map<String, Value> = b.clone();
    for (key, incoming) in s {
        let merged = match (b.get(key), incoming) {
            (Some(Value::Array(existing)), Value::Array(extra)) => {
                let mut joined = Vec::with_capacity(existing.len() + extra.len());
                joined.extend(existing.iter().cloned());
                joined.extend(extra.iter().cloned());
                Value::Array(joined)
            }
            _ => incoming.clone(),
        };
        out.insert(key.clone(), merged);
    }
    Value::Object(out)
}

/// Folds a chain of supplements into `base`, left to right.
pub fn merge_all<'a, I>(base: &Value, supplements: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    supplements.into_iter().fold(base.clone(), |acc, s| merge_info(&acc, s))
}
