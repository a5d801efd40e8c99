//! Query string parsing and building.
//!
//! Keys and values are percent-decoded (`+` decodes to a space). A bare key
//! without `=` decodes to an empty value. The flat parser keeps the last
//! value for repeated keys; [`parse_query_string_multi`] keeps them all.

use std::collections::HashMap;

use serde_json::{Map, Value};

fn strip_prefix(query: &str) -> &str {
    let query = query.strip_prefix('?').unwrap_or(query);
    match query.find('#') {
        Some(pos) => &query[..pos],
        None => query,
    }
}

fn pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    url::form_urlencoded::parse(strip_prefix(query).as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .filter(|(k, v)| !(k.is_empty() && v.is_empty()))
}

/// Parses `a=1&b=2` into a map. Repeated keys overwrite.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    pairs(query).collect()
}

/// Parses a query string keeping every value of repeated keys, in order.
pub fn parse_query_string_multi(query: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for (k, v) in pairs(query) {
        params.entry(k).or_default().push(v);
    }
    params
}

/// Splits `user[name][first]` into `["user", "name", "first"]`.
///
/// `list[]` yields an empty trailing segment. Keys with unbalanced brackets
/// are returned whole.
fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            return vec![key];
        };
        segments.push(&stripped[..close]);
        rest = &stripped[close + 1..];
    }

    if rest.is_empty() { segments } else { vec![key] }
}

fn insert_nested(target: &mut Map<String, Value>, path: &[&str], value: String) {
    let (head, tail) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    if tail.is_empty() {
        target.insert(head.to_string(), Value::String(value));
        return;
    }

    if tail[0].is_empty() {
        // `key[]=value` appends to a list
        let slot = target
            .entry(head.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(Value::String(value));
        }
        return;
    }

    let slot = target
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(inner) = slot {
        insert_nested(inner, tail, value);
    }
}

/// Parses bracketed keys into nested objects.
///
/// `user[name]=John&user[age]=30` becomes
/// `{"user": {"name": "John", "age": "30"}}` and `tag[]=a&tag[]=b` becomes
/// `{"tag": ["a", "b"]}`. Leaf values are always strings.
pub fn parse_nested_query(query: &str) -> Value {
    let mut root = Map::new();
    for (k, v) in pairs(query) {
        let path = split_key(&k);
        insert_nested(&mut root, &path, v);
    }
    Value::Object(root)
}

/// Encodes pairs as `application/x-www-form-urlencoded`.
///
/// Pairs are emitted in iteration order; pass a `BTreeMap` for stable output.
pub fn build_query_string<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        serializer.append_pair(k.as_ref(), v.as_ref());
    }
    serializer.finish()
}
