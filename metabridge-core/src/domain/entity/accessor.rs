// metabridge-core/src/domain/entity/accessor.rs
//
// Chained optional lookup over raw JSON snapshots. Every read of nested
// export data goes through here instead of hand-written null guards.

use serde_json::Value;

/// Walks `path` from `value`. Object keys are looked up by name, array
/// elements by their decimal index. `null` at the end of the path is
/// reported as absent.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| match current {
            Value::Object(map) => map.get(*key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|found| !found.is_null())
}

/// Non-empty string at `path`.
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string found among several candidate paths.
pub fn first_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|path| lookup_str(value, path))
}

/// First present value among several candidate paths.
pub fn first_present<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(value, path))
}
