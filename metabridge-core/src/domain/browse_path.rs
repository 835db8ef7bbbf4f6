// metabridge-core/src/domain/browse_path.rs

use serde_json::Value;

use crate::domain::entity::accessor::{first_str, lookup, lookup_str};
use crate::domain::entity::urn;

/// Turns the browse-path shapes found in exports into one ordered list of
/// path components, platform instance first.
///
/// `browsePathV2` is preferred. The first legacy `browsePaths` entry is used
/// only when the v2 structure is absent or empty, and its slash-delimited
/// segments are kept verbatim.
pub struct BrowsePathNormalizer;

impl BrowsePathNormalizer {
    /// Pure: reads the snapshot, never modifies it.
    pub fn components(snapshot: &Value) -> Vec<String> {
        let mut components = Vec::new();
        if let Some(instance) = Self::platform_instance(snapshot) {
            components.push(instance);
        }

        let structured = Self::v2_segments(snapshot);
        if structured.is_empty() {
            components.extend(Self::legacy_segments(snapshot));
        } else {
            components.extend(structured);
        }
        components
    }

    /// Platform-instance id, from a plain field or from the instance urn.
    pub fn platform_instance(snapshot: &Value) -> Option<String> {
        if let Some(id) = first_str(
            snapshot,
            &[
                &["platformInstance"],
                &["dataPlatformInstance", "instanceId"],
            ],
        ) {
            return Some(urn::platform_instance_id(id).unwrap_or(id).to_string());
        }
        lookup_str(snapshot, &["dataPlatformInstance", "urn"])
            .and_then(urn::platform_instance_id)
            .map(str::to_string)
    }

    fn v2_segments(snapshot: &Value) -> Vec<String> {
        let Some(entries) = lookup(snapshot, &["browsePathV2", "path"]).and_then(Value::as_array)
        else {
            return Vec::new();
        };

        entries
            .iter()
            .filter(|entry| {
                // The instance already leads the component list
                !lookup_str(entry, &["entity", "urn"]).is_some_and(urn::is_platform_instance)
            })
            .filter_map(|entry| {
                first_str(
                    entry,
                    &[
                        &["entity", "properties", "name"],
                        &["entity", "name"],
                        &["name"],
                    ],
                )
            })
            .map(str::to_string)
            .collect()
    }

    fn legacy_segments(snapshot: &Value) -> Vec<String> {
        let Some(first) = lookup(snapshot, &["browsePaths", "0"]) else {
            return Vec::new();
        };

        match first {
            Value::String(path) => split_slashes(path),
            Value::Object(_) => match lookup(first, &["path"]) {
                Some(Value::String(path)) => split_slashes(path),
                Some(Value::Array(parts)) => parts
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn split_slashes(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
