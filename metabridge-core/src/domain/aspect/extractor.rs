// metabridge-core/src/domain/aspect/extractor.rs

use serde_json::Value;

use crate::domain::aspect::payload::PropertyValue;
use crate::domain::entity::accessor::{first_present, first_str, lookup};

/// Structured-property values read from a source snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValues {
    pub property_urn: String,
    pub values: Vec<PropertyValue>,
}

/// Tag/term references attached to one schema field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldAnnotations {
    pub field_path: String,
    pub tags: Vec<String>,
    pub terms: Vec<String>,
}

/// Reads aspect references out of a raw source snapshot. Accepts the
/// GraphQL export shape (`{"tags": [{"tag": {"urn": ...}}]}`) as well as
/// flat lists of urns. Returned urns are pre-mutation and de-duplicated in
/// first-seen order. Errors are reasons, the caller adds entity context.
pub struct AspectExtractor;

impl AspectExtractor {
    pub fn tags(raw: &Value) -> Result<Vec<String>, String> {
        match first_present(raw, &[&["globalTags"], &["tags"]]) {
            Some(node) => collect_urns(node, "tags", &["tag"]),
            None => Ok(Vec::new()),
        }
    }

    pub fn glossary_terms(raw: &Value) -> Result<Vec<String>, String> {
        match first_present(raw, &[&["glossaryTerms"], &["terms"]]) {
            Some(node) => collect_urns(node, "terms", &["term"]),
            None => Ok(Vec::new()),
        }
    }

    pub fn domain(raw: &Value) -> Result<Option<String>, String> {
        let Some(node) = first_present(raw, &[&["domain"], &["domains"]]) else {
            return Ok(None);
        };

        match node {
            Value::String(urn) => Ok(Some(urn.trim().to_string()).filter(|u| !u.is_empty())),
            Value::Object(_) if lookup(node, &["domains"]).is_some() => {
                Ok(collect_urns(node, "domains", &["domain"])?.into_iter().next())
            }
            Value::Object(_) => first_str(node, &[&["domain", "urn"], &["urn"], &["domain"]])
                .map(|urn| Some(urn.to_string()))
                .ok_or_else(|| "domain has no urn".to_string()),
            Value::Array(_) => Ok(collect_urns(node, "domains", &["domain"])?.into_iter().next()),
            _ => Err("domain must be a urn string, an object or a list".to_string()),
        }
    }

    pub fn structured_properties(raw: &Value) -> Result<Vec<PropertyValues>, String> {
        let Some(node) = first_present(raw, &[&["structuredProperties"]]) else {
            return Ok(Vec::new());
        };
        let items = list_at(node, "properties")?;

        let mut properties = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let property_urn = first_str(
                item,
                &[&["propertyUrn"], &["structuredProperty", "urn"], &["urn"]],
            )
            .ok_or_else(|| format!("property #{} has no urn", i))?;

            let values = match first_present(item, &[&["values"], &["value"]]) {
                None => Vec::new(),
                Some(Value::Array(raw_values)) => raw_values
                    .iter()
                    .map(parse_property_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("property '{}': {}", property_urn, e))?,
                Some(single) => vec![
                    parse_property_value(single)
                        .map_err(|e| format!("property '{}': {}", property_urn, e))?,
                ],
            };

            if values.is_empty() {
                continue;
            }
            properties.push(PropertyValues {
                property_urn: property_urn.to_string(),
                values,
            });
        }
        Ok(properties)
    }

    /// One result per schema field, so a malformed field only costs itself.
    pub fn schema_fields(raw: &Value) -> Vec<Result<FieldAnnotations, String>> {
        let Some(node) = first_present(
            raw,
            &[
                &["schemaFields"],
                &["editableSchemaMetadata", "editableSchemaFieldInfo"],
                &["schemaMetadata", "fields"],
            ],
        ) else {
            return Vec::new();
        };

        let Some(fields) = node.as_array() else {
            return vec![Err("schema fields are not a list".to_string())];
        };

        fields
            .iter()
            .enumerate()
            .map(|(i, field)| -> Result<FieldAnnotations, String> {
                let field_path = first_str(field, &[&["fieldPath"]])
                    .ok_or_else(|| format!("schema field #{} has no fieldPath", i))?;
                let with_context = |e: String| format!("field '{}': {}", field_path, e);

                let tags = match first_present(field, &[&["tags"], &["globalTags"]]) {
                    Some(node) => collect_urns(node, "tags", &["tag"]).map_err(with_context)?,
                    None => Vec::new(),
                };
                let terms = match first_present(field, &[&["glossaryTerms"], &["terms"]]) {
                    Some(node) => collect_urns(node, "terms", &["term"]).map_err(with_context)?,
                    None => Vec::new(),
                };

                Ok(FieldAnnotations {
                    field_path: field_path.to_string(),
                    tags,
                    terms,
                })
            })
            .collect()
    }
}

/// A list either given directly or wrapped as `{"<key>": [...]}`.
fn list_at<'a>(node: &'a Value, key: &str) -> Result<&'a [Value], String> {
    match node {
        Value::Array(items) => Ok(items),
        Value::Object(_) => match lookup(node, &[key]) {
            Some(Value::Array(items)) => Ok(items),
            None => Ok(&[]),
            Some(_) => Err(format!("'{}' is not a list", key)),
        },
        _ => Err(format!("expected a list of {}", key)),
    }
}

fn collect_urns(node: &Value, list_key: &str, item_keys: &[&str]) -> Result<Vec<String>, String> {
    let items = list_at(node, list_key)?;

    let mut urns: Vec<String> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let urn = item_urn(item, item_keys)
            .ok_or_else(|| format!("{} entry #{} has no urn", list_key, i))?;
        if !urns.iter().any(|seen| seen == urn) {
            urns.push(urn.to_string());
        }
    }
    Ok(urns)
}

fn item_urn<'a>(item: &'a Value, item_keys: &[&str]) -> Option<&'a str> {
    if let Value::String(urn) = item {
        return Some(urn.trim()).filter(|u| !u.is_empty());
    }
    item_keys
        .iter()
        .find_map(|key| first_str(item, &[&[*key, "urn"], &[*key]]))
        .or_else(|| first_str(item, &[&["urn"]]))
}

fn parse_property_value(value: &Value) -> Result<PropertyValue, String> {
    match value {
        Value::String(s) => Ok(PropertyValue::String(s.clone())),
        Value::Number(n) => n
            .as_f64()
            .map(PropertyValue::Double)
            .ok_or_else(|| format!("number {} is out of range", n)),
        Value::Object(_) => {
            if let Some(s) = first_str(value, &[&["stringValue"], &["string"]]) {
                return Ok(PropertyValue::String(s.to_string()));
            }
            first_present(value, &[&["numberValue"], &["double"]])
                .and_then(Value::as_f64)
                .map(PropertyValue::Double)
                .ok_or_else(|| "value has neither a string nor a number".to_string())
        }
        other => Err(format!("unsupported value {}", other)),
    }
}
