// metabridge-core/src/infrastructure/adapters/datahub.rs

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::aspect::payload::{EditableSchemaFieldInfo, GlobalTags, GlossaryTerms};
use crate::domain::aspect::{AspectPayload, McpTask};
use crate::domain::entity::accessor::{first_str, lookup};
use crate::domain::entity::{TargetEntityRecord, urn};
use crate::error::MetabridgeError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::catalog::{SearchPage, SearchRequest, TargetCatalog};

const SEARCH_QUERY: &str = r#"query search($input: SearchAcrossEntitiesInput!) {
  searchAcrossEntities(input: $input) {
    start
    count
    total
    searchResults {
      entity {
        urn
        type
        ... on Dataset { name platform { name } properties { name } }
        ... on Chart { platform { name } properties { name } }
        ... on Dashboard { platform { name } properties { name } }
        ... on DataFlow { platform { name } properties { name } }
        ... on DataJob { properties { name } }
        ... on Container { platform { name } properties { name } }
        ... on MLModel { name platform { name } }
      }
    }
  }
}"#;

/// GraphQL entity-type enum names for the lowercase types used internally.
const ENTITY_TYPES: [(&str, &str); 10] = [
    ("dataset", "DATASET"),
    ("chart", "CHART"),
    ("dashboard", "DASHBOARD"),
    ("dataflow", "DATA_FLOW"),
    ("datajob", "DATA_JOB"),
    ("container", "CONTAINER"),
    ("mlmodel", "MLMODEL"),
    ("mlfeature", "MLFEATURE"),
    ("glossaryterm", "GLOSSARY_TERM"),
    ("mlfeaturetable", "MLFEATURE_TABLE"),
];

/// Target catalog reached over DataHub's GraphQL search and REST ingest
/// endpoints.
pub struct DataHubCatalog {
    client: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl DataHubCatalog {
    pub fn new(server: &str, token: Option<String>) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("metabridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn post(&self, url: String, body: &Value) -> Result<Value, InfrastructureError> {
        let mut request = self
            .client
            .post(&url)
            .header("X-RestLi-Protocol-Version", "2.0.0")
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(InfrastructureError::CatalogResponse(format!(
                "{} returned {}: {}",
                url,
                status,
                truncate(&text, 300)
            )));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl TargetCatalog for DataHubCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, MetabridgeError> {
        let body = search_body(request);
        debug!(body = %body, "GraphQL search");
        let response = self
            .post(format!("{}/api/graphql", self.server), &body)
            .await?;
        Ok(parse_search_response(&response)?)
    }

    async fn emit(&self, task: &McpTask) -> Result<(), MetabridgeError> {
        let body = proposal_body(task)?;
        self.post(
            format!("{}/aspects?action=ingestProposal", self.server),
            &body,
        )
        .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "datahub"
    }
}

fn graphql_entity_type(entity_type: &str) -> String {
    let key = urn::entity_type_key(entity_type);
    ENTITY_TYPES
        .iter()
        .find(|(internal, _)| *internal == key)
        .map(|(_, graphql)| graphql.to_string())
        .unwrap_or_else(|| key.to_uppercase())
}

pub fn search_body(request: &SearchRequest) -> Value {
    let types: Vec<String> = request
        .entity_types
        .iter()
        .map(|t| graphql_entity_type(t))
        .collect();
    let or_filters: Vec<Value> = request
        .or_filters
        .iter()
        .map(|group| json!({ "and": group }))
        .collect();

    let mut input = json!({
        "query": request.query,
        "start": 0,
        "count": request.count,
    });
    if !types.is_empty() {
        input["types"] = json!(types);
    }
    if !or_filters.is_empty() {
        input["orFilters"] = json!(or_filters);
    }

    json!({ "query": SEARCH_QUERY, "variables": { "input": input } })
}

pub fn parse_search_response(response: &Value) -> Result<SearchPage, InfrastructureError> {
    if let Some(errors) = lookup(response, &["errors"]).and_then(Value::as_array)
        && !errors.is_empty()
    {
        let messages: Vec<&str> = errors
            .iter()
            .filter_map(|e| first_str(e, &[&["message"]]))
            .collect();
        return Err(InfrastructureError::CatalogResponse(format!(
            "GraphQL errors: {}",
            messages.join("; ")
        )));
    }

    let result = lookup(response, &["data", "searchAcrossEntities"]).ok_or_else(|| {
        InfrastructureError::CatalogResponse("missing data.searchAcrossEntities".to_string())
    })?;

    let entities: Vec<TargetEntityRecord> = lookup(result, &["searchResults"])
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| lookup(r, &["entity"]))
                .filter_map(parse_entity)
                .collect()
        })
        .unwrap_or_default();

    let total = lookup(result, &["total"])
        .and_then(Value::as_u64)
        .map(|t| t as usize)
        .unwrap_or(entities.len());

    Ok(SearchPage { entities, total })
}

fn parse_entity(entity: &Value) -> Option<TargetEntityRecord> {
    let entity_urn = first_str(entity, &[&["urn"]])?;
    let entity_type = first_str(entity, &[&["type"]])
        .or_else(|| urn::entity_type(entity_urn))
        .map(urn::entity_type_key)?;
    let name = first_str(entity, &[&["name"], &["properties", "name"]])
        .map(str::to_string)
        .or_else(|| urn::qualified_name(entity_urn).map(str::to_string))?;
    let platform = first_str(entity, &[&["platform", "name"]])
        .or_else(|| urn::platform(entity_urn))
        .unwrap_or_default()
        .to_string();

    Some(TargetEntityRecord {
        urn: entity_urn.to_string(),
        entity_type,
        platform,
        name,
        browse_path: String::new(),
    })
}

/// Ingest-proposal body. Entity-level aspects replace the whole aspect;
/// schema-field annotations are keyed patch operations on
/// `editableSchemaMetadata` so sibling fields stay untouched and a replay
/// rewrites the same keys.
pub fn proposal_body(task: &McpTask) -> Result<Value, InfrastructureError> {
    let entity_type = urn::entity_type(&task.entity_urn).ok_or_else(|| {
        InfrastructureError::CatalogResponse(format!(
            "cannot derive entity type from '{}'",
            task.entity_urn
        ))
    })?;

    let (change_type, aspect_name, aspect_value) = match &task.payload {
        AspectPayload::EditableSchemaFieldInfo(field) => (
            "PATCH",
            "editableSchemaMetadata",
            Value::Array(field_patch(field)),
        ),
        other => ("UPSERT", task.aspect_name(), other.to_value()?),
    };

    Ok(json!({
        "proposal": {
            "entityType": entity_type,
            "entityUrn": task.entity_urn,
            "changeType": change_type,
            "aspectName": aspect_name,
            "aspect": {
                "value": serde_json::to_string(&aspect_value)?,
                "contentType": "application/json"
            }
        }
    }))
}

fn field_patch(field: &EditableSchemaFieldInfo) -> Vec<Value> {
    let base = format!("/editableSchemaFieldInfo/{}", escape_pointer(&field.field_path));
    let mut ops = Vec::new();

    if let Some(GlobalTags { tags }) = &field.global_tags {
        for tag in tags {
            ops.push(json!({
                "op": "add",
                "path": format!("{}/globalTags/tags/{}", base, escape_pointer(&tag.tag)),
                "value": tag
            }));
        }
    }
    if let Some(GlossaryTerms { terms, .. }) = &field.glossary_terms {
        for term in terms {
            ops.push(json!({
                "op": "add",
                "path": format!("{}/glossaryTerms/terms/{}", base, escape_pointer(&term.urn)),
                "value": term
            }));
        }
    }
    ops
}

/// JSON-pointer token escaping (RFC 6901).
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
