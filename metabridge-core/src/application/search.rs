// metabridge-core/src/application/search.rs

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domain::entity::{SourceEntityRecord, TargetEntityRecord};
use crate::domain::matching::NameComparator;
use crate::domain::mutation::MutationEngine;
use crate::error::MetabridgeError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::catalog::{FilterCriterion, SearchPage, SearchRequest, TargetCatalog};

const BROWSE_PATH_V2_FIELD: &str = "browsePathV2";
const LEGACY_BROWSE_PATH_FIELD: &str = "browsePaths";

/// Search inputs derived once from the valid source set. Every list keeps
/// first-seen order and holds no duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParameters {
    /// Browse-path components after search-token mutation.
    pub browse_components: Vec<String>,
    pub platforms: Vec<String>,
    pub entity_types: Vec<String>,
    /// Bare source names, unmutated.
    pub names: Vec<String>,
    pub platform_instances: Vec<String>,
}

impl SearchParameters {
    pub fn derive(sources: &[SourceEntityRecord], engine: &MutationEngine) -> Self {
        let mut browse_components = IndexSet::new();
        let mut platforms = IndexSet::new();
        let mut entity_types = IndexSet::new();
        let mut names = IndexSet::new();
        let mut platform_instances = IndexSet::new();

        for source in sources {
            for component in &source.path_components {
                browse_components.insert(engine.mutate_search_token(component));
            }
            if !source.platform.is_empty() {
                platforms.insert(source.platform.clone());
            }
            entity_types.insert(source.entity_type.clone());
            names.insert(source.name.clone());
            if let Some(instance) = &source.platform_instance {
                platform_instances.insert(engine.mutate_search_token(instance));
            }
        }

        Self {
            browse_components: browse_components.into_iter().collect(),
            platforms: platforms.into_iter().collect(),
            entity_types: entity_types.into_iter().collect(),
            names: names.into_iter().collect(),
            platform_instances: platform_instances.into_iter().collect(),
        }
    }

    /// Platform filter applied client-side: the server-side one is not
    /// reliable. Targets with no known platform are kept.
    fn accepts_platform(&self, target: &TargetEntityRecord) -> bool {
        if self.platforms.is_empty() {
            return true;
        }
        let platform = target.platform_name();
        platform.is_empty() || self.platforms.contains(&platform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    BrowsePath,
    NamePlatform,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrowsePath => write!(f, "browse-path"),
            Self::NamePlatform => write!(f, "name+platform"),
        }
    }
}

/// What one strategy did. A failed strategy contributes nothing but the
/// other one still runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    pub strategy: SearchStrategy,
    pub executed: bool,
    /// Entities in the returned page.
    pub returned: usize,
    /// Hits reported by the catalog.
    pub total: usize,
    /// Entities left after client-side filtering.
    pub kept: usize,
    pub error: Option<String>,
}

impl StrategyReport {
    fn skipped(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            executed: false,
            returned: 0,
            total: 0,
            kept: 0,
            error: None,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.returned < self.total
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Union of both strategies, de-duplicated by urn, browse-path hits first.
    pub entities: Vec<TargetEntityRecord>,
    pub reports: Vec<StrategyReport>,
}

impl SearchResults {
    pub fn degradations(&self) -> usize {
        self.reports.iter().filter(|r| r.is_degraded()).count()
    }

    pub fn truncations(&self) -> usize {
        self.reports.iter().filter(|r| r.is_truncated()).count()
    }
}

/// Queries the target catalog with the two independent strategies.
pub struct TargetSearchClient<'c> {
    catalog: &'c dyn TargetCatalog,
    page_size: usize,
    timeout: Duration,
}

impl<'c> TargetSearchClient<'c> {
    pub fn new(catalog: &'c dyn TargetCatalog, page_size: usize, timeout: Duration) -> Self {
        Self {
            catalog,
            page_size,
            timeout,
        }
    }

    #[instrument(skip_all, fields(backend = self.catalog.backend_name()))]
    pub async fn search(&self, params: &SearchParameters) -> SearchResults {
        let mut by_urn: IndexMap<String, TargetEntityRecord> = IndexMap::new();
        let mut reports = Vec::with_capacity(2);

        let browse = self.browse_path_search(params, &mut by_urn).await;
        reports.push(browse);
        let by_name = self.name_platform_search(params, &mut by_urn).await;
        reports.push(by_name);

        for report in &reports {
            if report.is_truncated() {
                warn!(
                    strategy = %report.strategy,
                    returned = report.returned,
                    total = report.total,
                    "Search truncated at page size, some targets were not fetched"
                );
            }
        }
        info!(targets = by_urn.len(), "Target search complete");

        SearchResults {
            entities: by_urn.into_values().collect(),
            reports,
        }
    }

    async fn browse_path_search(
        &self,
        params: &SearchParameters,
        by_urn: &mut IndexMap<String, TargetEntityRecord>,
    ) -> StrategyReport {
        let strategy = SearchStrategy::BrowsePath;
        if params.browse_components.is_empty() {
            return StrategyReport::skipped(strategy);
        }

        let request = SearchRequest {
            query: "*".to_string(),
            entity_types: params.entity_types.clone(),
            or_filters: vec![
                vec![FilterCriterion::contains(
                    BROWSE_PATH_V2_FIELD,
                    params.browse_components.clone(),
                )],
                vec![FilterCriterion::contains(
                    LEGACY_BROWSE_PATH_FIELD,
                    params.browse_components.clone(),
                )],
            ],
            count: self.page_size,
        };

        self.run(strategy, &request, by_urn, |target| {
            params.accepts_platform(target)
        })
        .await
    }

    async fn name_platform_search(
        &self,
        params: &SearchParameters,
        by_urn: &mut IndexMap<String, TargetEntityRecord>,
    ) -> StrategyReport {
        let strategy = SearchStrategy::NamePlatform;
        if params.names.is_empty() {
            return StrategyReport::skipped(strategy);
        }

        let request = SearchRequest {
            query: "*".to_string(),
            entity_types: params.entity_types.clone(),
            or_filters: Vec::new(),
            count: self.page_size,
        };

        self.run(strategy, &request, by_urn, |target| {
            params.accepts_platform(target)
                && NameComparator::matches_any(
                    &target.name,
                    &target.urn,
                    params.names.iter().map(String::as_str),
                )
        })
        .await
    }

    async fn run<F>(
        &self,
        strategy: SearchStrategy,
        request: &SearchRequest,
        by_urn: &mut IndexMap<String, TargetEntityRecord>,
        keep: F,
    ) -> StrategyReport
    where
        F: Fn(&TargetEntityRecord) -> bool,
    {
        let page = match self.fetch(request).await {
            Ok(page) => page,
            Err(e) => {
                warn!(strategy = %strategy, error = %e, "Search failed, continuing without its results");
                return StrategyReport {
                    executed: true,
                    error: Some(e.to_string()),
                    ..StrategyReport::skipped(strategy)
                };
            }
        };

        let SearchPage { entities, total } = page;
        let returned = entities.len();
        let mut kept = 0;
        for target in entities.into_iter().filter(|t| keep(t)) {
            kept += 1;
            by_urn.entry(target.urn.clone()).or_insert(target);
        }
        info!(strategy = %strategy, returned, total, kept, "Search strategy finished");

        StrategyReport {
            strategy,
            executed: true,
            returned,
            total,
            kept,
            error: None,
        }
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<SearchPage, MetabridgeError> {
        match tokio::time::timeout(self.timeout, self.catalog.search(request)).await {
            Ok(result) => result,
            Err(_) => Err(InfrastructureError::Timeout {
                operation: "Target search".to_string(),
                secs: self.timeout.as_secs(),
            }
            .into()),
        }
    }
}
