// metabridge-core/src/domain/entity/urn.rs

const URN_PREFIX: &str = "urn:li:";
const PLATFORM_PREFIX: &str = "urn:li:dataPlatform:";
const PLATFORM_INSTANCE_PREFIX: &str = "urn:li:dataPlatformInstance:";

/// Environment marker that closes a dataset urn in the source catalog.
pub const PROD_MARKER: &str = ",PROD)";

/// `urn:li:dataset:(...)` -> `dataset`.
pub fn entity_type(urn: &str) -> Option<&str> {
    let rest = urn.strip_prefix(URN_PREFIX)?;
    let end = rest.find(':')?;
    Some(&rest[..end]).filter(|t| !t.is_empty())
}

/// Comparable form of an entity type, whichever spelling it arrives in:
/// GraphQL enum names (`DATA_JOB`), urn segments (`dataJob`) and plain
/// lowercase (`datajob`) all give `datajob`.
pub fn entity_type_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Platform name embedded in a urn, e.g. `mysql` for a mysql dataset.
pub fn platform(urn: &str) -> Option<&str> {
    let start = urn.find(PLATFORM_PREFIX)? + PLATFORM_PREFIX.len();
    let rest = &urn[start..];
    let end = rest.find([',', ')']).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|p| !p.is_empty())
}

/// Accepts either a bare platform name or a platform urn.
pub fn platform_name(raw: &str) -> &str {
    raw.strip_prefix(PLATFORM_PREFIX).unwrap_or(raw)
}

/// Instance id of a `urn:li:dataPlatformInstance:(platform,instance)` urn.
pub fn platform_instance_id(urn: &str) -> Option<&str> {
    let rest = urn.strip_prefix(PLATFORM_INSTANCE_PREFIX)?;
    let inner = rest.trim_start_matches('(').trim_end_matches(')');
    inner.rsplit(',').next().filter(|id| !id.is_empty())
}

pub fn is_platform_instance(urn: &str) -> bool {
    urn.starts_with(PLATFORM_INSTANCE_PREFIX)
}

/// The trailing comma-delimited component before the `,PROD)` marker:
/// `urn:li:dataset:(urn:li:dataPlatform:mysql,abc.sales.orders,PROD)`
/// yields `abc.sales.orders`.
pub fn qualified_name(urn: &str) -> Option<&str> {
    let end = urn.find(PROD_MARKER)?;
    urn[..end].rsplit(',').next().filter(|n| !n.is_empty())
}
