// metabridge-core/src/domain/matching/comparator.rs

use crate::domain::entity::urn;

/// Deliberately fuzzy name comparison between a target entity and a source
/// name. It tolerates schema-qualified names that differ between
/// environments and may over- or under-match; callers read the match
/// confidence rather than relying on it being exact.
pub struct NameComparator;

impl NameComparator {
    /// True when `entity_name` is the source name itself or carries it
    /// behind/ahead of a `.` or `_` separator. The qualified name inside
    /// `entity_urn` only gets the suffix checks.
    pub fn matches(entity_name: &str, entity_urn: &str, source_name: &str) -> bool {
        if source_name.is_empty() {
            return false;
        }
        if entity_name == source_name
            || Self::suffix_match(entity_name, source_name)
            || Self::prefix_match(entity_name, source_name)
        {
            return true;
        }
        urn::qualified_name(entity_urn)
            .is_some_and(|qualified| Self::suffix_match(qualified, source_name))
    }

    /// True when any of `source_names` matches.
    pub fn matches_any<'a, I>(entity_name: &str, entity_urn: &str, source_names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        source_names
            .into_iter()
            .any(|source| Self::matches(entity_name, entity_urn, source))
    }

    fn suffix_match(candidate: &str, source: &str) -> bool {
        ['.', '_']
            .iter()
            .any(|sep| candidate.ends_with(&format!("{sep}{source}")))
    }

    fn prefix_match(candidate: &str, source: &str) -> bool {
        ['.', '_']
            .iter()
            .any(|sep| candidate.starts_with(&format!("{source}{sep}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_URN: &str = "";

    #[test]
    fn test_exact_and_affix_matches() {
        assert!(NameComparator::matches("orders", NO_URN, "orders"));
        assert!(NameComparator::matches("xyz.sales.orders", NO_URN, "orders"));
        assert!(NameComparator::matches("stg_orders", NO_URN, "orders"));
        assert!(NameComparator::matches("orders.v2", NO_URN, "orders"));
        assert!(NameComparator::matches("orders_archive", NO_URN, "orders"));
    }

    #[test]
    fn test_non_matches() {
        assert!(!NameComparator::matches("preorders", NO_URN, "orders"));
        assert!(!NameComparator::matches("Orders", NO_URN, "orders"));
        assert!(!NameComparator::matches("orders", NO_URN, ""));
    }

    #[test]
    fn test_match_through_urn_qualified_name() {
        let urn = "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)";
        // Display name differs, urn carries the qualified table name
        assert!(NameComparator::matches("Orders Table", urn, "orders"));
        assert!(NameComparator::matches("Orders Table", urn, "sales.orders"));
        let dev = "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,DEV)";
        assert!(!NameComparator::matches("Orders Table", dev, "orders"));
    }

    #[test]
    fn test_urn_branch_only_checks_suffixes() {
        let bare = "urn:li:dataset:(urn:li:dataPlatform:mysql,orders,PROD)";
        assert!(!NameComparator::matches("Orders Table", bare, "orders"));
        let archive = "urn:li:dataset:(urn:li:dataPlatform:mysql,orders_archive,PROD)";
        assert!(!NameComparator::matches("Archive", archive, "orders"));
        let staged = "urn:li:dataset:(urn:li:dataPlatform:mysql,stg_orders,PROD)";
        assert!(NameComparator::matches("Staged", staged, "orders"));
    }

    #[test]
    fn test_matches_any() {
        assert!(NameComparator::matches_any(
            "xyz.sales.orders",
            NO_URN,
            ["customers", "orders"]
        ));
        assert!(!NameComparator::matches_any("xyz.sales.orders", NO_URN, ["customers"]));
    }
}
