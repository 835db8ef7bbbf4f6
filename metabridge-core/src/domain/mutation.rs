// metabridge-core/src/domain/mutation.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationCategory {
    PlatformInstance,
    CustomProperty,
}

impl MutationCategory {
    /// Application order when every category is applied.
    pub const ALL: [MutationCategory; 2] = [Self::PlatformInstance, Self::CustomProperty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformInstance => "platform_instances",
            Self::CustomProperty => "custom_properties",
        }
    }
}

impl fmt::Display for MutationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rule table: category -> ordered `fromToken -> toToken` mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationRules {
    #[serde(default, alias = "platform_instance_mapping")]
    pub platform_instances: IndexMap<String, String>,
    #[serde(default)]
    pub custom_properties: IndexMap<String, String>,
}

impl MutationRules {
    pub fn category(&self, category: MutationCategory) -> &IndexMap<String, String> {
        match category {
            MutationCategory::PlatformInstance => &self.platform_instances,
            MutationCategory::CustomProperty => &self.custom_properties,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.platform_instances.is_empty() && self.custom_properties.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.platform_instances.len() + self.custom_properties.len()
    }

    fn category_mut(&mut self, category: MutationCategory) -> &mut IndexMap<String, String> {
        match category {
            MutationCategory::PlatformInstance => &mut self.platform_instances,
            MutationCategory::CustomProperty => &mut self.custom_properties,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for category in MutationCategory::ALL {
            for (from, to) in self.category(category) {
                check_rule(category, from, to)?;
            }
        }
        Ok(())
    }

    /// Removes every rule `validate` would reject, keeping the order of the
    /// rest. Returns one error per removed rule.
    pub fn drop_invalid(&mut self) -> Vec<DomainError> {
        let mut dropped = Vec::new();
        for category in MutationCategory::ALL {
            self.category_mut(category)
                .retain(|from, to| match check_rule(category, from, to) {
                    Ok(()) => true,
                    Err(e) => {
                        dropped.push(e);
                        false
                    }
                });
        }
        dropped
    }
}

fn check_rule(category: MutationCategory, from: &str, to: &str) -> Result<(), DomainError> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(DomainError::InvalidMutationRule {
            category: category.to_string(),
            reason: format!("empty token in rule '{}' -> '{}'", from, to),
        });
    }
    Ok(())
}

/// Translates source-environment identifier fragments into their
/// target-environment equivalents.
///
/// Two call sites, two contracts:
/// * [`MutationEngine::mutate_search_token`] always rewrites. Search filters
///   and aspect reference urns go through it.
/// * [`MutationEngine::mutate_entity_urn`] is a no-op when the export says
///   its mutations were already applied upstream.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    rules: MutationRules,
    already_applied: bool,
}

impl MutationEngine {
    pub fn new(rules: MutationRules, already_applied: bool) -> Result<Self, DomainError> {
        rules.validate()?;
        Ok(Self {
            rules,
            already_applied,
        })
    }

    /// Engine without rules: every token passes through unchanged.
    pub fn identity() -> Self {
        Self {
            rules: MutationRules::default(),
            already_applied: false,
        }
    }

    pub fn rules(&self) -> &MutationRules {
        &self.rules
    }

    pub fn mutations_already_applied(&self) -> bool {
        self.already_applied
    }

    /// Applies the rules of one category, in table order. A rule matches
    /// the whole token or a delimited fragment of it (`abc` inside
    /// `abc.sales.orders`, never inside `abcd`).
    pub fn apply(&self, token: &str, category: MutationCategory) -> String {
        self.rules
            .category(category)
            .iter()
            .fold(token.to_string(), |current, (from, to)| {
                replace_fragment(&current, from, to)
            })
    }

    /// Applies every category in turn, each on the previous output.
    pub fn apply_all(&self, token: &str) -> String {
        MutationCategory::ALL
            .iter()
            .fold(token.to_string(), |current, category| {
                self.apply(&current, *category)
            })
    }

    /// Search-token mode: never skipped. The target addresses its entities
    /// by post-mutation identifiers whatever happened to the export file.
    pub fn mutate_search_token(&self, token: &str) -> String {
        self.apply_all(token)
    }

    /// Entity-urn mode: skipped entirely when the export metadata reports
    /// `mutations_applied`.
    pub fn mutate_entity_urn(&self, urn: &str) -> String {
        if self.already_applied {
            urn.to_string()
        } else {
            self.apply_all(urn)
        }
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn replace_fragment(haystack: &str, from: &str, to: &str) -> String {
    if from.is_empty() || !haystack.contains(from) {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;

    for (start, _) in haystack.match_indices(from) {
        if start < cursor {
            continue;
        }
        let end = start + from.len();
        let bounded_left = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_token_char(c));
        let bounded_right = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_token_char(c));

        if bounded_left && bounded_right {
            out.push_str(&haystack[cursor..start]);
            out.push_str(to);
            cursor = end;
        }
    }

    out.push_str(&haystack[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn rules(pi: &[(&str, &str)], cp: &[(&str, &str)]) -> MutationRules {
        MutationRules {
            platform_instances: pi
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            custom_properties: cp
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_unknown_token_is_unchanged() -> Result<()> {
        let engine = MutationEngine::new(rules(&[("abc", "xyz")], &[]), false)?;
        assert_eq!(engine.apply_all("sales"), "sales");
        assert_eq!(engine.apply("sales", MutationCategory::PlatformInstance), "sales");
        Ok(())
    }

    #[test]
    fn test_fragment_rewrite_inside_urn() -> Result<()> {
        let engine = MutationEngine::new(rules(&[("abc", "xyz")], &[]), false)?;
        let urn = "urn:li:dataset:(urn:li:dataPlatform:mysql,abc.sales.orders,PROD)";
        assert_eq!(
            engine.mutate_search_token(urn),
            "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)"
        );
        // Not a delimited fragment
        assert_eq!(engine.apply_all("abcd.sales"), "abcd.sales");
        assert_eq!(engine.apply_all("abc_sales"), "abc_sales");
        Ok(())
    }

    #[test]
    fn test_token_in_multiple_categories_gets_all_rules() -> Result<()> {
        let engine = MutationEngine::new(
            rules(&[("abc", "xyz")], &[("prod_db", "prd_db")]),
            false,
        )?;
        assert_eq!(engine.apply_all("abc.prod_db.orders"), "xyz.prd_db.orders");
        // Single category only touches its own rules
        assert_eq!(
            engine.apply("abc.prod_db.orders", MutationCategory::CustomProperty),
            "abc.prd_db.orders"
        );
        Ok(())
    }

    #[test]
    fn test_same_token_in_both_categories_chains() -> Result<()> {
        // Platform-instance rules run first; custom-property rules see their output
        let engine = MutationEngine::new(rules(&[("abc", "xyz")], &[("abc", "qqq")]), false)?;
        assert_eq!(engine.apply_all("abc"), "xyz");
        assert_eq!(engine.apply("abc", MutationCategory::CustomProperty), "qqq");

        let chained = MutationEngine::new(rules(&[("abc", "dev")], &[("dev", "prd")]), false)?;
        assert_eq!(chained.apply_all("abc.orders"), "prd.orders");
        Ok(())
    }

    #[test]
    fn test_drop_invalid_keeps_valid_rules_in_order() {
        let mut table = rules(&[("a", "1"), ("b", " "), ("c", "3")], &[("", "x")]);
        let dropped = table.drop_invalid();
        assert_eq!(dropped.len(), 2);
        assert!(table.validate().is_ok());
        let kept: Vec<&str> = table.platform_instances.keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["a", "c"]);
        assert!(table.custom_properties.is_empty());
    }

    #[test]
    fn test_entity_urn_mode_respects_already_applied() -> Result<()> {
        let engine = MutationEngine::new(rules(&[("abc", "xyz")], &[]), true)?;
        let urn = "urn:li:dataset:(urn:li:dataPlatform:mysql,abc.orders,PROD)";
        assert_eq!(engine.mutate_entity_urn(urn), urn);
        // Search-token mode still rewrites
        assert!(engine.mutate_search_token(urn).contains("xyz.orders"));
        Ok(())
    }

    #[test]
    fn test_every_occurrence_is_rewritten() {
        assert_eq!(replace_fragment("abc.abc", "abc", "x"), "x.x");
        assert_eq!(replace_fragment("abc", "abc", "xyz"), "xyz");
        assert_eq!(replace_fragment("zabc.abc", "abc", "x"), "zabc.x");
    }

    #[test]
    fn test_empty_tokens_are_rejected() {
        let result = MutationEngine::new(rules(&[("", "xyz")], &[]), false);
        assert!(matches!(
            result,
            Err(DomainError::InvalidMutationRule { .. })
        ));
    }
}
