pub mod catalog;

pub use catalog::{FilterCondition, FilterCriterion, SearchPage, SearchRequest, TargetCatalog};
