// metabridge-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (interfaces)
// The target-catalog contract (search, emit).
pub mod ports;

// 2. Domain (business core)
// Entity records, browse paths, mutation rules, matching, change proposals.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (adapters)
// Config files, export loader, task files, DataHub and snapshot catalogs.
pub mod infrastructure;

// 4. Application (use cases)
// Migration pipeline, replay of dry-run output, export inspection.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::MetabridgeError;
