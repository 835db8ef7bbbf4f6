// metabridge/src/commands/inspect.rs
//
// USE CASE: Summarize an export file before migrating it.

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use std::path::PathBuf;

use metabridge_core::application::inspect_export;

pub fn execute(input: PathBuf) -> anyhow::Result<()> {
    let report = inspect_export(&input)
        .with_context(|| format!("Failed to inspect export {:?}", input))?;

    println!("\n🔍 Export: {}", input.display());
    println!("   Shape:             {}", report.shape.as_str());
    println!(
        "   Environment:       {}",
        report.environment.as_deref().unwrap_or("(not set)")
    );
    println!("   Mutations applied: {}", report.mutations_applied);
    println!("   Embedded rules:    {}", report.embedded_rules);
    println!(
        "   Entities:          {} ({} valid, {} invalid, {} with platform instance)",
        report.total,
        report.valid,
        report.invalid.len(),
        report.with_platform_instance
    );

    if !report.platforms.is_empty() {
        println!("\n{}", counts_table("Platform", report.platforms.iter()));
        println!("\n{}", counts_table("Entity type", report.entity_types.iter()));
    }

    if !report.invalid.is_empty() {
        println!("\n⚠️  Invalid records:");
        for reason in &report.invalid {
            println!("   ➜ {}", reason);
        }
    }
    Ok(())
}

fn counts_table<'a>(label: &str, counts: impl Iterator<Item = (&'a String, &'a usize)>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![label, "Entities"]);
    for (key, count) in counts {
        table.add_row(vec![Cell::new(key), Cell::new(count)]);
    }
    table
}
