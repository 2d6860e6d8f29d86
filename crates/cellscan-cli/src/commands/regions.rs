use cellscan_core::cell::CellRef;
use cellscan_core::plan::group_by_page;
use cellscan_core::region::parse_region_specs;

use crate::error::CliError;

/// Parse region tokens and show how they will be processed.
pub fn check(tokens: &[String]) -> Result<(), CliError> {
    let parsed = parse_region_specs(tokens);
    let plan = group_by_page(parsed.specs);

    println!(
        "{} region(s) on {} page(s)\n",
        plan.region_count(),
        plan.page_count()
    );

    for (page, specs) in plan.iter() {
        println!("  Page {page}");
        for spec in specs {
            let cell = CellRef::parse(&spec.label)
                .map(|c| c.to_string())
                .unwrap_or_else(|_| "(not a cell)".into());
            println!("    {:<8} {:<13} {}", spec.label, cell, spec.rect);
        }
    }

    if !parsed.rejected.is_empty() {
        println!("\nSkipped tokens:");
        for e in &parsed.rejected {
            println!("  - {}", e);
        }
    }

    Ok(())
}
