use colored::*;

use test_case_api::suites::catalogue;

/// Muestra el catálogo de escenarios agrupado por suite
pub fn list_scenarios() {
    let scenarios = catalogue();
    let mut current_suite = "";

    for scenario in &scenarios {
        let suite = scenario.name.split("::").next().unwrap_or("");
        if suite != current_suite {
            println!("\n{}", format!("=== {} ===", suite.to_uppercase()).green().bold());
            current_suite = suite;
        }

        let exclusive = if scenario.exclusive {
            " (exclusivo)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} [{}]{}",
            scenario.name,
            scenario.markers_label().cyan(),
            exclusive
        );
    }

    println!("\nTotal: {} escenarios", scenarios.len());
}
