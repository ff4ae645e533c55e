use std::path::PathBuf;

use colored::*;

use test_case_api::api::ApiClients;
use test_case_api::config::Settings;
use test_case_api::error::ApiResult;
use test_case_api::runner::{self, OutcomeStatus, RunSummary};
use test_case_api::suites::{catalogue, Marker};
use test_case_api::utils::{logger, write_run_report};

/// Opciones de `run` que no forman parte de la configuración
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub markers: Vec<Marker>,
    pub name: Option<String>,
    pub report_dir: PathBuf,
}

/// Ejecuta los escenarios seleccionados. Devuelve `true` si todos pasaron.
pub fn run_scenarios(settings: Settings, options: &RunOptions) -> ApiResult<bool> {
    let settings = settings.normalized()?;
    let log_file = logger::init(&settings)?;

    if !settings.has_credentials() {
        println!(
            "{}",
            "AVISO: TEST_USERNAME no está definido; los escenarios autenticados fallarán.".yellow()
        );
    }

    let workers = settings.parallel_workers;
    let clients = ApiClients::new(settings)?;
    let scenarios = catalogue();
    let selected = runner::select(&scenarios, &options.markers, options.name.as_deref());

    if selected.is_empty() {
        println!("{}", "Ningún escenario coincide con los filtros.".yellow());
        return Ok(true);
    }

    println!(
        "\n{}",
        format!(
            "=== EJECUTANDO {} ESCENARIOS CONTRA {} ===",
            selected.len(),
            clients.settings().api_base_url
        )
        .green()
        .bold()
    );

    let summary = runner::run(&clients, &selected, workers);
    print_summary(&summary);

    let (csv_path, md_path) = write_run_report(&options.report_dir, &summary)?;
    println!("\n{}", "Informe guardado:".green());
    println!("  CSV: {}", csv_path.display());
    println!("  Markdown: {}", md_path.display());
    println!("  Log: {}", log_file.display());

    Ok(summary.is_success())
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        let line = format!("{} {} ({} ms)", outcome.status, outcome.name, outcome.duration_ms);
        match outcome.status {
            OutcomeStatus::Passed => println!("{}", line.green()),
            OutcomeStatus::Failed => println!("{}", line.red()),
        }
    }

    if summary.failed() > 0 {
        println!("\n{}", "=== FALLOS ===".red().bold());
        for outcome in summary.failures() {
            println!("{} [{}]", outcome.name.red(), outcome.category);
            println!("  {}", outcome.message);
        }
    }

    println!(
        "\nTotal: {}  Superados: {}  Fallidos: {}  Duración: {} ms",
        summary.total(),
        summary.passed().to_string().green(),
        summary.failed().to_string().red(),
        summary.duration_ms
    );
}
