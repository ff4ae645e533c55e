use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::runner::{OutcomeStatus, RunSummary, ScenarioOutcome};

/// Guarda los resultados de los escenarios en un archivo CSV
pub fn save_to_csv(file_path: &Path, outcomes: &[ScenarioOutcome]) -> io::Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for outcome in outcomes {
        writer.serialize(outcome)?;
    }

    writer.flush()?;

    Ok(())
}

/// Guarda el informe de la ejecución en formato Markdown
pub fn save_to_markdown(file_path: &Path, summary: &RunSummary, title: &str) -> io::Result<()> {
    let mut file = File::create(file_path)?;

    writeln!(file, "# Informe de Pruebas API: {}", title)?;
    writeln!(
        file,
        "\nFecha de ejecución: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file, "Servicio: {}", summary.base_url)?;
    writeln!(file, "Workers: {}", summary.workers)?;
    writeln!(file, "Duración: {} ms\n", summary.duration_ms)?;

    let passed = summary.passed();
    let failed = summary.failed();

    writeln!(file, "## Resumen Numérico\n")?;
    writeln!(file, "- Total de escenarios: {}", summary.total())?;
    writeln!(file, "- ✅ Superados: {}", passed)?;
    writeln!(file, "- ❌ Fallidos: {}\n", failed)?;

    writeln!(file, "## Resumen Visual\n")?;
    writeln!(file, "```mermaid")?;
    writeln!(file, "pie title Distribución de Escenarios")?;
    // Solo secciones con valores mayores que cero
    if passed > 0 {
        writeln!(file, "    \"✅ Superados\" : {}", passed)?;
    }
    if failed > 0 {
        writeln!(file, "    \"❌ Fallidos\" : {}", failed)?;
    }
    writeln!(file, "```\n")?;

    if failed > 0 {
        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for outcome in summary.outcomes.iter().filter(|o| o.status == OutcomeStatus::Failed) {
            *by_category.entry(outcome.category.as_str()).or_default() += 1;
        }
        writeln!(file, "## Fallos por Categoría\n")?;
        for (category, count) in by_category {
            writeln!(file, "- {}: {}", category, count)?;
        }
        writeln!(file)?;
    }

    writeln!(file, "## Detalle de Escenarios\n")?;
    for (i, outcome) in summary.outcomes.iter().enumerate() {
        writeln!(file, "### {}. {}", i + 1, outcome.name)?;
        writeln!(file, "- **Estado**: {}", outcome.status)?;
        writeln!(file, "- **Marcadores**: {}", outcome.markers)?;
        writeln!(file, "- **Duración**: {} ms", outcome.duration_ms)?;

        if !outcome.category.is_empty() {
            writeln!(file, "- **Categoría**: {}", outcome.category)?;
        }
        if !outcome.message.is_empty() {
            writeln!(file, "- **Detalle**: {}", outcome.message)?;
        }

        writeln!(file)?;
    }

    Ok(())
}

/// Escribe `<dir>/<nombre>.csv` y `<dir>/<nombre>.md` y devuelve ambas rutas
pub fn write_run_report(dir: &Path, summary: &RunSummary) -> io::Result<(PathBuf, PathBuf)> {
    if !dir.exists() {
        create_dir_all(dir)?;
    }

    let name = format!("run-{}", summary.started_at.format("%Y%m%d_%H%M%S"));
    let csv_path = dir.join(format!("{}.csv", name));
    let md_path = dir.join(format!("{}.md", name));

    save_to_csv(&csv_path, &summary.outcomes)?;
    save_to_markdown(&md_path, summary, &name)?;

    Ok((csv_path, md_path))
}
