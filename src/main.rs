use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use inquire::Select;

use test_case_api::config::Settings;
use test_case_api::error::{ApiError, ApiResult};
use test_case_api::suites::Marker;

mod commands;

use commands::{list_scenarios, run_scenarios, RunOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ejecutar escenarios contra el servicio
    Run {
        /// Solo escenarios con alguno de estos marcadores (repetible)
        #[arg(short, long = "marker", value_enum)]
        markers: Vec<Marker>,

        /// Solo escenarios cuyo nombre contenga este texto
        #[arg(short, long)]
        name: Option<String>,

        /// Directorio de los informes
        #[arg(long, default_value = "reports")]
        report_dir: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },
    /// Listar los escenarios disponibles
    List,
}

const RUN_ALL: &str = "Ejecutar todas las suites";
const LIST: &str = "Listar escenarios";
const EXIT: &str = "Salir";

fn suite_option(marker: &Marker) -> String {
    format!("Ejecutar suite: {}", marker)
}

/// Menú interactivo si no se proporciona un comando
fn interactive() -> ApiResult<bool> {
    let mut options = vec![RUN_ALL.to_string()];
    options.extend(Marker::value_variants().iter().map(suite_option));
    options.push(LIST.to_string());
    options.push(EXIT.to_string());

    let selection = match Select::new("¿Qué deseas hacer?", options).prompt() {
        Ok(selection) => selection,
        Err(_) => {
            println!("{}", "Operación cancelada.".yellow());
            return Ok(true);
        }
    };

    let markers = match selection.as_str() {
        RUN_ALL => Vec::new(),
        LIST => {
            list_scenarios();
            return Ok(true);
        }
        EXIT => {
            println!("¡Hasta pronto!");
            return Ok(true);
        }
        other => Marker::value_variants()
            .iter()
            .filter(|m| suite_option(m) == other)
            .copied()
            .collect(),
    };

    let options = RunOptions {
        markers,
        name: None,
        report_dir: PathBuf::from("reports"),
    };
    run_scenarios(Settings::from_env()?, &options)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run {
            markers,
            name,
            report_dir,
            settings,
        }) => run_scenarios(settings, &RunOptions { markers, name, report_dir }),
        Some(Commands::List) => {
            list_scenarios();
            Ok(true)
        }
        None => interactive(),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            match e {
                ApiError::Config(_) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}
