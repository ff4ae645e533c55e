//! Selección y ejecución de escenarios.
//!
//! Los escenarios normales se reparten entre `workers` hilos; los marcados
//! como `exclusive` corren después, de uno en uno. Un escenario que falla
//! (o hace panic) nunca corta la ejecución del resto.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::api::ApiClients;
use crate::suites::{Marker, Scenario, ScenarioContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Passed,
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Passed => write!(f, "✅ Superado"),
            OutcomeStatus::Failed => write!(f, "❌ Fallido"),
        }
    }
}

/// Resultado de un escenario, una fila del informe
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub markers: String,
    pub status: OutcomeStatus,
    /// Vacío si pasó; si no, `assertion`, `panic` o la categoría del error de la API
    pub category: String,
    pub message: String,
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub base_url: String,
    pub workers: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

/// Filtra el catálogo: cualquiera de los marcadores (ninguno = todos) y,
/// si se indica, nombre que contenga `name`
pub fn select<'s>(scenarios: &'s [Scenario], markers: &[Marker], name: Option<&str>) -> Vec<&'s Scenario> {
    scenarios
        .iter()
        .filter(|s| markers.is_empty() || markers.iter().any(|m| s.has_marker(*m)))
        .filter(|s| name.map_or(true, |n| s.name.contains(n)))
        .collect()
}

/// Ejecuta un escenario y limpia lo que haya creado
pub fn run_one(clients: &ApiClients, scenario: &Scenario) -> ScenarioOutcome {
    let span = info_span!("scenario", scenario = %scenario.name);
    let _guard = span.enter();

    let start = Instant::now();
    let mut ctx = ScenarioContext::new(clients);
    let result = panic::catch_unwind(AssertUnwindSafe(|| scenario.run(&mut ctx)));
    ctx.cleanup();
    let duration_ms = start.elapsed().as_millis() as u64;

    let (status, category, message) = match result {
        Ok(Ok(())) => {
            info!("SUPERADO ({} ms)", duration_ms);
            (OutcomeStatus::Passed, String::new(), String::new())
        }
        Ok(Err(failure)) => {
            warn!("FALLIDO [{}]: {}", failure.category(), failure);
            (OutcomeStatus::Failed, failure.category().to_string(), failure.to_string())
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic sin mensaje".to_string());
            error!("PÁNICO: {}", message);
            (OutcomeStatus::Failed, "panic".to_string(), message)
        }
    };

    ScenarioOutcome {
        name: scenario.name.clone(),
        markers: scenario.markers_label(),
        status,
        category,
        message,
        duration_ms,
    }
}

/// Ejecuta los escenarios seleccionados y devuelve los resultados en el
/// mismo orden en que llegaron
pub fn run(clients: &ApiClients, scenarios: &[&Scenario], workers: usize) -> RunSummary {
    let started_at = Local::now();
    let start = Instant::now();
    let workers = workers.max(1);

    let (exclusive, shared): (Vec<_>, Vec<_>) = scenarios
        .iter()
        .enumerate()
        .partition(|(_, s)| s.exclusive);
    info!(
        "Ejecutando {} escenarios ({} en paralelo con {} workers, {} exclusivos)",
        scenarios.len(),
        shared.len(),
        workers,
        exclusive.len()
    );

    let results: Mutex<Vec<(usize, ScenarioOutcome)>> = Mutex::new(Vec::with_capacity(scenarios.len()));
    let next = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..workers.min(shared.len()) {
            scope.spawn(|| loop {
                let slot = next.fetch_add(1, Ordering::SeqCst);
                let Some((index, scenario)) = shared.get(slot) else {
                    break;
                };
                let outcome = run_one(clients, scenario);
                if let Ok(mut results) = results.lock() {
                    results.push((*index, outcome));
                }
            });
        }
    });

    let mut results = results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    for (index, scenario) in exclusive {
        results.push((index, run_one(clients, scenario)));
    }
    results.sort_by_key(|(index, _)| *index);

    RunSummary {
        started_at,
        base_url: clients.settings().api_base_url.clone(),
        workers,
        duration_ms: start.elapsed().as_millis() as u64,
        outcomes: results.into_iter().map(|(_, outcome)| outcome).collect(),
    }
}
