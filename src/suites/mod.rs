//! Escenarios de prueba contra el servicio.
//!
//! Cada escenario crea sus propios datos antes de actuar sobre ellos. Los
//! casos creados con [`ScenarioContext::create_tracked`] se borran al
//! terminar, también si el escenario falla.

pub mod auth;
pub mod lists;
pub mod stats;
pub mod test_cases;

use std::fmt;

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::api::{ApiClients, Session};
use crate::config::Settings;
use crate::error::FailureKind;
use crate::utils::assertions::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Marker {
    Smoke,
    Auth,
    Tests,
    Stats,
    Lists,
    Regression,
    Positive,
    Negative,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Smoke => "smoke",
            Marker::Auth => "auth",
            Marker::Tests => "tests",
            Marker::Stats => "stats",
            Marker::Lists => "lists",
            Marker::Regression => "regression",
            Marker::Positive => "positive",
            Marker::Negative => "negative",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ScenarioFn = Box<dyn Fn(&mut ScenarioContext<'_>) -> CheckResult + Send + Sync>;

pub struct Scenario {
    pub name: String,
    pub markers: Vec<Marker>,
    /// Necesita datos estables: nunca corre en paralelo con otros escenarios
    pub exclusive: bool,
    run: ScenarioFn,
}

impl Scenario {
    pub fn new<F>(name: impl Into<String>, markers: &[Marker], run: F) -> Self
    where
        F: Fn(&mut ScenarioContext<'_>) -> CheckResult + Send + Sync + 'static,
    {
        Scenario {
            name: name.into(),
            markers: markers.to_vec(),
            exclusive: false,
            run: Box::new(run),
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn markers_label(&self) -> String {
        self.markers
            .iter()
            .map(Marker::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn run(&self, ctx: &mut ScenarioContext<'_>) -> CheckResult {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("markers", &self.markers)
            .field("exclusive", &self.exclusive)
            .finish()
    }
}

/// Catálogo completo, en orden estable
pub fn catalogue() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(auth::scenarios());
    scenarios.extend(test_cases::scenarios());
    scenarios.extend(stats::scenarios());
    scenarios.extend(lists::scenarios());
    scenarios
}

/// Estado de un escenario en curso: clientes compartidos y casos a limpiar
pub struct ScenarioContext<'a> {
    clients: &'a ApiClients,
    created: Vec<i64>,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(clients: &'a ApiClients) -> Self {
        ScenarioContext {
            clients,
            created: Vec::new(),
        }
    }

    pub fn clients(&self) -> &'a ApiClients {
        self.clients
    }

    pub fn settings(&self) -> &'a Settings {
        self.clients.settings()
    }

    pub fn anonymous(&self) -> Session {
        Session::new()
    }

    /// Sesión nueva con las credenciales configuradas
    pub fn logged_in(&self) -> CheckResult<Session> {
        Ok(self.clients.logged_in_session()?)
    }

    /// Crea un caso y lo registra para borrarlo al final
    pub fn create_tracked(&mut self, session: &mut Session, name: &str, description: &str) -> CheckResult<i64> {
        let created = self.clients.tests.create_test(session, name, description)?;
        debug!("Caso {} creado", created.test_id);
        self.created.push(created.test_id);
        Ok(created.test_id)
    }

    /// Registra para limpieza un caso creado sin pasar por `create_tracked`
    pub fn track(&mut self, test_id: i64) {
        if !self.created.contains(&test_id) {
            self.created.push(test_id);
        }
    }

    /// El escenario ya borró el caso por su cuenta
    pub fn forget(&mut self, test_id: i64) {
        self.created.retain(|id| *id != test_id);
    }

    pub fn created(&self) -> &[i64] {
        &self.created
    }

    /// Borra los casos registrados con una sesión propia
    pub fn cleanup(&mut self) {
        if self.created.is_empty() {
            return;
        }
        let mut session = match self.clients.logged_in_session() {
            Ok(session) => session,
            Err(e) => {
                warn!("No se pudo iniciar sesión para limpiar {:?}: {}", self.created, e);
                return;
            }
        };
        for test_id in self.created.drain(..) {
            match self.clients.tests.delete_test(&mut session, test_id) {
                Ok(_) => debug!("Caso {} borrado", test_id),
                Err(e) if e.kind() == FailureKind::NotFound => {}
                Err(e) => warn!("No se pudo borrar el caso {}: {}", test_id, e),
            }
        }
        if let Err(e) = self.clients.auth.logout(&mut session) {
            debug!("Logout tras la limpieza falló: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scenario_names_are_unique() {
        let scenarios = catalogue();
        let names: HashSet<_> = scenarios.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn every_scenario_is_positive_or_negative() {
        for scenario in catalogue() {
            assert!(
                scenario.has_marker(Marker::Positive)
                    || scenario.has_marker(Marker::Negative)
                    || scenario.has_marker(Marker::Regression),
                "{} sin polaridad",
                scenario.name
            );
        }
    }

    #[test]
    fn track_and_forget_keep_the_cleanup_list() {
        let clients = ApiClients::new(Settings::for_base_url("http://127.0.0.1:9")).unwrap();
        let mut ctx = ScenarioContext::new(&clients);

        ctx.track(7);
        ctx.track(7);
        ctx.track(9);
        assert_eq!(ctx.created(), &[7, 9]);

        ctx.forget(7);
        assert_eq!(ctx.created(), &[9]);
    }

    #[test]
    fn each_group_has_scenarios() {
        let scenarios = catalogue();
        for marker in [Marker::Auth, Marker::Tests, Marker::Stats, Marker::Lists, Marker::Smoke] {
            assert!(scenarios.iter().any(|s| s.has_marker(marker)), "sin escenarios {}", marker);
        }
    }
}
