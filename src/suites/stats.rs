use rand::Rng;

use crate::api::Session;
use crate::data::TestDataFactory;
use crate::error::FailureKind;
use crate::models::{Statistics, TestStatus};
use crate::suites::Marker::*;
use crate::suites::{Scenario, ScenarioContext};
use crate::utils::assertions::{assert_response, expect_status, CheckResult};
use crate::{check, check_eq};

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("stats::statistics_response_structure", &[Stats, Smoke, Positive], response_structure),
        Scenario::new(
            "stats::statistics_total_equals_sum_of_statuses",
            &[Stats, Smoke, Positive],
            total_equals_sum_of_statuses,
        ),
        Scenario::new("stats::repeated_reads_are_idempotent", &[Stats, Positive], repeated_reads_are_idempotent)
            .exclusive(),
        Scenario::new("stats::counts_follow_created_cases", &[Stats, Positive], counts_follow_created_cases)
            .exclusive(),
        Scenario::new("stats::login_flow_check", &[Stats, Regression], login_flow_check).exclusive(),
        Scenario::new(
            "stats::get_statistics_without_authentication",
            &[Stats, Negative],
            without_authentication,
        ),
    ]
}

fn response_structure(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;

    let url = ctx.settings().stats_url();
    let response = clients.stats.base().get(&mut session, &url, &[])?;
    assert_response(&response, 200, &["total", "passed", "failed", "norun"])?;
    response.parse::<Statistics>("statistics")?;
    Ok(())
}

fn total_equals_sum_of_statuses(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let stats = ctx.clients().stats.get_statistics(&mut session)?;

    check_eq!(
        stats.total,
        stats.sum_of_statuses(),
        "El total debería ser la suma de estados (passed={} + failed={} + norun={})",
        stats.passed,
        stats.failed,
        stats.norun
    );
    Ok(())
}

fn repeated_reads_are_idempotent(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let first = ctx.clients().stats.get_statistics(&mut session)?;
    let second = ctx.clients().stats.get_statistics(&mut session)?;

    check_eq!(second, first, "Dos lecturas seguidas deberían coincidir");
    Ok(())
}

fn without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.anonymous();
    let err = expect_status(ctx.clients().stats.get_statistics(&mut session), 403)?;
    check_eq!(err.kind(), FailureKind::Authorization, "Categoría del fallo");
    Ok(())
}

/// Crea un caso y le asigna `status`
fn create_with_status(ctx: &mut ScenarioContext<'_>, session: &mut Session, status: &TestStatus) -> CheckResult<i64> {
    let data = TestDataFactory::generate_random_test_data();
    let test_id = ctx.create_tracked(session, &data.name, &data.description)?;
    ctx.clients().tests.set_test_status(session, test_id, status)?;
    Ok(test_id)
}

fn counts_follow_created_cases(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let count = rand::thread_rng().gen_range(2..=5);
    let statuses: Vec<TestStatus> = (0..count).map(|_| TestDataFactory::random_status()).collect();
    let passing = statuses.iter().filter(|s| **s == TestStatus::Pass).count() as i64;
    let failing = statuses.len() as i64 - passing;

    let before = ctx.clients().stats.get_statistics(&mut session)?;
    for status in &statuses {
        create_with_status(ctx, &mut session, status)?;
    }
    let after = ctx.clients().stats.get_statistics(&mut session)?;

    let delta = after.delta(&before);
    check_eq!(delta.total, passing + failing, "Incremento de total");
    check_eq!(delta.passed, passing, "Incremento de passed");
    check_eq!(delta.failed, failing, "Incremento de failed");
    check_eq!(delta.norun, 0, "Los casos con estado no cuentan como norun");
    check_eq!(after.total, after.sum_of_statuses(), "Total tras crear los casos");
    Ok(())
}

/// Un caso pasa de PASS a FAIL: passed baja uno y failed sube uno
fn login_flow_check(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;

    let name = TestDataFactory::generate_test_name("Login flow check");
    let description = TestDataFactory::generate_test_description("Checking login flow");
    let test_id = ctx.create_tracked(&mut session, &name, &description)?;
    clients.tests.set_test_status(&mut session, test_id, &TestStatus::Pass)?;
    let first = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(first.status, Some(TestStatus::Pass), "Estado guardado tras PASS");

    let before = clients.stats.get_statistics(&mut session)?;
    clients.tests.set_test_status(&mut session, test_id, &TestStatus::Fail)?;
    let after = clients.stats.get_statistics(&mut session)?;

    let delta = after.delta(&before);
    check_eq!(delta.total, 0, "El total no cambia al cambiar el estado");
    check_eq!(delta.passed, -1, "passed tras PASS -> FAIL");
    check_eq!(delta.failed, 1, "failed tras PASS -> FAIL");
    check!(delta.norun == 0, "norun no debería moverse: {:?}", delta);

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.status, Some(TestStatus::Fail), "Último estado guardado");
    Ok(())
}
