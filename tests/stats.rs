mod support;

use support::{run_marker, run_named, FakeService};
use test_case_api::models::TestStatus;
use test_case_api::suites::Marker;

#[test]
fn stats_scenarios_pass_against_fake_service() {
    run_marker(Marker::Stats, 2);
}

#[test]
fn statistics_count_unrun_cases_as_norun() {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();

    let first = clients.tests.create_test(&mut session, "Stats A", "Sin ejecutar").unwrap();
    let second = clients.tests.create_test(&mut session, "Stats B", "Ejecutado").unwrap();
    clients
        .tests
        .set_test_status(&mut session, second.test_id, &TestStatus::Fail)
        .unwrap();

    let stats = clients.stats.get_statistics(&mut session).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.norun, 1);
    assert_eq!(stats.total, stats.sum_of_statuses());

    clients.tests.delete_test(&mut session, first.test_id).unwrap();
    let stats = clients.stats.get_statistics(&mut session).unwrap();
    assert_eq!(stats.total, 1);
}

#[test]
fn login_flow_check_reads_back_the_first_status() {
    let service = FakeService::start_dropping_status_writes(1);
    let summary = run_named(&service, "stats::login_flow_check");

    let outcome = &summary.outcomes[0];
    assert!(!outcome.passed());
    assert_eq!(outcome.category, "assertion");
    assert!(outcome.message.contains("tras PASS"), "{}", outcome.message);
}

#[test]
fn login_flow_check_passes_when_every_write_is_stored() {
    let service = FakeService::start();
    let summary = run_named(&service, "stats::login_flow_check");
    assert!(summary.is_success(), "{:?}", summary.outcomes);
}
