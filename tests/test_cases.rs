mod support;

use support::{run_marker, run_named, FakeService};
use test_case::test_case;
use test_case_api::data::TestDataFactory;
use test_case_api::error::{ApiError, FailureKind};
use test_case_api::models::TestStatus;
use test_case_api::suites::Marker;

#[test]
fn test_case_scenarios_pass_against_fake_service() {
    let summary = run_marker(Marker::Tests, 4);
    assert!(summary.outcomes.iter().any(|o| o.name == "tests::complete_crud_workflow"));
}

#[test]
fn regression_scenarios_pass_against_fake_service() {
    run_marker(Marker::Regression, 1);
}

#[test_case(TestStatus::Pass ; "pass")]
#[test_case(TestStatus::Fail ; "fail")]
#[test_case(TestStatus::Norun ; "norun")]
fn status_change_is_visible_on_read(status: TestStatus) {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();
    let data = TestDataFactory::generate_random_test_data();

    let created = clients
        .tests
        .create_test(&mut session, &data.name, &data.description)
        .unwrap();
    clients
        .tests
        .set_test_status(&mut session, created.test_id, &status)
        .unwrap();

    let stored = clients.tests.get_test_by_id(&mut session, created.test_id).unwrap();
    assert_eq!(stored.status, Some(status));
    assert_eq!(stored.name, data.name);
}

#[test]
fn mutations_without_session_never_reach_the_server() {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = test_case_api::Session::new();

    let err = clients.tests.delete_test(&mut session, 1).unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated { operation: "delete_test" }));
    assert_eq!(err.kind(), FailureKind::Authorization);
}

#[test]
fn empty_patch_is_rejected_locally() {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();

    let err = clients
        .tests
        .partial_update_test(&mut session, 1, None, None)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);
}

#[test]
fn wrongly_accepted_duplicate_is_cleaned_up() {
    let service = FakeService::start_accepting_duplicates();
    let summary = run_named(&service, "tests::create_test_with_duplicate_name");
    assert!(!summary.is_success());

    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();
    let stats = clients.stats.get_statistics(&mut session).unwrap();
    assert_eq!(stats.total, 0, "quedaron casos sin borrar");
}
