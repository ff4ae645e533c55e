mod support;

use support::{run_marker, FakeService};
use test_case::test_case;
use test_case_api::models::TestListPage;
use test_case_api::suites::Marker;

#[test]
fn list_scenarios_pass_against_fake_service() {
    run_marker(Marker::Lists, 3);
}

#[test_case(0, 5 ; "empty set")]
#[test_case(7, 3 ; "partial last page")]
#[test_case(6, 3 ; "exact pages")]
#[test_case(1, 5 ; "single page")]
fn walk_covers_every_case_once(cases: usize, size: u32) {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();
    for i in 0..cases {
        clients
            .tests
            .create_test(&mut session, &format!("Walk {}", i), "Recorrido")
            .unwrap();
    }

    let walk = clients.tests.collect_all_pages(&mut session, size).unwrap();

    assert_eq!(walk.total, cases as u64);
    assert_eq!(walk.pages.len() as u64, TestListPage::page_count(walk.total, size));
    assert_eq!(walk.unique_cases().len(), cases);
    assert_eq!(walk.item_count(), cases);
    assert!(walk.pages.iter().all(|p| p.tests.len() <= size as usize));
}

#[test]
fn page_past_the_end_is_empty() {
    let service = FakeService::start();
    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();
    clients.tests.create_test(&mut session, "Only one", "Único").unwrap();

    let page = clients.tests.get_test_list(&mut session, Some(3), Some(5)).unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.total, 1);
    assert!(page.tests.is_empty());
}
