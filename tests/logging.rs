mod support;

use std::fs;

use support::FakeService;
use test_case_api::utils::logger;

/// Un único test: el subscriber global solo se puede instalar una vez por proceso
#[test]
fn log_file_records_exchanges_at_info_level() {
    let dir = tempfile::tempdir().unwrap();
    let service = FakeService::start();
    let mut settings = service.settings();
    settings.log_level = "info".to_string();
    settings.log_dir = dir.path().join("logs");

    let log_file = logger::init(&settings).unwrap();

    let clients = service.clients();
    let mut session = clients.logged_in_session().unwrap();
    clients.stats.get_statistics(&mut session).unwrap();

    let contents = fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("REQUEST"), "sin peticiones en el log:\n{}", contents);
    assert!(contents.contains("RESPONSE"));
    assert!(contents.contains("/api/getstat"));
}
