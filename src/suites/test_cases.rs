use serde_json::json;

use crate::api::Session;
use crate::data::TestDataFactory;
use crate::error::{ApiError, FailureKind};
use crate::models::{CreateTestRequest, CreateTestResponse, ErrorMessage, TestStatus, UpdateTestRequest, NAME_MAX_LEN};
use crate::suites::Marker::*;
use crate::suites::{Scenario, ScenarioContext};
use crate::utils::assertions::{
    assert_error_message, assert_response, assert_status_code, expect_failure, expect_status,
    CheckResult,
};
use crate::{check, check_eq};

const NON_EXISTENT_TEST_ID: i64 = 999_999;

pub fn scenarios() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new("tests::create_test_case_with_valid_data", &[Tests, Smoke, Positive], create_with_valid_data),
        Scenario::new("tests::create_test_case_with_long_name", &[Tests, Smoke, Positive], create_with_long_name),
        Scenario::new(
            "tests::create_test_case_with_long_description",
            &[Tests, Smoke, Positive],
            create_with_long_description,
        ),
        Scenario::new("tests::create_test_without_authentication", &[Tests, Negative], create_without_authentication),
        Scenario::new("tests::create_test_with_empty_name", &[Tests, Negative], |ctx| {
            create_with_raw_body(ctx, |name| json!({"name": "", "description": name}))
        }),
        Scenario::new("tests::create_test_with_empty_description", &[Tests, Negative], |ctx| {
            create_with_raw_body(ctx, |name| json!({"name": name, "description": ""}))
        }),
        Scenario::new("tests::create_test_with_oversized_name", &[Tests, Negative], create_with_oversized_name),
        Scenario::new("tests::create_test_with_duplicate_name", &[Tests, Negative], create_with_duplicate_name),
        Scenario::new("tests::get_test_case_by_id", &[Tests, Smoke, Positive], get_by_id),
        Scenario::new("tests::get_test_case_without_authentication", &[Tests, Negative], get_without_authentication),
        Scenario::new("tests::get_non_existent_test_case", &[Tests, Negative], |ctx| {
            get_not_found(ctx, NON_EXISTENT_TEST_ID.to_string())
        }),
        Scenario::new("tests::get_test_with_invalid_id_format", &[Tests, Negative], |ctx| {
            get_not_found(ctx, "INVALID_TEST_ID".to_string())
        }),
        Scenario::new("tests::full_update_test_case", &[Tests, Smoke, Positive], full_update),
        Scenario::new("tests::partial_update_test_description", &[Tests, Smoke, Positive], partial_update_description),
        Scenario::new("tests::partial_update_test_name", &[Tests, Smoke, Positive], partial_update_name),
        Scenario::new("tests::update_test_without_authentication", &[Tests, Negative], update_without_authentication),
        Scenario::new("tests::update_non_existent_test", &[Tests, Negative], update_non_existent),
    ];

    for status in TestStatus::settable() {
        let name = format!("tests::set_test_status[{}]", status.as_str());
        scenarios.push(Scenario::new(name, &[Tests, Smoke, Positive], move |ctx| {
            set_status(ctx, &status)
        }));
    }

    scenarios.extend([
        Scenario::new(
            "tests::set_test_status_without_authentication",
            &[Tests, Negative],
            set_status_without_authentication,
        ),
        Scenario::new("tests::set_invalid_test_status", &[Tests, Negative], set_invalid_status),
        Scenario::new("tests::delete_test_case", &[Tests, Smoke, Positive], delete_test_case),
        Scenario::new("tests::delete_test_without_authentication", &[Tests, Negative], delete_without_authentication),
        Scenario::new("tests::delete_non_existent_test", &[Tests, Negative], delete_non_existent),
        Scenario::new("tests::delete_already_deleted_test", &[Tests, Negative], delete_already_deleted),
        Scenario::new("tests::complete_crud_workflow", &[Tests, Regression], complete_crud_workflow),
    ]);

    scenarios
}

/// Crea un caso con datos aleatorios y lo registra para limpieza
fn create_random(ctx: &mut ScenarioContext<'_>, session: &mut Session) -> CheckResult<(i64, CreateTestRequest)> {
    let data = TestDataFactory::generate_random_test_data();
    let test_id = ctx.create_tracked(session, &data.name, &data.description)?;
    Ok((test_id, CreateTestRequest::new(data.name, data.description)))
}

fn create_with_valid_data(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;

    check!(test_id > 0, "El ID del caso debería ser un entero positivo, llegó {}", test_id);
    Ok(())
}

fn create_with_long_name(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    // Exactamente NAME_MAX_LEN caracteres, pero único
    let mut name = TestDataFactory::generate_test_name("Long");
    let padding = NAME_MAX_LEN - name.chars().count();
    name.push_str(&"A".repeat(padding));

    let test_id = ctx.create_tracked(&mut session, &name, "Test description")?;
    let stored = ctx.clients().tests.get_test_by_id(&mut session, test_id)?;

    check_eq!(stored.name.chars().count(), NAME_MAX_LEN, "Longitud del nombre guardado");
    Ok(())
}

fn create_with_long_description(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let name = TestDataFactory::generate_test_name("API Test");
    let long_description = "D".repeat(1000);

    let test_id = ctx.create_tracked(&mut session, &name, &long_description)?;
    let stored = ctx.clients().tests.get_test_by_id(&mut session, test_id)?;

    check_eq!(stored.description, long_description, "Descripción guardada");
    Ok(())
}

fn create_without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let data = TestDataFactory::generate_random_test_data();
    let mut session = ctx.anonymous();

    let err = expect_failure(
        clients.tests.create_test(&mut session, &data.name, &data.description),
        FailureKind::Authorization,
    )?;
    check!(matches!(err, ApiError::NotAuthenticated { .. }), "Se esperaba el rechazo local: {}", err);

    // El servidor también lo rechaza si la petición llega
    let url = ctx.settings().tests_new_url();
    let body = CreateTestRequest::new(data.name, data.description);
    let response = clients.tests.base().post(&mut session, &url, &body)?;
    assert_status_code(&response, 403)?;
    Ok(())
}

/// Envía el cuerpo sin pasar por la validación del modelo
fn create_with_raw_body(
    ctx: &mut ScenarioContext<'_>,
    body: impl Fn(&str) -> serde_json::Value,
) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let name = TestDataFactory::generate_test_name("API Test");

    let url = ctx.settings().tests_new_url();
    let response = clients.tests.base().post(&mut session, &url, &body(&name))?;

    if response.is_success() {
        // Si el servidor lo aceptó hay que limpiar
        if let Ok(created) = response.parse::<CreateTestResponse>("create test") {
            ctx.track(created.test_id);
        }
    }
    assert_status_code(&response, 400)?;
    assert_error_message(&response.into_error(), ErrorMessage::BadInputData)?;
    Ok(())
}

fn create_with_oversized_name(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let name = "A".repeat(NAME_MAX_LEN + 1);

    let err = expect_failure(
        ctx.clients().tests.create_test(&mut session, &name, "Test description"),
        FailureKind::Validation,
    )?;
    check!(matches!(err, ApiError::InvalidRequest(_)), "Se esperaba el rechazo local: {}", err);
    Ok(())
}

fn create_with_duplicate_name(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let (_, request) = create_random(ctx, &mut session)?;

    let result = ctx.clients().tests.create_test(&mut session, &request.name, "Another description");
    if let Ok(created) = &result {
        ctx.track(created.test_id);
    }
    let err = expect_status(result, 400)?;
    assert_error_message(&err, ErrorMessage::TestNameAlreadyExists)?;
    Ok(())
}

fn get_by_id(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let (test_id, submitted) = create_random(ctx, &mut session)?;

    let test_case = ctx.clients().tests.get_test_by_id(&mut session, test_id)?;

    check_eq!(test_case.id, test_id, "El caso devuelto debería coincidir con el ID pedido");
    check_eq!(test_case.name, submitted.name, "Nombre guardado");
    check_eq!(test_case.description, submitted.description, "Descripción guardada");
    check!(!test_case.author.is_empty(), "Debería haber autor");
    Ok(())
}

fn get_without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.anonymous();
    let err = expect_status(ctx.clients().tests.get_test_by_id(&mut session, NON_EXISTENT_TEST_ID), 403)?;
    check_eq!(err.kind(), FailureKind::Authorization, "Categoría del fallo");
    Ok(())
}

fn get_not_found(ctx: &mut ScenarioContext<'_>, test_id: String) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let err = expect_status(ctx.clients().tests.get_test_by_id(&mut session, &test_id), 404)?;
    check_eq!(err.kind(), FailureKind::NotFound, "Categoría del fallo");
    Ok(())
}

fn full_update(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;
    let new_name = TestDataFactory::generate_test_name("Updated Test");
    let new_description = "Updated description";

    let updated = clients.tests.update_test(&mut session, test_id, &new_name, new_description)?;

    check_eq!(updated.id, test_id, "El ID debería coincidir");
    check_eq!(updated.name, new_name, "El nombre debería actualizarse");
    check_eq!(updated.description, new_description, "La descripción debería actualizarse");
    check!(!updated.author.is_empty(), "Debería haber autor");

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.name, new_name, "El nombre guardado debería coincidir con el actualizado");
    check_eq!(persisted.description, new_description, "La descripción guardada debería coincidir con la actualizada");
    Ok(())
}

fn partial_update_description(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, submitted) = create_random(ctx, &mut session)?;
    let new_description = "Partially updated description";

    let updated = clients
        .tests
        .partial_update_test(&mut session, test_id, None, Some(new_description))?;

    check_eq!(updated.id, test_id, "El ID debería coincidir");
    check_eq!(updated.description, new_description, "La descripción debería actualizarse");
    check_eq!(updated.name, submitted.name, "El nombre no debería cambiar");

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.description, new_description, "La descripción guardada debería coincidir con la actualizada");
    Ok(())
}

fn partial_update_name(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, submitted) = create_random(ctx, &mut session)?;
    let new_name = TestDataFactory::generate_test_name("Patched Test");

    let updated = clients
        .tests
        .partial_update_test(&mut session, test_id, Some(&new_name), None)?;

    check_eq!(updated.id, test_id, "El ID debería coincidir");
    check_eq!(updated.name, new_name, "El nombre debería actualizarse");
    check_eq!(updated.description, submitted.description, "La descripción no debería cambiar");

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.name, new_name, "El nombre guardado debería coincidir con el actualizado");
    Ok(())
}

fn update_without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.anonymous();

    expect_failure(
        clients.tests.update_test(&mut session, NON_EXISTENT_TEST_ID, "Updated name", "Updated description"),
        FailureKind::Authorization,
    )?;

    let url = ctx.settings().test_url(&NON_EXISTENT_TEST_ID.to_string());
    let body = UpdateTestRequest::full("Updated name", "Updated description");
    let response = clients.tests.base().put(&mut session, &url, &body)?;
    assert_status_code(&response, 403)?;
    Ok(())
}

fn update_non_existent(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let result = ctx.clients().tests.update_test(
        &mut session,
        NON_EXISTENT_TEST_ID,
        "Updated name",
        "Updated description",
    );
    expect_status(result, 404)?;
    Ok(())
}

fn set_status(ctx: &mut ScenarioContext<'_>, status: &TestStatus) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;

    let response = clients.tests.set_test_status(&mut session, test_id, status)?;
    check!(response.run_id > 0, "El runId debería ser un entero positivo, llegó {}", response.run_id);

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.status.as_ref(), Some(status), "El estado guardado debería coincidir con el actualizado");
    Ok(())
}

fn set_status_without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.anonymous();

    expect_failure(
        clients.tests.set_test_status(&mut session, NON_EXISTENT_TEST_ID, &TestStatus::Pass),
        FailureKind::Authorization,
    )?;

    let url = ctx.settings().test_status_url(&NON_EXISTENT_TEST_ID.to_string());
    let response = clients.tests.base().post(&mut session, &url, &json!({"status": "PASS"}))?;
    assert_status_code(&response, 403)?;
    Ok(())
}

/// El servicio acepta cualquier cadena como estado y crea el run igualmente
fn set_invalid_status(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;

    let url = ctx.settings().test_status_url(&test_id.to_string());
    let response = clients
        .tests
        .base()
        .post(&mut session, &url, &json!({"status": "INVALID_STATUS"}))?;

    assert_response(&response, 200, &["runId"])?;
    Ok(())
}

fn delete_test_case(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;

    let deleted = clients.tests.delete_test(&mut session, test_id)?;
    ctx.forget(test_id);
    check!(deleted.is_deleted(), "La respuesta debería indicar el borrado");

    expect_status(clients.tests.get_test_by_id(&mut session, test_id), 404)?;
    Ok(())
}

fn delete_without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.anonymous();

    expect_failure(
        clients.tests.delete_test(&mut session, NON_EXISTENT_TEST_ID),
        FailureKind::Authorization,
    )?;

    let url = ctx.settings().test_url(&NON_EXISTENT_TEST_ID.to_string());
    let response = clients.tests.base().delete(&mut session, &url)?;
    assert_status_code(&response, 403)?;
    Ok(())
}

fn delete_non_existent(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let err = expect_status(ctx.clients().tests.delete_test(&mut session, NON_EXISTENT_TEST_ID), 404)?;
    check_eq!(err.kind(), FailureKind::NotFound, "Categoría del fallo");
    Ok(())
}

fn delete_already_deleted(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, _) = create_random(ctx, &mut session)?;

    clients.tests.delete_test(&mut session, test_id)?;
    ctx.forget(test_id);

    expect_status(clients.tests.delete_test(&mut session, test_id), 404)?;
    Ok(())
}

/// Crear -> leer -> actualizar -> fijar estado -> borrar
fn complete_crud_workflow(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    let (test_id, submitted) = create_random(ctx, &mut session)?;

    let created = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(created.id, test_id, "El ID del caso creado debería coincidir con el devuelto");
    check_eq!(created.name, submitted.name, "El nombre del caso creado debería coincidir con el enviado");
    check_eq!(created.description, submitted.description, "La descripción del caso creado debería coincidir con la enviada");

    let new_name = TestDataFactory::generate_test_name("Updated");
    let new_description = "Updated description";
    let updated = clients.tests.update_test(&mut session, test_id, &new_name, new_description)?;
    check_eq!(updated.id, test_id, "El ID debería coincidir");
    check_eq!(updated.name, new_name, "El nombre debería actualizarse");
    check_eq!(updated.description, new_description, "La descripción debería actualizarse");

    let persisted = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(persisted.name, new_name, "El nombre guardado debería coincidir con el actualizado");
    check_eq!(persisted.description, new_description, "La descripción guardada debería coincidir con la actualizada");

    clients.tests.set_test_status(&mut session, test_id, &TestStatus::Pass)?;
    let with_status = clients.tests.get_test_by_id(&mut session, test_id)?;
    check_eq!(with_status.status, Some(TestStatus::Pass), "El estado guardado debería coincidir con el último actualizado");

    let deleted = clients.tests.delete_test(&mut session, test_id)?;
    ctx.forget(test_id);
    check!(deleted.is_deleted(), "La respuesta debería indicar el borrado");

    expect_status(clients.tests.get_test_by_id(&mut session, test_id), 404)?;
    Ok(())
}
