use serde_json::json;

use crate::api::session::SessionState;
use crate::error::{ApiError, FailureKind};
use crate::models::ErrorMessage;
use crate::suites::{Scenario, ScenarioContext};
use crate::utils::assertions::{
    assert_error_message, assert_status_code, expect_failure, expect_status, CheckResult,
};
use crate::{check, check_eq};

use crate::suites::Marker::*;

/// Origen de una credencial en los escenarios negativos
#[derive(Debug, Clone, Copy)]
enum Credential {
    Configured,
    Literal(&'static str),
}

impl Credential {
    fn resolve(self, configured: &str) -> String {
        match self {
            Credential::Configured => configured.to_string(),
            Credential::Literal(value) => value.to_string(),
        }
    }
}

pub fn scenarios() -> Vec<Scenario> {
    let rejected = [
        ("login_with_invalid_username", Credential::Literal("invalid_user_12345"), Credential::Literal("somepassword")),
        ("login_with_invalid_password", Credential::Configured, Credential::Literal("invalid_password_12345")),
        ("login_with_empty_username", Credential::Literal(""), Credential::Literal("somepassword")),
        ("login_with_empty_password", Credential::Configured, Credential::Literal("")),
        ("login_with_empty_credentials", Credential::Literal(""), Credential::Literal("")),
    ];

    let mut scenarios = vec![
        Scenario::new("auth::get_csrf_token", &[Auth, Smoke, Positive], get_csrf_token),
        Scenario::new("auth::login_with_valid_credentials", &[Auth, Smoke, Positive], login_with_valid_credentials),
        Scenario::new("auth::logout_after_login", &[Auth, Smoke, Positive], logout_after_login),
    ];

    for (name, username, password) in rejected {
        scenarios.push(Scenario::new(
            format!("auth::{}", name),
            &[Auth, Negative],
            move |ctx| rejected_login(ctx, username, password),
        ));
    }

    scenarios.push(Scenario::new(
        "auth::login_missing_username",
        &[Auth, Negative],
        |ctx| login_missing_field(ctx, json!({"password": "somepassword"})),
    ));
    scenarios.push(Scenario::new(
        "auth::login_missing_password",
        &[Auth, Negative],
        |ctx| login_missing_field(ctx, json!({"username": "someuser"})),
    ));
    scenarios.push(Scenario::new(
        "auth::mutation_after_logout_is_rejected",
        &[Auth, Negative],
        mutation_after_logout_is_rejected,
    ));

    scenarios
}

fn get_csrf_token(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.anonymous();
    let token = ctx.clients().auth.get_csrf_token(&mut session)?;

    check!(!token.is_empty(), "El token CSRF no debería estar vacío");
    check_eq!(session.csrf_token(), Some(token.as_str()), "La sesión debería guardar el token");
    Ok(())
}

fn login_with_valid_credentials(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let settings = ctx.settings();
    let mut session = ctx.anonymous();

    let response = clients
        .auth
        .login(&mut session, &settings.test_username, &settings.test_password)?;

    assert_status_code(&response, 200)?;
    // La API responde HttpResponse('', status=200)
    check!(response.is_empty(), "El cuerpo debería estar vacío: {}", response.text());
    check_eq!(session.state(), SessionState::LoggedIn, "Estado tras el login");
    check!(
        session.csrf_token().map_or(false, |t| !t.is_empty()),
        "Debería extraerse el token CSRF"
    );

    // Con la sesión iniciada, una operación autenticada funciona
    clients.stats.get_statistics(&mut session)?;
    clients.auth.logout(&mut session)?;
    Ok(())
}

fn logout_after_login(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;

    let response = clients.auth.logout(&mut session)?;

    assert_status_code(&response, 200)?;
    check!(response.is_empty(), "El cuerpo debería estar vacío: {}", response.text());
    check_eq!(session.state(), SessionState::LoggedOut, "Estado tras el logout");

    let err = expect_status(clients.stats.get_statistics(&mut session), 403)?;
    check_eq!(err.kind(), FailureKind::Authorization, "Lectura tras el logout");
    Ok(())
}

fn rejected_login(ctx: &mut ScenarioContext<'_>, username: Credential, password: Credential) -> CheckResult {
    let clients = ctx.clients();
    let settings = ctx.settings();
    let username = username.resolve(&settings.test_username);
    let password = password.resolve(&settings.test_password);
    let mut session = ctx.anonymous();

    let err = expect_status(clients.auth.login(&mut session, &username, &password), 401)?;

    check_eq!(err.kind(), FailureKind::Authorization, "Categoría del fallo");
    check!(!session.is_logged_in(), "No debería quedar una sesión iniciada");
    expect_failure(clients.stats.get_statistics(&mut session), FailureKind::Authorization)?;
    Ok(())
}

fn login_missing_field(ctx: &mut ScenarioContext<'_>, body: serde_json::Value) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.anonymous();
    clients.auth.get_csrf_token(&mut session)?;

    let url = ctx.settings().auth_login_url();
    let response = clients.auth.base().post(&mut session, &url, &body)?;

    assert_status_code(&response, 400)?;
    let err = response.into_error();
    assert_error_message(&err, ErrorMessage::BadInputData)?;
    Ok(())
}

fn mutation_after_logout_is_rejected(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;
    clients.auth.logout(&mut session)?;

    let err = expect_failure(
        clients.tests.create_test(&mut session, "After logout", "Should never be sent"),
        FailureKind::Authorization,
    )?;
    check!(
        matches!(err, ApiError::NotAuthenticated { .. }),
        "El rechazo debería ser local, llegó: {}",
        err
    );
    Ok(())
}
