use std::collections::BTreeSet;

use crate::data::TestDataFactory;
use crate::error::FailureKind;
use crate::models::{TestListPage, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::suites::Marker::*;
use crate::suites::{Scenario, ScenarioContext};
use crate::utils::assertions::{assert_response, expect_status, CheckResult};
use crate::{check, check_eq};

/// Combinaciones (page, size) del listado paginado
const PAGINATION_GRID: [(u32, u32); 6] = [(1, 1), (1, 5), (1, 10), (2, 3), (2, 5), (3, 2)];

/// Casos que crea el recorrido completo para no depender de un servicio vacío
const WALK_SEED_CASES: usize = 3;

pub fn scenarios() -> Vec<Scenario> {
    let mut scenarios = vec![
        Scenario::new("lists::get_test_list_without_params", &[Lists, Smoke, Positive], without_params),
        Scenario::new("lists::get_test_list_with_pagination", &[Lists, Smoke, Positive], |ctx| {
            explicit_page(ctx, 1, 5)
        }),
        Scenario::new("lists::get_test_list_with_small_page_size", &[Lists, Smoke, Positive], |ctx| {
            explicit_page(ctx, 1, 1)
        }),
    ];

    for (page, size) in PAGINATION_GRID {
        scenarios.push(Scenario::new(
            format!("lists::get_list_with_pagination_params[{}-{}]", page, size),
            &[Lists, Positive],
            move |ctx| explicit_page(ctx, page, size),
        ));
    }

    scenarios.push(Scenario::new("lists::walk_all_pages", &[Lists, Regression], walk_all_pages).exclusive());
    scenarios.push(Scenario::new(
        "lists::get_test_list_without_authentication",
        &[Lists, Negative],
        without_authentication,
    ));
    scenarios
}

fn check_page(page: &TestListPage, expected_page: u32, expected_size: u32) -> CheckResult {
    check_eq!(page.page, expected_page, "Página devuelta");
    check_eq!(page.size, expected_size, "Tamaño de página devuelto");
    check!(
        page.tests.len() <= expected_size as usize,
        "El número de casos ({}) no debería superar el tamaño de página ({})",
        page.tests.len(),
        expected_size
    );
    Ok(())
}

fn without_params(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;

    let url = ctx.settings().tests_url();
    let response = clients.tests.base().get(&mut session, &url, &[])?;
    assert_response(&response, 200, &["page", "size", "total", "tests"])?;

    let page: TestListPage = response.parse("test list")?;
    check_page(&page, DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
}

fn explicit_page(ctx: &mut ScenarioContext<'_>, page: u32, size: u32) -> CheckResult {
    let mut session = ctx.logged_in()?;
    let listed = ctx.clients().tests.get_test_list(&mut session, Some(page), Some(size))?;
    check_page(&listed, page, size)
}

fn without_authentication(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let mut session = ctx.anonymous();
    let err = expect_status(ctx.clients().tests.get_test_list(&mut session, None, None), 403)?;
    check_eq!(err.kind(), FailureKind::Authorization, "Categoría del fallo");
    Ok(())
}

/// Tamaño de página para recorrer `total` casos en pocas páginas
fn walk_page_size(total: u64) -> u32 {
    total.div_ceil(5).clamp(2, 100) as u32
}

/// Recorre todas las páginas y comprueba que juntas forman el conjunto completo
fn walk_all_pages(ctx: &mut ScenarioContext<'_>) -> CheckResult {
    let clients = ctx.clients();
    let mut session = ctx.logged_in()?;

    for _ in 0..WALK_SEED_CASES {
        let data = TestDataFactory::generate_random_test_data();
        ctx.create_tracked(&mut session, &data.name, &data.description)?;
    }

    let first = clients.tests.get_test_list(&mut session, Some(0), Some(1))?;
    let size = walk_page_size(first.total);
    let walk = clients.tests.collect_all_pages(&mut session, size)?;

    check_eq!(walk.total, first.total, "El total no debería cambiar durante el recorrido");
    check_eq!(
        walk.pages.len() as u64,
        TestListPage::page_count(walk.total, size),
        "Número de páginas para total={} size={}",
        walk.total,
        size
    );
    for (index, page) in walk.pages.iter().enumerate() {
        check_page(page, index as u32, size)?;
    }

    let unique = walk.unique_cases();
    check_eq!(unique.len() as u64, walk.total, "Casos distintos en la unión de páginas");
    check_eq!(walk.item_count() as u64, walk.total, "Elementos sumando todas las páginas");

    let listed: BTreeSet<i64> = unique.keys().copied().collect();
    let missing: Vec<i64> = ctx.created().iter().filter(|id| !listed.contains(*id)).copied().collect();
    check!(missing.is_empty(), "Casos creados que no aparecen en el listado: {:?}", missing);
    Ok(())
}
