// ============================================================================
// FILTER SORT CONTROLS VIEW - Filtro por categoría y ordenación del listado
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{append_child, on_change, select_value, ElementBuilder};
use crate::models::expense::Category;
use crate::services::api_client::{SortField, SortOrder};
use crate::state::app_state::AppState;
use crate::viewmodels::ExpensesViewModel;

/// Renderizar controles de filtro y orden
pub fn render_filter_sort_controls(state: &AppState) -> Result<Element, JsValue> {
    let controls = ElementBuilder::new("div")?
        .class("filter-sort-controls")
        .build();

    append_child(&controls, &category_filter(state)?)?;
    append_child(&controls, &sort_field(state)?)?;
    append_child(&controls, &sort_order(state)?)?;

    Ok(controls)
}

/// Releer los tres selects y recargar el listado desde la página 1
fn apply_controls(state: &AppState) {
    let category = select_value("filter-category").and_then(|v| Category::parse(&v));
    let field = match select_value("sort-field").as_deref() {
        Some("amount") => SortField::Amount,
        _ => SortField::Date,
    };
    let order = match select_value("sort-order").as_deref() {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    };

    state.set_category_filter(category);
    state.set_sort(field, order);

    let state = state.clone();
    spawn_local(async move {
        let vm = ExpensesViewModel::new();
        if let Err(e) = vm.load_first_page(&state).await {
            log::error!("❌ Error recargando listado: {}", e);
        }
        state.notify_subscribers();
    });
}

fn category_filter(state: &AppState) -> Result<Element, JsValue> {
    let select = ElementBuilder::new("select")?.id("filter-category")?.build();

    let current = *state.category_filter.borrow();
    let mut all = ElementBuilder::new("option")?.attr("value", "")?;
    if current.is_none() {
        all = all.attr("selected", "selected")?;
    }
    append_child(&select, &all.text("All categories").build())?;

    for category in Category::ALL {
        let mut option = ElementBuilder::new("option")?.attr("value", category.as_str())?;
        if current == Some(category) {
            option = option.attr("selected", "selected")?;
        }
        append_child(&select, &option.text(category.as_str()).build())?;
    }

    register_change(state, &select)?;
    Ok(select)
}

fn sort_field(state: &AppState) -> Result<Element, JsValue> {
    let select = ElementBuilder::new("select")?.id("sort-field")?.build();
    let current = *state.sort_by.borrow();

    for (value, label, field) in [
        ("date", "Sort by date", SortField::Date),
        ("amount", "Sort by amount", SortField::Amount),
    ] {
        let mut option = ElementBuilder::new("option")?.attr("value", value)?;
        if current == field {
            option = option.attr("selected", "selected")?;
        }
        append_child(&select, &option.text(label).build())?;
    }

    register_change(state, &select)?;
    Ok(select)
}

fn sort_order(state: &AppState) -> Result<Element, JsValue> {
    let select = ElementBuilder::new("select")?.id("sort-order")?.build();
    let current = *state.sort_order.borrow();

    for (value, label, order) in [
        ("asc", "Ascending", SortOrder::Asc),
        ("desc", "Descending", SortOrder::Desc),
    ] {
        let mut option = ElementBuilder::new("option")?.attr("value", value)?;
        if current == order {
            option = option.attr("selected", "selected")?;
        }
        append_child(&select, &option.text(label).build())?;
    }

    register_change(state, &select)?;
    Ok(select)
}

fn register_change(state: &AppState, select: &Element) -> Result<(), JsValue> {
    let state = state.clone();
    on_change(select, move |_| {
        apply_controls(&state);
    })
}
