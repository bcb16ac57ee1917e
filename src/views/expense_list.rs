// ============================================================================
// EXPENSE LIST VIEW - Listado paginado con carga incremental
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{append_child, on_click, ElementBuilder};
use crate::models::expense::Expense;
use crate::state::app_state::AppState;
use crate::viewmodels::ExpensesViewModel;

/// Renderizar listado de gastos
pub fn render_expense_list(state: &AppState) -> Result<Element, JsValue> {
    let container = ElementBuilder::new("div")?
        .id("expense-list")?
        .class("expense-list")
        .build();

    let expenses = state.expenses.get_expenses();

    if expenses.is_empty() {
        let empty = ElementBuilder::new("div")?
            .class("expense-list__empty")
            .text("No expenses yet")
            .build();
        append_child(&container, &empty)?;
        return Ok(container);
    }

    for expense in &expenses {
        append_child(&container, &render_expense_item(state, expense)?)?;
    }

    // Botón de carga incremental: oculto cuando no quedan páginas
    if state.expenses.has_more() {
        let label = if state.expenses.is_loading() { "Loading..." } else { "Load more" };
        let mut builder = ElementBuilder::new("button")?
            .class("btn btn--load-more")
            .text(label);
        if state.expenses.is_loading() {
            builder = builder.attr("disabled", "disabled")?;
        }
        let load_more = builder.build();

        {
            let state = state.clone();
            on_click(&load_more, move |_| {
                let state = state.clone();
                spawn_local(async move {
                    let vm = ExpensesViewModel::new();
                    if let Err(e) = vm.load_more(&state).await {
                        log::error!("❌ Error cargando más gastos: {}", e);
                    }
                    state.notify_subscribers();
                });
            })?;
        }
        append_child(&container, &load_more)?;
    }

    Ok(container)
}

fn render_expense_item(state: &AppState, expense: &Expense) -> Result<Element, JsValue> {
    let item = ElementBuilder::new("div")?.class("expense-item").build();

    let title_row = ElementBuilder::new("div")?.class("expense-item__title").build();
    let title = ElementBuilder::new("span")?.text(&expense.title).build();
    append_child(&title_row, &title)?;

    // Marca visual para registros creados offline aún sin id del servidor
    if expense.id.is_provisional() {
        let badge = ElementBuilder::new("span")?
            .class("expense-item__badge")
            .text("not synced")
            .build();
        append_child(&title_row, &badge)?;
    }
    append_child(&item, &title_row)?;

    let details = ElementBuilder::new("div")?
        .class("expense-item__details")
        .text(&format!(
            "{:.2} · {} · {}",
            expense.amount,
            expense.category,
            expense.date.format("%Y-%m-%d"),
        ))
        .build();
    append_child(&item, &details)?;

    if let Some(notes) = &expense.notes {
        let notes_el = ElementBuilder::new("div")?
            .class("expense-item__notes")
            .text(notes)
            .build();
        append_child(&item, &notes_el)?;
    }

    let actions = ElementBuilder::new("div")?.class("expense-item__actions").build();

    let edit = ElementBuilder::new("button")?.class("btn").text("Edit").build();
    {
        let state = state.clone();
        let expense = expense.clone();
        on_click(&edit, move |_| {
            state.set_editing_expense(Some(expense.clone()));
        })?;
    }
    append_child(&actions, &edit)?;

    let delete = ElementBuilder::new("button")?
        .class("btn btn--danger")
        .text("Delete")
        .build();
    {
        let state = state.clone();
        let id = expense.id.clone();
        on_click(&delete, move |_| {
            let state = state.clone();
            let id = id.clone();
            spawn_local(async move {
                let vm = ExpensesViewModel::new();
                if let Err(e) = vm.remove(&state, id).await {
                    log::error!("❌ Error borrando gasto: {}", e);
                }
                state.notify_subscribers();
            });
        })?;
    }
    append_child(&actions, &delete)?;
    append_child(&item, &actions)?;

    Ok(item)
}
