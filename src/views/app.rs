// ============================================================================
// APP VIEW - Ensamblado de la vista principal
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{append_child, on_click, ElementBuilder};
use crate::state::app_state::AppState;
use crate::views::{
    render_expense_form, render_expense_list, render_filter_sort_controls, render_offline_indicator,
};

/// Renderizar la aplicación completa
pub fn render_app(state: &AppState) -> Result<Element, JsValue> {
    let root = ElementBuilder::new("div")?.class("app").build();

    // Header con título y botón de alta
    let header = ElementBuilder::new("header")?.class("app__header").build();
    let title = ElementBuilder::new("h1")?.text("Expense Tracker").build();
    append_child(&header, &title)?;

    let show_form = *state.show_form.borrow();
    let toggle = ElementBuilder::new("button")?
        .class("btn btn--primary")
        .text(if show_form { "Close" } else { "Add expense" })
        .build();
    {
        let state = state.clone();
        on_click(&toggle, move |_| {
            let visible = *state.show_form.borrow();
            state.set_show_form(!visible);
        })?;
    }
    append_child(&header, &toggle)?;
    append_child(&root, &header)?;

    // Indicador offline/sincronización (solo cuando aplica)
    if let Some(indicator) = render_offline_indicator(state)? {
        append_child(&root, &indicator)?;
    }

    if show_form {
        append_child(&root, &render_expense_form(state)?)?;
    }

    append_child(&root, &render_filter_sort_controls(state)?)?;
    append_child(&root, &render_expense_list(state)?)?;

    Ok(root)
}
