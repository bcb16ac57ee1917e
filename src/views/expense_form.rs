// ============================================================================
// EXPENSE FORM VIEW - Formulario de alta y edición
// ============================================================================
// La validación vive aquí: un borrador inválido se rechaza antes de llegar
// al interceptor y nunca se encola.
// ============================================================================

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{append_child, input_value, on_click, on_submit, select_value, textarea_value, ElementBuilder};
use crate::models::expense::{Category, NewExpense};
use crate::state::app_state::AppState;
use crate::viewmodels::ExpensesViewModel;

/// Renderizar formulario de gasto (alta o edición según el estado)
pub fn render_expense_form(state: &AppState) -> Result<Element, JsValue> {
    let editing = state.editing_expense.borrow().clone();

    let form = ElementBuilder::new("form")?
        .id("expense-form")?
        .class("expense-form")
        .build();

    // Campos prellenados en modo edición
    let (title, amount, date, category, notes) = match &editing {
        Some(expense) => (
            expense.title.clone(),
            format!("{}", expense.amount),
            expense.date.format("%Y-%m-%d").to_string(),
            expense.category,
            expense.notes.clone().unwrap_or_default(),
        ),
        None => (String::new(), String::new(), String::new(), Category::Food, String::new()),
    };

    append_child(&form, &labeled_input("Title", "expense-title", "text", &title)?)?;
    append_child(&form, &labeled_input("Amount", "expense-amount", "number", &amount)?)?;
    append_child(&form, &labeled_input("Date", "expense-date", "date", &date)?)?;
    append_child(&form, &category_select(category)?)?;
    append_child(&form, &notes_area(&notes)?)?;

    // Mensaje de error de la última operación
    if let Some(error) = state.form_error.borrow().as_ref() {
        let error_el = ElementBuilder::new("div")?
            .class("form-error")
            .text(error)
            .build();
        append_child(&form, &error_el)?;
    }

    let submit = ElementBuilder::new("button")?
        .class("btn btn--primary")
        .attr("type", "submit")?
        .text(if editing.is_some() { "Save changes" } else { "Add expense" })
        .build();
    append_child(&form, &submit)?;

    let cancel = ElementBuilder::new("button")?
        .class("btn")
        .attr("type", "button")?
        .text("Cancel")
        .build();
    {
        let state = state.clone();
        on_click(&cancel, move |_| {
            state.set_show_form(false);
        })?;
    }
    append_child(&form, &cancel)?;

    {
        let state = state.clone();
        on_submit(&form, move |_| {
            handle_submit(&state);
        })?;
    }

    Ok(form)
}

/// Leer, validar y despachar el borrador al interceptor
fn handle_submit(state: &AppState) {
    let draft = match read_draft() {
        Ok(draft) => draft,
        Err(message) => {
            state.set_form_error(Some(message));
            return;
        }
    };

    if let Err(message) = draft.validate() {
        state.set_form_error(Some(message));
        return;
    }

    let editing = state.editing_expense.borrow().clone();
    let state = state.clone();
    spawn_local(async move {
        let vm = ExpensesViewModel::new();
        let result = match editing {
            Some(original) => vm.edit(&state, draft.into_expense(original.id)).await,
            None => vm.create(&state, draft).await,
        };

        match result {
            Ok(()) => state.set_show_form(false),
            Err(e) => {
                log::error!("❌ Error guardando gasto: {}", e);
                state.set_form_error(Some(e));
            }
        }
    });
}

fn read_draft() -> Result<NewExpense, String> {
    let title = input_value("expense-title").unwrap_or_default();

    let amount = input_value("expense-amount")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .ok_or("El importe no es un número válido")?;

    let date = input_value("expense-date")
        .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
        .ok_or("La fecha no es válida")?;

    let category = select_value("expense-category")
        .and_then(|v| Category::parse(&v))
        .ok_or("Categoría desconocida")?;

    let notes = textarea_value("expense-notes")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Ok(NewExpense { title, amount, date, category, notes })
}

fn labeled_input(label: &str, id: &str, input_type: &str, value: &str) -> Result<Element, JsValue> {
    let field = ElementBuilder::new("label")?
        .class("form-field")
        .text(label)
        .build();

    let mut input = ElementBuilder::new("input")?
        .id(id)?
        .attr("type", input_type)?
        .attr("value", value)?;
    if input_type == "number" {
        input = input.attr("step", "0.01")?.attr("min", "0")?;
    }

    append_child(&field, &input.build())?;
    Ok(field)
}

fn category_select(selected: Category) -> Result<Element, JsValue> {
    let field = ElementBuilder::new("label")?
        .class("form-field")
        .text("Category")
        .build();

    let select = ElementBuilder::new("select")?.id("expense-category")?.build();
    for category in Category::ALL {
        let mut option = ElementBuilder::new("option")?
            .attr("value", category.as_str())?;
        if category == selected {
            option = option.attr("selected", "selected")?;
        }
        append_child(&select, &option.text(category.as_str()).build())?;
    }

    append_child(&field, &select)?;
    Ok(field)
}

fn notes_area(value: &str) -> Result<Element, JsValue> {
    let field = ElementBuilder::new("label")?
        .class("form-field")
        .text("Notes")
        .build();

    let area = ElementBuilder::new("textarea")?
        .id("expense-notes")?
        .text(value)
        .build();

    append_child(&field, &area)?;
    Ok(field)
}
