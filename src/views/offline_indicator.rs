// ============================================================================
// OFFLINE INDICATOR VIEW - Indicador de estado offline/sincronización
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::ElementBuilder;
use crate::state::app_state::AppState;

/// Renderizar indicador de conexión.
/// Retorna None cuando está online y sin sincronización en curso.
pub fn render_offline_indicator(state: &AppState) -> Result<Option<Element>, JsValue> {
    if state.expenses.is_syncing() {
        let indicator = ElementBuilder::new("div")?
            .class("status-indicator status-indicator--syncing")
            .text("Syncing changes...")
            .build();
        return Ok(Some(indicator));
    }

    if state.expenses.is_offline() {
        let pending = state.expenses.pending_count();
        let text = if pending > 0 {
            format!("Offline mode: {} changes will sync later", pending)
        } else {
            "Offline mode: changes will sync later".to_string()
        };
        let indicator = ElementBuilder::new("div")?
            .class("status-indicator status-indicator--offline")
            .text(&text)
            .build();
        return Ok(Some(indicator));
    }

    Ok(None)
}
