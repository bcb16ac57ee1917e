// ============================================================================
// APP - Aplicación principal
// ============================================================================
// Arranque: hidratar desde el journal, cablear el monitor de red al motor de
// sincronización y renderizar. El drain se dispara en cada flanco
// offline→online y en el arranque si quedó cola pendiente de otra sesión.
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{append_child, get_element_by_id, set_inner_html};
use crate::services::network_monitor::NetworkStatus;
use crate::services::sync_service::SyncOutcome;
use crate::services::{NetworkMonitor, SyncService};
use crate::state::app_state::AppState;
use crate::viewmodels::ExpensesViewModel;
use crate::views::render_app;

/// Aplicación principal
pub struct App {
    state: AppState,
    root: Option<Element>,
}

impl App {
    /// Crear nueva aplicación
    pub fn new() -> Result<Self, JsValue> {
        let root = get_element_by_id("app")
            .ok_or_else(|| JsValue::from_str("No #app element found"))?;

        let state = AppState::new();
        let vm = ExpensesViewModel::new();
        // Una única instancia del motor: su flag single-flight debe ser
        // compartido por todos los disparos
        let sync = SyncService::new();

        // Estado inicial de red
        let mut monitor = NetworkMonitor::new();
        state.expenses.set_offline(monitor.is_offline());

        // Hidratar siempre desde el snapshot: si estamos offline es lo único
        // que hay, y si estamos online el fetch lo sobreescribirá
        vm.hydrate(&state);

        if monitor.is_offline() {
            log::info!("📴 Arranque offline: sirviendo snapshot local");
        } else {
            // Arranque online: drenar la cola que haya dejado una sesión
            // anterior y refrescar la colección autoritativa
            let state_boot = state.clone();
            let vm_boot = vm.clone();
            let sync_boot = sync.clone();
            spawn_local(async move {
                drain_and_refresh(&sync_boot, &vm_boot, &state_boot).await;
            });
        }

        // Cablear flancos de red: cada transición flip-ea el flag de forma
        // síncrona; el flanco online dispara la sincronización
        {
            let state = state.clone();
            let vm = vm.clone();
            let sync = sync.clone();
            monitor.start_monitoring(move |status| match status {
                NetworkStatus::Online => {
                    state.expenses.set_offline(false);
                    state.notify_subscribers();

                    let state = state.clone();
                    let vm = vm.clone();
                    let sync = sync.clone();
                    spawn_local(async move {
                        drain_and_refresh(&sync, &vm, &state).await;
                    });
                }
                NetworkStatus::Offline => {
                    state.expenses.set_offline(true);
                    // Recargar el último estado optimista persistido
                    vm.hydrate(&state);
                    state.notify_subscribers();
                }
                NetworkStatus::Unknown => {}
            });
        }

        // Suscribirse a cambios de estado para re-renderizar automáticamente
        state.subscribe_to_changes(move || {
            // Timeout(0) batchea múltiples updates en un solo render
            use gloo_timers::callback::Timeout;
            Timeout::new(0, move || {
                crate::rerender_app();
            })
            .forget();
        });

        Ok(Self {
            state,
            root: Some(root),
        })
    }

    /// Renderizar aplicación
    pub fn render(&mut self) -> Result<(), JsValue> {
        if let Some(root) = &self.root {
            set_inner_html(root, "");
            let app_view = render_app(&self.state)?;
            append_child(root, &app_view)?;
        }
        Ok(())
    }
}

/// Drenar la cola pendiente y, si el pase completó, refrescar la colección
/// desde el backend
async fn drain_and_refresh(sync: &SyncService, vm: &ExpensesViewModel, state: &AppState) {
    match sync.drain(&state.expenses).await {
        SyncOutcome::Completed { applied } => {
            if applied > 0 {
                log::info!("✅ Drain completo ({} cambios), refrescando colección", applied);
            }
            if let Err(e) = vm.load_first_page(state).await {
                log::error!("❌ Error refrescando tras sync: {}", e);
            }
        }
        SyncOutcome::AlreadyRunning => {}
        SyncOutcome::Failed { applied, error } => {
            // La cola conserva el sufijo fallido; se reintentará en el
            // próximo flanco online
            log::warn!("⚠️ Sync interrumpido tras {} cambios: {}", applied, error);
        }
    }
    state.notify_subscribers();
}
