// ============================================================================
// MONITOR DE ESTADO DE RED
// ============================================================================
// Detecta cambios en la conectividad de red (online/offline) para pausar y
// reanudar la sincronización automática. Emite cada transición exactamente
// una vez por flanco: los navegadores pueden repetir eventos del mismo
// estado y esos repetidos se descartan.
// ============================================================================

use std::sync::{Arc, Mutex};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Event};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NetworkStatus {
    Online,
    Offline,
    Unknown,
}

/// Decidir si un estado observado constituye un flanco a emitir.
/// Devuelve None cuando el estado repite el último emitido.
pub fn edge_transition(last: NetworkStatus, observed: NetworkStatus) -> Option<NetworkStatus> {
    if observed == NetworkStatus::Unknown || observed == last {
        None
    } else {
        Some(observed)
    }
}

/// Monitor de estado de red con listeners de eventos.
/// Previene múltiples registros de listeners globales (solo se registra una vez).
pub struct NetworkMonitor {
    status: Arc<Mutex<NetworkStatus>>,
    monitoring_started: Arc<Mutex<bool>>,
}

impl NetworkMonitor {
    pub fn new() -> Self {
        let status = Arc::new(Mutex::new(NetworkStatus::Unknown));

        // Estado inicial desde navigator.onLine vía js_sys
        if let Some(window) = window() {
            let navigator = js_sys::Reflect::get(&window, &JsValue::from_str("navigator")).ok();

            if let Some(nav) = navigator {
                let on_line = js_sys::Reflect::get(&nav, &JsValue::from_str("onLine"))
                    .ok()
                    .and_then(|v| v.as_bool());

                if let Some(is_online) = on_line {
                    *status.lock().unwrap() = if is_online {
                        NetworkStatus::Online
                    } else {
                        NetworkStatus::Offline
                    };
                }
            }
        }

        Self {
            status,
            monitoring_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Iniciar monitoreo de eventos de red.
    /// El callback recibe solo flancos reales (online→offline, offline→online).
    pub fn start_monitoring<F>(&mut self, callback: F)
    where
        F: Fn(NetworkStatus) + 'static,
    {
        {
            let mut started = self.monitoring_started.lock().unwrap();
            if *started {
                log::warn!("⚠️ NetworkMonitor: start_monitoring ya fue llamado, ignorando llamada duplicada");
                return;
            }
            *started = true;
        }

        let window = match window() {
            Some(w) => w,
            None => return,
        };

        let status = self.status.clone();
        let callback = Arc::new(callback);

        // Listener para evento "online"
        let online_closure = Closure::wrap(Box::new({
            let status = status.clone();
            let callback = callback.clone();
            move |_event: Event| {
                let mut last = status.lock().unwrap();
                match edge_transition(*last, NetworkStatus::Online) {
                    Some(edge) => {
                        log::info!("🌐 Network: ONLINE");
                        *last = edge;
                        drop(last);
                        callback(edge);
                    }
                    None => {
                        log::info!("🌐 Network: evento online repetido, ignorado");
                    }
                }
            }
        }) as Box<dyn FnMut(Event)>);

        // Listener para evento "offline"
        let offline_closure = Closure::wrap(Box::new({
            let status = status.clone();
            let callback = callback.clone();
            move |_event: Event| {
                let mut last = status.lock().unwrap();
                match edge_transition(*last, NetworkStatus::Offline) {
                    Some(edge) => {
                        log::warn!("📴 Network: OFFLINE");
                        *last = edge;
                        drop(last);
                        callback(edge);
                    }
                    None => {
                        log::info!("📴 Network: evento offline repetido, ignorado");
                    }
                }
            }
        }) as Box<dyn FnMut(Event)>);

        let _ = window.add_event_listener_with_callback(
            "online",
            online_closure.as_ref().unchecked_ref(),
        );

        let _ = window.add_event_listener_with_callback(
            "offline",
            offline_closure.as_ref().unchecked_ref(),
        );

        // Los listeners globales persisten durante toda la vida de la app;
        // forget() mantiene los closures vivos en Rust WASM.
        online_closure.forget();
        offline_closure.forget();

        log::info!("✅ NetworkMonitor: listeners registrados (solo una vez)");
    }

    /// Obtener estado actual de red
    pub fn current_status(&self) -> NetworkStatus {
        *self.status.lock().unwrap()
    }

    /// Verificar si está online
    pub fn is_online(&self) -> bool {
        matches!(self.current_status(), NetworkStatus::Online)
    }

    /// Verificar si está offline
    pub fn is_offline(&self) -> bool {
        matches!(self.current_status(), NetworkStatus::Offline)
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_emitted_once_per_transition() {
        assert_eq!(
            edge_transition(NetworkStatus::Online, NetworkStatus::Offline),
            Some(NetworkStatus::Offline)
        );
        assert_eq!(
            edge_transition(NetworkStatus::Offline, NetworkStatus::Online),
            Some(NetworkStatus::Online)
        );
    }

    #[test]
    fn test_repeated_status_is_suppressed() {
        assert_eq!(edge_transition(NetworkStatus::Online, NetworkStatus::Online), None);
        assert_eq!(edge_transition(NetworkStatus::Offline, NetworkStatus::Offline), None);
    }

    #[test]
    fn test_unknown_never_emits() {
        assert_eq!(edge_transition(NetworkStatus::Online, NetworkStatus::Unknown), None);
        assert_eq!(edge_transition(NetworkStatus::Unknown, NetworkStatus::Offline), Some(NetworkStatus::Offline));
    }
}
