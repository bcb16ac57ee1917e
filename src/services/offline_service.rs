// ============================================================================
// SERVICIO OFFLINE - JOURNAL DURABLE EN LOCALSTORAGE
// ============================================================================
// Dos claves independientes: el snapshot completo de gastos y la cola de
// cambios pendientes. Lectura tolerante: un valor ausente o corrupto se trata
// como vacío, nunca como error del caller.
// ============================================================================

use web_sys::window;

use crate::models::expense::Expense;
use crate::models::sync::PendingChange;
use crate::utils::constants::{PENDING_CHANGES_KEY, SNAPSHOT_KEY};

/// Almacén durable del estado offline.
///
/// Lo implementa el servicio de localStorage real y el almacén en memoria de
/// los tests; el motor de sincronización y el viewmodel son genéricos sobre
/// este trait.
pub trait OfflineStore {
    /// Persistir el snapshot completo de la colección
    fn save_snapshot(&self, expenses: &[Expense]) -> Result<(), String>;

    /// Cargar el snapshot; ausente o corrupto devuelve colección vacía
    fn load_snapshot(&self) -> Vec<Expense>;

    /// Persistir la cola completa de cambios pendientes
    fn save_queue(&self, queue: &[PendingChange]) -> Result<(), String>;

    /// Cargar la cola; ausente o corrupta devuelve cola vacía
    fn load_queue(&self) -> Vec<PendingChange>;

    /// Limpiar la cola tras un drain completo
    fn clear_queue(&self) -> Result<(), String>;
}

/// Decodificar un snapshot serializado. Corrupto → vacío.
pub fn decode_snapshot(raw: Option<String>) -> Vec<Expense> {
    match raw {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("⚠️ Snapshot corrupto, se descarta: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Decodificar una cola serializada. Corrupta → vacía.
pub fn decode_queue(raw: Option<String>) -> Vec<PendingChange> {
    match raw {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("⚠️ Cola de cambios corrupta, se descarta: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Journal durable sobre localStorage
#[derive(Clone)]
pub struct OfflineService;

impl OfflineService {
    pub fn new() -> Self {
        Self
    }

    fn save_item(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or("No se pudo acceder a localStorage")?;

        storage
            .set_item(key, value)
            .map_err(|_| "Error guardando en localStorage".to_string())?;

        Ok(())
    }

    fn load_item(&self, key: &str) -> Option<String> {
        window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(key).ok())
            .flatten()
    }
}

impl OfflineStore for OfflineService {
    fn save_snapshot(&self, expenses: &[Expense]) -> Result<(), String> {
        let json = serde_json::to_string(expenses)
            .map_err(|e| format!("Error serializando snapshot: {}", e))?;

        self.save_item(SNAPSHOT_KEY, &json)?;
        log::info!("💾 Snapshot guardado: {} gastos", expenses.len());
        Ok(())
    }

    fn load_snapshot(&self) -> Vec<Expense> {
        decode_snapshot(self.load_item(SNAPSHOT_KEY))
    }

    fn save_queue(&self, queue: &[PendingChange]) -> Result<(), String> {
        let json = serde_json::to_string(queue)
            .map_err(|e| format!("Error serializando cola: {}", e))?;

        self.save_item(PENDING_CHANGES_KEY, &json)?;
        log::info!("💾 Cola guardada: {} cambios pendientes", queue.len());
        Ok(())
    }

    fn load_queue(&self) -> Vec<PendingChange> {
        decode_queue(self.load_item(PENDING_CHANGES_KEY))
    }

    fn clear_queue(&self) -> Result<(), String> {
        let storage = window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or("No se pudo acceder a localStorage")?;

        storage
            .remove_item(PENDING_CHANGES_KEY)
            .map_err(|_| "Error eliminando de localStorage".to_string())?;

        log::info!("🗑️ Cola limpiada");
        Ok(())
    }
}

impl Default for OfflineService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{Category, ExpenseId, NewExpense};
    use chrono::NaiveDate;

    #[test]
    fn test_decode_absent_values_as_empty() {
        assert!(decode_snapshot(None).is_empty());
        assert!(decode_queue(None).is_empty());
    }

    #[test]
    fn test_decode_malformed_values_as_empty() {
        assert!(decode_snapshot(Some("{not json".to_string())).is_empty());
        assert!(decode_queue(Some("[{\"type\":\"explode\"}]".to_string())).is_empty());
    }

    #[test]
    fn test_decode_valid_queue_preserves_order() {
        let expense = NewExpense {
            title: "Coffee".to_string(),
            amount: 4.5,
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            category: Category::Food,
            notes: None,
        }
        .into_expense(ExpenseId::Provisional("offline-1-0".to_string()));

        let queue = vec![
            PendingChange::Add { expense: expense.clone() },
            PendingChange::Delete { id: expense.id.clone() },
        ];
        let json = serde_json::to_string(&queue).unwrap();

        let decoded = decode_queue(Some(json));
        assert_eq!(decoded, queue);
    }
}
