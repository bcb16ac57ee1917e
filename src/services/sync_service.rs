// ============================================================================
// SERVICIO DE SINCRONIZACIÓN CON QUEUE PERSISTENTE
// ============================================================================
// Drena la cola de cambios pendientes en orden FIFO contra el backend,
// reconciliando identificadores provisionales con los asignados por el
// servidor. La cola persistida se actualiza tras cada entrada confirmada:
// un fallo deja en disco exactamente el sufijo no procesado.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::models::expense::{Expense, ExpenseId, NewExpense};
use crate::models::sync::PendingChange;
use crate::services::api_client::{ApiClient, ExpensesApi};
use crate::services::offline_service::{OfflineService, OfflineStore};
use crate::state::expenses_state::ExpensesState;

/// Resultado de un pase de sincronización
#[derive(Clone, Debug, PartialEq)]
pub enum SyncOutcome {
    /// Cola drenada por completo; el caller debe refrescar la colección
    Completed { applied: usize },
    /// Ya hay un drain en curso; este disparo se ignora
    AlreadyRunning,
    /// El drain se detuvo en la primera entrada fallida; la entrada fallida
    /// y las posteriores siguen encoladas para un reintento futuro
    Failed { applied: usize, error: String },
}

/// Motor de sincronización
#[derive(Clone)]
pub struct SyncService<A = ApiClient, J = OfflineService> {
    api: A,
    store: J,
    in_flight: Rc<Cell<bool>>,
}

impl SyncService {
    pub fn new() -> Self {
        SyncService::with(ApiClient::new(), OfflineService::new())
    }
}

impl Default for SyncService {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ExpensesApi, J: OfflineStore> SyncService<A, J> {
    pub fn with(api: A, store: J) -> Self {
        Self {
            api,
            store,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    /// Drenar la cola de cambios pendientes.
    ///
    /// Estrictamente secuencial: cada cambio se envía y se espera antes del
    /// siguiente, porque entradas posteriores pueden depender de las
    /// sustituciones de identificador producidas por entradas anteriores.
    /// Un segundo disparo mientras hay un drain en curso es un no-op.
    pub async fn drain(&self, state: &ExpensesState) -> SyncOutcome {
        if self.in_flight.get() {
            log::warn!("⚠️ Sync ya en curso, ignorando disparo duplicado");
            return SyncOutcome::AlreadyRunning;
        }
        self.in_flight.set(true);
        state.set_syncing(true);

        let mut queue = self.store.load_queue();
        log::info!("🔄 Iniciando sincronización: {} cambios pendientes", queue.len());

        let mut applied = 0usize;

        while !queue.is_empty() {
            let change = queue[0].clone();

            match self.submit(&change).await {
                Ok(reconciled) => {
                    if let Some((old_id, canonical)) = reconciled {
                        self.reconcile(state, &mut queue, &old_id, canonical);
                    }

                    // Entrada confirmada: sale de la cola persistida ya,
                    // no al final del pase completo
                    queue.remove(0);
                    applied += 1;
                    if let Err(e) = self.store.save_queue(&queue) {
                        log::error!("❌ Error persistiendo cola tras entrada confirmada: {}", e);
                    }
                    state.set_pending_count(queue.len());
                }
                Err(e) => {
                    log::error!("❌ Sync detenido en cambio '{}': {}", change.kind(), e);
                    state.set_syncing(false);
                    self.in_flight.set(false);
                    return SyncOutcome::Failed { applied, error: e };
                }
            }
        }

        if let Err(e) = self.store.clear_queue() {
            log::error!("❌ Error limpiando cola: {}", e);
        }
        state.clear_pending_changes();
        state.set_syncing(false);
        self.in_flight.set(false);

        log::info!("✅ Sincronización completa: {} cambios aplicados", applied);
        SyncOutcome::Completed { applied }
    }

    /// Enviar una entrada al backend. Para un `add` cuyo registro llevaba id
    /// provisional devuelve el par (id provisional, registro canónico).
    async fn submit(&self, change: &PendingChange) -> Result<Option<(ExpenseId, Expense)>, String> {
        match change {
            PendingChange::Add { expense } => {
                // El id provisional no viaja al backend; el servidor asigna el suyo
                let created = self.api.create_expense(&NewExpense::from(expense)).await?;
                if expense.id.is_provisional() {
                    Ok(Some((expense.id.clone(), created)))
                } else {
                    Ok(None)
                }
            }
            PendingChange::Update { expense } => {
                self.api
                    .update_expense(&expense.id, &NewExpense::from(expense))
                    .await?;
                Ok(None)
            }
            PendingChange::Delete { id } => {
                self.api.delete_expense(id).await?;
                Ok(None)
            }
        }
    }

    /// Sustituir un id provisional por el id del servidor en el estado y en
    /// todas las entradas aún encoladas que lo referencien.
    fn reconcile(
        &self,
        state: &ExpensesState,
        queue: &mut [PendingChange],
        old_id: &ExpenseId,
        canonical: Expense,
    ) {
        log::info!("🔁 Id provisional {} → {}", old_id, canonical.id);

        let new_id = canonical.id.clone();
        if !state.replace_expense(old_id, canonical) {
            log::warn!("⚠️ Id provisional {} sin slot en el estado (¿borrado durante el drain?)", old_id);
        }

        // La primera posición es la entrada recién confirmada; las restantes
        // pueden apuntar todavía al id retirado
        for entry in queue.iter_mut().skip(1) {
            entry.rewrite_id(old_id, &new_id);
        }
    }
}
