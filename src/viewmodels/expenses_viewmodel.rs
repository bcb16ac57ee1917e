// ============================================================================
// EXPENSES VIEWMODEL - INTERCEPTOR DE MUTACIONES
// ============================================================================
// Único punto de origen de los intents create/edit/remove. Decide por cada
// intent según el flag offline: online lo reenvía al backend en una sola
// request (fail-fast, sin encolado silencioso); offline lo aplica de forma
// optimista al estado y lo journaliza para replay posterior.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::models::expense::{Expense, ExpenseId, NewExpense};
use crate::models::sync::PendingChange;
use crate::services::api_client::{ApiClient, ExpensesApi, FetchExpensesParams};
use crate::services::offline_service::{OfflineService, OfflineStore};
use crate::state::app_state::AppState;
use crate::utils::constants::PAGE_LIMIT;

/// ViewModel de gastos - lógica de negocio del listado y las mutaciones
#[derive(Clone)]
pub struct ExpensesViewModel<A = ApiClient, J = OfflineService> {
    api: A,
    store: J,
    provisional_seq: Rc<Cell<u64>>,
}

impl ExpensesViewModel {
    pub fn new() -> Self {
        ExpensesViewModel::with(ApiClient::new(), OfflineService::new())
    }
}

impl Default for ExpensesViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ExpensesApi, J: OfflineStore> ExpensesViewModel<A, J> {
    pub fn with(api: A, store: J) -> Self {
        Self {
            api,
            store,
            provisional_seq: Rc::new(Cell::new(0)),
        }
    }

    /// Hidratar el estado desde el snapshot durable (arranque o paso a offline)
    pub fn hydrate(&self, state: &AppState) {
        let snapshot = self.store.load_snapshot();
        let pending = self.store.load_queue().len();
        log::info!("💾 Hidratando desde snapshot: {} gastos, {} cambios pendientes",
                   snapshot.len(), pending);
        state.expenses.set_expenses(snapshot);
        state.expenses.set_pending_count(pending);
    }

    // ==========================================
    // Listado paginado
    // ==========================================

    /// Cargar la primera página con los filtros actuales (reset del listado)
    pub async fn load_first_page(&self, state: &AppState) -> Result<(), String> {
        self.fetch_page(state, 1, true).await
    }

    /// Cargar la página siguiente y acumularla. No-op cuando no quedan
    /// páginas o hay una carga en vuelo.
    pub async fn load_more(&self, state: &AppState) -> Result<(), String> {
        if state.expenses.is_offline() || !state.expenses.has_more() || state.expenses.is_loading() {
            log::info!("ℹ️ load_more ignorado (offline={}, has_more={}, loading={})",
                       state.expenses.is_offline(), state.expenses.has_more(),
                       state.expenses.is_loading());
            return Ok(());
        }
        let next = state.expenses.current_page() + 1;
        self.fetch_page(state, next, false).await
    }

    async fn fetch_page(&self, state: &AppState, page: u32, replace: bool) -> Result<(), String> {
        let params = self.list_params(state, page);
        state.expenses.set_loading(true);

        let result = self.api.fetch_expenses(&params).await;
        state.expenses.set_loading(false);

        let fetched = result?;
        if replace {
            state.expenses.set_expenses(fetched.expenses);
        } else {
            let mut expenses = state.expenses.get_expenses();
            expenses.extend(fetched.expenses);
            state.expenses.set_expenses(expenses);
        }
        state.expenses.set_page_info(fetched.page, fetched.total);

        // El snapshot sigue al último fetch: pasar a offline justo después
        // hidrata los datos más frescos
        if let Err(e) = self.store.save_snapshot(&state.expenses.get_expenses()) {
            log::warn!("⚠️ Error guardando snapshot tras fetch: {}", e);
        }

        Ok(())
    }

    fn list_params(&self, state: &AppState, page: u32) -> FetchExpensesParams {
        FetchExpensesParams {
            page,
            limit: PAGE_LIMIT,
            category: *state.category_filter.borrow(),
            sort_by: *state.sort_by.borrow(),
            order: *state.sort_order.borrow(),
        }
    }

    // ==========================================
    // Intents de mutación (el interceptor)
    // ==========================================

    /// Crear gasto. El borrador llega ya validado.
    pub async fn create(&self, state: &AppState, draft: NewExpense) -> Result<(), String> {
        if state.expenses.is_offline() {
            // Rama offline: sin ningún await, el estado refleja la mutación
            // antes de retornar
            let id = self.next_provisional_id(state);
            let expense = draft.into_expense(id);
            log::info!("📴 Alta offline con id provisional {}", expense.id);

            state.expenses.add_expense(expense.clone());
            let mut queue = self.store.load_queue();
            queue.push(PendingChange::Add { expense });
            self.persist_offline_mutation(state, queue)
        } else {
            self.api.create_expense(&draft).await?;
            self.load_first_page(state).await
        }
    }

    /// Editar gasto existente con sus nuevos campos
    pub async fn edit(&self, state: &AppState, expense: Expense) -> Result<(), String> {
        if state.expenses.is_offline() {
            if !state.expenses.update_expense(expense.clone()) {
                log::warn!("⚠️ Edición offline sobre id desconocido {}, ignorada", expense.id);
                return Ok(());
            }
            let mut queue = self.store.load_queue();
            queue.push(PendingChange::Update { expense });
            self.persist_offline_mutation(state, queue)
        } else {
            self.api
                .update_expense(&expense.id, &NewExpense::from(&expense))
                .await?;
            self.load_first_page(state).await
        }
    }

    /// Borrar gasto por identificador
    pub async fn remove(&self, state: &AppState, id: ExpenseId) -> Result<(), String> {
        if state.expenses.is_offline() {
            state.expenses.delete_expense(&id);

            let mut queue = self.store.load_queue();
            let has_queued_add = queue
                .iter()
                .any(|c| matches!(c, PendingChange::Add { expense } if expense.id == id));

            if id.is_provisional() && has_queued_add {
                // El registro nació offline y muere offline: compactar la
                // cola para que el replay nunca lo cree en el servidor
                log::info!("🧹 Borrado de {} compacta su add pendiente", id);
                queue.retain(|c| c.target_id() != &id);
            } else {
                queue.push(PendingChange::Delete { id });
            }
            self.persist_offline_mutation(state, queue)
        } else {
            self.api.delete_expense(&id).await?;
            self.load_first_page(state).await
        }
    }

    /// Persistir cola y snapshot tras una mutación offline y sincronizar el
    /// contador de pendientes con la longitud de la cola
    fn persist_offline_mutation(&self, state: &AppState, queue: Vec<PendingChange>) -> Result<(), String> {
        self.store.save_queue(&queue)?;
        state.expenses.set_pending_count(queue.len());
        self.store.save_snapshot(&state.expenses.get_expenses())?;
        Ok(())
    }

    /// Sintetizar un id provisional único: timestamp en milisegundos más un
    /// contador de sesión, verificado contra todos los ids conocidos
    fn next_provisional_id(&self, state: &AppState) -> ExpenseId {
        let millis = chrono::Utc::now().timestamp_millis();
        loop {
            let seq = self.provisional_seq.get();
            self.provisional_seq.set(seq + 1);
            let candidate = ExpenseId::Provisional(format!("offline-{}-{}", millis, seq));
            if !state.expenses.contains_id(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sync_service::{SyncOutcome, SyncService};
    use crate::services::testutil::{expense_with, new_expense, MemoryStore, MockApi};
    use crate::utils::constants::SNAPSHOT_KEY;
    use futures::executor::block_on;

    fn setup() -> (MockApi, MemoryStore, AppState, ExpensesViewModel<MockApi, MemoryStore>) {
        let api = MockApi::new();
        let store = MemoryStore::new();
        let state = AppState::new();
        let vm = ExpensesViewModel::with(api.clone(), store.clone());
        (api, store, state, vm)
    }

    fn seed_server(api: &MockApi, count: usize) {
        let expenses = (0..count)
            .map(|i| expense_with(&format!("{}", i + 1), false, &format!("seed{}", i), 1.0 + i as f64))
            .collect();
        api.seed(expenses);
    }

    #[test]
    fn test_pagination_accumulates_and_stops() {
        let (api, _store, state, vm) = setup();
        seed_server(&api, 25);

        block_on(vm.load_first_page(&state)).unwrap();
        assert_eq!(state.expenses.len(), 10);
        assert!(state.expenses.has_more());

        block_on(vm.load_more(&state)).unwrap();
        assert_eq!(state.expenses.len(), 20);

        block_on(vm.load_more(&state)).unwrap();
        assert_eq!(state.expenses.len(), 25);
        assert!(!state.expenses.has_more());

        // Cuarta llamada: no-op
        block_on(vm.load_more(&state)).unwrap();
        assert_eq!(state.expenses.len(), 25);
        assert_eq!(state.expenses.current_page(), 3);
    }

    #[test]
    fn test_offline_create_is_optimistic_and_journaled() {
        let (_api, store, state, vm) = setup();
        state.expenses.set_offline(true);

        block_on(vm.create(&state, new_expense("Coffee", 4.5))).unwrap();

        let expenses = state.expenses.get_expenses();
        assert_eq!(expenses.len(), 1);
        assert!(expenses[0].id.is_provisional());
        assert_eq!(expenses[0].title, "Coffee");

        let queue = store.load_queue();
        assert_eq!(queue.len(), 1);
        assert!(matches!(&queue[0], PendingChange::Add { expense } if expense.id == expenses[0].id));

        // Snapshot refleja el estado optimista para recargas offline
        assert_eq!(store.load_snapshot(), expenses);
        assert_eq!(state.expenses.pending_count(), 1);
    }

    #[test]
    fn test_offline_create_generates_distinct_ids_under_rapid_calls() {
        let (_api, _store, state, vm) = setup();
        state.expenses.set_offline(true);

        for i in 0..5 {
            block_on(vm.create(&state, new_expense(&format!("e{}", i), 1.0))).unwrap();
        }

        let mut ids: Vec<String> = state
            .expenses
            .get_expenses()
            .iter()
            .map(|e| e.id.raw().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_offline_edit_updates_state_and_queues_full_record() {
        let (_api, store, state, vm) = setup();
        let synced = expense_with("7", false, "Gas", 30.0);
        state.expenses.set_expenses(vec![synced.clone()]);
        state.expenses.set_offline(true);

        let mut edited = synced.clone();
        edited.amount = 35.0;
        block_on(vm.edit(&state, edited.clone())).unwrap();

        assert_eq!(state.expenses.get_expenses()[0].amount, 35.0);
        let queue = store.load_queue();
        assert!(matches!(&queue[0], PendingChange::Update { expense } if expense == &edited));
    }

    #[test]
    fn test_offline_delete_of_synced_record_queues_delete() {
        let (_api, store, state, vm) = setup();
        let synced = expense_with("7", false, "Gas", 30.0);
        state.expenses.set_expenses(vec![synced.clone()]);
        state.expenses.set_offline(true);

        block_on(vm.remove(&state, synced.id.clone())).unwrap();

        assert!(state.expenses.is_empty());
        let queue = store.load_queue();
        assert_eq!(queue.len(), 1);
        assert!(matches!(&queue[0], PendingChange::Delete { id } if id == &synced.id));
    }

    #[test]
    fn test_offline_add_then_delete_never_reaches_server() {
        let (api, store, state, vm) = setup();
        state.expenses.set_offline(true);

        block_on(vm.create(&state, new_expense("Coffee", 4.5))).unwrap();
        let provisional_id = state.expenses.get_expenses()[0].id.clone();
        assert!(provisional_id.is_provisional());

        block_on(vm.remove(&state, provisional_id)).unwrap();

        assert!(state.expenses.is_empty());
        assert!(store.load_queue().is_empty());
        assert_eq!(state.expenses.pending_count(), 0);

        // Reconexión: el drain no tiene nada que enviar y el servidor
        // nunca ve el registro
        state.expenses.set_offline(false);
        let sync = SyncService::with(api.clone(), store.clone());
        let outcome = block_on(sync.drain(&state.expenses));
        assert_eq!(outcome, SyncOutcome::Completed { applied: 0 });
        assert!(api.server_expenses().is_empty());
        assert_eq!(api.mutation_calls(), 0);
    }

    #[test]
    fn test_online_failure_is_fail_fast_without_local_mutation() {
        let (api, store, state, vm) = setup();
        api.fail_from_call(1);

        let result = block_on(vm.create(&state, new_expense("Coffee", 4.5)));

        assert!(result.is_err());
        assert!(state.expenses.is_empty());
        assert!(store.load_queue().is_empty());
        assert_eq!(state.expenses.pending_count(), 0);
    }

    #[test]
    fn test_online_create_refreshes_from_server() {
        let (api, _store, state, vm) = setup();

        block_on(vm.create(&state, new_expense("Coffee", 4.5))).unwrap();

        assert_eq!(api.server_expenses().len(), 1);
        let expenses = state.expenses.get_expenses();
        assert_eq!(expenses.len(), 1);
        assert!(!expenses[0].id.is_provisional());
    }

    #[test]
    fn test_hydrate_tolerates_corrupt_snapshot() {
        let (_api, store, state, vm) = setup();
        store.put_raw(SNAPSHOT_KEY, "{definitely not json");

        vm.hydrate(&state);

        assert!(state.expenses.is_empty());
        assert_eq!(state.expenses.pending_count(), 0);
    }

    #[test]
    fn test_end_to_end_offline_add_then_reconnect() {
        let (api, store, state, vm) = setup();

        // Offline: alta optimista con id provisional
        state.expenses.set_offline(true);
        block_on(vm.create(&state, new_expense("Coffee", 4.5))).unwrap();
        let provisional = state.expenses.get_expenses()[0].id.clone();
        assert!(provisional.is_provisional());
        assert_eq!(state.expenses.pending_count(), 1);

        // Reconexión: drain y sustitución del id
        state.expenses.set_offline(false);
        let sync = SyncService::with(api.clone(), store.clone());
        let outcome = block_on(sync.drain(&state.expenses));
        assert_eq!(outcome, SyncOutcome::Completed { applied: 1 });

        let expenses = state.expenses.get_expenses();
        assert_eq!(expenses.len(), 1);
        assert!(!expenses[0].id.is_provisional());
        assert_eq!(expenses[0].title, "Coffee");
        assert_eq!(state.expenses.pending_count(), 0);
        assert!(store.load_queue().is_empty());
    }
}
