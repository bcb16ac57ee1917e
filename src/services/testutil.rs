// ============================================================================
// DOBLES DE TEST - backend guionizado y journal en memoria
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use chrono::NaiveDate;

use crate::models::expense::{Category, Expense, ExpenseId, NewExpense};
use crate::models::sync::PendingChange;
use crate::services::api_client::{ExpensePage, ExpensesApi, FetchExpensesParams, SortField, SortOrder};
use crate::services::offline_service::{decode_queue, decode_snapshot, OfflineStore};
use crate::utils::constants::{PENDING_CHANGES_KEY, SNAPSHOT_KEY};

pub fn new_expense(title: &str, amount: f64) -> NewExpense {
    NewExpense {
        title: title.to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        category: Category::Food,
        notes: None,
    }
}

pub fn expense_with(id: &str, provisional: bool, title: &str, amount: f64) -> Expense {
    let id = if provisional {
        ExpenseId::Provisional(id.to_string())
    } else {
        ExpenseId::Server(id.to_string())
    };
    new_expense(title, amount).into_expense(id)
}

/// Futuro que se suspende una vez antes de resolver; permite observar un
/// drain con una llamada remota en vuelo.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Backend guionizado: mantiene los registros "del servidor" en memoria y
/// reproduce el contrato de paginación/filtro/orden del servicio real.
#[derive(Clone)]
pub struct MockApi {
    server: Rc<RefCell<Vec<Expense>>>,
    deleted: Rc<RefCell<Vec<String>>>,
    next_id: Rc<Cell<u32>>,
    mutation_calls: Rc<Cell<usize>>,
    fail_from: Rc<Cell<Option<usize>>>,
    suspend_next: Rc<Cell<bool>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            server: Rc::new(RefCell::new(Vec::new())),
            deleted: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(100)),
            mutation_calls: Rc::new(Cell::new(0)),
            fail_from: Rc::new(Cell::new(None)),
            suspend_next: Rc::new(Cell::new(false)),
        }
    }

    /// Sembrar registros preexistentes en el servidor
    pub fn seed(&self, expenses: Vec<Expense>) {
        *self.server.borrow_mut() = expenses;
    }

    /// A partir de la llamada de mutación número `n` (1-based), todo falla
    pub fn fail_from_call(&self, n: usize) {
        self.fail_from.set(Some(n));
    }

    /// La siguiente llamada de mutación se suspende una vez antes de resolver
    pub fn suspend_first_call(&self) {
        self.suspend_next.set(true);
    }

    pub fn server_expenses(&self) -> Vec<Expense> {
        self.server.borrow().clone()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.get()
    }

    async fn enter_mutation(&self) -> Result<(), String> {
        if self.suspend_next.take() {
            YieldOnce(false).await;
        }
        let call = self.mutation_calls.get() + 1;
        self.mutation_calls.set(call);
        if let Some(n) = self.fail_from.get() {
            if call >= n {
                return Err(format!("HTTP 500: Internal Server Error (call {})", call));
            }
        }
        Ok(())
    }
}

impl ExpensesApi for MockApi {
    async fn fetch_expenses(&self, params: &FetchExpensesParams) -> Result<ExpensePage, String> {
        let mut results: Vec<Expense> = self
            .server
            .borrow()
            .iter()
            .filter(|e| params.category.map_or(true, |c| e.category == c))
            .cloned()
            .collect();

        match params.sort_by {
            SortField::Date => results.sort_by_key(|e| e.date),
            SortField::Amount => results.sort_by(|a, b| a.amount.partial_cmp(&b.amount).unwrap()),
        }
        if params.order == SortOrder::Desc {
            results.reverse();
        }

        let total = results.len();
        let start = ((params.page - 1) * params.limit) as usize;
        let page: Vec<Expense> = results.into_iter().skip(start).take(params.limit as usize).collect();

        Ok(ExpensePage {
            expenses: page,
            total,
            page: params.page,
        })
    }

    async fn create_expense(&self, draft: &NewExpense) -> Result<Expense, String> {
        self.enter_mutation().await?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let created = draft.clone().into_expense(ExpenseId::Server(id.to_string()));
        self.server.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn update_expense(&self, id: &ExpenseId, draft: &NewExpense) -> Result<Expense, String> {
        self.enter_mutation().await?;
        let updated = draft.clone().into_expense(id.clone());
        let mut server = self.server.borrow_mut();
        match server.iter_mut().find(|e| e.id.raw() == id.raw()) {
            Some(slot) => {
                *slot = updated.clone();
                Ok(updated)
            }
            None => Err(format!("HTTP 404: no expense {}", id.raw())),
        }
    }

    async fn delete_expense(&self, id: &ExpenseId) -> Result<(), String> {
        self.enter_mutation().await?;
        self.server.borrow_mut().retain(|e| e.id.raw() != id.raw());
        self.deleted.borrow_mut().push(id.raw().to_string());
        Ok(())
    }
}

/// Journal en memoria con la misma semántica de claves que localStorage
#[derive(Clone)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Escribir un valor crudo (para simular datos corruptos)
    pub fn put_raw(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl OfflineStore for MemoryStore {
    fn save_snapshot(&self, expenses: &[Expense]) -> Result<(), String> {
        let json = serde_json::to_string(expenses).map_err(|e| e.to_string())?;
        self.put_raw(SNAPSHOT_KEY, &json);
        Ok(())
    }

    fn load_snapshot(&self) -> Vec<Expense> {
        decode_snapshot(self.raw(SNAPSHOT_KEY))
    }

    fn save_queue(&self, queue: &[PendingChange]) -> Result<(), String> {
        let json = serde_json::to_string(queue).map_err(|e| e.to_string())?;
        self.put_raw(PENDING_CHANGES_KEY, &json);
        Ok(())
    }

    fn load_queue(&self) -> Vec<PendingChange> {
        decode_queue(self.raw(PENDING_CHANGES_KEY))
    }

    fn clear_queue(&self) -> Result<(), String> {
        self.items.borrow_mut().remove(PENDING_CHANGES_KEY);
        Ok(())
    }
}
