// ============================================================================
// EXPENSES STATE - Estado autoritativo de la colección de gastos
// ============================================================================
// Toda mutación pasa por operaciones tipadas; no hay mutación libre del
// estado desde fuera de este módulo.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::expense::{Expense, ExpenseId};

/// Estado de la sesión de gastos
#[derive(Clone)]
pub struct ExpensesState {
    expenses: Rc<RefCell<Vec<Expense>>>,
    offline: Rc<RefCell<bool>>,
    syncing: Rc<RefCell<bool>>,
    pending_changes: Rc<RefCell<usize>>,
    // Paginación del listado remoto
    page: Rc<RefCell<u32>>,
    total: Rc<RefCell<usize>>,
    has_more: Rc<RefCell<bool>>,
    loading: Rc<RefCell<bool>>,
}

impl ExpensesState {
    /// Crear estado vacío (se hidrata desde el journal o desde el backend)
    pub fn new() -> Self {
        Self {
            expenses: Rc::new(RefCell::new(Vec::new())),
            offline: Rc::new(RefCell::new(false)),
            syncing: Rc::new(RefCell::new(false)),
            pending_changes: Rc::new(RefCell::new(0)),
            page: Rc::new(RefCell::new(0)),
            total: Rc::new(RefCell::new(0)),
            has_more: Rc::new(RefCell::new(true)),
            loading: Rc::new(RefCell::new(false)),
        }
    }

    /// Reemplazar la colección completa (fetch remoto o hidratación)
    pub fn set_expenses(&self, expenses: Vec<Expense>) {
        *self.expenses.borrow_mut() = expenses;
    }

    /// Copia de la colección actual
    pub fn get_expenses(&self) -> Vec<Expense> {
        self.expenses.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.expenses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.borrow().is_empty()
    }

    /// Verificar si un identificador ya existe en la colección
    pub fn contains_id(&self, id: &ExpenseId) -> bool {
        self.expenses.borrow().iter().any(|e| &e.id == id)
    }

    /// Insertar gasto al principio (orden de UI: lo más reciente arriba)
    pub fn add_expense(&self, expense: Expense) {
        self.expenses.borrow_mut().insert(0, expense);
    }

    /// Aplicar nuevos campos al gasto con el mismo identificador
    pub fn update_expense(&self, expense: Expense) -> bool {
        let mut expenses = self.expenses.borrow_mut();
        match expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        }
    }

    /// Eliminar gasto por identificador
    pub fn delete_expense(&self, id: &ExpenseId) -> bool {
        let mut expenses = self.expenses.borrow_mut();
        let before = expenses.len();
        expenses.retain(|e| &e.id != id);
        expenses.len() != before
    }

    /// Sustituir el gasto con id `old_id` por el registro canónico del
    /// servidor, conservando la posición en la colección. Es la operación de
    /// reconciliación de identificadores provisionales.
    pub fn replace_expense(&self, old_id: &ExpenseId, expense: Expense) -> bool {
        let mut expenses = self.expenses.borrow_mut();
        match expenses.iter_mut().find(|e| &e.id == old_id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        }
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.borrow_mut() = offline;
    }

    pub fn is_offline(&self) -> bool {
        *self.offline.borrow()
    }

    pub fn set_syncing(&self, syncing: bool) {
        *self.syncing.borrow_mut() = syncing;
    }

    pub fn is_syncing(&self) -> bool {
        *self.syncing.borrow()
    }

    /// El contador de pendientes siempre refleja la longitud de la cola persistida
    pub fn set_pending_count(&self, count: usize) {
        *self.pending_changes.borrow_mut() = count;
    }

    pub fn pending_count(&self) -> usize {
        *self.pending_changes.borrow()
    }

    pub fn clear_pending_changes(&self) {
        *self.pending_changes.borrow_mut() = 0;
    }

    // ==========================================
    // Paginación
    // ==========================================

    pub fn set_page_info(&self, page: u32, total: usize) {
        *self.page.borrow_mut() = page;
        *self.total.borrow_mut() = total;
        *self.has_more.borrow_mut() = self.expenses.borrow().len() < total;
    }

    pub fn current_page(&self) -> u32 {
        *self.page.borrow()
    }

    pub fn has_more(&self) -> bool {
        *self.has_more.borrow()
    }

    pub fn set_loading(&self, loading: bool) {
        *self.loading.borrow_mut() = loading;
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }
}

impl Default for ExpensesState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{Category, NewExpense};
    use chrono::NaiveDate;

    fn expense(id: &str, title: &str) -> Expense {
        NewExpense {
            title: title.to_string(),
            amount: 10.0,
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            category: Category::Food,
            notes: None,
        }
        .into_expense(ExpenseId::Server(id.to_string()))
    }

    #[test]
    fn test_add_prepends() {
        let state = ExpensesState::new();
        state.add_expense(expense("1", "Groceries"));
        state.add_expense(expense("2", "Gas"));

        let titles: Vec<String> = state.get_expenses().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Gas", "Groceries"]);
    }

    #[test]
    fn test_update_misses_unknown_id() {
        let state = ExpensesState::new();
        state.add_expense(expense("1", "Groceries"));

        assert!(state.update_expense(expense("1", "Groceries v2")));
        assert!(!state.update_expense(expense("9", "Ghost")));
        assert_eq!(state.get_expenses()[0].title, "Groceries v2");
    }

    #[test]
    fn test_replace_keeps_position() {
        let state = ExpensesState::new();
        state.add_expense(expense("1", "Groceries"));
        let provisional = NewExpense {
            title: "Coffee".to_string(),
            amount: 4.5,
            date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
            category: Category::Food,
            notes: None,
        }
        .into_expense(ExpenseId::Provisional("offline-1-0".to_string()));
        state.add_expense(provisional.clone());

        let canonical = expense("77", "Coffee");
        assert!(state.replace_expense(&provisional.id, canonical.clone()));

        let expenses = state.get_expenses();
        assert_eq!(expenses[0].id, canonical.id);
        assert_eq!(expenses[1].title, "Groceries");
        assert!(!state.contains_id(&provisional.id));
    }

    #[test]
    fn test_page_info_derives_has_more() {
        let state = ExpensesState::new();
        for i in 0..10 {
            state.add_expense(expense(&i.to_string(), "x"));
        }
        state.set_page_info(1, 25);
        assert!(state.has_more());

        for i in 10..25 {
            state.add_expense(expense(&i.to_string(), "x"));
        }
        state.set_page_info(3, 25);
        assert!(!state.has_more());
    }
}
