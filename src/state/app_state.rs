// ============================================================================
// APP STATE - Estado global de la aplicación
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::expense::{Category, Expense};
use crate::services::api_client::{SortField, SortOrder};
use crate::state::expenses_state::ExpensesState;

/// Estado global de la aplicación
#[derive(Clone)]
pub struct AppState {
    pub expenses: ExpensesState,

    // UI State
    pub show_form: Rc<RefCell<bool>>,
    pub editing_expense: Rc<RefCell<Option<Expense>>>,
    pub form_error: Rc<RefCell<Option<String>>>,

    // Controles de filtro y orden del listado
    pub category_filter: Rc<RefCell<Option<Category>>>,
    pub sort_by: Rc<RefCell<SortField>>,
    pub sort_order: Rc<RefCell<SortOrder>>,

    // Reactivity: callbacks para notificar cambios
    pub change_subscribers: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl AppState {
    /// Crear nuevo estado de aplicación
    pub fn new() -> Self {
        Self {
            expenses: ExpensesState::new(),
            show_form: Rc::new(RefCell::new(false)),
            editing_expense: Rc::new(RefCell::new(None)),
            form_error: Rc::new(RefCell::new(None)),
            category_filter: Rc::new(RefCell::new(None)),
            sort_by: Rc::new(RefCell::new(SortField::Date)),
            sort_order: Rc::new(RefCell::new(SortOrder::Asc)),
            change_subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Suscribirse a cambios de estado
    pub fn subscribe_to_changes<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.change_subscribers.borrow_mut().push(Rc::new(callback));
    }

    /// Notificar a todos los subscribers de cambios
    pub fn notify_subscribers(&self) {
        for callback in self.change_subscribers.borrow().iter() {
            callback();
        }
    }

    /// Mostrar u ocultar el formulario (cerrar limpia el gasto en edición)
    pub fn set_show_form(&self, show: bool) {
        *self.show_form.borrow_mut() = show;
        if !show {
            *self.editing_expense.borrow_mut() = None;
            *self.form_error.borrow_mut() = None;
        }
        self.notify_subscribers();
    }

    /// Abrir el formulario en modo edición para un gasto existente
    pub fn set_editing_expense(&self, expense: Option<Expense>) {
        *self.editing_expense.borrow_mut() = expense;
        *self.show_form.borrow_mut() = true;
        self.notify_subscribers();
    }

    /// Error de la última operación del formulario (validación o backend)
    pub fn set_form_error(&self, error: Option<String>) {
        *self.form_error.borrow_mut() = error;
        self.notify_subscribers();
    }

    pub fn set_category_filter(&self, category: Option<Category>) {
        *self.category_filter.borrow_mut() = category;
    }

    pub fn set_sort(&self, field: SortField, order: SortOrder) {
        *self.sort_by.borrow_mut() = field;
        *self.sort_order.borrow_mut() = order;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
