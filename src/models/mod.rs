pub mod expense;
pub mod sync;

pub use expense::{Category, Expense, ExpenseId, NewExpense};
pub use sync::PendingChange;
