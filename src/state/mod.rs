pub mod app_state;
pub mod expenses_state;

pub use app_state::AppState;
pub use expenses_state::ExpensesState;
