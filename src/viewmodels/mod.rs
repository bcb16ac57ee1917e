pub mod expenses_viewmodel;

pub use expenses_viewmodel::ExpensesViewModel;
