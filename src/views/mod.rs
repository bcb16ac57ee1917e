pub mod app;
pub mod expense_form;
pub mod expense_list;
pub mod filter_sort_controls;
pub mod offline_indicator;

pub use app::render_app;
pub use expense_form::render_expense_form;
pub use expense_list::render_expense_list;
pub use filter_sort_controls::render_filter_sort_controls;
pub use offline_indicator::render_offline_indicator;
