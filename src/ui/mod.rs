//! Ratatui front end: a paginated library, a debounced search screen with
//! inline edit and delete, and an add form.

mod app;
mod debounce;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
