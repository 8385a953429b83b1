//! UI layer for the listing manager: app shell, filter bar, entry form, and posting cards.

pub mod app;
pub mod entry_form;
pub mod filter_panel;
pub mod job_card;

pub use app::DesktopGuiApp;
