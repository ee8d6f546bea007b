//! TUI Widget components
//!
//! Modular widgets for the dashboard display.

pub mod banner;
pub mod cards;
pub mod footer;
pub mod help;
pub mod kill_dialog;

pub use banner::render_banner;
pub use cards::render_cards;
pub use footer::render_footer;
pub use help::render_help;
pub use kill_dialog::render_kill_dialog;
