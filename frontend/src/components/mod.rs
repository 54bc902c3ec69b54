pub mod activity_sidebar;
pub mod date_input;
pub mod estimate_card;
pub mod header;
pub mod record_dialog;
pub mod status_badge;

pub use header::Header;
