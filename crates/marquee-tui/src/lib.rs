// Terminal UI implementation using ratatui

pub mod app;
pub mod approval;
pub mod help_ui;
pub mod runner;
pub mod ui;

pub use app::{App, InputMode, Tab};
pub use approval::{approval_channel, ApprovalHandle, TuiApprover};
pub use runner::{run_tui, TuiContext};
