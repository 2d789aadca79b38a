//! State management module
//!
//! This module holds the client-side view state: the stage gate, the
//! check-in and review flows, delayed navigation and the auth shell.

pub mod dialog;
pub mod flow;
pub mod monitor;
pub mod review;
pub mod scheduler;
pub mod session;
pub mod stage;
pub mod storage;

// Re-export commonly used state components
pub use dialog::{alert_text, Action, Notice};
pub use flow::CheckInFlow;
pub use monitor::{MonotonicPolicy, StatusAnomaly, StatusMonitor};
pub use review::CertificateReview;
pub use scheduler::{Navigation, ScheduledNavigation};
pub use session::{AuthShell, AuthState, Session};
pub use stage::{select_stage, Stage, StageInput};
pub use storage::SessionStore;
