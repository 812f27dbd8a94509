pub mod analyses;
pub mod auth;
pub mod feedback;
pub mod health;
pub mod reports;

pub use analyses::{analyze_plant, delete_analysis, get_analysis, list_analyses};
pub use auth::{current_user, login, logout, register};
pub use feedback::{create_feedback, list_feedback};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use reports::{create_report, get_report, list_reports};
