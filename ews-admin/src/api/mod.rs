//! HTTP API handlers for ews-admin

pub mod dashboard;
pub mod dialects;
pub mod groups;
pub mod health;
pub mod history;
pub mod members;
pub mod send;
pub mod settings;
pub mod templates;
pub mod ui;

pub use dashboard::dashboard_routes;
pub use dialects::dialect_routes;
pub use groups::group_routes;
pub use health::health_routes;
pub use history::history_routes;
pub use members::member_routes;
pub use send::send_routes;
pub use settings::settings_routes;
pub use templates::template_routes;
pub use ui::ui_routes;
