pub mod chart;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod gateway;
pub mod pagination;
pub mod runtime;
pub mod search;
pub mod sort;
pub mod sources;
pub mod types;

pub use config::DashboardConfig;
pub use coordinator::{DashboardState, Effect, Intent, LoadStatus};
pub use error::TransportError;
pub use gateway::Gateway;
pub use runtime::Dashboard;
