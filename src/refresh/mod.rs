mod coordinator;
mod endpoint;

pub use coordinator::{RefreshCoordinator, RefreshStatus};
pub use endpoint::{HttpRefreshEndpoint, RefreshEndpoint};
