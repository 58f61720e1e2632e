pub mod directory;
pub mod resolver;

pub use directory::{HostTenant, TenantDirectory};
pub use resolver::{TenantResolution, TenantResolver};
