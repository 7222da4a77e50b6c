// src/lib.rs
pub mod arm;
pub mod cli;
pub mod logging;
pub mod naming;
pub mod params;
pub mod provision;

pub use arm::{ArmClient, ResourceManager};
pub use provision::{build_plan, Plan, ProvisionError, Provisioner, TemplateSource};

// Re-export tracing for use in other modules
pub use tracing;
