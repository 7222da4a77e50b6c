mod create;
mod destroy;
mod helpers;
mod init;
mod plan;
mod status;

pub use create::execute_create;
pub use destroy::execute_destroy;
pub use init::execute_init;
pub use plan::execute_plan;
pub use status::execute_status;
