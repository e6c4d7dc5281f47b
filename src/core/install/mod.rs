pub mod libraries;
pub mod session;

pub use libraries::{install_libraries, plan_libraries};
pub use session::{InstallReport, InstallationSession};
