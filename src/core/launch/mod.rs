pub mod arguments;
pub mod classpath;
pub mod command;

pub use classpath::{get_classpath_separator, Classpath};
pub use command::{synthesize, LaunchCommand, LaunchInputs, LaunchOutcome};
