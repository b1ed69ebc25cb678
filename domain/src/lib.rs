pub mod checks;
pub mod notification;
pub mod pull_request;

pub use checks::*;
pub use notification::*;
pub use pull_request::*;
