//! CLI commands implementation

pub mod init;
pub mod list;
pub mod maintenance;
pub mod scrape;

pub use init::*;
pub use list::*;
pub use maintenance::*;
pub use scrape::*;
