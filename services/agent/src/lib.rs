pub mod config;
#[cfg(feature = "console")]
pub mod console;
pub mod server;
pub mod worker;
