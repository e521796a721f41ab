/// Tomekeeper - typed client for a TTRPG desktop assistant's backend
///
/// Query façades for the rules catalog, board configuration for campaign
/// progress tracking, campaign/module/session services, and HTML formatting
/// of rules text.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
