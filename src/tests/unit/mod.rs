//! Cross-module unit tests.

mod board_tests;
mod campaign_tests;
mod catalog_tests;
mod search_tests;
