pub mod gateway;
pub mod logging;

pub mod catalog;
pub mod search;

pub mod boards;
pub mod campaign;

pub mod formatters;
