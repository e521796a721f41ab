//! Mock helpers
//!
//! Expectation builders over the mockall-generated [`MockGateway`].

#![allow(dead_code)]

use serde_json::Value;

use crate::core::gateway::GatewayError;
pub use crate::core::gateway::MockGateway;

/// Expect `command` exactly `times` times, answering with `response`.
pub fn expect_command(mock: &mut MockGateway, command: &'static str, response: Value, times: usize) {
    mock.expect_invoke()
        .withf(move |c, _| c == command)
        .times(times)
        .returning(move |_, _| Ok(response.clone()));
}

/// Expect `command` any number of times and reject each call.
pub fn expect_failure(mock: &mut MockGateway, command: &'static str, message: &'static str) {
    mock.expect_invoke()
        .withf(move |c, _| c == command)
        .returning(move |c, _| Err(GatewayError::transport(c, message)));
}
