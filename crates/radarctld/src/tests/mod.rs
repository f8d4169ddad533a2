//! Test suites for the control service.

mod lib_api;
mod support;
