//! Test suites for the probe runtime.

mod support;
