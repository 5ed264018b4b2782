//! Host-run integration tests for the full service pipeline:
//! raw pin level → debounce → controller → effect application → ports.

mod mock_hw;
mod service_tests;
