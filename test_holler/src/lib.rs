//! System tests for the `holler` crate. The interesting parts live in the
//! `tests` directory.
