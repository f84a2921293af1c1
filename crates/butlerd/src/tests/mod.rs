//! Test suites for the dispatch core.

mod support;
