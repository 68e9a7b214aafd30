mod collector_tests;
mod common;
mod facts_tests;
mod mode_tests;
