pub mod batch;
pub mod command;
pub mod compose;
pub mod config;
pub mod decision;
pub mod error;
pub mod event;
pub mod formatter;
pub mod graph;
pub mod probe;
pub mod progress;
pub mod runner;
pub mod summary;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_fixtures;
