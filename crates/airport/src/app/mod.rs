mod bootstrap;
mod config;
mod gameplay;
mod loop_runner;
mod story;
mod ui;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
