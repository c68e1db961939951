pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod model;
pub mod normalize;
pub mod output;
pub mod session;
pub mod view;

#[cfg(test)]
mod tests;
