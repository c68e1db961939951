pub mod args;
pub mod validation;

pub use args::CliArgs;
pub use validation::validate;
