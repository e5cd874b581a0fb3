pub mod environment;

pub use environment::SymbolicEnvironment;
