pub mod collector;

pub use collector::PathConstraintCollector;
