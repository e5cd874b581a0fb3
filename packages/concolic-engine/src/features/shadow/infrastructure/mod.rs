//! Built-in shadow families and the catalogue that indexes them

mod boxing;
mod builder;
pub mod catalogue;
mod character;
mod executor;
mod math;
mod string;

pub use catalogue::ShadowCatalogue;
