//! Business logic services.

pub mod generator;

pub use generator::Generator;
