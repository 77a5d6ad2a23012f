pub mod fmt;
pub mod visit;
