pub mod engine;
pub mod viewer;
