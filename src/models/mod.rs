pub mod analysis;
pub mod color;
pub mod config;
pub mod region;
pub mod screen;
