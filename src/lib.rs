pub mod app;
pub mod audio;
pub mod config;
pub mod driver;
pub mod ingress;
pub mod kernel;
pub mod memory;
pub mod render;
pub mod services;
pub mod skills;

pub use kernel::reactor::Reactor;
