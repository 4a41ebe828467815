pub mod tcp;

pub use tcp::TcpIngress;
