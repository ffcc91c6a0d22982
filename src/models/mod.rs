pub mod listener;
pub mod proxy;

pub use listener::*;
pub use proxy::*;
