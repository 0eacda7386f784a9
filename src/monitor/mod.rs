mod dispatch;
mod enumeration;

pub use dispatch::Dispatcher;
