pub mod event;
pub mod sanitize;
pub mod layout;
pub mod normalize;
pub mod config;
pub mod store;
pub mod manager;
pub mod appender;
pub mod layer;

#[cfg(feature = "http")]
pub mod http;

pub mod memory;
