pub mod forwarder;
pub mod metrics;
pub mod providers;

pub use forwarder::HttpForwarder;
