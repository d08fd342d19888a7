//! Application lifecycle calls against the ResourceManager REST API, proxied by the gateway

/// YARN application states
pub mod state;
/// Register, submit, query and kill applications
pub mod application;
/// Poll an application until it reaches a stop state
pub mod tracker;
