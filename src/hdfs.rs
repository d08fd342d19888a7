//! Locate job artifacts on HDFS through the gateway's WebHDFS proxy

/// Paths of artifacts on distributed storage
pub mod path;
/// LISTSTATUS lookups
pub mod status;
/// Concurrent resolution of the three job artifacts
pub mod artifacts;
