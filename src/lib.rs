//! Submit a Spark application to YARN through an Apache Knox gateway
//!
//! The gateway proxies both WebHDFS, used to check the job's artifacts, and the ResourceManager
//! REST API, used to register, submit and track the application.

pub mod config;
pub mod error;
/// HTTP access to the gateway
pub mod gateway;
pub mod hdfs;
pub mod orchestrator;
pub mod submission;
pub mod yarn;
