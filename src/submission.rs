//! Build the YARN application submission document for a Spark job
//!
//! The document is derived from a fixed model (application id, static job settings and the
//! artifact statuses) and serialised once. Only the ApplicationMaster launch command, a shell
//! fragment, goes through a text template.

/// The fixed set of values a submission is built from
pub mod model;
/// Spark Kerberos options for long-running jobs
pub mod kerberos;
/// Render the ApplicationMaster launch command with TinyTemplate
pub mod command;
/// The submission document itself
pub mod document;
