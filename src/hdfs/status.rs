use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::gateway::response::GatewayRequest;
use crate::gateway::session::Session;
use crate::gateway::Step;
use crate::hdfs::path::HdfsPath;

/// WebHDFS `FileStatus` record
///
/// Missing fields read as zero or empty, unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileStatus {
    pub path_suffix: String,
    /// FILE, DIRECTORY or SYMLINK
    #[serde(rename = "type")]
    pub kind: String,
    pub length: u64,
    pub owner: String,
    pub group: String,
    pub permission: String,
    pub access_time: u64,
    /// Milliseconds since the epoch, YARN checks it against the local resource timestamp
    pub modification_time: u64,
    pub block_size: u64,
    pub replication: u32,
}

/// `{"FileStatuses": {"FileStatus": [...]}}`
#[derive(Deserialize)]
struct ListStatus {
    #[serde(rename = "FileStatuses")]
    file_statuses: FileStatuses,
}

#[derive(Deserialize)]
struct FileStatuses {
    #[serde(rename = "FileStatus", default)]
    file_status: Vec<FileStatus>,
}

/// Fetch the status of one path
///
/// Uses LISTSTATUS rather than GETFILESTATUS and keeps the first entry of the listing, which for
/// a file is the file itself.
pub async fn find_status(session: &Session, path: &HdfsPath) -> Result<FileStatus, SubmitError> {
    info!("Finding status of {path}");
    let request = GatewayRequest::get(Step::FindStatus, path.webhdfs()).query("op", "LISTSTATUS");
    let response = session.call(request).await?;
    let listing: ListStatus = response.json()?;

    let status = listing
        .file_statuses
        .file_status
        .into_iter()
        .next()
        .ok_or_else(|| SubmitError::NotFound { path: path.to_string() })?;
    debug!("{path}: {} bytes, modified {}", status.length, status.modification_time);
    Ok(status)
}
