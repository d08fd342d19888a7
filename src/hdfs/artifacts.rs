use log::info;

use crate::error::SubmitError;
use crate::gateway::session::Session;
use crate::hdfs::path::HdfsPath;
use crate::hdfs::status::{find_status, FileStatus};

/// Where the three job artifacts live
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Spark assembly jar
    pub spark_jar: HdfsPath,
    pub app_jar: HdfsPath,
    pub app_properties: HdfsPath,
}

/// An artifact path with the status fetched for this run
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub path: HdfsPath,
    pub status: FileStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub spark_jar: Artifact,
    pub app_jar: Artifact,
    pub app_properties: Artifact,
}

/// Look up the three artifacts concurrently
///
/// The lookups are independent. The first failure aborts the batch and drops the lookups still
/// in flight.
pub async fn resolve(session: &Session, paths: &ArtifactPaths) -> Result<Artifacts, SubmitError> {
    let (spark_jar, app_jar, app_properties) = tokio::try_join!(
        locate(session, &paths.spark_jar),
        locate(session, &paths.app_jar),
        locate(session, &paths.app_properties),
    )?;
    info!("All artifacts found");
    Ok(Artifacts { spark_jar, app_jar, app_properties })
}

async fn locate(session: &Session, path: &HdfsPath) -> Result<Artifact, SubmitError> {
    let status = find_status(session, path).await?;
    Ok(Artifact { path: path.clone(), status })
}
