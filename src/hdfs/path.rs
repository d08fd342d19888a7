use std::fmt;

use url::Url;

/// Prefix of every WebHDFS resource exposed by the gateway
pub const WEBHDFS_PREFIX: &str = "/webhdfs/v1";

/// An artifact location on HDFS
///
/// Accepts absolute paths (`/apps/spark/spark.jar`) and filesystem URIs
/// (`hdfs://nameservice/apps/spark/spark.jar`). The configured form is kept for the YARN local
/// resource, the bare path is what WebHDFS wants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HdfsPath {
    uri: String,
    path: String,
}

impl HdfsPath {
    pub fn parse(raw: &str) -> Result<HdfsPath, String> {
        let raw = raw.trim();
        // YARN reads `#` as the link name of a localised resource
        if let Some(c) = raw.chars().find(|c| RESERVED.contains(c)) {
            return Err(format!("{raw} contains reserved character '{c}'"));
        }
        if raw.starts_with('/') {
            return Ok(HdfsPath { uri: raw.to_string(), path: raw.to_string() });
        }

        Url::parse(raw).map_err(|err| format!("{raw} is neither an absolute path nor a URI: {err}"))?;
        match file_path(raw) {
            None | Some("/") => Err(format!("{raw} has no file path")),
            Some(path) => Ok(HdfsPath { uri: raw.to_string(), path: path.to_string() }),
        }
    }

    /// Path as configured, used as the YARN local resource location
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Absolute path on the filesystem, without scheme or authority
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Gateway-relative WebHDFS resource for this path
    pub fn webhdfs(&self) -> String {
        format!("{WEBHDFS_PREFIX}{}", self.path)
    }
}

const RESERVED: &[char] = &['#', '?'];

/// Path part of a URI as written, without the percent-encoding `Url::path` applies
fn file_path(uri: &str) -> Option<&str> {
    let (_, rest) = uri.split_once(':')?;
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => &authority_and_path[authority_and_path.find('/')?..],
        None => rest,
    };
    path.starts_with('/').then_some(path)
}

impl fmt::Display for HdfsPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_is_used_as_is() {
        let path = HdfsPath::parse("/apps/spark/spark.jar").unwrap();
        assert_eq!(path.uri(), "/apps/spark/spark.jar");
        assert_eq!(path.webhdfs(), "/webhdfs/v1/apps/spark/spark.jar");
    }

    #[test]
    fn authority_is_stripped_from_hdfs_uri() {
        let path = HdfsPath::parse("hdfs://nameservice:8020/user/me/app.jar").unwrap();
        assert_eq!(path.uri(), "hdfs://nameservice:8020/user/me/app.jar");
        assert_eq!(path.path(), "/user/me/app.jar");
        assert_eq!(path.webhdfs(), "/webhdfs/v1/user/me/app.jar");
    }

    #[test]
    fn uri_path_is_kept_as_written() {
        let path = HdfsPath::parse("hdfs://nameservice/user/me/my app.jar").unwrap();
        assert_eq!(path.path(), "/user/me/my app.jar");

        let path = HdfsPath::parse("hdfs:/user/me/app.jar").unwrap();
        assert_eq!(path.path(), "/user/me/app.jar");
    }

    #[test]
    fn fragment_and_query_characters_are_rejected() {
        assert!(HdfsPath::parse("/apps/build#2/app.jar").is_err());
        assert!(HdfsPath::parse("/apps/app.jar?op=DELETE").is_err());
        assert!(HdfsPath::parse("hdfs://nameservice/apps/build#2/app.jar").is_err());
    }

    #[test]
    fn uri_without_file_path_is_rejected() {
        assert!(HdfsPath::parse("hdfs://spark.jar").is_err());
        assert!(HdfsPath::parse("relative/app.jar").is_err());
    }
}
