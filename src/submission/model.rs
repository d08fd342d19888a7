use crate::config::AppConfig;
use crate::submission::command::is_shell_word;
use crate::error::SubmitError;
use crate::hdfs::artifacts::Artifacts;
use crate::hdfs::status::FileStatus;
use crate::yarn::application::ApplicationId;

/// Everything a submission document is rendered from
///
/// The key set is fixed. `lzo_jar_path` and `kerberos_options` are optional and left blank when
/// unused, every other text key is required.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionModel {
    pub app_id: String,
    pub app_name: String,
    pub hdp_version: String,
    pub jvm_home: String,
    pub spark_jar_status: FileStatus,
    pub spark_jar_path: String,
    pub app_jar_status: FileStatus,
    pub app_jar_path: String,
    pub app_properties_status: FileStatus,
    pub app_properties_path: String,
    pub lzo_jar_path: String,
    pub class_name: String,
    /// MB of heap for the ApplicationMaster
    pub application_master_memory: u32,
    pub application_master_cores: u32,
    pub kerberos_options: String,
}

impl SubmissionModel {
    pub fn new(app_id: &ApplicationId, app: &AppConfig, artifacts: &Artifacts, kerberos_options: String) -> Self {
        SubmissionModel {
            app_id: app_id.to_string(),
            app_name: app.name.clone(),
            hdp_version: app.hdp_version.clone(),
            jvm_home: app.jvm_home.clone(),
            spark_jar_status: artifacts.spark_jar.status.clone(),
            spark_jar_path: artifacts.spark_jar.path.uri().to_string(),
            app_jar_status: artifacts.app_jar.status.clone(),
            app_jar_path: artifacts.app_jar.path.uri().to_string(),
            app_properties_status: artifacts.app_properties.status.clone(),
            app_properties_path: artifacts.app_properties.path.uri().to_string(),
            lzo_jar_path: app.lzo_jar_path.clone().unwrap_or_default(),
            class_name: app.class_name.clone(),
            application_master_memory: app.am_memory,
            application_master_cores: app.am_cores,
            kerberos_options,
        }
    }

    /// Fail on the first blank required key
    pub fn check_required(&self) -> Result<(), SubmitError> {
        let required = [
            ("appId", &self.app_id),
            ("appName", &self.app_name),
            ("hdpVersion", &self.hdp_version),
            ("jvmHome", &self.jvm_home),
            ("sparkJarPath", &self.spark_jar_path),
            ("appJarPath", &self.app_jar_path),
            ("appPropertiesPath", &self.app_properties_path),
            ("className", &self.class_name),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(SubmitError::Template(format!("unresolved key {key}")));
        }
        let unquoted = [("hdpVersion", &self.hdp_version), ("className", &self.class_name)];
        if let Some((key, _)) = unquoted.iter().find(|(_, value)| !is_shell_word(value.trim())) {
            return Err(SubmitError::Template(format!("{key} must be a single shell word")));
        }
        if self.application_master_memory == 0 {
            return Err(SubmitError::Template("applicationMasterMemory must be positive".to_string()));
        }
        if self.application_master_cores == 0 {
            return Err(SubmitError::Template("applicationMasterCores must be positive".to_string()));
        }
        Ok(())
    }
}

/// Submission settings that are not part of the rendered model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub queue: Option<String>,
    pub max_app_attempts: u32,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        SubmissionOptions { queue: None, max_app_attempts: 2 }
    }
}

impl From<&AppConfig> for SubmissionOptions {
    fn from(app: &AppConfig) -> Self {
        SubmissionOptions { queue: app.queue.clone(), max_app_attempts: app.max_app_attempts }
    }
}
