use serde::Serialize;

use crate::error::SubmitError;
use crate::hdfs::status::FileStatus;
use crate::submission::command::{render_am_command, APP_JAR_LINK, APP_PROPERTIES_LINK, SPARK_JAR_LINK};
use crate::submission::model::{SubmissionModel, SubmissionOptions};

/// YARN's classpath separator, expanded by the NodeManager
const CPS: &str = "<CPS>";

/// Container classpath ahead of the optional LZO jar
static CLASSPATH: &[&str] = &[
    "{{PWD}}",
    "__spark__.jar",
    "{{PWD}}/__app__.jar",
    "{{PWD}}/__app__.properties",
    "{{HADOOP_CONF_DIR}}",
    "/usr/hdp/current/hadoop-client/*",
    "/usr/hdp/current/hadoop-client/lib/*",
    "/usr/hdp/current/hadoop-hdfs-client/*",
    "/usr/hdp/current/hadoop-hdfs-client/lib/*",
    "/usr/hdp/current/hadoop-yarn-client/*",
    "/usr/hdp/current/hadoop-yarn-client/lib/*",
];

/// Smallest ApplicationMaster memory overhead Spark asks YARN for, in MB
const MIN_MEMORY_OVERHEAD: u32 = 384;

/// Body of `POST /ws/v1/cluster/apps`
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationSubmission {
    pub application_id: String,
    pub application_name: String,
    pub application_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    pub max_app_attempts: u32,
    #[serde(rename = "unmanaged-AM")]
    pub unmanaged_am: bool,
    pub keep_containers_across_application_attempts: bool,
    pub resource: Resource,
    pub am_container_spec: ContainerSpec,
}

#[derive(Debug, Serialize)]
pub struct Resource {
    /// MB, heap plus overhead
    pub memory: u32,
    #[serde(rename = "vCores")]
    pub vcores: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerSpec {
    pub local_resources: Entries<LocalResource>,
    pub environment: Entries<String>,
    pub commands: Commands,
}

/// YARN's JSON rendering of a map: `{"entry": [{"key": ..., "value": ...}]}`
#[derive(Debug, Serialize)]
pub struct Entries<T> {
    pub entry: Vec<Entry<T>>,
}

#[derive(Debug, Serialize)]
pub struct Entry<T> {
    pub key: String,
    pub value: T,
}

impl<T> FromIterator<(String, T)> for Entries<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Entries { entry: iter.into_iter().map(|(key, value)| Entry { key, value }).collect() }
    }
}

#[derive(Debug, Serialize)]
pub struct LocalResource {
    pub resource: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub visibility: &'static str,
    pub size: u64,
    /// Must match the file's modification time or the NodeManager refuses to localise it
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct Commands {
    pub command: String,
}

/// A local resource linked into the container's working directory
struct Localised<'a> {
    link: &'static str,
    path: &'a str,
    status: &'a FileStatus,
}

impl Localised<'_> {
    fn resource(&self) -> LocalResource {
        LocalResource {
            resource: self.path.trim().to_string(),
            kind: "FILE",
            visibility: "APPLICATION",
            size: self.status.length,
            timestamp: self.status.modification_time,
        }
    }
}

/// Build the submission document from the model
pub fn build_document(model: &SubmissionModel, options: &SubmissionOptions) -> Result<ApplicationSubmission, SubmitError> {
    model.check_required()?;

    let localised = [
        Localised { link: SPARK_JAR_LINK, path: &model.spark_jar_path, status: &model.spark_jar_status },
        Localised { link: APP_JAR_LINK, path: &model.app_jar_path, status: &model.app_jar_status },
        Localised { link: APP_PROPERTIES_LINK, path: &model.app_properties_path, status: &model.app_properties_status },
    ];

    let local_resources = localised
        .iter()
        .map(|file| (file.link.to_string(), file.resource()))
        .collect();

    let environment = environment(model, &localised).into_iter().collect();

    let memory = model.application_master_memory;
    let overhead = (memory / 10).max(MIN_MEMORY_OVERHEAD);
    let container_memory = memory
        .checked_add(overhead)
        .ok_or_else(|| SubmitError::Template(format!("applicationMasterMemory {memory} is too large")))?;

    Ok(ApplicationSubmission {
        application_id: model.app_id.trim().to_string(),
        application_name: model.app_name.trim().to_string(),
        application_type: "SPARK",
        queue: options.queue.clone(),
        max_app_attempts: options.max_app_attempts,
        unmanaged_am: false,
        keep_containers_across_application_attempts: false,
        resource: Resource { memory: container_memory, vcores: model.application_master_cores },
        am_container_spec: ContainerSpec {
            local_resources,
            environment,
            commands: Commands { command: render_am_command(model)? },
        },
    })
}

/// Render the submission document to the JSON request body
pub fn render(model: &SubmissionModel, options: &SubmissionOptions) -> Result<String, SubmitError> {
    let document = build_document(model, options)?;
    serde_json::to_string_pretty(&document).map_err(|err| SubmitError::Template(err.to_string()))
}

fn environment(model: &SubmissionModel, localised: &[Localised]) -> Vec<(String, String)> {
    let mut classpath: Vec<&str> = CLASSPATH.to_vec();
    let lzo = model.lzo_jar_path.trim();
    if !lzo.is_empty() {
        classpath.push(lzo);
    }

    vec![
        ("JAVA_HOME".to_string(), model.jvm_home.trim().to_string()),
        ("SPARK_YARN_MODE".to_string(), "true".to_string()),
        ("HDP_VERSION".to_string(), model.hdp_version.trim().to_string()),
        ("CLASSPATH".to_string(), classpath.join(CPS)),
        ("SPARK_YARN_CACHE_FILES".to_string(), joined(localised, |file| format!("{}#{}", file.path.trim(), file.link))),
        ("SPARK_YARN_CACHE_FILES_FILE_SIZES".to_string(), joined(localised, |file| file.status.length.to_string())),
        ("SPARK_YARN_CACHE_FILES_TIME_STAMPS".to_string(), joined(localised, |file| file.status.modification_time.to_string())),
        ("SPARK_YARN_CACHE_FILES_VISIBILITIES".to_string(), joined(localised, |_| "APPLICATION".to_string())),
    ]
}

/// One value per localised file, comma separated, in local resource order
fn joined(localised: &[Localised], field: impl Fn(&Localised) -> String) -> String {
    localised.iter().map(field).collect::<Vec<_>>().join(",")
}
