//! Job configuration
//!
//! Options come from command line flags and environment variables, layered over an optional JSON
//! config file. Everything is validated once, up front, into an immutable [`Config`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use url::Url;

use crate::error::ConfigError;
use crate::hdfs::artifacts::ArtifactPaths;
use crate::hdfs::path::HdfsPath;
use crate::submission::command::is_shell_word;
use crate::yarn::state::ApplicationState;
use crate::yarn::tracker::PollPolicy;

/// Command line / environment / file options before validation
pub mod overrides;

use overrides::{layered, ConfigOverrides};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_AM_MEMORY: u32 = 8192;
const DEFAULT_AM_CORES: u32 = 1;
const DEFAULT_MAX_APP_ATTEMPTS: u32 = 2;
/// 1 TiB, far above any YARN maximum allocation
const MAX_AM_MEMORY: u32 = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub request_timeout: Duration,
}

/// Static settings of the Spark application
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub name: String,
    pub hdp_version: String,
    pub jvm_home: String,
    pub class_name: String,
    pub lzo_jar_path: Option<String>,
    /// MB
    pub am_memory: u32,
    pub am_cores: u32,
    pub queue: Option<String>,
    pub max_app_attempts: u32,
}

/// Kerberos settings, only used when all three are non-blank
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KerberosConfig {
    pub keytab: String,
    pub principal: String,
    pub credentials_dir: String,
}

impl KerberosConfig {
    pub fn is_complete(&self) -> bool {
        [&self.keytab, &self.principal, &self.credentials_dir]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    fn is_partial(&self) -> bool {
        !self.is_complete()
            && [&self.keytab, &self.principal, &self.credentials_dir]
                .iter()
                .any(|value| !value.trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub app: AppConfig,
    pub artifacts: ArtifactPaths,
    pub kerberos: KerberosConfig,
    pub poll: PollPolicy,
    /// Kill the registered application if a later step fails
    pub kill_on_failure: bool,
}

impl Config {
    /// Layer command line options over the config file, if any, and validate
    pub fn load(file: Option<&Path>, cli: ConfigOverrides) -> Result<Config, ConfigError> {
        let options = match file {
            Some(path) => layered(cli, read_file(path)?),
            None => cli,
        };
        Config::from_overrides(options)
    }

    pub fn from_overrides(options: ConfigOverrides) -> Result<Config, ConfigError> {
        let gateway = GatewayConfig {
            url: gateway_url(required(options.gateway_url, "gateway-url")?)?,
            username: required(options.username, "username")?,
            password: options.password.ok_or(ConfigError::Missing("password"))?,
            insecure: options.insecure,
            request_timeout: options
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };
        if gateway.insecure {
            warn!("TLS certificate verification is disabled");
        }

        let app = AppConfig {
            name: app_name(required(options.app_name, "app-name")?)?,
            hdp_version: shell_word(required(options.hdp_version, "hdp-version")?, "hdp-version")?,
            jvm_home: required(options.jvm_home, "jvm-home")?,
            class_name: shell_word(required(options.class_name, "class-name")?, "class-name")?,
            lzo_jar_path: non_blank(options.lzo_jar),
            am_memory: am_memory(options.am_memory.unwrap_or(DEFAULT_AM_MEMORY))?,
            am_cores: positive(options.am_cores.unwrap_or(DEFAULT_AM_CORES), "am-cores")?,
            queue: non_blank(options.queue),
            max_app_attempts: positive(
                options.max_app_attempts.unwrap_or(DEFAULT_MAX_APP_ATTEMPTS),
                "max-app-attempts",
            )?,
        };

        let artifacts = ArtifactPaths {
            spark_jar: hdfs_path(required(options.spark_jar, "spark-jar")?, "spark-jar")?,
            app_jar: hdfs_path(required(options.app_jar, "app-jar")?, "app-jar")?,
            app_properties: hdfs_path(required(options.app_properties, "app-properties")?, "app-properties")?,
        };

        let kerberos = KerberosConfig {
            keytab: optional_shell_word(options.keytab, "keytab")?,
            principal: optional_shell_word(options.principal, "principal")?,
            credentials_dir: optional_shell_word(options.credentials_dir, "credentials-dir")?,
        };
        if kerberos.is_partial() {
            warn!("Kerberos options need --keytab, --principal and --credentials-dir, ignoring them");
        }

        let poll = poll_policy(
            options.poll_interval_ms,
            options.poll_max_interval_ms,
            options.poll_backoff,
            options.poll_max_attempts,
            options.poll_timeout_secs,
            options.stop_states,
        )?;

        Ok(Config { gateway, app, artifacts, kerberos, poll, kill_on_failure: options.kill_on_failure })
    }
}

fn read_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
    info!("Reading config file {}", path.display());
    let display = path.display().to_string();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: display.clone(), source })?;
    serde_json::from_str(&json).map_err(|source| ConfigError::Parse { path: display, source })
}

fn required(value: Option<String>, option: &'static str) -> Result<String, ConfigError> {
    non_blank(value).ok_or(ConfigError::Missing(option))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn positive(value: u32, option: &'static str) -> Result<u32, ConfigError> {
    match value {
        0 => Err(ConfigError::Invalid { option, reason: "must be positive".to_string() }),
        _ => Ok(value),
    }
}

fn am_memory(value: u32) -> Result<u32, ConfigError> {
    let value = positive(value, "am-memory")?;
    if value > MAX_AM_MEMORY {
        return Err(ConfigError::Invalid {
            option: "am-memory",
            reason: format!("must be at most {MAX_AM_MEMORY} MB"),
        });
    }
    Ok(value)
}

/// Values spliced unquoted into the ApplicationMaster command line
fn shell_word(value: String, option: &'static str) -> Result<String, ConfigError> {
    if !is_shell_word(&value) {
        return Err(ConfigError::Invalid {
            option,
            reason: "must not contain whitespace, quotes or shell metacharacters".to_string(),
        });
    }
    Ok(value)
}

fn optional_shell_word(value: Option<String>, option: &'static str) -> Result<String, ConfigError> {
    match non_blank(value) {
        Some(value) => shell_word(value, option),
        None => Ok(String::new()),
    }
}

fn gateway_url(raw: String) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { option: "gateway-url", reason };
    let url = Url::parse(&raw).map_err(|err| invalid(format!("{raw}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!("unsupported scheme {scheme}"))),
    }
}

/// The name is single-quoted in the ApplicationMaster command line
fn app_name(name: String) -> Result<String, ConfigError> {
    if name.contains('\'') {
        return Err(ConfigError::Invalid { option: "app-name", reason: "must not contain single quotes".to_string() });
    }
    Ok(name)
}

fn hdfs_path(raw: String, option: &'static str) -> Result<HdfsPath, ConfigError> {
    HdfsPath::parse(&raw).map_err(|reason| ConfigError::Invalid { option, reason })
}

fn poll_policy(
    interval_ms: Option<u64>,
    max_interval_ms: Option<u64>,
    backoff: Option<f64>,
    max_attempts: Option<u32>,
    timeout_secs: Option<u64>,
    stop_states: Option<Vec<String>>,
) -> Result<PollPolicy, ConfigError> {
    let defaults = PollPolicy::default();
    let invalid = |option: &'static str, reason: &str| ConfigError::Invalid { option, reason: reason.to_string() };

    let interval = interval_ms.map(Duration::from_millis).unwrap_or(defaults.interval);
    let max_interval = max_interval_ms.map(Duration::from_millis).unwrap_or(defaults.max_interval).max(interval);

    let backoff_multiplier = backoff.unwrap_or(defaults.backoff_multiplier);
    if !backoff_multiplier.is_finite() || backoff_multiplier < 1.0 {
        return Err(invalid("poll-backoff", "must be at least 1.0"));
    }

    let max_attempts = max_attempts.unwrap_or(defaults.max_attempts);
    let timeout = match timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => defaults.timeout,
    };
    if max_attempts == 0 && timeout.is_none() {
        return Err(invalid("poll-timeout-secs", "polling needs --poll-max-attempts or --poll-timeout-secs"));
    }

    let stop_states = match stop_states {
        Some(names) => names
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse::<ApplicationState>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| ConfigError::Invalid { option: "stop-states", reason })?,
        None => defaults.stop_states,
    };
    if stop_states.is_empty() {
        return Err(invalid("stop-states", "at least one state is needed"));
    }

    Ok(PollPolicy { stop_states, interval, max_interval, backoff_multiplier, max_attempts, timeout })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn minimal() -> ConfigOverrides {
        ConfigOverrides {
            gateway_url: Some("https://knox.server:8443/gateway/default".to_string()),
            username: Some("guest".to_string()),
            password: Some("guest-password".to_string()),
            app_name: Some("My app".to_string()),
            hdp_version: Some("2.3.4.0-361".to_string()),
            jvm_home: Some("/usr/jdk64/jdk1.8.0_60/".to_string()),
            class_name: Some("com.myapp.MyClass".to_string()),
            spark_jar: Some("hdfs://nn/apps/spark.jar".to_string()),
            app_jar: Some("/apps/app.jar".to_string()),
            app_properties: Some("/apps/app.properties".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn minimal_options_get_defaults() {
        let config = Config::from_overrides(minimal()).unwrap();

        assert_eq!(config.gateway.url.as_str(), "https://knox.server:8443/gateway/default");
        assert_eq!(config.gateway.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.app.am_memory, 8192);
        assert_eq!(config.app.am_cores, 1);
        assert_eq!(config.app.max_app_attempts, 2);
        assert_eq!(config.app.lzo_jar_path, None);
        assert_eq!(config.artifacts.spark_jar.path(), "/apps/spark.jar");
        assert!(!config.kerberos.is_complete());
        assert_eq!(config.poll, PollPolicy::default());
        assert!(!config.kill_on_failure);
    }

    #[test]
    fn missing_required_option_is_named() {
        let options = ConfigOverrides { class_name: Some("  ".to_string()), ..minimal() };
        let err = Config::from_overrides(options).err().unwrap();
        assert_eq!(err.to_string(), "missing required option --class-name");
    }

    #[test]
    fn gateway_url_must_be_http() {
        let options = ConfigOverrides { gateway_url: Some("ftp://knox/gateway".to_string()), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "gateway-url", .. })
        ));
    }

    #[test]
    fn artifact_paths_are_checked() {
        let options = ConfigOverrides { app_jar: Some("hdfs://app.jar".to_string()), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "app-jar", .. })
        ));
    }

    #[test]
    fn app_name_with_quote_is_rejected() {
        let options = ConfigOverrides { app_name: Some("it's mine".to_string()), ..minimal() };
        assert!(Config::from_overrides(options).is_err());
    }

    #[test]
    fn huge_am_memory_is_rejected() {
        let options = ConfigOverrides { am_memory: Some(4_000_000_000), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "am-memory", .. })
        ));

        let options = ConfigOverrides { am_memory: Some(MAX_AM_MEMORY), ..minimal() };
        assert_eq!(Config::from_overrides(options).unwrap().app.am_memory, MAX_AM_MEMORY);
    }

    #[test]
    fn kerberos_values_with_whitespace_are_rejected() {
        let options = ConfigOverrides {
            keytab: Some("/etc/my keytabs/me.keytab".to_string()),
            principal: Some("me@EXAMPLE.COM".to_string()),
            credentials_dir: Some("/cred/".to_string()),
            ..minimal()
        };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "keytab", .. })
        ));

        let options = ConfigOverrides { principal: Some("me\"@EXAMPLE.COM".to_string()), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "principal", .. })
        ));
    }

    #[test]
    fn command_line_values_must_be_single_words() {
        let options = ConfigOverrides { class_name: Some("com.myapp.MyClass extra".to_string()), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "class-name", .. })
        ));

        let options = ConfigOverrides { hdp_version: Some("2.3;rm -rf".to_string()), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "hdp-version", .. })
        ));
    }

    #[test]
    fn kerberos_values_are_trimmed() {
        let options = ConfigOverrides {
            keytab: Some(" /etc/me.keytab ".to_string()),
            principal: Some("me@EXAMPLE.COM".to_string()),
            credentials_dir: Some("/cred/".to_string()),
            ..minimal()
        };
        let config = Config::from_overrides(options).unwrap();
        assert_eq!(config.kerberos.keytab, "/etc/me.keytab");
        assert!(config.kerberos.is_complete());
    }

    #[test]
    fn stop_states_are_parsed() {
        let options = ConfigOverrides { stop_states: Some(vec!["running".to_string()]), ..minimal() };
        let config = Config::from_overrides(options).unwrap();
        assert_eq!(config.poll.stop_states, vec![ApplicationState::Running]);

        let options = ConfigOverrides { stop_states: Some(vec!["STARTED".to_string()]), ..minimal() };
        assert!(matches!(
            Config::from_overrides(options),
            Err(ConfigError::Invalid { option: "stop-states", .. })
        ));
    }

    #[test]
    fn unbounded_polling_is_rejected() {
        let options = ConfigOverrides { poll_timeout_secs: Some(0), poll_max_attempts: Some(0), ..minimal() };
        assert!(Config::from_overrides(options).is_err());

        let options = ConfigOverrides { poll_timeout_secs: Some(0), poll_max_attempts: Some(30), ..minimal() };
        let config = Config::from_overrides(options).unwrap();
        assert_eq!(config.poll.timeout, None);
        assert_eq!(config.poll.max_attempts, 30);
    }

    #[test]
    fn backoff_below_one_is_rejected() {
        let options = ConfigOverrides { poll_backoff: Some(0.5), ..minimal() };
        assert!(Config::from_overrides(options).is_err());
    }

    #[test]
    fn command_line_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gateway-url":"https://file:8443/gateway/default","username":"file-user","password":"secret",
                "app-name":"from file","hdp-version":"2.6.5.0-292","jvm-home":"/usr/java",
                "class-name":"com.file.Main","spark-jar":"/apps/spark.jar","app-jar":"/apps/app.jar",
                "app-properties":"/apps/app.properties","queue":"etl","kill-on-failure":true}}"#
        )
        .unwrap();
        let cli = ConfigOverrides { app_name: Some("from cli".to_string()), ..ConfigOverrides::default() };

        let config = Config::load(Some(file.path()), cli).unwrap();

        assert_eq!(config.app.name, "from cli");
        assert_eq!(config.app.class_name, "com.file.Main");
        assert_eq!(config.app.queue.as_deref(), Some("etl"));
        assert_eq!(config.gateway.username, "file-user");
        assert!(config.kill_on_failure);
    }

    #[test]
    fn unreadable_config_file() {
        let err = Config::load(Some(Path::new("/does/not/exist.json")), minimal()).err().unwrap();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
