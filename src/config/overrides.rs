use clap::Args;
use serde::Deserialize;

/// Every job option, as given on the command line, in the environment or in a config file
///
/// All fields are optional here: command line and environment values are layered over the config
/// file with [`layered`], then [`Config::from_overrides`](crate::config::Config::from_overrides)
/// fills in defaults and validates the result.
#[derive(Args, Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigOverrides {
    /// Knox gateway topology URL, e.g. https://knox.server:8443/gateway/default
    #[arg(long, env = "KNOX_URL")]
    pub gateway_url: Option<String>,

    #[arg(long, env = "KNOX_USER")]
    pub username: Option<String>,

    #[arg(long, env = "KNOX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates from the gateway
    #[arg(long)]
    pub insecure: bool,

    /// Timeout for each HTTP request, in seconds [default: 60]
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// YARN application name
    #[arg(long)]
    pub app_name: Option<String>,

    /// HDP stack version, e.g. 2.3.4.0-361
    #[arg(long, env = "HDP_VERSION")]
    pub hdp_version: Option<String>,

    /// JAVA_HOME on the cluster nodes
    #[arg(long)]
    pub jvm_home: Option<String>,

    /// Entry point of the Spark application
    #[arg(long)]
    pub class_name: Option<String>,

    /// Spark assembly jar on HDFS
    #[arg(long)]
    pub spark_jar: Option<String>,

    /// Application jar on HDFS
    #[arg(long)]
    pub app_jar: Option<String>,

    /// Application properties file on HDFS
    #[arg(long)]
    pub app_properties: Option<String>,

    /// Hadoop LZO jar to add to the container classpath
    #[arg(long)]
    pub lzo_jar: Option<String>,

    /// ApplicationMaster heap in MB [default: 8192]
    #[arg(long)]
    pub am_memory: Option<u32>,

    /// ApplicationMaster vCores [default: 1]
    #[arg(long)]
    pub am_cores: Option<u32>,

    /// YARN queue, the cluster default when unset
    #[arg(long)]
    pub queue: Option<String>,

    /// [default: 2]
    #[arg(long)]
    pub max_app_attempts: Option<u32>,

    /// Kerberos keytab, used only together with --principal and --credentials-dir
    #[arg(long)]
    pub keytab: Option<String>,

    #[arg(long)]
    pub principal: Option<String>,

    /// Directory where Spark writes renewed delegation token files
    #[arg(long)]
    pub credentials_dir: Option<String>,

    /// Delay after the first state poll, in milliseconds [default: 1000]
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Longest delay between state polls, in milliseconds [default: 10000]
    #[arg(long)]
    pub poll_max_interval_ms: Option<u64>,

    /// Factor applied to the delay after each poll [default: 1.5]
    #[arg(long)]
    pub poll_backoff: Option<f64>,

    /// Give up after this many polls, 0 for no limit [default: 0]
    #[arg(long)]
    pub poll_max_attempts: Option<u32>,

    /// Give up polling after this many seconds, 0 for no limit [default: 600]
    #[arg(long)]
    pub poll_timeout_secs: Option<u64>,

    /// States that end polling [default: RUNNING,ACCEPTED]
    ///
    /// ACCEPTED only means the scheduler took the application, not that it runs. It is in the
    /// default set to keep the historical behaviour.
    #[arg(long, value_delimiter = ',')]
    pub stop_states: Option<Vec<String>>,

    /// Kill the registered application when a later step fails
    #[arg(long)]
    pub kill_on_failure: bool,
}

macro_rules! layer {
    ($primary:ident, $fallback:ident; $($field:ident),+ $(,)?) => {
        ConfigOverrides {
            $($field: $primary.$field.or($fallback.$field),)+
            insecure: $primary.insecure || $fallback.insecure,
            kill_on_failure: $primary.kill_on_failure || $fallback.kill_on_failure,
        }
    };
}

/// Values set in `primary` win, everything else comes from `fallback`
pub fn layered(primary: ConfigOverrides, fallback: ConfigOverrides) -> ConfigOverrides {
    layer!(primary, fallback;
        gateway_url, username, password, request_timeout_secs,
        app_name, hdp_version, jvm_home, class_name,
        spark_jar, app_jar, app_properties, lzo_jar,
        am_memory, am_cores, queue, max_app_attempts,
        keytab, principal, credentials_dir,
        poll_interval_ms, poll_max_interval_ms, poll_backoff, poll_max_attempts, poll_timeout_secs,
        stop_states,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_values_win() {
        let cli = ConfigOverrides { app_name: Some("cli".to_string()), ..ConfigOverrides::default() };
        let file = ConfigOverrides {
            app_name: Some("file".to_string()),
            queue: Some("etl".to_string()),
            insecure: true,
            ..ConfigOverrides::default()
        };

        let merged = layered(cli, file);

        assert_eq!(merged.app_name.as_deref(), Some("cli"));
        assert_eq!(merged.queue.as_deref(), Some("etl"));
        assert!(merged.insecure);
        assert!(!merged.kill_on_failure);
    }

    #[test]
    fn file_keys_are_kebab_case() {
        let file: ConfigOverrides = serde_json::from_str(
            r#"{"gateway-url":"https://knox:8443/gateway/default","stop-states":["RUNNING"],"am-memory":2048}"#,
        )
        .unwrap();
        assert_eq!(file.gateway_url.as_deref(), Some("https://knox:8443/gateway/default"));
        assert_eq!(file.stop_states, Some(vec!["RUNNING".to_string()]));
        assert_eq!(file.am_memory, Some(2048));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(serde_json::from_str::<ConfigOverrides>(r#"{"gateway":"x"}"#).is_err());
    }
}
