use uuid::Uuid;

use crate::config::KerberosConfig;

/// Spark JVM options for a kerberised cluster, or an empty string
///
/// Options are only produced when keytab, principal and credentials directory are all set. Each
/// call names a fresh credentials file under the credentials directory. The result starts with a
/// space so it can be spliced straight into a command line.
pub fn kerberos_options(kerberos: &KerberosConfig) -> String {
    if !kerberos.is_complete() {
        return String::new();
    }

    let keytab = kerberos.keytab.trim();
    let principal = kerberos.principal.trim();
    let credentials_file = format!(
        "{}/credentials_{}",
        kerberos.credentials_dir.trim().trim_end_matches('/'),
        Uuid::new_v4()
    );

    [
        format!("-Dspark.yarn.keytab={keytab}"),
        format!("-Dspark.yarn.principal={principal}"),
        format!("-Dspark.yarn.credentials.file={credentials_file}"),
        format!("-Dspark.history.kerberos.keytab={keytab}"),
        format!("-Dspark.history.kerberos.principal={principal}"),
        "-Dspark.history.kerberos.enabled=true".to_string(),
    ]
    .iter()
    .fold(String::new(), |options, option| options + " " + option)
}
