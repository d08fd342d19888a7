use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::error::SubmitError;
use crate::submission::model::SubmissionModel;

/// Name of the Spark application jar in the container's working directory
pub const APP_JAR_LINK: &str = "__app__.jar";
/// Name of the Spark assembly jar in the container's working directory
pub const SPARK_JAR_LINK: &str = "__spark__.jar";
/// Name of the application properties file in the container's working directory
pub const APP_PROPERTIES_LINK: &str = "__app__.properties";

/// Characters that would split or reinterpret an unquoted command line argument
const SHELL_SPECIAL: &[char] = &['\'', '"', '`', '$', '\\', ';', '&', '|', '<', '>', '(', ')', '*', '?', '!'];

/// The value can be spliced into the command line as a single unquoted argument
pub fn is_shell_word(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || SHELL_SPECIAL.contains(&c))
}

/// Rendering context for the ApplicationMaster command
///
/// `{{JAVA_HOME}}` and `{{PWD}}` are YARN expansion markers, passed as values so the template
/// itself stays free of literal braces.
#[derive(Serialize)]
struct CommandContext<'a> {
    java_home: &'static str,
    pwd: &'static str,
    heap_mb: u32,
    hdp_version: &'a str,
    app_name: &'a str,
    kerberos_options: &'a str,
    class_name: &'a str,
    app_jar: &'static str,
    app_properties: &'static str,
}

/// Render the ApplicationMaster launch command using TinyTemplate
pub fn render_am_command(model: &SubmissionModel) -> Result<String, SubmitError> {
    /// included command template
    static AM_COMMAND: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/am_command.txt"));
    let mut tt = TinyTemplate::new();
    // output is a shell command, not HTML
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("am_command", AM_COMMAND)
        .map_err(|err| SubmitError::Template(err.to_string()))?;

    let context = CommandContext {
        java_home: "{{JAVA_HOME}}",
        pwd: "{{PWD}}",
        heap_mb: model.application_master_memory,
        hdp_version: model.hdp_version.trim(),
        app_name: model.app_name.trim(),
        kerberos_options: &model.kerberos_options,
        class_name: model.class_name.trim(),
        app_jar: APP_JAR_LINK,
        app_properties: APP_PROPERTIES_LINK,
    };

    let command = tt
        .render("am_command", &context)
        .map_err(|err| SubmitError::Template(err.to_string()))?;
    Ok(command.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::model::fixtures;

    #[test]
    fn renders_launch_command_without_kerberos() {
        let command = render_am_command(&fixtures::model()).unwrap();
        assert_eq!(
            command,
            "{{JAVA_HOME}}/bin/java -server -Xmx8192m -Dhdp.version=2.3.4.0-361 \
             -Dspark.yarn.app.container.log.dir=<LOG_DIR> -Dspark.app.name='My app' \
             org.apache.spark.deploy.yarn.ApplicationMaster --class com.myapp.MyClass \
             --jar __app__.jar --properties-file {{PWD}}/__app__.properties \
             1><LOG_DIR>/AppMaster.stdout 2><LOG_DIR>/AppMaster.stderr"
        );
    }

    #[test]
    fn shell_words() {
        assert!(is_shell_word("com.myapp.MyClass"));
        assert!(is_shell_word("me@EXAMPLE.COM"));
        assert!(is_shell_word("/etc/security/keytabs/me.keytab"));
        assert!(!is_shell_word("/etc/my keytabs/me.keytab"));
        assert!(!is_shell_word("it's"));
        assert!(!is_shell_word("a;b"));
    }

    #[test]
    fn kerberos_options_are_spliced_after_app_name() {
        let model = SubmissionModel {
            kerberos_options: " -Dspark.yarn.keytab=k -Dspark.yarn.principal=p".to_string(),
            ..fixtures::model()
        };
        let command = render_am_command(&model).unwrap();
        assert!(command.contains(
            "-Dspark.app.name='My app' -Dspark.yarn.keytab=k -Dspark.yarn.principal=p org.apache.spark"
        ));
    }
}
