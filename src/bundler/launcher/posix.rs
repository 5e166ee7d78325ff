//! POSIX shell launcher.

use crate::bundler::{
    error::{Error, Result},
    settings::Settings,
};
use handlebars::Handlebars;
use serde::Serialize;

const SCRIPT_TEMPLATE: &str = "#!/bin/bash
{{#if working_directory_in_library}}runtime=~/.{{exec_name}}
mkdir -p \"$runtime\"
cd \"$runtime\"
{{/if}}export CLASSPATH=\"{{lib_path}}/*\"
exec -a {{exec_name}} java -Djava.library.path={{lib_path}} {{main_class}} \"$@\"
";

/// Shell script starting the application with the system `java`.
///
/// `exec -a` renames the process so it shows up under the application's
/// name instead of `java`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PosixLauncher {
    /// Process name and per-user directory name.
    pub exec_name: String,
    /// Directory holding the jars and native libraries.
    pub lib_path: String,
    /// Fully qualified main class.
    pub main_class: String,
    /// Whether to run from `~/.<exec_name>`.
    pub working_directory_in_library: bool,
}

impl PosixLauncher {
    /// Launcher for the Linux install layout.
    pub fn from_settings(settings: &Settings) -> Self {
        let app = settings.application();
        let exec_name = app.exec_name();
        Self {
            lib_path: settings.bundle_settings().linux.lib_path(&exec_name),
            exec_name,
            main_class: app.main_class.clone(),
            working_directory_in_library: app.working_directory_in_library,
        }
    }

    /// Renders the script.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the executable name, library path or main
    /// class is empty.
    pub fn generate(&self) -> Result<String> {
        for (field, value) in [
            ("executable name", &self.exec_name),
            ("library path", &self.lib_path),
            ("main class", &self.main_class),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "launcher script: {field} is not set"
                )));
            }
        }

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string("launcher", SCRIPT_TEMPLATE)?;
        Ok(handlebars.render("launcher", self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher(working_directory_in_library: bool) -> PosixLauncher {
        PosixLauncher {
            exec_name: "game".into(),
            lib_path: "/usr/share/java/game".into(),
            main_class: "com.example.Main".into(),
            working_directory_in_library,
        }
    }

    #[test]
    fn relocates_into_per_user_directory() {
        let script = launcher(true).generate().unwrap();
        assert_eq!(
            script,
            "#!/bin/bash\n\
             runtime=~/.game\n\
             mkdir -p \"$runtime\"\n\
             cd \"$runtime\"\n\
             export CLASSPATH=\"/usr/share/java/game/*\"\n\
             exec -a game java -Djava.library.path=/usr/share/java/game com.example.Main \"$@\"\n"
        );

        let shebang = script.find("#!/bin/bash").unwrap();
        let mkdir = script.find("mkdir -p \"$runtime\"").unwrap();
        let classpath = script.find("export CLASSPATH").unwrap();
        assert!(shebang < mkdir && mkdir < classpath);
        assert!(script.trim_end().ends_with("\"$@\""));
    }

    #[test]
    fn stays_in_place_by_default() {
        let script = launcher(false).generate().unwrap();
        assert!(!script.contains("runtime="));
        assert!(script.starts_with("#!/bin/bash\nexport CLASSPATH="));
    }

    #[test]
    fn empty_main_class_fails_fast() {
        let mut launcher = launcher(false);
        launcher.main_class.clear();
        assert!(launcher.generate().unwrap_err().is_fatal());
    }
}
