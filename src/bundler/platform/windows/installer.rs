//! Inno Setup installer compilation.

use crate::bundler::{
    builder::tool_detection,
    error::{Error, ErrorExt, Result},
    fileset::MODE_REGULAR,
    layout::PackageLayout,
    settings::Settings,
    utils::fs::move_file,
};
use std::path::{Path, PathBuf};

const SCRIPT: &str = "Setup.iss";
const OUTPUT: &str = "output/output.exe";

/// How the Inno Setup compiler is run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnoSetup {
    compiler: PathBuf,
    wine: Option<PathBuf>,
    script: PathBuf,
    installer_dir: Option<PathBuf>,
    installer_resources: Option<PathBuf>,
}

impl InnoSetup {
    /// Finds the compiler, the script and, off Windows, wine.
    ///
    /// # Errors
    ///
    /// * [`Error::ResourceMissing`] without a readable `resources.inno_script`
    /// * [`Error::ToolUnavailable`] without a compiler, or without wine for a
    ///   Windows compiler on another host
    pub fn locate(settings: &Settings) -> Result<Self> {
        let resources = &settings.bundle_settings().resources;
        let script = match &resources.inno_script {
            Some(script) if script.is_file() => script.clone(),
            Some(script) => {
                return Err(Error::ResourceMissing(format!(
                    "resources.inno_script ({})",
                    script.display()
                )));
            }
            None => return Err(Error::ResourceMissing("resources.inno_script is not set".into())),
        };
        let installer_dir = existing_dir("installer_dir", resources.installer_dir.as_ref())?;
        let installer_resources =
            existing_dir("installer_resources", resources.installer_resources.as_ref())?;

        let compiler = match &resources.inno_compiler {
            Some(compiler) if compiler.is_file() => compiler.clone(),
            Some(compiler) => {
                return Err(Error::ToolUnavailable(format!(
                    "Inno Setup compiler {}",
                    compiler.display()
                )));
            }
            None => tool_detection::ISCC
                .clone()
                .ok_or_else(|| Error::ToolUnavailable("Inno Setup compiler".into()))?,
        };
        let wine = if tool_detection::needs_wine() && is_windows_binary(&compiler) {
            Some(
                tool_detection::WINE
                    .clone()
                    .ok_or_else(|| Error::ToolUnavailable("wine".into()))?,
            )
        } else {
            None
        };

        Ok(Self {
            compiler,
            wine,
            script,
            installer_dir,
            installer_resources,
        })
    }

    /// `/D<Name>=<value>` defines carrying the application identity.
    pub fn defines(settings: &Settings) -> Vec<String> {
        let app = settings.application();
        vec![
            format!("/DApplicationFullName={}", app.full_name()),
            format!("/DApplicationVersion={}", app.version),
            format!("/DApplicationCompany={}", app.company),
            format!("/DApplicationCopyright={}", app.copyright),
            format!("/DApplicationURL={}", app.url),
            format!("/DApplicationUUID={}", app.uuid()),
            format!("/DApplicationName={}", app.name),
        ]
    }

    /// Stages `layout` with the script and extra installer files, compiles
    /// it and moves the installer to `dest`.
    pub async fn compile(self, mut layout: PackageLayout, settings: &Settings, dest: &Path) -> Result<()> {
        layout.insert_file(SCRIPT, &self.script, MODE_REGULAR)?;
        if let Some(dir) = &self.installer_resources {
            layout.insert_tree("", dir)?;
        }
        if let Some(dir) = &self.installer_dir {
            layout.insert_tree("install", dir)?;
        }

        let staging = tempfile::Builder::new()
            .prefix("jvm_bundler-installer-")
            .tempdir()?;
        let root = staging.path().to_path_buf();
        log::info!("Staging installer tree in {}", root.display());
        tokio::task::spawn_blocking(move || layout.materialize(&root))
            .await
            .map_err(|e| Error::GenericError(format!("Staging task panicked: {}", e)))??;

        let mut command = match &self.wine {
            Some(wine) => {
                let mut command = tokio::process::Command::new(wine);
                command.arg(&self.compiler);
                command
            }
            None => tokio::process::Command::new(&self.compiler),
        };
        command
            .args(Self::defines(settings))
            .arg(SCRIPT)
            .current_dir(staging.path());

        log::info!("Running Inno Setup compiler {}", self.compiler.display());
        let output = command.output().await.map_err(|e| Error::CommandFailed {
            command: self.compiler.display().to_string(),
            error: e,
        })?;
        if !output.status.success() {
            log::debug!("iscc stdout: {}", String::from_utf8_lossy(&output.stdout));
            log::debug!("iscc stderr: {}", String::from_utf8_lossy(&output.stderr));
            return Err(Error::ExternalTool {
                tool: "iscc".into(),
                status: output.status.to_string(),
            });
        }

        let built = staging.path().join(OUTPUT);
        if !built.is_file() {
            return Err(Error::ExternalTool {
                tool: "iscc".into(),
                status: format!("no installer written to {}", built.display()),
            });
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating output directory", parent)?;
        }
        move_file(&built, dest).await
    }
}

fn existing_dir(key: &str, dir: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    match dir {
        Some(dir) if !dir.is_dir() => Err(Error::ResourceMissing(format!(
            "resources.{key} ({})",
            dir.display()
        ))),
        other => Ok(other.cloned()),
    }
}

fn is_windows_binary(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
