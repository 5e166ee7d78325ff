//! Windows executable wrappers built with launch4j.
//!
//! [`Launch4jConfigBuilder`] collects field operations in order and
//! [`build`](Launch4jConfigBuilder::build) folds them into a validated
//! [`Launch4jConfig`]. Nothing is rendered until the configuration is
//! complete.

use crate::bundler::{
    builder::tool_detection,
    error::{Error, ErrorExt, Result},
    settings::Settings,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Application manifest embedded when the build supplies none.
pub const DEFAULT_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<assembly xmlns="urn:schemas-microsoft-com:asm.v1" manifestVersion="1.0">
  <trustInfo xmlns="urn:schemas-microsoft-com:asm.v3">
    <security>
      <requestedPrivileges>
        <requestedExecutionLevel level="asInvoker" uiAccess="false"/>
      </requestedPrivileges>
    </security>
  </trustInfo>
  <application xmlns="urn:schemas-microsoft-com:asm.v3">
    <windowsSettings>
      <dpiAware xmlns="http://schemas.microsoft.com/SMI/2005/WindowsSettings">true</dpiAware>
    </windowsSettings>
  </application>
</assembly>
"#;

/// Executable subsystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HeaderType {
    /// Windowed application, `<name>.exe`
    Gui,
    /// Console application, `<name>Cmd.exe`
    Console,
}

impl HeaderType {
    /// Value of the `headerType` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderType::Gui => "gui",
            HeaderType::Console => "console",
        }
    }

    /// Executable file name for an application.
    pub fn exe_name(&self, name: &str) -> String {
        match self {
            HeaderType::Gui => format!("{name}.exe"),
            HeaderType::Console => format!("{name}Cmd.exe"),
        }
    }

    /// Both variants, in output order.
    pub fn all() -> [HeaderType; 2] {
        [HeaderType::Gui, HeaderType::Console]
    }
}

/// Win32 version-resource fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// Application version, e.g. "1.2.3".
    pub version: String,
    /// Product and description name.
    pub product_name: String,
    /// Company name.
    pub company: String,
    /// Copyright notice.
    pub copyright: String,
}

#[derive(Clone, Debug)]
enum Op {
    HeaderType(HeaderType),
    Outfile(PathBuf),
    Icon(PathBuf),
    Manifest(PathBuf),
    MainClass(String),
    InitialHeap(u32),
    MaxHeap(u32),
    Opt(String),
    VersionInfo(VersionInfo),
}

/// Ordered collection of configuration operations.
#[derive(Clone, Debug, Default)]
pub struct Launch4jConfigBuilder {
    ops: Vec<Op>,
}

impl Launch4jConfigBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloads the application identity, heap bounds and JVM options.
    pub fn from_settings(settings: &Settings) -> Self {
        let app = settings.application();
        let windows = &settings.bundle_settings().windows;
        let mut builder = Self::new()
            .main_class(&app.main_class)
            .initial_heap_mb(windows.initial_heap_mb)
            .max_heap_mb(windows.max_heap_mb)
            .version_info(VersionInfo {
                version: app.version.clone(),
                product_name: app.full_name().to_string(),
                company: app.company.clone(),
                copyright: app.copyright.clone(),
            });
        if app.working_directory_in_library {
            builder = builder.opt(format!("-Duser.dir=\"%APPDATA%\\{}\"", app.full_name()));
        }
        builder.opt("-Djava.library.path=\"%EXEDIR%\"")
    }

    fn push(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    /// `gui` or `console`.
    pub fn header_type(self, header_type: HeaderType) -> Self {
        self.push(Op::HeaderType(header_type))
    }

    /// Executable to produce.
    pub fn outfile(self, path: impl Into<PathBuf>) -> Self {
        self.push(Op::Outfile(path.into()))
    }

    /// `.ico` to embed.
    pub fn icon(self, path: impl Into<PathBuf>) -> Self {
        self.push(Op::Icon(path.into()))
    }

    /// Application manifest to embed.
    pub fn manifest(self, path: impl Into<PathBuf>) -> Self {
        self.push(Op::Manifest(path.into()))
    }

    /// Fully qualified main class.
    pub fn main_class(self, main_class: impl Into<String>) -> Self {
        self.push(Op::MainClass(main_class.into()))
    }

    /// Initial heap in MB.
    pub fn initial_heap_mb(self, mb: u32) -> Self {
        self.push(Op::InitialHeap(mb))
    }

    /// Maximum heap in MB.
    pub fn max_heap_mb(self, mb: u32) -> Self {
        self.push(Op::MaxHeap(mb))
    }

    /// Appends a JVM option.
    pub fn opt(self, option: impl Into<String>) -> Self {
        self.push(Op::Opt(option.into()))
    }

    /// Version-resource fields.
    pub fn version_info(self, info: VersionInfo) -> Self {
        self.push(Op::VersionInfo(info))
    }

    /// Folds the operations and checks required fields.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the main class, output path, heap
    /// bounds, icon or manifest are missing, or the heap bounds are inverted.
    pub fn build(&self) -> Result<Launch4jConfig> {
        let mut header_type = HeaderType::Gui;
        let mut outfile = None;
        let mut icon = None;
        let mut manifest = None;
        let mut main_class = None;
        let mut initial_heap_mb = None;
        let mut max_heap_mb = None;
        let mut opts = Vec::new();
        let mut version_info = VersionInfo::default();

        for op in &self.ops {
            match op {
                Op::HeaderType(h) => header_type = *h,
                Op::Outfile(p) => outfile = Some(p.clone()),
                Op::Icon(p) => icon = Some(p.clone()),
                Op::Manifest(p) => manifest = Some(p.clone()),
                Op::MainClass(c) if !c.trim().is_empty() => main_class = Some(c.clone()),
                Op::MainClass(_) => main_class = None,
                Op::InitialHeap(mb) => initial_heap_mb = Some(*mb),
                Op::MaxHeap(mb) => max_heap_mb = Some(*mb),
                Op::Opt(o) => opts.push(o.clone()),
                Op::VersionInfo(v) => version_info = v.clone(),
            }
        }

        let missing = |field: &str| Error::Configuration(format!("launch4j: {field} is not set"));
        let initial_heap_mb = initial_heap_mb.ok_or_else(|| missing("initial heap size"))?;
        let max_heap_mb = max_heap_mb.ok_or_else(|| missing("maximum heap size"))?;
        if initial_heap_mb > max_heap_mb {
            return Err(Error::Configuration(format!(
                "launch4j: initial heap {initial_heap_mb}MB exceeds maximum {max_heap_mb}MB"
            )));
        }

        Ok(Launch4jConfig {
            header_type,
            outfile: outfile.ok_or_else(|| missing("output path"))?,
            icon: icon.ok_or_else(|| missing("icon"))?,
            manifest: manifest.ok_or_else(|| missing("manifest"))?,
            main_class: main_class.ok_or_else(|| missing("main class"))?,
            initial_heap_mb,
            max_heap_mb,
            opts,
            version_info,
        })
    }
}

/// A complete wrapper configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Launch4jConfig {
    header_type: HeaderType,
    outfile: PathBuf,
    icon: PathBuf,
    manifest: PathBuf,
    main_class: String,
    initial_heap_mb: u32,
    max_heap_mb: u32,
    opts: Vec<String>,
    version_info: VersionInfo,
}

impl Launch4jConfig {
    /// Starts a builder.
    pub fn builder() -> Launch4jConfigBuilder {
        Launch4jConfigBuilder::new()
    }

    /// Executable produced by [`generate`](Self::generate).
    pub fn outfile(&self) -> &Path {
        &self.outfile
    }

    /// Renders the `launch4jConfig` document.
    pub fn render(&self) -> Result<String> {
        Ok(serde_xml_rs::to_string(&self.document())?)
    }

    fn document(&self) -> Document<'_> {
        let version = self.version_info.version.as_str();
        let win_version = format!("{version}.0");
        let product_name = self.version_info.product_name.as_str();
        Document {
            dont_wrap_jar: true,
            header_type: self.header_type.as_str(),
            outfile: self.outfile.display().to_string(),
            icon: self.icon.display().to_string(),
            manifest: self.manifest.display().to_string(),
            class_path: ClassPath {
                main_class: &self.main_class,
                cp: "%EXEDIR%\\lib\\*",
            },
            jre: Jre {
                path: "%EXEDIR%\\jre",
                initial_heap_size: self.initial_heap_mb,
                max_heap_size: self.max_heap_mb,
                opt: &self.opts,
            },
            version_info: VersionInfoElement {
                file_version: win_version.clone(),
                txt_file_version: version,
                file_description: product_name,
                copyright: &self.version_info.copyright,
                product_version: win_version,
                txt_product_version: version,
                product_name,
                company_name: &self.version_info.company,
                internal_name: product_name,
                original_filename: self
                    .outfile
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
        }
    }

    /// Writes the configuration into `scratch` and runs launch4j on it.
    ///
    /// # Errors
    ///
    /// * [`Error::ToolUnavailable`] if launch4j (or java for the jar) is missing
    /// * [`Error::ExternalTool`] if launch4j exits unsuccessfully
    pub async fn generate(&self, tool: &Launch4jTool, scratch: &Path) -> Result<PathBuf> {
        let config_path = scratch.join(format!("launch4j-{}.xml", self.header_type.as_str()));
        tokio::fs::write(&config_path, self.render()?)
            .await
            .fs_context("writing launch4j configuration", &config_path)?;
        if let Some(parent) = self.outfile.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating executable directory", parent)?;
        }

        log::info!("Wrapping {}", self.outfile.display());
        let mut command = tool.command();
        command.arg(&config_path);
        let output = command.output().await.map_err(|e| Error::CommandFailed {
            command: "launch4j".into(),
            error: e,
        })?;

        if !output.status.success() {
            log::debug!(
                "launch4j stderr: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(Error::ExternalTool {
                tool: "launch4j".into(),
                status: output.status.to_string(),
            });
        }
        if !self.outfile.is_file() {
            return Err(Error::ExternalTool {
                tool: "launch4j".into(),
                status: format!("no executable written to {}", self.outfile.display()),
            });
        }
        Ok(self.outfile.clone())
    }
}

#[derive(Serialize)]
#[serde(rename = "launch4jConfig", rename_all = "camelCase")]
struct Document<'a> {
    dont_wrap_jar: bool,
    header_type: &'a str,
    outfile: String,
    icon: String,
    manifest: String,
    class_path: ClassPath<'a>,
    jre: Jre<'a>,
    version_info: VersionInfoElement<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassPath<'a> {
    main_class: &'a str,
    cp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Jre<'a> {
    path: &'a str,
    initial_heap_size: u32,
    max_heap_size: u32,
    opt: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfoElement<'a> {
    file_version: String,
    txt_file_version: &'a str,
    file_description: &'a str,
    copyright: &'a str,
    product_version: String,
    txt_product_version: &'a str,
    product_name: &'a str,
    company_name: &'a str,
    internal_name: &'a str,
    original_filename: String,
}

/// How launch4j is invoked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Launch4jTool {
    /// `java -jar launch4j.jar <config>`
    Jar {
        /// java executable
        java: PathBuf,
        /// launch4j.jar
        jar: PathBuf,
    },
    /// `launch4j <config>`
    Binary(PathBuf),
}

impl Launch4jTool {
    /// Picks the configured jar or the `launch4j` found on `PATH`.
    pub fn locate(jar: Option<&Path>) -> Result<Self> {
        match jar {
            Some(jar) => {
                if !jar.is_file() {
                    return Err(Error::ResourceMissing(format!(
                        "launch4j jar {}",
                        jar.display()
                    )));
                }
                let java = tool_detection::JAVA
                    .clone()
                    .ok_or_else(|| Error::ToolUnavailable("java".into()))?;
                Ok(Launch4jTool::Jar {
                    java,
                    jar: jar.to_path_buf(),
                })
            }
            None => tool_detection::LAUNCH4J
                .clone()
                .map(Launch4jTool::Binary)
                .ok_or_else(|| Error::ToolUnavailable("launch4j".into())),
        }
    }

    fn command(&self) -> tokio::process::Command {
        match self {
            Launch4jTool::Jar { java, jar } => {
                let mut command = tokio::process::Command::new(java);
                command.arg("-jar").arg(jar);
                command
            }
            Launch4jTool::Binary(path) => tokio::process::Command::new(path),
        }
    }
}
