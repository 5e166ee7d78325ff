//! Application bundle descriptor (`Contents/Info.plist`).

use super::{
    BundleIdentity,
    value::{Dict, PlistValue},
};
use crate::bundler::settings::Settings;

/// Icon file name inside `Contents/Resources`.
pub const APP_ICON_FILE: &str = "Icon.icns";

/// Runtime bundle directory name inside `Contents/PlugIns`.
pub const RUNTIME_BUNDLE: &str = "JRE.jre";

/// Document type association (`CFBundleDocumentTypes` entry).
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct BundleDocument {
    /// `CFBundleTypeName`
    pub name: String,
    /// `CFBundleTypeRole`
    #[serde(default = "default_role")]
    pub role: String,
    /// `CFBundleTypeIconFile`
    #[serde(default)]
    pub icon: Option<String>,
    /// `LSHandlerRank`
    #[serde(default)]
    pub handler_rank: Option<String>,
    /// `CFBundleTypeExtensions`, used when `content_types` is unset
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// `LSItemContentTypes`
    #[serde(default)]
    pub content_types: Option<Vec<String>>,
    /// `NSExportableTypes`
    #[serde(default)]
    pub exportable_types: Option<Vec<String>>,
    /// `LSTypeIsPackage`, written alongside `extensions`
    #[serde(default)]
    pub is_package: bool,
}

fn default_role() -> String {
    "Editor".into()
}

/// Uniform type declaration (`UTExportedTypeDeclarations` / `UTImportedTypeDeclarations`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct TypeDeclaration {
    /// `UTTypeIdentifier`
    pub identifier: String,
    /// `UTTypeReferenceURL`
    #[serde(default)]
    pub reference_url: Option<String>,
    /// `UTTypeDescription`
    #[serde(default)]
    pub description: Option<String>,
    /// `UTTypeIconFile`
    #[serde(default)]
    pub icon: Option<String>,
    /// `UTTypeConformsTo`
    #[serde(default = "default_conforms_to")]
    pub conforms_to: Vec<String>,
    /// `com.apple.ostype`
    #[serde(default)]
    pub os_types: Option<Vec<String>>,
    /// `public.mime-type`
    #[serde(default)]
    pub mime_types: Option<Vec<String>>,
    /// `public.filename-extension`
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

fn default_conforms_to() -> Vec<String> {
    vec!["public.data".into()]
}

/// Arbitrary trailing entry. A `boolean` kind is written as `<true/>`/`<false/>`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct PlistEntry {
    /// Element name (`string`, `integer`, `boolean`, ...)
    #[serde(rename = "type", default = "default_entry_kind")]
    pub kind: String,
    /// Dictionary key
    pub key: String,
    /// Text value
    pub value: String,
}

fn default_entry_kind() -> String {
    "string".into()
}

/// A JVM option: bare options go to `JVMOptions`, keyed ones to `JVMDefaultOptions`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JvmOption {
    /// `-Xmx2048M`
    Bare(String),
    /// `key` → `value`
    Keyed {
        /// Option key
        key: String,
        /// Option value
        value: String,
    },
}

/// Application bundle descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppPlist {
    pub name: String,
    pub display_name: Option<String>,
    pub identifier: String,
    pub icon: Option<String>,
    pub executable_name: String,
    pub short_version: String,
    pub version: String,
    pub signature: String,
    pub copyright: Option<String>,
    pub minimum_system_version: Option<String>,
    pub application_category: String,
    pub hide_dock_icon: bool,
    pub high_resolution_capable: bool,
    pub supports_automatic_graphics_switching: bool,
    pub registered_protocols: Vec<String>,
    pub runtime: String,
    pub working_directory_in_library: bool,
    pub main_class_name: String,
    pub bundle_documents: Vec<BundleDocument>,
    pub exported_type_declarations: Vec<TypeDeclaration>,
    pub imported_type_declarations: Vec<TypeDeclaration>,
    pub architectures: Vec<String>,
    pub environment: Vec<(String, String)>,
    pub options: Vec<JvmOption>,
    pub arguments: Vec<String>,
    pub entries: Vec<PlistEntry>,
}

impl AppPlist {
    /// Builds the descriptor for a packaging run.
    pub fn from_settings(settings: &Settings) -> Self {
        let app = settings.application();
        let macos = &settings.bundle_settings().macos;

        let options = macos
            .jvm_options
            .iter()
            .cloned()
            .map(JvmOption::Bare)
            .chain(
                macos
                    .jvm_default_options
                    .iter()
                    .map(|(key, value)| JvmOption::Keyed {
                        key: key.clone(),
                        value: value.clone(),
                    }),
            )
            .collect();

        Self {
            name: app.name.clone(),
            display_name: Some(app.full_name().to_string()),
            identifier: app.identifier().to_string(),
            icon: Some(APP_ICON_FILE.into()),
            executable_name: app.name.clone(),
            short_version: app.version.clone(),
            version: app.version.clone(),
            signature: macos.signature.clone(),
            copyright: (!app.copyright.is_empty()).then(|| app.copyright.clone()),
            minimum_system_version: macos.minimum_system_version.clone(),
            application_category: app.category.macos_category().into(),
            hide_dock_icon: macos.hide_dock_icon,
            high_resolution_capable: macos.high_resolution,
            supports_automatic_graphics_switching: macos.automatic_graphics_switching,
            registered_protocols: macos.protocols.clone(),
            runtime: RUNTIME_BUNDLE.into(),
            working_directory_in_library: app.working_directory_in_library,
            main_class_name: app.main_class.clone(),
            bundle_documents: macos.document_types.clone(),
            exported_type_declarations: macos.exported_types.clone(),
            imported_type_declarations: macos.imported_types.clone(),
            architectures: macos.architectures.clone(),
            environment: macos
                .environment
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            options,
            arguments: macos.jvm_arguments.clone(),
            entries: macos.extra_entries.clone(),
        }
    }

    pub(super) fn to_dict(&self) -> Dict {
        let mut root = Dict::new();
        BundleIdentity {
            name: &self.name,
            display_name: self.display_name.as_deref(),
            identifier: &self.identifier,
            icon: self.icon.as_deref(),
            executable_name: &self.executable_name,
            package_type: "APPL",
            short_version: &self.short_version,
            version: &self.version,
            signature: &self.signature,
            copyright: self.copyright.as_deref(),
            minimum_system_version: self.minimum_system_version.as_deref(),
        }
        .write(&mut root);

        root.string("LSApplicationCategoryType", &self.application_category);
        if self.hide_dock_icon {
            root.bool("LSUIElement", true);
        }
        if self.high_resolution_capable {
            root.bool("NSHighResolutionCapable", true);
        }
        if self.supports_automatic_graphics_switching {
            root.bool("NSSupportsAutomaticGraphicsSwitching", true);
        }

        if !self.registered_protocols.is_empty() {
            let mut url_type = Dict::new();
            url_type
                .string("CFBundleURLName", &self.identifier)
                .insert(
                    "CFBundleURLSchemes",
                    PlistValue::strings(self.registered_protocols.iter().cloned()),
                );
            root.insert(
                "CFBundleURLTypes",
                PlistValue::Array(vec![PlistValue::Dict(url_type)]),
            );
        }

        root.string("JVMRuntime", &self.runtime);
        if self.working_directory_in_library {
            root.bool("WorkingDirectoryInLibrary", true);
        }
        root.string("JVMMainClassName", &self.main_class_name);

        root.insert(
            "CFBundleDocumentTypes",
            PlistValue::Array(
                self.bundle_documents
                    .iter()
                    .map(|doc| PlistValue::Dict(document_dict(doc)))
                    .collect(),
            ),
        );
        if !self.exported_type_declarations.is_empty() {
            root.insert(
                "UTExportedTypeDeclarations",
                type_declarations(&self.exported_type_declarations),
            );
        }
        if !self.imported_type_declarations.is_empty() {
            root.insert(
                "UTImportedTypeDeclarations",
                type_declarations(&self.imported_type_declarations),
            );
        }

        root.insert(
            "LSArchitecturePriority",
            PlistValue::strings(self.architectures.iter().cloned()),
        );

        let mut environment = Dict::new();
        environment.string("LC_CTYPE", "UTF-8");
        for (key, value) in &self.environment {
            environment.string(key, value);
        }
        root.insert("LSEnvironment", PlistValue::Dict(environment));

        let mut bare = Vec::new();
        let mut keyed = Dict::new();
        for option in &self.options {
            match option {
                JvmOption::Bare(value) => bare.push(PlistValue::String(value.clone())),
                JvmOption::Keyed { key, value } => {
                    keyed.string(key, value);
                }
            }
        }
        root.insert("JVMOptions", PlistValue::Array(bare));
        root.insert("JVMDefaultOptions", PlistValue::Dict(keyed));
        root.insert(
            "JVMArguments",
            PlistValue::strings(self.arguments.iter().cloned()),
        );

        for entry in &self.entries {
            let value = if entry.kind == "boolean" {
                PlistValue::Bool(entry.value == "true")
            } else {
                PlistValue::Typed {
                    kind: entry.kind.clone(),
                    value: entry.value.clone(),
                }
            };
            root.insert(&entry.key, value);
        }

        root
    }
}

fn document_dict(doc: &BundleDocument) -> Dict {
    let mut dict = Dict::new();
    if let Some(content_types) = &doc.content_types {
        dict.strings_opt("LSItemContentTypes", Some(content_types));
    } else {
        dict.strings_opt("CFBundleTypeExtensions", doc.extensions.as_deref());
        dict.bool("LSTypeIsPackage", doc.is_package);
    }
    dict.strings_opt("NSExportableTypes", doc.exportable_types.as_deref())
        .string_opt("CFBundleTypeIconFile", doc.icon.as_deref())
        .string("CFBundleTypeName", &doc.name)
        .string("CFBundleTypeRole", &doc.role)
        .string_opt("LSHandlerRank", doc.handler_rank.as_deref());
    dict
}

fn type_declarations(declarations: &[TypeDeclaration]) -> PlistValue {
    PlistValue::Array(
        declarations
            .iter()
            .map(|decl| {
                let mut tags = Dict::new();
                tags.strings_opt("com.apple.ostype", decl.os_types.as_deref())
                    .strings_opt("public.filename-extension", decl.extensions.as_deref())
                    .strings_opt("public.mime-type", decl.mime_types.as_deref());

                let mut dict = Dict::new();
                dict.string("UTTypeIdentifier", &decl.identifier)
                    .string_opt("UTTypeReferenceURL", decl.reference_url.as_deref())
                    .string_opt("UTTypeDescription", decl.description.as_deref())
                    .string_opt("UTTypeIconFile", decl.icon.as_deref())
                    .insert(
                        "UTTypeConformsTo",
                        PlistValue::strings(decl.conforms_to.iter().cloned()),
                    )
                    .insert("UTTypeTagSpecification", PlistValue::Dict(tags));
                PlistValue::Dict(dict)
            })
            .collect(),
    )
}
