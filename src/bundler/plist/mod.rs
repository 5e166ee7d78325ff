//! Apple property-list generation.
//!
//! Descriptors are built as typed records ([`AppPlist`], [`JrePlist`]),
//! turned into an ordered node tree, and serialized through the `plist`
//! crate by [`write_plist`]. Key order follows a fixed write order per document type
//! so that generated files diff cleanly against previous releases.
//!
//! # Example
//!
//! ```no_run
//! use jvm_bundler::bundler::plist::{JrePlist, PlistDocument, write_pkg_info, write_plist};
//!
//! let xml = write_plist(&PlistDocument::Jre(JrePlist::adoptopenjdk("jdk8u144-b01")))?;
//! assert!(xml.starts_with(b"<?xml"));
//! assert_eq!(write_pkg_info("????"), b"APPL????");
//! # Ok::<(), jvm_bundler::bundler::Error>(())
//! ```

mod app;
mod jre;
mod value;

pub use app::{
    APP_ICON_FILE, AppPlist, BundleDocument, JvmOption, PlistEntry, RUNTIME_BUNDLE,
    TypeDeclaration,
};
pub use jre::JrePlist;
pub use value::{Dict, PlistValue};

use crate::bundler::error::Result;

/// A property-list document ready to serialize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlistDocument {
    /// Application bundle descriptor
    App(AppPlist),
    /// Runtime bundle descriptor
    Jre(JrePlist),
}

impl PlistDocument {
    /// Root dictionary in write order.
    pub fn root(&self) -> Dict {
        match self {
            PlistDocument::App(plist) => plist.to_dict(),
            PlistDocument::Jre(plist) => plist.to_dict(),
        }
    }
}

/// Serializes a document to UTF-8 XML.
pub fn write_plist(document: &PlistDocument) -> Result<Vec<u8>> {
    document.root().to_xml()
}

/// Contents of `Contents/PkgInfo`: `APPL` followed by the bundle signature.
pub fn write_pkg_info(signature: &str) -> Vec<u8> {
    format!("APPL{signature}").into_bytes()
}

/// Bundle-identity block shared by both descriptors.
struct BundleIdentity<'a> {
    name: &'a str,
    display_name: Option<&'a str>,
    identifier: &'a str,
    icon: Option<&'a str>,
    executable_name: &'a str,
    package_type: &'a str,
    short_version: &'a str,
    version: &'a str,
    signature: &'a str,
    copyright: Option<&'a str>,
    minimum_system_version: Option<&'a str>,
}

impl BundleIdentity<'_> {
    fn write(&self, dict: &mut Dict) {
        dict.string("CFBundleDevelopmentRegion", "English")
            .string("CFBundleExecutable", self.executable_name)
            .string_opt("CFBundleIconFile", self.icon)
            .string("CFBundleIdentifier", self.identifier)
            .string_opt("CFBundleDisplayName", self.display_name)
            .string("CFBundleInfoDictionaryVersion", "6.0")
            .string("CFBundleName", self.name)
            .string("CFBundlePackageType", self.package_type)
            .string("CFBundleShortVersionString", self.short_version)
            .string("CFBundleVersion", self.version)
            .string("CFBundleSignature", self.signature)
            .string_opt("NSHumanReadableCopyright", self.copyright)
            .string_opt("LSMinimumSystemVersion", self.minimum_system_version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn full_app_plist() -> AppPlist {
        AppPlist {
            name: "Foo".into(),
            display_name: Some("Foo Game".into()),
            identifier: "com.example.foo".into(),
            icon: Some(APP_ICON_FILE.into()),
            executable_name: "Foo".into(),
            short_version: "1.2".into(),
            version: "1.2.3".into(),
            signature: "????".into(),
            copyright: Some("(c) Example".into()),
            minimum_system_version: Some("10.9".into()),
            application_category: "public.app-category.games".into(),
            hide_dock_icon: true,
            high_resolution_capable: true,
            supports_automatic_graphics_switching: false,
            registered_protocols: vec!["foo".into()],
            runtime: RUNTIME_BUNDLE.into(),
            working_directory_in_library: true,
            main_class_name: "com.example.Main".into(),
            bundle_documents: vec![BundleDocument {
                name: "Foo Save".into(),
                role: "Editor".into(),
                icon: None,
                handler_rank: Some("Owner".into()),
                extensions: Some(vec!["foosave".into()]),
                content_types: None,
                exportable_types: None,
                is_package: false,
            }],
            exported_type_declarations: vec![TypeDeclaration {
                identifier: "com.example.foosave".into(),
                reference_url: None,
                description: Some("Foo save game".into()),
                icon: None,
                conforms_to: vec!["public.data".into()],
                os_types: None,
                mime_types: Some(vec!["application/x-foosave".into()]),
                extensions: Some(vec!["foosave".into()]),
            }],
            imported_type_declarations: vec![TypeDeclaration {
                identifier: "public.png".into(),
                reference_url: None,
                description: None,
                icon: None,
                conforms_to: vec!["public.image".into()],
                os_types: None,
                mime_types: None,
                extensions: None,
            }],
            architectures: vec!["x86_64".into()],
            environment: vec![("FOO_HOME".into(), "/tmp/foo".into())],
            options: vec![
                JvmOption::Bare("-Xmx2048M".into()),
                JvmOption::Keyed {
                    key: "-Dfoo.mode".into(),
                    value: "-Dfoo.mode=release".into(),
                },
                JvmOption::Bare("-XstartOnFirstThread".into()),
            ],
            arguments: vec!["--fullscreen".into()],
            entries: vec![
                PlistEntry {
                    kind: "boolean".into(),
                    key: "FooTelemetry".into(),
                    value: "false".into(),
                },
                PlistEntry {
                    kind: "integer".into(),
                    key: "FooLevel".into(),
                    value: "3".into(),
                },
            ],
        }
    }

    fn parse(bytes: &[u8]) -> plist::Dictionary {
        plist::Value::from_reader_xml(Cursor::new(bytes))
            .unwrap()
            .into_dictionary()
            .unwrap()
    }

    #[test]
    fn app_plist_keys_follow_write_order() {
        let xml = write_plist(&PlistDocument::App(full_app_plist())).unwrap();
        let dict = parse(&xml);
        let keys: Vec<&str> = dict.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "CFBundleDevelopmentRegion",
                "CFBundleExecutable",
                "CFBundleIconFile",
                "CFBundleIdentifier",
                "CFBundleDisplayName",
                "CFBundleInfoDictionaryVersion",
                "CFBundleName",
                "CFBundlePackageType",
                "CFBundleShortVersionString",
                "CFBundleVersion",
                "CFBundleSignature",
                "NSHumanReadableCopyright",
                "LSMinimumSystemVersion",
                "LSApplicationCategoryType",
                "LSUIElement",
                "NSHighResolutionCapable",
                "CFBundleURLTypes",
                "JVMRuntime",
                "WorkingDirectoryInLibrary",
                "JVMMainClassName",
                "CFBundleDocumentTypes",
                "UTExportedTypeDeclarations",
                "UTImportedTypeDeclarations",
                "LSArchitecturePriority",
                "LSEnvironment",
                "JVMOptions",
                "JVMDefaultOptions",
                "JVMArguments",
                "FooTelemetry",
                "FooLevel",
            ]
        );
    }

    #[test]
    fn app_plist_values_round_trip() {
        let xml = write_plist(&PlistDocument::App(full_app_plist())).unwrap();
        let dict = parse(&xml);

        assert_eq!(dict.get("LSUIElement").and_then(|v| v.as_boolean()), Some(true));
        assert_eq!(
            dict.get("FooTelemetry").and_then(|v| v.as_boolean()),
            Some(false)
        );
        assert_eq!(
            dict.get("CFBundlePackageType").and_then(|v| v.as_string()),
            Some("APPL")
        );

        let env = dict.get("LSEnvironment").and_then(|v| v.as_dictionary()).unwrap();
        let env_keys: Vec<&str> = env.keys().map(|k| k.as_str()).collect();
        assert_eq!(env_keys, vec!["LC_CTYPE", "FOO_HOME"]);

        let bare: Vec<&str> = dict
            .get("JVMOptions")
            .and_then(|v| v.as_array())
            .unwrap()
            .iter()
            .filter_map(|v| v.as_string())
            .collect();
        assert_eq!(bare, vec!["-Xmx2048M", "-XstartOnFirstThread"]);

        let keyed = dict
            .get("JVMDefaultOptions")
            .and_then(|v| v.as_dictionary())
            .unwrap();
        assert_eq!(
            keyed.get("-Dfoo.mode").and_then(|v| v.as_string()),
            Some("-Dfoo.mode=release")
        );

        let doc = dict.get("CFBundleDocumentTypes").and_then(|v| v.as_array()).unwrap()[0]
            .as_dictionary()
            .unwrap();
        let doc_keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            doc_keys,
            vec![
                "CFBundleTypeExtensions",
                "LSTypeIsPackage",
                "CFBundleTypeName",
                "CFBundleTypeRole",
                "LSHandlerRank"
            ]
        );
    }

    #[test]
    fn booleans_are_empty_elements() {
        let xml =
            String::from_utf8(write_plist(&PlistDocument::App(full_app_plist())).unwrap()).unwrap();
        assert!(xml.contains("<true/>"));
        assert!(xml.contains("<false/>"));
        assert!(!xml.contains("<boolean>"));
        assert!(xml.contains("<integer>3</integer>"));
    }

    #[test]
    fn optional_sections_are_omitted_when_empty() {
        let mut plist = full_app_plist();
        plist.registered_protocols.clear();
        plist.bundle_documents.clear();
        plist.exported_type_declarations.clear();
        plist.imported_type_declarations.clear();
        plist.hide_dock_icon = false;
        plist.working_directory_in_library = false;

        let dict = parse(&write_plist(&PlistDocument::App(plist)).unwrap());
        assert!(!dict.contains_key("CFBundleURLTypes"));
        assert!(!dict.contains_key("UTExportedTypeDeclarations"));
        assert!(!dict.contains_key("LSUIElement"));
        assert!(!dict.contains_key("WorkingDirectoryInLibrary"));
        assert_eq!(
            dict.get("CFBundleDocumentTypes")
                .and_then(|v| v.as_array())
                .map(|a| a.len()),
            Some(0)
        );
    }

    #[test]
    fn jre_plist_has_bundle_block_and_java_vm() {
        let dict = parse(
            &write_plist(&PlistDocument::Jre(JrePlist::adoptopenjdk("jdk8u144-b01"))).unwrap(),
        );
        let keys: Vec<&str> = dict.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "CFBundleDevelopmentRegion",
                "CFBundleExecutable",
                "CFBundleIdentifier",
                "CFBundleInfoDictionaryVersion",
                "CFBundleName",
                "CFBundlePackageType",
                "CFBundleShortVersionString",
                "CFBundleVersion",
                "CFBundleSignature",
                "JavaVM",
            ]
        );
        assert_eq!(
            dict.get("CFBundlePackageType").and_then(|v| v.as_string()),
            Some("BNDL")
        );
        let vm = dict.get("JavaVM").and_then(|v| v.as_dictionary()).unwrap();
        let vm_keys: Vec<&str> = vm.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            vm_keys,
            vec![
                "JVMMinimumFrameworkVersion",
                "JVMMinimumSystemVersion",
                "JVMPlatformVersion",
                "JVMVendor",
                "JVMVersion"
            ]
        );
        assert_eq!(
            vm.get("JVMVersion").and_then(|v| v.as_string()),
            Some("jdk8u144-b01")
        );
    }

    #[test]
    fn pkg_info_is_eight_bytes() {
        assert_eq!(write_pkg_info("????"), b"APPL????".to_vec());
        assert_eq!(write_pkg_info("FOOG").len(), 8);
    }
}
