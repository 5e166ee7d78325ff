//! Runtime bundle descriptor (`PlugIns/JRE.jre/Contents/Info.plist`).

use super::{
    BundleIdentity,
    value::{Dict, PlistValue},
};

/// Descriptor of the embedded runtime bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JrePlist {
    pub name: String,
    pub identifier: String,
    pub executable_name: String,
    pub short_version: String,
    pub version: String,
    pub signature: String,
    pub minimum_system_version: Option<String>,
    pub jvm_minimum_framework_version: String,
    pub jvm_minimum_system_version: String,
    pub jvm_platform_version: String,
    pub jvm_vendor: String,
    pub jvm_version: String,
}

impl JrePlist {
    /// Descriptor for an OpenJDK 8 runtime built from `version`.
    pub fn adoptopenjdk(version: &str) -> Self {
        Self {
            name: "OpenJDK JRE 8".into(),
            identifier: format!("com.github.AdoptOpenJDK.{version}.jre"),
            executable_name: "libjli.dylib".into(),
            short_version: "1.8.0".into(),
            version: version.into(),
            signature: "????".into(),
            minimum_system_version: None,
            jvm_minimum_framework_version: "13.2.9".into(),
            jvm_minimum_system_version: "10.6.0".into(),
            jvm_platform_version: "1.8".into(),
            jvm_vendor: "OpenJDK".into(),
            jvm_version: version.into(),
        }
    }

    pub(super) fn to_dict(&self) -> Dict {
        let mut root = Dict::new();
        BundleIdentity {
            name: &self.name,
            display_name: None,
            identifier: &self.identifier,
            icon: None,
            executable_name: &self.executable_name,
            package_type: "BNDL",
            short_version: &self.short_version,
            version: &self.version,
            signature: &self.signature,
            copyright: None,
            minimum_system_version: self.minimum_system_version.as_deref(),
        }
        .write(&mut root);

        let mut java_vm = Dict::new();
        java_vm
            .string("JVMMinimumFrameworkVersion", &self.jvm_minimum_framework_version)
            .string("JVMMinimumSystemVersion", &self.jvm_minimum_system_version)
            .string("JVMPlatformVersion", &self.jvm_platform_version)
            .string("JVMVendor", &self.jvm_vendor)
            .string("JVMVersion", &self.jvm_version);
        root.insert("JavaVM", PlistValue::Dict(java_vm));
        root
    }
}
