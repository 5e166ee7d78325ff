//! Configuration structures for packaging operations.
//!
//! This module provides the application identity record, runtime pins,
//! input/resource locations, platform-specific settings, and the builder
//! that validates them into [`Settings`].

mod application;
mod arch;
mod builder;
mod bundle;
mod core;
mod linux;
mod macos;
mod runtime;
mod windows;

// Re-export all public types
pub use application::{ApplicationConfig, Category};
pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use bundle::{BundleSettings, Inputs, Resources, TargetInputs};
pub use core::Settings;
pub use linux::LinuxSettings;
pub use macos::{DEFAULT_JVM_OPTIONS, MacOsSettings};
pub use runtime::{
    DEFAULT_ADOPTOPENJDK_VERSION, DEFAULT_OJDKBUILD_BUILD, DEFAULT_OJDKBUILD_VERSION, RuntimePin,
    RuntimePins, RuntimeSlot, RuntimeSource,
};
pub use windows::WindowsSettings;
