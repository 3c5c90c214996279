#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod export;
pub mod filemap;
pub mod form;
pub mod version;

pub use config::{
    AdapterConfig, AdapterConfigCache, AdapterConfigTable, AdapterDependencies, Env,
    ExportOptions, FieldDependencies, RendererConfig,
};
pub use error::{codes as export_codes, ExportError};
pub use export::{ExportManifest, ExportOutput, Exporter, PackageManager};
pub use filemap::{FileContent, FileMap};
pub use form::{FieldConfig, FormConfig, NetworkConfig, UiKitConfig};
pub use version::VERSION;
