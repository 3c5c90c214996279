//! Export assembly pipeline.
//!
//! Turns a saved form configuration into a standalone runnable project:
//! - Merging dependency declarations across configuration sources (deps)
//! - Rewriting the template package.json per target environment (`package_json`)
//! - Resolving self-published package versions (version)
//! - Selecting and repackaging adapter sources (assembler)
//! - Copying declared SDK patches (patches)
//! - Generating runtime app configs (`app_config`)
//! - Summarizing the run (manifest)
//! - Orchestrating the stages end to end (pipeline)

pub mod app_config;
pub mod assembler;
pub mod deps;
pub mod manifest;
pub mod package_json;
pub mod patches;
pub mod pipeline;
pub mod version;

pub use app_config::{
    generate_app_config, AppConfigFiles, JsonFormatter, PrettyFormatter, RECOMMENDED_UI_KITS,
};
pub use assembler::{
    AdapterAssembler, AdapterFileRegistry, ADAPTER_INTERFACE, INDEX_SOURCE, SCHEMA_SOURCE,
    UTILS_SOURCE,
};
pub use deps::{
    adapter_package_name, is_published_package, PackageManager, ADAPTER_PACKAGE_PREFIX,
    RENDERER_PACKAGE, TYPES_PACKAGE,
};
pub use manifest::ExportManifest;
pub use patches::{assemble_patches, PatchOutcome, PatchRecord, PatchStore};
pub use pipeline::{ExportOutput, Exporter};
pub use version::{caret_range, resolve_version, WORKSPACE_SPEC};
