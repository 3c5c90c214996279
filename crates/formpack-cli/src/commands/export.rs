//! `formpack export` command implementation.
//!
//! Runs the assembly pipeline, then writes the resulting project tree under
//! `--out` with atomic per-file writes. `--dry-run` prints the plan instead
//! of touching the filesystem.

use crate::content::{self, ContentError, LoadedContent};
use formpack_core::config::{Env, ExportOptions};
use formpack_core::form::{FormConfig, NetworkConfig};
use formpack_core::ExportOutput;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

/// Export command action.
#[derive(Debug, Clone)]
pub struct ExportAction {
    pub form: PathBuf,
    pub network: PathBuf,
    pub content: PathBuf,
    pub out: PathBuf,
    pub env: Env,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub packed_tarballs: Vec<(String, String)>,
    pub dry_run: bool,
}

/// Run the export command.
pub fn run(action: ExportAction, json: bool) -> Result<()> {
    let (content, form, network) = match load_inputs(&action) {
        Ok(inputs) => inputs,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": e.to_string()
                    })
                );
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(2);
        }
    };

    let options = build_options(&action);
    let exporter = content.into_exporter();

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let result = runtime.block_on(exporter.export(&form, &network, &options));

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "code": e.code(),
                        "error": e.to_string()
                    })
                );
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(1);
        }
    };

    if action.dry_run {
        print_plan(&output, &action.out, json);
        return Ok(());
    }

    if let Err(e) = write_files(&output, &action.out) {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "ok": false,
                    "error": format!("Failed to write {}: {e}", action.out.display())
                })
            );
        } else {
            eprintln!("error: failed to write {}: {e}", action.out.display());
        }
        std::process::exit(1);
    }

    print_summary(&output, &action.out, json);
    Ok(())
}

fn load_inputs(
    action: &ExportAction,
) -> Result<(LoadedContent, FormConfig, NetworkConfig), ContentError> {
    let content = LoadedContent::load(&action.content)?;
    let form = content::load_form(&action.form)?;
    let network = content::load_network(&action.network)?;
    Ok((content, form, network))
}

fn build_options(action: &ExportAction) -> ExportOptions {
    let mut options = ExportOptions::new(action.env);
    if let Some(name) = &action.project_name {
        options = options.with_project_name(name);
    }
    if let Some(description) = &action.description {
        options = options.with_description(description);
    }
    if let Some(author) = &action.author {
        options = options.with_author(author);
    }
    if let Some(license) = &action.license {
        options = options.with_license(license);
    }
    for (name, path) in &action.packed_tarballs {
        options = options.with_packed_tarball(name, path);
    }
    options
}

fn write_files(output: &ExportOutput, out_dir: &Path) -> std::io::Result<()> {
    for (path, file) in output.files.iter() {
        formpack_util::fs::write_atomic(&out_dir.join(path), file.as_bytes())?;
    }
    Ok(())
}

fn print_plan(output: &ExportOutput, out_dir: &Path, json: bool) {
    if json {
        let files: Vec<&str> = output.files.paths().collect();
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "dryRun": true,
                "outDir": out_dir.to_string_lossy(),
                "files": files,
                "manifest": output.manifest
            })
        );
    } else {
        println!(
            "Dry run: {} files would be written to {}",
            output.files.len(),
            out_dir.display()
        );
        println!();
        for path in output.files.paths() {
            println!("  + {path}");
        }
        print_patch_notes(output);
    }
}

fn print_summary(output: &ExportOutput, out_dir: &Path, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "dryRun": false,
                "outDir": out_dir.to_string_lossy(),
                "manifest": output.manifest
            })
        );
        return;
    }

    let manifest = &output.manifest;
    println!(
        "Exported {} ({}) to {}",
        manifest.project_name,
        manifest.ecosystem,
        out_dir.display()
    );
    println!(
        "  {} files, {} dependencies, {} dev dependencies",
        manifest.file_count, manifest.dependency_count, manifest.dev_dependency_count
    );
    println!("  fingerprint: {}", manifest.fingerprint);
    print_patch_notes(output);
    println!();
    println!("Next steps:");
    println!("  cd {}", out_dir.display());
    println!("  pnpm install");
    println!("  pnpm dev");
}

fn print_patch_notes(output: &ExportOutput) {
    for patch in &output.manifest.patches {
        println!("  patched: {patch}");
    }
    for skipped in &output.manifest.skipped_patches {
        eprintln!("! skipped patch: {skipped}");
    }
}
