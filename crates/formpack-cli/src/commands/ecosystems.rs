//! `formpack ecosystems` command implementation.
//!
//! List the ecosystems a content directory can export.

use crate::content::LoadedContent;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

/// Run the ecosystems command.
pub fn run(content_dir: &Path, json: bool) -> Result<()> {
    let content = match LoadedContent::load(content_dir) {
        Ok(content) => content,
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

    let exporter = content.into_exporter();

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let ecosystems = runtime.block_on(exporter.ecosystems());

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "ecosystems": ecosystems
            })
        );
    } else if ecosystems.is_empty() {
        println!("No exportable ecosystems found.");
        println!("hint: each ecosystem needs an adapters/<id>/adapter.ts");
    } else {
        println!("Ecosystems ({}):", ecosystems.len());
        for ecosystem in &ecosystems {
            println!("  {ecosystem}");
        }
    }

    Ok(())
}
