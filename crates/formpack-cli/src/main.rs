#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::uninlined_format_args)]

mod commands;
mod content;
mod logging;

use clap::Parser;
use formpack_core::config::Env;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "formpack")]
#[command(author, version, about = "Export contract transaction forms as standalone web projects", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Export a form as a standalone, runnable web project
    Export {
        /// Form config JSON (fields, function id, UI kit)
        #[arg(long, value_name = "FILE")]
        form: PathBuf,

        /// Network config JSON (ecosystem, explorer, RPC)
        #[arg(long, value_name = "FILE")]
        network: PathBuf,

        /// Content directory (renderer config, adapters, patches, templates)
        #[arg(long, value_name = "DIR")]
        content: PathBuf,

        /// Directory to write the exported project into
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        /// Dependency resolution environment
        #[arg(long, default_value = "production", value_parser = ["local", "packed", "production"])]
        env: String,

        /// Override the generated project name
        #[arg(long)]
        name: Option<String>,

        /// package.json description
        #[arg(long)]
        description: Option<String>,

        /// package.json author
        #[arg(long)]
        author: Option<String>,

        /// package.json license
        #[arg(long)]
        license: Option<String>,

        /// Tarball for a packed package, as name=path (repeatable)
        #[arg(long = "packed-tarball", value_name = "NAME=PATH")]
        packed_tarballs: Vec<String>,

        /// Show the export plan without writing any files
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the merged dependency set for a form
    Deps {
        /// Form config JSON
        #[arg(long, value_name = "FILE")]
        form: PathBuf,

        /// Content directory
        #[arg(long, value_name = "DIR")]
        content: PathBuf,

        /// Ecosystem adapter to include
        #[arg(long)]
        ecosystem: String,

        /// Include devDependencies
        #[arg(long)]
        dev: bool,
    },

    /// List the ecosystems a content directory can export
    Ecosystems {
        /// Content directory
        #[arg(long, value_name = "DIR")]
        content: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Logs go to stderr, so stdout stays a single JSON object under --json
    logging::init(cli.verbose, cli.json);

    let resolve = |path: PathBuf| {
        if path.is_absolute() {
            path
        } else {
            cwd.join(path)
        }
    };

    match cli.command {
        Some(Commands::Export {
            form,
            network,
            content,
            out,
            env,
            name,
            description,
            author,
            license,
            packed_tarballs,
            dry_run,
        }) => {
            let action = commands::export::ExportAction {
                form: resolve(form),
                network: resolve(network),
                content: resolve(content),
                out: resolve(out),
                env: env.parse::<Env>().unwrap_or_default(),
                project_name: name,
                description,
                author,
                license,
                packed_tarballs: parse_tarball_specs(&packed_tarballs),
                dry_run,
            };
            commands::export::run(action, cli.json)
        }
        Some(Commands::Deps {
            form,
            content,
            ecosystem,
            dev,
        }) => commands::deps::run(&resolve(form), &resolve(content), &ecosystem, dev, cli.json),
        Some(Commands::Ecosystems { content }) => {
            commands::ecosystems::run(&resolve(content), cli.json)
        }
        Some(Commands::Version) | None => commands::version::run(),
    }
}

/// Parse repeated `name=path` tarball specs.
fn parse_tarball_specs(specs: &[String]) -> Vec<(String, String)> {
    let mut tarballs = Vec::new();
    for spec in specs {
        let Some((name, path)) = spec.split_once('=') else {
            eprintln!("error: invalid --packed-tarball spec: {spec}");
            eprintln!("hint: expected name=path, e.g. @formpack/renderer=./renderer.tgz");
            std::process::exit(2);
        };
        tarballs.push((name.to_string(), path.to_string()));
    }
    tarballs
}
