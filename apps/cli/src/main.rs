// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! bim2gltf - convert a model document to glTF 2.0.
//!
//! Reads a JSON model document (see `bim2gltf_core::InMemoryDocument`),
//! writes `<output>.gltf` with its `.bin` buffer next to it, and optionally
//! packages both into `<stem>.zip`.
//!
//! Defaults come from `BIM2GLTF_NORMALS`, `BIM2GLTF_EMBED`, `BIM2GLTF_ZIP`
//! and `BIM2GLTF_THREADS`; flags override them. Logging follows `RUST_LOG`.

use anyhow::{Context, Result};
use bim2gltf_core::InMemoryDocument;
use bim2gltf_export::BufferLayout;
use bim2gltf_geometry::NormalMode;
use bim2gltf_processing::{convert_document, ConversionOutput, ConvertError, ConvertOptions};
use clap::{Parser, ValueEnum};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON model document
    input: PathBuf,

    /// Output glTF path (missing directories are created)
    output: PathBuf,

    /// Normal generation
    #[arg(long, value_enum)]
    normals: Option<NormalsArg>,

    /// Embed the binary buffer as a base64 data URI
    #[arg(long, overrides_with = "no_embed")]
    embed: bool,

    /// Write the binary buffer to `<stem>.bin` even if BIM2GLTF_EMBED is set
    #[arg(long, overrides_with = "embed")]
    no_embed: bool,

    /// Also write `<stem>.zip` containing the glTF and its buffer
    #[arg(long, overrides_with = "no_zip")]
    zip: bool,

    /// Skip packaging even if BIM2GLTF_ZIP is set
    #[arg(long, overrides_with = "zip")]
    no_zip: bool,

    /// Worker threads for mesh building
    #[arg(long)]
    threads: Option<usize>,

    /// Build element meshes on the calling thread only
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Write `<output>.error` with the diagnostic when conversion fails
    #[arg(long, default_value_t = false)]
    error_marker: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum NormalsArg {
    Placeholder,
    Face,
}

impl From<NormalsArg> for NormalMode {
    fn from(arg: NormalsArg) -> Self {
        match arg {
            NormalsArg::Placeholder => NormalMode::Placeholder,
            NormalsArg::Face => NormalMode::Face,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let threads = args.threads.filter(|n| *n > 0).unwrap_or(config.threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to initialize rayon thread pool")?;

    let options = convert_options(&args, &config);

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        threads,
        normals = ?options.normals,
        layout = ?options.layout,
        zip = options.package_zip,
        "Starting bim2gltf"
    );

    match run(&args.input, &args.output, &options) {
        Ok(result) => {
            report(&result);
            Ok(())
        }
        Err(err) => {
            if args.error_marker {
                write_error_marker(&args.output, &err);
            }
            Err(err)
        }
    }
}

/// Resolve options: a flag given on the command line wins over the environment
fn convert_options(args: &Args, config: &Config) -> ConvertOptions {
    let embed = switch(args.embed, args.no_embed, config.embed);
    ConvertOptions {
        normals: args.normals.map(NormalMode::from).unwrap_or(config.normals),
        layout: if embed {
            BufferLayout::Embedded
        } else {
            BufferLayout::Separate
        },
        package_zip: switch(args.zip, args.no_zip, config.zip),
        parallel: !args.sequential,
        ..Default::default()
    }
}

fn switch(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

fn run(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConversionOutput> {
    let document = load_document(input)?;
    tracing::info!(elements = document.len(), "Loaded model document");

    match convert_document(&document, output, options) {
        Ok(result) => Ok(result),
        Err(ConvertError::NoGeometry(result)) => {
            tracing::warn!("Model has no exportable geometry; wrote an empty scene");
            Ok(*result)
        }
        Err(err) => Err(err).context("Conversion failed"),
    }
}

fn load_document(path: &Path) -> Result<InMemoryDocument> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to read model document {}", path.display()))
}

fn report(result: &ConversionOutput) {
    let stats = &result.stats;
    tracing::info!(
        gltf = %result.asset.gltf_path.display(),
        meshes = stats.meshes,
        triangles = stats.triangles,
        elements = stats.elements,
        time_ms = stats.time_ms,
        "Done"
    );
    if let Some(zip) = &result.zip_path {
        tracing::info!(zip = %zip.display(), "Packaged output");
    }
}

fn error_marker_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".error");
    PathBuf::from(name)
}

/// Best effort: a marker that cannot be written is only logged
fn write_error_marker(output: &Path, err: &anyhow::Error) {
    let path = error_marker_path(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::error!(dir = %parent.display(), error = %e, "Failed to create error marker directory");
            return;
        }
    }
    if let Err(e) = fs::write(&path, format!("{err:#}\n")) {
        tracing::error!(path = %path.display(), error = %e, "Failed to write error marker");
    }
}
