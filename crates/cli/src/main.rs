use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bootcfg::load_tree;
use bootcfg::render::{render_cmake, render_image_uuid, render_uuid_map, UuidKind};
use bootcfg_core::model::{addr_range, BootConfiguration};
use clap::Parser;

/// Boot-configuration generator CLI.
///
/// Loads a configuration-tree dump, resolves the active bootloader and
/// image for the chosen code region, and emits C source files carrying
/// vendor/class UUIDs plus a CMake fragment listing them.
#[derive(Parser, Debug)]
#[command(
    name = "bootcfg",
    version,
    about = "Generate boot-configuration UUID sources from a hardware partition tree",
    long_about = None
)]
struct Cli {
    /// Path to the configuration-tree dump (JSON or YAML).
    #[arg(long)]
    tree: PathBuf,

    /// Directory to write generated files to. Required with any emission flag.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Emit a map of vendor UUIDs for all images of the bootloader.
    #[arg(long, default_value_t = false)]
    uuid_vid_map: bool,

    /// Emit a map of class UUIDs for all images of the bootloader.
    #[arg(long, default_value_t = false)]
    uuid_cid_map: bool,

    /// Emit the current image's vendor UUID.
    #[arg(long, default_value_t = false)]
    uuid_vid: bool,

    /// Emit the current image's class UUID.
    #[arg(long, default_value_t = false)]
    uuid_cid: bool,

    /// Compatible string identifying bootloader configuration nodes.
    #[arg(long, default_value = "nordic,mcuboot")]
    compatible: String,

    /// Chosen entry naming the active code region node.
    #[arg(long, default_value = "zephyr,code-partition")]
    chosen: String,

    /// Print the resolved boot configuration as JSON to stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tree = load_tree(&cli.tree)?;
    let code_node = tree.chosen(&cli.chosen).map(|id| tree.node(id));
    let code_region = addr_range(code_node);
    let config = bootcfg_core::resolve::resolve(&tree, code_region, &cli.compatible)?;

    if cli.json {
        let serialized = serde_json::to_string_pretty(&config)
            .context("Failed to serialize boot configuration to JSON")?;
        println!("{}", serialized);
    }

    let emitting = cli.uuid_vid_map || cli.uuid_cid_map || cli.uuid_vid || cli.uuid_cid;
    if !emitting {
        return Ok(());
    }

    let output_dir = cli
        .output_dir
        .as_deref()
        .ok_or_else(|| anyhow!("--output-dir is required when emitting generated sources"))?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

    let mut sources = Vec::new();

    if cli.uuid_vid_map {
        emit_map(&config, UuidKind::Vid, output_dir, &mut sources)?;
    }
    if cli.uuid_cid_map {
        emit_map(&config, UuidKind::Cid, output_dir, &mut sources)?;
    }
    if cli.uuid_vid {
        emit_image_uuid(&config, UuidKind::Vid, output_dir, &mut sources)?;
    }
    if cli.uuid_cid {
        emit_image_uuid(&config, UuidKind::Cid, output_dir, &mut sources)?;
    }

    let cmake_path = output_dir.join("uuid.cmake");
    println!("Writing CMake library to {}", cmake_path.display());
    fs::write(&cmake_path, render_cmake(&sources))
        .with_context(|| format!("Failed to write {}", cmake_path.display()))?;

    Ok(())
}

/// Write a UUID map for every image of the resolved bootloader.
fn emit_map(
    config: &BootConfiguration,
    kind: UuidKind,
    output_dir: &Path,
    sources: &mut Vec<&'static str>,
) -> Result<()> {
    let bootloader = config
        .bootloader
        .as_ref()
        .ok_or_else(|| anyhow!("Could not find a bootloader configuration in the tree"))?;

    let file_name = kind.map_file_name();
    let path = output_dir.join(file_name);
    println!("Writing UUID {} map to {}", kind.name().to_uppercase(), path.display());
    fs::write(&path, render_uuid_map(bootloader, kind))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    sources.push(file_name);
    Ok(())
}

/// Write the active image's UUID of the given kind.
fn emit_image_uuid(
    config: &BootConfiguration,
    kind: UuidKind,
    output_dir: &Path,
    sources: &mut Vec<&'static str>,
) -> Result<()> {
    let image = config
        .image
        .as_ref()
        .ok_or_else(|| anyhow!("Could not find an image configuration in the tree"))?;
    let uuid = match kind {
        UuidKind::Vid => image.active_vid.as_ref(),
        UuidKind::Cid => image.active_cid.as_ref(),
    }
    .ok_or_else(|| {
        anyhow!("Active image {} has no {} UUID for its active partition", image.name, kind.name())
    })?;

    let file_name = kind.image_file_name();
    let path = output_dir.join(file_name);
    println!(
        "Writing UUID {} for the current image to {}",
        kind.name().to_uppercase(),
        path.display()
    );
    fs::write(&path, render_image_uuid(uuid, kind))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    sources.push(file_name);
    Ok(())
}
