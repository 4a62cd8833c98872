//! Generated-source rendering.
//!
//! Turns resolved boot-configuration values into C source and CMake text.
//! Rendering is deliberately dumb string assembly; all selection logic
//! (which image is active, which identifiers exist) happens before these
//! functions run.

use std::fmt::Write as _;

use bootcfg_core::ident::BootUuid;
use bootcfg_core::model::BootloaderConfig;

const FILE_HEADER: &str = "/*\n * Generated by bootcfg. Do not edit.\n */\n";

/// Which of the two per-partition identifiers a file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidKind {
    Vid,
    Cid,
}

impl UuidKind {
    /// Short name used in symbol and file names (`vid` / `cid`).
    pub fn name(self) -> &'static str {
        match self {
            UuidKind::Vid => "vid",
            UuidKind::Cid => "cid",
        }
    }

    /// Output file name for the single-image artifact.
    pub fn image_file_name(self) -> &'static str {
        match self {
            UuidKind::Vid => "uuid-vid.c",
            UuidKind::Cid => "uuid-cid.c",
        }
    }

    /// Output file name for the map artifact.
    pub fn map_file_name(self) -> &'static str {
        match self {
            UuidKind::Vid => "uuid-vid-map.c",
            UuidKind::Cid => "uuid-cid-map.c",
        }
    }
}

/// Render the active image's identifier as a C byte-array definition.
pub fn render_image_uuid(uuid: &BootUuid, kind: UuidKind) -> String {
    format!(
        "{FILE_HEADER}\n\
         #include <stdint.h>\n\n\
         /* {uuid} */\n\
         const uint8_t image_uuid_{kind}[16] = {{\n\
         \t{array},\n\
         }};\n",
        kind = kind.name(),
        array = uuid.c_array(),
    )
}

/// Render a map of identifiers over every partition of every image declared
/// by the bootloader. Partitions without the requested identifier are
/// skipped; the map carries offset, size, and the partition's primary label.
pub fn render_uuid_map(bootloader: &BootloaderConfig, kind: UuidKind) -> String {
    let mut out = String::new();
    out.push_str(FILE_HEADER);
    out.push('\n');
    out.push_str("#include <stddef.h>\n#include <stdint.h>\n\n");
    let _ = writeln!(
        out,
        "struct image_uuid_{kind}_entry {{\n\
         \tuint32_t image_index;\n\
         \tuint32_t slot;\n\
         \tuint32_t off;\n\
         \tuint32_t size;\n\
         \tuint8_t uuid[16];\n\
         }};\n",
        kind = kind.name(),
    );

    let _ = writeln!(out, "const struct image_uuid_{0}_entry image_uuid_{0}_map[] = {{", kind.name());
    for (position, image) in bootloader.images.iter().enumerate() {
        let image_index = image.index.unwrap_or(position as u64);
        for (slot, partition) in image.partitions.iter().enumerate() {
            let uuid = match kind {
                UuidKind::Vid => partition.vid.as_ref(),
                UuidKind::Cid => partition.cid.as_ref(),
            };
            let Some(uuid) = uuid else {
                continue;
            };
            let label = partition.labels.first().map(String::as_str).unwrap_or("-");
            let _ = writeln!(out, "\t/* {}, slot {slot} ({label}): {uuid} */", image.name);
            let _ = writeln!(
                out,
                "\t{{\n\
                 \t\t.image_index = {image_index},\n\
                 \t\t.slot = {slot},\n\
                 \t\t.off = 0x{off:x},\n\
                 \t\t.size = 0x{size:x},\n\
                 \t\t.uuid = {{ {array} }},\n\
                 \t}},",
                off = partition.range.start,
                size = partition.range.size,
                array = uuid.c_array(),
            );
        }
    }
    out.push_str("};\n\n");

    let _ = writeln!(
        out,
        "const size_t image_uuid_{0}_map_len =\n\
         \tsizeof(image_uuid_{0}_map) / sizeof(image_uuid_{0}_map[0]);",
        kind.name(),
    );
    out
}

/// Render the CMake fragment listing every generated source file.
pub fn render_cmake(sources: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("# Generated by bootcfg. Do not edit.\n\n");
    out.push_str("set(BOOTCFG_GENERATED_SOURCES\n");
    for source in sources {
        let _ = writeln!(out, "    {source}");
    }
    out.push_str(")\n");
    out
}
