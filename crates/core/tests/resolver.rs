use bootcfg_core::model::{addr_range, AddressRange};
use bootcfg_core::resolve::{resolve, ResolveError};
use bootcfg_core::tree::ConfigTree;

const COMPAT: &str = "vnd,bootloader";
const VID_LITERAL: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeffff0000";

/// Bootloader B owns partition (0x0, 0x8000); image I declares partitions
/// (0x8000, 0x10000) and (0x18000, 0x10000) with image-index 0. The chosen
/// code partition is slot0.
fn scenario_tree() -> ConfigTree {
    let doc = format!(
        r#"{{
            "chosen": {{ "zephyr,code-partition": "/flash/partitions/slot0" }},
            "root": {{
                "name": "/",
                "children": [
                    {{ "name": "flash", "children": [
                        {{ "name": "partitions", "children": [
                            {{ "name": "boot", "address": 0,
                               "regs": [{{ "addr": 0, "size": 32768 }}],
                               "label": "boot_partition" }},
                            {{ "name": "slot0", "address": 32768,
                               "regs": [{{ "addr": 32768, "size": 65536 }}],
                               "label": "slot0_partition" }},
                            {{ "name": "slot1", "address": 98304,
                               "regs": [{{ "addr": 98304, "size": 65536 }}],
                               "label": "slot1_partition" }}
                        ] }}
                    ] }},
                    {{ "name": "bootloader", "compatible": ["{COMPAT}"],
                       "properties": {{
                           "partitions": [{{ "ref": "/flash/partitions/boot" }}]
                       }},
                       "children": [
                           {{ "name": "images", "children": [
                               {{ "name": "image-0", "properties": {{
                                   "image-index": 0,
                                   "uuid-vid": ["{VID_LITERAL}", "{VID_LITERAL}"],
                                   "uuid-cid": ["app", "app"],
                                   "partitions": [
                                       {{ "ref": "/flash/partitions/slot0" }},
                                       {{ "ref": "/flash/partitions/slot1" }}
                                   ]
                               }} }}
                           ] }}
                       ] }}
                ]
            }}
        }}"#
    );
    ConfigTree::from_json_str(&doc).expect("fixture tree")
}

fn chosen_region(tree: &ConfigTree) -> AddressRange {
    addr_range(tree.chosen("zephyr,code-partition").map(|id| tree.node(id)))
}

#[test]
fn active_region_in_image_slot_resolves_bootloader_and_image() {
    let tree = scenario_tree();
    let active = chosen_region(&tree);
    assert_eq!(active, AddressRange::new(0x8000, 0x10000));

    let config = resolve(&tree, active, COMPAT).expect("resolution");

    let bootloader = config.bootloader.expect("bootloader should be found");
    assert_eq!(bootloader.images.len(), 1);

    let image = config.image.expect("image should be found");
    assert_eq!(image.name, "image-0");
    assert_eq!(image.index, Some(0));
    // Active partition is slot0 (index 0); its identifiers are mirrored.
    assert_eq!(image.active_vid.as_ref().unwrap().hyphenated(), VID_LITERAL);
    assert!(image.active_cid.is_some());
    assert_eq!(
        image.active_cid.as_ref().unwrap().bytes(),
        image.partitions[0].cid.as_ref().unwrap().bytes()
    );
}

#[test]
fn active_region_in_bootloader_partition_resolves_bootloader_only() {
    let tree = scenario_tree();
    let config = resolve(&tree, AddressRange::new(0x0, 0x8000), COMPAT).expect("resolution");

    assert!(config.bootloader.is_some());
    assert!(config.image.is_none());
}

#[test]
fn unmatched_region_resolves_to_neither() {
    let tree = scenario_tree();
    let config = resolve(&tree, AddressRange::new(0x40000, 0x1000), COMPAT).expect("resolution");

    assert!(config.bootloader.is_none());
    assert!(config.image.is_none());
}

#[test]
fn second_slot_resolves_with_that_active_index() {
    let tree = scenario_tree();
    let config = resolve(&tree, AddressRange::new(0x18000, 0x10000), COMPAT).expect("resolution");

    let image = config.image.expect("image");
    assert_eq!(
        image.active_cid.as_ref().unwrap().bytes(),
        image.partitions[1].cid.as_ref().unwrap().bytes()
    );
}

/// Two sibling images both containing the active region is an authoring
/// error, never silently resolved by first-match-wins.
#[test]
fn overlapping_images_fail_with_ambiguity() {
    let doc = r#"{
        "root": {
            "name": "/",
            "children": [
                { "name": "part", "address": 4096, "regs": [{ "addr": 4096, "size": 256 }] },
                { "name": "bootloader", "compatible": ["vnd,bootloader"],
                  "children": [
                      { "name": "images", "children": [
                          { "name": "image-a", "properties": {
                              "image-index": 0,
                              "partitions": [{ "ref": "/part" }]
                          } },
                          { "name": "image-b", "properties": {
                              "image-index": 1,
                              "partitions": [{ "ref": "/part" }]
                          } }
                      ] }
                  ] }
            ]
        }
    }"#;
    let tree = ConfigTree::from_json_str(doc).expect("fixture tree");

    let err = resolve(&tree, AddressRange::new(0x1000, 0x100), COMPAT).unwrap_err();
    match err {
        ResolveError::AmbiguousImage { addr, size } => {
            assert_eq!(addr, 0x1000);
            assert_eq!(size, 0x100);
        }
        other => panic!("expected ambiguity error, got {other}"),
    }
    // The failure message names the conflicting region for diagnosis.
    let message = resolve(&tree, AddressRange::new(0x1000, 0x100), COMPAT)
        .unwrap_err()
        .to_string();
    assert!(message.contains("0x1000"));
    assert!(message.contains("0x100"));
}

/// A bootloader that matches the region itself keeps being scanned for:
/// an outer bootloader may list the same region as one of its images. The
/// first adopted bootloader wins; the image still comes from the outer node.
#[test]
fn nested_bootloader_is_discovered_as_outer_image() {
    let doc = r#"{
        "root": {
            "name": "/",
            "children": [
                { "name": "boot-part", "address": 0, "regs": [{ "addr": 0, "size": 32768 }] },
                { "name": "inner", "compatible": ["vnd,bootloader"],
                  "properties": { "partitions": [{ "ref": "/boot-part" }] } },
                { "name": "outer", "compatible": ["vnd,bootloader"],
                  "children": [
                      { "name": "images", "children": [
                          { "name": "stage1", "properties": {
                              "image-index": 0,
                              "partitions": [{ "ref": "/boot-part" }]
                          } }
                      ] }
                  ] }
            ]
        }
    }"#;
    let tree = ConfigTree::from_json_str(doc).expect("fixture tree");

    let config = resolve(&tree, AddressRange::new(0x0, 0x8000), COMPAT).expect("resolution");

    // The inner node was adopted first (its own partition matched); the
    // outer node still contributed the active image.
    let bootloader = config.bootloader.expect("bootloader");
    assert!(bootloader.images.is_empty());
    let image = config.image.expect("image");
    assert_eq!(image.name, "stage1");
}

#[test]
fn non_matching_compatible_is_ignored() {
    let tree = scenario_tree();
    let config =
        resolve(&tree, AddressRange::new(0x8000, 0x10000), "vnd,other").expect("resolution");
    assert!(config.bootloader.is_none());
    assert!(config.image.is_none());
}
