//! Integration tests for the vitrine command line.
//!
//! Runs commands end to end against temporary files. No template store is
//! involved.

use std::path::Path;

use clap::Parser;
use serde_json::{json, Value};
use vitrine_cli::{run, CliArgs};

async fn vitrine(args: &[&str]) -> anyhow::Result<Value> {
    let mut argv = vec!["vitrine", "--no-system-fonts"];
    argv.extend_from_slice(args);
    let args = CliArgs::try_parse_from(argv)?;
    let mut out = Vec::new();
    run(args, &mut out).await?;
    Ok(serde_json::from_slice(&out)?)
}

fn write(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string(value).expect("json")).expect("write");
}

fn product() -> Value {
    json!({
        "id": 5,
        "code": "ABC123",
        "color": "Red",
        "product_type": "Bag",
        "size_range": "One size",
        "price": 59.9,
        "currency": "USD",
        "brand": { "id": 9, "name": "Maison Rouge" },
        "images": [{ "file_path": "/nonexistent/vitrine/bag.png" }]
    })
}

// ==========================================================================
// generate
// ==========================================================================

#[tokio::test]
async fn test_generate_for_use_case_writes_record() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let product_path = tmp.path().join("product.json");
    let doc_path = tmp.path().join("story.json");
    write(&product_path, &product());

    let summary = vitrine(&[
        "generate",
        "--product",
        product_path.to_str().expect("utf8"),
        "--style",
        "instagram",
        "--use-case",
        "instagram-story",
        "-o",
        doc_path.to_str().expect("utf8"),
    ])
    .await
    .expect("generate");

    assert_eq!(summary["style"], "instagram");
    assert_eq!((summary["width"].as_u64(), summary["height"].as_u64()), (Some(1080), Some(1920)));
    assert!(!summary["degraded_slots"].as_array().expect("array").is_empty());

    let record: Value =
        serde_json::from_str(&std::fs::read_to_string(&doc_path).expect("read")).expect("json");
    assert_eq!(record["version"], "2.0");
    assert_eq!(record["canvas"]["width"], 1080.0);
    assert_eq!(record["metadata"]["platform"], "instagram-story");
    assert_eq!(record["product"]["code"], "ABC123");
}

#[tokio::test]
async fn test_generate_is_deterministic() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let product_path = tmp.path().join("product.json");
    write(&product_path, &product());

    let mut outputs = Vec::new();
    for name in ["a.json", "b.json"] {
        let path = tmp.path().join(name);
        vitrine(&[
            "generate",
            "--product",
            product_path.to_str().expect("utf8"),
            "--style",
            "catalog",
            "-o",
            path.to_str().expect("utf8"),
        ])
        .await
        .expect("generate");
        outputs.push(std::fs::read_to_string(&path).expect("read"));
    }

    assert_eq!(outputs[0], outputs[1]);
}

// ==========================================================================
// migrate and dimensions
// ==========================================================================

#[tokio::test]
async fn test_migrate_rewrites_legacy_in_place() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("legacy.json");
    let objects = json!([
        { "type": "text", "id": "t", "text": "ABC123", "left": 10, "top": 20 },
        { "type": "rect", "id": "r", "left": 0, "top": 0, "width": 40, "height": 30 }
    ]);
    write(&path, &objects);

    let summary = vitrine(&["migrate", path.to_str().expect("utf8")])
        .await
        .expect("migrate");

    assert_eq!(summary["migrated"], true);
    assert_eq!(summary["objects"], 2);
    let migrated: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(migrated["version"], "2.0");
    assert_eq!(migrated["canvas"]["objects"][0]["text"], "ABC123");
    assert_eq!(migrated["canvas"]["objects"][1]["id"], "r");
}

#[tokio::test]
async fn test_dimensions_for_use_case_and_unknown() {
    let known = vitrine(&["dimensions", "--use-case", "instagram-story"])
        .await
        .expect("dimensions");
    assert_eq!(known, json!({ "width": 1080, "height": 1920 }));

    let unknown = vitrine(&["dimensions", "--use-case", "xyz"])
        .await
        .expect("dimensions");
    assert_eq!(unknown, json!({ "width": 700, "height": 900 }));
}

#[tokio::test]
async fn test_dimensions_without_flags_keep_base() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("doc.json");
    write(
        &path,
        &json!({
            "version": "2.0",
            "canvas": {
                "width": 700, "height": 900,
                "objects": [{ "type": "rect", "left": 0, "top": 0, "width": 2000, "height": 50 }]
            }
        }),
    );

    let plain = vitrine(&["dimensions", path.to_str().expect("utf8")])
        .await
        .expect("dimensions");
    assert_eq!((plain["width"].as_u64(), plain["height"].as_u64()), (Some(700), Some(900)));

    let grown = vitrine(&["dimensions", path.to_str().expect("utf8"), "--auto-scale"])
        .await
        .expect("dimensions");
    assert_eq!(grown["width"], 2100);
    assert_eq!(grown["height"], 900);
}

#[tokio::test]
async fn test_list_presets() {
    let presets = vitrine(&["dimensions", "--list-presets"]).await.expect("list");
    let names: Vec<&str> = presets
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names.len(), 11);
    assert!(names.contains(&"business-card"));
}

// ==========================================================================
// render
// ==========================================================================

#[tokio::test]
async fn test_render_infers_format_from_extension() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let doc_path = tmp.path().join("doc.json");
    write(
        &doc_path,
        &json!([{ "type": "circle", "left": 10, "top": 10, "radius": 20, "fill": "#ff0000" }]),
    );

    let jpg = tmp.path().join("out.jpg");
    let summary = vitrine(&[
        "render",
        doc_path.to_str().expect("utf8"),
        "-o",
        jpg.to_str().expect("utf8"),
        "--width",
        "64",
        "--height",
        "32",
    ])
    .await
    .expect("render");

    assert_eq!(summary["format"], "jpg");
    let bytes = std::fs::read(&jpg).expect("read");
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

    let svg = tmp.path().join("out.svg");
    vitrine(&["render", doc_path.to_str().expect("utf8"), "-o", svg.to_str().expect("utf8")])
        .await
        .expect("render");
    let text = std::fs::read_to_string(&svg).expect("read");
    assert!(text.starts_with("<svg"));
}

// ==========================================================================
// store commands
// ==========================================================================

#[tokio::test]
async fn test_store_commands_reject_invalid_api_url() {
    let Err(err) = vitrine(&["--api-url", "", "deactivate", "1"]).await else {
        panic!("empty API URL must be rejected");
    };
    assert!(err.to_string().contains("invalid client configuration"));
}
