//! Integration tests for the pdftools CLI
//!
//! Runs the compiled binary against PDFs built on the fly and checks the
//! files it writes.

use anyhow::Result;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{Dictionary, Object, Stream};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Test helper to get the CLI binary path
fn get_cli_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pdftools"))
}

/// Test helper to create a temporary directory
fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

/// Test helper to run CLI command and return output
fn run_cli_command(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(get_cli_path()).args(args).output()?;
    Ok(output)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Write a PDF whose page `n` is `100 + n` points wide
fn write_test_pdf(path: &Path, page_count: usize) {
    let mut doc = lopdf::Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=page_count {
        let content = format!("BT /F1 12 Tf 20 20 Td (Page {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(100 + n as i64),
                    Object::Integer(200),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_count as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

fn write_test_png(path: &Path, width: u32, height: u32) {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 0, 0])));
    image.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Test helper to check if PDF file exists and has content
fn assert_pdf_exists_and_valid(path: &Path) {
    assert!(path.exists(), "PDF file should exist: {}", path.display());
    let content = fs::read(path).expect("Failed to read PDF file");
    assert!(
        content.starts_with(b"%PDF-"),
        "File should start with PDF header"
    );
}

fn page_widths(path: &Path) -> Vec<i64> {
    let doc = lopdf::Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap()[2]
                .as_i64()
                .unwrap()
        })
        .collect()
}

fn page_rotations(path: &Path) -> Vec<i64> {
    let doc = lopdf::Document::load(path).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            doc.get_dictionary(id)
                .unwrap()
                .get(b"Rotate")
                .and_then(Object::as_i64)
                .unwrap_or(0)
        })
        .collect()
}

#[test]
fn test_cli_help_command() {
    let output = run_cli_command(&["--help"]).expect("CLI command should succeed");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["merge", "split", "rotate", "reorder", "delete-pages", "image-to-pdf"] {
        assert!(stdout.contains(command), "help should list {command}");
    }
}

#[test]
fn test_cli_merge_command() {
    let temp_dir = setup_temp_dir();
    let a = temp_dir.path().join("a.pdf");
    let b = temp_dir.path().join("b.pdf");
    let output_path = temp_dir.path().join("merged.pdf");
    write_test_pdf(&a, 2);
    write_test_pdf(&b, 1);

    let output = run_cli_command(&[
        "merge",
        path_str(&a),
        path_str(&b),
        "-o",
        path_str(&output_path),
    ])
    .expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    assert_pdf_exists_and_valid(&output_path);
    assert_eq!(page_widths(&output_path), vec![101, 102, 101]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Merged 2 files"));
}

#[test]
fn test_cli_merge_requires_files() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("merged.pdf");

    let output = run_cli_command(&["merge", "-o", path_str(&output_path)])
        .expect("CLI command should run");

    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn test_cli_split_command() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    write_test_pdf(&input, 5);
    let pattern = temp_dir.path().join("part_{}.pdf");

    let output = run_cli_command(&[
        "split",
        path_str(&input),
        "--ranges",
        "1-2,3-5",
        "--pattern",
        path_str(&pattern),
    ])
    .expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    assert_eq!(
        page_widths(&temp_dir.path().join("part_1.pdf")),
        vec![101, 102]
    );
    assert_eq!(
        page_widths(&temp_dir.path().join("part_2.pdf")),
        vec![103, 104, 105]
    );
}

#[test]
fn test_cli_split_invalid_ranges() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    write_test_pdf(&input, 3);

    let output = run_cli_command(&["split", path_str(&input), "--ranges", "1-2-3"])
        .expect("CLI command should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid page ranges"));
}

#[test]
fn test_cli_rotate_command() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    let output_path = temp_dir.path().join("rotated.pdf");
    write_test_pdf(&input, 2);

    let output = run_cli_command(&[
        "rotate",
        path_str(&input),
        "-o",
        path_str(&output_path),
        "--angle",
        "-90",
    ])
    .expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    assert_eq!(page_rotations(&output_path), vec![270, 270]);
}

#[test]
fn test_cli_rotate_invalid_angle() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    let output_path = temp_dir.path().join("rotated.pdf");
    write_test_pdf(&input, 1);

    let output = run_cli_command(&[
        "rotate",
        path_str(&input),
        "-o",
        path_str(&output_path),
        "--angle",
        "45",
    ])
    .expect("CLI command should run");

    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn test_cli_reorder_and_delete_commands() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    let reordered = temp_dir.path().join("reordered.pdf");
    let deleted = temp_dir.path().join("deleted.pdf");
    write_test_pdf(&input, 3);

    let output = run_cli_command(&[
        "reorder",
        path_str(&input),
        "-o",
        path_str(&reordered),
        "--order",
        "3,1,1",
    ])
    .expect("CLI command should succeed");
    assert!(output.status.success(), "reorder should succeed");
    assert_eq!(page_widths(&reordered), vec![103, 101, 101]);

    let output = run_cli_command(&[
        "delete-pages",
        path_str(&input),
        "-o",
        path_str(&deleted),
        "--pages",
        "2",
    ])
    .expect("CLI command should succeed");
    assert!(output.status.success(), "delete-pages should succeed");
    assert_eq!(page_widths(&deleted), vec![101, 103]);
}

#[test]
fn test_cli_compress_command() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    let output_path = temp_dir.path().join("compressed.pdf");
    write_test_pdf(&input, 2);

    let output = run_cli_command(&["compress", path_str(&input), "-o", path_str(&output_path)])
        .expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    assert_pdf_exists_and_valid(&output_path);
    assert_eq!(page_widths(&output_path), vec![101, 102]);
}

#[test]
fn test_cli_image_to_pdf_command() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("scan.png");
    let output_path = temp_dir.path().join("converted.pdf");
    write_test_png(&input, 50, 70);

    let output = run_cli_command(&[
        "image-to-pdf",
        path_str(&input),
        "-o",
        path_str(&output_path),
    ])
    .expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    assert_pdf_exists_and_valid(&output_path);
    assert_eq!(page_widths(&output_path), vec![50]);
}

#[test]
fn test_cli_info_command() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("input.pdf");
    write_test_pdf(&input, 2);

    let output = run_cli_command(&["info", path_str(&input)]).expect("CLI command should succeed");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pages: 2"));
    assert!(stdout.contains("Page 2: 102x200 pts"));
}

#[test]
fn test_cli_info_invalid_file() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("broken.pdf");
    fs::write(&input, b"not a pdf").unwrap();

    let output = run_cli_command(&["info", path_str(&input)]).expect("CLI command should run");
    assert!(!output.status.success());
}

#[cfg(not(feature = "ocr"))]
#[test]
fn test_cli_ocr_without_engine() {
    let temp_dir = setup_temp_dir();
    let input = temp_dir.path().join("scan.png");
    write_test_png(&input, 8, 8);

    let output = run_cli_command(&["ocr", path_str(&input)]).expect("CLI command should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OCR is not available"));
}
