//! End-to-end batches through the real codec and a real output directory.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder, RgbImage};
use quickconvert::batch::{BatchJob, BatchRequest, CancelToken, FileOutcome, run_batch};
use quickconvert::emit::DirectoryEmitter;
use quickconvert::history::HistoryLedger;
use quickconvert::imaging::{RustCodec, TargetFormat};
use quickconvert::presets;
use quickconvert::staging::{FileStaging, StagingMode};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 200])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 85)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    fs::write(path, bytes).unwrap();
}

fn stage(dir: &Path) -> FileStaging {
    let mut staging = FileStaging::new();
    staging.load_paths(&[dir.to_path_buf()], StagingMode::Image).unwrap();
    staging
}

#[test]
fn two_jpegs_convert_to_png_in_staging_order() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_jpeg(&input.path().join("a-first.jpg"), 64, 48);
    write_jpeg(&input.path().join("b-second.jpeg"), 32, 32);

    let staging = stage(input.path());
    let mut emitter = DirectoryEmitter::new(output.path()).unwrap();
    let mut ledger = HistoryLedger::new();
    let job = BatchJob::new(BatchRequest::Convert {
        target: TargetFormat::Png,
    });

    let report = run_batch(
        &RustCodec::new(),
        staging.files(),
        &job,
        &mut emitter,
        &mut ledger,
        &CancelToken::new(),
        None,
    );

    assert!(report.is_clean());
    let outputs: Vec<_> = report
        .results
        .iter()
        .map(|r| match &r.outcome {
            FileOutcome::Emitted { output, format, .. } => {
                assert_eq!(*format, TargetFormat::Png);
                output.clone()
            }
            other => panic!("{} was not emitted: {other:?}", r.name),
        })
        .collect();
    assert_eq!(
        outputs,
        vec![
            output.path().join("a-first.png"),
            output.path().join("b-second.png"),
        ]
    );

    let first = image::open(&outputs[0]).unwrap();
    assert_eq!(first.dimensions(), (64, 48));
    assert_eq!(
        image::ImageFormat::from_path(&outputs[1]).unwrap(),
        image::ImageFormat::Png
    );

    let history: Vec<&str> = ledger
        .entries()
        .iter()
        .map(|e| e.file_name.as_str())
        .collect();
    assert_eq!(history, vec!["a-first.jpg", "b-second.jpeg"]);
}

#[test]
fn thailand_preset_resize_is_350_by_450() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_jpeg(&input.path().join("visa.jpg"), 1000, 600);

    let staging = stage(input.path());
    let mut emitter = DirectoryEmitter::new(output.path()).unwrap();
    let mut ledger = HistoryLedger::new();
    let job = BatchJob::new(BatchRequest::Resize {
        target: presets::resolve("thailand").unwrap(),
    });

    let report = run_batch(
        &RustCodec::new(),
        staging.files(),
        &job,
        &mut emitter,
        &mut ledger,
        &CancelToken::new(),
        None,
    );

    assert!(report.is_clean());
    let resized = image::open(output.path().join("visa_resized.jpg")).unwrap();
    assert_eq!(resized.dimensions(), (350, 450));
}

#[test]
fn resized_output_content_matches_its_name() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let img = RgbImage::from_fn(20, 20, |x, y| image::Rgb([x as u8 * 10, y as u8 * 10, 0]));
    // PNG bytes behind a .jpg name
    img.save_with_format(input.path().join("photo.jpg"), image::ImageFormat::Png)
        .unwrap();

    let staging = stage(input.path());
    let mut emitter = DirectoryEmitter::new(output.path()).unwrap();
    let mut ledger = HistoryLedger::new();
    let job = BatchJob::new(BatchRequest::Resize {
        target: quickconvert::imaging::Dimensions::new(10, 10),
    });

    let report = run_batch(
        &RustCodec::new(),
        staging.files(),
        &job,
        &mut emitter,
        &mut ledger,
        &CancelToken::new(),
        None,
    );

    assert!(report.is_clean());
    let bytes = fs::read(output.path().join("photo_resized.jpg")).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(ledger.entries()[0].from_format, "jpg");
    assert_eq!(ledger.entries()[0].to_format, "jpg");
}

#[test]
fn corrupt_file_fails_alone() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_jpeg(&input.path().join("a.jpg"), 16, 16);
    fs::write(input.path().join("b.jpg"), b"definitely not a jpeg").unwrap();
    write_jpeg(&input.path().join("c.jpg"), 16, 16);

    let staging = stage(input.path());
    let mut emitter = DirectoryEmitter::new(output.path()).unwrap();
    let mut ledger = HistoryLedger::new();
    let job = BatchJob::new(BatchRequest::Convert {
        target: TargetFormat::Webp,
    });

    let report = run_batch(
        &RustCodec::new(),
        staging.files(),
        &job,
        &mut emitter,
        &mut ledger,
        &CancelToken::new(),
        None,
    );

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.results[1].outcome, FileOutcome::Failed(_)));
    assert!(output.path().join("a.webp").exists());
    assert!(!output.path().join("b.webp").exists());
    assert!(output.path().join("c.webp").exists());
    assert_eq!(ledger.len(), 2);
}

#[test]
fn repeated_batch_never_overwrites() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_jpeg(&input.path().join("photo.jpg"), 8, 8);

    let staging = stage(input.path());
    let mut emitter = DirectoryEmitter::new(output.path()).unwrap();
    let mut ledger = HistoryLedger::new();
    let job = BatchJob::new(BatchRequest::Convert {
        target: TargetFormat::Png,
    });

    for _ in 0..2 {
        run_batch(
            &RustCodec::new(),
            staging.files(),
            &job,
            &mut emitter,
            &mut ledger,
            &CancelToken::new(),
            None,
        );
    }

    assert!(output.path().join("photo.png").exists());
    assert!(output.path().join("photo (1).png").exists());
    let mut names: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["photo (1).png", "photo.png"]);
}
