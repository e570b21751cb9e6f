// vidmorph-core/tests/batch_tests.rs

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use vidmorph_core::config::CoreConfig;
use vidmorph_core::external::MediaTools;
use vidmorph_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor, MockOutcome};
use vidmorph_core::processing::{BatchJob, JobResult, run_batch};
use vidmorph_core::{NullSink, Orientation};

// Helper to create a dummy file with some content
fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, b"dummy content").expect("Failed to write dummy file");
    file_path
}

struct Fixture {
    root: TempDir,
    config: CoreConfig,
}

impl Fixture {
    fn new() -> Self {
        let root = tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("in")).unwrap();
        let mut config = CoreConfig::new();
        config.temp_dir = Some(root.path().join("scratch"));
        Self { root, config }
    }

    fn input_dir(&self) -> PathBuf {
        self.root.path().join("in")
    }

    fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    fn job(&self, copies: u32) -> BatchJob {
        BatchJob::new(self.input_dir(), self.output_dir(), copies, Orientation::Horizontal)
    }

    fn numbered_outputs(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = fs::read_dir(self.output_dir())
            .map(|rd| {
                rd.filter_map(|e| e.ok()?.path().file_stem()?.to_str()?.parse().ok())
                    .collect()
            })
            .unwrap_or_default();
        numbers.sort_unstable();
        numbers
    }
}

fn files_of(result: &JobResult) -> Vec<String> {
    match result {
        JobResult::Success { files } => files.clone(),
        JobResult::Error { error } => panic!("expected success, got error: {error}"),
    }
}

#[test]
fn single_input_yields_consecutive_outputs() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(3), &NullSink, &mut StdRng::seed_from_u64(1));

    assert_eq!(files_of(&report.result), ["1.mp4", "2.mp4", "3.mp4"]);
    assert!(report.fallback_variants.is_empty());
    assert!(report.failed_variants.is_empty());
    for path in &report.outputs {
        assert!(fs::metadata(path).unwrap().len() > 0, "{} is empty", path.display());
    }
}

#[test]
fn numbering_continues_after_existing_outputs() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mov");
    fs::create_dir_all(fx.output_dir()).unwrap();
    create_dummy_file(&fx.output_dir(), "5.mp4");
    create_dummy_file(&fx.output_dir(), "12.mov");
    create_dummy_file(&fx.output_dir(), "cover.mp4");

    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(2), &NullSink, &mut StdRng::seed_from_u64(2));

    assert_eq!(files_of(&report.result), ["13.mp4", "14.mp4"]);
    assert_eq!(fx.numbered_outputs(), [5, 12, 13, 14]);
}

#[test]
fn repeated_batches_never_collide() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "a.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);
    let mut rng = StdRng::seed_from_u64(3);

    let first = run_batch(tools, &fx.job(2), &NullSink, &mut rng);
    let second = run_batch(tools, &fx.job(2), &NullSink, &mut rng);

    assert_eq!(files_of(&first.result), ["1.mp4", "2.mp4"]);
    assert_eq!(files_of(&second.result), ["3.mp4", "4.mp4"]);
}

#[test]
fn empty_input_dir_fails_without_outputs() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "notes.txt");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(2), &NullSink, &mut StdRng::seed_from_u64(4));

    assert_eq!(
        report.result,
        JobResult::Error { error: "No valid input files found".to_string() }
    );
    assert!(fx.numbered_outputs().is_empty());
    assert!(spawner.received_calls().is_empty());
}

#[test]
fn corrupt_input_is_skipped() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "broken.mp4");
    create_dummy_file(&fx.input_dir(), "good.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    prober.fail_matching("broken");
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(2), &NullSink, &mut StdRng::seed_from_u64(5));

    assert_eq!(files_of(&report.result), ["1.mp4", "2.mp4"]);
    assert_eq!(report.skipped_inputs.len(), 1);
    assert!(report.skipped_inputs[0].0.ends_with("broken.mp4"));
    assert_eq!(spawner.calls_matching("broken.mp4"), 0);
}

#[test]
fn only_corrupt_inputs_fail_the_job() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "broken.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    prober.fail_matching("broken");
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(1), &NullSink, &mut StdRng::seed_from_u64(6));

    assert_eq!(
        report.result,
        JobResult::Error { error: "No files were successfully processed".to_string() }
    );
}

#[test]
fn failing_chain_falls_back_to_stream_copy() {
    let fx = Fixture::new();
    let input = create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.set_default(MockOutcome::ExitFailure(1));
    spawner.on(&["copy"], MockOutcome::Success);
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(2), &NullSink, &mut StdRng::seed_from_u64(7));

    assert_eq!(files_of(&report.result), ["1.mp4", "2.mp4"]);
    assert_eq!(report.fallback_variants, [1, 2]);

    // The fallback copies the original upload, not the stripped working copy.
    let input_arg = input.to_string_lossy().into_owned();
    let fallback_calls = spawner
        .received_calls()
        .into_iter()
        .filter(|args| args.iter().any(|a| a == &input_arg) && args.last().is_some_and(|a| a.ends_with("1.mp4")))
        .count();
    assert_eq!(fallback_calls, 1);
}

#[test]
fn total_failure_reports_error_and_leaves_no_partial_files() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.set_default(MockOutcome::EmptyOutput);
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(2), &NullSink, &mut StdRng::seed_from_u64(8));

    assert!(!report.result.is_success());
    assert_eq!(report.failed_variants, [1, 2]);
    assert!(fx.numbered_outputs().is_empty());
}

#[test]
fn strip_failure_uses_original_input() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.on(&["-map_metadata", "-1"], MockOutcome::ExitFailure(1));
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(1), &NullSink, &mut StdRng::seed_from_u64(9));

    assert_eq!(files_of(&report.result), ["1.mp4"]);
    assert!(report.fallback_variants.is_empty());
    assert_eq!(spawner.calls_matching("clean_input"), 1);
}

#[test]
fn no_temporaries_survive_the_batch() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "a.mp4");
    create_dummy_file(&fx.input_dir(), "b.mov");
    let spawner = MockFfmpegSpawner::new();
    spawner.on(&["mov_text"], MockOutcome::ExitFailure(1));
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(3), &NullSink, &mut StdRng::seed_from_u64(10));
    assert_eq!(files_of(&report.result).len(), 6);

    let scratch = fx.config.temp_dir.clone().unwrap();
    let leftovers: Vec<_> = fs::read_dir(&scratch).unwrap().collect();
    assert!(leftovers.is_empty(), "leaked temporaries: {leftovers:?}");
}

#[test]
fn invalid_copy_count_is_an_error_result() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(6), &NullSink, &mut StdRng::seed_from_u64(11));

    assert!(!report.result.is_success());
    assert!(spawner.received_calls().is_empty());
}

#[test]
fn sink_sees_file_and_stage_progress() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);
    let messages = RefCell::new(Vec::new());
    let sink = |m: &str| messages.borrow_mut().push(m.to_string());

    let report = run_batch(tools, &fx.job(1), &sink, &mut StdRng::seed_from_u64(12));
    assert!(report.result.is_success());

    let messages = messages.into_inner();
    assert!(messages.iter().any(|m| m == "Processing file 1/1: clip.mp4"));
    assert!(messages.iter().any(|m| m == "Starting video speed change..."));
    assert!(messages.iter().any(|m| m.starts_with("Applying transformation 1/")));
    assert_eq!(messages.last().map(String::as_str), Some("Finalizing video..."));
}

#[test]
fn result_serialises_to_wire_shape() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(1), &NullSink, &mut StdRng::seed_from_u64(13));
    let json: serde_json::Value = serde_json::from_str(&report.result.to_json().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"status": "success", "files": ["1.mp4"]}));
}

#[test]
fn output_removed_before_verification_fails_the_job() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);
    let first_output = fx.output_dir().join("1.mp4");
    let sink = |m: &str| {
        if m.starts_with("Generating variant 2/2") {
            let _ = fs::remove_file(&first_output);
        }
    };

    let report = run_batch(tools, &fx.job(2), &sink, &mut StdRng::seed_from_u64(14));

    assert_eq!(
        report.result,
        JobResult::Error { error: "Some output files are missing or empty".to_string() }
    );
    assert_eq!(report.outputs.len(), 2);
}

#[test]
fn exhausted_numbering_fails_instead_of_wrapping() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    fs::create_dir_all(fx.output_dir()).unwrap();
    create_dummy_file(&fx.output_dir(), &format!("{}.mp4", u64::MAX));
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);

    let report = run_batch(tools, &fx.job(1), &NullSink, &mut StdRng::seed_from_u64(15));

    match &report.result {
        JobResult::Error { error } => assert!(error.contains("Output numbering exhausted"), "{error}"),
        other => panic!("expected error, got {other:?}"),
    }
    assert!(report.outputs.is_empty());
    assert_eq!(fx.numbered_outputs(), [u64::MAX]);
}

#[test]
fn unreadable_input_dir_names_the_cause() {
    let fx = Fixture::new();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);
    let missing = fx.root.path().join("missing");
    let job = BatchJob::new(missing, fx.output_dir(), 1, Orientation::Horizontal);

    let report = run_batch(tools, &job, &NullSink, &mut StdRng::seed_from_u64(16));

    match &report.result {
        JobResult::Error { error } => {
            assert!(error.starts_with("Cannot read input directory"), "{error}");
            assert!(error.contains("missing"), "{error}");
        }
        other => panic!("expected error, got {other:?}"),
    }
    assert!(spawner.received_calls().is_empty());
}

#[test]
fn sink_hears_about_variants_lost_entirely() {
    let fx = Fixture::new();
    create_dummy_file(&fx.input_dir(), "clip.mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.set_default(MockOutcome::EmptyOutput);
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &fx.config);
    let messages = RefCell::new(Vec::new());
    let sink = |m: &str| messages.borrow_mut().push(m.to_string());

    let report = run_batch(tools, &fx.job(1), &sink, &mut StdRng::seed_from_u64(17));
    assert_eq!(report.failed_variants, [1]);

    let messages = messages.into_inner();
    assert!(
        messages.iter().any(|m| m.starts_with("Variant 1 of clip.mp4 failed:")),
        "{messages:?}"
    );
}
