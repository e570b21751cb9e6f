// vidmorph-core/tests/pipeline_tests.rs

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};
use vidmorph_core::config::CoreConfig;
use vidmorph_core::error::CoreError;
use vidmorph_core::external::MediaTools;
use vidmorph_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor, MockOutcome};
use vidmorph_core::processing::{execute_plan, generate_unique_variant, plan_variant};
use vidmorph_core::transforms::{TransformKind, TransformStep};
use vidmorph_core::{NullSink, Orientation};

fn setup() -> (TempDir, PathBuf, CoreConfig) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("upload.mp4");
    fs::write(&input, b"dummy content").unwrap();
    let mut config = CoreConfig::new();
    config.temp_dir = Some(dir.path().join("scratch"));
    (dir, input, config)
}

fn scratch_is_empty(config: &CoreConfig) -> bool {
    let scratch = config.temp_dir.clone().unwrap();
    fs::read_dir(scratch).map(|rd| rd.count() == 0).unwrap_or(true)
}

#[test]
fn variant_is_written_and_temporaries_are_reclaimed() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);
    let output = dir.path().join("1.mp4");

    let written = generate_unique_variant(
        tools,
        &input,
        &output,
        Orientation::Vertical,
        &NullSink,
        &mut StdRng::seed_from_u64(21),
    )
    .unwrap();

    assert_eq!(written, output);
    assert!(fs::metadata(&output).unwrap().len() > 0);
    assert!(scratch_is_empty(&config));
    // Input is only read, never replaced.
    assert_eq!(fs::read(&input).unwrap(), b"dummy content");
}

#[test]
fn every_stage_input_is_probed() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);

    let mut rng = StdRng::seed_from_u64(22);
    let plan = plan_variant(&mut rng, Orientation::Horizontal, 0.5);
    execute_plan(tools, &plan, &input, &dir.path().join("1.mp4"), &NullSink).unwrap();

    let probed = prober.received_calls();
    assert_eq!(probed.len(), plan.steps().len());
    assert_eq!(probed[0], input);
}

#[test]
fn stage_messages_follow_the_plan() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);

    let mut rng = StdRng::seed_from_u64(23);
    let plan = plan_variant(&mut rng, Orientation::Horizontal, 1.0);
    let messages = RefCell::new(Vec::new());
    let sink = |m: &str| messages.borrow_mut().push(m.to_string());

    execute_plan(tools, &plan, &input, &dir.path().join("1.mp4"), &sink).unwrap();

    let messages = messages.into_inner();
    let k = plan.pool_steps().len();
    assert_eq!(messages.len(), plan.steps().len());
    assert_eq!(messages[0], "Starting video speed change...");
    assert_eq!(messages[1], "Applying random noise...");
    for (i, step) in plan.pool_steps().iter().enumerate() {
        assert_eq!(
            messages[2 + i],
            format!("Applying transformation {}/{k}: {}...", i + 1, step.name())
        );
    }
    assert_eq!(messages.last().unwrap(), "Finalizing video...");
}

#[test]
fn failed_stage_aborts_without_output() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    spawner.on(&["atempo"], MockOutcome::ExitFailure(1));
    spawner.on(&["setpts"], MockOutcome::ExitFailure(1));
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);
    let output = dir.path().join("1.mp4");

    let err = generate_unique_variant(
        tools,
        &input,
        &output,
        Orientation::Horizontal,
        &NullSink,
        &mut StdRng::seed_from_u64(24),
    )
    .unwrap_err();

    assert!(err.is_encode_error(), "unexpected error: {err}");
    assert!(!output.exists());
    assert_eq!(spawner.received_calls().len(), 1);
    assert!(scratch_is_empty(&config));
}

#[test]
fn stalled_encoder_aborts_the_variant() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    spawner.on(&["setpts"], MockOutcome::Stall);
    let prober = MockFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);

    let err = generate_unique_variant(
        tools,
        &input,
        &dir.path().join("1.mp4"),
        Orientation::Horizontal,
        &NullSink,
        &mut StdRng::seed_from_u64(25),
    )
    .unwrap_err();

    assert!(matches!(err, CoreError::Stalled(..)));
}

#[test]
fn unprobeable_intermediate_aborts_with_probe_error() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new();
    prober.fail_matching("stage01");
    let tools = MediaTools::new(&spawner, &prober, &config);
    let output = dir.path().join("1.mp4");

    let err = generate_unique_variant(
        tools,
        &input,
        &output,
        Orientation::Horizontal,
        &NullSink,
        &mut StdRng::seed_from_u64(26),
    )
    .unwrap_err();

    assert!(err.is_probe_error());
    assert!(!output.exists());
}

#[test]
fn failed_repair_removes_partial_output() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::with_default(MockFfprobeExecutor::info(853, 481));
    spawner.on(&["2*ceil(iw/2)"], MockOutcome::EmptyOutput);
    let tools = MediaTools::new(&spawner, &prober, &config);
    let output = dir.path().join("1.mp4");

    let err = generate_unique_variant(
        tools,
        &input,
        &output,
        Orientation::Horizontal,
        &NullSink,
        &mut StdRng::seed_from_u64(27),
    )
    .unwrap_err();

    assert!(err.is_encode_error());
    assert!(!output.exists());
}

#[test]
fn odd_dimensions_are_repaired_at_the_end() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::with_default(MockFfprobeExecutor::info(853, 481));
    let tools = MediaTools::new(&spawner, &prober, &config);
    let output = dir.path().join("1.mp4");

    generate_unique_variant(
        tools,
        &input,
        &output,
        Orientation::Horizontal,
        &NullSink,
        &mut StdRng::seed_from_u64(28),
    )
    .unwrap();

    let calls = spawner.received_calls();
    let last = calls.last().unwrap();
    assert!(last.iter().any(|a| a.contains("2*ceil(iw/2)")));
    assert_eq!(last.last().map(PathBuf::from), Some(output));
}

#[test]
fn orientation_sets_target_resolution() {
    let (dir, input, config) = setup();
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::with_default(MockFfprobeExecutor::info(640, 360));
    let tools = MediaTools::new(&spawner, &prober, &config);

    for kind in [TransformKind::ResolutionChange, TransformKind::Padding] {
        let step = kind.draw(&mut StdRng::seed_from_u64(2), Orientation::Vertical);
        assert!(matches!(
            step,
            TransformStep::ResolutionChange { width: 1080, height: 1920 }
                | TransformStep::Padding { width: 1080, height: 1920 }
        ));
    }

    let mut rng = StdRng::seed_from_u64(29);
    let plan = plan_variant(&mut rng, Orientation::Vertical, 0.0);
    execute_plan(tools, &plan, &input, &dir.path().join("1.mp4"), &NullSink).unwrap();
    for step in plan.steps() {
        match step {
            TransformStep::ResolutionChange { width, height } | TransformStep::Padding { width, height } => {
                assert_eq!((*width, *height), (1080, 1920));
            }
            _ => {}
        }
    }
}
