// ============================================================================
// vidmorph-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE ORCHESTRATOR: One Randomised Variant per Call
//
// Plans a chain of catalog transforms and runs it file-to-file through
// scoped temporaries, ending at the requested output path.
//
// KEY COMPONENTS:
// - plan_variant: draws the ordered step list without touching any file
// - generate_unique_variant: plans and executes one variant
// - execute_plan: runs a plan, reporting each stage to the progress sink
// - OutputGuard: removes a partially written final output on failure
//
// WORKFLOW:
// 1. speed-change (always first)
// 2. random-noise with the configured probability
// 3. three or four distinct transforms drawn from the pool, in drawn order
// 4. even-dimension repair (always last) into the final output path
// 5. the final output must exist and be non-empty
//
// Any stage failure aborts the run; the batch driver decides what to do next.

use crate::config::Orientation;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaInfo, MediaTools};
use crate::progress_reporting::ProgressSink;
use crate::temp_files;
use crate::transforms::{TransformKind, TransformStep, apply_step};
use crate::utils::is_nonempty_file;

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Possible sizes of the random middle section.
pub const RANDOM_STAGE_COUNTS: [usize; 2] = [3, 4];

/// Ordered steps of one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    steps: Vec<TransformStep>,
}

impl PipelinePlan {
    #[must_use]
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Whether the optional noise stage was drawn.
    #[must_use]
    pub fn has_noise(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.kind() == TransformKind::RandomNoise)
    }

    /// The steps drawn from the random pool, in execution order.
    #[must_use]
    pub fn pool_steps(&self) -> Vec<&TransformStep> {
        self.steps
            .iter()
            .filter(|s| !is_fixed_stage(s.kind()))
            .collect()
    }
}

fn is_fixed_stage(kind: TransformKind) -> bool {
    matches!(
        kind,
        TransformKind::SpeedChange | TransformKind::RandomNoise | TransformKind::EvenRepair
    )
}

/// Draws the step list for one variant.
pub fn plan_variant<R: Rng + ?Sized>(
    rng: &mut R,
    orientation: Orientation,
    noise_probability: f64,
) -> PipelinePlan {
    let mut steps = vec![TransformKind::SpeedChange.draw(rng, orientation)];

    let noise_probability = if noise_probability.is_finite() {
        noise_probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if rng.gen_bool(noise_probability) {
        steps.push(TransformKind::RandomNoise.draw(rng, orientation));
    }

    let count = RANDOM_STAGE_COUNTS[rng.gen_range(0..RANDOM_STAGE_COUNTS.len())];
    let mut pool = TransformKind::POOL.to_vec();
    pool.shuffle(rng);
    for kind in pool.into_iter().take(count) {
        steps.push(kind.draw(rng, orientation));
    }

    steps.push(TransformKind::EvenRepair.draw(rng, orientation));
    PipelinePlan { steps }
}

/// Deletes the final output on drop unless the run committed it.
pub struct OutputGuard {
    path: PathBuf,
    committed: bool,
}

impl OutputGuard {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            committed: false,
        }
    }

    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.path.clone()
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed || !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial output {}", self.path.display()),
            Err(e) => warn!("Failed to remove partial output {}: {e}", self.path.display()),
        }
    }
}

/// Plans and produces one variant of `input` at `output`.
///
/// # Errors
///
/// The first stage error (probe or encode); nothing is left at `output`.
pub fn generate_unique_variant<S, P, R>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
    orientation: Orientation,
    sink: &dyn ProgressSink,
    rng: &mut R,
) -> CoreResult<PathBuf>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    R: Rng + ?Sized,
{
    let plan = plan_variant(rng, orientation, tools.config.noise_probability);
    info!(
        "Variant plan for {}: {}",
        input.display(),
        plan.steps()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    execute_plan(tools, &plan, input, output, sink)
}

/// Status line reported before each stage.
fn stage_message(step: &TransformStep, pool_index: usize, pool_total: usize) -> String {
    match step.kind() {
        TransformKind::SpeedChange => "Starting video speed change...".to_string(),
        TransformKind::RandomNoise => "Applying random noise...".to_string(),
        TransformKind::EvenRepair => "Finalizing video...".to_string(),
        kind => format!("Applying transformation {pool_index}/{pool_total}: {kind}..."),
    }
}

/// Refuses to run a stage on an empty or unprobeable file.
fn verify_stage_input<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    path: &Path,
) -> CoreResult<MediaInfo> {
    if !is_nonempty_file(path) {
        return Err(CoreError::probe(path, "stage input is missing or empty"));
    }
    tools.prober.probe(path)
}

/// Runs every step of `plan`, chaining outputs through a scoped temp dir.
pub fn execute_plan<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    plan: &PipelinePlan,
    input: &Path,
    output: &Path,
    sink: &dyn ProgressSink,
) -> CoreResult<PathBuf> {
    let start = Instant::now();
    let work_dir = temp_files::create_temp_dir(tools.config, "variant")?;
    let guard = OutputGuard::new(output);

    let steps = plan.steps();
    let pool_total = plan.pool_steps().len();
    let mut pool_index = 0;
    let mut current = input.to_path_buf();

    for (position, step) in steps.iter().enumerate() {
        if !is_fixed_stage(step.kind()) {
            pool_index += 1;
        }
        let message = stage_message(step, pool_index, pool_total);
        sink.report(&message);
        info!("[{}/{}] {step}", position + 1, steps.len());

        let info = verify_stage_input(tools, &current)?;
        let target = if position + 1 == steps.len() {
            output.to_path_buf()
        } else {
            temp_files::create_temp_file_path(work_dir.path(), &format!("stage{:02}", position + 1), "mp4")
        };

        let written = apply_step(tools, step, &current, &info, &target)?;

        if current != input {
            if let Err(e) = std::fs::remove_file(&current) {
                debug!("Could not remove intermediate {}: {e}", current.display());
            }
        }
        current = written;
    }

    if current != output || !is_nonempty_file(output) {
        return Err(CoreError::Encode("generated file missing or empty".to_string()));
    }

    info!(
        "Variant written to {} in {:.1}s",
        output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(guard.commit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn plan_shape_holds_for_many_seeds() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = plan_variant(&mut rng, Orientation::Horizontal, 0.5);
            let steps = plan.steps();

            assert_eq!(steps.first().map(TransformStep::kind), Some(TransformKind::SpeedChange));
            assert_eq!(steps.last().map(TransformStep::kind), Some(TransformKind::EvenRepair));

            let pool = plan.pool_steps();
            assert!(pool.len() == 3 || pool.len() == 4, "seed {seed}: {}", pool.len());
            let distinct: HashSet<_> = pool.iter().map(|s| s.kind()).collect();
            assert_eq!(distinct.len(), pool.len());
            assert!(pool.iter().all(|s| TransformKind::POOL.contains(&s.kind())));

            let expected_len = 2 + pool.len() + usize::from(plan.has_noise());
            assert_eq!(steps.len(), expected_len);
            if plan.has_noise() {
                assert_eq!(steps[1].kind(), TransformKind::RandomNoise);
            }
        }
    }

    #[test]
    fn noise_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert!(!plan_variant(&mut rng, Orientation::Vertical, 0.0).has_noise());
            assert!(plan_variant(&mut rng, Orientation::Vertical, 1.0).has_noise());
        }
        assert!(!plan_variant(&mut rng, Orientation::Vertical, f64::NAN).has_noise());
    }

    #[test]
    fn same_seed_same_plan() {
        let a = plan_variant(&mut StdRng::seed_from_u64(42), Orientation::Horizontal, 0.5);
        let b = plan_variant(&mut StdRng::seed_from_u64(42), Orientation::Horizontal, 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn stage_messages() {
        let speed = TransformStep::SpeedChange { factor: 1.0 };
        assert_eq!(stage_message(&speed, 0, 3), "Starting video speed change...");
        assert_eq!(
            stage_message(&TransformStep::Mirror, 2, 4),
            "Applying transformation 2/4: mirror..."
        );
        assert_eq!(stage_message(&TransformStep::EvenRepair, 4, 4), "Finalizing video...");
    }

    #[test]
    fn output_guard_removes_uncommitted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.mp4");

        std::fs::write(&path, b"partial").unwrap();
        drop(OutputGuard::new(&path));
        assert!(!path.exists());

        std::fs::write(&path, b"complete").unwrap();
        let kept = OutputGuard::new(&path).commit();
        assert!(kept.exists());
    }
}
