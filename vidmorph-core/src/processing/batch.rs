// ============================================================================
// vidmorph-core/src/processing/batch.rs
// ============================================================================
//
// BATCH DRIVER: Numbered Variants for Every Input in a Directory
//
// Runs one job end to end and always produces a terminal JobResult. Stage and
// variant errors are converted into fallbacks here; nothing escapes as Err.
//
// WORKFLOW:
// 1. Create the output directory and read the highest existing number
// 2. Find .mp4/.mov inputs (none => "No valid input files found")
// 3. Per input: probe (skip on failure), best-effort metadata strip
// 4. Per copy: next number, run the orchestrator, stream-copy on failure
// 5. Re-verify every recorded output before reporting success

use crate::config::Orientation;
use crate::config::{MAX_COPIES, MIN_COPIES};
use crate::discovery::{find_input_files, largest_numbered_output};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaTools, stream_copy};
use crate::processing::pipeline::generate_unique_variant;
use crate::processing::status::{JobResult, JobTracker};
use crate::progress_reporting::ProgressSink;
use crate::temp_files;
use crate::transforms::non_destructive::strip_metadata;
use crate::utils::{format_duration, get_filename_safe, is_nonempty_file};

use log::{error, info, warn};
use rand::Rng;
use tempfile::TempDir;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One submission: every input in `input_dir` gets `copies` variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub copies: u32,
    pub orientation: Orientation,
}

impl BatchJob {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        copies: u32,
        orientation: Orientation,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            copies,
            orientation,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(MIN_COPIES..=MAX_COPIES).contains(&self.copies) {
            return Err(CoreError::Config(format!(
                "copies must be between {MIN_COPIES} and {MAX_COPIES}, got {}",
                self.copies
            )));
        }
        if self.input_dir.as_os_str().is_empty() || self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "input and output directories must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// The output directory's numeric counter, owned by one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedOutputs {
    dir: PathBuf,
    largest: u64,
}

impl NumberedOutputs {
    /// Reads the highest numeric stem already present in `dir`.
    pub fn scan(dir: &Path) -> CoreResult<Self> {
        let largest = largest_numbered_output(dir)?;
        Ok(Self::starting_from(dir, largest))
    }

    #[must_use]
    pub fn starting_from(dir: &Path, largest: u64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            largest,
        }
    }

    #[must_use]
    pub fn largest(&self) -> u64 {
        self.largest
    }

    /// Claims the next number and returns `{n}.mp4` inside the directory.
    ///
    /// # Errors
    ///
    /// `CoreError::PathError` once the counter cannot grow any further;
    /// numbers are never reused.
    pub fn next_path(&mut self) -> CoreResult<(u64, PathBuf)> {
        let next = self.largest.checked_add(1).ok_or_else(|| {
            CoreError::PathError(format!(
                "Output numbering exhausted in {}: {} is already taken",
                self.dir.display(),
                self.largest
            ))
        })?;
        self.largest = next;
        Ok((next, self.dir.join(format!("{next}.mp4"))))
    }
}

/// Everything a batch did, plus the terminal wire result.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub result: JobResult,
    pub outputs: Vec<PathBuf>,
    /// Inputs that could not be probed, with the reason.
    pub skipped_inputs: Vec<(PathBuf, String)>,
    /// Variant numbers that produced nothing, not even a fallback copy.
    pub failed_variants: Vec<u64>,
    /// Variant numbers written by the stream-copy fallback.
    pub fallback_variants: Vec<u64>,
    pub elapsed: Duration,
}

impl BatchReport {
    fn new(result: JobResult, start: Instant) -> Self {
        Self {
            result,
            outputs: Vec::new(),
            skipped_inputs: Vec::new(),
            failed_variants: Vec::new(),
            fallback_variants: Vec::new(),
            elapsed: start.elapsed(),
        }
    }
}

/// Source the variants of one input are generated from.
///
/// Holds the scratch dir of a stripped copy alive for as long as it is used.
struct PreparedInput {
    path: PathBuf,
    _scratch: Option<TempDir>,
}

/// Best-effort metadata strip; any failure falls back to `original`.
fn prepare_input<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    original: &Path,
) -> PreparedInput {
    let fallback = || PreparedInput {
        path: original.to_path_buf(),
        _scratch: None,
    };

    let scratch = match temp_files::create_temp_dir(tools.config, "clean") {
        Ok(dir) => dir,
        Err(e) => {
            warn!("No scratch dir for metadata strip, using original: {e}");
            return fallback();
        }
    };
    let clean = scratch.path().join("clean_input.mp4");

    if let Err(e) = strip_metadata(tools, original, &clean) {
        warn!("Metadata strip failed for {}, using original: {e}", original.display());
        return fallback();
    }
    if let Err(e) = tools.prober.probe(&clean) {
        warn!("Stripped copy of {} is unusable, using original: {e}", original.display());
        return fallback();
    }

    PreparedInput {
        path: clean,
        _scratch: Some(scratch),
    }
}

/// Copies the original input straight to `output`; removes any partial file on failure.
fn fallback_copy<S: FfmpegSpawner>(spawner: &S, original: &Path, output: &Path) -> CoreResult<()> {
    let result = stream_copy(spawner, original, output, "fallback stream copy").and_then(|()| {
        if is_nonempty_file(output) {
            Ok(())
        } else {
            Err(CoreError::Encode("fallback copy produced an empty file".to_string()))
        }
    });
    if result.is_err() && output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("Failed to remove partial fallback output {}: {e}", output.display());
        }
    }
    result
}

fn verify_outputs(outputs: &[PathBuf]) -> CoreResult<()> {
    let missing: Vec<String> = outputs
        .iter()
        .filter(|p| !is_nonempty_file(p))
        .map(|p| p.display().to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Verification(format!(
            "missing or empty outputs: {}",
            missing.join(", ")
        )))
    }
}

/// Runs one batch job to its terminal result.
///
/// Never returns an error: every failure is folded into `BatchReport::result`.
pub fn run_batch<S, P, R>(
    tools: MediaTools<'_, S, P>,
    job: &BatchJob,
    sink: &dyn ProgressSink,
    rng: &mut R,
) -> BatchReport
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    R: Rng + ?Sized,
{
    let start = Instant::now();
    let tracker = JobTracker::new(sink);

    if let Err(e) = job.validate() {
        return BatchReport::new(tracker.fail(e.to_string()), start);
    }

    tracker.processing("Preparing output directory...");
    if let Err(e) = std::fs::create_dir_all(&job.output_dir) {
        let message = format!("Cannot create output directory {}: {e}", job.output_dir.display());
        return BatchReport::new(tracker.fail(message), start);
    }

    let mut numbers = match NumberedOutputs::scan(&job.output_dir) {
        Ok(numbers) => numbers,
        Err(e) => {
            let message = format!("Cannot read output directory {}: {e}", job.output_dir.display());
            return BatchReport::new(tracker.fail(message), start);
        }
    };
    info!(
        "Output numbering continues after {} in {}",
        numbers.largest(),
        job.output_dir.display()
    );

    let inputs = match find_input_files(&job.input_dir) {
        Ok(inputs) => inputs,
        Err(CoreError::NoInputFiles) => {
            return BatchReport::new(tracker.fail(CoreError::NoInputFiles.to_string()), start);
        }
        Err(e) => {
            let message = format!("Cannot read input directory {}: {e}", job.input_dir.display());
            return BatchReport::new(tracker.fail(message), start);
        }
    };

    let mut report = BatchReport::new(JobResult::Error { error: String::new() }, start);

    for (index, input) in inputs.iter().enumerate() {
        let name = input.file_name().map_or_else(
            || input.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        tracker.processing(&format!("Processing file {}/{}: {name}", index + 1, inputs.len()));

        if let Err(e) = tools.prober.probe(input) {
            warn!("Skipping {}: {e}", input.display());
            tracker.processing(&format!("Skipping unreadable file {name}"));
            report.skipped_inputs.push((input.clone(), e.to_string()));
            continue;
        }

        let prepared = prepare_input(tools, input);

        for copy in 1..=job.copies {
            let (number, output) = match numbers.next_path() {
                Ok(next) => next,
                Err(e) => {
                    error!("{e}");
                    report.elapsed = start.elapsed();
                    report.result = tracker.fail(e.to_string());
                    return report;
                }
            };
            tracker.processing(&format!(
                "Generating variant {copy}/{} of {name} as {number}.mp4",
                job.copies
            ));

            match generate_unique_variant(tools, &prepared.path, &output, job.orientation, &tracker, rng) {
                Ok(path) => report.outputs.push(path),
                Err(e) => {
                    warn!("Variant {number} failed ({e}), falling back to a stream copy");
                    tracker.processing(&format!("Variant {number} failed, copying original..."));
                    match fallback_copy(tools.spawner, input, &output) {
                        Ok(()) => {
                            report.fallback_variants.push(number);
                            report.outputs.push(output);
                        }
                        Err(copy_err) => {
                            error!("Variant {number} of {name} failed: {copy_err}");
                            tracker.processing(&format!("Variant {number} of {name} failed: {copy_err}"));
                            report.failed_variants.push(number);
                        }
                    }
                }
            }
        }
    }

    report.elapsed = start.elapsed();
    report.result = if report.outputs.is_empty() {
        tracker.fail("No files were successfully processed")
    } else if let Err(e) = verify_outputs(&report.outputs) {
        error!("{e}");
        tracker.fail("Some output files are missing or empty")
    } else {
        let files: CoreResult<Vec<String>> =
            report.outputs.iter().map(|p| get_filename_safe(p)).collect();
        match files {
            Ok(files) => {
                info!(
                    "Batch finished: {} output(s), {} fallback(s), {} failure(s) in {}",
                    files.len(),
                    report.fallback_variants.len(),
                    report.failed_variants.len(),
                    format_duration(report.elapsed.as_secs_f64())
                );
                tracker.succeed(files)
            }
            Err(e) => tracker.fail(e.to_string()),
        }
    };
    report
}
