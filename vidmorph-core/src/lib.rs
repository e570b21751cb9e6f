//! Core library for generating visually distinct variants of uploaded videos.
//!
//! Each variant runs the input through a randomised chain of ffmpeg
//! transforms (speed change, optional noise, three or four catalog picks and
//! an even-dimension repair). The batch driver numbers outputs sequentially
//! in the output directory and falls back to a plain stream copy when a
//! chain fails, so one bad transform never loses a variant.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidmorph_core::{BatchJob, CoreConfig, LogSink, MediaTools, Orientation, run_batch};
//! use vidmorph_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let config = CoreConfig::new();
//! config.validate().unwrap();
//!
//! let spawner = SidecarSpawner::new(config.stall_timeout);
//! let prober = CrateFfprobeExecutor::new();
//! let tools = MediaTools::new(&spawner, &prober, &config);
//!
//! let job = BatchJob::new("/uploads/job42", "/outputs", 3, Orientation::Horizontal);
//! let mut rng = StdRng::from_entropy();
//! let report = run_batch(tools, &job, &LogSink, &mut rng);
//! println!("{}", report.result.to_json().unwrap());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod notifications;
pub mod processing;
pub mod progress_reporting;
pub mod temp_files;
pub mod transforms;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, EncoderSettings, Orientation};
pub use discovery::{find_input_files, largest_numbered_output};
pub use error::{CoreError, CoreResult};
pub use external::{MediaInfo, MediaTools, check_dependency};
pub use notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
pub use processing::{
    BatchJob, BatchReport, JobResult, JobStatus, NumberedOutputs, PipelinePlan,
    generate_unique_variant, plan_variant, run_batch,
};
pub use progress_reporting::{ChannelSink, LogSink, NullSink, ProgressSink};
pub use temp_files::{create_temp_dir, create_temp_file, create_temp_file_path};
pub use transforms::{TransformKind, TransformStep, apply_step};
pub use utils::{format_duration, parse_ffmpeg_time};
