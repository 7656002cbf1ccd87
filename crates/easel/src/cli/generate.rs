//! The `easel generate` command: batch submission with live progress.
//!
//! This is the presentation side of the job engine. Each spawned job gets
//! its own progress bar fed from its event stream; jobs race freely and the
//! bars update independently. Result URLs go to stdout, everything else to
//! stderr.

use clap::Args;
use console::style;
use easel_core::store::payload;
use easel_core::{
    Config, GenerationRequest, HttpTransport, ImageStore, JobEvent, JobId, JobRegistry,
    RetryPolicy,
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompt text for the generation
    pub prompt: String,

    /// Reference image file to attach, in order (repeatable)
    #[arg(short = 'i', long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Number of jobs to submit in parallel
    #[arg(short, long)]
    pub batch: Option<u32>,

    /// Model identifier override
    #[arg(long)]
    pub model: Option<String>,

    /// Aspect ratio override (e.g. "16:9")
    #[arg(long)]
    pub aspect_ratio: Option<String>,

    /// Output size override (e.g. "2k")
    #[arg(long)]
    pub image_size: Option<String>,

    /// API base URL override
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key override
    #[arg(long, env = "EASEL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Retry failed jobs automatically with exponential backoff
    #[arg(long)]
    pub auto_retry: bool,

    /// Cap on automatic retries per job
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Skip the confirmation prompt for large batches
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    // Required inputs are rejected here, before any job is created.
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());
    if base_url.trim().is_empty() {
        anyhow::bail!("No API base URL configured. Set [api].base_url or pass --base-url.");
    }
    let Some(api_key) = args.api_key.clone().or_else(|| config.api_key()) else {
        anyhow::bail!("No API key configured. Run `easel config set-key` or pass --api-key.");
    };
    let prompt = args.prompt.trim().to_string();
    if prompt.is_empty() {
        anyhow::bail!("Prompt must not be empty.");
    }

    let batch = args.batch.unwrap_or(config.defaults.batch_count).max(1);
    if batch > 10 && !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Really submit {batch} requests?"))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    // Attach reference images. One unreadable or malformed file warns and
    // the rest of the batch proceeds.
    let mut store = ImageStore::new();
    let mut rejected = 0usize;
    for path in &args.images {
        match attach_image(&mut store, path) {
            Ok(fp) => {
                tracing::debug!(
                    file = %path.display(),
                    fingerprint = &fp[..8],
                    "Attached reference image",
                );
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!(file = %path.display(), error = %e, "Skipping reference image");
            }
        }
    }
    if rejected > 0 {
        eprintln!(
            "{} {rejected} reference image(s) could not be attached",
            style("warning:").yellow().bold()
        );
    }

    // Resolve the selection once; every job and every retry reuses this
    // snapshot rather than re-reading the selection.
    let reference_images = store.resolve_selection().unwrap_or_default();
    let params = GenerationRequest {
        model: args
            .model
            .clone()
            .unwrap_or_else(|| config.defaults.model.clone()),
        prompt,
        aspect_ratio: args
            .aspect_ratio
            .clone()
            .unwrap_or_else(|| config.defaults.aspect_ratio.clone()),
        image_size: args
            .image_size
            .clone()
            .unwrap_or_else(|| config.defaults.image_size.clone()),
        reference_images,
        id: None,
    };
    let policy = RetryPolicy {
        auto_retry: args.auto_retry || config.retry.auto_retry,
        max_retries: args.max_retries.or(config.retry.max_retries),
    };

    let mut transport = HttpTransport::new(&base_url, &api_key);
    if let Some(timeout_ms) = config.limits.request_timeout_ms {
        transport = transport.with_request_timeout(Duration::from_millis(timeout_ms));
    }
    let mut registry = JobRegistry::new(Arc::new(transport));

    tracing::info!(
        batch,
        images = params.reference_images.len(),
        model = %params.model,
        aspect_ratio = %params.aspect_ratio,
        image_size = %params.image_size,
        "Submitting generation batch",
    );

    // Fire the whole batch without waiting on any single job; each watcher
    // drives one bar from its own event stream.
    let multi = MultiProgress::new();
    let mut watchers = tokio::task::JoinSet::new();
    for _ in 0..batch {
        let (id, events) = registry.spawn(params.clone(), policy.clone());
        let bar = multi.add(ProgressBar::new(100));
        bar.set_style(job_style());
        bar.set_prefix(format!("job {id}"));
        watchers.spawn(watch_job(id, events, bar));
    }

    let mut succeeded: Vec<String> = Vec::new();
    let mut failed: Vec<(JobId, String)> = Vec::new();
    while let Some(result) = watchers.join_next().await {
        match result? {
            (_id, Ok(url)) => succeeded.push(url),
            (id, Err(message)) => failed.push((id, message)),
        }
    }
    registry.dispose_all();

    print_summary(&succeeded, &failed);
    if succeeded.is_empty() && !failed.is_empty() {
        anyhow::bail!("All {} job(s) failed", failed.len());
    }
    Ok(())
}

/// Read one file and attach it to the selection. Returns the fingerprint.
fn attach_image(store: &mut ImageStore, path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    Ok(store.add(&payload::from_bytes(&bytes, &format))?)
}

/// Project one job's event stream onto its progress bar.
///
/// Returns once the job reaches a terminal state with no retry pending.
async fn watch_job(
    id: JobId,
    mut events: mpsc::UnboundedReceiver<JobEvent>,
    bar: ProgressBar,
) -> (JobId, Result<String, String>) {
    loop {
        let Some(event) = events.recv().await else {
            bar.finish_with_message("disposed");
            return (id, Err("job ended without a result".to_string()));
        };
        match event {
            JobEvent::AttemptStarted { attempt } => {
                bar.set_position(0);
                if attempt == 0 {
                    bar.set_message("submitting...");
                } else {
                    bar.set_message(format!("retrying (attempt {attempt})..."));
                }
            }
            JobEvent::ElapsedTick { elapsed } => {
                bar.set_message(format!("{:.1}s", elapsed.as_secs_f64()));
            }
            JobEvent::Progress { percent } => {
                bar.set_position(percent.clamp(0.0, 100.0) as u64);
            }
            JobEvent::Succeeded { url, elapsed } => {
                bar.finish_with_message(format!(
                    "{} in {:.1}s",
                    style("done").green(),
                    elapsed.as_secs_f64()
                ));
                return (id, Ok(url));
            }
            JobEvent::Failed { message, will_retry } => {
                if will_retry {
                    bar.set_message(format!("{}: {message}", style("failed").red()));
                } else {
                    bar.finish_with_message(format!("{}: {message}", style("failed").red()));
                    return (id, Err(message));
                }
            }
            JobEvent::CountdownStarted {
                next_attempt,
                delay_secs,
            } => {
                bar.set_position(0);
                bar.set_message(format!("retry {next_attempt} in {delay_secs}s"));
            }
            JobEvent::CountdownTick { remaining_secs } => {
                bar.set_message(format!("retrying in {remaining_secs}s"));
            }
            JobEvent::CountdownCancelled => {
                bar.set_message("retry cancelled");
            }
        }
    }
}

/// Progress bar style shared by all job bars.
fn job_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:>8} {spinner:.green} [{bar:30.cyan/blue}] {percent:>3}% {msg}")
        .unwrap()
        .progress_chars("##-")
}

/// Print a formatted summary after the batch settles.
fn print_summary(succeeded: &[String], failed: &[(JobId, String)]) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded.len());
    if !failed.is_empty() {
        eprintln!("    Failed:       {:>8}", failed.len());
    }
    eprintln!();

    // Result URLs go to stdout so they can be piped.
    for url in succeeded {
        println!("{url}");
    }
    for (id, message) in failed {
        eprintln!("  {} job {id}: {message}", style("x").red());
    }
}
