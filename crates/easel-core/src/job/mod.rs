//! The per-job generation lifecycle.
//!
//! One spawned task per job drives a single remote generation call through
//! submission, response consumption and terminal classification, then runs
//! the auto-retry countdown on failure. Observers consume [`JobEvent`]s;
//! user affordances arrive as [`JobCommand`]s. Rendering is a projection of
//! these events and never drives transitions itself.
//!
//! Jobs are mutually independent: a batch submission spawns N tasks that
//! race freely and complete in any order. Every timer (elapsed display,
//! countdown) is owned by the task and dies with it on any exit path.

pub mod backoff;
pub mod outcome;
pub mod registry;
pub mod transport;

pub use backoff::RetryPolicy;
pub use registry::{JobHandle, JobId, JobRegistry};
pub use transport::{ByteStream, HttpTransport, Transport, TransportResponse};

use crate::error::JobError;
use crate::stream::StreamDecoder;
use crate::types::{GenerationRequest, ServerEvent};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Instant};

/// Cadence of the live duration counter.
const ELAPSED_TICK: Duration = Duration::from_millis(100);

/// Lifecycle phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Request is being submitted; response headers not yet received.
    Submitting,
    /// Response arrived and is being consumed (document or stream).
    Responding,
    /// Terminal success.
    Succeeded,
    /// Terminal failure, halted until a user action or disposal.
    Failed,
    /// Terminal failure with an auto-retry countdown pending.
    Backoff,
}

/// Observable state changes emitted by a job task.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A new attempt is being submitted. `attempt` counts retries taken so
    /// far in this chain (0 = the original submission).
    AttemptStarted { attempt: u32 },

    /// Live wall-clock duration since the current attempt began.
    ElapsedTick { elapsed: Duration },

    /// Progress percentage as received; values may move backwards and are
    /// rendered as-is.
    Progress { percent: f64 },

    /// Terminal success carrying the first generated image.
    Succeeded { url: String, elapsed: Duration },

    /// Terminal failure. When `will_retry` is set a countdown follows;
    /// otherwise the job halts awaiting a user action.
    Failed { message: String, will_retry: bool },

    /// An auto-retry countdown began for the given upcoming attempt.
    CountdownStarted { next_attempt: u32, delay_secs: u64 },

    /// One second elapsed on the countdown.
    CountdownTick { remaining_secs: u64 },

    /// The countdown was cancelled; the job is halted awaiting user action.
    CountdownCancelled,
}

/// User affordances on a live job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    /// Retry now. During a countdown this skips the remaining wait; from a
    /// halted failure it is a manual retry; after a success it regenerates
    /// with the bound parameters, including the server id.
    Retry,

    /// Disable auto-retry. During a countdown this also clears the pending
    /// timer and resets the attempt counter to 0.
    CancelAutoRetry,

    /// Enable auto-retry. From a halted failure this starts a countdown
    /// using the current attempt number.
    EnableAutoRetry,
}

/// State for one generation attempt chain.
///
/// Owned entirely by its task; observers never share it. `attempt` counts
/// retries taken: backoff retries and post-success regenerates advance it,
/// a manual retry from a halted failure does not.
struct JobLifecycle {
    transport: Arc<dyn Transport>,
    params: GenerationRequest,
    policy: RetryPolicy,
    phase: Phase,
    attempt: u32,
    commands: mpsc::UnboundedReceiver<JobCommand>,
    events: mpsc::UnboundedSender<JobEvent>,
}

/// Spawn a job task driving `params` through the lifecycle.
pub(crate) fn spawn_job(
    transport: Arc<dyn Transport>,
    params: GenerationRequest,
    policy: RetryPolicy,
) -> (
    mpsc::UnboundedSender<JobCommand>,
    mpsc::UnboundedReceiver<JobEvent>,
    tokio::task::JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let job = JobLifecycle {
        transport,
        params,
        policy,
        phase: Phase::Submitting,
        attempt: 0,
        commands: cmd_rx,
        events: event_tx,
    };
    let task = tokio::spawn(job.run());
    (cmd_tx, event_rx, task)
}

/// How a backoff countdown ended.
enum BackoffOutcome {
    /// Countdown elapsed or the user forced an immediate retry.
    Retry,
    /// The user cancelled; the job halts in the failed state.
    Cancelled,
}

impl JobLifecycle {
    async fn run(mut self) {
        'chain: loop {
            self.enter(Phase::Submitting);
            let _ = self.events.send(JobEvent::AttemptStarted {
                attempt: self.attempt,
            });

            let outcome = match self.run_attempt().await {
                Some(outcome) => outcome,
                None => return,
            };

            match outcome {
                Ok((url, elapsed)) => {
                    self.enter(Phase::Succeeded);
                    let _ = self.events.send(JobEvent::Succeeded { url, elapsed });

                    // The result stays terminal until the user regenerates or
                    // the job is disposed.
                    loop {
                        match self.commands.recv().await {
                            Some(JobCommand::Retry) => {
                                // A regenerate is a fresh user-initiated
                                // attempt in the same slot: it advances the
                                // attempt counter and reuses the bound
                                // parameters, including the server id.
                                self.attempt += 1;
                                continue 'chain;
                            }
                            Some(JobCommand::EnableAutoRetry) => self.policy.auto_retry = true,
                            Some(JobCommand::CancelAutoRetry) => self.policy.auto_retry = false,
                            None => return,
                        }
                    }
                }
                Err(err) => {
                    let will_retry = self.policy.allows_auto_retry(self.attempt);
                    self.enter(Phase::Failed);
                    let _ = self.events.send(JobEvent::Failed {
                        message: err.user_message(),
                        will_retry,
                    });

                    let mut backoff_next = will_retry;
                    loop {
                        if backoff_next {
                            match self.backoff().await {
                                Some(BackoffOutcome::Retry) => {
                                    self.attempt += 1;
                                    continue 'chain;
                                }
                                Some(BackoffOutcome::Cancelled) => backoff_next = false,
                                None => return,
                            }
                        } else {
                            match self.commands.recv().await {
                                // A manual retry resumes the chain at the
                                // current attempt count.
                                Some(JobCommand::Retry) => continue 'chain,
                                Some(JobCommand::EnableAutoRetry) => {
                                    self.policy.auto_retry = true;
                                    backoff_next = true;
                                }
                                Some(JobCommand::CancelAutoRetry) => {
                                    self.policy.auto_retry = false;
                                }
                                None => return,
                            }
                        }
                    }
                }
            }
        }
    }

    /// Drive one attempt to its terminal outcome.
    ///
    /// Emits an elapsed-time tick every 100 ms from call start until the
    /// terminal event, independent of network activity, and keeps applying
    /// auto-retry toggles that arrive mid-flight. Returns `None` when the
    /// job was disposed.
    async fn run_attempt(&mut self) -> Option<Result<(String, Duration), JobError>> {
        let Self {
            transport,
            params,
            policy,
            phase,
            commands,
            events,
            ..
        } = self;
        let events: &mpsc::UnboundedSender<JobEvent> = events;

        let start = Instant::now();
        let mut ticker = interval(ELAPSED_TICK);
        let body = params.to_body();

        let submit = transport.submit(&body);
        tokio::pin!(submit);
        let response = loop {
            tokio::select! {
                res = &mut submit => break res,
                _ = ticker.tick() => {
                    let _ = events.send(JobEvent::ElapsedTick { elapsed: start.elapsed() });
                }
                cmd = commands.recv() => match cmd {
                    Some(cmd) => apply_midflight(policy, cmd),
                    None => return None,
                },
            }
        };

        let response = match response {
            Ok(response) => response,
            Err(err) => return Some(Err(err)),
        };
        *phase = Phase::Responding;
        tracing::debug!(phase = ?phase, "Response received, consuming");

        let consume = consume_response(response, params, events);
        tokio::pin!(consume);
        loop {
            tokio::select! {
                res = &mut consume => {
                    return Some(res.map(|url| (url, start.elapsed())));
                }
                _ = ticker.tick() => {
                    let _ = events.send(JobEvent::ElapsedTick { elapsed: start.elapsed() });
                }
                cmd = commands.recv() => match cmd {
                    Some(cmd) => apply_midflight(policy, cmd),
                    None => return None,
                },
            }
        }
    }

    /// Run the countdown before the next auto-retry.
    ///
    /// Returns `None` when the job was disposed mid-countdown.
    async fn backoff(&mut self) -> Option<BackoffOutcome> {
        let Self {
            policy,
            phase,
            attempt,
            commands,
            events,
            ..
        } = self;

        *phase = Phase::Backoff;
        let next_attempt = *attempt + 1;
        let mut remaining = backoff::delay_secs(next_attempt);
        tracing::debug!(next_attempt, delay_secs = remaining, "Scheduling auto-retry");
        let _ = events.send(JobEvent::CountdownStarted {
            next_attempt,
            delay_secs: remaining,
        });

        loop {
            if remaining == 0 {
                return Some(BackoffOutcome::Retry);
            }
            tokio::select! {
                _ = sleep(Duration::from_secs(1)) => {
                    remaining -= 1;
                    let _ = events.send(JobEvent::CountdownTick {
                        remaining_secs: remaining,
                    });
                }
                cmd = commands.recv() => match cmd {
                    Some(JobCommand::Retry) => return Some(BackoffOutcome::Retry),
                    Some(JobCommand::CancelAutoRetry) => {
                        policy.auto_retry = false;
                        *attempt = 0;
                        *phase = Phase::Failed;
                        let _ = events.send(JobEvent::CountdownCancelled);
                        return Some(BackoffOutcome::Cancelled);
                    }
                    Some(JobCommand::EnableAutoRetry) => {}
                    None => return None,
                },
            }
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        tracing::debug!(phase = ?self.phase, attempt = self.attempt, "Lifecycle transition");
    }
}

/// Auto-retry toggles persist across attempts even when sent mid-flight; a
/// retry request is meaningless while an attempt is already running.
fn apply_midflight(policy: &mut RetryPolicy, cmd: JobCommand) {
    match cmd {
        JobCommand::EnableAutoRetry => policy.auto_retry = true,
        JobCommand::CancelAutoRetry => policy.auto_retry = false,
        JobCommand::Retry => {
            tracing::debug!("Ignoring retry command while an attempt is in flight");
        }
    }
}

/// Consume a response to its terminal outcome.
///
/// Every server id observed along the way is bound into `params` so all
/// follow-up calls for this chain echo it; every progress facet is emitted
/// as received. A streamed response ends at the first terminal event or when
/// the transport completes, whichever comes first; completion without a
/// terminal event is an incomplete stream.
async fn consume_response(
    response: TransportResponse,
    params: &mut GenerationRequest,
    events: &mpsc::UnboundedSender<JobEvent>,
) -> Result<String, JobError> {
    match response {
        TransportResponse::Structured(event) => {
            apply_facets(&event, params, events);
            outcome::classify(&event)
        }
        TransportResponse::Streamed(mut stream) => {
            let mut decoder = StreamDecoder::new();
            let mut terminal: Option<ServerEvent> = None;

            'read: while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                for event in decoder.push(&chunk) {
                    apply_facets(&event, params, events);
                    if event.is_terminal() {
                        terminal = Some(event);
                        break 'read;
                    }
                }
            }

            match terminal {
                Some(event) => outcome::classify(&event),
                None => Err(JobError::IncompleteStream),
            }
        }
    }
}

/// Apply the independent facets of one record: id binding and progress.
fn apply_facets(
    event: &ServerEvent,
    params: &mut GenerationRequest,
    events: &mpsc::UnboundedSender<JobEvent>,
) {
    if let Some(id) = &event.id {
        params.id = Some(id.clone());
    }
    if let Some(percent) = event.progress {
        let _ = events.send(JobEvent::Progress { percent });
    }
}
