use std::time::Duration;
use std::time::Instant;

use notify_debouncer_full::notify;
use notify_debouncer_full::notify::Event;
use notify_debouncer_full::notify::PollWatcher;
use notify_debouncer_full::notify::RecommendedWatcher;
use notify_debouncer_full::notify::RecursiveMode;
use tokio::sync::mpsc;
use tracing::instrument;

use crate::cli::Opts;
use crate::debounce::Debounce;
use crate::error::WatchSubscriptionFailure;
use crate::event_filter::file_event;
use crate::event_filter::FileEvent;
use crate::pipeline::Pipeline;
use crate::target::WatchTarget;

/// Options for [`run_watcher`]. This is like a lower-effort builder interface, mostly
/// provided because Rust tragically lacks named arguments.
#[derive(Debug, Clone)]
pub struct WatcherOpts {
    /// Ignore further events for this long after accepting one.
    pub debounce: Duration,
    /// If given, use the polling file watcher with the given duration as the poll interval.
    pub poll: Option<Duration>,
}

impl WatcherOpts {
    /// Construct options for [`run_watcher`] from parsed command-line interface arguments as [`Opts`].
    pub fn from_cli(opts: &Opts) -> Self {
        Self {
            debounce: opts.watch.debounce,
            poll: opts.watch.poll,
        }
    }
}

/// Watch the target's source file and run the pipeline once for each accepted change.
///
/// Runs until Ctrl-C is pressed. Only fails if the file can't be watched in the first place;
/// failures during a pipeline run are logged and the watcher waits for the next change.
#[instrument(level = "debug", skip_all)]
pub async fn run_watcher(
    target: WatchTarget,
    pipeline: Pipeline,
    opts: WatcherOpts,
) -> miette::Result<()> {
    let mut config = notify::Config::default();
    match opts.poll {
        Some(interval) => {
            config = config.with_poll_interval(interval);
            run::<PollWatcher>(target, pipeline, opts, config).await
        }
        None => run::<RecommendedWatcher>(target, pipeline, opts, config).await,
    }
}

async fn run<W: notify::Watcher>(
    target: WatchTarget,
    pipeline: Pipeline,
    opts: WatcherOpts,
    config: notify::Config,
) -> miette::Result<()> {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    // Dropping the watcher ends the subscription, so keep it alive until we return.
    let _watcher = subscribe::<W>(&target, config, sender)?;

    tracing::info!("Watching process started for file {}", target.source());

    let mut session = WatchSession::new(&target, opts.debounce);
    tracing::debug!(
        compiler = pipeline.compiler(),
        debounce = %humantime::format_duration(session.debounce.window()),
        "Watch session configured"
    );
    // Listen for Ctrl-C for the whole session, so a press during a pipeline run isn't missed.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let event = tokio::select! {
            event = receiver.recv() => event,
            _ = &mut ctrl_c => {
                tracing::debug!("Ctrl-C pressed, shutting down");
                break;
            }
        };

        let (received_at, event) = match event {
            Some((received_at, Ok(event))) => (received_at, event),
            Some((_, Err(err))) => {
                tracing::error!("{err}");
                continue;
            }
            None => {
                tracing::debug!("File watcher closed");
                break;
            }
        };

        // Debounce by delivery time, so events queued during a pipeline run are still dropped.
        if !session.accept(&event, received_at) {
            continue;
        }

        tracing::info!("Change detected in {}", target.source());
        // The loop doesn't receive another event until this finishes, so pipeline runs never
        // overlap.
        match pipeline.run_once(&target).await {
            Ok(run) => run.emit(),
            Err(err) => tracing::error!("{err}: {}", err.source),
        }
    }

    Ok(())
}

fn subscribe<W: notify::Watcher>(
    target: &WatchTarget,
    config: notify::Config,
    sender: mpsc::UnboundedSender<(Instant, notify::Result<Event>)>,
) -> Result<W, WatchSubscriptionFailure> {
    let failure = |source| WatchSubscriptionFailure {
        path: target.source().to_owned(),
        source,
    };

    if !target.source().is_file() {
        return Err(failure(
            notify::Error::path_not_found().add_path(target.source().as_std_path().to_owned()),
        ));
    }

    let mut watcher = W::new(
        move |event: notify::Result<Event>| {
            // The receiver is only gone once we're shutting down.
            let _ = sender.send((Instant::now(), event));
        },
        config,
    )
    .map_err(failure)?;

    // Watch the directory rather than the file itself; editors which save by moving a new file
    // into place would otherwise end the subscription.
    let dir = target.source_dir();
    watcher
        .watch(dir.as_std_path(), RecursiveMode::NonRecursive)
        .map_err(failure)?;
    tracing::debug!(%dir, "notify watcher started");

    Ok(watcher)
}

/// Per-watcher state: which file we care about and the debounce timer.
#[derive(Debug)]
struct WatchSession {
    file_name: String,
    debounce: Debounce,
}

impl WatchSession {
    fn new(target: &WatchTarget, debounce: Duration) -> Self {
        Self {
            file_name: target.source_file_name().unwrap_or_default().to_owned(),
            debounce: Debounce::new(debounce),
        }
    }

    /// Should `event`, received at `now`, trigger a pipeline run?
    fn accept(&mut self, event: &Event, now: Instant) -> bool {
        if self.file_name.is_empty() {
            return false;
        }
        match file_event(event, &self.file_name) {
            Some(FileEvent::Modify) => self.debounce.accept(now),
            Some(FileEvent::Remove) => {
                tracing::debug!(file = %self.file_name, "Watched file was removed");
                false
            }
            None => {
                tracing::trace!(?event, "Irrelevant event");
                false
            }
        }
    }
}
