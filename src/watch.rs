use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use notify::Watcher as _;

use crate::error::Result;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// How long the tree must stay quiet before a burst of changes triggers a run.
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
        }
    }
}

enum Message {
    Event(notify::Result<notify::Event>),
    Shutdown,
}

/// A running watch over a pipeline's source tree.
///
/// Changes are compiled one run at a time: anything that arrives while a run is in flight is
/// folded into a single follow-up run. Dropping the handle stops the watch.
pub struct Watch {
    _watcher: notify::RecommendedWatcher,
    tx: mpsc::Sender<Message>,
    worker: Option<thread::JoinHandle<()>>,
    runs: Arc<AtomicUsize>,
}

impl Watch {
    /// Register the watch and return once the tree is being observed.
    pub fn start(pipeline: Pipeline, options: WatchOptions) -> Result<Self> {
        // canonicalize is to ensure the paths `notify` reports line up with the source set
        let source = dunce::canonicalize(&pipeline.config().source).with_context(|| {
            format!(
                "Failed to watch source `{}`",
                pipeline.config().source.display()
            )
        })?;
        if !source.is_dir() {
            anyhow::bail!("Failed to watch source `{}`: not a directory", source.display());
        }

        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            let _ = event_tx.send(Message::Event(event));
        })
        .context("Failed to create file watcher")?;
        watcher
            .watch(&source, notify::RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch source `{}`", source.display()))?;
        log::info!("Watching {} for changes", source.display());

        let runs = Arc::new(AtomicUsize::new(0));
        let worker = {
            let runs = runs.clone();
            thread::Builder::new()
                .name("sassline-watch".to_owned())
                .spawn(move || worker(&pipeline, &rx, options, &runs))
                .context("Failed to start watch worker")?
        };

        Ok(Self {
            _watcher: watcher,
            tx,
            worker: Some(worker),
            runs,
        })
    }

    /// Number of change-triggered runs completed so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Block for as long as the watch is alive.
    pub fn wait(mut self) -> Result<()> {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                anyhow::bail!("Watch worker panicked");
            }
        }
        Ok(())
    }

    /// Stop watching, letting an in-flight run finish first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.tx.send(Message::Shutdown);
            let _ = worker.join();
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("runs", &self.runs())
            .field("running", &self.worker.is_some())
            .finish()
    }
}

fn worker(
    pipeline: &Pipeline,
    rx: &mpsc::Receiver<Message>,
    options: WatchOptions,
    runs: &AtomicUsize,
) {
    loop {
        // Idle
        match rx.recv() {
            Ok(Message::Event(event)) => {
                if !is_relevant(pipeline, event) {
                    continue;
                }
            }
            Ok(Message::Shutdown) | Err(_) => return,
        }

        // Fold the rest of the burst into this run
        loop {
            match rx.recv_timeout(options.debounce) {
                Ok(Message::Event(event)) => {
                    let _ = is_relevant(pipeline, event);
                }
                Ok(Message::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => return,
                Err(mpsc::RecvTimeoutError::Timeout) => break,
            }
        }

        // Running
        if let Err(err) = pipeline.compile() {
            log::error!("Build failed\n{err:?}");
        }
        runs.fetch_add(1, Ordering::SeqCst);
    }
}

fn is_relevant(pipeline: &Pipeline, event: notify::Result<notify::Event>) -> bool {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            log::warn!("Watch error: {err}");
            return false;
        }
    };
    match event.kind {
        notify::EventKind::Create(_)
        | notify::EventKind::Modify(_)
        | notify::EventKind::Remove(_) => {
            log::trace!("Noticed {:?} for {:#?}", event.kind, event.paths);
        }
        _ => {
            return false;
        }
    }
    let relevant = event.paths.iter().any(|p| pipeline.is_watched(p));
    if relevant {
        log::debug!("Style sheet changed {:?}", event.paths);
    } else {
        log::trace!("Ignored change {:?}", event.paths);
    }
    relevant
}
