//! Background scan and clean service.
//!
//! [`CleaningService`] runs each scan or clean on its own worker thread and
//! reports over an [`mpsc`] channel, so the caller never blocks. At most
//! one scan and one clean run at a time; a start request while one is
//! active is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use crate::cleaner::{clean_selected, scan_all, CleanSelection, Cleaner, CleanerHandle, CleanerRegistry};
use crate::error::{EchoError, Result};
use crate::model::{CleanResult, ScanResult};

pub use crate::scanner::format_size;

/// Notifications emitted by [`CleaningService`].
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    ScanStarted,
    ScanProgress { percent: u8, message: String },
    ScanCompleted(ScanResult),
    ScanFailed(String),
    CleanStarted,
    CleanProgress { percent: u8, message: String },
    CleanCompleted(CleanResult),
    CleanFailed(String),
}

impl ServiceEvent {
    /// Whether this event ends a scan or clean.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ServiceEvent::ScanCompleted(_)
                | ServiceEvent::ScanFailed(_)
                | ServiceEvent::CleanCompleted(_)
                | ServiceEvent::CleanFailed(_)
        )
    }
}

/// Clears an "operation active" flag when the worker finishes, even by
/// panicking.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Claim `flag`; `None` if already set.
fn try_activate(flag: &Arc<AtomicBool>) -> Option<ActiveGuard> {
    flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .ok()
        .map(|_| ActiveGuard(Arc::clone(flag)))
}

fn emit(events: &Sender<ServiceEvent>, event: ServiceEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Event receiver dropped");
    }
}

/// Latest completed scan, tagged with the number of scans started so far.
#[derive(Default)]
struct ScanSlot {
    generation: u64,
    result: Option<ScanResult>,
}

fn with_slot<T>(slot: &Mutex<ScanSlot>, f: impl FnOnce(&mut ScanSlot) -> T) -> T {
    match slot.lock() {
        Ok(mut guard) => f(&mut guard),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}

pub struct CleaningService {
    registry: Arc<RwLock<CleanerRegistry>>,
    events: Sender<ServiceEvent>,
    scanning: Arc<AtomicBool>,
    cleaning: Arc<AtomicBool>,
    last_scan: Arc<Mutex<ScanSlot>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    parallel_scan: bool,
}

impl CleaningService {
    /// Create a service with an empty registry, returning the event stream.
    pub fn new() -> (Self, Receiver<ServiceEvent>) {
        Self::with_registry(CleanerRegistry::new())
    }

    pub fn with_registry(registry: CleanerRegistry) -> (Self, Receiver<ServiceEvent>) {
        let (events, receiver) = mpsc::channel();
        let service = Self {
            registry: Arc::new(RwLock::new(registry)),
            events,
            scanning: Arc::new(AtomicBool::new(false)),
            cleaning: Arc::new(AtomicBool::new(false)),
            last_scan: Arc::new(Mutex::new(ScanSlot::default())),
            workers: Mutex::new(Vec::new()),
            parallel_scan: false,
        };
        (service, receiver)
    }

    /// Scan independent cleaners concurrently. Category order is unchanged.
    pub fn with_parallel_scan(mut self, parallel: bool) -> Self {
        self.parallel_scan = parallel;
        self
    }

    /// Append a cleaner to the registry. Blocks while a scan or clean holds
    /// the registry.
    pub fn register_cleaner(&self, cleaner: Box<dyn Cleaner>) -> Result<CleanerHandle> {
        let mut registry = self
            .registry
            .write()
            .map_err(|_| EchoError::Poisoned("cleaner registry".into()))?;
        Ok(registry.register(cleaner))
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    pub fn is_cleaning(&self) -> bool {
        self.cleaning.load(Ordering::SeqCst)
    }

    /// The last completed scan, unless a newer scan or a clean has
    /// superseded it.
    pub fn last_scan(&self) -> Option<ScanResult> {
        with_slot(&self.last_scan, |slot| slot.result.clone())
    }

    /// Start a scan on a worker thread. Returns `false` if one is already
    /// running.
    pub fn start_scan(&self) -> bool {
        let Some(guard) = try_activate(&self.scanning) else {
            tracing::debug!("Scan already in progress, ignoring request");
            return false;
        };

        let generation = with_slot(&self.last_scan, |slot| {
            slot.generation += 1;
            slot.result = None;
            slot.generation
        });
        emit(&self.events, ServiceEvent::ScanStarted);

        let registry = Arc::clone(&self.registry);
        let last_scan = Arc::clone(&self.last_scan);
        let events = self.events.clone();
        let parallel = self.parallel_scan;

        let spawned = thread::Builder::new()
            .name("echo-scan".into())
            .spawn(move || {
                let outcome = registry
                    .read()
                    .map_err(|_| EchoError::Poisoned("cleaner registry".into()))
                    .and_then(|registry| {
                        scan_all(&registry, parallel, |percent, message| {
                            emit(
                                &events,
                                ServiceEvent::ScanProgress {
                                    percent,
                                    message: message.to_string(),
                                },
                            )
                        })
                    });

                let event = match outcome {
                    Ok(result) => {
                        with_slot(&last_scan, |slot| {
                            if slot.generation == generation {
                                slot.result = Some(result.clone());
                            }
                        });
                        ServiceEvent::ScanCompleted(result)
                    }
                    Err(err) => {
                        tracing::error!("{}", err);
                        ServiceEvent::ScanFailed(err.to_string())
                    }
                };
                drop(guard);
                emit(&events, event);
            });

        self.track(spawned, ServiceEvent::ScanFailed)
    }

    /// Start cleaning `selection` on a worker thread. Returns `false` if a
    /// clean is already running or the selection is empty; the latter also
    /// emits `CleanFailed`.
    pub fn start_clean(&self, selection: CleanSelection) -> bool {
        let Some(guard) = try_activate(&self.cleaning) else {
            tracing::debug!("Clean already in progress, ignoring request");
            return false;
        };

        if selection.is_empty() {
            drop(guard);
            emit(
                &self.events,
                ServiceEvent::CleanFailed(EchoError::EmptySelection.to_string()),
            );
            return false;
        }

        let generation = with_slot(&self.last_scan, |slot| slot.generation);
        emit(&self.events, ServiceEvent::CleanStarted);

        let registry = Arc::clone(&self.registry);
        let last_scan = Arc::clone(&self.last_scan);
        let events = self.events.clone();

        let spawned = thread::Builder::new()
            .name("echo-clean".into())
            .spawn(move || {
                let outcome = registry
                    .read()
                    .map_err(|_| EchoError::Poisoned("cleaner registry".into()))
                    .and_then(|registry| {
                        clean_selected(&registry, &selection, |percent, message| {
                            emit(
                                &events,
                                ServiceEvent::CleanProgress {
                                    percent,
                                    message: message.to_string(),
                                },
                            )
                        })
                    });

                let event = match outcome {
                    Ok(result) => {
                        // Removed items invalidate scans started before
                        // this clean, not ones started while it ran.
                        with_slot(&last_scan, |slot| {
                            if slot.generation == generation {
                                slot.result = None;
                            }
                        });
                        ServiceEvent::CleanCompleted(result)
                    }
                    Err(err) => {
                        tracing::error!("{}", err);
                        ServiceEvent::CleanFailed(err.to_string())
                    }
                };
                drop(guard);
                emit(&events, event);
            });

        self.track(spawned, ServiceEvent::CleanFailed)
    }

    /// Block until every worker started so far has finished.
    pub fn wait(&self) {
        let workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }

    fn track(
        &self,
        spawned: std::io::Result<JoinHandle<()>>,
        failed: fn(String) -> ServiceEvent,
    ) -> bool {
        match spawned {
            Ok(handle) => {
                match self.workers.lock() {
                    Ok(mut workers) => workers.push(handle),
                    Err(poisoned) => poisoned.into_inner().push(handle),
                }
                true
            }
            Err(err) => {
                // The closure, and with it the guard, was dropped by the
                // failed spawn.
                let err = EchoError::Spawn(err);
                tracing::error!("{}", err);
                emit(&self.events, failed(err.to_string()));
                false
            }
        }
    }
}

impl Drop for CleaningService {
    fn drop(&mut self) {
        self.wait();
    }
}
