//! Orchestration tests driving the background service with fake cleaners.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use echo_cleaner::cleaner::{CleanSelection, Cleaner};
use echo_cleaner::error::{EchoError, Result};
use echo_cleaner::model::{CleanOutcome, ItemKind, ScanItem};
use echo_cleaner::service::{CleaningService, ServiceEvent};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Cleaner with scripted scan output that removes the first `removable`
/// items it is asked to clean.
struct FakeCleaner {
    id: &'static str,
    items: Vec<ScanItem>,
    removable: usize,
    fail_scan: bool,
    gate: Option<Mutex<Receiver<()>>>,
    clean_gate: Option<Mutex<Receiver<()>>>,
    cleaned: Arc<Mutex<Vec<String>>>,
}

impl FakeCleaner {
    fn new(id: &'static str, sizes: &[u64]) -> Self {
        let items = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                ScanItem::new(
                    format!("{} {}", id, i),
                    format!("/tmp/{}/{}", id, i),
                    *size,
                    ItemKind::Directory,
                )
            })
            .collect::<Vec<_>>();
        Self {
            id,
            removable: items.len(),
            items,
            fail_scan: false,
            gate: None,
            clean_gate: None,
            cleaned: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn removing_only(mut self, n: usize) -> Self {
        self.removable = n;
        self
    }

    fn failing(mut self) -> Self {
        self.fail_scan = true;
        self
    }

    /// Block `scan` until the returned sender fires.
    fn gated(mut self) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.gate = Some(Mutex::new(rx));
        (self, tx)
    }

    /// Block `clean` until the returned sender fires.
    fn gated_clean(mut self) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.clean_gate = Some(Mutex::new(rx));
        (self, tx)
    }
}

impl Cleaner for FakeCleaner {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        "Fake cleaner"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        if let Some(gate) = &self.gate {
            let _ = gate.lock().unwrap().recv_timeout(TIMEOUT);
        }
        if self.fail_scan {
            return Err(EchoError::UnknownCategory(format!("{} exploded", self.id)));
        }
        Ok(self.items.clone())
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        if let Some(gate) = &self.clean_gate {
            let _ = gate.lock().unwrap().recv_timeout(TIMEOUT);
        }
        let mut outcome = CleanOutcome::default();
        for (i, item) in items.iter().enumerate() {
            if i < self.removable {
                self.cleaned.lock().unwrap().push(item.path.clone());
                outcome.record_removed(item);
            } else {
                outcome.record_failure(item, "resource busy");
            }
        }
        Ok(outcome)
    }
}

/// Collect events up to and including the next terminal one.
fn until_terminal(events: &Receiver<ServiceEvent>) -> Vec<ServiceEvent> {
    let mut received = Vec::new();
    loop {
        let event = events
            .recv_timeout(TIMEOUT)
            .expect("service did not finish in time");
        let done = event.is_terminal();
        received.push(event);
        if done {
            return received;
        }
    }
}

fn scan(service: &CleaningService, events: &Receiver<ServiceEvent>) -> echo_cleaner::ScanResult {
    assert!(service.start_scan());
    match until_terminal(events).pop() {
        Some(ServiceEvent::ScanCompleted(result)) => result,
        other => panic!("Expected ScanCompleted, got {:?}", other),
    }
}

#[test]
fn empty_cleaner_contributes_no_category() {
    let (service, events) = CleaningService::new();
    service.register_cleaner(Box::new(FakeCleaner::new("first", &[10]))).unwrap();
    service.register_cleaner(Box::new(FakeCleaner::new("second", &[]))).unwrap();
    service.register_cleaner(Box::new(FakeCleaner::new("third", &[20, 30]))).unwrap();

    let result = scan(&service, &events);

    let ids: Vec<&str> = result.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "third"]);
    assert_eq!(result.total_size, 60);
    assert_eq!(result.categories[1].total_size, 50);
}

#[test]
fn scan_emits_progress_in_registration_order() {
    let (service, events) = CleaningService::new();
    for id in ["a", "b", "c", "d"] {
        service.register_cleaner(Box::new(FakeCleaner::new(id, &[1]))).unwrap();
    }

    assert!(service.start_scan());
    let received = until_terminal(&events);

    assert!(matches!(received[0], ServiceEvent::ScanStarted));
    let progress: Vec<(u8, String)> = received
        .iter()
        .filter_map(|e| match e {
            ServiceEvent::ScanProgress { percent, message } => Some((*percent, message.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        progress,
        vec![
            (0, "Scanning a...".to_string()),
            (25, "Scanning b...".to_string()),
            (50, "Scanning c...".to_string()),
            (75, "Scanning d...".to_string()),
            (100, "Scan complete!".to_string()),
        ]
    );
}

#[test]
fn parallel_scan_keeps_category_order() {
    let (service, events) = CleaningService::new();
    let service = service.with_parallel_scan(true);
    for (i, id) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
        let sizes = if i % 2 == 0 { vec![i as u64 + 1] } else { vec![] };
        service.register_cleaner(Box::new(FakeCleaner::new(id, &sizes))).unwrap();
    }

    let result = scan(&service, &events);

    let ids: Vec<&str> = result.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "e"]);
}

#[test]
fn partial_clean_counts_only_removed_items() {
    let (service, events) = CleaningService::new();
    service
        .register_cleaner(Box::new(
            FakeCleaner::new("partial", &[10, 20, 30, 40, 50]).removing_only(3),
        ))
        .unwrap();

    let result = scan(&service, &events);
    let selection = CleanSelection::all_from(&result);
    assert_eq!(selection.item_count(), 5);

    assert!(service.start_clean(selection));
    let received = until_terminal(&events);

    assert!(matches!(received[0], ServiceEvent::CleanStarted));
    match received.last() {
        Some(ServiceEvent::CleanCompleted(result)) => {
            assert_eq!(result.items_removed, 3);
            assert_eq!(result.total_cleaned, 60);
            assert_eq!(result.categories_cleaned, vec!["partial"]);
            assert_eq!(result.failed_categories(), vec!["partial"]);
            assert_eq!(result.failed_count(), 2);
        }
        other => panic!("Expected CleanCompleted, got {:?}", other),
    }
}

#[test]
fn concurrent_scan_request_is_dropped() {
    let (service, events) = CleaningService::new();
    let (cleaner, release) = FakeCleaner::new("slow", &[100]).gated();
    service.register_cleaner(Box::new(cleaner)).unwrap();

    assert!(service.start_scan());
    assert!(service.is_scanning());
    assert!(!service.start_scan());

    release.send(()).unwrap();
    let received = until_terminal(&events);

    let started = received
        .iter()
        .filter(|e| matches!(e, ServiceEvent::ScanStarted))
        .count();
    assert_eq!(started, 1);
    match received.last() {
        Some(ServiceEvent::ScanCompleted(result)) => assert_eq!(result.total_size, 100),
        other => panic!("Expected ScanCompleted, got {:?}", other),
    }

    service.wait();
    assert!(events.try_recv().is_err());
}

#[test]
fn end_to_end_scan_then_clean() {
    let (service, events) = CleaningService::new();
    let cleaner = FakeCleaner::new("Fake", &[]);
    let cleaned = Arc::clone(&cleaner.cleaned);
    let cleaner = FakeCleaner {
        items: vec![ScanItem::new("x", "/tmp/x", 100, ItemKind::Directory)],
        removable: 1,
        ..cleaner
    };
    service.register_cleaner(Box::new(cleaner)).unwrap();

    let result = scan(&service, &events);
    assert_eq!(service.last_scan().unwrap().total_size, 100);

    let mut selection = CleanSelection::new();
    selection
        .insert(result.category("Fake").unwrap(), vec![ScanItem::new("x", "/tmp/x", 100, ItemKind::Directory)])
        .unwrap();
    assert!(service.start_clean(selection));

    match until_terminal(&events).pop() {
        Some(ServiceEvent::CleanCompleted(result)) => {
            assert_eq!(result.total_cleaned, 100);
            assert_eq!(result.items_removed, 1);
            assert!(!result.is_partial());
        }
        other => panic!("Expected CleanCompleted, got {:?}", other),
    }
    assert_eq!(*cleaned.lock().unwrap(), vec!["/tmp/x".to_string()]);
    // A completed clean invalidates the scan it was based on.
    assert!(service.last_scan().is_none());
}

#[test]
fn failing_cleaner_fails_whole_scan() {
    let (service, events) = CleaningService::new();
    service.register_cleaner(Box::new(FakeCleaner::new("ok", &[1]))).unwrap();
    service.register_cleaner(Box::new(FakeCleaner::new("bad", &[1]).failing())).unwrap();
    service.register_cleaner(Box::new(FakeCleaner::new("never", &[1]))).unwrap();

    assert!(service.start_scan());
    let received = until_terminal(&events);

    match received.last() {
        Some(ServiceEvent::ScanFailed(message)) => {
            assert!(message.starts_with("Scanning bad failed"));
            assert!(message.contains("bad exploded"));
        }
        other => panic!("Expected ScanFailed, got {:?}", other),
    }
    assert!(!received.iter().any(|e| matches!(
        e,
        ServiceEvent::ScanProgress { message, .. } if message == "Scanning never..."
    )));
    assert!(service.last_scan().is_none());
    assert!(!service.is_scanning());
}

#[test]
fn empty_selection_fails_immediately() {
    let (service, events) = CleaningService::new();

    assert!(!service.start_clean(CleanSelection::new()));

    match events.recv_timeout(TIMEOUT).unwrap() {
        ServiceEvent::CleanFailed(message) => {
            assert_eq!(message, "No categories selected for cleaning")
        }
        other => panic!("Expected CleanFailed, got {:?}", other),
    }
    assert!(events.try_recv().is_err());
}

#[test]
fn new_scan_supersedes_previous_result() {
    let (service, events) = CleaningService::new();
    let (cleaner, release) = FakeCleaner::new("slow", &[5]).gated();
    service.register_cleaner(Box::new(cleaner)).unwrap();

    release.send(()).unwrap();
    scan(&service, &events);
    assert!(service.last_scan().is_some());

    assert!(service.start_scan());
    assert!(service.last_scan().is_none());

    release.send(()).unwrap();
    until_terminal(&events);
    assert!(service.last_scan().is_some());
}

#[test]
fn scan_finished_during_clean_is_kept() {
    let (service, events) = CleaningService::new();
    let (cleaner, release) = FakeCleaner::new("held", &[5]).gated_clean();
    service.register_cleaner(Box::new(cleaner)).unwrap();

    let first = scan(&service, &events);
    assert!(service.start_clean(CleanSelection::all_from(&first)));
    assert!(matches!(
        events.recv_timeout(TIMEOUT).unwrap(),
        ServiceEvent::CleanStarted
    ));

    scan(&service, &events);
    assert!(service.is_cleaning());
    assert!(service.last_scan().is_some());

    release.send(()).unwrap();
    match until_terminal(&events).pop() {
        Some(ServiceEvent::CleanCompleted(result)) => assert_eq!(result.items_removed, 1),
        other => panic!("Expected CleanCompleted, got {:?}", other),
    }
    assert_eq!(service.last_scan().map(|r| r.total_size), Some(5));
}
