//! Tests for the Reconciler against real directory trees

use mirror_core::{Action, EventKind, EventSink, Reconciler, Result, SyncEvent, Target};
use mirror_test_utils::MirrorPair;
use pretty_assertions::assert_eq;

fn reconciler(pair: &MirrorPair) -> Reconciler {
    Reconciler::new(pair.source.root(), pair.replica.root())
}

/// Compact rendering of an event stream: `"<Target> <action> <path>"`.
fn outline(events: &[SyncEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match &event.kind {
            EventKind::Mutation {
                action,
                target,
                path,
            } => format!("{} {} {}", target, action, path),
            EventKind::CycleCompleted => "completed".to_string(),
        })
        .collect()
}

fn run(pair: &MirrorPair) -> Vec<String> {
    let mut events = Vec::new();
    reconciler(pair).run_cycle(&mut events).unwrap();
    outline(&events)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_orphan_file_in_empty_source_is_deleted() {
    let pair = MirrorPair::new();
    pair.replica.file("a.txt", "stale");

    let events = run(&pair);

    assert_eq!(events, vec!["File deleted a.txt", "completed"]);
    assert!(pair.replica.is_empty());
}

#[test]
fn test_new_nested_file_creates_folder_then_file() {
    let pair = MirrorPair::new();
    pair.source.file("dir/b.txt", "bee");

    let events = run(&pair);

    assert_eq!(events, vec!["Folder created dir", "File created dir/b.txt", "completed"]);
    pair.replica.assert_file_content("dir/b.txt", "bee");
}

#[test]
fn test_identical_file_emits_nothing() {
    let pair = MirrorPair::new();
    pair.source.file("c.txt", "same bytes");
    pair.replica.file("c.txt", "same bytes");

    let events = run(&pair);

    assert_eq!(events, vec!["completed"]);
}

#[test]
fn test_changed_file_is_one_modified_event() {
    let pair = MirrorPair::new();
    pair.source.file("c.txt", "new bytes");
    pair.replica.file("c.txt", "old bytes");

    let events = run(&pair);

    assert_eq!(events, vec!["File modified c.txt", "completed"]);
    pair.replica.assert_file_content("c.txt", "new bytes");
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_second_cycle_is_idempotent() {
    let pair = MirrorPair::new();
    pair.source.file("a.txt", "a").file("d/e/f.txt", "f").dir("empty");
    pair.replica.file("stale/x.txt", "x").file("a.txt", "old");

    run(&pair);
    let second = run(&pair);

    assert_eq!(second, vec!["completed"]);
    pair.assert_converged();
}

#[test]
fn test_unchanged_file_is_not_rewritten() {
    let pair = MirrorPair::new();
    pair.source.file("keep.txt", "stable").file("new.txt", "n");
    pair.replica.file("keep.txt", "stable");
    let before = pair.replica.modified("keep.txt");

    std::thread::sleep(std::time::Duration::from_millis(20));
    run(&pair);

    assert_eq!(pair.replica.modified("keep.txt"), before);
}

#[test]
fn test_nested_orphans_each_deleted_once() {
    let pair = MirrorPair::new();
    pair.replica.file("old/inner/x.txt", "x").file("old/y.txt", "y");

    let events = run(&pair);

    assert_eq!(
        events,
        vec![
            "Folder deleted old/inner",
            "Folder deleted old",
            "File deleted old/inner/x.txt",
            "File deleted old/y.txt",
            "completed",
        ]
    );
    assert!(pair.replica.is_empty());
}

#[test]
fn test_event_order_across_kinds() {
    let pair = MirrorPair::new();
    pair.source.file("new/n.txt", "n").file("changed.txt", "v2");
    pair.replica
        .file("gone/g.txt", "g")
        .file("changed.txt", "v1")
        .file("orphan.txt", "o");

    let events = run(&pair);

    assert_eq!(
        events,
        vec![
            "Folder deleted gone",
            "Folder created new",
            "File modified changed.txt",
            "File created new/n.txt",
            "File deleted gone/g.txt",
            "File deleted orphan.txt",
            "completed",
        ]
    );
    pair.assert_converged();
}

#[test]
fn test_empty_directories_are_mirrored() {
    let pair = MirrorPair::new();
    pair.source.dir("a/b/c");
    pair.replica.dir("z");

    let events = run(&pair);

    assert_eq!(
        events,
        vec![
            "Folder deleted z",
            "Folder created a",
            "Folder created a/b",
            "Folder created a/b/c",
            "completed",
        ]
    );
    pair.assert_converged();
}

// ============================================================================
// Type changes between cycles
// ============================================================================

#[test]
fn test_replica_folder_replaced_by_source_file() {
    let pair = MirrorPair::new();
    pair.source.file("thing", "now a file");
    pair.replica.file("thing/inside.txt", "i");

    let events = run(&pair);

    assert_eq!(
        events,
        vec![
            "Folder deleted thing",
            "File created thing",
            "File deleted thing/inside.txt",
            "completed",
        ]
    );
    pair.assert_converged();
}

#[test]
fn test_replica_file_replaced_by_source_folder() {
    let pair = MirrorPair::new();
    pair.source.file("thing/inside.txt", "i");
    pair.replica.file("thing", "was a file");

    let events = run(&pair);

    assert_eq!(
        events,
        vec![
            "Folder created thing",
            "File created thing/inside.txt",
            "File deleted thing",
            "completed",
        ]
    );
    pair.assert_converged();
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_source_fails_scan_without_touching_replica() {
    let pair = MirrorPair::new();
    pair.replica.file("keep.txt", "k");
    let reconciler = Reconciler::new(pair.outside("no-source"), pair.replica.root());
    let mut events = Vec::new();

    let err = reconciler.run_cycle(&mut events).unwrap_err();

    assert!(matches!(
        err,
        mirror_core::Error::Scan {
            role: mirror_core::TreeRole::Source,
            ..
        }
    ));
    assert!(events.is_empty());
    pair.replica.assert_exists("keep.txt");
}

/// Sink that fails after accepting a fixed number of events.
struct FailingSink {
    accepted: Vec<SyncEvent>,
    limit: usize,
}

impl EventSink for FailingSink {
    fn record(&mut self, event: &SyncEvent) -> Result<()> {
        if self.accepted.len() == self.limit {
            return Err(std::io::Error::other("log volume full").into());
        }
        self.accepted.push(event.clone());
        Ok(())
    }
}

#[test]
fn test_sink_failure_aborts_cycle_and_next_cycle_recovers() {
    let pair = MirrorPair::new();
    pair.source.file("a.txt", "a").file("b.txt", "b");
    let mut sink = FailingSink {
        accepted: Vec::new(),
        limit: 1,
    };

    let result = reconciler(&pair).run_cycle(&mut sink);

    assert!(result.is_err());
    assert_eq!(outline(&sink.accepted), vec!["File created a.txt"]);

    // b.txt was copied before its event failed; only the completion remains
    let events = run(&pair);
    assert_eq!(events, vec!["completed"]);
    pair.assert_converged();
}

#[test]
fn test_report_matches_events() {
    let pair = MirrorPair::new();
    pair.source.file("n.txt", "new").file("m.txt", "v2").dir("d");
    pair.replica.file("m.txt", "v1").file("o.txt", "old");
    let mut events = Vec::new();

    let report = reconciler(&pair).run_cycle(&mut events).unwrap();

    assert_eq!(report.folders_created, 1);
    assert_eq!(report.files_created, 1);
    assert_eq!(report.files_modified, 1);
    assert_eq!(report.files_deleted, 1);
    assert_eq!(report.bytes_copied, 5);
    assert_eq!(report.changes(), events.len() - 1);
    assert!(matches!(
        events.last().map(|e| &e.kind),
        Some(EventKind::CycleCompleted)
    ));
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::Mutation {
            action: Action::Modified,
            target: Target::File,
            ..
        }
    )));
}

// ============================================================================
// Symbolic links in the replica
// ============================================================================

#[cfg(unix)]
#[test]
fn test_replica_file_link_is_replaced_not_written_through() {
    let pair = MirrorPair::new();
    let precious = pair.outside("precious.txt");
    std::fs::write(&precious, "precious data").unwrap();
    pair.source.file("c.txt", "new bytes");
    pair.replica.symlink("c.txt", &precious);

    let events = run(&pair);

    assert_eq!(events, vec!["File modified c.txt", "completed"]);
    assert_eq!(std::fs::read_to_string(&precious).unwrap(), "precious data");
    assert!(!pair.replica.is_symlink("c.txt"));
    pair.assert_converged();
}

#[cfg(unix)]
#[test]
fn test_replica_dir_link_is_replaced_by_real_folder() {
    let pair = MirrorPair::new();
    let elsewhere = pair.outside("elsewhere");
    std::fs::create_dir(&elsewhere).unwrap();
    pair.source.file("link/f.txt", "f");
    pair.replica.symlink("link", &elsewhere);

    let first = run(&pair);
    let second = run(&pair);

    assert_eq!(
        first,
        vec![
            "Folder created link",
            "File created link/f.txt",
            "File deleted link",
            "completed",
        ]
    );
    assert_eq!(second, vec!["completed"]);
    assert!(!elsewhere.join("f.txt").exists());
    assert!(!pair.replica.is_symlink("link"));
    pair.assert_converged();
}

#[cfg(unix)]
#[test]
fn test_orphan_replica_dir_link_removes_link_only() {
    let pair = MirrorPair::new();
    let elsewhere = pair.outside("elsewhere");
    std::fs::create_dir(&elsewhere).unwrap();
    std::fs::write(elsewhere.join("keep.txt"), "k").unwrap();
    pair.replica.symlink("link", &elsewhere);

    let events = run(&pair);

    assert_eq!(events, vec!["File deleted link", "completed"]);
    assert!(elsewhere.join("keep.txt").exists());
    assert!(pair.replica.is_empty());
}

#[cfg(unix)]
#[test]
fn test_dangling_replica_link_is_repaired() {
    let pair = MirrorPair::new();
    pair.source.file("c.txt", "real");
    pair.replica.symlink("c.txt", pair.outside("missing-target"));

    let first = run(&pair);
    let second = run(&pair);

    assert_eq!(first, vec!["File modified c.txt", "completed"]);
    assert_eq!(second, vec!["completed"]);
    pair.replica.assert_file_content("c.txt", "real");
}

// ============================================================================
// Deferred verification
// ============================================================================

#[cfg(unix)]
#[test]
fn test_unreadable_source_file_is_deferred_and_left_alone() {
    let pair = MirrorPair::new();
    pair.source.symlink("c.txt", pair.outside("missing-target"));
    pair.source.file("ok.txt", "ok");
    pair.replica.file("c.txt", "replica bytes");
    let mut events = Vec::new();

    let report = reconciler(&pair).run_cycle(&mut events).unwrap();

    assert_eq!(report.deferred, 1);
    assert_eq!(report.files_created, 1);
    assert_eq!(outline(&events), vec!["File created ok.txt", "completed"]);
    pair.replica.assert_file_content("c.txt", "replica bytes");
}
