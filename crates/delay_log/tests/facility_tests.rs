//! End-to-end tests covering the facility lifecycle, the fixed line layout,
//! rotation bounds, and the tracing bridge.

use std::{fs, path::Path, sync::Arc};

use delay_log::{Clock, FacilityConfig, LoggingFacility, ManualClock, PLACEHOLDER};
use time::OffsetDateTime;
use tracing_subscriber::layer::SubscriberExt;

fn manual_clock() -> (Arc<ManualClock>, Arc<dyn Clock>) {
    let clock = Arc::new(ManualClock::starting_at(OffsetDateTime::UNIX_EPOCH));
    let handle: Arc<dyn Clock> = clock.clone();
    (clock, handle)
}

fn config(name: &str, directory: &Path, max_bytes: u64, backup_count: usize) -> FacilityConfig {
    FacilityConfig {
        name: name.to_string(),
        directory: directory.to_path_buf(),
        max_bytes,
        backup_count,
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read log file")
        .lines()
        .map(str::to_string)
        .collect()
}

fn matching_files(dir: &Path, prefix: &str) -> Vec<String> {
    let mut files: Vec<String> = fs::read_dir(dir)
        .expect("read log directory")
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(prefix).then_some(name)
        })
        .collect();
    files.sort();
    files
}

#[test]
fn basic_emit_produces_the_fixed_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock, handle) = manual_clock();
    let facility =
        LoggingFacility::initialize_with_clock(config("toto", dir.path(), 20, 5), handle)
            .expect("initialize");

    let logger = facility.logger("toto");
    logger.debug(format_args!("i = {}", 5)).expect("emit");

    let log_path = dir.path().join("toto.log");
    assert!(log_path.exists());
    assert_eq!(
        read_lines(&log_path),
        vec!["0:00:00         - toto  - DEBUG    - i = 5"]
    );
}

#[test]
fn repeated_emits_keep_at_most_backup_count_plus_one_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock, handle) = manual_clock();
    let facility =
        LoggingFacility::initialize_with_clock(config("toto", dir.path(), 20, 5), handle)
            .expect("initialize");

    let logger = facility.logger("toto");
    for i in 0..20 {
        logger.debug(format_args!("i = {i}")).expect("emit");
    }

    let files = matching_files(dir.path(), "toto.log");
    assert!(
        files.len() <= 5 + 1,
        "expected at most backup_count + 1 files, found {files:?}"
    );
    assert!(files.contains(&"toto.log".to_string()));
}

#[test]
fn delay_is_monotonic_across_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (clock, handle) = manual_clock();
    let facility = LoggingFacility::initialize_with_clock(config("app", dir.path(), 0, 0), handle)
        .expect("initialize");

    let logger = facility.logger("app");
    logger.info("first").expect("emit");
    clock.advance(time::Duration::microseconds(1_500_000));
    logger.info("second").expect("emit");
    clock.advance(time::Duration::seconds(3600));
    logger.info("third").expect("emit");

    let delays: Vec<String> = read_lines(&facility.active_log_path())
        .iter()
        .map(|line| {
            line.split(" - ")
                .next()
                .expect("delay column")
                .trim_end()
                .to_string()
        })
        .collect();
    assert_eq!(delays, vec!["0:00:00", "0:00:01.500000", "1:00:01.500000"]);
}

#[test]
fn handles_with_the_same_name_share_one_sink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock, handle) = manual_clock();
    let facility = LoggingFacility::initialize_with_clock(config("app", dir.path(), 0, 0), handle)
        .expect("initialize");

    let first = facility.logger("app");
    let second = facility.logger("app");
    first.info("from the first handle").expect("emit");
    second.info("from the second handle").expect("emit");

    let lines = read_lines(&facility.active_log_path());
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.contains(" - app   - ")));
}

#[test]
fn context_attributes_are_per_handle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock, handle) = manual_clock();
    let facility = LoggingFacility::initialize_with_clock(config("app", dir.path(), 0, 0), handle)
        .expect("initialize");

    let mut logger = facility.logger("app");
    logger.context_mut().set("job", "sync");

    assert_eq!(logger.context().get("job"), "sync");
    assert_eq!(logger.context().get("host"), PLACEHOLDER);

    let other = facility.logger("app");
    assert_eq!(other.context().get("job"), PLACEHOLDER);
}

#[test]
fn tracing_events_flow_into_the_sink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (clock, handle) = manual_clock();
    let facility = LoggingFacility::initialize_with_clock(config("app", dir.path(), 0, 0), handle)
        .expect("initialize");

    let subscriber = tracing_subscriber::registry().with(facility.layer());
    tracing::subscriber::with_default(subscriber, || {
        clock.advance(time::Duration::seconds(1));
        tracing::info!(logger = "toto", "i = {}", 5);
        tracing::warn!(logger = "toto", "watch out");
    });

    assert_eq!(
        read_lines(&facility.active_log_path()),
        vec![
            "0:00:01         - toto  - INFO     - i = 5",
            "0:00:01         - toto  - WARNING  - watch out",
        ]
    );
}

#[test]
fn tracing_events_fall_back_to_the_target_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock, handle) = manual_clock();
    let facility = LoggingFacility::initialize_with_clock(config("app", dir.path(), 0, 0), handle)
        .expect("initialize");

    let subscriber = tracing_subscriber::registry().with(facility.layer());
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "host::jobs", "started");
    });

    let lines = read_lines(&facility.active_log_path());
    assert_eq!(lines.len(), 1);
    assert!(lines
        .first()
        .expect("one line")
        .contains(" - jobs  - INFO     - started"));
}

#[test]
fn two_facilities_own_independent_sinks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_clock_a, handle_a) = manual_clock();
    let (_clock_b, handle_b) = manual_clock();
    let first =
        LoggingFacility::initialize_with_clock(config("first", dir.path(), 0, 0), handle_a)
            .expect("initialize");
    let second =
        LoggingFacility::initialize_with_clock(config("second", dir.path(), 0, 0), handle_b)
            .expect("initialize");

    first.logger("first").info("one").expect("emit");
    second.logger("secnd").info("two").expect("emit");

    // No duplicate sink: each record lands in exactly one file.
    assert_eq!(read_lines(&first.active_log_path()).len(), 1);
    assert_eq!(read_lines(&second.active_log_path()).len(), 1);
}

#[test]
fn missing_directory_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("logs").join("cron");
    let facility = LoggingFacility::initialize(config("app", &nested, 0, 0)).expect("initialize");

    facility.logger("app").info("created on demand").expect("emit");
    assert!(nested.join("app.log").exists());
}
