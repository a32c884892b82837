/*!
End-to-end tests for the rotating log.
These exercise the public API against a real temporary directory.
*/

use chrono::{Local, TimeZone};
use rayon::prelude::*;
use rotalog_core::{
    Address, GzipCompressor, ManualClock, RetentionCadence, RotalogError, RotatingLog,
    RotatingLogConfig, END_MARKER_SIZE,
};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn log_with_clock(
    dir: &std::path::Path,
    max_log_files: i64,
    cadence: RetentionCadence,
) -> (RotatingLog<GzipCompressor, Arc<ManualClock>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Local.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let config = RotatingLogConfig::new(dir)
        .with_max_log_files(max_log_files)
        .with_retention_cadence(cadence);
    let log = RotatingLog::with_components(config, GzipCompressor::new(), Arc::clone(&clock)).unwrap();
    (log, clock)
}

#[test]
fn test_complete_log_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let (log, clock) = log_with_clock(temp_dir.path(), 3, RetentionCadence::OnRotation);

    let request_log = serde_json::json!({
        "method": "POST",
        "path": "/api/v1/orders",
        "status": 201,
        "latency_ms": 37,
        "headers": {"content-type": "application/json", "x-request-id": "b9f1c2"},
    });
    let json_payload = serde_json::to_vec(&request_log).unwrap();

    // Day 1: a handful of records of varied sizes
    let mut day_one = Vec::new();
    for payload in [json_payload.clone(), Vec::new(), vec![0x5Au8; 10 * 1024]] {
        day_one.push((log.write(&payload).unwrap(), payload));
    }
    for (address, payload) in &day_one {
        assert_eq!(&log.read(address).unwrap(), payload);
    }

    // Days 2-5: rotation prunes day 1 and day 2
    let mut latest = Vec::new();
    for day in 2..=5 {
        clock.advance_days(1);
        let payload = format!("day {day}").into_bytes();
        latest.push((log.write(&payload).unwrap(), payload));
    }

    let archives: Vec<String> = log
        .archives()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        archives,
        vec!["2024-06-03.tar.gz", "2024-06-04.tar.gz", "2024-06-05.tar.gz"]
    );

    for (address, _) in &day_one {
        assert!(matches!(log.read(address), Err(RotalogError::ArchiveNotFound(_))));
    }
    for (address, payload) in latest.iter().skip(1) {
        assert_eq!(&log.read(address).unwrap(), payload);
    }
}

#[test]
fn test_archive_stays_a_valid_tar_stream() {
    let temp_dir = TempDir::new().unwrap();
    let (log, _clock) = log_with_clock(temp_dir.path(), -1, RetentionCadence::Manual);

    let addresses: Vec<String> = (0..10)
        .map(|i| log.write(format!("entry {i}").as_bytes()).unwrap())
        .collect();

    let archive_path = temp_dir.path().join("2024-06-01.tar.gz");
    let bytes = fs::read(&archive_path).unwrap();

    // Exactly one end marker, at the very end
    let marker = END_MARKER_SIZE as usize;
    assert!(bytes[bytes.len() - marker..].iter().all(|b| *b == 0));
    assert_eq!(bytes.len() % 512, 0);

    // Any tar reader sees every entry in write order
    let mut archive = tar::Archive::new(fs::File::open(&archive_path).unwrap());
    let names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, addresses);

    let entries = log.entries("2024-06-01.tar.gz").unwrap();
    assert_eq!(entries.len(), 10);
    for info in &entries {
        assert_eq!(Address::parse(&info.address).unwrap().offset, info.offset);
    }
}

#[test]
fn test_concurrent_writes_and_reads() {
    let temp_dir = TempDir::new().unwrap();
    let log = RotatingLog::new(temp_dir.path(), -1).unwrap();

    let written: Vec<(String, Vec<u8>)> = (0..200)
        .into_par_iter()
        .map(|i| {
            let payload = format!("concurrent record {i} ").repeat(i % 17 + 1).into_bytes();
            (log.write(&payload).unwrap(), payload)
        })
        .collect();

    let unique: HashSet<&String> = written.iter().map(|(address, _)| address).collect();
    assert_eq!(unique.len(), written.len());

    written.par_iter().for_each(|(address, payload)| {
        assert_eq!(&log.read(address).unwrap(), payload);
    });
}

#[test]
fn test_error_kinds() {
    let temp_dir = TempDir::new().unwrap();
    let (log, _clock) = log_with_clock(temp_dir.path(), -1, RetentionCadence::Manual);
    log.write(b"present").unwrap();

    assert!(matches!(log.read("no-slash-here"), Err(RotalogError::MalformedAddress(_))));
    assert!(matches!(
        log.read("file.ext/not-a-number"),
        Err(RotalogError::MalformedAddress(_))
    ));
    assert!(matches!(
        log.read("nonexistent.ext/0"),
        Err(RotalogError::ArchiveNotFound(_))
    ));
    assert!(matches!(
        log.read("2024-06-01.tar.gz/999999999"),
        Err(RotalogError::EntryNotFound(_))
    ));
}

#[test]
fn test_damaged_payload_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let (log, _clock) = log_with_clock(temp_dir.path(), -1, RetentionCadence::Manual);
    let address = log.write(b"soon to be damaged").unwrap();

    // Flip the gzip magic in the first data block; the tar header stays intact
    let archive_path = temp_dir.path().join("2024-06-01.tar.gz");
    let mut bytes = fs::read(&archive_path).unwrap();
    bytes[512] ^= 0xFF;
    fs::write(&archive_path, bytes).unwrap();

    match log.read(&address) {
        Err(RotalogError::Compression(_)) => {}
        other => panic!("expected a compression error, got {other:?}"),
    }
}

#[test]
fn test_instances_are_independent() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let first = RotatingLog::new(first_dir.path(), -1).unwrap();
    let second = RotatingLog::new(second_dir.path(), -1).unwrap();

    let a = first.write(b"first").unwrap();
    let b = second.write(b"second").unwrap();

    // Same archive name and offset, different directories
    assert_eq!(a, b);
    assert_eq!(first.read(&a).unwrap(), b"first");
    assert_eq!(second.read(&b).unwrap(), b"second");
}
