/*!
Append/read benchmark example for hyperfine performance testing.
*/

use rotalog_core::{init_default_observability, RotatingLog};
use std::time::Instant;

const RECORDS: usize = 2_000;

fn main() {
    init_default_observability().unwrap();

    let temp_dir = tempfile::TempDir::new().unwrap();
    let log = RotatingLog::new(temp_dir.path(), -1).unwrap();

    let record = serde_json::json!({
        "level": "info",
        "service": "checkout",
        "message": "order placed",
        "order": {"id": 90211, "items": 3, "total_cents": 12999},
        "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736"
    });
    let payload = serde_json::to_vec(&record).unwrap();

    let start = Instant::now();
    let addresses: Vec<String> = (0..RECORDS).map(|_| log.write(&payload).unwrap()).collect();
    let write_duration = start.elapsed();

    let start = Instant::now();
    for address in &addresses {
        assert_eq!(log.read(address).unwrap(), payload);
    }
    let read_duration = start.elapsed();

    let archive_size: u64 = log
        .archives()
        .unwrap()
        .iter()
        .map(|path| std::fs::metadata(path).unwrap().len())
        .sum();

    println!("Wrote {RECORDS} records in {write_duration:?}");
    println!("Read {RECORDS} records in {read_duration:?}");
    println!("Payload size: {} bytes", payload.len());
    println!("Archive size: {archive_size} bytes");
}
