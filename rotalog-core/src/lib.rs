/*!
# Rotalog Core

Append-only, self-rotating log store.

Callers hand the log opaque byte payloads. Each payload is compressed and
appended as one entry of the current day's archive file, and the caller gets
back a compact address string that retrieves exactly that record later:

- One POSIX tar archive per calendar day, named `YYYY-MM-DD.tar.gz`
- Each entry holds one independently gzip-compressed payload
- Addresses look like `2024-03-09.tar.gz/1536`: the archive name and the byte
  offset of the entry header, which is also the entry's name inside the archive
- Appends overwrite the archive's end-of-archive marker in place, so writes
  never re-read the archive
- Old archives are pruned oldest-first beyond a configured count

## Usage

```rust,no_run
use rotalog_core::{RotatingLog, RotalogError};

let log = RotatingLog::new("/var/lib/myapp/audit", 30)?;

let address = log.write(b"{\"event\":\"login\",\"user\":42}")?;
let payload = log.read(&address)?;

match log.read("2001-01-01.tar.gz/0") {
    Err(RotalogError::ArchiveNotFound(_)) => { /* rotated away */ }
    other => { other?; }
}
# Ok::<(), RotalogError>(())
```
*/

pub mod address;
pub mod clock;
pub mod compression;
pub mod config;
pub mod error;
pub mod observability;
pub mod retention;
pub mod rotating_log;
pub mod segment;


pub use address::Address;
pub use clock::{archive_file_name, Clock, ManualClock, SystemClock, ARCHIVE_EXTENSION};
pub use compression::{CompressionAdapter, GzipCompressor, NoCompression};
pub use config::RotatingLogConfig;
pub use error::{Result, RotalogError};
#[cfg(feature = "metrics")]
pub use observability::LogMetrics;
pub use observability::{init_default_observability, init_observability};
pub use retention::{RetentionCadence, RetentionLimit};
pub use rotating_log::RotatingLog;
pub use segment::{EntryInfo, END_MARKER_SIZE};
