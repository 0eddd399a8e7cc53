//! Durable transaction log for handoff coordination: append-only,
//! CRC32-checksummed framing on disk, with an in-memory backend for tests.

mod crc32;
mod error;
mod file;
mod memory;
mod merge;
mod record;
mod trait_def;

pub use error::LogError;
pub use file::FileLog;
pub use memory::MemoryLog;
pub use trait_def::Log;
