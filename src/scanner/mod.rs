//! Per-cycle price capture and the scan loop that drives it.

pub mod scan_loop;
pub mod snapshot;

pub use scan_loop::{LoopState, ScanLoopHandle, ScanStatus, Scanner};
pub use snapshot::PriceSnapshot;
