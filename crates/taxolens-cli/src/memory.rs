//! Heap usage accounting
//!
//! A counting wrapper around the system allocator. The binary installs
//! [`CountingAllocator`] as its `#[global_allocator]`; [`HeapSnapshot`]
//! reads the counters at three points of the footprint pipeline. Without
//! the allocator installed (library tests, for instance) snapshots simply
//! report zero.

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

fn record_alloc(size: usize) {
    let now = ALLOCATED.fetch_add(size, Ordering::Relaxed) + size;
    PEAK.fetch_max(now, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    ALLOCATED.fetch_sub(size, Ordering::Relaxed);
}

/// System allocator wrapper that tracks live and peak heap bytes.
pub struct CountingAllocator;

// SAFETY: delegates every operation to `System` unchanged; only the
// accounting counters are touched on top.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record_dealloc(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

/// Point-in-time view of heap usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSnapshot {
    /// Bytes currently allocated
    pub allocated_bytes: usize,
    /// High-water mark since process start
    pub peak_bytes: usize,
}

impl HeapSnapshot {
    /// Reads the current counters.
    pub fn capture() -> Self {
        Self {
            allocated_bytes: ALLOCATED.load(Ordering::Relaxed),
            peak_bytes: PEAK.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for HeapSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in use ({}), peak {} bytes ({})",
            self.allocated_bytes,
            mib(self.allocated_bytes),
            self.peak_bytes,
            mib(self.peak_bytes)
        )
    }
}

fn mib(bytes: usize) -> String {
    format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
}
