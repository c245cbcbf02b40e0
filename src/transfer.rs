// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Scoped CPU mappings over pixel storage.
//!
//! Every operation in this crate that touches pixel bytes goes through a
//! transfer mapping: a guard that marks the storage as CPU-visible for the
//! requested access mode and releases it when dropped.  Acquisition and release
//! are therefore paired on every path, including early returns, which is the
//! contract the copy and resolve engines depend on.
//!
//! The tracker is a single atomic state word per resource:
//! - `UNMAPPED`: no CPU access outstanding
//! - a reader count: one or more read mappings outstanding
//! - `WRITE_MAPPED`: exactly one read-write mapping outstanding
//!
//! The model of this backend is single-threaded and synchronous, but the state
//! word is still atomic so cross-thread misuse fails with a [`MapError`] rather
//! than a torn mapping.

use std::cell::UnsafeCell;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU8, Ordering};

const UNMAPPED: u8 = 0;
const WRITE_MAPPED: u8 = u8::MAX;
const MAX_READERS: u8 = u8::MAX - 1;

/// A resource could not be mapped for the requested access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// A read-write mapping is outstanding.
    #[error("storage is already mapped for writing")]
    MappedForWrite,
    /// Read mappings are outstanding and exclusive access was requested.
    #[error("storage has {readers} outstanding read mappings")]
    MappedForRead {
        /// Number of outstanding read mappings.
        readers: u8,
    },
}

/// Visibility request handed to the [`ResourceFlush`](crate::backend::ResourceFlush)
/// collaborator before storage is mapped.
///
/// On return from the collaborator, the resource's contents at `level` must be
/// visible and stable for the requested access mode.
#[derive(Debug, Clone, Copy)]
pub struct FlushRequest {
    /// Mip level about to be accessed.
    pub level: u8,
    /// True if the caller will only read.
    pub read_only: bool,
    /// True if the access is from the CPU (always true in this crate).
    pub cpu_access: bool,
    /// True if the caller would rather fail than wait.  This crate always
    /// passes false: it accepts blocking in exchange for simplicity.
    pub do_not_block: bool,
    /// Human-readable reason, for diagnostics.
    pub reason: &'static str,
}

/// Byte storage with an atomic map-state tracker.
///
/// Owned by [`PixelResource`](crate::resource::PixelResource); the resource
/// hands out mappings scoped by guard lifetime.
pub(crate) struct MapTracker {
    state: AtomicU8,
    bytes: UnsafeCell<Vec<u8>>,
    debug_label: String,
}

//safety: access to `bytes` is mediated by the atomic state word; a write
//mapping is exclusive and read mappings are shared-read only.
unsafe impl Send for MapTracker {}
unsafe impl Sync for MapTracker {}

impl Debug for MapTracker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapTracker")
            .field("state", &self.state)
            .field("debug_label", &self.debug_label)
            .finish()
    }
}

impl MapTracker {
    pub fn new(byte_len: usize, debug_label: String) -> Self {
        Self {
            state: AtomicU8::new(UNMAPPED),
            bytes: UnsafeCell::new(vec![0; byte_len]),
            debug_label,
        }
    }

    pub fn byte_len(&self) -> usize {
        //safety: len never changes after construction
        unsafe { (*self.bytes.get()).len() }
    }

    /// Acquires a shared read mapping.
    pub fn map_read(&self) -> Result<TransferRead<'_>, MapError> {
        self.state
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |current| {
                match current {
                    WRITE_MAPPED => None,
                    MAX_READERS => None, //saturated; treat as conflict
                    n => Some(n + 1),
                }
            })
            .map_err(|current| match current {
                WRITE_MAPPED => MapError::MappedForWrite,
                readers => MapError::MappedForRead { readers },
            })?;
        #[cfg(test)]
        map_events::record(&self.debug_label, "map_read");
        Ok(TransferRead { tracker: self })
    }

    /// Acquires the exclusive read-write mapping.
    pub fn map_write(&self) -> Result<TransferWrite<'_>, MapError> {
        self.state
            .compare_exchange(UNMAPPED, WRITE_MAPPED, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|current| match current {
                WRITE_MAPPED => MapError::MappedForWrite,
                readers => MapError::MappedForRead { readers },
            })?;
        #[cfg(test)]
        map_events::record(&self.debug_label, "map_write");
        Ok(TransferWrite { tracker: self })
    }

    fn unmap_read(&self) {
        let old = self.state.fetch_sub(1, Ordering::Release);
        assert!(
            old != UNMAPPED && old != WRITE_MAPPED,
            "read unmap from invalid state: {old}"
        );
        #[cfg(test)]
        map_events::record(&self.debug_label, "unmap_read");
    }

    fn unmap_write(&self) {
        let old = self.state.swap(UNMAPPED, Ordering::Release);
        assert_eq!(old, WRITE_MAPPED, "write unmap from invalid state: {old}");
        #[cfg(test)]
        map_events::record(&self.debug_label, "unmap_write");
    }
}

/// Guard for a shared read mapping.  Derefs to the full storage byte slice;
/// unmaps on drop.
pub struct TransferRead<'a> {
    tracker: &'a MapTracker,
}

impl Deref for TransferRead<'_> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        //safety: the state word guarantees no write mapping is outstanding
        unsafe { &*self.tracker.bytes.get() }
    }
}

impl Drop for TransferRead<'_> {
    fn drop(&mut self) {
        self.tracker.unmap_read();
    }
}

impl Debug for TransferRead<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferRead({})", self.tracker.debug_label)
    }
}

/// Guard for the exclusive read-write mapping.  Unmaps on drop.
pub struct TransferWrite<'a> {
    tracker: &'a MapTracker,
}

impl Deref for TransferWrite<'_> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        //safety: the state word guarantees this mapping is exclusive
        unsafe { &*self.tracker.bytes.get() }
    }
}

impl DerefMut for TransferWrite<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        //safety: as above
        unsafe { &mut *self.tracker.bytes.get() }
    }
}

impl Drop for TransferWrite<'_> {
    fn drop(&mut self) {
        self.tracker.unmap_write();
    }
}

impl Debug for TransferWrite<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferWrite({})", self.tracker.debug_label)
    }
}

/// Addressing for a mapped box region: byte offsets into the storage slice.
///
/// `base` points at the first byte of the box (level origin plus box origin);
/// rows are `row_stride` apart, depth slices `slice_stride` apart, and each row
/// carries `row_bytes` of payload.
#[derive(Debug, Clone, Copy)]
pub struct TransferLayout {
    pub(crate) base: usize,
    /// Payload bytes per row: box width times block size.
    pub row_bytes: usize,
    /// Bytes between the starts of consecutive rows.
    pub row_stride: usize,
    /// Bytes between the starts of consecutive depth slices.
    pub slice_stride: usize,
    /// Rows per slice (box height).
    pub rows: u32,
    /// Number of depth slices (box depth).
    pub slices: u32,
}

impl TransferLayout {
    /// Byte offset of row `y` in slice `z`, relative to the storage slice.
    #[inline]
    pub fn offset(&self, z: u32, y: u32) -> usize {
        assert!(z < self.slices && y < self.rows);
        self.base + z as usize * self.slice_stride + y as usize * self.row_stride
    }
}

/// A read mapping of a box region: storage guard plus addressing.
#[derive(Debug)]
pub struct TransferReadMapping<'a> {
    pub(crate) guard: TransferRead<'a>,
    pub(crate) layout: TransferLayout,
}

impl TransferReadMapping<'_> {
    pub fn layout(&self) -> &TransferLayout {
        &self.layout
    }

    /// The whole storage byte slice; index with [`TransferLayout::offset`].
    pub fn bytes(&self) -> &[u8] {
        &self.guard
    }

    /// Payload of row `y` in slice `z`.
    pub fn row(&self, z: u32, y: u32) -> &[u8] {
        let offset = self.layout.offset(z, y);
        &self.guard[offset..offset + self.layout.row_bytes]
    }
}

/// A read-write mapping of a box region.
#[derive(Debug)]
pub struct TransferWriteMapping<'a> {
    pub(crate) guard: TransferWrite<'a>,
    pub(crate) layout: TransferLayout,
}

impl TransferWriteMapping<'_> {
    pub fn layout(&self) -> &TransferLayout {
        &self.layout
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.guard
    }

    /// Mutable payload of row `y` in slice `z`.
    pub fn row_mut(&mut self, z: u32, y: u32) -> &mut [u8] {
        let offset = self.layout.offset(z, y);
        &mut self.guard[offset..offset + self.layout.row_bytes]
    }
}
