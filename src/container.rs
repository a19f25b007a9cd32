//! Growable typed buffer for per-frame vertex data.
//!
//! [`DynamicBuffer`] owns a backing store and tracks a logical length
//! separately from capacity. Clearing resets the length without releasing
//! the store, so a builder that refills the buffer every frame stops
//! allocating once the store has grown to the frame's working size.
//!
//! Upload code must never see the unused tail: [`DynamicBuffer::as_slice`]
//! and [`DynamicBuffer::bytes`] cover exactly the `[0, len)` region.

use bytemuck::Pod;

/// Append-only numeric buffer with capacity reuse across frames.
#[derive(Debug, Clone)]
pub struct DynamicBuffer<T: Pod> {
    store: Box<[T]>,
    len: usize,
}

impl<T: Pod> DynamicBuffer<T> {
    /// Backing capacity used by [`DynamicBuffer::new`].
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Create a buffer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: zeroed_store(capacity),
            len: 0,
        }
    }

    /// Number of elements in use.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no elements are in use.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the backing store can hold without growing.
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// Reset the length to zero, keeping the backing store.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one element, growing the store if needed.
    pub fn push(&mut self, value: T) {
        self.ensure_capacity(self.len + 1);
        self.store[self.len] = value;
        self.len += 1;
    }

    /// Append a run of elements, growing the store if needed.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        let required = self.len + values.len();
        self.ensure_capacity(required);
        self.store[self.len..required].copy_from_slice(values);
        self.len = required;
    }

    /// View over exactly the `[0, len)` elements in use.
    pub fn as_slice(&self) -> &[T] {
        &self.store[..self.len]
    }

    /// The in-use region as raw bytes, for device upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    fn ensure_capacity(&mut self, required: usize) {
        if required <= self.store.len() {
            return;
        }
        let new_capacity = required.max(self.store.len() * 2);
        let mut grown = zeroed_store(new_capacity);
        grown[..self.len].copy_from_slice(&self.store[..self.len]);
        self.store = grown;
    }
}

impl<T: Pod> Default for DynamicBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn zeroed_store<T: Pod>(capacity: usize) -> Box<[T]> {
    vec![T::zeroed(); capacity].into_boxed_slice()
}
