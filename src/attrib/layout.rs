//! Interleaved attribute layout derivation.
//!
//! Given an [`AttributeMask`], this module computes where each present
//! attribute lives inside one interleaved vertex:
//!
//! - **Offsets** are assigned in canonical kind order with no gaps and no
//!   overlap, starting at byte 0.
//! - **Stride** is the sum of `component_count * 4` over present kinds.
//!
//! Interleaving (rather than one buffer per attribute) keeps drawing down to
//! a single vertex-buffer bind. Because the canonical order makes the layout
//! deterministic per mask, layouts are cached process-wide and shared via
//! `Arc`; repeated mesh creation with the same attribute combination reuses
//! the computation.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::{AttributeKind, AttributeMask, ATTRIBUTE_KIND_COUNT};
use crate::device::RenderDevice;

/// Byte offsets and stride for one interleaved vertex layout.
///
/// Derived from an [`AttributeMask`]; offsets are only meaningful for kinds
/// present in the mask. Obtain shared instances through [`layout_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLayout {
    mask: AttributeMask,
    offsets: [u32; ATTRIBUTE_KIND_COUNT],
    vertex_stride: u32,
}

impl AttributeLayout {
    /// Compute the layout for a mask by walking the canonical kind order.
    pub fn interleaved(mask: AttributeMask) -> Self {
        let mut offsets = [0u32; ATTRIBUTE_KIND_COUNT];
        let mut running = 0u32;
        for kind in mask.kinds() {
            offsets[kind.index()] = running;
            running += kind.byte_size();
        }
        Self {
            mask,
            offsets,
            vertex_stride: running,
        }
    }

    /// The mask this layout was derived from.
    pub fn mask(&self) -> AttributeMask {
        self.mask
    }

    /// Byte distance between the start of consecutive vertices.
    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    /// Number of `f32` elements one vertex occupies.
    pub fn floats_per_vertex(&self) -> u32 {
        self.mask.component_count()
    }

    /// Byte offset of a kind within one vertex, `None` if absent.
    pub fn offset_of(&self, kind: AttributeKind) -> Option<u32> {
        if self.mask.has(kind) {
            Some(self.offsets[kind.index()])
        } else {
            None
        }
    }

    /// Iterate the present kinds in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = AttributeKind> {
        self.mask.kinds()
    }
}

/// Stable cache key for an attribute combination.
pub fn layout_key(mask: AttributeMask) -> u32 {
    mask.bits()
}

/// Total vertex stride in bytes for a mask, without building a layout.
pub fn vertex_byte_stride(mask: AttributeMask) -> u32 {
    mask.kinds().map(AttributeKind::byte_size).sum()
}

/// Shared layout for a mask, computed once per attribute combination.
pub fn layout_for(mask: AttributeMask) -> Arc<AttributeLayout> {
    static CACHE: OnceLock<Mutex<HashMap<u32, Arc<AttributeLayout>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock();
    cache
        .entry(layout_key(mask))
        .or_insert_with(|| Arc::new(AttributeLayout::interleaved(mask)))
        .clone()
}

/// Configure the device to read each present attribute from the currently
/// bound vertex buffer and enable its slot.
///
/// Mutates the state of the currently bound vertex-array object, so the
/// owning vertex array must be bound before calling this.
pub fn bind_attrib_pointers<D: RenderDevice>(device: &mut D, layout: &AttributeLayout) {
    for kind in layout.kinds() {
        let offset = layout.offsets[kind.index()];
        device.vertex_attrib_pointer(
            kind.binding_slot(),
            kind.component_count(),
            layout.vertex_stride(),
            offset,
        );
        device.enable_vertex_attrib(kind.binding_slot());
    }
}
