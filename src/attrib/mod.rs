//! Vertex attribute registry.
//!
//! Every mesh layout is described by an [`AttributeMask`], a bit-set over the
//! closed set of [`AttributeKind`]s. The registry maps each kind to its
//! component count, mask bit, shader binding slot and shader attribute name.
//!
//! The table is defined once at process start and never mutated, so it is
//! shared by all mesh builders without synchronization. Layout derivation
//! (byte offsets and strides) lives in [`layout`].

pub mod layout;

pub use layout::{layout_for, AttributeLayout};

use bitflags::bitflags;

/// Size in bytes of one 32-bit float component.
pub const FLOAT32_SIZE: u32 = std::mem::size_of::<f32>() as u32;

/// Size in bytes of one 16-bit index element.
pub const UINT16_SIZE: u32 = std::mem::size_of::<u16>() as u32;

/// Number of defined attribute kinds.
pub const ATTRIBUTE_KIND_COUNT: usize = 5;

/// Per-vertex attribute kinds supported by mesh layouts.
///
/// Fixed, closed set. Declaration order is the canonical order in which
/// attribute data is interleaved within a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Vertex position, three floats.
    Position,
    /// Texture coordinates, two floats.
    TexCoord,
    /// Vertex normal, three floats.
    Normal,
    /// Vertex color, four floats (rgba in `[0, 1]`).
    Color,
    /// Point size, one float.
    Size,
}

/// Canonical attribute order used for interleaving and iteration.
pub const CANONICAL_ORDER: [AttributeKind; ATTRIBUTE_KIND_COUNT] = [
    AttributeKind::Position,
    AttributeKind::TexCoord,
    AttributeKind::Normal,
    AttributeKind::Color,
    AttributeKind::Size,
];

/// Static description of one attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// The kind this descriptor describes.
    pub kind: AttributeKind,
    /// Number of 32-bit float components per vertex.
    pub component_count: u32,
    /// Bit identifying the kind inside an [`AttributeMask`].
    pub bit_flag: u32,
    /// Shader attribute location the kind binds to.
    pub binding_slot: u32,
    /// Attribute name used in shader source.
    pub shader_name: &'static str,
}

static DESCRIPTORS: [AttributeDescriptor; ATTRIBUTE_KIND_COUNT] = [
    AttributeDescriptor {
        kind: AttributeKind::Position,
        component_count: 3,
        bit_flag: 1 << 0,
        binding_slot: 0,
        shader_name: "aPosition",
    },
    AttributeDescriptor {
        kind: AttributeKind::TexCoord,
        component_count: 2,
        bit_flag: 1 << 1,
        binding_slot: 1,
        shader_name: "aTexCoord",
    },
    AttributeDescriptor {
        kind: AttributeKind::Normal,
        component_count: 3,
        bit_flag: 1 << 2,
        binding_slot: 2,
        shader_name: "aNormal",
    },
    AttributeDescriptor {
        kind: AttributeKind::Color,
        component_count: 4,
        bit_flag: 1 << 3,
        binding_slot: 3,
        shader_name: "aColor",
    },
    AttributeDescriptor {
        kind: AttributeKind::Size,
        component_count: 1,
        bit_flag: 1 << 4,
        binding_slot: 4,
        shader_name: "aSize",
    },
];

impl AttributeKind {
    /// Table index of this kind (also its canonical position).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static descriptor for this kind.
    pub fn descriptor(self) -> &'static AttributeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Number of 32-bit float components.
    pub fn component_count(self) -> u32 {
        self.descriptor().component_count
    }

    /// Size in bytes this attribute occupies within one vertex.
    pub fn byte_size(self) -> u32 {
        self.component_count() * FLOAT32_SIZE
    }

    /// Shader attribute location.
    pub fn binding_slot(self) -> u32 {
        self.descriptor().binding_slot
    }

    /// Attribute name in shader source.
    pub fn shader_name(self) -> &'static str {
        self.descriptor().shader_name
    }

    /// Mask containing only this kind.
    pub fn mask(self) -> AttributeMask {
        AttributeMask::from_bits_truncate(self.descriptor().bit_flag)
    }
}

bitflags! {
    /// Bit-set selecting which attribute kinds a mesh layout includes.
    ///
    /// The raw bits double as the cache key for derived layouts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeMask: u32 {
        /// Vertex position.
        const POSITION = 1 << 0;
        /// Texture coordinates.
        const TEXCOORD = 1 << 1;
        /// Vertex normal.
        const NORMAL = 1 << 2;
        /// Vertex color.
        const COLOR = 1 << 3;
        /// Point size.
        const SIZE = 1 << 4;
    }
}

impl AttributeMask {
    /// Check whether the mask includes the given kind.
    pub fn has(self, kind: AttributeKind) -> bool {
        self.contains(kind.mask())
    }

    /// Iterate the kinds present in this mask, in canonical order.
    pub fn kinds(self) -> impl Iterator<Item = AttributeKind> {
        CANONICAL_ORDER.into_iter().filter(move |kind| self.has(*kind))
    }

    /// Total float component count over all present kinds.
    pub fn component_count(self) -> u32 {
        self.kinds().map(AttributeKind::component_count).sum()
    }
}
