//! Layout derivation tests across attribute combinations.
//!
//! Parameterized with `rstest` so every mask combination shows up as its own
//! test case.
//!
//! ```bash
//! cargo test --test layout_cases
//! ```

use std::sync::Arc;

use rstest::rstest;

use immediate_mesh::{layout_for, AttributeKind, AttributeMask};

/// Stride is the packed sum of present component sizes.
#[rstest]
#[case::position(AttributeMask::POSITION, 12)]
#[case::position_texcoord(AttributeMask::POSITION | AttributeMask::TEXCOORD, 20)]
#[case::position_color(AttributeMask::POSITION | AttributeMask::COLOR, 28)]
#[case::lit_colored(
    AttributeMask::POSITION | AttributeMask::NORMAL | AttributeMask::COLOR,
    40
)]
#[case::point_sprite(
    AttributeMask::POSITION | AttributeMask::COLOR | AttributeMask::SIZE,
    32
)]
#[case::everything(AttributeMask::all(), 52)]
fn test_vertex_stride(#[case] mask: AttributeMask, #[case] stride: u32) {
    let layout = layout_for(mask);
    assert_eq!(layout.vertex_stride(), stride);
    assert_eq!(layout.floats_per_vertex() * 4, stride);
}

/// Offsets follow canonical order and skip absent kinds without gaps.
#[rstest]
#[case::color_after_position(
    AttributeMask::POSITION | AttributeMask::COLOR,
    AttributeKind::Color,
    12
)]
#[case::texcoord_after_position(
    AttributeMask::POSITION | AttributeMask::TEXCOORD,
    AttributeKind::TexCoord,
    12
)]
#[case::normal_skips_absent_texcoord(
    AttributeMask::POSITION | AttributeMask::NORMAL,
    AttributeKind::Normal,
    12
)]
#[case::color_in_full_layout(AttributeMask::all(), AttributeKind::Color, 32)]
#[case::size_comes_last(AttributeMask::all(), AttributeKind::Size, 48)]
fn test_offset_placement(
    #[case] mask: AttributeMask,
    #[case] kind: AttributeKind,
    #[case] offset: u32,
) {
    assert_eq!(layout_for(mask).offset_of(kind), Some(offset));
}

/// Kinds outside the mask have no offset.
#[rstest]
#[case::texcoord(AttributeKind::TexCoord)]
#[case::normal(AttributeKind::Normal)]
#[case::size(AttributeKind::Size)]
fn test_absent_kind_has_no_offset(#[case] kind: AttributeKind) {
    let layout = layout_for(AttributeMask::POSITION | AttributeMask::COLOR);
    assert_eq!(layout.offset_of(kind), None);
}

/// The registry ties each kind to its component count, slot and shader name.
#[rstest]
#[case::position(AttributeKind::Position, 3, 0, "aPosition")]
#[case::texcoord(AttributeKind::TexCoord, 2, 1, "aTexCoord")]
#[case::normal(AttributeKind::Normal, 3, 2, "aNormal")]
#[case::color(AttributeKind::Color, 4, 3, "aColor")]
#[case::size(AttributeKind::Size, 1, 4, "aSize")]
fn test_attribute_registry(
    #[case] kind: AttributeKind,
    #[case] components: u32,
    #[case] slot: u32,
    #[case] name: &str,
) {
    assert_eq!(kind.component_count(), components);
    assert_eq!(kind.binding_slot(), slot);
    assert_eq!(kind.shader_name(), name);
    assert_eq!(kind.mask().bits(), 1 << slot);
}

#[test]
fn test_layouts_are_shared_per_mask() {
    let mask = AttributeMask::POSITION | AttributeMask::NORMAL;
    let first = layout_for(mask);
    let second = layout_for(AttributeMask::NORMAL | AttributeMask::POSITION);
    assert!(Arc::ptr_eq(&first, &second));

    let other = layout_for(AttributeMask::POSITION);
    assert!(!Arc::ptr_eq(&first, &other));
}

#[test]
fn test_layout_reports_present_kinds_in_canonical_order() {
    let mask = AttributeMask::SIZE | AttributeMask::TEXCOORD | AttributeMask::POSITION;
    let kinds: Vec<_> = layout_for(mask).kinds().collect();
    assert_eq!(
        kinds,
        vec![
            AttributeKind::Position,
            AttributeKind::TexCoord,
            AttributeKind::Size
        ]
    );
}
