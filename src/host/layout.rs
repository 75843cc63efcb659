//! Vertical stacking of top-level fields via Taffy.
//!
//! Each child of the render root becomes a fixed-height leaf in a column
//! flex container spanning the terminal width. Only the row offsets are
//! used; painting is line based.

use taffy::{
    AvailableSpace, Dimension, Display, FlexDirection, LengthPercentage, NodeId, Size, Style,
    TaffyResult, TaffyTree,
};

/// Row offset of each block, given block heights and the gap between them.
///
/// Falls back to a plain running sum if Taffy rejects the tree.
pub fn stack_offsets(heights: &[u16], width: u16, gap: u16) -> Vec<u16> {
    match taffy_offsets(heights, width, gap) {
        Ok(offsets) => offsets,
        Err(err) => {
            log::warn!("layout failed, stacking manually: {err}");
            cumulative_offsets(heights, gap)
        }
    }
}

fn taffy_offsets(heights: &[u16], width: u16, gap: u16) -> TaffyResult<Vec<u16>> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let leaves = heights
        .iter()
        .map(|&height| {
            tree.new_leaf(Style {
                size: Size {
                    width: Dimension::Percent(1.0),
                    height: Dimension::Length(height as f32),
                },
                flex_shrink: 0.0,
                ..Default::default()
            })
        })
        .collect::<TaffyResult<Vec<NodeId>>>()?;

    let root = tree.new_with_children(
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            gap: Size {
                width: LengthPercentage::Length(0.0),
                height: LengthPercentage::Length(gap as f32),
            },
            size: Size {
                width: Dimension::Length(width as f32),
                height: Dimension::Auto,
            },
            ..Default::default()
        },
        &leaves,
    )?;

    tree.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(width as f32),
            height: AvailableSpace::MaxContent,
        },
    )?;

    leaves
        .iter()
        .map(|&leaf| tree.layout(leaf).map(|layout| layout.location.y.round() as u16))
        .collect()
}

fn cumulative_offsets(heights: &[u16], gap: u16) -> Vec<u16> {
    let mut y = 0u16;
    heights
        .iter()
        .map(|&height| {
            let offset = y;
            y = y.saturating_add(height).saturating_add(gap);
            offset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_with_gap() {
        assert_eq!(stack_offsets(&[1, 3, 2], 40, 1), vec![0, 2, 6]);
    }

    #[test]
    fn test_stack_without_gap() {
        assert_eq!(stack_offsets(&[2, 2], 10, 0), vec![0, 2]);
    }

    #[test]
    fn test_empty() {
        assert!(stack_offsets(&[], 80, 1).is_empty());
    }

    #[test]
    fn test_cumulative_matches() {
        assert_eq!(cumulative_offsets(&[1, 3, 2], 1), vec![0, 2, 6]);
    }
}
