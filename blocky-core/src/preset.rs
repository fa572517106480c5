/// Built-in drawing loaded by the "preset" action
use nalgebra::Point2;

use crate::color::Rgba;
use crate::stroke::StrokeList;

/// Gray freighter seen from above: vertices in device coordinates plus a
/// gray level per triangle.
const FREIGHTER: [([[f32; 2]; 3], f32); 31] = [
    // Left hull
    ([[-0.3, 0.85], [-0.6, 0.2], [-0.15, 0.2]], 0.75),
    ([[-0.15, 0.85], [-0.15, 0.2], [-0.3, 0.85]], 0.7),
    ([[-0.6, 0.2], [0.0, -0.2], [-0.15, 0.2]], 0.6),
    ([[-0.72, 0.0], [0.0, -0.2], [-0.6, 0.2]], 0.75),
    ([[-0.72, 0.0], [0.0, -0.2], [-0.77, -0.2]], 0.7),
    ([[-0.77, -0.4], [0.0, -0.2], [-0.72, -0.6]], 0.7),
    ([[-0.72, -0.6], [0.0, -0.2], [-0.6, -0.77]], 0.6),
    ([[-0.6, -0.77], [0.0, -0.2], [-0.4, -0.89]], 0.7),
    ([[-0.4, -0.89], [0.0, -0.2], [-0.2, -0.95]], 0.75),
    ([[-0.2, -0.95], [0.0, -0.2], [-0.06, -0.96]], 0.7),
    ([[-0.72, -0.2], [0.0, -0.2], [-0.72, -0.389]], 0.6),
    // Right hull
    ([[0.3, 0.85], [0.6, 0.2], [0.15, 0.2]], 0.7),
    ([[0.15, 0.85], [0.15, 0.2], [0.3, 0.85]], 0.75),
    ([[0.6, 0.2], [0.0, -0.2], [0.15, 0.2]], 0.6),
    ([[0.72, 0.0], [0.0, -0.2], [0.6, 0.2]], 0.7),
    ([[0.72, 0.0], [0.0, -0.2], [0.77, -0.2]], 0.75),
    ([[0.77, -0.4], [0.0, -0.2], [0.72, -0.6]], 0.7),
    ([[0.72, -0.6], [0.0, -0.2], [0.6, -0.77]], 0.6),
    ([[0.6, -0.77], [0.0, -0.2], [0.4, -0.89]], 0.7),
    ([[0.4, -0.89], [0.0, -0.2], [0.2, -0.95]], 0.75),
    ([[0.2, -0.95], [0.0, -0.2], [0.06, -0.96]], 0.7),
    ([[0.72, -0.2], [0.0, -0.2], [0.72, -0.389]], 0.6),
    // Center
    ([[-0.15, 0.2], [0.0, -0.2], [0.15, 0.2]], 0.7),
    ([[-0.06, -0.96], [0.0, -0.2], [0.06, -0.96]], 0.75),
    // Cockpit
    ([[0.6, 0.2], [0.72, 0.0], [0.85, 0.05]], 0.6),
    ([[0.6, 0.2], [0.85, 0.05], [0.87, 0.2]], 0.7),
    ([[0.6, 0.2], [0.6, 0.3], [0.87, 0.2]], 0.6),
    ([[0.87, 0.3], [0.6, 0.3], [0.87, 0.2]], 0.7),
    ([[0.6, 0.3], [0.6675, 0.45], [0.735, 0.3]], 0.25),
    ([[0.87, 0.3], [0.8025, 0.45], [0.735, 0.3]], 0.25),
    ([[0.6675, 0.45], [0.8025, 0.45], [0.735, 0.3]], 0.3),
];

/// Replace the list contents with the preset drawing, one facet per
/// triangle, in painting order. Returns the number of facets placed.
pub fn load_freighter(strokes: &mut StrokeList) -> usize {
    strokes.clear();
    for (vertices, gray) in FREIGHTER {
        strokes.place_facet(vertices.map(Point2::from), Rgba::rgb(gray, gray, gray));
    }
    strokes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{MarkKind, PrimitiveKind};

    #[test]
    fn test_preset_replaces_existing_marks() {
        let mut strokes = StrokeList::new();
        strokes.place(MarkKind::Point, Point2::new(0.9, 0.9), Rgba::RED, 5.0, 3);

        let placed = load_freighter(&mut strokes);
        assert_eq!(placed, FREIGHTER.len());
        assert!(strokes
            .all_instances()
            .iter()
            .all(|m| m.kind() == PrimitiveKind::Facet));
        assert_ne!(strokes.all_instances()[0].color(), Rgba::RED);
    }

    #[test]
    fn test_preset_fits_canvas() {
        for (vertices, gray) in FREIGHTER {
            assert!((0.0..=1.0).contains(&gray));
            for [x, y] in vertices {
                assert!(x.abs() <= 1.0 && y.abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_preset_marks_undo_individually() {
        let mut strokes = StrokeList::new();
        load_freighter(&mut strokes);
        strokes.undo();
        assert_eq!(strokes.len(), FREIGHTER.len() - 1);
    }
}
