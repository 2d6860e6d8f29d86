use crate::error::RegionError;
use crate::geometry::{top_y, touches_rect};
use crate::model::Detection;
use crate::region::Rect;

/// Detections whose confidence is at or below this are dropped.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// A piece of text selected for a region, with its top edge for ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub y: f32,
}

/// A detection skipped because its polygon could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidDetection {
    /// Position of the detection in the page's detection list.
    pub index: usize,
    pub error: RegionError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Qualifying text in detection order.
    pub candidates: Vec<Candidate>,
    pub invalid: Vec<InvalidDetection>,
}

/// Pick the detections that touch `rect` and whose confidence is strictly
/// above `threshold`.
pub fn select_candidates(detections: &[Detection], rect: &Rect, threshold: f32) -> Selection {
    let mut selection = Selection::default();

    for (index, detection) in detections.iter().enumerate() {
        match touches_rect(&detection.polygon, rect) {
            Ok(true) => {
                if detection.confidence > threshold {
                    selection.candidates.push(Candidate {
                        text: detection.text.clone(),
                        y: top_y(&detection.polygon),
                    });
                }
            }
            Ok(false) => {}
            Err(error) => {
                tracing::warn!(index, %error, text = %detection.text, "skipping detection");
                selection.invalid.push(InvalidDetection { index, error });
            }
        }
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{box_polygon, Point};

    fn det(x: f32, y: f32, text: &str, confidence: f32) -> Detection {
        Detection {
            polygon: box_polygon(x, y, 30.0, 10.0),
            text: text.into(),
            confidence,
        }
    }

    #[test]
    fn keeps_contained_confident_detections_in_order() {
        let rect = Rect::new(0, 0, 100, 100);
        let dets = vec![
            det(10.0, 50.0, "second", 0.9),
            det(500.0, 500.0, "outside", 0.99),
            det(10.0, 10.0, "first", 0.7),
        ];
        let sel = select_candidates(&dets, &rect, 0.5);
        let texts: Vec<_> = sel.candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(sel.candidates[0].y, 50.0);
        assert!(sel.invalid.is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        let rect = Rect::new(0, 0, 100, 100);
        let t = 0.5_f32;
        let at = select_candidates(&[det(10.0, 10.0, "at", t)], &rect, t);
        assert!(at.candidates.is_empty());

        let above = select_candidates(&[det(10.0, 10.0, "above", t + f32::EPSILON)], &rect, t);
        assert_eq!(above.candidates.len(), 1);
    }

    #[test]
    fn low_confidence_excluded_even_when_contained() {
        let rect = Rect::new(0, 0, 100, 100);
        let sel = select_candidates(&[det(10.0, 10.0, "faint", 0.2)], &rect, 0.5);
        assert!(sel.candidates.is_empty());
    }

    #[test]
    fn invalid_geometry_is_reported_not_fatal() {
        let rect = Rect::new(0, 0, 100, 100);
        let broken = Detection {
            polygon: vec![Point::new(10.0, 10.0)],
            text: "broken".into(),
            confidence: 0.9,
        };
        let sel = select_candidates(&[broken, det(20.0, 20.0, "ok", 0.9)], &rect, 0.5);
        assert_eq!(sel.candidates.len(), 1);
        assert_eq!(sel.invalid.len(), 1);
        assert_eq!(sel.invalid[0].index, 0);
    }
}
