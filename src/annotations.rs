// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint annotation files.
//!
//! An annotation file is a JSON array with one object per individual:
//!
//! ```json
//! [
//!   { "keypoints": [x0, y0, v0, x1, y1, v1, ...], "score": 0.87 },
//!   { "keypoints": [x0, y0, v0, x1, y1, v1, ...] }
//! ]
//! ```

use std::fs;
use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// One annotated individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Flat `(x, y, visibility)` triples.
    pub keypoints: Vec<f32>,
    /// Detection score, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Keypoints of all individuals in a file, ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointSets {
    /// Shape (individuals, keypoints, 3).
    pub keypoints: Array3<f32>,
    /// One score per individual, present only if every individual has one.
    pub scores: Option<Vec<f32>>,
}

impl KeypointSets {
    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.keypoints.shape()[0]
    }

    /// Whether there are no individuals.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse annotations from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the keypoint lists are inconsistent.
pub fn parse_annotations(json: &str) -> Result<KeypointSets> {
    let annotations: Vec<Annotation> = serde_json::from_str(json)?;
    to_keypoint_sets(&annotations)
}

/// Read and parse an annotation file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content is invalid.
pub fn load_annotations(path: impl AsRef<Path>) -> Result<KeypointSets> {
    let json = fs::read_to_string(path)?;
    parse_annotations(&json)
}

/// Stack annotations into an (individuals, keypoints, 3) array.
///
/// # Errors
///
/// Returns an error if a keypoint list is not made of triples or individuals have different
/// keypoint counts.
pub fn to_keypoint_sets(annotations: &[Annotation]) -> Result<KeypointSets> {
    let n_keypoints = annotations.first().map_or(0, |a| a.keypoints.len() / 3);

    let mut flat = Vec::with_capacity(annotations.len() * n_keypoints * 3);
    for (i, annotation) in annotations.iter().enumerate() {
        let len = annotation.keypoints.len();
        if len % 3 != 0 {
            return Err(VizError::AnnotationError(format!(
                "Individual {i}: {len} keypoint values is not a multiple of 3"
            )));
        }
        if len / 3 != n_keypoints {
            return Err(VizError::AnnotationError(format!(
                "Individual {i}: expected {n_keypoints} keypoints, got {}",
                len / 3
            )));
        }
        flat.extend_from_slice(&annotation.keypoints);
    }

    let keypoints = Array3::from_shape_vec((annotations.len(), n_keypoints, 3), flat)
        .map_err(|e| VizError::ShapeError(format!("Failed to stack keypoints: {e}")))?;
    let scores = annotations.iter().map(|a| a.score).collect();

    Ok(KeypointSets { keypoints, scores })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_individuals() {
        let json = r#"[
            {"keypoints": [1, 2, 2, 3, 4, 1], "score": 0.9},
            {"keypoints": [5, 6, 0, 7, 8, 2], "score": 0.4}
        ]"#;
        let sets = parse_annotations(json).unwrap();
        assert_eq!(sets.keypoints.shape(), &[2, 2, 3]);
        assert!((sets.keypoints[[1, 1, 0]] - 7.0).abs() < f32::EPSILON);
        assert_eq!(sets.scores, Some(vec![0.9, 0.4]));
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn test_missing_score_drops_all_scores() {
        let json = r#"[{"keypoints": [1, 2, 2], "score": 0.9}, {"keypoints": [5, 6, 0]}]"#;
        let sets = parse_annotations(json).unwrap();
        assert!(sets.scores.is_none());
    }

    #[test]
    fn test_empty_file() {
        let sets = parse_annotations("[]").unwrap();
        assert!(sets.is_empty());
        assert_eq!(sets.keypoints.shape(), &[0, 0, 3]);
    }

    #[test]
    fn test_rejects_partial_triple() {
        let result = parse_annotations(r#"[{"keypoints": [1, 2]}]"#);
        assert!(matches!(result, Err(VizError::AnnotationError(_))));
    }

    #[test]
    fn test_rejects_mismatched_counts() {
        let json = r#"[{"keypoints": [1, 2, 2]}, {"keypoints": [1, 2, 2, 3, 4, 2]}]"#;
        assert!(matches!(
            parse_annotations(json),
            Err(VizError::AnnotationError(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_annotations("{not json"),
            Err(VizError::AnnotationError(_))
        ));
    }

    #[test]
    fn test_serialize_skips_missing_score() {
        let annotation = Annotation {
            keypoints: vec![1.0, 2.0, 2.0],
            score: None,
        };
        let json = serde_json::to_string(&annotation).unwrap();
        assert_eq!(json, r#"{"keypoints":[1.0,2.0,2.0]}"#);
    }
}
