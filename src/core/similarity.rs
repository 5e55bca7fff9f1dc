use crate::domain::model::{Embedding, EmbeddingRecord, Recognition};

/// Default distance under which two embeddings are the same person.
pub const THRESHOLD: f64 = 0.8;

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Distances of every embedding to the first one.
pub fn get_distances(embeddings: &[Embedding]) -> Vec<f64> {
    match embeddings.split_first() {
        None => vec![0.0],
        Some((reference, rest)) => std::iter::once(0.0)
            .chain(rest.iter().map(|e| euclidean_distance(reference, e)))
            .collect(),
    }
}

/// The first entry is always `true`, even for an empty input.
pub fn get_similarities(embeddings: &[Embedding], threshold: f64) -> Vec<bool> {
    let mut result = vec![true];
    result.extend(
        get_distances(embeddings)
            .into_iter()
            .skip(1)
            .map(|dist| dist < threshold),
    );
    result
}

pub fn closest_match(
    probe: &[f64],
    records: &[EmbeddingRecord],
    threshold: f64,
) -> Option<Recognition> {
    records
        .iter()
        .map(|record| Recognition {
            user_id: record.user_id,
            distance: euclidean_distance(probe, &record.embedding),
        })
        .filter(|r| r.distance < threshold)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i32, user_id: i32, embedding: Embedding) -> EmbeddingRecord {
        EmbeddingRecord {
            id,
            user_id,
            embedding,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_similarities_short_inputs() {
        assert_eq!(get_similarities(&[], THRESHOLD), vec![true]);
        assert_eq!(get_similarities(&[vec![1.0, 0.0]], THRESHOLD), vec![true]);
    }

    #[test]
    fn test_similarities_compare_to_reference() {
        let embeddings = vec![
            vec![0.0, 0.0],
            vec![0.3, 0.4], // 0.5
            vec![0.0, 0.9], // 0.9
            vec![1.0, 1.0], // ~1.41
        ];

        assert_eq!(
            get_similarities(&embeddings, THRESHOLD),
            vec![true, true, false, false]
        );
        let distances = get_distances(&embeddings);
        assert_eq!(distances[0], 0.0);
        assert!((distances[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_closest_match_picks_smallest_distance() {
        let records = vec![
            record(1, 10, vec![0.5, 0.0]),
            record(2, 20, vec![0.1, 0.0]),
            record(3, 30, vec![3.0, 3.0]),
        ];

        let found = closest_match(&[0.0, 0.0], &records, THRESHOLD).unwrap();
        assert_eq!(found.user_id, 20);
        assert!((found.distance - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_closest_match_respects_threshold() {
        let records = vec![record(1, 10, vec![2.0, 0.0])];
        assert!(closest_match(&[0.0, 0.0], &records, THRESHOLD).is_none());
        assert!(closest_match(&[0.0, 0.0], &[], THRESHOLD).is_none());
    }
}
