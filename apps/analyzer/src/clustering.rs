//! Cluster engine: standardizes embedding vectors and partitions them with
//! seeded k-means so identical input always yields identical assignments.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, Axis};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use tracing::info;

use crate::errors::AnalyzerError;

pub const DEFAULT_CLUSTER_COUNT: usize = 10;

/// Fixed seed: k-means initialization is randomized, so reproducible
/// assignments require pinning the rng.
const KMEANS_SEED: u64 = 42;

const MAX_ITERATIONS: u64 = 100;
const TOLERANCE: f64 = 1e-4;

/// Partitions `embeddings` into at most `requested` clusters.
///
/// The effective cluster count is `min(requested, N)`. Returned assignments
/// are integers in `[0, effective_k)`, aligned 1:1 with the input rows.
pub fn cluster_embeddings(
    embeddings: &[Vec<f32>],
    requested: usize,
) -> Result<Vec<usize>, AnalyzerError> {
    if embeddings.is_empty() {
        return Err(AnalyzerError::EmptyCorpus(
            "no documents found in collection".to_string(),
        ));
    }

    let num_docs = embeddings.len();
    let dim = embeddings[0].len();
    let effective_k = requested.min(num_docs).max(1);

    info!("Clustering {num_docs} documents into {effective_k} clusters...");

    let mut data = Array2::zeros((num_docs, dim));
    for (i, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != dim {
            return Err(AnalyzerError::Clustering(format!(
                "embedding {} has dimension {}, expected {}",
                i,
                embedding.len(),
                dim
            )));
        }
        for (j, &value) in embedding.iter().enumerate() {
            data[[i, j]] = value as f64;
        }
    }

    let standardized = standardize(data);

    let rng = Xoshiro256Plus::seed_from_u64(KMEANS_SEED);
    let dataset = DatasetBase::from(standardized.clone());
    let model = KMeans::params_with_rng(effective_k, rng)
        .max_n_iterations(MAX_ITERATIONS)
        .tolerance(TOLERANCE)
        .fit(&dataset)
        .map_err(|e| AnalyzerError::Clustering(format!("k-means fit failed: {e:?}")))?;

    let assignments: Array1<usize> = model.predict(&standardized);
    Ok(assignments.to_vec())
}

/// Rescales each dimension to zero mean and unit variance so no dimension
/// dominates the distance computation. Zero-variance dimensions are left
/// mean-centered.
fn standardize(data: Array2<f64>) -> Array2<f64> {
    let n = data.nrows() as f64;
    let mean = data.sum_axis(Axis(0)) / n;
    let centered = data - &mean;
    let std = (centered.mapv(|v| v * v).sum_axis(Axis(0)) / n)
        .mapv(|v| if v > 0.0 { v.sqrt() } else { 1.0 });
    centered / &std
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Two well-separated groups in 2-d embedding space.
    fn two_group_embeddings() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![0.05, 0.05],
            vec![10.0, 10.1],
            vec![10.1, 10.0],
            vec![10.05, 10.05],
        ]
    }

    #[test]
    fn test_empty_input_is_empty_corpus_error() {
        let result = cluster_embeddings(&[], 10);
        assert!(matches!(result, Err(AnalyzerError::EmptyCorpus(_))));
    }

    #[test]
    fn test_effective_cluster_count_is_min_k_n() {
        let embeddings = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![10.0, 10.0]];
        let assignments = cluster_embeddings(&embeddings, 10).unwrap();
        assert_eq!(assignments.len(), 3);
        assert!(assignments.iter().all(|&c| c < 3));
    }

    #[test]
    fn test_separated_groups_land_in_distinct_clusters() {
        let assignments = cluster_embeddings(&two_group_embeddings(), 2).unwrap();
        assert_eq!(assignments[0], assignments[1]);
        assert_eq!(assignments[1], assignments[2]);
        assert_eq!(assignments[3], assignments[4]);
        assert_eq!(assignments[4], assignments[5]);
        assert_ne!(assignments[0], assignments[3]);
    }

    #[test]
    fn test_assignments_are_deterministic_across_runs() {
        let embeddings = two_group_embeddings();
        let first = cluster_embeddings(&embeddings, 3).unwrap();
        let second = cluster_embeddings(&embeddings, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let embeddings = vec![vec![0.0, 0.0], vec![1.0]];
        let result = cluster_embeddings(&embeddings, 2);
        assert!(matches!(result, Err(AnalyzerError::Clustering(_))));
    }

    #[test]
    fn test_standardize_zero_mean_unit_variance() {
        let data = array![[1.0, 10.0], [3.0, 30.0], [5.0, 50.0]];
        let standardized = standardize(data);

        for column in standardized.columns() {
            let mean: f64 = column.sum() / column.len() as f64;
            let var: f64 =
                column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / column.len() as f64;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_standardize_constant_dimension_stays_finite() {
        let data = array![[2.0, 1.0], [2.0, 3.0]];
        let standardized = standardize(data);
        assert!(standardized.iter().all(|v| v.is_finite()));
        // The constant column centers to zero.
        assert_eq!(standardized[[0, 0]], 0.0);
        assert_eq!(standardized[[1, 0]], 0.0);
    }
}
