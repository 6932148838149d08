//! Candidate split evaluation
use super::params::SelectionPolicy;
use crate::data::dataset::{Dataset, RealNumber};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// A threshold on one feature that leaves at least `min_samples_split` rows on
/// each side.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitCandidate<T: RealNumber> {
    pub feature_index: usize,
    pub threshold: T,
    pub gain: T,
}

/// Outcome of candidate evaluation at one node.
///
/// `best_gain` is the largest gain seen among all surviving candidates. Under
/// [`SelectionPolicy::LastSurviving`] it need not be the gain of `chosen`.
#[derive(Clone, Debug, PartialEq)]
pub struct BestSplit<T: RealNumber> {
    pub chosen: SplitCandidate<T>,
    pub best_gain: T,
}

/// Evaluates every threshold of every feature in `features` and picks one.
///
/// `features` lists column indices in the order they are considered. Features
/// are scanned in parallel but the candidates are folded in that order, so
/// the result does not depend on scheduling.
pub fn find_best_split<T: RealNumber>(
    dataset: &Dataset<T>,
    target_index: usize,
    features: &[usize],
    min_samples_split: usize,
    policy: SelectionPolicy,
) -> Option<BestSplit<T>> {
    let per_feature = features
        .par_iter()
        .map(|&feature_index| {
            feature_candidates(dataset, target_index, feature_index, min_samples_split)
        })
        .collect::<Vec<_>>();

    let mut best_gain = T::neg_infinity();
    let mut chosen: Option<SplitCandidate<T>> = None;

    for candidate in per_feature.into_iter().flatten() {
        match policy {
            SelectionPolicy::LastSurviving => {
                if candidate.gain > best_gain {
                    best_gain = candidate.gain;
                }
                chosen = Some(candidate);
            }
            SelectionPolicy::MaxGain => {
                if candidate.gain > best_gain {
                    best_gain = candidate.gain;
                    chosen = Some(candidate);
                }
            }
        }
    }

    chosen.map(|chosen| BestSplit { chosen, best_gain })
}

/// Surviving candidates of a single feature, thresholds ascending.
pub fn feature_candidates<T: RealNumber>(
    dataset: &Dataset<T>,
    target_index: usize,
    feature_index: usize,
    min_samples_split: usize,
) -> Vec<SplitCandidate<T>> {
    let feature = dataset.x.column(feature_index);
    let target = dataset.x.column(target_index);

    dataset
        .sorted_unique(feature_index)
        .into_iter()
        .filter_map(|threshold| {
            let mut left_sum = T::zero();
            let mut right_sum = T::zero();
            let mut left_count = 0usize;
            let mut right_count = 0usize;

            for (value, y) in feature.iter().zip(target.iter()) {
                if *value <= threshold {
                    left_sum += *y;
                    left_count += 1;
                } else {
                    right_sum += *y;
                    right_count += 1;
                }
            }

            if left_count < min_samples_split || right_count < min_samples_split {
                return None;
            }

            let left_mean = left_sum / T::from_usize(left_count)?;
            let right_mean = right_sum / T::from_usize(right_count)?;
            Some(SplitCandidate {
                feature_index,
                threshold,
                gain: mean_difference(left_mean, right_mean),
            })
        })
        .collect()
}

/// Split quality: absolute difference between the two partition means.
pub fn mean_difference<T: RealNumber>(left_mean: T, right_mean: T) -> T {
    (left_mean - right_mean).abs()
}
