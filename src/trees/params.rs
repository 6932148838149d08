use crate::error::SplitterError;

/// How the winning candidate is picked among the candidates that survive the
/// minimum-size filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// The best gain is tracked, but the chosen feature and threshold are those
    /// of the last surviving candidate (features in column order, thresholds
    /// ascending). The reported gain may belong to a different candidate.
    #[default]
    LastSurviving,
    /// The first candidate reaching the strictly greatest gain is chosen.
    MaxGain,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitterParams {
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub selection_policy: SelectionPolicy,
}

impl Default for SplitterParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitterParams {
    pub fn new() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 20,
            selection_policy: SelectionPolicy::default(),
        }
    }

    /// Creates parameters with a custom depth limit and minimum partition size.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_samples_split` is zero.
    pub fn with_params(max_depth: u16, min_samples_split: usize) -> Result<Self, SplitterError> {
        let mut params = Self::new();
        params.set_max_depth(max_depth);
        params.set_min_samples_split(min_samples_split)?;
        Ok(params)
    }

    /// Sets the smallest number of rows each side of a split must keep.
    pub fn set_min_samples_split(&mut self, min_samples_split: usize) -> Result<(), SplitterError> {
        if min_samples_split < 1 {
            return Err(SplitterError::InvalidParameter(
                "The minimum number of samples per split must be at least 1.".into(),
            ));
        }
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    /// Sets the depth at which nodes stop splitting. Zero makes the root a leaf.
    pub fn set_max_depth(&mut self, max_depth: u16) {
        self.max_depth = max_depth;
    }

    pub fn set_selection_policy(&mut self, selection_policy: SelectionPolicy) {
        self.selection_policy = selection_policy;
    }

    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.selection_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SplitterParams::default();
        assert_eq!(params.max_depth(), 3);
        assert_eq!(params.min_samples_split(), 20);
        assert_eq!(params.selection_policy(), SelectionPolicy::LastSurviving);
    }

    #[test]
    fn test_with_params() {
        let params = SplitterParams::with_params(0, 1).unwrap();
        assert_eq!(params.max_depth(), 0);
        assert_eq!(params.min_samples_split(), 1);
    }

    #[test]
    fn test_rejects_zero_min_samples_split() {
        let mut params = SplitterParams::new();
        assert!(params.set_min_samples_split(0).is_err());
        assert_eq!(params.min_samples_split(), 20);
        assert!(SplitterParams::with_params(2, 0).is_err());
    }
}
