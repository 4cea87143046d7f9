use super::ScoringMethod;

/// Decides which scored edges survive into the graph
#[derive(Debug, Clone, Copy)]
pub struct SignificanceFilter {
    method: ScoringMethod,
    min_edge_weight: f64,
}

impl SignificanceFilter {
    pub fn new(method: ScoringMethod, min_edge_weight: f64) -> Self {
        Self {
            method,
            min_edge_weight,
        }
    }

    pub fn min_edge_weight(&self) -> f64 {
        self.min_edge_weight
    }

    /// PMI edges must show positive association as well as clear the threshold
    pub fn is_significant(&self, weight: f64) -> bool {
        if !weight.is_finite() {
            return false;
        }
        match self.method {
            ScoringMethod::Pmi => weight > 0.0 && weight >= self.min_edge_weight,
            ScoringMethod::RawCoOccurrence => weight >= self.min_edge_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pmi_requires_positive_weight() {
        // A non-positive threshold must not let non-positive PMI through
        let filter = SignificanceFilter::new(ScoringMethod::Pmi, -1.0);
        assert!(!filter.is_significant(0.0));
        assert!(!filter.is_significant(-0.5));
        assert!(filter.is_significant(0.01));
    }

    #[test]
    fn test_pmi_threshold_is_inclusive() {
        let filter = SignificanceFilter::new(ScoringMethod::Pmi, 0.1);
        assert!(filter.is_significant(0.1));
        assert!(!filter.is_significant(0.09));
    }

    #[test]
    fn test_raw_threshold() {
        let filter = SignificanceFilter::new(ScoringMethod::RawCoOccurrence, 3.0);
        assert!(!filter.is_significant(2.0));
        assert!(filter.is_significant(3.0));
        assert!(filter.is_significant(40.0));
    }

    #[test]
    fn test_non_finite_weights_are_dropped() {
        let filter = SignificanceFilter::new(ScoringMethod::Pmi, 0.1);
        assert!(!filter.is_significant(f64::NAN));
        assert!(!filter.is_significant(f64::INFINITY));
    }
}
