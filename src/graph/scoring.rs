use super::ScoringMethod;
use super::cooccurrence::CoOccurrence;

/// Turns raw joint/marginal counts into an edge weight
pub trait AssociationScorer {
    fn method(&self) -> ScoringMethod;

    /// Weight of an edge; `total_playlists` is fixed for the whole pass
    fn weight(&self, edge: &CoOccurrence, total_playlists: usize) -> f64;
}

/// Weight is the number of playlists the pair shares
pub struct RawCoOccurrenceScorer;

impl AssociationScorer for RawCoOccurrenceScorer {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::RawCoOccurrence
    }

    fn weight(&self, edge: &CoOccurrence, _total_playlists: usize) -> f64 {
        edge.joint_count as f64
    }
}

/// Pointwise mutual information: ln(P(a,b) / (P(a) P(b))), unsmoothed
pub struct PmiScorer;

impl PmiScorer {
    pub fn joint_probability(edge: &CoOccurrence, total_playlists: usize) -> f64 {
        if total_playlists == 0 {
            return 0.0;
        }
        edge.joint_count as f64 / total_playlists as f64
    }

    pub fn expected_probability(edge: &CoOccurrence) -> f64 {
        edge.p1 * edge.p2
    }
}

impl AssociationScorer for PmiScorer {
    fn method(&self) -> ScoringMethod {
        ScoringMethod::Pmi
    }

    fn weight(&self, edge: &CoOccurrence, total_playlists: usize) -> f64 {
        let joint = Self::joint_probability(edge, total_playlists);
        let expected = Self::expected_probability(edge);
        // An edge exists only if both entities were seen, so both terms are positive
        if joint <= 0.0 || expected <= 0.0 {
            return 0.0;
        }
        (joint / expected).ln()
    }
}

impl ScoringMethod {
    pub fn scorer(&self) -> &'static dyn AssociationScorer {
        match self {
            ScoringMethod::Pmi => &PmiScorer,
            ScoringMethod::RawCoOccurrence => &RawCoOccurrenceScorer,
        }
    }
}
