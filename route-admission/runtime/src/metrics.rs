use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct AdmissionMetrics {
    reviews: Family<ResultLabels, Counter>,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ResultLabels {
    result: &'static str,
}

// === impl AdmissionMetrics ===

impl AdmissionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let reviews = Family::<ResultLabels, Counter>::default();
        reg.register(
            "reviews",
            "Total number of admission reviews handled, by result",
            reviews.clone(),
        );
        Self { reviews }
    }

    pub(crate) fn allowed(&self) {
        self.inc("allowed");
    }

    pub(crate) fn denied(&self) {
        self.inc("denied");
    }

    /// The review or the route under review could not be decoded.
    pub(crate) fn invalid(&self) {
        self.inc("invalid");
    }

    /// The namespace lookup failed.
    pub(crate) fn error(&self) {
        self.inc("error");
    }

    fn inc(&self, result: &'static str) {
        self.reviews.get_or_create(&ResultLabels { result }).inc();
    }

    #[cfg(test)]
    pub(crate) fn count(&self, result: &'static str) -> u64 {
        self.reviews.get_or_create(&ResultLabels { result }).get()
    }
}
