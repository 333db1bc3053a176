//! Resolves many wrapper URLs with bounded concurrency.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tracing::info;

use crate::domain::entities::{CaseId, ResolvedImage, UnresolvedReason};

use super::resolve_attachment_use_case::ResolveAttachmentUseCase;

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per input, duplicates included.
    pub results: Vec<(String, ResolvedImage)>,
    /// One entry per distinct case id.
    pub by_case: HashMap<CaseId, ResolvedImage>,
}

impl BatchReport {
    /// Result for an input string.
    #[must_use]
    pub fn get(&self, input: &str) -> Option<&ResolvedImage> {
        self.results
            .iter()
            .find(|(key, _)| key == input)
            .map(|(_, result)| result)
    }

    /// Number of distinct cases that produced bytes.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.by_case.values().filter(|r| r.is_resolved()).count()
    }

    /// Number of distinct cases that did not.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.by_case.len() - self.resolved()
    }
}

/// Fans a list of inputs out over one shared resolver.
pub struct ResolveBatchUseCase {
    resolver: Arc<ResolveAttachmentUseCase>,
    concurrency: usize,
}

impl ResolveBatchUseCase {
    /// Creates new use case. A concurrency of zero is treated as one.
    #[must_use]
    pub fn new(resolver: Arc<ResolveAttachmentUseCase>, concurrency: usize) -> Self {
        Self {
            resolver,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves every input. Each case id is resolved once, no matter how
    /// many inputs refer to it.
    pub async fn execute(&self, inputs: &[String]) -> BatchReport {
        let parser = self.resolver.parser();

        let mut seen = HashSet::new();
        let unique: Vec<(CaseId, &str)> = inputs
            .iter()
            .filter_map(|input| parser.parse(input).map(|case| (case.case_id, input.as_str())))
            .filter(|(case_id, _)| seen.insert(case_id.clone()))
            .collect();

        let by_case: HashMap<CaseId, ResolvedImage> = stream::iter(unique)
            .map(|(case_id, input)| async move {
                let result = self.resolver.resolve(input).await;
                (case_id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let results = inputs
            .iter()
            .map(|input| {
                let result = parser
                    .parse(input)
                    .and_then(|case| by_case.get(&case.case_id).cloned())
                    .unwrap_or(ResolvedImage::Unresolved(UnresolvedReason::NotAWrapper));
                (input.clone(), result)
            })
            .collect();

        let report = BatchReport { results, by_case };
        info!(
            inputs = inputs.len(),
            cases = report.by_case.len(),
            resolved = report.resolved(),
            unresolved = report.unresolved(),
            "Batch resolution finished"
        );
        report
    }
}
