//! Dashboard aggregates over the loaded request set.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::badge::round_half_up;
use crate::request::{FlagType, ModerationRequest, RequestStatus};

/// Summary counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub flagged: usize,
    pub clean: usize,
    pub borderline: usize,
    /// Records carrying a status outside the known set.
    pub external: usize,
    /// Raised flags per category.
    pub flag_distribution: BTreeMap<FlagType, usize>,
}

impl RequestStats {
    pub fn from_requests(requests: &[ModerationRequest]) -> Self {
        let mut stats = RequestStats {
            total: requests.len(),
            ..Default::default()
        };

        for request in requests {
            match request.status {
                RequestStatus::Flagged => stats.flagged += 1,
                RequestStatus::Clean => stats.clean += 1,
                RequestStatus::Borderline => stats.borderline += 1,
                RequestStatus::External(_) => stats.external += 1,
            }

            for flag in request.flags.iter().flat_map(|flags| flags.iter()) {
                if flag.flagged {
                    *stats.flag_distribution.entry(flag.kind).or_default() += 1;
                }
            }
        }

        stats
    }

    /// Share of each category among all raised flags, in whole percent.
    pub fn distribution_percentages(&self) -> Vec<(FlagType, i64)> {
        let raised: usize = self.flag_distribution.values().sum();
        if raised == 0 {
            return Vec::new();
        }
        self.flag_distribution
            .iter()
            .map(|(kind, count)| {
                (*kind, round_half_up(*count as f64 * 100.0 / raised as f64))
            })
            .collect()
    }

    /// Fraction of records with status `flagged`, or 0 for an empty set.
    pub fn flag_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.flagged as f64 / self.total as f64
        }
    }
}

/// The `limit` most recent requests, newest first.
pub fn recent_requests(requests: &[ModerationRequest], limit: usize) -> Vec<&ModerationRequest> {
    let mut sorted: Vec<&ModerationRequest> = requests.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(limit);
    sorted
}
