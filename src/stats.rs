use serde::Serialize;

use crate::models::{Lead, LeadStatus};

/// Per-status counts over one observed lead set. Counts partition the set:
/// every lead lands in exactly one bucket, statuses outside the enumeration
/// land in `unknown` instead of vanishing from the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub new: u64,
    pub enriched: u64,
    pub messaged: u64,
    pub sent: u64,
    pub failed: u64,
    pub unknown: u64,
}

impl StatusSnapshot {
    pub fn count(&self, status: LeadStatus) -> u64 {
        match status {
            LeadStatus::New => self.new,
            LeadStatus::Enriched => self.enriched,
            LeadStatus::Messaged => self.messaged,
            LeadStatus::Sent => self.sent,
            LeadStatus::Failed => self.failed,
            LeadStatus::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> u64 {
        self.new + self.enriched + self.messaged + self.sent + self.failed + self.unknown
    }

    pub fn percentage(&self, status: LeadStatus) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.count(status) as f64 / total as f64) * 100.0
        }
    }
}

/// Group the lead set by status and count each group. Pure and
/// order-independent: grouping is by value, not position.
pub fn aggregate(leads: &[Lead]) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot::default();
    for lead in leads {
        match lead.status {
            LeadStatus::New => snapshot.new += 1,
            LeadStatus::Enriched => snapshot.enriched += 1,
            LeadStatus::Messaged => snapshot.messaged += 1,
            LeadStatus::Sent => snapshot.sent += 1,
            LeadStatus::Failed => snapshot.failed += 1,
            LeadStatus::Unknown => snapshot.unknown += 1,
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_lead(id: i64, status: LeadStatus) -> Lead {
        Lead {
            id,
            full_name: format!("Lead {}", id),
            email: format!("lead{}@example.com", id),
            company_name: "Example Corp".into(),
            website: "https://www.example.com".into(),
            role: "CEO".into(),
            country: "USA".into(),
            industry: "SaaS".into(),
            linkedin_url: format!("https://linkedin.com/in/lead-{}", id),
            status,
            email_draft: None,
            linkedin_draft: None,
            last_updated: None,
        }
    }

    #[test]
    fn counts_sum_to_lead_count() {
        let leads: Vec<Lead> = [
            LeadStatus::New,
            LeadStatus::New,
            LeadStatus::Enriched,
            LeadStatus::Messaged,
            LeadStatus::Sent,
            LeadStatus::Sent,
            LeadStatus::Failed,
            LeadStatus::Unknown,
        ]
        .into_iter()
        .enumerate()
        .map(|(id, status)| make_lead(id as i64, status))
        .collect();

        let snapshot = aggregate(&leads);
        assert_eq!(snapshot.total(), leads.len() as u64);
        assert_eq!(snapshot.new, 2);
        assert_eq!(snapshot.sent, 2);
        assert_eq!(snapshot.unknown, 1);
    }

    #[test]
    fn absent_statuses_count_zero_not_missing() {
        let leads = vec![make_lead(1, LeadStatus::New)];
        let snapshot = aggregate(&leads);
        for status in LeadStatus::KNOWN {
            if status == LeadStatus::New {
                assert_eq!(snapshot.count(status), 1);
            } else {
                assert_eq!(snapshot.count(status), 0, "{} should be zero", status);
            }
        }
        assert_eq!(snapshot.unknown, 0);
    }

    #[test]
    fn empty_set_aggregates_to_all_zero() {
        let snapshot = aggregate(&[]);
        assert_eq!(snapshot, StatusSnapshot::default());
        assert_eq!(snapshot.total(), 0);
        assert_eq!(snapshot.percentage(LeadStatus::Sent), 0.0);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let forward: Vec<Lead> = (0..6)
            .map(|id| {
                let status = match id % 3 {
                    0 => LeadStatus::New,
                    1 => LeadStatus::Messaged,
                    _ => LeadStatus::Failed,
                };
                make_lead(id, status)
            })
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(aggregate(&forward), aggregate(&reversed));
    }

    #[test]
    fn unknown_statuses_are_bucketed_not_dropped() {
        let leads = vec![
            make_lead(1, LeadStatus::Sent),
            make_lead(2, LeadStatus::Unknown),
            make_lead(3, LeadStatus::Unknown),
        ];
        let snapshot = aggregate(&leads);
        assert_eq!(snapshot.unknown, 2);
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn percentages_cover_the_whole_set() {
        let leads = vec![
            make_lead(1, LeadStatus::New),
            make_lead(2, LeadStatus::New),
            make_lead(3, LeadStatus::Sent),
            make_lead(4, LeadStatus::Failed),
        ];
        let snapshot = aggregate(&leads);
        assert_eq!(snapshot.percentage(LeadStatus::New), 50.0);
        assert_eq!(snapshot.percentage(LeadStatus::Sent), 25.0);
        let summed: f64 = LeadStatus::KNOWN
            .iter()
            .map(|status| snapshot.percentage(*status))
            .sum();
        assert!((summed - 100.0).abs() < 1e-9);
    }
}
