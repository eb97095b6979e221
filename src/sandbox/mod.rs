// src/sandbox/mod.rs
//
// Embedded stand-in for the external pipeline engine: an in-memory lead
// registry with floor-level stage semantics, served over loopback HTTP so the
// console can drive it through the exact same client as a real deployment.
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use crate::models::{Lead, LeadStatus, LeadsResponse, StageAck};

mod server;

pub use server::{build_rocket, launch, wait_until_ready};

/// The fetch endpoint windows to the most recent entries; stats always cover
/// the entire registry.
pub const RECENT_WINDOW: usize = 500;

const FIRST_NAMES: [&str; 16] = [
    "Dana", "Marcus", "Elena", "Priya", "Jonas", "Amara", "Felix", "Ingrid", "Tomas", "Leila",
    "Victor", "Sofia", "Henrik", "Nadia", "Oscar", "Bianca",
];

const LAST_NAMES: [&str; 16] = [
    "Fox", "Lindqvist", "Moreau", "Patel", "Keller", "Osei", "Novak", "Berg", "Silva", "Haddad",
    "Jensen", "Romano", "Vargas", "Kowalski", "Tanaka", "Fischer",
];

const COMPANIES: [&str; 16] = [
    "Acme Systems", "Brightpath", "CloudForge", "DataHarbor", "Evergreen Labs", "FlowMetric",
    "GridWorks", "Helix Digital", "IronGate", "Juniper Soft", "KitePoint", "LumenStack",
    "Marten Group", "NovaTrade", "Orbital Apps", "PinePeak",
];

const COUNTRIES: [&str; 8] = [
    "USA", "Germany", "France", "UK", "Sweden", "Canada", "Netherlands", "Spain",
];

const INDUSTRIES: [&str; 6] = [
    "SaaS", "Manufacturing", "Healthcare", "FinTech", "E-commerce", "Biotech",
];

const GENERIC_ROLES: [&str; 4] = ["CEO", "Founder", "Managing Director", "Head of Growth"];

// One name/company combination per index; the generate stage walks this space
// from a seed-derived offset, so identical seeds revisit identical
// combinations and the duplicate check below skips them.
const COMBO_SPACE: usize = FIRST_NAMES.len() * LAST_NAMES.len() * COMPANIES.len();

fn roles_for(industry: &str) -> &'static [&'static str] {
    match industry {
        "SaaS" => &["CTO", "VP of Engineering", "Head of Product", "CEO"],
        "Manufacturing" => &["Operations Director", "Plant Manager", "Supply Chain Lead"],
        "Healthcare" => &["Medical Director", "Head of Clinical Ops", "CIO"],
        "FinTech" => &["Head of Payments", "Chief Risk Officer", "VP of Compliance"],
        "E-commerce" => &["Head of Marketplace", "Growth Lead", "CMO"],
        "Biotech" => &["Head of R&D", "Lab Director", "Chief Scientific Officer"],
        _ => &GENERIC_ROLES,
    }
}

fn canonical_industry(requested: &str) -> Option<&'static str> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return None;
    }
    INDUSTRIES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(trimmed))
        .copied()
}

struct Registry {
    leads: Vec<Lead>,
    next_id: i64,
}

/// In-memory lead registry plus the four stage operations. FAILED is
/// terminal: no stage ever selects a FAILED lead again.
pub struct SandboxRegistry {
    inner: Mutex<Registry>,
    slug_regex: Regex,
}

impl Default for SandboxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Registry {
                leads: Vec::new(),
                next_id: 1,
            }),
            slug_regex: Regex::new(r"[^a-z0-9]").unwrap(),
        }
    }

    fn slug(&self, name: &str) -> String {
        self.slug_regex
            .replace_all(&name.to_lowercase(), "")
            .into_owned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().leads.is_empty()
    }

    /// Synthesize up to `count` NEW leads from seeded randomness. Identical
    /// seeds walk identical combinations, and emails already in the registry
    /// are skipped, so `added <= generated`.
    pub fn generate(&self, count: u32, industry: &str, seed: u32) -> StageAck {
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let requested = canonical_industry(industry);
        let offset = (seed as usize).wrapping_mul(2481) % COMBO_SPACE;

        let mut inner = self.lock();
        let mut added = 0u64;
        for step in 0..count as usize {
            let idx = (offset + step) % COMBO_SPACE;
            let first = FIRST_NAMES[idx % FIRST_NAMES.len()];
            let last = LAST_NAMES[(idx / FIRST_NAMES.len()) % LAST_NAMES.len()];
            let company =
                COMPANIES[(idx / (FIRST_NAMES.len() * LAST_NAMES.len())) % COMPANIES.len()];

            let industry_name =
                requested.unwrap_or_else(|| INDUSTRIES[rng.usize(..INDUSTRIES.len())]);
            let roles = roles_for(industry_name);
            let role = roles[rng.usize(..roles.len())];
            let country = COUNTRIES[rng.usize(..COUNTRIES.len())];

            let slug = self.slug(company);
            let email = format!(
                "{}.{}@{}.com",
                first.to_lowercase(),
                last.to_lowercase(),
                slug
            );
            if inner.leads.iter().any(|lead| lead.email == email) {
                continue;
            }

            let id = inner.next_id;
            inner.next_id += 1;
            inner.leads.push(Lead {
                id,
                full_name: format!("{} {}", first, last),
                email,
                company_name: company.to_string(),
                website: format!("https://www.{}.com", slug),
                role: role.to_string(),
                country: country.to_string(),
                industry: industry_name.to_string(),
                linkedin_url: format!(
                    "https://linkedin.com/in/{}-{}-{}",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    rng.u32(100..1000)
                ),
                status: LeadStatus::New,
                email_draft: None,
                linkedin_draft: None,
                last_updated: Some(Utc::now()),
            });
            added += 1;
        }

        debug!("🧪 Sandbox generated {} of {} requested", added, count);
        StageAck {
            status: "success".to_string(),
            generated: Some(count as u64),
            added: Some(added),
            industry: Some(
                requested
                    .map(str::to_string)
                    .unwrap_or_else(|| "mixed".to_string()),
            ),
            ..StageAck::default()
        }
    }

    pub fn enrich(&self, limit: u32) -> StageAck {
        let mut inner = self.lock();
        let mut processed = 0u64;
        for lead in inner.leads.iter_mut() {
            if processed == limit as u64 {
                break;
            }
            if lead.status == LeadStatus::New {
                lead.status = LeadStatus::Enriched;
                lead.last_updated = Some(Utc::now());
                processed += 1;
            }
        }
        StageAck {
            status: "success".to_string(),
            processed: Some(processed),
            ..StageAck::default()
        }
    }

    pub fn prepare_messages(&self, limit: u32) -> StageAck {
        let mut inner = self.lock();
        let mut processed = 0u64;
        for lead in inner.leads.iter_mut() {
            if processed == limit as u64 {
                break;
            }
            if lead.status == LeadStatus::Enriched {
                let first_name = lead
                    .full_name
                    .split_whitespace()
                    .next()
                    .unwrap_or("there")
                    .to_string();
                lead.email_draft = Some(format!(
                    "Hi {}, quick note for {} about your outbound pipeline.",
                    first_name, lead.company_name
                ));
                lead.linkedin_draft =
                    Some(format!("Hi {}, open to connecting this week?", first_name));
                lead.status = LeadStatus::Messaged;
                lead.last_updated = Some(Utc::now());
                processed += 1;
            }
        }
        StageAck {
            status: "success".to_string(),
            processed: Some(processed),
            ..StageAck::default()
        }
    }

    /// Dry run exercises the send path without failures; live mode fails a
    /// fixed fraction (every lead whose id is a multiple of 10).
    pub fn send(&self, limit: u32, dry_run: bool) -> StageAck {
        let mut inner = self.lock();
        let mut sent = 0u64;
        let mut failed = 0u64;
        for lead in inner.leads.iter_mut() {
            if sent + failed == limit as u64 {
                break;
            }
            if lead.status == LeadStatus::Messaged {
                if !dry_run && lead.id % 10 == 0 {
                    lead.status = LeadStatus::Failed;
                    failed += 1;
                } else {
                    lead.status = LeadStatus::Sent;
                    sent += 1;
                }
                lead.last_updated = Some(Utc::now());
            }
        }
        StageAck {
            status: "complete".to_string(),
            sent: Some(sent),
            failed: Some(failed),
            mode: Some(if dry_run { "DRY RUN" } else { "LIVE" }.to_string()),
            ..StageAck::default()
        }
    }

    /// Most recent leads first, windowed, plus stats over the whole registry.
    pub fn fetch(&self) -> LeadsResponse {
        let inner = self.lock();
        let mut stats: HashMap<String, u64> = HashMap::new();
        for lead in &inner.leads {
            *stats.entry(lead.status.label().to_string()).or_insert(0) += 1;
        }
        let leads = inner
            .leads
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .cloned()
            .collect();
        LeadsResponse { leads, stats }
    }

    pub fn export_csv(&self) -> String {
        let inner = self.lock();
        let mut out = String::from(
            "id,full_name,email,company_name,website,role,country,industry,linkedin_url,status\n",
        );
        for lead in &inner.leads {
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                lead.id,
                lead.full_name,
                lead.email,
                lead.company_name,
                lead.website,
                lead.role,
                lead.country,
                lead.industry,
                lead.linkedin_url,
                lead.status
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(registry: &SandboxRegistry) -> Vec<LeadStatus> {
        registry.lock().leads.iter().map(|lead| lead.status).collect()
    }

    #[test]
    fn generate_fills_the_requested_batch() {
        let registry = SandboxRegistry::new();
        let ack = registry.generate(8, "SaaS", 3);
        assert_eq!(ack.generated, Some(8));
        assert_eq!(ack.added, Some(8));
        assert_eq!(ack.industry.as_deref(), Some("SaaS"));
        assert_eq!(registry.len(), 8);

        let inner = registry.lock();
        assert!(inner.leads.iter().all(|lead| lead.status == LeadStatus::New));
        assert!(inner.leads.iter().all(|lead| lead.industry == "SaaS"));
        let mut emails: Vec<&str> = inner.leads.iter().map(|lead| lead.email.as_str()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), 8, "emails must be unique within a batch");
    }

    #[test]
    fn identical_seed_is_deduplicated_not_duplicated() {
        let registry = SandboxRegistry::new();
        let first = registry.generate(5, "", 9);
        assert_eq!(first.added, Some(5));
        let again = registry.generate(5, "", 9);
        assert_eq!(again.added, Some(0));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn distinct_seeds_extend_the_registry() {
        let registry = SandboxRegistry::new();
        registry.generate(10, "Fintech", 11);
        registry.generate(10, "Fintech", 12);
        assert_eq!(registry.len(), 20);
    }

    #[test]
    fn industry_match_is_case_insensitive_with_industry_roles() {
        let registry = SandboxRegistry::new();
        registry.generate(3, "fintech", 21);
        let inner = registry.lock();
        for lead in &inner.leads {
            assert_eq!(lead.industry, "FinTech");
            assert!(roles_for("FinTech").contains(&lead.role.as_str()));
        }
    }

    #[test]
    fn unknown_industry_rotates_known_ones() {
        let registry = SandboxRegistry::new();
        let ack = registry.generate(6, "Space Mining", 4);
        assert_eq!(ack.industry.as_deref(), Some("mixed"));
        let inner = registry.lock();
        assert!(inner
            .leads
            .iter()
            .all(|lead| INDUSTRIES.contains(&lead.industry.as_str())));
    }

    #[test]
    fn enrich_advances_only_new_up_to_limit() {
        let registry = SandboxRegistry::new();
        registry.generate(6, "SaaS", 2);
        let ack = registry.enrich(4);
        assert_eq!(ack.processed, Some(4));
        let observed = statuses(&registry);
        assert_eq!(
            observed
                .iter()
                .filter(|status| **status == LeadStatus::Enriched)
                .count(),
            4
        );

        let rest = registry.enrich(10);
        assert_eq!(rest.processed, Some(2));
    }

    #[test]
    fn prepare_attaches_both_draft_variants() {
        let registry = SandboxRegistry::new();
        registry.generate(3, "SaaS", 6);
        registry.enrich(3);
        let ack = registry.prepare_messages(2);
        assert_eq!(ack.processed, Some(2));

        let inner = registry.lock();
        let drafted: Vec<&Lead> = inner
            .leads
            .iter()
            .filter(|lead| lead.status == LeadStatus::Messaged)
            .collect();
        assert_eq!(drafted.len(), 2);
        for lead in drafted {
            assert!(lead.email_draft.as_deref().is_some_and(|d| !d.is_empty()));
            assert!(lead.linkedin_draft.as_deref().is_some_and(|d| !d.is_empty()));
        }
        assert!(inner
            .leads
            .iter()
            .filter(|lead| lead.status == LeadStatus::Enriched)
            .all(|lead| !lead.has_drafts()));
    }

    #[test]
    fn dry_run_sends_without_failures() {
        let registry = SandboxRegistry::new();
        registry.generate(12, "SaaS", 8);
        registry.enrich(12);
        registry.prepare_messages(12);
        let ack = registry.send(12, true);
        assert_eq!(ack.sent, Some(12));
        assert_eq!(ack.failed, Some(0));
        assert_eq!(ack.mode.as_deref(), Some("DRY RUN"));
    }

    #[test]
    fn live_send_fails_the_fixed_fraction() {
        let registry = SandboxRegistry::new();
        registry.generate(12, "SaaS", 8);
        registry.enrich(12);
        registry.prepare_messages(12);
        let ack = registry.send(12, false);
        assert_eq!(ack.sent, Some(11));
        assert_eq!(ack.failed, Some(1));
        assert_eq!(ack.mode.as_deref(), Some("LIVE"));

        let inner = registry.lock();
        let failed: Vec<i64> = inner
            .leads
            .iter()
            .filter(|lead| lead.status == LeadStatus::Failed)
            .map(|lead| lead.id)
            .collect();
        assert_eq!(failed, vec![10]);
    }

    #[test]
    fn failed_leads_are_terminal_for_every_stage() {
        let registry = SandboxRegistry::new();
        registry.generate(12, "SaaS", 8);
        registry.enrich(12);
        registry.prepare_messages(12);
        registry.send(12, false);

        registry.enrich(100);
        registry.prepare_messages(100);
        registry.send(100, false);

        let inner = registry.lock();
        let failed = inner
            .leads
            .iter()
            .find(|lead| lead.id == 10)
            .expect("lead 10 exists");
        assert_eq!(failed.status, LeadStatus::Failed);
    }

    #[test]
    fn fetch_windows_recent_leads_but_counts_all() {
        let registry = SandboxRegistry::new();
        registry.generate(600, "SaaS", 1);
        assert_eq!(registry.len(), 600);

        let response = registry.fetch();
        assert_eq!(response.leads.len(), RECENT_WINDOW);
        assert_eq!(response.leads[0].id, 600, "newest first");
        assert_eq!(response.engine_total(), 600);
        assert_eq!(response.stats.get("NEW"), Some(&600));
    }

    #[test]
    fn export_covers_the_full_registry() {
        let registry = SandboxRegistry::new();
        registry.generate(4, "Biotech", 13);
        let csv = registry.export_csv();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,full_name,email"));
        assert_eq!(lines.count(), 4);
    }
}
