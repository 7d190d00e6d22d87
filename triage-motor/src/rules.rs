use chrono::{DateTime, Utc};
use database_layer::{RuleKind, TriageRule};

/// Everything a rule needs to know about a detected death, independent of
/// how it arrived (an event off the stream in production, a literal struct
/// in a test). Mirrors the subset of `events_bus::DomainEvent::ObitoDetected`
/// the rule table in §4.2 actually looks at.
#[derive(Debug, Clone)]
pub struct ObitoFacts {
    pub age_years: i32,
    pub cause_of_death: Option<String>,
    pub sector: Option<String>,
    pub is_unidentified: bool,
    pub death_at: DateTime<Utc>,
}

/// Outcome of evaluating a tenant's active rules against one death.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted { score: i32 },
    Rejected { rule: RuleKind },
}

const BASE_SCORE: i32 = 50;

/// Evaluates `rules` (expected pre-sorted descending by priority, as
/// `TriageRuleRepository::find_active_by_tenant` returns them) against
/// `facts` at `now`, in order, stopping at the first reject (§4.2:
/// "Evaluation stops at the first reject"). A rule whose `parameters` don't
/// match the shape its `kind` expects is treated as misconfigured and
/// skipped rather than rejecting or crashing evaluation.
pub fn evaluate(rules: &[TriageRule], facts: &ObitoFacts, now: DateTime<Utc>) -> Decision {
    let mut score = BASE_SCORE;

    for rule in rules {
        match rule.kind {
            RuleKind::MaxAge => match max_age_threshold(rule) {
                Some(threshold) if i64::from(facts.age_years) > threshold => {
                    return Decision::Rejected { rule: rule.kind };
                }
                _ => {}
            },
            RuleKind::ExcludedCauses => {
                let causes = excluded_causes(rule);
                if let Some(cause) = &facts.cause_of_death {
                    let normalized = cause.to_lowercase();
                    if causes.iter().any(|excluded| normalized.contains(excluded.as_str())) {
                        return Decision::Rejected { rule: rule.kind };
                    }
                }
            }
            RuleKind::WindowHours => match window_hours_threshold(rule) {
                Some(threshold) if (now - facts.death_at) >= chrono::Duration::hours(threshold) => {
                    return Decision::Rejected { rule: rule.kind };
                }
                _ => {}
            },
            RuleKind::UnidentifiedRejected => {
                if facts.is_unidentified {
                    return Decision::Rejected { rule: rule.kind };
                }
            }
            RuleKind::SectorPriority => {
                score += sector_bonus(rule, facts.sector.as_deref());
            }
        }
    }

    Decision::Accepted { score: score.clamp(0, 100) }
}

/// The window-hours threshold a tenant's rules declare, for the
/// materialization step's `window_expires_at` computation (§4.2). Falls
/// back to `default_hours` when the tenant has no `window_hours` rule
/// configured or its parameters are malformed.
pub fn window_hours_for(rules: &[TriageRule], default_hours: i64) -> i64 {
    rules
        .iter()
        .find(|r| r.kind == RuleKind::WindowHours)
        .and_then(window_hours_threshold)
        .unwrap_or(default_hours)
}

fn max_age_threshold(rule: &TriageRule) -> Option<i64> {
    rule.parameters.get("threshold_years").and_then(|v| v.as_i64())
}

fn excluded_causes(rule: &TriageRule) -> Vec<String> {
    rule.parameters
        .get("causes")
        .and_then(|v| v.as_array())
        .map(|causes| causes.iter().filter_map(|c| c.as_str()).map(|s| s.to_lowercase()).collect())
        .unwrap_or_default()
}

fn window_hours_threshold(rule: &TriageRule) -> Option<i64> {
    rule.parameters.get("hours").and_then(|v| v.as_i64())
}

fn sector_bonus(rule: &TriageRule, sector: Option<&str>) -> i32 {
    let Some(sector) = sector else { return 0 };
    rule.parameters.get("bonuses").and_then(|v| v.get(sector)).and_then(|v| v.as_i64()).unwrap_or(0) as i32
}
