//! Ancienneté et paliers de congés.

use crate::model::{Employee, SeniorityTierRule};
use chrono::NaiveDate;
use tracing::debug;

/// Années complètes pour une ancienneté en jours.
pub fn years_from_days(days: i64) -> u32 {
    u32::try_from(days.max(0) / 365).unwrap_or(u32::MAX)
}

/// Premier palier couvrant `years`.
pub fn match_tier(tiers: &[SeniorityTierRule], years: u32) -> Option<&SeniorityTierRule> {
    tiers.iter().find(|t| t.matches(years))
}

/// Quota de jours à attribuer automatiquement ; 0 sans palier.
pub fn auto_assign_quota(employee: &Employee, tiers: &[SeniorityTierRule]) -> u32 {
    employee
        .tier
        .as_ref()
        .and_then(|id| tiers.iter().find(|t| &t.id == id))
        .map_or(0, |t| t.auto_assign_days)
}

/// Jours restant à attribuer.
pub fn remaining_quota(employee: &Employee, tiers: &[SeniorityTierRule]) -> u32 {
    auto_assign_quota(employee, tiers).saturating_sub(employee.auto_assigned)
}

/// Recalcule ancienneté et palier de chaque employé à la date `as_of`.
/// Sans date d'embauche, l'ancienneté et le palier sont effacés.
pub fn recompute(employees: &mut [Employee], tiers: &[SeniorityTierRule], as_of: NaiveDate) {
    for employee in employees.iter_mut() {
        let Some(hired) = employee.hire_date else {
            employee.tenure_days = None;
            employee.tenure_years = None;
            employee.tier = None;
            continue;
        };
        let days = as_of.signed_duration_since(hired).num_days().max(0);
        let years = years_from_days(days);
        employee.tenure_days = Some(days);
        employee.tenure_years = Some(years);
        employee.tier = match_tier(tiers, years).map(|t| t.id.clone());
        debug!(
            employee = %employee.id,
            days,
            years,
            tier = ?employee.tier,
            "tenure recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TierId;

    fn tier(id: &str, from: u32, to: Option<u32>, days: u32) -> SeniorityTierRule {
        SeniorityTierRule {
            id: TierId::new(id),
            from_years: from,
            to_years: to,
            auto_assign_days: days,
            total_days: days + 10,
            granted_days: 0,
        }
    }

    fn tiers() -> Vec<SeniorityTierRule> {
        vec![
            tier("1-2", 1, Some(2), 5),
            tier("3-5", 3, Some(5), 8),
            tier("6+", 6, None, 12),
        ]
    }

    #[test]
    fn four_hundred_days_hits_first_tier() {
        let hired = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let as_of = hired + chrono::Duration::days(400);
        let mut employees = vec![Employee::new(10, "g1")];
        employees[0].hire_date = Some(hired);

        recompute(&mut employees, &tiers(), as_of);
        assert_eq!(employees[0].tenure_days, Some(400));
        assert_eq!(employees[0].tenure_years, Some(1));
        assert_eq!(employees[0].tier, Some(TierId::new("1-2")));
        assert_eq!(auto_assign_quota(&employees[0], &tiers()), 5);
    }

    #[test]
    fn ten_days_without_zero_tier_gets_nothing() {
        let hired = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut employees = vec![Employee::new(11, "g1")];
        employees[0].hire_date = Some(hired);

        recompute(&mut employees, &tiers(), hired + chrono::Duration::days(10));
        assert_eq!(employees[0].tenure_years, Some(0));
        assert_eq!(employees[0].tier, None);
        assert_eq!(auto_assign_quota(&employees[0], &tiers()), 0);
    }

    #[test]
    fn missing_hire_date_clears_tenure() {
        let mut employees = vec![Employee::new(12, "g1")];
        employees[0].tenure_days = Some(900);
        employees[0].tier = Some(TierId::new("1-2"));
        recompute(&mut employees, &tiers(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(employees[0].tenure_days, None);
        assert_eq!(employees[0].tier, None);
    }

    #[test]
    fn remaining_quota_never_underflows() {
        let mut e = Employee::new(13, "g1");
        e.tier = Some(TierId::new("1-2"));
        e.auto_assigned = 7;
        assert_eq!(remaining_quota(&e, &tiers()), 0);
        e.auto_assigned = 2;
        assert_eq!(remaining_quota(&e, &tiers()), 3);
    }
}
