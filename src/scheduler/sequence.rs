use crate::model::{Employee, GroupId, SeniorityTierRule};
use crate::tenure::auto_assign_quota;
use std::cmp::Ordering;

/// Ordre de passage d'un groupe : indices dans `employees`.
///
/// Seuls les employés du groupe avec un quota automatique positif sont
/// retenus, triés par ancienneté décroissante (inconnue en dernier), puis
/// par matricule croissant.
pub(super) fn seniority_order(
    employees: &[Employee],
    group: &GroupId,
    tiers: &[SeniorityTierRule],
) -> Vec<usize> {
    let mut order: Vec<usize> = employees
        .iter()
        .enumerate()
        .filter(|(_, e)| &e.group == group && auto_assign_quota(e, tiers) > 0)
        .map(|(idx, _)| idx)
        .collect();
    order.sort_by(|&a, &b| compare_seniority(&employees[a], &employees[b]));
    order
}

fn compare_seniority(a: &Employee, b: &Employee) -> Ordering {
    let by_tenure = match (a.tenure_days, b.tenure_days) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_tenure.then_with(|| a.payroll.cmp(&b.payroll))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TierId;

    fn tiers() -> Vec<SeniorityTierRule> {
        vec![
            SeniorityTierRule {
                id: TierId::new("t"),
                from_years: 0,
                to_years: None,
                auto_assign_days: 3,
                total_days: 22,
                granted_days: 0,
            },
            SeniorityTierRule {
                id: TierId::new("none"),
                from_years: 0,
                to_years: None,
                auto_assign_days: 0,
                total_days: 22,
                granted_days: 0,
            },
        ]
    }

    fn employee(payroll: u32, group: &str, tenure: Option<i64>, tier: &str) -> Employee {
        let mut e = Employee::new(payroll, group);
        e.tenure_days = tenure;
        e.tier = Some(TierId::new(tier));
        e
    }

    #[test]
    fn longest_tenure_first_unknown_last_ties_by_payroll() {
        let employees = vec![
            employee(40, "g1", None, "t"),
            employee(30, "g1", Some(100), "t"),
            employee(20, "g1", Some(900), "t"),
            employee(10, "g1", Some(100), "t"),
            employee(5, "g1", None, "t"),
        ];
        let order = seniority_order(&employees, &GroupId::new("g1"), &tiers());
        let payrolls: Vec<u32> = order.iter().map(|&i| employees[i].payroll).collect();
        assert_eq!(payrolls, vec![20, 10, 30, 5, 40]);
    }

    #[test]
    fn other_groups_and_zero_quota_are_excluded() {
        let mut no_tier = employee(4, "g1", Some(50), "t");
        no_tier.tier = None;
        let employees = vec![
            employee(1, "g2", Some(100), "t"),
            employee(2, "g1", Some(100), "none"),
            employee(3, "g1", Some(10), "t"),
            no_tier,
        ];
        let order = seniority_order(&employees, &GroupId::new("g1"), &tiers());
        assert_eq!(order, vec![2]);
    }
}
