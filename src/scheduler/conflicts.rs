use super::{Violation, ViolationKind};
use crate::model::{is_weekend, Employee, SeniorityTierRule, SourceRef, VacationOrigin};
use crate::storage::CalendarBook;
use crate::tenure::auto_assign_quota;
use std::collections::HashSet;

pub(super) fn detect_violations(
    book: &CalendarBook,
    employees: &[Employee],
    tiers: &[SeniorityTierRule],
) -> Vec<Violation> {
    let mut out = Vec::new();
    let vacation_ids: HashSet<_> = book.vacations().iter().map(|v| &v.id).collect();

    for day in book.days() {
        if !day.is_consistent() {
            out.push(Violation {
                employee: day.employee.clone(),
                date: Some(day.date),
                kind: ViolationKind::InconsistentDay,
            });
        }
        if let SourceRef::Vacation(id) = &day.source {
            if !vacation_ids.contains(id) {
                out.push(Violation {
                    employee: day.employee.clone(),
                    date: Some(day.date),
                    kind: ViolationKind::OrphanVacation,
                });
            }
        }
    }

    for record in book.vacations() {
        if record.origin == VacationOrigin::Automatic && is_weekend(record.date) {
            out.push(Violation {
                employee: record.employee.clone(),
                date: Some(record.date),
                kind: ViolationKind::WeekendVacation,
            });
        }
    }

    for employee in employees {
        if employee.auto_assigned > auto_assign_quota(employee, tiers) {
            out.push(Violation {
                employee: employee.id.clone(),
                date: None,
                kind: ViolationKind::QuotaExceeded,
            });
        }
    }

    out
}
