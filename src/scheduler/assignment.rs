use super::types::{ConversionFailure, GroupOutcome, GroupReport, WalkOutcome};
use super::{mutate, sequence, util, SchedError, VacationScheduler};
use crate::absence::AbsenceGate;
use crate::error::IntegrityError;
use crate::model::{is_weekend, Employee, GroupId};
use crate::storage::CalendarStore;
use crate::tenure::remaining_quota;
use chrono::{Duration, NaiveDate};
use tracing::{debug, error, info, warn};

pub(super) fn run_group<S: CalendarStore + ?Sized>(
    scheduler: &VacationScheduler<'_>,
    group: &GroupId,
    employees: &mut [Employee],
    store: &mut S,
) -> Result<GroupReport, SchedError> {
    if scheduler.org.find_group(group).is_none() {
        return Err(IntegrityError::UnknownGroup(group.as_str().to_string()).into());
    }

    let order = sequence::seniority_order(employees, group, scheduler.tiers);
    let mut report = GroupReport::new(group.clone(), order.len());

    let Some((first, last)) = scheduler.window() else {
        warn!(%group, "allocation window is empty, nothing assigned");
        report.outcome = GroupOutcome::NoWindow;
        return Ok(report);
    };

    let total = order.len();
    let last_offset = util::last_offset(first, last);
    let bound = scheduler.opts.max_outer_iterations.unwrap_or(total + 1);
    let gate = scheduler.gate();
    let mut cursor = 0usize;
    let mut offset = 0usize;

    while cursor < total {
        if report.iterations >= bound {
            let remaining = total - cursor;
            warn!(%group, remaining, bound, "iteration bound reached, group run stopped");
            report.outcome = GroupOutcome::Aborted { remaining };
            return Ok(report);
        }
        report.iterations += 1;

        if offset > last_offset {
            offset = 0;
            report.wraps += 1;
            debug!(%group, wraps = report.wraps, "window exhausted, restarting at first day");
            continue;
        }

        let employee = &mut employees[order[cursor]];
        let target = remaining_quota(employee, scheduler.tiers);
        let start = first + Duration::days(i64::try_from(offset).unwrap_or(i64::MAX));

        match walk_employee(&gate, store, employee, start, last, target) {
            Ok(walk) => {
                debug!(
                    employee = %employee.id,
                    %start,
                    scanned = walk.scanned,
                    span = walk.span,
                    assigned = walk.assigned,
                    "employee walk done"
                );
                report.assigned_days += walk.assigned;
                if walk.assigned == target {
                    report.fulfilled += 1;
                }
                offset += util::next_cursor_advance(walk.span, walk.assigned);
                report.failures.extend(walk.failures);
            }
            Err(err) => {
                error!(employee = %employee.id, %err, "employee walk aborted");
                report.integrity_errors.push((employee.id.clone(), err));
            }
        }

        cursor += 1;
        report.processed += 1;
    }

    info!(
        %group,
        assigned = report.assigned_days,
        fulfilled = report.fulfilled,
        iterations = report.iterations,
        "group run completed"
    );
    Ok(report)
}

/// Marche d'un employé de `start` à `end` inclus, jusqu'à `target` jours.
///
/// Les week-ends ne sont ni attribuables ni comptés dans `scanned`. Chaque
/// autre date est comptée comme parcourue, qu'elle soit attribuée ou non.
/// `span` compte toutes les dates visitées, week-ends compris.
pub(super) fn walk_employee<S: CalendarStore + ?Sized>(
    gate: &AbsenceGate<'_>,
    store: &mut S,
    employee: &mut Employee,
    start: NaiveDate,
    end: NaiveDate,
    target: u32,
) -> Result<WalkOutcome, IntegrityError> {
    let mut out = WalkOutcome::default();

    for date in start.iter_days().take_while(|d| *d <= end) {
        if out.assigned >= target {
            break;
        }
        out.span += 1;
        if is_weekend(date) {
            continue;
        }
        out.scanned += 1;

        let day = match store.day(&employee.id, date) {
            Ok(Some(day)) => day,
            Ok(None) => {
                out.missing += 1;
                continue;
            }
            Err(err) => {
                record_failure(&mut out, employee, date, &err);
                continue;
            }
        };
        if !day.is_working() {
            out.not_working += 1;
            continue;
        }

        match gate.admits_absence(&*store, &employee.group, date) {
            Ok(true) => {}
            Ok(false) => {
                out.over_ceiling += 1;
                continue;
            }
            Err(SchedError::Integrity(err)) => return Err(err),
            Err(err) => {
                record_failure(&mut out, employee, date, &err);
                continue;
            }
        }

        match mutate::convert_day(store, day) {
            Ok(record) => {
                employee.auto_assigned += 1;
                out.assigned += 1;
                debug!(
                    employee = %employee.id,
                    %date,
                    shift = record.shift.as_str(),
                    "vacation assigned"
                );
            }
            Err(err) => record_failure(&mut out, employee, date, &err),
        }
    }

    Ok(out)
}

fn record_failure(
    out: &mut WalkOutcome,
    employee: &Employee,
    date: NaiveDate,
    err: &dyn std::fmt::Display,
) {
    warn!(employee = %employee.id, %date, %err, "conversion failed, date skipped");
    out.failures.push(ConversionFailure {
        employee: employee.id.clone(),
        date,
        reason: err.to_string(),
    });
}
