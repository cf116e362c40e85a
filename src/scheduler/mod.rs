//! Attribution automatique des congés annuels.
//!
//! Par groupe : les employés éligibles passent par ordre d'ancienneté et
//! parcourent la fenêtre d'attribution jour par jour. Chaque conversion est
//! soumise au plafond d'absence du groupe, recalculé à chaque date.

mod assignment;
mod conflicts;
mod mutate;
mod sequence;
mod types;
mod util;

pub use types::{
    ConversionFailure, GroupOutcome, GroupReport, RunReport, SchedError, ScheduleOptions,
    WalkOutcome,
};
pub use util::next_cursor_advance;

use crate::absence::AbsenceGate;
use crate::model::{
    AnnualProgram, Dataset, Employee, EmployeeId, GroupId, Organization, SeniorityTierRule,
};
use crate::storage::CalendarStore;
use crate::tenure::remaining_quota;
use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Type du jour et référence source incompatibles.
    InconsistentDay,
    /// Référence vers un congé inexistant.
    OrphanVacation,
    WeekendVacation,
    QuotaExceeded,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::InconsistentDay => "inconsistent",
            ViolationKind::OrphanVacation => "orphan",
            ViolationKind::WeekendVacation => "weekend",
            ViolationKind::QuotaExceeded => "quota",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub employee: EmployeeId,
    pub date: Option<NaiveDate>,
    pub kind: ViolationKind,
}

/// Planificateur : règles et options d'un programme annuel.
#[derive(Debug, Clone, Copy)]
pub struct VacationScheduler<'a> {
    org: &'a Organization,
    tiers: &'a [SeniorityTierRule],
    program: &'a AnnualProgram,
    opts: ScheduleOptions,
}

impl<'a> VacationScheduler<'a> {
    pub fn new(
        org: &'a Organization,
        tiers: &'a [SeniorityTierRule],
        program: &'a AnnualProgram,
        opts: ScheduleOptions,
    ) -> Self {
        Self {
            org,
            tiers,
            program,
            opts,
        }
    }

    /// Fenêtre d'attribution, `None` si vide.
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.program.window(self.opts.window_lead_days, self.opts.window_tail_days)
    }

    pub fn gate(&self) -> AbsenceGate<'a> {
        AbsenceGate::new(self.org, self.opts.absence_ceiling)
    }

    pub fn run_group<S: CalendarStore + ?Sized>(
        &self,
        group: &GroupId,
        employees: &mut [Employee],
        store: &mut S,
    ) -> Result<GroupReport, SchedError> {
        assignment::run_group(self, group, employees, store)
    }

    /// Marche d'un seul employé, hors parcours cyclique.
    ///
    /// `target` est borné par le quota restant de l'employé.
    pub fn walk_employee<S: CalendarStore + ?Sized>(
        &self,
        store: &mut S,
        employee: &mut Employee,
        start: NaiveDate,
        end: NaiveDate,
        target: u32,
    ) -> Result<WalkOutcome, SchedError> {
        let gate = self.gate();
        let target = target.min(remaining_quota(employee, self.tiers));
        Ok(assignment::walk_employee(&gate, store, employee, start, end, target)?)
    }

    /// Tous les groupes, dans l'ordre de leurs identifiants.
    pub fn run<S: CalendarStore + ?Sized>(
        &self,
        employees: &mut [Employee],
        store: &mut S,
    ) -> Result<RunReport, SchedError> {
        let mut report = RunReport::default();
        for employee in employees.iter() {
            if self.org.find_group(&employee.group).is_none() {
                warn!(
                    employee = %employee.id,
                    group = %employee.group,
                    "employee in unknown group"
                );
                report.unknown_group.push(employee.id.clone());
            }
        }

        let mut groups: Vec<&GroupId> = self.org.groups.iter().map(|g| &g.id).collect();
        groups.sort();
        for group in groups {
            report.groups.push(self.run_group(group, employees, store)?);
        }
        Ok(report)
    }
}

/// Lance l'attribution sur tout le jeu de données.
pub fn schedule_program(
    dataset: &mut Dataset,
    opts: ScheduleOptions,
) -> Result<RunReport, SchedError> {
    let Dataset {
        program,
        organization,
        tiers,
        employees,
        calendar,
        ..
    } = dataset;
    VacationScheduler::new(organization, tiers, program, opts).run(employees, calendar)
}

/// Contrôle de cohérence du jeu de données.
pub fn check_dataset(dataset: &Dataset) -> Vec<Violation> {
    conflicts::detect_violations(&dataset.calendar, &dataset.employees, &dataset.tiers)
}
