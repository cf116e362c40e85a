//! Calendrier jour par jour d'un employé.
//!
//! Chaque date est résolue par une liste ordonnée de sources ; la première
//! qui répond l'emporte :
//! férié légal > férié entreprise > absence > congé existant > rotation.

mod rotation;
mod sources;

pub use rotation::{rotation_index, RotationSource};
pub use sources::{HolidaySource, LeaveSource, VacationSource};

use crate::error::IntegrityError;
use crate::model::{
    AreaId, CalendarDay, Dataset, DayType, Employee, EmployeeId, HolidayKind, HolidayRecord,
    LeaveRecord, Organization, Shift, ShiftRotationRule, SourceRef, VacationRecord,
};
use crate::scheduler::SchedError;
use crate::storage::CalendarStore;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Type de jour résolu par une source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub day_type: DayType,
    pub shift: Shift,
    pub source: SourceRef,
}

/// Une source candidate pour le type d'un jour.
pub trait DaySource {
    fn name(&self) -> &'static str;
    fn try_resolve(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<Resolution>, IntegrityError>;
}

pub struct CalendarDayResolver<'a> {
    sources: Vec<Box<dyn DaySource + 'a>>,
}

impl<'a> CalendarDayResolver<'a> {
    /// Ordre de priorité standard.
    pub fn new(
        holidays: &[HolidayRecord],
        leaves: &[LeaveRecord],
        vacations: &[VacationRecord],
        rotations: &'a [ShiftRotationRule],
    ) -> Self {
        Self::with_sources(vec![
            Box::new(HolidaySource::new(HolidayKind::Legal, holidays)),
            Box::new(HolidaySource::new(HolidayKind::Company, holidays)),
            Box::new(LeaveSource::new(leaves)),
            Box::new(VacationSource::new(vacations)),
            Box::new(RotationSource::new(rotations)),
        ])
    }

    pub fn with_sources(sources: Vec<Box<dyn DaySource + 'a>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Première source qui répond ; à défaut, jour travaillé avec repos en
    /// poste de remplacement.
    pub fn resolve_type(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Resolution, IntegrityError> {
        for source in &self.sources {
            if let Some(resolution) = source.try_resolve(employee, date)? {
                return Ok(resolution);
            }
        }
        Ok(Resolution {
            day_type: DayType::Working,
            shift: Shift::Rest,
            source: SourceRef::None,
        })
    }

    pub fn resolve(
        &self,
        employee: &Employee,
        area: &AreaId,
        date: NaiveDate,
    ) -> Result<CalendarDay, IntegrityError> {
        let r = self.resolve_type(employee, date)?;
        Ok(CalendarDay {
            employee: employee.id.clone(),
            date,
            group: employee.group.clone(),
            area: area.clone(),
            day_type: r.day_type,
            shift: r.shift,
            source: r.source,
        })
    }
}

/// Date ou employé écarté pendant la génération.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDay {
    pub employee: EmployeeId,
    /// `None` quand tout l'employé est écarté (groupe ou zone inconnus).
    pub date: Option<NaiveDate>,
    pub error: IntegrityError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub created: usize,
    pub existing: usize,
    pub skipped: Vec<SkippedDay>,
}

/// Crée une ligne par employé et par date de `[from, to]`.
/// Les lignes déjà présentes sont conservées telles quelles.
pub fn generate_calendar<S: CalendarStore + ?Sized>(
    resolver: &CalendarDayResolver<'_>,
    org: &Organization,
    employees: &[Employee],
    from: NaiveDate,
    to: NaiveDate,
    store: &mut S,
) -> Result<GenerationReport, SchedError> {
    if to < from {
        return Err(SchedError::InvalidDateRange { from, to });
    }
    let mut report = GenerationReport::default();

    for employee in employees {
        let area = match employee_area(org, employee) {
            Ok(area) => area,
            Err(error) => {
                warn!(employee = %employee.id, %error, "employee skipped");
                report.skipped.push(SkippedDay {
                    employee: employee.id.clone(),
                    date: None,
                    error,
                });
                continue;
            }
        };

        for date in from.iter_days().take_while(|d| *d <= to) {
            if store.day(&employee.id, date).map_err(SchedError::Store)?.is_some() {
                report.existing += 1;
                continue;
            }
            match resolver.resolve(employee, &area, date) {
                Ok(day) => {
                    store.insert_day(day).map_err(SchedError::Store)?;
                    report.created += 1;
                }
                Err(error) => {
                    warn!(employee = %employee.id, %date, %error, "date skipped");
                    report.skipped.push(SkippedDay {
                        employee: employee.id.clone(),
                        date: Some(date),
                        error,
                    });
                }
            }
        }
    }

    info!(
        created = report.created,
        existing = report.existing,
        skipped = report.skipped.len(),
        "calendar generated"
    );
    Ok(report)
}

fn employee_area(org: &Organization, employee: &Employee) -> Result<AreaId, IntegrityError> {
    let group = org
        .find_group(&employee.group)
        .ok_or_else(|| IntegrityError::UnknownGroup(employee.group.as_str().to_string()))?;
    org.find_area(&group.area)
        .map(|a| a.id.clone())
        .ok_or_else(|| IntegrityError::UnknownArea {
            group: group.id.as_str().to_string(),
            area: group.area.as_str().to_string(),
        })
}

/// Génère le calendrier de tout le programme annuel du jeu de données.
pub fn generate_program(dataset: &mut Dataset) -> Result<GenerationReport, SchedError> {
    let Dataset {
        program,
        organization,
        rotations,
        employees,
        holidays,
        leaves,
        calendar,
        ..
    } = dataset;
    let existing = calendar.vacations().to_vec();
    let resolver = CalendarDayResolver::new(holidays, leaves, &existing, rotations);
    generate_calendar(
        &resolver,
        organization,
        employees,
        program.start,
        program.end,
        calendar,
    )
}
