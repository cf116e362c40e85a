use super::{DaySource, Resolution};
use crate::error::IntegrityError;
use crate::model::{
    DayType, Employee, EmployeeId, HolidayId, HolidayKind, HolidayRecord, LeaveId, LeaveRecord,
    Shift, SourceRef, VacationId, VacationRecord,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Jours fériés d'un type donné (légal ou entreprise).
pub struct HolidaySource {
    kind: HolidayKind,
    by_date: HashMap<NaiveDate, HolidayId>,
}

impl HolidaySource {
    pub fn new(kind: HolidayKind, holidays: &[HolidayRecord]) -> Self {
        let mut by_date = HashMap::new();
        for h in holidays.iter().filter(|h| h.kind == kind) {
            by_date.entry(h.date).or_insert_with(|| h.id.clone());
        }
        Self { kind, by_date }
    }
}

impl DaySource for HolidaySource {
    fn name(&self) -> &'static str {
        match self.kind {
            HolidayKind::Legal => "legal-holiday",
            HolidayKind::Company => "company-holiday",
        }
    }

    fn try_resolve(
        &self,
        _employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<Resolution>, IntegrityError> {
        Ok(self.by_date.get(&date).map(|id| Resolution {
            day_type: match self.kind {
                HolidayKind::Legal => DayType::LegalHoliday,
                HolidayKind::Company => DayType::CompanyHoliday,
            },
            shift: Shift::Rest,
            source: SourceRef::Holiday(id.clone()),
        }))
    }
}

/// Congés spéciaux et arrêts.
pub struct LeaveSource {
    by_employee: HashMap<EmployeeId, Vec<LeaveRecord>>,
}

impl LeaveSource {
    pub fn new(leaves: &[LeaveRecord]) -> Self {
        let mut by_employee: HashMap<EmployeeId, Vec<LeaveRecord>> = HashMap::new();
        for leave in leaves {
            by_employee
                .entry(leave.employee.clone())
                .or_default()
                .push(leave.clone());
        }
        for list in by_employee.values_mut() {
            list.sort_by_key(|l| l.start);
        }
        Self { by_employee }
    }

    fn find(&self, employee: &EmployeeId, date: NaiveDate) -> Option<&LeaveId> {
        self.by_employee
            .get(employee)?
            .iter()
            .find(|l| l.covers(date))
            .map(|l| &l.id)
    }
}

impl DaySource for LeaveSource {
    fn name(&self) -> &'static str {
        "leave"
    }

    fn try_resolve(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<Resolution>, IntegrityError> {
        Ok(self.find(&employee.id, date).map(|id| Resolution {
            day_type: DayType::Leave,
            shift: Shift::Rest,
            source: SourceRef::Leave(id.clone()),
        }))
    }
}

/// Congés déjà enregistrés avant la génération.
pub struct VacationSource {
    by_day: HashMap<(EmployeeId, NaiveDate), VacationId>,
}

impl VacationSource {
    pub fn new(vacations: &[VacationRecord]) -> Self {
        let by_day = vacations
            .iter()
            .map(|v| ((v.employee.clone(), v.date), v.id.clone()))
            .collect();
        Self { by_day }
    }
}

impl DaySource for VacationSource {
    fn name(&self) -> &'static str {
        "vacation"
    }

    fn try_resolve(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<Resolution>, IntegrityError> {
        Ok(self
            .by_day
            .get(&(employee.id.clone(), date))
            .map(|id| Resolution {
                day_type: DayType::Vacation,
                shift: Shift::Rest,
                source: SourceRef::Vacation(id.clone()),
            }))
    }
}
