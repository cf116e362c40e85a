//! Taux d'absence d'un groupe et plafond d'admission d'une nouvelle absence.
//!
//! Lecture pure de l'état courant du calendrier : à réévaluer après chaque
//! conversion, jamais mis en cache.

use crate::error::IntegrityError;
use crate::model::{Group, GroupId, Organization};
use crate::scheduler::SchedError;
use crate::storage::CalendarStore;
use chrono::{Datelike, NaiveDate};

/// Plafond d'absence par défaut, en pourcentage.
pub const DEFAULT_ABSENCE_CEILING: f64 = 4.5;

/// Résolution de l'effectif : jour > mois > défaut de la zone.
pub fn resolve_manning(
    org: &Organization,
    group: &GroupId,
    date: NaiveDate,
) -> Result<u32, IntegrityError> {
    let g = lookup_group(org, group)?;
    if let Some(day) = org
        .day_manning
        .iter()
        .find(|m| &m.group == group && m.date == date)
    {
        return Ok(day.manning);
    }
    if let Some(month) = org
        .month_manning
        .iter()
        .find(|m| &m.group == group && m.year == date.year() && m.month == date.month())
    {
        return Ok(month.manning);
    }
    let area = org
        .find_area(&g.area)
        .ok_or_else(|| IntegrityError::UnknownArea {
            group: group.as_str().to_string(),
            area: g.area.as_str().to_string(),
        })?;
    Ok(area.manning)
}

fn lookup_group<'a>(org: &'a Organization, group: &GroupId) -> Result<&'a Group, IntegrityError> {
    org.find_group(group)
        .ok_or_else(|| IntegrityError::UnknownGroup(group.as_str().to_string()))
}

fn percent(count: usize, manning: u32) -> f64 {
    if manning == 0 {
        return 0.0;
    }
    count as f64 / f64::from(manning) * 100.0
}

/// Effectifs présents et absents d'un groupe à une date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headcount {
    pub working: usize,
    pub absent: usize,
    pub manning: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct AbsenceGate<'a> {
    org: &'a Organization,
    ceiling: f64,
}

impl<'a> AbsenceGate<'a> {
    pub fn new(org: &'a Organization, ceiling: f64) -> Self {
        Self { org, ceiling }
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn headcount<S: CalendarStore + ?Sized>(
        &self,
        store: &S,
        group: &GroupId,
        date: NaiveDate,
        manning_override: Option<u32>,
    ) -> Result<Headcount, SchedError> {
        let manning = match manning_override {
            Some(m) => {
                lookup_group(self.org, group)?;
                m
            }
            None => resolve_manning(self.org, group, date)?,
        };
        let days = store.group_days_on(group, date).map_err(SchedError::Store)?;
        let working = days.iter().filter(|d| d.is_working()).count();
        Ok(Headcount {
            working,
            absent: days.len() - working,
            manning,
        })
    }

    pub fn available_percent<S: CalendarStore + ?Sized>(
        &self,
        store: &S,
        group: &GroupId,
        date: NaiveDate,
        manning_override: Option<u32>,
    ) -> Result<f64, SchedError> {
        let hc = self.headcount(store, group, date, manning_override)?;
        Ok(percent(hc.working, hc.manning))
    }

    /// 0 si l'effectif est nul.
    pub fn absence_percent<S: CalendarStore + ?Sized>(
        &self,
        store: &S,
        group: &GroupId,
        date: NaiveDate,
        manning_override: Option<u32>,
    ) -> Result<f64, SchedError> {
        let hc = self.headcount(store, group, date, manning_override)?;
        Ok(percent(hc.absent, hc.manning))
    }

    pub fn within_ceiling<S: CalendarStore + ?Sized>(
        &self,
        store: &S,
        group: &GroupId,
        date: NaiveDate,
    ) -> Result<bool, SchedError> {
        Ok(self.absence_percent(store, group, date, None)? <= self.ceiling)
    }

    /// Plafond évalué comme si un employé de plus cessait de travailler ce jour.
    pub fn admits_absence<S: CalendarStore + ?Sized>(
        &self,
        store: &S,
        group: &GroupId,
        date: NaiveDate,
    ) -> Result<bool, SchedError> {
        let hc = self.headcount(store, group, date, None)?;
        Ok(percent(hc.absent + 1, hc.manning) <= self.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Area, AreaId, CalendarDay, DayManning, DayType, EmployeeId, MonthManning, Shift, SourceRef,
    };
    use crate::storage::CalendarBook;

    fn org(manning: u32) -> Organization {
        Organization {
            areas: vec![Area {
                id: AreaId::new("a1"),
                name: "Atelier".into(),
                manning,
            }],
            groups: vec![Group {
                id: GroupId::new("g1"),
                name: "Équipe 1".into(),
                area: AreaId::new("a1"),
            }],
            day_manning: Vec::new(),
            month_manning: Vec::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn book(working: usize, absent: usize) -> CalendarBook {
        let mut book = CalendarBook::default();
        for i in 0..working + absent {
            let day_type = if i < working {
                DayType::Working
            } else {
                DayType::Leave
            };
            book.insert_day(CalendarDay {
                employee: EmployeeId::new(format!("e{i:02}")),
                date: date(),
                group: GroupId::new("g1"),
                area: AreaId::new("a1"),
                day_type,
                shift: Shift::Morning,
                source: SourceRef::None,
            })
            .unwrap();
        }
        book
    }

    #[test]
    fn one_absent_out_of_ten_exceeds_ceiling() {
        let org = org(10);
        let gate = AbsenceGate::new(&org, DEFAULT_ABSENCE_CEILING);
        let book = book(9, 1);
        let g = GroupId::new("g1");

        let absence = gate.absence_percent(&book, &g, date(), None).unwrap();
        assert!((absence - 10.0).abs() < 1e-9);
        assert!(!gate.within_ceiling(&book, &g, date()).unwrap());
        assert!(!gate.admits_absence(&book, &g, date()).unwrap());
    }

    #[test]
    fn available_and_absence_sum_to_hundred() {
        let org = org(20);
        let gate = AbsenceGate::new(&org, DEFAULT_ABSENCE_CEILING);
        let book = book(17, 3);
        let g = GroupId::new("g1");
        let available = gate.available_percent(&book, &g, date(), None).unwrap();
        let absence = gate.absence_percent(&book, &g, date(), None).unwrap();
        assert!((available + absence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_manning_yields_zero_absence() {
        let org = org(0);
        let gate = AbsenceGate::new(&org, DEFAULT_ABSENCE_CEILING);
        let book = book(1, 2);
        let g = GroupId::new("g1");
        assert_eq!(gate.absence_percent(&book, &g, date(), None).unwrap(), 0.0);
        assert_eq!(gate.available_percent(&book, &g, date(), None).unwrap(), 0.0);
        assert!(gate.admits_absence(&book, &g, date()).unwrap());
    }

    #[test]
    fn pending_conversion_is_counted() {
        // 22 présents : 1/22 ≈ 4.545 % > 4.5
        let g = GroupId::new("g1");
        let book = book(22, 0);
        let tight = org(22);
        let gate = AbsenceGate::new(&tight, DEFAULT_ABSENCE_CEILING);
        assert!(gate.within_ceiling(&book, &g, date()).unwrap());
        assert!(!gate.admits_absence(&book, &g, date()).unwrap());

        let roomy = org(23);
        let gate = AbsenceGate::new(&roomy, DEFAULT_ABSENCE_CEILING);
        assert!(gate.admits_absence(&book, &g, date()).unwrap());
    }

    #[test]
    fn manning_precedence_day_then_month_then_area() {
        let mut org = org(10);
        let g = GroupId::new("g1");
        assert_eq!(resolve_manning(&org, &g, date()).unwrap(), 10);

        org.month_manning.push(MonthManning {
            group: g.clone(),
            year: 2025,
            month: 3,
            manning: 12,
        });
        assert_eq!(resolve_manning(&org, &g, date()).unwrap(), 12);

        org.day_manning.push(DayManning {
            group: g.clone(),
            date: date(),
            manning: 15,
        });
        assert_eq!(resolve_manning(&org, &g, date()).unwrap(), 15);
        let other_day = date().succ_opt().unwrap();
        assert_eq!(resolve_manning(&org, &g, other_day).unwrap(), 12);
    }

    #[test]
    fn override_replaces_resolved_manning() {
        let org = org(10);
        let gate = AbsenceGate::new(&org, DEFAULT_ABSENCE_CEILING);
        let book = book(3, 1);
        let g = GroupId::new("g1");
        let absence = gate.absence_percent(&book, &g, date(), Some(4)).unwrap();
        assert!((absence - 25.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_group_and_area_are_integrity_errors() {
        let mut org = org(10);
        let missing = GroupId::new("nope");
        assert_eq!(
            resolve_manning(&org, &missing, date()),
            Err(IntegrityError::UnknownGroup("nope".into()))
        );

        org.areas.clear();
        let err = resolve_manning(&org, &GroupId::new("g1"), date()).unwrap_err();
        assert!(matches!(err, IntegrityError::UnknownArea { .. }));
    }
}
