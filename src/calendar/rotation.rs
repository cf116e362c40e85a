use super::{DaySource, Resolution};
use crate::error::IntegrityError;
use crate::model::{DayType, Employee, Shift, ShiftRotationRule, SourceRef};
use chrono::{Datelike, NaiveDate};

/// Position dans le cycle : `(anchor_index + offset) mod cycle_len`.
/// `None` si l'offset est négatif ou le cycle vide.
pub fn rotation_index(anchor_index: u32, offset: i64, cycle_len: u32) -> Option<u32> {
    if offset < 0 || cycle_len == 0 {
        return None;
    }
    let idx = (u64::from(anchor_index) + offset.unsigned_abs()) % u64::from(cycle_len);
    u32::try_from(idx).ok()
}

/// Poste issu de la rotation de l'employé.
pub struct RotationSource<'a> {
    rules: &'a [ShiftRotationRule],
}

impl<'a> RotationSource<'a> {
    pub fn new(rules: &'a [ShiftRotationRule]) -> Self {
        Self { rules }
    }

    /// Poste prévu par la rotation, ou erreur d'intégrité.
    pub fn shift_for(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<(Shift, &'a ShiftRotationRule)>, IntegrityError> {
        let Some(anchor) = employee.rotation.as_ref() else {
            return Ok(None);
        };
        let rule = self
            .rules
            .iter()
            .find(|r| r.rule == anchor.rule && r.pattern == anchor.pattern)
            .ok_or_else(|| IntegrityError::UnknownRotation {
                rule: anchor.rule.as_str().to_string(),
                pattern: anchor.pattern.clone(),
            })?;
        let offset = date.signed_duration_since(anchor.date).num_days();
        if offset < 0 {
            return Err(IntegrityError::BeforeAnchor {
                employee: employee.id.as_str().to_string(),
                date,
                anchor: anchor.date,
            });
        }
        let index = rotation_index(anchor.index, offset, rule.cycle_len()).ok_or_else(|| {
            IntegrityError::EmptyCycle {
                rule: rule.rule.as_str().to_string(),
            }
        })?;
        let entry = rule.entry(index, date.weekday()).ok_or_else(|| {
            IntegrityError::MissingRotationEntry {
                rule: rule.rule.as_str().to_string(),
                index,
                weekday: date.weekday(),
            }
        })?;
        Ok(Some((entry.shift, rule)))
    }
}

impl DaySource for RotationSource<'_> {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn try_resolve(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<Resolution>, IntegrityError> {
        let Some((shift, rule)) = self.shift_for(employee, date)? else {
            return Ok(None);
        };
        let day_type = if shift == Shift::Rest {
            DayType::WeeklyRest
        } else {
            DayType::Working
        };
        Ok(Some(Resolution {
            day_type,
            shift,
            source: SourceRef::Rotation(rule.rule.clone()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RotationAnchor, RotationEntry, RuleId};
    use chrono::Weekday;

    #[test]
    fn index_wraps_around_cycle() {
        assert_eq!(rotation_index(2, 5, 4), Some(3));
        assert_eq!(rotation_index(0, 0, 4), Some(0));
        assert_eq!(rotation_index(3, 1, 4), Some(0));
    }

    #[test]
    fn negative_offset_or_empty_cycle_fails() {
        assert_eq!(rotation_index(0, -1, 4), None);
        assert_eq!(rotation_index(0, 3, 0), None);
    }

    fn rule() -> ShiftRotationRule {
        // cycle de 2 : index 0 le lundi matin, index 1 le mardi repos
        ShiftRotationRule {
            rule: RuleId::new("r1"),
            pattern: "A".into(),
            entries: vec![
                RotationEntry {
                    index: 0,
                    weekday: Weekday::Mon,
                    shift: Shift::Morning,
                },
                RotationEntry {
                    index: 1,
                    weekday: Weekday::Tue,
                    shift: Shift::Rest,
                },
            ],
        }
    }

    fn employee(anchor: NaiveDate) -> Employee {
        let mut e = Employee::new(1, "g1");
        e.rotation = Some(RotationAnchor {
            rule: RuleId::new("r1"),
            pattern: "A".into(),
            date: anchor,
            index: 0,
        });
        e
    }

    #[test]
    fn rest_entry_resolves_to_weekly_rest() {
        let rules = vec![rule()];
        let source = RotationSource::new(&rules);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let e = employee(monday);

        let r = source.try_resolve(&e, monday).unwrap().unwrap();
        assert_eq!(r.day_type, DayType::Working);
        assert_eq!(r.shift, Shift::Morning);

        let r = source.try_resolve(&e, monday.succ_opt().unwrap()).unwrap().unwrap();
        assert_eq!(r.day_type, DayType::WeeklyRest);
    }

    #[test]
    fn missing_entry_and_early_date_are_reported() {
        let rules = vec![rule()];
        let source = RotationSource::new(&rules);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let e = employee(monday);

        // mercredi : index 0, aucune entrée (0, mercredi)
        let wednesday = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert!(matches!(
            source.try_resolve(&e, wednesday),
            Err(IntegrityError::MissingRotationEntry { index: 0, .. })
        ));

        let before = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert!(matches!(
            source.try_resolve(&e, before),
            Err(IntegrityError::BeforeAnchor { .. })
        ));
    }

    #[test]
    fn unknown_pattern_is_reported() {
        let rules = vec![rule()];
        let source = RotationSource::new(&rules);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let mut e = employee(monday);
        if let Some(anchor) = e.rotation.as_mut() {
            anchor.pattern = "B".into();
        }
        assert!(matches!(
            source.try_resolve(&e, monday),
            Err(IntegrityError::UnknownRotation { .. })
        ));
    }
}
