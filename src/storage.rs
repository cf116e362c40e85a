use crate::model::{CalendarDay, Dataset, EmployeeId, GroupId, VacationRecord};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un jeu de données depuis un support.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, dataset: &Dataset) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Dataset> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let dataset: Dataset = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(dataset)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

/// Contrat de stockage du planificateur : lire, créer, mettre à jour des lignes.
pub trait CalendarStore {
    fn day(&self, employee: &EmployeeId, date: NaiveDate) -> anyhow::Result<Option<CalendarDay>>;
    /// Toutes les lignes d'une date, tous groupes confondus.
    fn days_on(&self, date: NaiveDate) -> anyhow::Result<Vec<CalendarDay>>;
    fn insert_day(&mut self, day: CalendarDay) -> anyhow::Result<()>;
    fn update_day(&mut self, day: &CalendarDay) -> anyhow::Result<()>;
    fn vacation_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> anyhow::Result<Option<VacationRecord>>;
    fn insert_vacation(&mut self, record: VacationRecord) -> anyhow::Result<()>;

    fn group_days_on(&self, group: &GroupId, date: NaiveDate) -> anyhow::Result<Vec<CalendarDay>> {
        let mut days = self.days_on(date)?;
        days.retain(|d| &d.group == group);
        Ok(days)
    }
}

/// Stockage mémoire des jours de calendrier et des congés.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BookRows", into = "BookRows")]
pub struct CalendarBook {
    days: BTreeMap<(NaiveDate, EmployeeId), CalendarDay>,
    vacations: Vec<VacationRecord>,
}

#[derive(Serialize, Deserialize)]
struct BookRows {
    #[serde(default)]
    days: Vec<CalendarDay>,
    #[serde(default)]
    vacations: Vec<VacationRecord>,
}

impl From<BookRows> for CalendarBook {
    fn from(rows: BookRows) -> Self {
        let days = rows
            .days
            .into_iter()
            .map(|d| ((d.date, d.employee.clone()), d))
            .collect();
        Self {
            days,
            vacations: rows.vacations,
        }
    }
}

impl From<CalendarBook> for BookRows {
    fn from(book: CalendarBook) -> Self {
        Self {
            days: book.days.into_values().collect(),
            vacations: book.vacations,
        }
    }
}

impl CalendarBook {
    /// Lignes triées par (date, employé).
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.values()
    }

    pub fn vacations(&self) -> &[VacationRecord] {
        &self.vacations
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl CalendarStore for CalendarBook {
    fn day(&self, employee: &EmployeeId, date: NaiveDate) -> anyhow::Result<Option<CalendarDay>> {
        Ok(self.days.get(&(date, employee.clone())).cloned())
    }

    fn days_on(&self, date: NaiveDate) -> anyhow::Result<Vec<CalendarDay>> {
        Ok(self
            .days
            .range((date, EmployeeId::new(""))..)
            .take_while(|((d, _), _)| *d == date)
            .map(|(_, day)| day.clone())
            .collect())
    }

    fn insert_day(&mut self, day: CalendarDay) -> anyhow::Result<()> {
        let key = (day.date, day.employee.clone());
        if self.days.contains_key(&key) {
            bail!("calendar day already exists: {} {}", day.employee, day.date);
        }
        self.days.insert(key, day);
        Ok(())
    }

    fn update_day(&mut self, day: &CalendarDay) -> anyhow::Result<()> {
        let Some(slot) = self.days.get_mut(&(day.date, day.employee.clone())) else {
            bail!("unknown calendar day: {} {}", day.employee, day.date);
        };
        *slot = day.clone();
        Ok(())
    }

    fn vacation_on(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> anyhow::Result<Option<VacationRecord>> {
        Ok(self
            .vacations
            .iter()
            .find(|v| &v.employee == employee && v.date == date)
            .cloned())
    }

    fn insert_vacation(&mut self, record: VacationRecord) -> anyhow::Result<()> {
        if self.vacations.iter().any(|v| v.id == record.id) {
            bail!("vacation record already exists: {}", record.id);
        }
        self.vacations.push(record);
        Ok(())
    }
}
