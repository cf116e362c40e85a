use crate::model::{
    CalendarDay, Dataset, Employee, EmployeeId, GroupId, HolidayId, HolidayKind, HolidayRecord,
    LeaveId, LeaveKind, LeaveRecord, Organization, RotationAnchor, RuleId, SeniorityTierRule,
    ShiftRotationRule, VacationOrigin, VacationRecord,
};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Import d'employés depuis CSV :
/// header `id,payroll,group,hire_date[,rule,pattern,anchor_date,anchor_index]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let payroll_raw = field(&rec, 1, "payroll")?;
        let payroll: u32 = payroll_raw
            .parse()
            .with_context(|| format!("invalid payroll number: {payroll_raw}"))?;
        let group = field(&rec, 2, "group")?;
        if group.is_empty() {
            bail!("empty group for payroll {payroll}");
        }
        let mut employee = Employee::new(payroll, GroupId::new(group));
        if let Some(id) = optional(&rec, 0) {
            employee.id = EmployeeId::new(id);
        }
        employee.hire_date = optional(&rec, 3)
            .map(parse_date)
            .transpose()
            .with_context(|| format!("invalid hire_date for payroll {payroll}"))?;
        if let Some(rule) = optional(&rec, 4) {
            let pattern = optional(&rec, 5).unwrap_or_default().to_string();
            let date = optional(&rec, 6)
                .context("anchor_date required with a rotation rule")
                .and_then(parse_date)
                .with_context(|| format!("invalid rotation anchor for payroll {payroll}"))?;
            let index = match optional(&rec, 7) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid anchor_index: {raw}"))?,
                None => 0,
            };
            employee.rotation = Some(RotationAnchor {
                rule: RuleId::new(rule),
                pattern,
                date,
                index,
            });
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import de jours fériés : header `id,date,kind,name` (`legal` | `company`)
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<HolidayRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = parse_date(field(&rec, 1, "date")?)?;
        let kind = match field(&rec, 2, "kind")?.to_ascii_lowercase().as_str() {
            "legal" | "legale" | "légal" => HolidayKind::Legal,
            "company" | "entreprise" => HolidayKind::Company,
            other => bail!("unknown holiday kind: {other}"),
        };
        out.push(HolidayRecord {
            id: optional(&rec, 0).map_or_else(HolidayId::random, HolidayId::new),
            date,
            kind,
            name: optional(&rec, 3).unwrap_or_default().to_string(),
        });
    }
    Ok(out)
}

/// Import d'absences : header `id,employee,start,end[,kind]` (`leave` | `incapacity`)
pub fn import_leaves_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LeaveRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee = EmployeeId::new(field(&rec, 1, "employee")?);
        let start = parse_date(field(&rec, 2, "start")?)?;
        let end = parse_date(field(&rec, 3, "end")?)?;
        if end < start {
            bail!("leave for {employee} ends before it starts");
        }
        let kind = match optional(&rec, 4).map(str::to_ascii_lowercase).as_deref() {
            None | Some("leave") => LeaveKind::Leave,
            Some("incapacity") | Some("arret") => LeaveKind::Incapacity,
            Some(other) => bail!("unknown leave kind: {other}"),
        };
        out.push(LeaveRecord {
            id: optional(&rec, 0).map_or_else(LeaveId::random, LeaveId::new),
            employee,
            start,
            end,
            kind,
        });
    }
    Ok(out)
}

fn field<'r>(rec: &'r StringRecord, idx: usize, name: &str) -> anyhow::Result<&'r str> {
    Ok(rec
        .get(idx)
        .with_context(|| format!("missing {name}"))?
        .trim())
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Règles statiques : zones, groupes, effectifs, paliers, rotations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub organization: Organization,
    #[serde(default)]
    pub tiers: Vec<SeniorityTierRule>,
    #[serde(default)]
    pub rotations: Vec<ShiftRotationRule>,
}

pub fn load_rules_json<P: AsRef<Path>>(path: P) -> anyhow::Result<RulesFile> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let rules: RulesFile =
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;
    for rotation in &rules.rotations {
        if rotation.entries.is_empty() {
            bail!("rotation {} ({}) has no entries", rotation.rule, rotation.pattern);
        }
        for (i, a) in rotation.entries.iter().enumerate() {
            if rotation
                .entries
                .iter()
                .skip(i + 1)
                .any(|b| a.index == b.index && a.weekday == b.weekday)
            {
                bail!(
                    "rotation {} ({}) defines index {} on {} twice",
                    rotation.rule,
                    rotation.pattern,
                    a.index,
                    a.weekday
                );
            }
        }
    }
    Ok(rules)
}

/// Export JSON du jeu de données (jolie mise en forme)
pub fn export_dataset_json<P: AsRef<Path>>(path: P, dataset: &Dataset) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(dataset)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du calendrier : header `employee,date,group,day_type,shift,source`
pub fn export_calendar_csv<'a, P, I>(path: P, days: I) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a CalendarDay>,
{
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["employee", "date", "group", "day_type", "shift", "source"])?;
    for d in days {
        let date = d.date.to_string();
        let source = d.source.describe();
        w.write_record([
            d.employee.as_str(),
            date.as_str(),
            d.group.as_str(),
            d.day_type.as_str(),
            d.shift.as_str(),
            source.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des congés : header `id,employee,date,shift,group,area,origin`
pub fn export_vacations_csv<P: AsRef<Path>>(
    path: P,
    vacations: &[VacationRecord],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "employee", "date", "shift", "group", "area", "origin"])?;
    for v in vacations {
        let date = v.date.to_string();
        let origin = match v.origin {
            VacationOrigin::Automatic => "automatic",
            VacationOrigin::Requested => "requested",
            VacationOrigin::Imported => "imported",
        };
        w.write_record([
            v.id.as_str(),
            v.employee.as_str(),
            date.as_str(),
            v.shift.as_str(),
            v.group.as_str(),
            v.area.as_str(),
            origin,
        ])?;
    }
    w.flush()?;
    Ok(())
}
