use crate::storage::CalendarBook;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Employee
    EmployeeId
);
string_id!(
    /// Identifiant fort pour Group
    GroupId
);
string_id!(
    /// Identifiant fort pour Area
    AreaId
);
string_id!(
    /// Identifiant d'une règle de rotation
    RuleId
);
string_id!(TierId);
string_id!(HolidayId);
string_id!(LeaveId);
string_id!(
    /// Identifiant d'un enregistrement de congé
    VacationId
);

impl VacationId {
    /// Identifiant déterministe d'un congé attribué automatiquement.
    pub fn automatic(employee: &EmployeeId, date: NaiveDate) -> Self {
        Self(format!("auto-{}-{}", employee.as_str(), date.format("%Y%m%d")))
    }
}

/// Point d'ancrage de la rotation d'un employé : (date, index) connus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationAnchor {
    pub rule: RuleId,
    pub pattern: String,
    pub date: NaiveDate,
    pub index: u32,
}

/// Employé planifié
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub payroll: u32,
    pub group: GroupId,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// Ancienneté en jours, recalculée avant planification.
    #[serde(default)]
    pub tenure_days: Option<i64>,
    /// Années complètes d'ancienneté.
    #[serde(default)]
    pub tenure_years: Option<u32>,
    #[serde(default)]
    pub tier: Option<TierId>,
    /// Jours de congés déjà attribués automatiquement.
    #[serde(default)]
    pub auto_assigned: u32,
    #[serde(default)]
    pub rotation: Option<RotationAnchor>,
}

impl Employee {
    pub fn new<G: Into<GroupId>>(payroll: u32, group: G) -> Self {
        Self {
            id: EmployeeId::random(),
            payroll,
            group: group.into(),
            hire_date: None,
            tenure_days: None,
            tenure_years: None,
            tier: None,
            auto_assigned: 0,
            rotation: None,
        }
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        GroupId::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Effectif par défaut des groupes de la zone.
    pub manning: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub area: AreaId,
}

/// Effectif imposé pour un groupe un jour précis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayManning {
    pub group: GroupId,
    pub date: NaiveDate,
    pub manning: u32,
}

/// Effectif imposé pour un groupe sur un mois.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthManning {
    pub group: GroupId,
    pub year: i32,
    pub month: u32,
    pub manning: u32,
}

/// Zones, groupes et données d'effectif.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub day_manning: Vec<DayManning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub month_manning: Vec<MonthManning>,
}

impl Organization {
    pub fn find_group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }
    pub fn find_area(&self, id: &AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| &a.id == id)
    }
}

/// Palier d'ancienneté : plage d'années complètes → jours de congés.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorityTierRule {
    pub id: TierId,
    pub from_years: u32,
    /// Borne haute incluse ; `None` = palier ouvert.
    #[serde(default)]
    pub to_years: Option<u32>,
    /// Jours à placer automatiquement.
    pub auto_assign_days: u32,
    pub total_days: u32,
    /// Jours déjà accordés par un autre processus.
    #[serde(default)]
    pub granted_days: u32,
}

impl SeniorityTierRule {
    pub fn matches(&self, years: u32) -> bool {
        years >= self.from_years && self.to_years.map_or(true, |to| years <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
    Rest,
}

impl Shift {
    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Night => "night",
            Shift::Rest => "rest",
        }
    }
}

/// Entrée du cycle : (index, jour de semaine) → poste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEntry {
    pub index: u32,
    pub weekday: Weekday,
    pub shift: Shift,
}

/// Cycle de rotation ordonné, de longueur fixe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRotationRule {
    pub rule: RuleId,
    pub pattern: String,
    pub entries: Vec<RotationEntry>,
}

impl ShiftRotationRule {
    pub fn cycle_len(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    pub fn entry(&self, index: u32, weekday: Weekday) -> Option<&RotationEntry> {
        self.entries
            .iter()
            .find(|e| e.index == index && e.weekday == weekday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolidayKind {
    Legal,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub id: HolidayId,
    pub date: NaiveDate,
    pub kind: HolidayKind,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveKind {
    Leave,
    Incapacity,
}

/// Absence (congé spécial, arrêt maladie) sur un intervalle [start, end] inclus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub id: LeaveId,
    pub employee: EmployeeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: LeaveKind,
}

impl LeaveRecord {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacationOrigin {
    Automatic,
    Requested,
    Imported,
}

/// Jour de congé. Jamais modifié après création.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRecord {
    pub id: VacationId,
    pub employee: EmployeeId,
    pub date: NaiveDate,
    /// Poste qui aurait été travaillé ce jour-là.
    pub shift: Shift,
    pub group: GroupId,
    pub area: AreaId,
    pub origin: VacationOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    Working,
    LegalHoliday,
    CompanyHoliday,
    Leave,
    Vacation,
    WeeklyRest,
}

impl DayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Working => "working",
            DayType::LegalHoliday => "legal_holiday",
            DayType::CompanyHoliday => "company_holiday",
            DayType::Leave => "leave",
            DayType::Vacation => "vacation",
            DayType::WeeklyRest => "weekly_rest",
        }
    }

    /// Indicateurs dérivés du type ; jamais positionnés indépendamment.
    pub fn flags(self) -> DayFlags {
        DayFlags {
            festive: matches!(self, DayType::LegalHoliday | DayType::CompanyHoliday),
            rest: matches!(self, DayType::WeeklyRest),
            working: matches!(self, DayType::Working),
            holiday: matches!(self, DayType::LegalHoliday | DayType::CompanyHoliday),
            vacation: matches!(self, DayType::Vacation),
            leave: matches!(self, DayType::Leave),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayFlags {
    pub festive: bool,
    pub rest: bool,
    pub working: bool,
    pub holiday: bool,
    pub vacation: bool,
    pub leave: bool,
}

/// Enregistrement source d'un jour de calendrier (au plus un).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceRef {
    #[default]
    None,
    Holiday(HolidayId),
    Leave(LeaveId),
    Vacation(VacationId),
    Rotation(RuleId),
}

impl SourceRef {
    pub fn describe(&self) -> String {
        match self {
            SourceRef::None => String::new(),
            SourceRef::Holiday(id) => format!("holiday:{id}"),
            SourceRef::Leave(id) => format!("leave:{id}"),
            SourceRef::Vacation(id) => format!("vacation:{id}"),
            SourceRef::Rotation(id) => format!("rotation:{id}"),
        }
    }
}

/// Une ligne par (employé, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub group: GroupId,
    pub area: AreaId,
    pub day_type: DayType,
    pub shift: Shift,
    #[serde(default)]
    pub source: SourceRef,
}

impl CalendarDay {
    pub fn flags(&self) -> DayFlags {
        self.day_type.flags()
    }

    pub fn is_working(&self) -> bool {
        self.day_type == DayType::Working
    }

    /// Vérifie la cohérence type ↔ référence source.
    pub fn is_consistent(&self) -> bool {
        match (&self.day_type, &self.source) {
            (DayType::LegalHoliday | DayType::CompanyHoliday, SourceRef::Holiday(_)) => true,
            (DayType::Leave, SourceRef::Leave(_)) => true,
            (DayType::Vacation, SourceRef::Vacation(_)) => true,
            (DayType::Working | DayType::WeeklyRest, SourceRef::Rotation(_) | SourceRef::None) => {
                true
            }
            _ => false,
        }
    }

    /// Bascule un jour travaillé en congé, en une seule modification.
    /// Retourne le poste qui aurait été travaillé.
    pub fn convert_to_vacation(&mut self, vacation: VacationId) -> Shift {
        let planned = self.shift;
        self.day_type = DayType::Vacation;
        self.shift = Shift::Rest;
        self.source = SourceRef::Vacation(vacation);
        planned
    }
}

/// Programme annuel actif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualProgram {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnnualProgram {
    pub fn new(year: i32, start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("program end must not precede start".to_string());
        }
        Ok(Self { year, start, end })
    }

    /// Programme couvrant l'année civile.
    pub fn calendar_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self { year, start, end })
    }

    /// Fenêtre d'attribution `[start + lead, end - tail]`, `None` si vide.
    pub fn window(&self, lead_days: i64, tail_days: i64) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.start.checked_add_signed(Duration::days(lead_days))?;
        let last = self.end.checked_sub_signed(Duration::days(tail_days))?;
        (first <= last).then_some((first, last))
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Jeu de données complet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub program: AnnualProgram,
    #[serde(default)]
    pub organization: Organization,
    #[serde(default)]
    pub tiers: Vec<SeniorityTierRule>,
    #[serde(default)]
    pub rotations: Vec<ShiftRotationRule>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub holidays: Vec<HolidayRecord>,
    #[serde(default)]
    pub leaves: Vec<LeaveRecord>,
    #[serde(default)]
    pub calendar: CalendarBook,
}

impl Dataset {
    pub fn new(program: AnnualProgram) -> Self {
        Self {
            program,
            organization: Organization::default(),
            tiers: Vec::new(),
            rotations: Vec::new(),
            employees: Vec::new(),
            holidays: Vec::new(),
            leaves: Vec::new(),
            calendar: CalendarBook::default(),
        }
    }

    pub fn find_employee_by_payroll(&self, payroll: u32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.payroll == payroll)
    }
    pub fn find_employee_by_id(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }
}
