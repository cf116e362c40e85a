#![forbid(unsafe_code)]
//! Congés : génération des calendriers annuels et attribution automatique
//! des congés par ancienneté.
//!
//! - Résolution du type de chaque jour par priorité (fériés, absences,
//!   congés existants, rotation de postes).
//! - Attribution par groupe, ancienneté d'abord, sous plafond d'absence.
//! - Stockage fichiers (JSON/CSV) ; le cœur ne dépend que de `CalendarStore`.

pub mod absence;
pub mod calendar;
pub mod error;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod tenure;

pub use absence::{resolve_manning, AbsenceGate, Headcount, DEFAULT_ABSENCE_CEILING};
pub use calendar::{
    generate_calendar, generate_program, rotation_index, CalendarDayResolver, DaySource,
    GenerationReport, Resolution, SkippedDay,
};
pub use error::IntegrityError;
pub use model::{
    AnnualProgram, Area, AreaId, CalendarDay, Dataset, DayType, Employee, EmployeeId, Group,
    GroupId, HolidayKind, HolidayRecord, LeaveKind, LeaveRecord, Organization, RotationAnchor,
    RotationEntry, RuleId, SeniorityTierRule, Shift, ShiftRotationRule, SourceRef, TierId,
    VacationId, VacationOrigin, VacationRecord,
};
pub use scheduler::{
    check_dataset, next_cursor_advance, schedule_program, GroupOutcome, GroupReport, RunReport,
    SchedError, ScheduleOptions, VacationScheduler, Violation, ViolationKind,
};
pub use storage::{CalendarBook, CalendarStore, JsonStorage, Storage};
