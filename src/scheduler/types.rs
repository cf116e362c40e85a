use crate::absence::DEFAULT_ABSENCE_CEILING;
use crate::error::IntegrityError;
use crate::model::{EmployeeId, GroupId};
use chrono::NaiveDate;
use thiserror::Error;

/// Options d'attribution
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    /// Taux d'absence maximal (%) par groupe et par jour.
    pub absence_ceiling: f64,
    pub window_lead_days: i64,
    pub window_tail_days: i64,
    /// Borne du parcours cyclique ; `None` = nombre d'employés + 1.
    pub max_outer_iterations: Option<usize>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            absence_ceiling: DEFAULT_ABSENCE_CEILING,
            window_lead_days: 7,
            window_tail_days: 21,
            max_outer_iterations: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: {to} precedes {from}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Écriture d'une date échouée ; la marche continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub reason: String,
}

/// Résultat de la marche d'un employé sur la fenêtre.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Jours ouvrés visités, attribués ou non.
    pub scanned: usize,
    /// Jours calendaires parcourus, week-ends compris, jusqu'au jour d'arrêt inclus.
    pub span: usize,
    pub assigned: u32,
    pub missing: usize,
    pub not_working: usize,
    pub over_ceiling: usize,
    pub failures: Vec<ConversionFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    Completed,
    /// Fenêtre d'attribution vide : rien n'est attribué.
    NoWindow,
    /// Borne d'itérations atteinte ; `remaining` employés non traités.
    Aborted { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group: GroupId,
    pub eligible: usize,
    pub processed: usize,
    /// Employés ayant atteint leur quota.
    pub fulfilled: usize,
    pub assigned_days: u32,
    pub iterations: usize,
    pub wraps: usize,
    pub outcome: GroupOutcome,
    pub failures: Vec<ConversionFailure>,
    pub integrity_errors: Vec<(EmployeeId, IntegrityError)>,
}

impl GroupReport {
    pub(super) fn new(group: GroupId, eligible: usize) -> Self {
        Self {
            group,
            eligible,
            processed: 0,
            fulfilled: 0,
            assigned_days: 0,
            iterations: 0,
            wraps: 0,
            outcome: GroupOutcome::Completed,
            failures: Vec::new(),
            integrity_errors: Vec::new(),
        }
    }

    pub fn summary(&self) -> String {
        let outcome = match self.outcome {
            GroupOutcome::Completed => "completed".to_string(),
            GroupOutcome::NoWindow => "no allocation window".to_string(),
            GroupOutcome::Aborted { remaining } => format!("aborted, {remaining} remaining"),
        };
        format!(
            "group {}: {}/{} employees fulfilled, {} day(s) assigned, {}",
            self.group, self.fulfilled, self.eligible, self.assigned_days, outcome
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub groups: Vec<GroupReport>,
    /// Employés rattachés à un groupe inconnu, jamais planifiés.
    pub unknown_group: Vec<EmployeeId>,
}

impl RunReport {
    pub fn assigned_days(&self) -> u32 {
        self.groups.iter().map(|g| g.assigned_days).sum()
    }

    pub fn aborted(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| matches!(g.outcome, GroupOutcome::Aborted { .. }))
            .count()
    }

    /// Vrai si un groupe a avorté ou si une anomalie a été remontée.
    pub fn has_warnings(&self) -> bool {
        self.aborted() > 0
            || !self.unknown_group.is_empty()
            || self
                .groups
                .iter()
                .any(|g| !g.failures.is_empty() || !g.integrity_errors.is_empty())
    }
}
