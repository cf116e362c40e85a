#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use conges::{
    calendar, io,
    model::{AnnualProgram, Dataset, GroupId},
    scheduler::{self, GroupOutcome, ScheduleOptions, VacationScheduler},
    storage::{JsonStorage, Storage},
    tenure, AbsenceGate, IntegrityError,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des congés annuels
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du jeu de données
    #[arg(long, global = true, default_value = "conges.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer un jeu de données vide pour un programme annuel
    Init {
        #[arg(long)]
        year: i32,
        /// YYYY-MM-DD (défaut : 1er janvier)
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD (défaut : 31 décembre)
        #[arg(long)]
        end: Option<String>,
        /// Écrase un fichier existant
        #[arg(long)]
        force: bool,
    },

    /// Charger zones, groupes, paliers et rotations depuis un JSON
    ImportRules {
        #[arg(long)]
        json: String,
    },

    /// Importer des employés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Importer des jours fériés depuis un CSV
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences depuis un CSV
    ImportLeaves {
        #[arg(long)]
        csv: String,
    },

    /// Recalculer l'ancienneté et les paliers
    Tenure {
        /// Date de référence YYYY-MM-DD (défaut : début du programme)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Générer les jours de calendrier
    Generate {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Attribuer automatiquement les congés
    Assign {
        /// Limiter à un groupe
        #[arg(long)]
        group: Option<String>,
        #[arg(long, default_value_t = conges::DEFAULT_ABSENCE_CEILING)]
        ceiling: f64,
        #[arg(long, default_value_t = 7)]
        lead_days: i64,
        #[arg(long, default_value_t = 21)]
        tail_days: i64,
        /// Borne du parcours cyclique (défaut : employés + 1)
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Taux de présence et d'absence d'un groupe à une date
    Absence {
        #[arg(long)]
        group: String,
        #[arg(long)]
        date: String,
        /// Effectif imposé
        #[arg(long)]
        manning: Option<u32>,
    },

    /// Lister et optionnellement exporter
    List {
        /// Matricule de l'employé
        #[arg(long)]
        payroll: Option<u32>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_vacations: Option<String>,
    },

    /// Vérifier la cohérence du jeu de données
    Check {
        /// Export CSV des anomalies (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;

    if let Commands::Init {
        year,
        start,
        end,
        force,
    } = &cli.cmd
    {
        if storage.exists() && !force {
            bail!("{} already exists (use --force)", cli.data);
        }
        let default = AnnualProgram::calendar_year(*year).context("invalid year")?;
        let start = start.as_deref().map(parse_date).transpose()?;
        let end = end.as_deref().map(parse_date).transpose()?;
        let program = AnnualProgram::new(
            *year,
            start.unwrap_or(default.start),
            end.unwrap_or(default.end),
        )
        .map_err(anyhow::Error::msg)?;
        storage.save(&Dataset::new(program))?;
        println!("Dataset created for {year}");
        std::process::exit(0);
    }

    let mut dataset = storage
        .load()
        .with_context(|| format!("no dataset at {} (run `init` first)", cli.data))?;

    let code = match cli.cmd {
        Commands::Init { .. } => 0,
        Commands::ImportRules { json } => {
            let rules = io::load_rules_json(json)?;
            dataset.organization = rules.organization;
            dataset.tiers = rules.tiers;
            dataset.rotations = rules.rotations;
            storage.save(&dataset)?;
            0
        }
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(csv)?;
            for e in employees {
                if dataset.find_employee_by_payroll(e.payroll).is_some() {
                    bail!("payroll {} already imported", e.payroll);
                }
                dataset.employees.push(e);
            }
            storage.save(&dataset)?;
            0
        }
        Commands::ImportHolidays { csv } => {
            let holidays = io::import_holidays_csv(csv)?;
            dataset.holidays.extend(holidays);
            storage.save(&dataset)?;
            0
        }
        Commands::ImportLeaves { csv } => {
            let leaves = io::import_leaves_csv(csv)?;
            for leave in &leaves {
                if dataset.find_employee_by_id(&leave.employee).is_none() {
                    return Err(IntegrityError::UnknownEmployee(leave.employee.to_string()).into());
                }
            }
            dataset.leaves.extend(leaves);
            storage.save(&dataset)?;
            0
        }
        Commands::Tenure { as_of } => {
            let as_of = match as_of {
                Some(raw) => parse_date(&raw)?,
                None => dataset.program.start,
            };
            tenure::recompute(&mut dataset.employees, &dataset.tiers, as_of);
            let without_tier = dataset.employees.iter().filter(|e| e.tier.is_none()).count();
            println!(
                "Tenure recomputed for {} employee(s), {} without tier",
                dataset.employees.len(),
                without_tier
            );
            storage.save(&dataset)?;
            0
        }
        Commands::Generate { from, to } => {
            let report = match (from, to) {
                (None, None) => calendar::generate_program(&mut dataset)?,
                (from, to) => {
                    let from = from.as_deref().map(parse_date).transpose()?;
                    let to = to.as_deref().map(parse_date).transpose()?;
                    let from = from.unwrap_or(dataset.program.start);
                    let to = to.unwrap_or(dataset.program.end);
                    let existing = dataset.calendar.vacations().to_vec();
                    let resolver = calendar::CalendarDayResolver::new(
                        &dataset.holidays,
                        &dataset.leaves,
                        &existing,
                        &dataset.rotations,
                    );
                    calendar::generate_calendar(
                        &resolver,
                        &dataset.organization,
                        &dataset.employees,
                        from,
                        to,
                        &mut dataset.calendar,
                    )?
                }
            };
            println!(
                "{} day(s) created, {} already present, {} skipped",
                report.created,
                report.existing,
                report.skipped.len()
            );
            for skipped in &report.skipped {
                let when = skipped.date.map(|d| d.to_string()).unwrap_or_default();
                eprintln!("skipped {} {} : {}", skipped.employee, when, skipped.error);
            }
            storage.save(&dataset)?;
            if report.skipped.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Assign {
            group,
            ceiling,
            lead_days,
            tail_days,
            max_iterations,
        } => {
            let opts = ScheduleOptions {
                absence_ceiling: ceiling,
                window_lead_days: lead_days,
                window_tail_days: tail_days,
                max_outer_iterations: max_iterations,
            };
            let report = match group {
                Some(g) => {
                    let Dataset {
                        program,
                        organization,
                        tiers,
                        employees,
                        calendar,
                        ..
                    } = &mut dataset;
                    let sched = VacationScheduler::new(organization, tiers, program, opts);
                    let group_report = sched.run_group(&GroupId::new(g), employees, calendar)?;
                    scheduler::RunReport {
                        groups: vec![group_report],
                        unknown_group: Vec::new(),
                    }
                }
                None => scheduler::schedule_program(&mut dataset, opts)?,
            };
            for g in &report.groups {
                println!("{}", g.summary());
                for f in &g.failures {
                    eprintln!("  failed {} {} : {}", f.employee, f.date, f.reason);
                }
                for (employee, err) in &g.integrity_errors {
                    eprintln!("  error {employee} : {err}");
                }
                if let GroupOutcome::Aborted { remaining } = g.outcome {
                    eprintln!("  {remaining} employee(s) left unprocessed");
                }
            }
            storage.save(&dataset)?;
            if report.has_warnings() {
                // Code 2 = WARNING/INCOMPLETE
                2
            } else {
                0
            }
        }
        Commands::Absence {
            group,
            date,
            manning,
        } => {
            let date = parse_date(&date)?;
            let group = GroupId::new(group);
            let gate = AbsenceGate::new(&dataset.organization, conges::DEFAULT_ABSENCE_CEILING);
            let available = gate.available_percent(&dataset.calendar, &group, date, manning)?;
            let absence = gate.absence_percent(&dataset.calendar, &group, date, manning)?;
            let within = absence <= gate.ceiling();
            println!(
                "{group} {date} | available {available:.2}% | absence {absence:.2}% | {}",
                if within { "within ceiling" } else { "over ceiling" }
            );
            0
        }
        Commands::List {
            payroll,
            out_json,
            out_csv,
            out_vacations,
        } => {
            let employee = match payroll {
                Some(p) => Some(
                    dataset
                        .find_employee_by_payroll(p)
                        .map(|e| e.id.clone())
                        .ok_or_else(|| anyhow::anyhow!("unknown payroll: {p}"))?,
                ),
                None => None,
            };
            let days: Vec<_> = dataset
                .calendar
                .days()
                .filter(|d| employee.as_ref().map_or(true, |id| &d.employee == id))
                .collect();
            if let Some(path) = out_json {
                io::export_dataset_json(path, &dataset)?;
            }
            if let Some(path) = out_csv {
                io::export_calendar_csv(path, days.iter().copied())?;
            }
            if let Some(path) = out_vacations {
                io::export_vacations_csv(path, dataset.calendar.vacations())?;
            }
            // impression compacte
            for d in &days {
                println!(
                    "{} | {} | {} | {} | {}",
                    d.employee,
                    d.date,
                    d.day_type.as_str(),
                    d.shift.as_str(),
                    d.source.describe()
                );
            }
            0
        }
        Commands::Check { report } => {
            let violations = scheduler::check_dataset(&dataset);
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["employee", "date", "kind"])?;
                    for v in &violations {
                        let date = v.date.map(|d| d.to_string()).unwrap_or_default();
                        w.write_record([v.employee.as_str(), date.as_str(), v.kind.as_str()])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
    };

    std::process::exit(code);
}
