//! Villa Feasibility CLI
//!
//! Commands:
//! - `run` - project one parameter set and print the summary (or the JSON report)
//! - `sweep` - villa-count sensitivity
//! - `compare` - two parameter sets side by side
//! - `batch` - every scenario of a CSV sheet
//! - `schedule` - monthly loan schedule as CSV
//! - `fields` - the input form: keys, units, defaults, steps and bounds

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use villa_feasibility::financing::loan_schedules;
use villa_feasibility::params::{apply_overrides, field_descriptors, load_params, load_scenarios, NamedParameters};
use villa_feasibility::projection::DEFAULT_HORIZON_YEARS;
use villa_feasibility::report::{
    format_amount, render_comparison, render_summary, render_sweep, write_schedule_csv, write_yearly_csv,
    FeasibilityReport,
};
use villa_feasibility::scenario::DEFAULT_VILLA_SWEEP;
use villa_feasibility::{
    CostLevel, DiscountBasis, ParameterSet, ProjectionConfig, ProjectionEngine, ScenarioRunner, Verdict,
};

#[derive(Parser)]
#[command(
    name = "villa_feasibility",
    version,
    about = "Financial feasibility projections for resort-villa projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the parameters come from and how they are projected
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// JSON parameter file; missing keys keep their defaults.
    #[arg(long, env = "VILLA_PARAMS")]
    params: Option<PathBuf>,

    /// Override one field, e.g. --set villa_count=12. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Operating years to project.
    #[arg(long, env = "VILLA_HORIZON_YEARS", default_value_t = DEFAULT_HORIZON_YEARS)]
    horizon: u32,

    /// Discount rate for NPV: hurdle, cost_of_debt or hurdle_plus_debt_spread.
    #[arg(long, default_value = "hurdle")]
    discount_basis: DiscountBasis,

    /// Clamp invalid inputs to the nearest valid value instead of failing.
    #[arg(long, default_value_t = false)]
    clamp: bool,
}

impl InputArgs {
    fn load(&self) -> Result<ParameterSet> {
        let mut params = match &self.params {
            Some(path) => load_params(path)
                .with_context(|| format!("failed to load parameters from {}", path.display()))?,
            None => ParameterSet::default(),
        };
        apply_overrides(&mut params, &self.overrides).context("invalid --set override")?;
        Ok(self.prepare(params))
    }

    fn prepare(&self, params: ParameterSet) -> ParameterSet {
        if !self.clamp || params.is_valid() {
            return params;
        }
        let (clamped, issues) = params.clamped();
        for issue in &issues {
            eprintln!("warning: clamped {}: {}", issue.field, issue.message);
        }
        clamped
    }

    fn config(&self) -> ProjectionConfig {
        ProjectionConfig {
            horizon_years: self.horizon,
            discount_basis: self.discount_basis,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Project one parameter set.
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Print the full JSON report instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the yearly rows to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the max-cost loan schedule to this CSV file.
        #[arg(long)]
        schedule: Option<PathBuf>,
    },
    /// Recompute the metrics for a range of villa counts.
    Sweep {
        #[command(flatten)]
        input: InputArgs,

        /// Smallest villa count.
        #[arg(long, default_value_t = *DEFAULT_VILLA_SWEEP.start())]
        from: u32,

        /// Largest villa count.
        #[arg(long, default_value_t = *DEFAULT_VILLA_SWEEP.end())]
        to: u32,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare the base parameters with an alternative.
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// JSON file for the alternative; defaults to the base parameters.
        #[arg(long)]
        alternative: Option<PathBuf>,

        /// Override one field of the alternative. Repeatable.
        #[arg(long = "alt-set", value_name = "KEY=VALUE")]
        alt_overrides: Vec<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Project every row of a scenario sheet (CSV, one column per field).
    Batch {
        #[command(flatten)]
        input: InputArgs,

        /// Scenario sheet; each row overrides the base parameters.
        #[arg(long)]
        scenarios: PathBuf,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the monthly loan schedule as CSV.
    Schedule {
        #[command(flatten)]
        input: InputArgs,

        /// Use the max-cost loan instead of the min-cost one.
        #[arg(long, default_value_t = false)]
        max_cost: bool,

        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Describe every input field.
    Fields {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            json,
            csv,
            schedule,
        } => run_projection(&input, json, csv.as_deref(), schedule.as_deref()),
        Commands::Sweep { input, from, to, json } => run_sweep(&input, from, to, json),
        Commands::Compare {
            input,
            alternative,
            alt_overrides,
            json,
        } => run_compare(&input, alternative.as_deref(), &alt_overrides, json),
        Commands::Batch { input, scenarios, json } => run_batch(&input, &scenarios, json),
        Commands::Schedule {
            input,
            max_cost,
            output,
        } => run_schedule(&input, max_cost, output.as_deref()),
        Commands::Fields { json } => run_fields(json),
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn run_projection(input: &InputArgs, json: bool, csv: Option<&Path>, schedule: Option<&Path>) -> Result<()> {
    let params = input.load()?;
    let config = input.config();
    let result = ProjectionEngine::new(config.clone())
        .project(&params)
        .context("projection failed")?;

    if json {
        println!("{}", FeasibilityReport::new(&params, &config, &result).to_json()?);
    } else {
        print!("{}", render_summary(&result));
        println!("Verdict:            {}", Verdict::evaluate(&result));
    }

    if let Some(path) = csv {
        write_yearly_csv(&result, create_file(path)?)?;
        eprintln!("Yearly projection written to {}", path.display());
    }

    if let Some(path) = schedule {
        let schedules = loan_schedules(&params);
        write_schedule_csv(schedules.at(CostLevel::Max), create_file(path)?)?;
        eprintln!("Loan schedule written to {}", path.display());
    }

    Ok(())
}

fn run_sweep(input: &InputArgs, from: u32, to: u32, json: bool) -> Result<()> {
    if from == 0 || from > to {
        bail!("invalid villa range {}..={}", from, to);
    }
    let params = input.load()?;
    let runner = ScenarioRunner::new(input.config());
    let points = runner.villa_sweep(&params, from..=to).context("sweep failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        print!("{}", render_sweep(&points));
    }
    Ok(())
}

fn run_compare(input: &InputArgs, alternative: Option<&Path>, alt_overrides: &[String], json: bool) -> Result<()> {
    let base = input.load()?;

    let mut alt = match alternative {
        Some(path) => load_params(path)
            .with_context(|| format!("failed to load alternative from {}", path.display()))?,
        None => base.clone(),
    };
    apply_overrides(&mut alt, alt_overrides).context("invalid --alt-set override")?;
    let alt = input.prepare(alt);

    let baseline = NamedParameters {
        name: "baseline".to_string(),
        params: base,
    };
    let alternative = NamedParameters {
        name: "alternative".to_string(),
        params: alt,
    };

    let comparison = ScenarioRunner::new(input.config())
        .compare(&baseline, &alternative)
        .context("comparison failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", render_comparison(&comparison));
    }
    Ok(())
}

fn run_batch(input: &InputArgs, scenarios: &Path, json: bool) -> Result<()> {
    let base = input.load()?;
    let sheet = load_scenarios(scenarios, &base)
        .with_context(|| format!("failed to load scenarios from {}", scenarios.display()))?;
    if sheet.is_empty() {
        bail!("{} contains no scenarios", scenarios.display());
    }

    let sheet: Vec<NamedParameters> = sheet
        .into_iter()
        .map(|s| NamedParameters {
            params: input.prepare(s.params),
            name: s.name,
        })
        .collect();

    let outcomes = ScenarioRunner::new(input.config())
        .run_named(&sheet)
        .context("batch failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    println!("{:<20} {:>27} {:>27} {:>13}", "scenario", "initial cost", "NPV", "verdict");
    for outcome in &outcomes {
        let s = &outcome.result.summary;
        println!(
            "{:<20} {:>27} {:>27} {:>13}",
            outcome.name,
            format!("{} - {}", format_amount(s.total_initial_cost.min), format_amount(s.total_initial_cost.max)),
            format!("{} - {}", format_amount(s.npv.min), format_amount(s.npv.max)),
            outcome.verdict
        );
    }
    Ok(())
}

fn run_schedule(input: &InputArgs, max_cost: bool, output: Option<&Path>) -> Result<()> {
    let params = input.load()?;
    params.validate().context("invalid parameters")?;

    let level = if max_cost { CostLevel::Max } else { CostLevel::Min };
    let schedules = loan_schedules(&params);
    let schedule = schedules.at(level);
    if schedule.is_empty() {
        eprintln!("No loan: equity covers the {}-cost initial outlay", level.as_str());
        return Ok(());
    }

    match output {
        Some(path) => write_schedule_csv(schedule, create_file(path)?)?,
        None => write_schedule_csv(schedule, io::stdout().lock())?,
    }
    Ok(())
}

fn run_fields(json: bool) -> Result<()> {
    let descriptors = field_descriptors();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{:<40} {:<48} {:>6} {:>12} {:>5} {:>10} {:>10}",
        "key", "label", "unit", "default", "step", "min", "max"
    )?;
    for d in &descriptors {
        let max = d.upper_bound.map(|b| b.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{:<40} {:<48} {:>6} {:>12} {:>5} {:>10} {:>10}",
            d.key, d.label, d.unit, d.default_value, d.step, d.lower_bound, max
        )?;
    }
    Ok(())
}
