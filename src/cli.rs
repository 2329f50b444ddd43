use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

use crate::api::current_year;
use crate::core::{HouseholdForm, LenientNumber};
use crate::error::Result;
use crate::report::ProjectionSummary;
use crate::report::export::{write_records_csv, write_report_csv};
use crate::report::workbook::report_xlsx;

#[derive(Parser, Debug)]
#[command(
    name = "retirement-planner",
    about = "Year-by-year retirement projection: savings, growth, drawdown and reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the projection API over HTTP
    Serve(ServeArgs),
    /// Run one projection and print it
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "PLANNER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, env = "PLANNER_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    RecordsCsv,
    Json,
    Xlsx,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub household: HouseholdArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[arg(long, help = "Write to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct HouseholdArgs {
    #[arg(long, default_value = "John")]
    pub first_name1: String,
    #[arg(long, default_value = "Smith")]
    pub last_name1: String,
    #[arg(long, default_value_t = 30)]
    pub current_age1: u32,
    #[arg(long, default_value = "Jane")]
    pub first_name2: String,
    #[arg(long, default_value = "Doe")]
    pub last_name2: String,
    #[arg(long, default_value_t = 28)]
    pub current_age2: u32,
    #[arg(long, help = "Project for person 1 only")]
    pub single: bool,
    #[arg(long, default_value_t = 65, help = "Age of person 1 at retirement")]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 75_000.0, help = "Current portfolio value")]
    pub current_savings: f64,
    #[arg(long, default_value_t = 25_000.0, help = "Annual contribution while working")]
    pub annual_savings: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        allow_negative_numbers = true,
        help = "Yearly growth of contributions in percent"
    )]
    pub annual_savings_increase: f64,
    #[arg(
        long,
        default_value_t = 6.75,
        allow_negative_numbers = true,
        help = "Expected annual return before retirement in percent"
    )]
    pub pre_retirement_return: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        allow_negative_numbers = true,
        help = "Expected annual return after retirement in percent"
    )]
    pub post_retirement_return: f64,
    #[arg(long, default_value_t = 60_000.0, help = "Current annual living costs")]
    pub current_expenses: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        allow_negative_numbers = true,
        help = "Expected annual inflation in percent"
    )]
    pub inflation_rate: f64,
    #[arg(long, default_value_t = 100, help = "Age of person 1 at the end of the projection")]
    pub life_expectancy: u32,
    #[arg(long, help = "First calendar year; defaults to the current year")]
    pub start_year: Option<i32>,
}

fn lenient(value: f64) -> Option<LenientNumber> {
    Some(LenientNumber::from(value))
}

impl From<HouseholdArgs> for HouseholdForm {
    fn from(args: HouseholdArgs) -> Self {
        let (first_name2, last_name2, current_age2) = if args.single {
            (None, None, None)
        } else {
            (
                Some(args.first_name2),
                Some(args.last_name2),
                lenient(args.current_age2.into()),
            )
        };

        HouseholdForm {
            first_name1: Some(args.first_name1),
            last_name1: Some(args.last_name1),
            current_age1: lenient(args.current_age1.into()),
            first_name2,
            last_name2,
            current_age2,
            retirement_age: lenient(args.retirement_age.into()),
            current_savings: lenient(args.current_savings),
            annual_savings: lenient(args.annual_savings),
            annual_savings_increase: lenient(args.annual_savings_increase),
            pre_retirement_return: lenient(args.pre_retirement_return),
            post_retirement_return: lenient(args.post_retirement_return),
            current_expenses: lenient(args.current_expenses),
            inflation_rate: lenient(args.inflation_rate),
            life_expectancy: lenient(args.life_expectancy.into()),
            start_year: args.start_year.and_then(|year| lenient(year.into())),
        }
    }
}

pub fn run_project(args: ProjectArgs) -> Result<()> {
    let params = HouseholdForm::from(args.household).into_params(current_year());
    let summary = ProjectionSummary::run(params);

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            render(&summary, args.format, &mut writer)?;
            writer.flush()?;
            info!(
                "Wrote {} projection years for {} to {}",
                summary.records.len(),
                summary.household_name,
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            render(&summary, args.format, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

pub fn render<W: Write>(
    summary: &ProjectionSummary,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Table => writer.write_all(summary.report().to_text_table().as_bytes())?,
        OutputFormat::Csv => write_report_csv(&summary.report(), writer)?,
        OutputFormat::RecordsCsv => {
            write_records_csv(&summary.records, writer)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, summary)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Xlsx => writer.write_all(&report_xlsx(&summary.report())?)?,
    }
    Ok(())
}
