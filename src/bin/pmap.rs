use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use proposal_maps::models::DEFAULT_VALUE_COLUMN;
use proposal_maps::{ChartKind, FilterSelection, FundingFilter, Region};
use proposal_maps::{pipeline, regions, storage, viz};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pmap",
    version,
    about = "Filter, count, chart & export proposal participation by country"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and count a dataset (and optionally export, write a chart spec, or plot).
    Show(ShowArgs),
    /// List the countries that make up a region.
    Regions(RegionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RegionArg {
    All,
    Emmena,
    Eu,
}

impl From<RegionArg> for Region {
    fn from(r: RegionArg) -> Self {
        match r {
            RegionArg::All => Region::All,
            RegionArg::Emmena => Region::Emmena,
            RegionArg::Eu => Region::Eu,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FundedArg {
    All,
    Funded,
    NotFunded,
}

impl From<FundedArg> for FundingFilter {
    fn from(f: FundedArg) -> Self {
        match f {
            FundedArg::All => FundingFilter::All,
            FundedArg::Funded => FundingFilter::FundedOnly,
            FundedArg::NotFunded => FundingFilter::NotFundedOnly,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartArg {
    Choropleth,
    Bubble,
    Bar,
    Lollipop,
    Faceted,
}

impl From<ChartArg> for ChartKind {
    fn from(c: ChartArg) -> Self {
        match c {
            ChartArg::Choropleth => ChartKind::Choropleth,
            ChartArg::Bubble => ChartKind::Bubble,
            ChartArg::Bar => ChartKind::Bar,
            ChartArg::Lollipop => ChartKind::Lollipop,
            ChartArg::Faceted => ChartKind::FacetedChoropleth,
        }
    }
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Dataset with `Country` and `Funded` columns (.csv or .json).
    #[arg(short, long)]
    input: PathBuf,
    /// Region to keep.
    #[arg(short, long, value_enum, default_value_t = RegionArg::All)]
    region: RegionArg,
    /// Funding status to keep.
    #[arg(short, long, value_enum, default_value_t = FundedArg::All)]
    funded: FundedArg,
    /// Chart type.
    #[arg(short, long, value_enum, default_value_t = ChartArg::Choropleth)]
    chart: ChartArg,
    /// Name of the count column.
    #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
    value_column: String,
    /// Save the per-country counts as CSV.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Save the chart spec as JSON.
    #[arg(long)]
    spec: Option<PathBuf>,
    /// Render the chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Locale for count labels (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct RegionsArgs {
    /// Only list this region.
    #[arg(short, long, value_enum)]
    region: Option<RegionArg>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Show(args) => cmd_show(args),
        Command::Regions(args) => cmd_regions(args),
    }
}

fn cmd_show(args: ShowArgs) -> Result<()> {
    let rows = storage::load_rows(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let selection = FilterSelection::new(args.region.into(), args.funded.into());
    let kind: ChartKind = args.chart.into();

    let out = pipeline::run(&rows, &selection, kind, &args.value_column)?;
    eprintln!(
        "{} of {} rows kept (region: {}, funded: {})",
        out.filtered_rows,
        rows.len(),
        selection.region,
        selection.funded
    );

    let bytes = storage::export_csv(&out.counts)?;
    std::io::stdout()
        .write_all(&bytes)
        .context("writing counts to stdout")?;

    if let Some(path) = args.out.as_ref() {
        storage::save_csv(&out.counts, path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Saved {} rows to {}", out.counts.len(), path.display());
    }

    if let Some(path) = args.spec.as_ref() {
        storage::save_spec_json(&out.spec, path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Wrote {} spec to {}", kind, path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        viz::render_chart(&out.spec, plot_path, args.width, args.height, &args.locale)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    Ok(())
}

fn cmd_regions(args: RegionsArgs) -> Result<()> {
    let wanted: Vec<Region> = match args.region {
        Some(r) => vec![r.into()],
        None => vec![Region::Emmena, Region::Eu],
    };
    for region in wanted {
        match regions::members(region) {
            Some(list) => println!("{} ({}): {}", region, list.len(), list.join(", ")),
            None => println!("{}: every country in the dataset", region),
        }
    }
    Ok(())
}
