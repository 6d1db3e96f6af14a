use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};

use nikrome::config::AppConfig;
use nikrome::map::{self, CourseSvgRenderer};
use nikrome::results::{DatasetSource, RunnerDataset, load_dataset};
use nikrome::route::{OsrmClient, RouteKind, draw_route_along_roads};
use nikrome::scrape::{self, ScrapeOutcome};
use nikrome::{NikromeError, runtime, ui};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the course map window
    Map {
        /// Results file path or http(s) URL
        #[arg(short, long)]
        data: Option<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Extract the results table of a saved HTML page into JSON
    Scrape {
        #[arg(short, long, default_value = scrape::DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(short, long, default_value = scrape::DEFAULT_TABLE_ID)]
        table_id: String,

        #[arg(short, long, default_value = scrape::DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Print the men and women results at one checkpoint
    Checkpoint {
        #[arg(short, long)]
        data: Option<String>,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print how many runners passed each course checkpoint
    Checkpoints {
        #[arg(short, long)]
        data: Option<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Resolve the course route, optionally exporting the map as SVG
    Route {
        #[arg(short, long)]
        svg: Option<PathBuf>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration file
    Config {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_results(config: &AppConfig, data: Option<&str>) -> Result<RunnerDataset, NikromeError> {
    let source = DatasetSource::parse(data.unwrap_or(&config.dataset));
    runtime::try_block_on(load_dataset(&source))
}

fn map(data: Option<&str>, config_path: Option<&Path>) -> Result<(), NikromeError> {
    let config = AppConfig::load(config_path)?;
    let source = DatasetSource::parse(data.unwrap_or(&config.dataset));
    ui::run(config, source)
}

fn scrape(input: &Path, table_id: &str, output: &Path) -> Result<(), NikromeError> {
    match scrape::scrape_file(input, table_id, output)? {
        ScrapeOutcome::Exported { rows } => info!("Exported {} rows", rows),
        ScrapeOutcome::TableNotFound => warn!("No table with id {} in {}", table_id, input.display()),
    }
    Ok(())
}

fn checkpoint(
    data: Option<&str>,
    name: &str,
    config_path: Option<&Path>,
) -> Result<(), NikromeError> {
    let config = AppConfig::load(config_path)?;
    let dataset = load_results(&config, data)?;

    match config.filter.apply(&dataset, name)? {
        Some(view) => print!("{}", view),
        None => println!("Checkpoint {} not found in results", name),
    }
    Ok(())
}

fn checkpoints(data: Option<&str>, config_path: Option<&Path>) -> Result<(), NikromeError> {
    let config = AppConfig::load(config_path)?;
    let dataset = load_results(&config, data)?;

    for point in map::semi_ventoux() {
        match config.filter.summary(&dataset, &point.checkpoint_name)? {
            Some(summary) => println!("{}", summary.title()),
            None => println!("{} - not in results", point.checkpoint_name),
        }
    }
    Ok(())
}

fn route(svg: Option<&Path>, config_path: Option<&Path>) -> Result<(), NikromeError> {
    let config = AppConfig::load(config_path)?;
    let course = map::semi_ventoux();
    let mut surface = map::course_surface(&config, &course);

    let client = OsrmClient::new(&config.routing)?;
    let points = map::course::positions(&course);
    match runtime::block_on(draw_route_along_roads(&mut surface, &client, &points))? {
        RouteKind::RoadFollowing => info!("Course route follows roads"),
        RouteKind::StraightLine => warn!("Routing unavailable, course drawn as straight lines"),
    }

    if let Some(path) = svg {
        CourseSvgRenderer::new().write_svg(&surface, path)?;
    }
    Ok(())
}

fn config(output: Option<&Path>) -> Result<(), NikromeError> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => AppConfig::local_path().ok_or(NikromeError::NoConfigDir)?,
    };
    AppConfig::default().save_to(&path)
}

fn main() {
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match &cli.command {
        Commands::Map { data, config } => map(data.as_deref(), config.as_deref()),
        Commands::Scrape {
            input,
            table_id,
            output,
        } => scrape(input, table_id, output),
        Commands::Checkpoint { data, name, config } => {
            checkpoint(data.as_deref(), name, config.as_deref())
        }
        Commands::Checkpoints { data, config } => checkpoints(data.as_deref(), config.as_deref()),
        Commands::Route { svg, config } => route(svg.as_deref(), config.as_deref()),
        Commands::Config { output } => config(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}", snafu::Report::from_error(e));
        std::process::exit(1);
    }
}
