use clap::Parser;
use pgscript::{SampleDataPlan, logging, sample_data::write_sample_data};
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "generate-sample-data")]
#[command(version)]
#[command(about = "Generate sample titles, ratings and viewing history as CSV files")]
struct Args {
    /// Directory the CSV files are written to
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Number of titles
    #[arg(long, default_value_t = 1000)]
    titles: usize,

    /// Number of ratings
    #[arg(long, default_value_t = 5000)]
    ratings: usize,

    /// Number of viewing history records
    #[arg(long, default_value_t = 10000)]
    viewing: usize,

    /// Users referenced by ratings and viewing history
    #[arg(long, default_value_t = 500)]
    users: usize,

    /// Titles referenced by ratings and viewing history
    #[arg(long, default_value_t = 1000)]
    catalog: usize,

    /// Seed for reproducible output (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let plan = SampleDataPlan {
        titles: args.titles,
        ratings: args.ratings,
        viewing_records: args.viewing,
        num_users: args.users,
        num_titles: args.catalog,
    };
    let now = chrono::Local::now().naive_local();

    match write_sample_data(&mut rng, now, &plan, &args.output_dir) {
        Ok(paths) => {
            for path in &paths {
                info!("Wrote {}", path.display());
            }
            println!("Sample data generated successfully!");
            println!("Files saved in '{}' directory", args.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to generate sample data: {e}");
            ExitCode::FAILURE
        }
    }
}
