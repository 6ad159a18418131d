// Yoga Pose Coach 🧘 AGPL-3.0 License

use clap::Parser;

use yoga_pose_coach::cli::args::{Cli, Commands};
use yoga_pose_coach::cli::{analyze, logging, nidra, practice, records};
use yoga_pose_coach::config::default_data_dir;

fn main() {
    let cli = Cli::parse();
    logging::set_verbose(cli.verbose);

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match &cli.command {
        Commands::Practice(args) => practice::run_practice(args, &data_dir),
        Commands::Analyze(args) => analyze::run_analyze(args),
        Commands::Library => records::run_library(),
        Commands::History => records::run_history(&data_dir),
        Commands::Profile(args) => records::run_profile(args, &data_dir),
        Commands::Review(args) => records::run_review(args, &data_dir),
        Commands::Nidra(args) => nidra::run_nidra(args),
    }
}
