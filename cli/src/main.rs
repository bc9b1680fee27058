mod pca;
mod util;

use std::process::ExitCode;

use clap::Parser;
use pca::PcaArgs;

/// Principal component analysis with Jacobi eigen decomposition,
/// exported as a VTK point cloud
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: PcaArgs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match pca::pca_main(cli.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
