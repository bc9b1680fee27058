use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{builder::RangedU64ValueParser, Args};
use log::info;
use pca_stats::{
    dataset::{self, LabeledData},
    eigen::JacobiSolver,
    pca::pca_with_solver,
    vtk,
};

use crate::util::{self, DataType};

/// Principal component analysis
#[derive(Debug, Args)]
pub struct PcaArgs {
    /// Dataset file (.json or .csv)
    pub dataset: PathBuf,
    /// Number of samples to read
    #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub samples: usize,
    /// Number of fields per record, including the label field
    #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(2..))]
    pub features: usize,
    /// Number of principal components to keep
    #[arg(value_parser = clap::value_parser!(u8).range(2..=3))]
    pub components: u8,
    /// The format of the file
    #[arg(value_enum, short, long)]
    pub datatype: Option<DataType>,
    /// CSV delimiter
    #[arg(long, default_value_t = String::from(","))]
    pub csv_delim: String,
    /// Category mapped to label 1, every other category maps to 0
    #[arg(long, default_value_t = String::from("setosa"))]
    pub positive_label: String,
    /// Where to write the VTK point cloud
    #[arg(short, long, default_value = "output_pca.vtk")]
    pub output: PathBuf,
    /// Maximum number of Jacobi rotations
    #[arg(long, default_value_t = 1000)]
    pub max_iter: usize,
    /// Off-diagonal magnitude treated as zero
    #[arg(long, default_value_t = 1e-10)]
    pub tolerance: f64,
    /// Print eigenvalues and eigenvectors of the covariance matrix
    #[arg(long)]
    pub show_eigen: bool,
}

fn load(args: &PcaArgs) -> Result<LabeledData> {
    let datatype = match args.datatype {
        Some(d) => d,
        None => DataType::from_filename(&args.dataset)?,
    };
    let reader = util::get_buff_reader(&args.dataset)?;
    // the label field is not a feature
    let feature_cols = args.features - 1;

    let data = match datatype {
        DataType::Json => dataset::from_json(
            reader,
            args.samples,
            feature_cols,
            &args.positive_label,
        ),
        DataType::Csv => dataset::from_csv(
            reader,
            &args.csv_delim,
            args.samples,
            feature_cols,
            &args.positive_label,
        ),
    };
    data.with_context(|| format!("Loading {}", args.dataset.to_string_lossy()))
}

pub fn pca_main(args: PcaArgs) -> Result<()> {
    let data = load(&args)?;

    info!("Performing PCA on the dataset...");
    let solver = JacobiSolver::new(args.max_iter, args.tolerance);
    let result = pca_with_solver(&data.features, args.components as usize, &solver)?;

    if args.show_eigen {
        print!("{}", result.eigen);
        let ratios: Vec<String> = result.explained_variance_ratio()
            .iter()
            .map(|r| format!("{:.4}", r))
            .collect();
        println!("Explained variance ratio: {}", ratios.join("\t"));
    }

    vtk::export_vtk(&args.output, &result.transformed, &data.labels)?;
    Ok(())
}
