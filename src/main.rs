//! Ionoptics - beamline transfer matrices from the command line
//!
//! Reads a beamline description file and writes tab-separated results to
//! stdout.
//!
//! # Usage
//!
//! ```bash
//! ionoptics triplet.beamline matrix
//! ionoptics triplet.beamline sample > envelope.tsv
//! ionoptics triplet.beamline thin
//! ionoptics triplet.beamline optimize --image p2p --symmetric --fix 0=2.5
//! ```
//!
//! Set `RUST_LOG=debug` for progress on stderr.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ionoptics::{
    beamline::{sample, Beamline},
    dsl,
    error::{OpticsError, Result},
    lens,
    report::{self, TsvWriter},
    solver::{self, ImagingMode, OptimizerConfig, StrengthOptimizer},
};

/// Linear ion-optics for beamline design
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the beamline description file
    #[arg(value_name = "BEAMLINE_FILE")]
    beamline_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transfer matrix
    Matrix,
    /// Print the transfer matrix along the path
    Sample,
    /// Print principal planes and thin-lens equivalents
    Thin,
    /// Search quadrupole strengths for an imaging condition
    Optimize {
        /// Imaging condition
        #[arg(long, value_enum, default_value_t = Image::P2par)]
        image: Image,

        /// Mirror-symmetric strengths
        #[arg(long)]
        symmetric: bool,

        /// Tolerance on each nulled matrix entry
        #[arg(long, default_value_t = solver::DEFAULT_PRECISION)]
        precision: f64,

        /// Nelder-Mead iteration cap
        #[arg(long, default_value_t = solver::DEFAULT_MAX_ITERATIONS)]
        max_iterations: u64,

        /// Starting strengths, comma-separated
        #[arg(long, value_delimiter = ',')]
        init: Option<Vec<f64>>,

        /// Hold a free parameter fixed (INDEX=VALUE, repeatable)
        #[arg(long, value_parser = parse_fixed)]
        fix: Vec<(usize, f64)>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Image {
    /// Point-to-point (M12 = M34 = 0)
    P2p,
    /// Point-to-parallel (M11 = M33 = 0)
    P2par,
}

impl From<Image> for ImagingMode {
    fn from(image: Image) -> Self {
        match image {
            Image::P2p => ImagingMode::PointToPoint,
            Image::P2par => ImagingMode::PointToParallel,
        }
    }
}

fn parse_fixed(s: &str) -> std::result::Result<(usize, f64), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{}'", s))?;
    let index = index.trim().parse().map_err(|e| format!("invalid index '{}': {}", index, e))?;
    let value = dsl::parse_value(value.trim()).ok_or_else(|| format!("invalid value '{}'", value))?;
    Ok((index, value))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Parse and build the beamline
    let ast = dsl::parse_file(&args.beamline_file)?;
    let beamline = Beamline::from_ast(&ast)?;
    log::info!(
        "{}: {} elements, {:.4} m",
        args.beamline_file.display(),
        beamline.len(),
        beamline.total_length()
    );

    let mut out = TsvWriter::new(io::stdout().lock());

    match args.command {
        Command::Matrix => report::write_matrix(&mut out, &beamline.transfer_matrix()?)?,
        Command::Sample => report::write_samples(&mut out, &sample(&beamline)?)?,
        Command::Thin => {
            let m = beamline.transfer_matrix()?;
            let planes = lens::principal_planes(&m)?;
            let focal = lens::focal_lengths(&m)?;
            let thin = lens::thin_equivalent(&m)?;
            report::write_thin_lens(&mut out, &planes, &focal, &thin)?;
        }
        Command::Optimize {
            image,
            symmetric,
            precision,
            max_iterations,
            init,
            fix,
        } => {
            let mut config = OptimizerConfig::new()
                .with_imaging(image.into())
                .with_symmetric(symmetric)
                .with_precision(precision)
                .with_max_iterations(max_iterations);
            if let Some(init) = init {
                config = config.with_initial_guess(init);
            }
            for (index, value) in fix {
                config = config.with_fixed(index, value);
            }

            let result = StrengthOptimizer::with_config(config).optimize(&beamline);
            if let Err(OpticsError::ConvergenceFailure { iterations, residual, .. }) = &result {
                log::error!("optimizer stopped after {} iterations at residual {:e}", iterations, residual);
            }
            report::write_strengths(&mut out, &result?)?;
        }
    }

    out.flush()
}
