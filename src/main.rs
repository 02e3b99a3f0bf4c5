use std::path::Path;
use clap::{ArgEnum, Parser};
use log::info;
use cavity::{Compute, Geometry, Parameter, RedBlackSor, Solver, Sor};




#[derive(Debug, Clone, Copy, PartialEq, ArgEnum)]
enum SolverKind {
    Sor,
    RedBlack,
}




/**
 * Options left unset keep the value from the geometry or parameter file,
 * or the built-in default when no file is given.
 */
#[derive(Debug, Parser)]
#[clap(version = "0.1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    /// JSON file with run parameters
    #[clap(long)]
    parameter: Option<String>,

    /// JSON file with the cavity geometry
    #[clap(long)]
    geometry: Option<String>,

    /// Number of interior cells per axis [default: 128]
    #[clap(short = 'n', long)]
    size: Option<usize>,

    /// Horizontal lid velocity [default: 1]
    #[clap(long)]
    lid: Option<f64>,

    /// Reference pressure [default: 0]
    #[clap(long)]
    pressure: Option<f64>,

    /// Reynolds number [default: 1000]
    #[clap(long)]
    re: Option<f64>,

    /// SOR relaxation factor [default: 1.7]
    #[clap(long)]
    omega: Option<f64>,

    /// Donor-cell upwind weight [default: 0.9]
    #[clap(long)]
    alpha: Option<f64>,

    /// End time [default: 16.4]
    #[clap(long)]
    tend: Option<f64>,

    /// Maximum relaxation cycles per step [default: 100]
    #[clap(long)]
    iter_max: Option<usize>,

    /// Pressure residual tolerance [default: 0.001]
    #[clap(long)]
    eps: Option<f64>,

    /// Time step safety factor, 0 for a fixed step [default: 0.5]
    #[clap(long)]
    tau: Option<f64>,

    #[clap(long, arg_enum, default_value = "sor")]
    solver: SolverKind,

    #[clap(short = 't', long, default_value = "1")]
    num_threads: usize,

    /// Write the final state to this file as CBOR
    #[clap(short = 'o', long)]
    output: Option<String>,

    /// Write chkpt.NNNN.cbor every this many steps
    #[clap(long)]
    checkpoint_every: Option<u64>,

    /// Log a progress line every this many steps
    #[clap(long, default_value = "10")]
    print_every: u64,
}




// ============================================================================
impl Opts {

    fn geometry(&self) -> Result<Geometry, cavity::Error> {
        let mut geometry = match &self.geometry {
            Some(file) => Geometry::load(file)?,
            None => Geometry::default(),
        };
        if let Some(n) = self.size {
            geometry = geometry.with_size((n, n))?;
        }
        if let Some(lid) = self.lid {
            geometry = geometry.with_velocity((lid, 0.0));
        }
        if let Some(pressure) = self.pressure {
            geometry = geometry.with_pressure(pressure);
        }
        Ok(geometry)
    }

    fn parameter(&self) -> Result<Parameter, cavity::Error> {
        let mut parameter = match &self.parameter {
            Some(file) => Parameter::load(file)?,
            None => Parameter::default(),
        };
        parameter.re = self.re.unwrap_or(parameter.re);
        parameter.omega = self.omega.unwrap_or(parameter.omega);
        parameter.alpha = self.alpha.unwrap_or(parameter.alpha);
        parameter.tend = self.tend.unwrap_or(parameter.tend);
        parameter.iter_max = self.iter_max.unwrap_or(parameter.iter_max);
        parameter.eps = self.eps.unwrap_or(parameter.eps);
        parameter.tau = self.tau.unwrap_or(parameter.tau);
        parameter.validate()?;
        Ok(parameter)
    }
}




// ============================================================================
fn checkpoint_due(every: Option<u64>, iteration: u64) -> bool {
    match every {
        Some(every) if every > 0 => iteration % every == 0,
        _ => false,
    }
}

fn write_snapshot<P: AsRef<Path>>(compute: &Compute, path: P) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path.as_ref())?;
    compute.write_snapshot(std::io::BufWriter::new(file))?;
    info!("wrote {}", path.as_ref().display());
    Ok(())
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    let opts = Opts::parse();
    info!("{:?}", opts);

    rayon::ThreadPoolBuilder::new()
        .num_threads(opts.num_threads)
        .build_global()?;

    let geometry = opts.geometry()?;
    let parameter = opts.parameter()?;
    info!("{:?}", geometry);
    info!("{:?}", parameter);

    let solver: Box<dyn Solver> = match opts.solver {
        SolverKind::Sor => Box::new(Sor::new(&geometry, parameter.omega)?),
        SolverKind::RedBlack => Box::new(RedBlackSor::new(&geometry, parameter.omega)?),
    };
    let mut compute = Compute::with_solver(&geometry, &parameter, solver)?;
    let start = std::time::Instant::now();
    let mut unconverged = 0;
    let mut checkpoint = 0;

    while compute.time() < parameter.tend {
        let verbose = opts.print_every > 0 && (compute.iteration() + 1) % opts.print_every == 0;
        let report = compute.time_step(verbose);

        if !report.converged {
            unconverged += 1;
        }
        if checkpoint_due(opts.checkpoint_every, compute.iteration()) {
            write_snapshot(&compute, format!("chkpt.{:04}.cbor", checkpoint))?;
            checkpoint += 1;
        }
    }

    info!(
        "finished {} steps to t={:.4} in {:.4}s ({} with unconverged pressure)",
        compute.iteration(),
        compute.time(),
        start.elapsed().as_secs_f64(),
        unconverged);
    info!("max |u| = {:.4}, max |v| = {:.4}", compute.u().abs_max(), compute.v().abs_max());

    if let Some(output) = &opts.output {
        write_snapshot(&compute, output)?;
    }
    Ok(())
}
