//! Benchmark driver: time the GPU multiply, then the sequential one.

use std::process::ExitCode;

use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

use wgpu_matmul_bench::cli::CliArgs;
use wgpu_matmul_bench::timing::report_line;
use wgpu_matmul_bench::verify::ensure_match;
use wgpu_matmul_bench::{
    multiply_sequential, random_operands, time, DeviceExecutor, GpuContext, Result,
};

fn run(args: &CliArgs) -> Result<()> {
    let shape = args.shape()?;
    let options = args.adapter_options();
    let executor = DeviceExecutor::<GpuContext>::initialize(&options, &args.kernel)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!("multiplying with {shape:?}");

    let (a, b) = random_operands(&mut rng, shape);
    let (device_out, gpu_time) = time(|| executor.multiply(&a, &b, shape));
    let device_out = device_out?;
    println!("{}", report_line("GPU", &gpu_time));

    // Independent inputs for the sequential run.
    let (d, e) = random_operands(&mut rng, shape);
    let (_, seq_time) = time(|| multiply_sequential(&d, &e, shape));
    println!("{}", report_line("Sequential", &seq_time));

    if args.verify {
        let expected = multiply_sequential(&a, &b, shape);
        let cmp = ensure_match(expected.as_slice(), device_out.as_slice(), args.tolerance)?;
        println!(
            "Verification passed: max relative error {:e}",
            cmp.max_rel_error
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
