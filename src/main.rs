use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use kernelcheck::harness::registry;
use kernelcheck::{harness, mapping, RunOptions};

#[derive(Parser)]
#[command(
    name = "kernelcheck",
    version,
    about = "Validate WGSL compute kernels against host references"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the kernels directory and regenerate the mapping file
    Generate {
        /// Directory containing .wgsl kernel sources
        #[arg(long, default_value = "kernels")]
        kernels_dir: PathBuf,
        /// Mapping file to create or merge into
        #[arg(long, default_value = mapping::DEFAULT_MAPPING_FILE)]
        mapping: PathBuf,
    },
    /// Build every mapped kernel and run its test suite on the GPU
    Run {
        /// Directory containing .wgsl kernel sources
        #[arg(long, default_value = "kernels")]
        kernels_dir: PathBuf,
        /// Mapping file to read
        #[arg(long, default_value = mapping::DEFAULT_MAPPING_FILE)]
        mapping: PathBuf,
        /// Only run entries mapped to this suite
        #[arg(long)]
        suite: Option<String>,
    },
    /// List registered test suites
    Suites,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            kernels_dir,
            mapping,
        } => cmd_generate(kernels_dir, mapping),
        Command::Run {
            kernels_dir,
            mapping,
            suite,
        } => cmd_run(kernels_dir, mapping, suite),
        Command::Suites => cmd_suites(),
    }
}

// --- kernelcheck generate ---

fn cmd_generate(kernels_dir: PathBuf, mapping_path: PathBuf) {
    let summary = match mapping::regenerate(&kernels_dir, &mapping_path) {
        Ok(summary) => summary,
        Err(e) => {
            e.render_plain();
            process::exit(1);
        }
    };

    for kernel in &summary.added {
        println!("added new kernel: {}", kernel);
    }
    for kernel in &summary.dropped {
        println!("dropped entry for missing kernel: {}", kernel);
    }
    println!(
        "mapping written to '{}' ({} kept, {} added, {} dropped)",
        mapping_path.display(),
        summary.kept,
        summary.added.len(),
        summary.dropped.len()
    );
    if !summary.added.is_empty() {
        println!("fill in the \"test\" field for new entries before running");
    }
}

// --- kernelcheck run ---

fn cmd_run(kernels_dir: PathBuf, mapping_path: PathBuf, suite: Option<String>) {
    println!("initializing GPU device and queue...");
    let ctx = match kernelcheck::create_context() {
        Ok(ctx) => ctx,
        Err(e) => {
            e.render_plain();
            process::exit(1);
        }
    };
    println!("using adapter: {}", ctx.describe());

    let options = RunOptions {
        mapping_path,
        kernels_dir,
        filter: suite,
    };
    match harness::run(&ctx, &options) {
        Ok(report) => {
            print!("{}", report.format());
            if !report.passed() {
                process::exit(1);
            }
        }
        Err(e) => {
            e.render_plain();
            process::exit(1);
        }
    }
}

// --- kernelcheck suites ---

fn cmd_suites() {
    for suite in registry::all() {
        println!("{}", suite.name);
        for case in suite.tests {
            println!("  {}", case.name);
        }
    }
}
