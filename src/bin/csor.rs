#![deny(unsafe_code)]
#![warn(
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use color_schemorator::{
    dominant_palette, dominant_palette_par, io,
    remap::{remap, remap_par},
    Palette, PaletteSize, PixelGrid, Workers,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Color Schemorator adjusts the colors of an image to a palette of hex color codes
/// (the palette file may contain `//` comments), or extracts the most common colors of an image.
#[derive(Parser)]
#[command(name = "csor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,
}

#[derive(Args)]
struct Options {
    /// Number of worker threads and column strips; 0 uses the detected hardware concurrency
    #[arg(short, long, global = true, default_value_t = 0)]
    threads: u8,

    /// Log the duration and size of each step
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new image by replacing each pixel with its closest palette color
    Generate {
        /// Plain text file with one hex color code per line
        #[arg(short, long)]
        palette: PathBuf,

        /// Input image (jpg, jpeg, or png)
        #[arg(short, long)]
        input: PathBuf,

        /// Output image (jpg, jpeg, or png)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extract the most common colors of an image into a palette file
    Extract {
        /// Input image (jpg, jpeg, or png)
        #[arg(short, long)]
        input: PathBuf,

        /// Output palette file
        #[arg(short = 'P', long = "palette")]
        output: PathBuf,

        /// Maximum number of colors to extract
        #[arg(short, default_value_t = PaletteSize::MAX, value_parser = parse_palette_size)]
        k: PaletteSize,
    },
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

macro_rules! timed {
    ($name: literal, $val: expr) => {{
        let time = Instant::now();
        let value = $val;
        info!("{} took {}ms", $name, time.elapsed().as_millis());
        value
    }};
}

fn init_logging(verbose: bool) {
    let default = if verbose { "csor=debug" } else { "csor=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Runs `f` with `threads` workers, on a dedicated rayon pool if a count is given.
fn with_workers<T: Send>(threads: u8, f: impl FnOnce(Workers) -> T + Send) -> anyhow::Result<T> {
    match threads {
        0 => Ok(f(Workers::detect())),
        t => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(t.into())
                .build()
                .context("failed to build the thread pool")?;

            Ok(pool.install(|| f(Workers::from_clamped(t.into()))))
        }
    }
}

fn generate(palette: &Path, input: &Path, output: &Path, threads: u8) -> anyhow::Result<()> {
    io::validate_extension(input, io::FileKind::InputImage)?;
    io::validate_extension(output, io::FileKind::OutputImage)?;

    let palette: Palette = timed!("read palette", io::read_palette(palette)?);
    debug!(colors = palette.len(), "parsed palette");

    let grid = timed!("read image", io::open_image(input)?);
    debug!(width = grid.width(), height = grid.height(), "decoded image");

    let remapped: PixelGrid = timed!(
        "remapping",
        with_workers(threads, |workers| {
            debug!(%workers, "remapping image");
            if workers == Workers::ONE {
                remap(&grid, &palette)
            } else {
                remap_par(&grid, &palette, workers)
            }
        })??
    );

    timed!("write image", io::save_image(output, &remapped)?);
    info!(output = %output.display(), "wrote image");
    Ok(())
}

fn extract(input: &Path, output: &Path, k: PaletteSize, threads: u8) -> anyhow::Result<()> {
    io::validate_extension(input, io::FileKind::InputImage)?;

    let grid = timed!("read image", io::open_image(input)?);
    debug!(width = grid.width(), height = grid.height(), "decoded image");

    let palette = timed!(
        "extraction",
        with_workers(threads, |workers| {
            debug!(%workers, "counting colors");
            if workers == Workers::ONE {
                dominant_palette(&grid, k)
            } else {
                dominant_palette_par(&grid, k, workers)
            }
        })?
    );
    debug!(colors = palette.len(), "extracted palette");

    timed!("write palette", io::write_palette(output, &palette)?);
    info!(output = %output.display(), "wrote palette");
    Ok(())
}

fn main() -> ExitCode {
    let Cli { command, options: Options { threads, verbose } } = Cli::parse();
    init_logging(verbose);

    let start = Instant::now();
    let result = match command {
        Command::Generate { palette, input, output } => generate(&palette, &input, &output, threads)
            .map(|()| println!("Image generated successfully in {:?}", start.elapsed())),
        Command::Extract { input, output, k } => extract(&input, &output, k, threads)
            .map(|()| println!("Palette extracted successfully in {:?}", start.elapsed())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
