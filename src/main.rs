mod assets;
mod config;
mod display;
mod error;
mod math;
mod motion;
mod particles;
mod phase;
mod sampler;
mod session;
mod timer;
mod util;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use sdl2::keyboard::Keycode;

use assets::{AssetLoader, LoadStatus};
use config::Config;
use display::{Display, InputEvent, PixelBuffer, RenderTarget};
use error::Result;
use session::Session;
use util::{FpsCounter, Rng};

/// Simulated frame length for headless snapshots (60 Hz)
const SNAPSHOT_FRAME: Duration = Duration::from_micros(16_667);
/// Idle wait while the logo is still loading (or failed to)
const IDLE_WAIT: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "emblem-burst", version, about = "Particle burst that converges into a logo")]
struct Cli {
    /// JSON config file; any field left out keeps its default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logo image the particles converge into
    #[arg(short, long, default_value = "emblem.png")]
    logo: PathBuf,

    /// Canvas width in pixels
    #[arg(short, long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Number of particles
    #[arg(short, long)]
    particles: Option<usize>,

    /// RNG seed for a reproducible burst
    #[arg(long)]
    seed: Option<u64>,

    /// Window size relative to the canvas
    #[arg(long)]
    scale: Option<f32>,

    /// Disable VSync for an uncapped frame rate
    #[arg(long)]
    no_vsync: bool,

    /// Render headless and write the frame at --snapshot-ms to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Animation time of the snapshot frame
    #[arg(long, default_value_t = 7000)]
    snapshot_ms: u64,

    /// Write the effective config as JSON to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if let Some(n) = self.particles {
            config.particles.count = n;
        }
        if let Some(seed) = self.seed {
            config.particles.seed = Some(seed);
        }
        if let Some(scale) = self.scale {
            config.window_scale = scale;
        }
        if self.no_vsync {
            config.vsync = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.config()?;
    let seed = config.particles.seed.unwrap_or_else(Rng::seed_from_clock);
    log::info!(
        "canvas {}x{}, {} particles, seed {}",
        config.width,
        config.height,
        config.particles.count,
        seed
    );

    if let Some(path) = &cli.write_config {
        config.save(path)?;
        log::info!("wrote config to {}", path.display());
        return Ok(());
    }

    match &cli.snapshot {
        Some(out) => snapshot(&config, &cli, seed, out),
        None => run_window(&config, &cli, seed),
    }
}

/// Sample the logo and build a session over it
fn start_session(config: &Config, logo: &image::RgbaImage, seed: u64) -> Result<Session> {
    let targets = sampler::sample_targets(logo, &config.sampler, config.width, config.height);
    Session::new(config, targets, &mut Rng::new(seed))
}

fn snapshot(config: &Config, cli: &Cli, seed: u64, out: &Path) -> Result<()> {
    let logo = AssetLoader::spawn(&cli.logo).wait()?;
    let mut session = start_session(config, &logo, seed)?;
    let mut buffer = PixelBuffer::with_size(config.width, config.height);

    let until = Duration::from_millis(cli.snapshot_ms);
    session::run_simulated(&mut session, &mut buffer, until, SNAPSHOT_FRAME);

    buffer.to_rgba_image().save(out)?;
    log::info!(
        "wrote {} after {} frames ({} phase)",
        out.display(),
        session.frames(),
        session.phase()
    );
    Ok(())
}

fn run_window(config: &Config, cli: &Cli, seed: u64) -> Result<()> {
    let (window_width, window_height) = config.window_size();
    let (mut display, texture_creator) =
        Display::with_options("emblem-burst", window_width, window_height, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, config.width, config.height)?;
    let mut buffer = PixelBuffer::with_size(config.width, config.height);

    let mut loader = AssetLoader::spawn(&cli.logo);
    // Nothing animates until the logo is in; start time is taken then
    let mut running: Option<(Session, Instant)> = None;

    let mut fps_counter = FpsCounter::new(60);
    let mut last_fps_log = Instant::now();

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(_) => {},
            }
        }

        if running.is_none() {
            match loader.poll() {
                LoadStatus::Ready(logo) => {
                    log::info!("loaded logo {}", loader.path().display());
                    running = Some((start_session(config, &logo, seed)?, Instant::now()));
                },
                LoadStatus::Failed(reason) => {
                    log::warn!(
                        "could not load logo {}: {}; animation will not start",
                        loader.path().display(),
                        reason
                    );
                },
                LoadStatus::Pending => {},
            }
        }

        let Some((session, started)) = running.as_mut() else {
            thread::sleep(IDLE_WAIT);
            continue;
        };

        session.tick(&mut buffer, started.elapsed());
        display.present(&mut target, &buffer)?;

        let avg_fps = fps_counter.tick();
        if last_fps_log.elapsed() >= Duration::from_secs(1) {
            log::debug!(
                "{:.1} fps avg ({:.2} ms), {} phase",
                avg_fps,
                fps_counter.avg_frame_time_ms(),
                session.phase()
            );
            last_fps_log = Instant::now();
        }
    }

    Ok(())
}
