use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use orbitscene_common::{ControlSettings, FrameStats, SurfaceSize};
use orbitscene_driver::{BobbingMode, DriverConfig, FrameTick, ManualScheduler, RenderLoop};
use orbitscene_render::{DebugTextRenderer, mesh};
use orbitscene_scene::{LightKind, Scene};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Wall-clock origin of a simulated run, so the time-based motion starts
/// from a realistic phase.
const SIM_EPOCH_MS: f64 = 1.7e12;

#[derive(Parser)]
#[command(name = "orbitscene-cli", about = "Headless tools for the orbit scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene summary
    Info,
    /// Print the built scene
    Inspect {
        /// Emit the scene as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the render loop against a simulated display clock
    Simulate {
        /// Number of display refreshes to run
        #[arg(short, long, default_value = "180")]
        frames: u64,
        /// Simulated refresh rate
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Vertical bobbing model: oscillate or drift
        #[arg(long, default_value = "oscillate")]
        bobbing: BobbingMode,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// Print every rendered frame, not only the last
        #[arg(long)]
        every_frame: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => info(),
        Commands::Inspect { json } => inspect(json)?,
        Commands::Simulate {
            frames,
            fps,
            bobbing,
            width,
            height,
            every_frame,
        } => simulate(frames, fps, bobbing, SurfaceSize::new(width, height), every_frame)?,
    }

    Ok(())
}

fn info() {
    let scene = Scene::build();
    println!("orbitscene-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("objects: {}", scene.object_count());
    println!("lights: {}", scene.lights().iter().count());
    println!("background: {}", scene.background());
    println!("default settings: {:?}", ControlSettings::default());
}

fn inspect(json: bool) -> anyhow::Result<()> {
    let scene = Scene::build();
    if json {
        let text = serde_json::to_string_pretty(&scene).context("serialize scene")?;
        println!("{text}");
        return Ok(());
    }

    println!("Scene (background {})", scene.background());
    let fog = scene.fog();
    println!("  fog: {} {:.0}..{:.0}", fog.color, fog.near, fog.far);
    for obj in scene.objects() {
        let m = mesh::build(obj.geometry());
        let p = obj.rest_position();
        println!(
            "  [{}] {:<12} at ({:>4.1}, {:>4.1}, {:>4.1})  color {}  {} verts / {} tris",
            obj.index(),
            obj.kind().name(),
            p.x,
            p.y,
            p.z,
            obj.material().color(),
            m.vertex_count(),
            m.triangle_count()
        );
    }
    let ground = scene.ground();
    println!(
        "  ground at y={:.1}  color {}",
        ground.transform.position.y,
        ground.material.color()
    );
    for light in scene.lights().iter() {
        let kind = match light.kind {
            LightKind::Ambient => "ambient".to_string(),
            LightKind::Directional { position, shadow } => format!(
                "directional from {position}{}",
                if shadow.is_some() { " (shadows)" } else { "" }
            ),
            LightKind::Point { position } => format!("point at {position}"),
        };
        println!("  light: {kind}  {} x{:.1}", light.color, light.intensity);
    }
    Ok(())
}

fn simulate(
    frames: u64,
    fps: f64,
    bobbing: BobbingMode,
    size: SurfaceSize,
    every_frame: bool,
) -> anyhow::Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number, got {fps}");
    }
    let config = DriverConfig {
        bobbing,
        ..DriverConfig::default()
    };
    let mut driver = RenderLoop::mount(
        size,
        DebugTextRenderer::new(size),
        ManualScheduler::new(),
        config,
        SIM_EPOCH_MS,
    )
    .context("mount render loop")?;
    let (stats_tx, stats_rx) = mpsc::channel::<FrameStats>();
    driver.connect_stats(stats_tx);

    println!("Simulating {frames} frames at {fps} Hz ({size}, bobbing {bobbing})");
    let period_ms = 1000.0 / fps;
    let mut last_frame = String::new();
    for k in 1..=frames {
        let Some(handle) = driver.scheduler_mut().fire() else {
            break;
        };
        let tick = FrameTick::new(handle, SIM_EPOCH_MS + k as f64 * period_ms);
        if let Some(report) = driver.on_frame(tick) {
            if every_frame {
                print!("{}", report.output);
            }
            last_frame = report.output;
        }
        for stats in stats_rx.try_iter() {
            println!("[{:>6.0} ms] {stats}", k as f64 * period_ms);
        }
    }

    if !every_frame {
        print!("{last_frame}");
    }
    let drawn = driver.frames();
    let released = driver.teardown().is_some_and(|r| r.is_released());
    println!("Frames drawn: {drawn}  renderer released: {released}");
    Ok(())
}
