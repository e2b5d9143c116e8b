//! Fluid Replay CLI - Load a recorded simulation and step through it.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::sync::Arc;
use std::time::{Duration, Instant};

use fluid_replay::{
    animation::{
        FsSource, HeadlessDisplay, LoadingPipeline, Phase, PipelineOptions, ReplayInputs,
        ReplaySession, SnapshotSource, StepDirection, load_global_config,
    },
    schema::{BuilderConfig, GlobalConfig, SimulationConfig, WallBox},
};

/// Interval between pipeline ticks while loading.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 2 {
        eprintln!("Usage: {} <root> [simulation] [workers]", args[0]);
        eprintln!();
        eprintln!("Replay a recorded simulation stored under <root>.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  root        Directory holding global.json and simulation folders");
        eprintln!("  simulation  Simulation name (default: name from global.json)");
        eprintln!("  workers     Frame worker threads (default: cores - 1)");
        eprintln!();
        eprintln!("Example configuration is printed with --example flag.");
        std::process::exit(1);
    }

    let source: Arc<dyn SnapshotSource> = Arc::new(FsSource::new(&args[1]));

    let name = match args.get(2) {
        Some(name) => name.clone(),
        None => {
            let global = load_global_config(source.as_ref()).unwrap_or_else(|e| {
                eprintln!("Error loading global config: {}", e);
                std::process::exit(1);
            });
            global.name
        }
    };

    let options = PipelineOptions {
        worker_threads: args.get(3).and_then(|s| s.parse().ok()),
    };

    let inputs = ReplayInputs::load(source.as_ref(), &name).unwrap_or_else(|e| {
        eprintln!("Error loading simulation {}: {}", name, e);
        std::process::exit(1);
    });

    println!("Fluid Replay");
    println!("============");
    println!("Simulation: {}", inputs.name);
    println!(
        "Grid: {}x{}",
        inputs.static_grid.width(),
        inputs.static_grid.height()
    );
    println!(
        "Frames: {} ({} fps, {} s, {})",
        inputs.config.num_frames(),
        inputs.config.fps,
        inputs.config.seconds,
        if inputs.config.separate_files {
            "separate files"
        } else {
            "combined file"
        }
    );

    let pipeline = LoadingPipeline::new(inputs, source, &options).unwrap_or_else(|e| {
        eprintln!("Error starting pipeline: {}", e);
        std::process::exit(1);
    });
    println!(
        "Walls: {} cells",
        pipeline.context().wall_mask().wall_count()
    );
    println!();
    let mut session = ReplaySession::new(pipeline, HeadlessDisplay::default());

    // Load
    println!("Loading...");
    let start = Instant::now();
    let mut last_percent = 0;

    while !session.pipeline().is_complete() {
        if let Err(e) = session.tick() {
            eprintln!("Pipeline error: {}", e);
            std::process::exit(1);
        }

        let percent = (session.pipeline().progress() * 100.0) as u32;
        if percent >= last_percent + 10 {
            println!("  {}%", percent);
            last_percent = percent;
        }
        std::thread::sleep(TICK_INTERVAL);
    }

    let pipeline = session.pipeline();
    let cache = pipeline.cache();
    println!();
    println!(
        "Loaded {}/{} frames in {:.2}s",
        cache.filled_count(),
        cache.len(),
        start.elapsed().as_secs_f32()
    );
    for phase in Phase::ALL {
        if let Ok(d) = pipeline.events().duration(phase) {
            println!("  {}: {} ms", phase, d.as_millis());
        }
    }
    let missing = cache.missing();
    if !missing.is_empty() {
        println!("  Missing frames: {:?}", missing);
    }
    println!(
        "  Mesh data: {:.1} MiB",
        session.display().uploaded_bytes as f64 / (1024.0 * 1024.0)
    );
    println!();

    // Play
    println!("Playback:");
    print_current(&session);
    while session.step(StepDirection::Forward) {
        print_current(&session);
    }
}

fn print_current(session: &ReplaySession<HeadlessDisplay>) {
    let display = session.display();
    if let (Some(label), Some(stats)) = (&display.label, &display.stats) {
        println!(
            "  {}: volume={:.4}, max={:.4}, wet={}",
            label, stats.volume, stats.max_height, stats.wet_cells
        );
    }
}

fn print_example_config() {
    let global = GlobalConfig::default();
    let config = SimulationConfig::default();
    let builder = BuilderConfig {
        wall: vec![WallBox {
            top_left: [28, 0],
            bottom_right: [35, 40],
            height: 2.0,
        }],
    };

    println!("Example global config (global.json):");
    println!("{}", serde_json::to_string_pretty(&global).unwrap());
    println!();
    println!("Example simulation config ({}/config.json):", global.name);
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example wall builder ({}/builder.json):", global.name);
    println!("{}", serde_json::to_string_pretty(&builder).unwrap());
}
