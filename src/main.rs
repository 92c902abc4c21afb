use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fractal_poetry::explorer::render_with_poetry;
use fractal_poetry::session::Limits;
use fractal_poetry::visualizer::mandala;
use fractal_poetry::{Config, FractalKind, PoetryExplorer, Reply, Session};

/// Fractal Poetry Explorer - where math meets art.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Start the interactive exploration session (the default)
    #[arg(short, long)]
    interactive: bool,
    /// Run a quick demo
    #[arg(long)]
    demo: bool,
    /// Take the guided tour
    #[arg(long)]
    tour: bool,
    /// Generate a single poem
    #[arg(long)]
    poem: bool,
    /// Fractal type for single operations
    #[arg(long, default_value = "mandelbrot")]
    fractal: FractalKind,
    /// Lines for --poem
    #[arg(long)]
    lines: Option<usize>,
    /// Session seed, for reproducible poems
    #[arg(long)]
    seed: Option<u64>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resume from an exported session file
    #[arg(long)]
    session: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if opts.seed.is_some() {
        config.seed = opts.seed;
    }

    let mut explorer = match &opts.session {
        Some(path) => {
            let session = Session::import(path, Limits::from(&config))?;
            PoetryExplorer::with_session(config, session)?
        }
        None => PoetryExplorer::new(config)?,
    };

    if opts.tour {
        println!("{}", explorer.tour()?);
    } else if opts.demo {
        run_demo(&mut explorer)?;
    } else if opts.poem {
        if explorer.session().state().kind != opts.fractal {
            explorer.execute(fractal_poetry::Command::Switch(opts.fractal))?;
        }
        let lines = opts.lines.unwrap_or(explorer.config().default_poem_lines);
        println!("{}", explorer.poem(lines)?);
    } else {
        run_interactive(&mut explorer)?;
    }

    Ok(())
}

fn run_demo(explorer: &mut PoetryExplorer) -> Result<(), Box<dyn std::error::Error>> {
    println!("🌌✨ FRACTAL POETRY GENERATOR DEMO ✨🌌");
    println!("{}", "=".repeat(50));

    println!("\n🎭 Sample Poems:");
    println!("{}", "-".repeat(30));
    for line in ["jump -0.5 0 2", "poem 4", "julia", "jump 0 0 1", "poem 4"] {
        if let Some(Reply::Text(text)) = explorer.handle_line(line)? {
            if line.starts_with("poem") {
                println!("{}", text);
            }
        }
    }

    println!("\n🖋️  Poem Over Fractal:");
    println!("{}", "-".repeat(30));
    explorer.handle_line("mandelbrot")?;
    println!("{}", render_with_poetry(explorer, 4)?);

    println!("\n🎨 Fractal Visualization:");
    println!("{}", "-".repeat(30));
    explorer.handle_line("jump -0.7 0 4")?;
    println!("{}", explorer.explore());

    println!("\n🕉️ Fractal Mandala:");
    println!("{}", "-".repeat(20));
    println!("{}", mandala(12));

    println!("\n🚀 Try Interactive Mode: fractal_poetry --interactive");
    Ok(())
}

fn run_interactive(explorer: &mut PoetryExplorer) -> io::Result<()> {
    println!("\n╭──────────────────────────────────────────╮");
    println!("│   🌌✨ fractal poetry explorer ✨🌌     │");
    println!("│                                          │");
    println!("│ where mathematics meets poetry and chaos │");
    println!("│ becomes art. every point in the complex  │");
    println!("│ plane has a poem waiting inside it.      │");
    println!("│                                          │");
    println!("│ type 'help' for commands or 'tour' for   │");
    println!("│ a guided experience                      │");
    println!("╰──────────────────────────────────────────╯\n");

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        print!("\n🔮 fractal-poetry> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match explorer.handle_line(input.trim()) {
            Ok(Some(Reply::Text(text))) => println!("{}", text),
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => continue,
            Err(e) => println!("❌ {}", e),
        }
    }

    println!("🌟 Thank you for exploring the infinite! Goodbye! 🌟");
    Ok(())
}
