//! Terminal front-end
//!
//! Usage: `arcade-loop [snake|flappy|catch|shooter] [--config <path>] [--seed <n>] [--mute] [--log <path>]`
//!
//! Log records go to stderr unless `--log` names a file. Stderr shares the
//! terminal with the game screen, so use `--log` together with `RUST_LOG`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use arcade_loop::audio::TerminalBell;
use arcade_loop::input::KeyboardInput;
use arcade_loop::render::{self, TerminalRenderer};
use arcade_loop::{GameConfig, GameLoop, Variant};

#[derive(Debug, Default)]
struct Args {
    variant: Option<Variant>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    mute: bool,
    log: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--seed" => {
                let seed = iter.next().context("--seed needs a number")?;
                args.seed = Some(seed.parse().with_context(|| format!("bad seed '{seed}'"))?);
            }
            "--mute" => args.mute = true,
            "--log" => {
                let path = iter.next().context("--log needs a path")?;
                args.log = Some(PathBuf::from(path));
            }
            name => match Variant::from_str(name) {
                Some(variant) => args.variant = Some(variant),
                None => bail!("unknown game '{name}' (try snake, flappy, catch or shooter)"),
            },
        }
    }
    Ok(args)
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::for_variant(args.variant.unwrap_or_default()),
    };
    if let (Some(_), Some(variant)) = (&args.config, args.variant) {
        config.variant = variant;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.mute {
        config.audio = Some(false);
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(path) = path {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args()?;
    init_logging(args.log.as_deref())?;
    let config = build_config(&args)?;

    // Put the terminal back before the panic message is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = render::restore(&mut io::stdout());
        default_hook(info);
    }));

    let input = KeyboardInput::open(config.variant)?;
    let mut term = TerminalRenderer::new();
    term.enter().context("failed to set up terminal")?;

    // From here on the renderer restores the terminal when dropped
    let mut game = GameLoop::new(config, input, term, TerminalBell::stdout())?;
    let summary = game.run();
    let (_, _, mut term, _) = game.into_parts();
    term.exit().context("failed to restore terminal")?;

    println!(
        "Played {} run(s), best score {} ({} ticks)",
        summary.runs, summary.best_score, summary.ticks
    );
    Ok(())
}
