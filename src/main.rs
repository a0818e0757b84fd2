use anyhow::{Context, bail};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skyburst::glyphs::TrueTypeFont;
use skyburst::surface::{DEFAULT_BG, parse_hex_color};
use skyburst::{AppConfig, AudioManager, ConfigPatch, Simulator};
use std::env;
use std::fs::File;
use std::io::{BufWriter, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

mod effects;
use effects::Effect;
use effects::fireworks::FireworksEffect;

fn print_usage() {
    eprintln!("skyburst - Fireworks in your terminal, with synthesized sound");
    eprintln!();
    eprintln!("Usage: skyburst [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE      Load settings from a TOML file");
    eprintln!("  --text TEXT        Text spelled by text bursts (default: HAPPY NEW YEAR)");
    eprintln!("  --font FILE        TrueType font for text bursts instead of the built-in one");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --volume V         Sound volume from 0 to 1 (default: 0.3)");
    eprintln!("  --mute             Start with sound off");
    eprintln!("  --no-auto          Don't start auto-fire");
    eprintln!("  --log-file FILE    Write logs to FILE (level from RUST_LOG, default info)");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  click     Launch a rocket at the pointer");
    eprintln!("  space     Launch a random rocket");
    eprintln!("  a         Toggle auto-fire");
    eprintln!("  s         Toggle shaped bursts");
    eprintln!("  c         Clear the sky");
    eprintln!("  m         Toggle sound");
    eprintln!("  + / -     Volume up / down");
    eprintln!("  [ / ]     Fewer / more particles per burst");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

#[derive(Default)]
struct Options {
    config: Option<PathBuf>,
    text: Option<String>,
    font: Option<PathBuf>,
    bg_color: Option<String>,
    volume: Option<f32>,
    mute: bool,
    no_auto: bool,
    log_file: Option<PathBuf>,
}

/// Returns `None` when only help was asked for.
fn parse_args(args: &[String]) -> anyhow::Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .with_context(|| format!("{arg} requires a value"))
        };

        match arg {
            "--config" => options.config = Some(value()?.into()),
            "--text" => options.text = Some(value()?),
            "--font" => options.font = Some(value()?.into()),
            "--bg-color" => options.bg_color = Some(value()?),
            "--volume" => {
                let raw = value()?;
                let volume = raw
                    .parse()
                    .with_context(|| format!("invalid volume {raw:?}, expected a number from 0 to 1"))?;
                options.volume = Some(volume);
            }
            "--log-file" => options.log_file = Some(value()?.into()),
            "--mute" => options.mute = true,
            "--no-auto" => options.no_auto = true,
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => {
                print_usage();
                bail!("unknown option: {other}");
            }
        }
        i += 1;
    }

    Ok(Some(options))
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    // stderr belongs to the raw-mode terminal, so logs only ever go to a file
    let file = File::create(path).with_context(|| format!("could not create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[cfg(feature = "audio")]
fn audio_manager() -> AudioManager {
    AudioManager::new(Box::new(skyburst::audio::device::RodioBackend::new()))
}

#[cfg(not(feature = "audio"))]
fn audio_manager() -> AudioManager {
    log::warn!("built without the audio feature, running silent");
    AudioManager::silent()
}

fn build_simulator(options: Options, cols: u16, rows: u16) -> anyhow::Result<Simulator> {
    let mut app = match &options.config {
        Some(path) => {
            AppConfig::from_file(path).with_context(|| format!("could not load config {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    let bg = match options.bg_color.as_ref().or(app.display.bg_color.as_ref()) {
        Some(hex) => parse_hex_color(hex)?,
        None => DEFAULT_BG,
    };

    let mut audio = audio_manager();
    audio.set_volume(options.volume.unwrap_or(app.audio.volume));
    audio.set_enabled(app.audio.enabled && !options.mute);

    if options.no_auto {
        app.display.auto_start = false;
    }

    let mut sim = Simulator::new(cols as usize, rows as usize * 2, app.simulation)
        .with_background(bg)
        .with_audio(audio);

    if let Some(path) = options.font.or(app.display.font_path) {
        let font = TrueTypeFont::from_file(&path)?;
        log::info!("text bursts use {}", path.display());
        sim = sim.with_rasterizer(Box::new(font));
    }
    if let Some(text) = options.text {
        sim.update_config(ConfigPatch {
            custom_text: Some(text),
            ..Default::default()
        });
    }

    if app.display.welcome_show {
        sim.schedule_welcome_show();
    }
    if app.display.auto_start {
        sim.start_auto_mode();
    }

    Ok(sim)
}

fn run_effect<E: Effect>(effect: &mut E) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = event_loop(effect, &mut stdout);

    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;

    result
}

fn event_loop<E: Effect>(effect: &mut E, stdout: &mut BufWriter<std::io::Stdout>) -> std::io::Result<()> {
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / 60.0;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    // Pass non-exit key events to the effect
                    effect.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    effect.resize(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    effect.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(stdout, frame_time)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(mut options) = parse_args(&args)? else {
        return Ok(());
    };

    if let Some(path) = options.log_file.take() {
        init_logging(&path)?;
    }

    let (cols, rows) = terminal::size().context("could not read terminal size")?;
    let sim = build_simulator(options, cols, rows)?;
    log::info!("starting on a {cols}x{rows} terminal");

    let mut effect = FireworksEffect::new(sim);
    run_effect(&mut effect).context("terminal error")?;

    log::info!("final stats: {:?}", effect.stats());
    Ok(())
}
