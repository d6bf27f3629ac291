use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use drumroll::Middle;
use drumroll::audio::{self, region};
use drumroll::pipeline::codec;
use drumroll::pipeline::persistence::{self, SongData};
use drumroll::pipeline::presets::Preset;
use drumroll::shared::{self, UiAction};

#[derive(Parser)]
#[command(name = "drumroll")]
#[command(about = "Step sequencer with shareable song links")]
struct Cli {
    /// Scheme and host permalinks are built on
    #[arg(long, global = true, default_value = "http://localhost:3333")]
    origin: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a song for a number of bars, logging every hit
    Play {
        #[command(flatten)]
        song: SongArgs,

        /// Bars to play before stopping
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
        bars: u64,
    },
    /// Turn a song JSON file into a share token
    Encode { file: PathBuf },
    /// Print the song JSON inside a share token
    Decode { token: String },
    /// List the bundled presets
    Presets,
    /// Print the permalink and share links for a song
    Share {
        #[command(flatten)]
        song: SongArgs,
    },
}

#[derive(Args)]
struct SongArgs {
    /// Bundled preset (default, 15step, sundaybloodysunday, sexualhealing, juicy)
    #[arg(long, conflicts_with = "token")]
    preset: Option<Preset>,

    /// Share token, as found after `#/song/`
    #[arg(long)]
    token: Option<String>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play { song, bars } => play(&song, bars, &cli.origin),
        Command::Encode { file } => encode(&file),
        Command::Decode { token } => decode(&token),
        Command::Presets => list_presets(),
        Command::Share { song } => share(&song, &cli.origin),
    }
}

fn load(args: &SongArgs) -> anyhow::Result<Middle> {
    let mut middle = Middle::new()?;
    if let Some(preset) = args.preset {
        middle.load_preset(preset)?;
    } else if let Some(token) = &args.token {
        middle.load_token(token).context("could not load --token")?;
    }
    Ok(middle)
}

fn play(args: &SongArgs, bars: u64, origin: &str) -> anyhow::Result<()> {
    let mut middle = load(args)?;
    log::info!("permalink {}", middle.permalink(origin)?);

    let (sink, sounds) = audio::sound_channel(shared::SINK_CAPACITY);
    let _sink = audio::attach_sink(middle.bus(), std::rc::Rc::new(sink));

    let last_tick = shared::SIXTEENTHS_PER_BEAT * shared::BEATS_PER_BAR * bars;
    let frame = Duration::from_millis(16); // ~60fps
    let mut last = Instant::now();
    let mut shown = String::new();

    middle.handle_action(UiAction::Start)?;
    loop {
        for sound in sounds.try_iter() {
            let r = region(sound.sound);
            log::info!(
                "{:<12} vel {:.2} pan {:.1} sprite {}..{}ms",
                sound.sound,
                sound.velocity,
                sound.pan,
                r.start_ms,
                r.end_ms()
            );
        }

        let state = middle.display_state();
        if state.display != shown {
            log::debug!("{}", state.display);
            shown = state.display;
        }
        if middle.transport().tick_count().is_some_and(|c| c >= last_tick) {
            break;
        }

        std::thread::sleep(frame);
        let elapsed = last.elapsed();
        last = Instant::now();
        middle.tick(elapsed);
    }
    middle.handle_action(UiAction::Stop)?;
    Ok(())
}

fn encode(file: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    let data: SongData = serde_json::from_str(&json).context("not a song file")?;
    // refuse anything that would not load back
    persistence::deserialize(data.clone())?;
    println!("{}", codec::encode(&data)?);
    Ok(())
}

fn decode(token: &str) -> anyhow::Result<()> {
    let data = codec::decode(token)?;
    persistence::deserialize(data.clone())?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn list_presets() -> anyhow::Result<()> {
    for preset in Preset::ALL {
        let song = preset.load()?;
        println!(
            "{:<20} {:<32} {} bpm, {} channels",
            preset.name(),
            song.name(),
            song.tempo(),
            song.channels().len()
        );
    }
    Ok(())
}

fn share(args: &SongArgs, origin: &str) -> anyhow::Result<()> {
    let mut middle = load(args)?;
    let links = middle.share_links(origin)?;
    println!("permalink {}", links.permalink);
    println!("email     {}", links.email);
    println!("google+   {}", links.google);
    println!("facebook  {}", links.facebook);
    println!("twitter   {}", links.twitter);
    Ok(())
}
