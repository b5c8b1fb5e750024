mod config;
mod play;
mod render;

use std::io;

use clap::Parser;
use swapix_common::config::Validate;
use swapix_common::games::match3::{record_outcome, LevelCatalog, LevelProvider, Session};
use swapix_common::games::SessionRng;
use swapix_common::version::VERSION;
use swapix_common::{log, logger};

use config::{get_config_path, load_catalog, resolve_beside, CliConfigStore, ProfileStore};

#[derive(Parser)]
#[command(name = "swapix", version = VERSION)]
struct Args {
    /// Level to play
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Seed for a reproducible board
    #[arg(long)]
    seed: Option<u64>,

    /// Let the hint engine play the level
    #[arg(long)]
    auto: bool,

    /// Autoplay move limit, overrides the config file
    #[arg(long)]
    max_moves: Option<u32>,

    /// Path to the config file
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    use_log_prefix: bool,

    /// Print the level list and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Swapix".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);
    log!("Swapix {} starting", VERSION);

    let config_path = args.config.clone().unwrap_or_else(get_config_path);
    let config = CliConfigStore::from_yaml_file(&config_path).load()?;

    let catalog = match &config.levels_file {
        Some(file) => load_catalog(&resolve_beside(&config_path, file))?,
        None => LevelCatalog::built_in(),
    };
    catalog.validate()?;

    let profile_store = ProfileStore::from_yaml_file(&resolve_beside(&config_path, &config.profile_file));
    let profile = profile_store.load()?;

    if args.list {
        print!(
            "{}",
            render::render_catalog(&catalog, &profile.statistics, &profile.progression)
        );
        return Ok(());
    }

    let level = catalog
        .level(args.level)
        .ok_or_else(|| format!("Level {} does not exist, there are {}", args.level, catalog.level_count()))?;
    if !profile.progression.is_unlocked(level.id) {
        return Err(format!(
            "Level {} is locked, complete level {} first",
            level.id,
            profile.progression.unlocked_levels()
        )
        .into());
    }

    let rng = args.seed.map_or_else(SessionRng::from_random, SessionRng::new);
    log!("Playing level {} with seed {}", level.id, rng.seed());
    let mut session = Session::new(level, rng)?;

    let outcome = if args.auto {
        let max_moves = args.max_moves.unwrap_or(config.autoplay.max_moves);
        let outcome = play::autoplay(&mut session, max_moves)?;
        print!("{}", render::render_grid(session.grid(), None));
        println!("{}", render::render_status(&session));
        if outcome.won {
            println!(
                "Level complete in {} moves {}",
                outcome.moves_used,
                render::render_stars(outcome.stars)
            );
        }
        Some(outcome)
    } else {
        let stdin = io::stdin();
        play::interactive(&mut session, &mut stdin.lock(), &mut io::stdout())?
    };

    let Some(outcome) = outcome else {
        return Ok(());
    };

    let level_count = catalog.level_count();
    if let Err(e) = profile_store.update(|profile| {
        record_outcome(&outcome, &mut profile.statistics, &mut profile.progression, level_count)
    }) {
        log!("Failed to save profile: {}", e);
    }

    Ok(())
}
