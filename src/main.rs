use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quakemap::config_params::MapConfig;
use quakemap::document::{write_view, OutputFormat};

fn cli() -> Command {
    Command::new("quakemap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render recent earthquakes and tectonic plates to an interactive map")
        .arg(Arg::new("input")
                 .short('i')
                 .long("input")
                 .value_name("FILE")
                 .help("Configuration file to use (.toml)."))
        .arg(Arg::new("output")
                 .short('o')
                 .long("output")
                 .value_name("FILE")
                 .help("Where to write the map; overrides [map] output."))
        .arg(Arg::new("format")
                 .short('f')
                 .long("format")
                 .value_name("FORMAT")
                 .value_parser(["svg", "json"])
                 .help("Output format. Defaults to the output file extension."))
        .arg(Arg::new("token")
                 .long("token")
                 .value_name("TOKEN")
                 .help("Tile provider access token."))
        .arg(Arg::new("earthquakes")
                 .long("earthquakes")
                 .value_name("URL|FILE")
                 .help("Earthquake GeoJSON feed."))
        .arg(Arg::new("plates")
                 .long("plates")
                 .value_name("URL|FILE")
                 .help("Tectonic plate GeoJSON feed."))
        .arg(Arg::new("fault-lines")
                 .long("fault-lines")
                 .action(ArgAction::SetTrue)
                 .help("Show the fault line overlay when the map opens."))
        .arg(Arg::new("verbose")
                 .short('v')
                 .long("verbose")
                 .action(ArgAction::Count)
                 .help("More logging (-v debug, -vv trace)."))
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn apply_overrides(config: &mut MapConfig, matches: &ArgMatches) {
    if let Some(output) = matches.get_one::<String>("output") {
        config.map.output = output.clone();
    }
    if let Some(token) = matches.get_one::<String>("token") {
        config.tiles.access_token = Some(token.clone());
    }
    if let Some(url) = matches.get_one::<String>("earthquakes") {
        config.feeds.earthquakes = url.clone();
    }
    if let Some(url) = matches.get_one::<String>("plates") {
        config.feeds.plates = url.clone();
    }
    if matches.get_flag("fault-lines") {
        config.overlays.show_fault_lines = true;
    }
}

async fn run(matches: ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<String>("input") {
        Some(path) => {
            MapConfig::load_from_path(path)
                .with_context(|| format!("Unable to open configuration file: {}", path))?
        }
        None => MapConfig::default(),
    };
    apply_overrides(&mut config, &matches);
    config.validate()?;
    if config.access_token().is_empty() {
        info!("no access token configured, base layer tiles will not load");
    }

    let view = quakemap::build_map(&config).await?;
    let format = match matches.get_one::<String>("format") {
        Some(name) => name.parse::<OutputFormat>().map_err(|e| anyhow!(e))?,
        None => OutputFormat::from_path(&config.map.output),
    };
    write_view(&view, &config.map.output, format)
        .with_context(|| format!("Unable to write map to {}", config.map.output))?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));
    if let Err(err) = run(matches).await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}
