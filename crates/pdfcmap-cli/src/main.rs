mod cli;
mod decode_cmd;
mod info_cmd;
mod predefined_cmd;
mod shared;
mod tounicode_cmd;

use clap::Parser;
use cli::Cli;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        cli::Commands::Info {
            ref file,
            simple,
            ref format,
            ref limits,
        } => info_cmd::run(file, simple, format, &limits.to_load_options()),
        cli::Commands::Decode {
            ref file,
            ref hex,
            simple,
            ref assets,
            ref format,
            ref limits,
        } => decode_cmd::run(
            file,
            hex,
            simple,
            assets.as_deref(),
            format,
            &limits.to_load_options(),
        ),
        cli::Commands::Predefined {
            ref name,
            ref assets,
            ref format,
            ref limits,
        } => predefined_cmd::run(name, assets, format, &limits.to_load_options()),
        cli::Commands::Tounicode {
            ref file,
            ref format,
            ref limits,
        } => tounicode_cmd::run(file, format, &limits.to_load_options()),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
