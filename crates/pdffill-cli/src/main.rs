mod cli;
mod fields_cmd;
mod fill_cmd;
mod shared;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Fill {
            ref file,
            ref values,
            ref fields,
            scale,
            analysis_width,
            analysis_height,
            font_size,
            lock,
            overlay_only,
            ref output,
            ref report,
        } => fill_cmd::run(&fill_cmd::FillArgs {
            file,
            values,
            fields: fields.as_deref(),
            scale,
            analysis_size: analysis_width.zip(analysis_height),
            font_size,
            lock,
            overlay_only,
            output: output.as_deref(),
            report,
        }),
        cli::Commands::Fields { ref file, ref format } => fields_cmd::run(file, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
