use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tuoyu::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` and friends exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_level = if global.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Schema(cmd) => tuoyu::cli::commands::schema::run(cmd, &global),
        Commands::Validate(args) => tuoyu::cli::commands::validate::run(args, &global),
        Commands::Label(args) => tuoyu::cli::commands::label::run(args, &global),
        Commands::Report(args) => tuoyu::cli::commands::report::run(args, &global),
        Commands::Search(cmd) => tuoyu::cli::commands::search::run(cmd, &global),
        Commands::Fill(args) => tuoyu::cli::commands::fill::run(args, &global),
        Commands::Config(cmd) => tuoyu::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => tuoyu::cli::commands::completions::run(args),
    }
}
