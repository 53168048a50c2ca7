use crate::hibob::HibobConfig;
use crate::prelude::*;
use clap::Parser;

mod error;
mod hibob;
mod prelude;
mod serve;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Render HiBob job listings and job details as embeddable HTML blocks"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// HiBob API base URL
    #[clap(long, env = "HIBOB_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Language hint sent as preferredLanguage
    #[clap(long, env = "HIBOB_LANGUAGE", global = true)]
    language: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "HIBOB_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Render the job listing block
    Listing(crate::hibob::listing::ListingOptions),

    /// Render the job detail block
    Detail(crate::hibob::detail::DetailOptions),

    /// Serve both blocks over HTTP for embedding
    Serve(crate::serve::ServeOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let config = HibobConfig::from_env()
        .with_overrides(app.global.base_url.clone(), app.global.language.clone());

    match app.command {
        SubCommands::Listing(options) => crate::hibob::listing::handler(options, config).await,
        SubCommands::Detail(options) => crate::hibob::detail::handler(options, config).await,
        SubCommands::Serve(options) => crate::serve::run(options, config, app.global.verbose).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
