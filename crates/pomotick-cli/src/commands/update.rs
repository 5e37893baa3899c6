use clap::Subcommand;
use pomotick_core::{Config, UpdateChecker};

#[derive(Subcommand)]
pub enum UpdateAction {
    /// Ask the release feed for a newer version
    Check {
        /// Override the configured feed URL
        #[arg(long)]
        feed: Option<String>,
    },
}

pub fn run(action: UpdateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UpdateAction::Check { feed } => {
            let feed = match feed {
                Some(feed) => feed,
                None => Config::load()?.updates.feed_url,
            };
            let checker = UpdateChecker::new(&feed, env!("CARGO_PKG_VERSION"))?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let status = runtime.block_on(checker.check())?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
