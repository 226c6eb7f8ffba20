use crate::cli::Cmd;
use crate::core::config::Settings;

pub mod ask;
pub mod interactive;
pub mod models;

/// Dispatches the parsed command to the appropriate handler.
pub async fn dispatch(command: Cmd, settings: &Settings) -> Result<(), String> {
    match command {
        Cmd::Ask(args) => ask::run(settings, args).await,
        Cmd::Interactive(session) => interactive::run(settings, session).await,
        Cmd::Models => models::run(settings),
    }
}
