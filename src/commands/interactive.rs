use crate::api::AgentConfig;
use crate::cli::SessionArgs;
use crate::commands::ask::submit;
use crate::core::config::Settings;
use crate::ui::{self, AskRequest, DisplayOptions};
use console::style;

/// Ask questions in a loop, reusing the API key and model between rounds.
pub async fn run(settings: &Settings, session: SessionArgs) -> Result<(), String> {
    let config = open_session(settings, &session)?;

    println!("Entering interactive mode. Type 'exit' or 'quit' to leave.");
    loop {
        let question = ui::prompt_question()?;
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        let count = ui::prompt_count()?;

        let request = match AskRequest::new(config.credential(), config.model(), question, count) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("• {}", e);
                continue;
            }
        };

        let state = submit(settings, &request, DisplayOptions::default()).await;
        if let Err(e) = ui::render(&state, DisplayOptions::default()) {
            eprintln!("{} {}", style("•").red().bold(), e);
        }
    }
    Ok(())
}

/// Collects and validates the API key and model for the whole session.
/// A blank key ends the session before any question is asked.
fn open_session(settings: &Settings, session: &SessionArgs) -> Result<AgentConfig, String> {
    let credential = ui::prompt_credential(session.api_key.as_deref())?;
    let model = ui::prompt_model(&settings.models, session.model.as_deref())?;
    AgentConfig::new(credential, model).map_err(|e| e.to_string())
}
