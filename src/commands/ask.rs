use crate::api::{
    AgentConfig, CompletionService, ConfigError, LlmService, NoProgress, Orchestrator, RunError,
    RunReport, StageObserver,
};
use crate::cli::AskArgs;
use crate::core::config::Settings;
use crate::ui::{self, AskRequest, DisplayOptions, Presets, ShellState, SpinnerProgress};
use tracing::info;

/// Answers one question: collect the inputs, run the three stages, print the result.
pub async fn run(settings: &Settings, args: AskArgs) -> Result<(), String> {
    let presets = Presets {
        credential: args.session.api_key,
        model: args.session.model,
        question: args.question,
        count: args.count,
    };
    let display = DisplayOptions {
        show_work: args.show_work,
        json: args.json,
        copy: args.copy,
    };

    let request = ui::collect_request(&settings.models, &presets)?;
    let state = submit(settings, &request, display).await;
    ui::render(&state, display)
}

/// Runs one submission against the configured backend and returns the final state.
pub(crate) async fn submit(
    settings: &Settings,
    request: &AskRequest,
    display: DisplayOptions,
) -> ShellState {
    let mut state = ShellState::Idle;
    state.start();
    info!(model = %request.model, count = request.count.get(), "Submitting question");

    let connect = |config: &AgentConfig| {
        LlmService::connect(config, &settings.backend, settings.base_url.as_deref())
    };
    let outcome = if display.json {
        handle(request, settings, connect, &NoProgress).await
    } else {
        let spinner = SpinnerProgress::new();
        handle(request, settings, connect, &spinner).await
    };

    state.finish(outcome);
    state
}

/// Stateless request handler: validates the configuration, connects the
/// service and runs a fresh orchestrator.
///
/// A blank credential fails before `connect` is called, so no request is sent.
pub async fn handle<S, F>(
    request: &AskRequest,
    settings: &Settings,
    connect: F,
    observer: &dyn StageObserver,
) -> Result<RunReport, RunError>
where
    S: CompletionService,
    F: FnOnce(&AgentConfig) -> Result<S, ConfigError>,
{
    let config = AgentConfig::new(request.credential.as_str(), request.model.as_str())?;
    let service = connect(&config)?;

    let orchestrator = Orchestrator::new(config, service)
        .with_sampling(settings.sampling)
        .with_prompts(settings.prompts.clone());

    Ok(orchestrator
        .run(&request.question, request.count, observer)
        .await?)
}
