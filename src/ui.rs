//! Terminal input collection, busy indicator and result rendering.

use crate::api::{InputError, OptionCount, RunError, RunReport, Stage, StageObserver};
use console::{style, Term};
use copypasta::{ClipboardContext, ClipboardProvider};
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use spinners::{Spinner, Spinners};
use std::sync::Mutex;

/// The four inputs of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub credential: String,
    pub model: String,
    pub question: String,
    pub count: OptionCount,
}

impl AskRequest {
    /// Builds a request, rejecting an empty question.
    pub fn new(
        credential: impl Into<String>,
        model: impl Into<String>,
        question: impl Into<String>,
        count: OptionCount,
    ) -> Result<Self, InputError> {
        let question = validate_question(&question.into())?;
        Ok(Self {
            credential: credential.into(),
            model: model.into(),
            question,
            count,
        })
    }
}

/// Values already known before the form is shown (from flags or a previous round).
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub credential: Option<String>,
    pub model: Option<String>,
    pub question: Option<String>,
    pub count: Option<OptionCount>,
}

/// What the shell is doing. Owned by the command driving the form.
#[derive(Debug)]
pub enum ShellState {
    Idle,
    Running,
    Done(RunReport),
    Failed(String),
}

impl ShellState {
    /// Enters `Running`, dropping whatever a previous submission left behind.
    pub fn start(&mut self) {
        *self = ShellState::Running;
    }

    /// Leaves `Running` for `Done` or `Failed` according to the run's outcome.
    pub fn finish(&mut self, outcome: Result<RunReport, RunError>) {
        *self = match outcome {
            Ok(report) => ShellState::Done(report),
            Err(e) => ShellState::Failed(e.to_string()),
        };
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ShellState::Running)
    }
}

/// How a finished run is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// Print the answer options and the critique before the answer.
    pub show_work: bool,
    /// Print the whole report as JSON.
    pub json: bool,
    /// Copy the final answer to the clipboard.
    pub copy: bool,
}

pub fn validate_question(question: &str) -> Result<String, InputError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(InputError::EmptyQuestion);
    }
    Ok(question.to_string())
}

/// Checks a preselected model against the configured list.
pub fn resolve_model(models: &[String], preset: &str) -> Result<String, String> {
    models
        .iter()
        .find(|m| m.as_str() == preset)
        .cloned()
        .ok_or_else(|| {
            format!(
                "Unknown model '{}'. Available models: {}",
                preset,
                models.join(", ")
            )
        })
}

pub fn prompt_credential(preset: Option<&str>) -> Result<String, String> {
    if let Some(key) = preset {
        return Ok(key.to_string());
    }
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| format!("API key error: {}", e))
}

pub fn prompt_model(models: &[String], preset: Option<&str>) -> Result<String, String> {
    if let Some(model) = preset {
        return resolve_model(models, model);
    }
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select Model")
        .items(models)
        .default(0)
        .interact()
        .map_err(|e| format!("Model selection error: {}", e))?;
    Ok(models[index].clone())
}

pub fn prompt_question() -> Result<String, String> {
    let question: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Ask a question")
        .validate_with(|q: &String| validate_question(q).map(|_| ()))
        .interact_text()
        .map_err(|e| format!("Question error: {}", e))?;
    Ok(question.trim().to_string())
}

pub fn prompt_count() -> Result<OptionCount, String> {
    let count: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Select number of answers")
        .default(OptionCount::MIN)
        .validate_with(|n: &u32| OptionCount::try_from(*n).map(|_| ()))
        .interact_text()
        .map_err(|e| format!("Number of answers error: {}", e))?;
    OptionCount::try_from(count).map_err(|e| e.to_string())
}

/// Prompts for every input not already given in `presets`.
pub fn collect_request(models: &[String], presets: &Presets) -> Result<AskRequest, String> {
    let credential = prompt_credential(presets.credential.as_deref())?;
    let model = prompt_model(models, presets.model.as_deref())?;
    let question = match &presets.question {
        Some(q) => q.clone(),
        None => prompt_question()?,
    };
    let count = match presets.count {
        Some(count) => count,
        None => prompt_count()?,
    };
    AskRequest::new(credential, model, question, count).map_err(|e| e.to_string())
}

/// Busy indicator that follows the orchestrator's stages.
pub struct SpinnerProgress {
    spinner: Mutex<Option<Spinner>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Replaces the running spinner on the same terminal line.
    fn show(&self, message: String) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(mut old) = slot.take() {
                old.stop();
                Term::stdout().clear_line().ok();
            }
            *slot = Some(Spinner::new(Spinners::Dots9, message));
        }
    }

    fn finish(&self, message: String) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(mut sp) = slot.take() {
                sp.stop_with_message(message);
            }
        }
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(mut sp) = slot.take() {
                sp.stop_with_newline();
            }
        }
    }
}

impl StageObserver for SpinnerProgress {
    fn on_stage_start(&self, stage: Stage) {
        let message = match stage {
            Stage::Generation => "Generating answer options...".to_string(),
            Stage::Critique => "Researching the answer options...".to_string(),
            Stage::Resolution => "Resolving the best answer...".to_string(),
        };
        self.show(message);
    }

    fn on_option_generated(&self, index: u32, total: u32) {
        if index < total {
            self.show(format!("Generating answer option {}/{}...", index + 1, total));
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        let message = match stage {
            Stage::Generation => "✔ Answer options generated.",
            Stage::Critique => "✔ Critique received.",
            Stage::Resolution => "✔ Response received.",
        };
        self.finish(message.to_string());
    }
}

/// Prints a finished state. A failed state becomes the returned error.
pub fn render(state: &ShellState, display: DisplayOptions) -> Result<(), String> {
    let report = match state {
        ShellState::Done(report) => report,
        ShellState::Failed(message) => return Err(message.clone()),
        ShellState::Idle | ShellState::Running => return Ok(()),
    };

    if display.json {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| format!("Serialize error: {}", e))?;
        println!("{}", json);
    } else {
        if display.show_work {
            for option in &report.options {
                println!(
                    "\n{}",
                    style(format!("Answer Option {}:", option.index)).cyan().bold()
                );
                println!("{}", option.text);
            }
            println!("\n{}", style("Critique:").yellow().bold());
            println!("{}", report.critique);
        }
        println!("\n{}", style("Answer:").green().bold());
        println!("{}", report.answer);
    }

    if display.copy {
        let mut clipboard =
            ClipboardContext::new().map_err(|e| format!("Clipboard error: {}", e))?;
        clipboard
            .set_contents(report.answer.clone())
            .map_err(|e| format!("Clipboard set error: {}", e))?;
        eprintln!("{} answer copied to clipboard", style("•").green().bold());
    }
    Ok(())
}
