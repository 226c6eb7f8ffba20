//! The three-stage generate, critique, resolve workflow.

use serde::Serialize;
use tracing::{debug, info};

use super::agent::{AgentConfig, OptionCount};
use super::error::ServiceError;
use super::llm_bridge::{CompletionRequest, CompletionService, Sampling};
use super::progress::{NoProgress, Stage, StageObserver};
use super::prompts::Prompts;
use super::transcript::Transcript;

/// A candidate answer produced during the generation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    /// 1-based position in generation order.
    pub index: u32,
    pub text: String,
}

impl AnswerOption {
    pub fn label(&self) -> String {
        format!("Answer Option {}: {}", self.index, self.text)
    }
}

/// Everything a run produced, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub question: String,
    pub model: String,
    pub options: Vec<AnswerOption>,
    pub critique: String,
    pub answer: String,
}

/// Drives a completion service through the generate, critique and resolve stages.
///
/// Holds no conversation state between calls; every run starts from a fresh
/// transcript containing only the question.
pub struct Orchestrator<S> {
    config: AgentConfig,
    service: S,
    sampling: Sampling,
    prompts: Prompts,
}

impl<S: CompletionService> Orchestrator<S> {
    pub fn new(config: AgentConfig, service: S) -> Self {
        Self {
            config,
            service,
            sampling: Sampling::default(),
            prompts: Prompts::default(),
        }
    }

    /// Overrides the response length cap and temperature.
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Overrides the critique and resolution templates.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs all three stages and returns the improved answer.
    pub async fn execute(&self, question: &str, count: OptionCount) -> Result<String, ServiceError> {
        Ok(self.run(question, count, &NoProgress).await?.answer)
    }

    /// Runs all three stages, reporting progress, and returns every intermediate result.
    pub async fn run(
        &self,
        question: &str,
        count: OptionCount,
        observer: &dyn StageObserver,
    ) -> Result<RunReport, ServiceError> {
        info!(model = %self.config.model(), count = count.get(), "Starting run");

        observer.on_stage_start(Stage::Generation);
        let (_, options) = self.generate_answers(question, count, observer).await?;
        observer.on_stage_complete(Stage::Generation);

        observer.on_stage_start(Stage::Critique);
        let (critique_transcript, critique) = self.critique(question, &options).await?;
        observer.on_stage_complete(Stage::Critique);

        observer.on_stage_start(Stage::Resolution);
        let answer = self
            .resolve(critique_transcript, &critique, question, &options)
            .await?;
        observer.on_stage_complete(Stage::Resolution);

        info!("Run complete");
        Ok(RunReport {
            question: question.to_string(),
            model: self.config.model().to_string(),
            options,
            critique,
            answer,
        })
    }

    /// Generates `count` answer options one after another.
    ///
    /// Each request carries every previous option as an assistant turn, so
    /// request `i` has exactly `i` turns. Returns the grown transcript.
    pub async fn generate_answers(
        &self,
        question: &str,
        count: OptionCount,
        observer: &dyn StageObserver,
    ) -> Result<(Transcript, Vec<AnswerOption>), ServiceError> {
        info!("Stage: generation");
        let mut transcript = Transcript::from_question(question);
        let mut options = Vec::with_capacity(count.get() as usize);

        for index in 1..=count.get() {
            let text = self.send(&transcript).await?;
            transcript = transcript.with_assistant(text.clone());
            options.push(AnswerOption { index, text });
            observer.on_option_generated(index, count.get());
        }

        Ok((transcript, options))
    }

    /// Asks the service to list the flaws of every option.
    ///
    /// The request has three turns: the question, the labelled options and
    /// the researcher instruction.
    pub async fn critique(
        &self,
        question: &str,
        options: &[AnswerOption],
    ) -> Result<(Transcript, String), ServiceError> {
        info!("Stage: critique");
        let answers = join_labels(options);
        let instruction = self
            .prompts
            .render_critique(question, &answers, options.len() as u32);

        let transcript = Transcript::from_question(question)
            .with_assistant(answers)
            .with_user(instruction);
        let critique = self.send(&transcript).await?;

        Ok((transcript, critique))
    }

    /// Asks the service to improve the option the critique favoured.
    ///
    /// Extends the critique transcript with the critique text and the
    /// resolver instruction, for five turns in total.
    pub async fn resolve(
        &self,
        critique_transcript: Transcript,
        critique: &str,
        question: &str,
        options: &[AnswerOption],
    ) -> Result<String, ServiceError> {
        info!("Stage: resolution");
        let instruction = self.prompts.render_resolution(
            question,
            &join_labels(options),
            options.len() as u32,
        );

        let transcript = critique_transcript
            .with_assistant(critique)
            .with_user(instruction);
        self.send(&transcript).await
    }

    async fn send(&self, transcript: &Transcript) -> Result<String, ServiceError> {
        debug!(
            turns = transcript.len(),
            chars = transcript.char_count(),
            "Requesting completion"
        );
        let request = CompletionRequest::new(self.config.model(), transcript, self.sampling);
        self.service.complete(request).await
    }
}

fn join_labels(options: &[AnswerOption]) -> String {
    options
        .iter()
        .map(AnswerOption::label)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transcript::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every request with "reply N" and records what it was sent.
    #[derive(Default)]
    struct CountingService {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionService for CountingService {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            Ok(format!("reply {}", requests.len()))
        }
    }

    fn orchestrator(service: &CountingService) -> Orchestrator<&CountingService> {
        let config = AgentConfig::new("sk-test", "gpt-4").unwrap();
        Orchestrator::new(config, service)
    }

    fn options(n: u32) -> Vec<AnswerOption> {
        (1..=n)
            .map(|index| AnswerOption {
                index,
                text: format!("option {}", index),
            })
            .collect()
    }

    #[test]
    fn label_is_one_based() {
        let option = AnswerOption {
            index: 1,
            text: "Paris".to_string(),
        };
        assert_eq!(option.label(), "Answer Option 1: Paris");
    }

    #[tokio::test]
    async fn generation_sees_previous_options() {
        let service = CountingService::default();
        let count = OptionCount::try_from(4).unwrap();

        let (transcript, options) = orchestrator(&service)
            .generate_answers("q", count, &NoProgress)
            .await
            .unwrap();

        assert_eq!(options.len(), 4);
        assert_eq!(transcript.len(), 5);
        let requests = service.requests.lock().unwrap();
        let sizes: Vec<usize> = requests.iter().map(|r| r.turns.len()).collect();
        assert_eq!(sizes, vec![1, 2, 3, 4]);
        // Raw text is appended; the label only appears in the joined options.
        assert_eq!(requests[3].turns[3].text, "reply 3");
        assert_eq!(requests[3].turns[3].role, Role::Assistant);
    }

    #[tokio::test]
    async fn critique_request_has_three_turns() {
        let service = CountingService::default();

        let (transcript, critique) = orchestrator(&service)
            .critique("q", &options(5))
            .await
            .unwrap();

        assert_eq!(transcript.len(), 3);
        assert_eq!(critique, "reply 1");
        let turns = &transcript.turns()[1];
        assert_eq!(turns.role, Role::Assistant);
        assert_eq!(
            turns.text,
            "Answer Option 1: option 1\nAnswer Option 2: option 2\nAnswer Option 3: option 3\nAnswer Option 4: option 4\nAnswer Option 5: option 5"
        );
        assert!(transcript.turns()[2].text.contains("the 5 answer options"));
    }

    #[tokio::test]
    async fn resolution_request_has_five_turns() {
        let service = CountingService::default();
        let orchestrator = orchestrator(&service);
        let opts = options(3);
        let (transcript, critique) = orchestrator.critique("q", &opts).await.unwrap();

        let answer = orchestrator
            .resolve(transcript, &critique, "q", &opts)
            .await
            .unwrap();

        assert_eq!(answer, "reply 2");
        let requests = service.requests.lock().unwrap();
        assert_eq!(requests[1].turns.len(), 5);
        assert_eq!(requests[1].turns[3].text, "reply 1");
        assert_eq!(requests[1].turns[4].role, Role::User);
    }

    #[tokio::test]
    async fn sampling_is_forwarded() {
        let service = CountingService::default();
        let sampling = Sampling {
            max_tokens: 100,
            temperature: 0.9,
        };

        orchestrator(&service)
            .with_sampling(sampling)
            .execute("q", OptionCount::default())
            .await
            .unwrap();

        let requests = service.requests.lock().unwrap();
        assert!(requests
            .iter()
            .all(|r| r.max_tokens == 100 && r.temperature == 0.9 && r.choices == 1));
        assert!(requests.iter().all(|r| r.model == "gpt-4"));
    }

    #[tokio::test]
    async fn custom_prompts_are_used() {
        let service = CountingService::default();
        let prompts = Prompts {
            critique: "critique {{ count }}".to_string(),
            resolution: "resolve {{ question }}".to_string(),
        };

        orchestrator(&service)
            .with_prompts(prompts)
            .execute("why?", OptionCount::default())
            .await
            .unwrap();

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests[3].turns[2].text, "critique 3");
        assert_eq!(requests[4].turns[4].text, "resolve why?");
    }
}
