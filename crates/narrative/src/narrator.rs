use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use ledger::MetricsReport;
use serde::Deserialize;

use crate::{BriefingKind, GenerationError, KnowledgeBase, Prompt, TextGenerator, fallback};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    pub base_url: String,
    pub model: String,
    /// Upper bound for one generation call, in seconds.
    pub timeout_secs: u64,
    pub max_prompt_chars: usize,
    pub knowledge_dir: PathBuf,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            timeout_secs: 20,
            max_prompt_chars: 100_000,
            knowledge_dir: PathBuf::from("knowledge"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BriefingSource {
    Generated,
    Fallback { reason: String },
}

#[derive(Clone, Debug)]
pub struct Briefing {
    pub kind: BriefingKind,
    pub text: String,
    pub source: BriefingSource,
    pub generated_at: DateTime<Utc>,
}

impl Briefing {
    pub fn source_label(&self) -> &'static str {
        match self.source {
            BriefingSource::Generated => "generated",
            BriefingSource::Fallback { .. } => "fallback",
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.source {
            BriefingSource::Generated => None,
            BriefingSource::Fallback { reason } => Some(reason),
        }
    }
}

/// Extra context for one briefing.
#[derive(Clone, Copy, Debug)]
pub struct BriefingContext<'a> {
    /// Knowledge project whose notes are added to the prompt.
    pub project: Option<&'a str>,
    /// Whether the ledger figures go into the prompt.
    pub include_metrics: bool,
}

impl Default for BriefingContext<'_> {
    fn default() -> Self {
        Self {
            project: None,
            include_metrics: true,
        }
    }
}

/// Turns metrics into prose, through the generator when it answers in time
/// and through the fallback templates otherwise.
#[derive(Clone)]
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    knowledge: KnowledgeBase,
    timeout: Duration,
    max_prompt_chars: usize,
}

impl Narrator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &NarratorConfig) -> Self {
        Self {
            generator,
            knowledge: KnowledgeBase::new(&config.knowledge_dir),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            max_prompt_chars: config.max_prompt_chars,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Never fails: any generation error or timeout yields the fallback
    /// report for `kind`, with the reason recorded in the source.
    pub async fn compose(
        &self,
        kind: BriefingKind,
        report: &MetricsReport,
        context: BriefingContext<'_>,
    ) -> Briefing {
        let knowledge = context.project.and_then(|project| {
            self.knowledge
                .load_project(project)
                .inspect_err(|err| tracing::warn!(project, "knowledge not loaded: {err}"))
                .ok()
        });
        let prompt = Prompt::build(
            &kind,
            context.include_metrics.then_some(report),
            knowledge.as_deref(),
            self.max_prompt_chars,
        );

        let result = self.generate(&prompt).await;
        let (text, source) = match result {
            Ok(text) => (text, BriefingSource::Generated),
            Err(err) => {
                tracing::warn!(kind = kind.as_str(), "generation failed, using fallback: {err}");
                (
                    fallback::render(&kind, report),
                    BriefingSource::Fallback {
                        reason: err.to_string(),
                    },
                )
            }
        };

        Briefing {
            kind,
            text,
            source,
            generated_at: Utc::now(),
        }
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        if !self.generator.is_configured() {
            return Err(GenerationError::NotConfigured);
        }

        let text = tokio::time::timeout(self.timeout, self.generator.generate(prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        if text.trim().is_empty() {
            return Err(GenerationError::Malformed("empty reply".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{Generation, testing::sample_report};

    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct FakeGenerator {
        behavior: Behavior,
        seen: Mutex<Vec<Prompt>>,
    }

    impl FakeGenerator {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate<'a>(&'a self, prompt: &'a Prompt) -> Generation<'a> {
            self.seen.lock().unwrap().push(prompt.clone());
            Box::pin(async move {
                match self.behavior {
                    Behavior::Reply(text) => Ok(text.to_string()),
                    Behavior::Fail => Err(GenerationError::Status {
                        status: 529,
                        message: "overloaded".to_string(),
                    }),
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok("too late".to_string())
                    }
                }
            })
        }
    }

    struct Unconfigured;

    impl TextGenerator for Unconfigured {
        fn generate<'a>(&'a self, _prompt: &'a Prompt) -> Generation<'a> {
            Box::pin(async { Err(GenerationError::Transport("called".to_string())) })
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    fn config(timeout_secs: u64) -> NarratorConfig {
        NarratorConfig {
            timeout_secs,
            ..NarratorConfig::default()
        }
    }

    #[tokio::test]
    async fn uses_generated_text() {
        let generator = FakeGenerator::new(Behavior::Reply("All good."));
        let narrator = Narrator::new(generator.clone(), &config(5));

        let briefing = narrator
            .compose(BriefingKind::Daily, &sample_report(), BriefingContext::default())
            .await;

        assert_eq!(briefing.text, "All good.");
        assert_eq!(briefing.source, BriefingSource::Generated);
        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].user.contains("Net worth: R18,000.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_to_template() {
        let report = sample_report();
        let narrator = Narrator::new(FakeGenerator::new(Behavior::Hang), &config(2));

        let briefing = narrator
            .compose(BriefingKind::Daily, &report, BriefingContext::default())
            .await;

        assert_eq!(briefing.text, fallback::render(&BriefingKind::Daily, &report));
        assert_eq!(
            briefing.fallback_reason(),
            Some("generation timed out after 2 seconds")
        );
    }

    #[tokio::test]
    async fn service_error_falls_back() {
        let report = sample_report();
        let narrator = Narrator::new(FakeGenerator::new(Behavior::Fail), &config(5));

        let briefing = narrator
            .compose(BriefingKind::Business, &report, BriefingContext::default())
            .await;

        assert_eq!(briefing.source_label(), "fallback");
        assert_eq!(briefing.text, fallback::render(&BriefingKind::Business, &report));
    }

    #[tokio::test]
    async fn empty_reply_falls_back() {
        let narrator = Narrator::new(FakeGenerator::new(Behavior::Reply("  \n")), &config(5));
        let briefing = narrator
            .compose(BriefingKind::Progress, &sample_report(), BriefingContext::default())
            .await;
        assert_eq!(briefing.fallback_reason(), Some("malformed reply: empty reply"));
    }

    #[tokio::test]
    async fn unconfigured_generator_is_never_called() {
        let narrator = Narrator::new(Arc::new(Unconfigured), &config(5));
        let briefing = narrator
            .compose(
                BriefingKind::Query("status?".to_string()),
                &sample_report(),
                BriefingContext::default(),
            )
            .await;
        assert_eq!(briefing.fallback_reason(), Some("no API key configured"));
    }

    #[tokio::test]
    async fn project_knowledge_and_metrics_toggle() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("43v3r")).unwrap();
        std::fs::write(root.path().join("43v3r/pricing.md"), "Charge R4,881 a day.").unwrap();

        let generator = FakeGenerator::new(Behavior::Reply("ok"));
        let narrator = Narrator::new(
            generator.clone(),
            &NarratorConfig {
                knowledge_dir: root.path().to_path_buf(),
                ..config(5)
            },
        );

        narrator
            .compose(
                BriefingKind::Query("pricing?".to_string()),
                &sample_report(),
                BriefingContext {
                    project: Some("43v3r"),
                    include_metrics: false,
                },
            )
            .await;
        // Unknown project only loses the knowledge.
        narrator
            .compose(
                BriefingKind::Query("pricing?".to_string()),
                &sample_report(),
                BriefingContext {
                    project: Some("ghost"),
                    include_metrics: true,
                },
            )
            .await;

        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].user.contains("## Pricing\nCharge R4,881 a day."));
        assert!(!seen[0].user.contains("CURRENT LIF3 FINANCIAL STATUS"));
        assert!(!seen[1].user.contains("## Pricing"));
        assert!(seen[1].user.contains("CURRENT LIF3 FINANCIAL STATUS"));
    }
}
