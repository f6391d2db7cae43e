//! Analysis Service - the orchestration facade.
//!
//! One entry point per product capability: health, single-document insight,
//! multi-document comparison, workspace chat, and focused document chat.
//! Each operation builds its prompt from the given context, dispatches it,
//! and shapes the provider's text into the operation's result type.
//!
//! Structured operations never fail on model output: a response that cannot
//! be parsed degrades into the documented fallback shapes. The only error
//! any operation returns is [`DispatchError::AllProvidersUnavailable`].

use tracing::debug;

use crate::application::dispatcher::{CompletionDispatcher, DispatchError};
use crate::application::health::HealthStatus;
use crate::domain::comparison::{parse_comparison, ComparisonReport};
use crate::domain::context::{AnalysisContext, ConversationTurn, WorkspaceContext};
use crate::domain::insight::{parse_insight, DocumentInsight};
use crate::domain::prompts;
use crate::ports::CompletionRequest;

/// Fixed user turn for structured single-document analysis.
const INSIGHT_REQUEST: &str =
    "Analiza el documento según las instrucciones y responde únicamente con el JSON solicitado.";

/// Fixed user turn for structured comparison.
const COMPARISON_REQUEST: &str =
    "Compara los documentos según las instrucciones y responde únicamente con el JSON solicitado.";

/// Orchestrates document analysis over the configured AI providers.
pub struct AnalysisService {
    dispatcher: CompletionDispatcher,
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService").finish_non_exhaustive()
    }
}

impl AnalysisService {
    /// Creates a service over the given dispatcher.
    pub fn new(dispatcher: CompletionDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Probes provider availability. Never fails; always pings live.
    pub async fn check_health(&self) -> HealthStatus {
        self.dispatcher.check_health().await
    }

    /// Analyzes one document.
    ///
    /// Without a question the model is asked for the structured insight
    /// shape and the answer is parsed leniently into
    /// [`DocumentInsight::Structured`]. With a question the exchange is
    /// free-form: the focused-chat prompt carries the document and the
    /// question becomes the single user turn, returned as
    /// [`DocumentInsight::Markdown`] without post-processing.
    pub async fn document_insights(
        &self,
        context: &AnalysisContext,
        question: Option<&str>,
    ) -> Result<DocumentInsight, DispatchError> {
        debug!(
            file = %context.file_name,
            kind = %context.document_kind,
            question = question.is_some(),
            "requesting document insights"
        );

        match question {
            None => {
                let request = CompletionRequest::new(prompts::document_insight_prompt(context))
                    .with_turn(crate::domain::context::TurnRole::User, INSIGHT_REQUEST);
                let raw = self.dispatcher.dispatch(request).await?;
                Ok(DocumentInsight::Structured(parse_insight(&raw)))
            }
            Some(question) => {
                let request = CompletionRequest::new(prompts::document_chat_prompt(context))
                    .with_turn(crate::domain::context::TurnRole::User, question);
                let raw = self.dispatcher.dispatch(request).await?;
                Ok(DocumentInsight::Markdown(raw))
            }
        }
    }

    /// Compares documents and always returns the structured report.
    ///
    /// An optional question does not change the output shape; it is folded
    /// into the prompt as an emphasis the comparison should dwell on.
    pub async fn comparison_insights(
        &self,
        contexts: &[AnalysisContext],
        question: Option<&str>,
    ) -> Result<ComparisonReport, DispatchError> {
        debug!(
            documents = contexts.len(),
            emphasis = question.is_some(),
            "requesting comparison insights"
        );

        let labels: Vec<String> = contexts.iter().map(|c| c.label().to_string()).collect();

        let request = CompletionRequest::new(prompts::comparison_prompt(contexts, question))
            .with_turn(crate::domain::context::TurnRole::User, COMPARISON_REQUEST);
        let raw = self.dispatcher.dispatch(request).await?;

        Ok(parse_comparison(&raw, &labels))
    }

    /// Workspace-wide conversation. The reply is Spanish markdown, verbatim.
    pub async fn chat(
        &self,
        workspace: &WorkspaceContext,
        turns: &[ConversationTurn],
    ) -> Result<String, DispatchError> {
        debug!(
            workspace = %workspace.name,
            documents = workspace.documents.len(),
            turns = turns.len(),
            "dispatching workspace chat"
        );

        let request = CompletionRequest::new(prompts::workspace_chat_prompt(workspace))
            .with_turns(turns.to_vec());
        self.dispatcher.dispatch(request).await
    }

    /// Conversation focused on a single document. Reply returned verbatim.
    pub async fn chat_about_document(
        &self,
        context: &AnalysisContext,
        turns: &[ConversationTurn],
    ) -> Result<String, DispatchError> {
        debug!(
            file = %context.file_name,
            turns = turns.len(),
            "dispatching focused document chat"
        );

        let request = CompletionRequest::new(prompts::document_chat_prompt(context))
            .with_turns(turns.to_vec());
        self.dispatcher.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiProvider, MockError};
    use crate::domain::context::{DocumentKind, TurnRole};
    use std::sync::Arc;

    fn service_over(provider: MockAiProvider) -> AnalysisService {
        AnalysisService::new(CompletionDispatcher::new(Arc::new(provider)))
    }

    fn pliego_context() -> AnalysisContext {
        AnalysisContext::new(
            DocumentKind::Pliego,
            "Objeto: adquisición de equipos informáticos para la entidad contratante.",
            "Ecuador",
            "pliego_equipos.pdf",
        )
    }

    mod document_insights {
        use super::*;

        #[tokio::test]
        async fn structured_mode_parses_model_json() {
            let provider = MockAiProvider::new().with_response(
                r#"```json
{"summary":"Pliego para adquisición de equipos.","key_findings":["Plazo de 30 días"],"recommendations":["Verificar el presupuesto"],"risk_assessment":{"level":"low","score":2,"factors":["Proceso estándar"]}}
```"#,
            );
            let service = service_over(provider.clone());

            let insight = service
                .document_insights(&pliego_context(), None)
                .await
                .unwrap();

            match insight {
                DocumentInsight::Structured(report) => {
                    assert_eq!(report.summary, "Pliego para adquisición de equipos.");
                    assert_eq!(report.key_findings, vec!["Plazo de 30 días"]);
                    assert_eq!(report.risk.score, 2);
                }
                DocumentInsight::Markdown(_) => panic!("expected structured insight"),
            }

            let calls = provider.get_calls();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].system_prompt.contains("Pliego de condiciones"));
            assert_eq!(calls[0].turns.len(), 1);
            assert_eq!(calls[0].turns[0].content, INSIGHT_REQUEST);
        }

        #[tokio::test]
        async fn unparseable_response_degrades_to_fallback() {
            let raw = "El modelo respondió con prosa en lugar de JSON.";
            let provider = MockAiProvider::new().with_response(raw);
            let service = service_over(provider);

            let insight = service
                .document_insights(&pliego_context(), None)
                .await
                .unwrap();

            match insight {
                DocumentInsight::Structured(report) => {
                    assert_eq!(report.summary, raw);
                    assert!(!report.key_findings.is_empty());
                }
                DocumentInsight::Markdown(_) => panic!("expected structured insight"),
            }
        }

        #[tokio::test]
        async fn question_mode_returns_markdown_verbatim() {
            let provider =
                MockAiProvider::new().with_response("## Garantías\n\nEl pliego exige dos.");
            let service = service_over(provider.clone());

            let insight = service
                .document_insights(&pliego_context(), Some("¿Qué garantías exige?"))
                .await
                .unwrap();

            match insight {
                DocumentInsight::Markdown(text) => {
                    assert_eq!(text, "## Garantías\n\nEl pliego exige dos.");
                }
                DocumentInsight::Structured(_) => panic!("expected markdown insight"),
            }

            let calls = provider.get_calls();
            assert!(calls[0].system_prompt.contains("Documento en foco"));
            assert_eq!(calls[0].turns.len(), 1);
            assert_eq!(calls[0].turns[0].role, TurnRole::User);
            assert_eq!(calls[0].turns[0].content, "¿Qué garantías exige?");
        }

        #[tokio::test]
        async fn no_providers_surfaces_dispatch_error() {
            let provider = MockAiProvider::new().with_ping_error(MockError::Unreachable {
                message: "down".to_string(),
            });
            let service = service_over(provider.clone());

            let result = service.document_insights(&pliego_context(), None).await;

            assert!(matches!(
                result,
                Err(DispatchError::AllProvidersUnavailable { .. })
            ));
            assert_eq!(provider.call_count(), 0);
        }
    }

    mod comparison_insights {
        use super::*;

        fn propuestas() -> Vec<AnalysisContext> {
            vec![
                AnalysisContext::new(
                    DocumentKind::Propuesta,
                    "Oferta por USD 95.000, plazo de 60 días.",
                    "Ecuador",
                    "oferta_a.pdf",
                ),
                AnalysisContext::new(
                    DocumentKind::Propuesta,
                    "Oferta por USD 99.500, plazo de 45 días.",
                    "Ecuador",
                    "oferta_b.pdf",
                ),
            ]
        }

        #[tokio::test]
        async fn parses_structured_comparison() {
            let provider = MockAiProvider::new().with_response(
                r#"{"summary":"Ambas ofertas cumplen.","strengths":{"oferta_a.pdf":["Mejor precio"],"oferta_b.pdf":["Menor plazo"]},"weaknesses":{"oferta_a.pdf":["Plazo largo"],"oferta_b.pdf":["Precio mayor"]},"recommendation":{"preferred":"oferta_b.pdf","reasoning":"El plazo pesa más.","improvements":["Negociar precio"]},"risk_matrix":{"oferta_a.pdf":{"legal":3,"financial":4,"operational":5},"oferta_b.pdf":{"legal":3,"financial":5,"operational":3}}}"#,
            );
            let service = service_over(provider.clone());

            let report = service
                .comparison_insights(&propuestas(), None)
                .await
                .unwrap();

            assert_eq!(report.summary, "Ambas ofertas cumplen.");
            assert_eq!(report.recommendation.preferred, "oferta_b.pdf");
            assert_eq!(report.risk_matrix["oferta_a.pdf"].financial, 4);

            let calls = provider.get_calls();
            assert!(calls[0].system_prompt.contains("oferta_a.pdf"));
            assert_eq!(calls[0].turns[0].content, COMPARISON_REQUEST);
        }

        #[tokio::test]
        async fn question_becomes_prompt_emphasis_not_shape_change() {
            let provider = MockAiProvider::new().with_response("prosa sin estructura");
            let service = service_over(provider.clone());

            let report = service
                .comparison_insights(&propuestas(), Some("¿Cuál tiene mejor garantía?"))
                .await
                .unwrap();

            // Output is still the structured report, degraded to fallbacks.
            assert_eq!(report.summary, "prosa sin estructura");
            assert_eq!(report.recommendation.preferred, "oferta_a.pdf");

            let calls = provider.get_calls();
            assert!(calls[0]
                .system_prompt
                .contains("¿Cuál tiene mejor garantía?"));
        }
    }

    mod chat {
        use super::*;
        use crate::domain::context::DocumentOverview;

        #[tokio::test]
        async fn workspace_chat_passes_turns_through() {
            let provider = MockAiProvider::new().with_response("Claro, el plazo es de 30 días.");
            let service = service_over(provider.clone());

            let workspace = WorkspaceContext::new("Licitación hospital", "Ecuador")
                .with_document(DocumentOverview::new(
                    "pliego.pdf",
                    DocumentKind::Pliego,
                    "Contenido del pliego.",
                ));
            let turns = vec![
                ConversationTurn::user("¿Cuál es el plazo?"),
                ConversationTurn::assistant("Déjame revisar."),
                ConversationTurn::user("Gracias."),
            ];

            let reply = service.chat(&workspace, &turns).await.unwrap();

            assert_eq!(reply, "Claro, el plazo es de 30 días.");

            let calls = provider.get_calls();
            assert!(calls[0].system_prompt.contains("Licitación hospital"));
            assert_eq!(calls[0].turns.len(), 3);
            assert_eq!(calls[0].turns[1].role, TurnRole::Assistant);
        }

        #[tokio::test]
        async fn focused_chat_uses_document_prompt() {
            let provider = MockAiProvider::new().with_response("La multa es del 1 por mil diario.");
            let service = service_over(provider.clone());

            let turns = vec![ConversationTurn::user("¿Qué multas contempla?")];
            let reply = service
                .chat_about_document(&pliego_context(), &turns)
                .await
                .unwrap();

            assert_eq!(reply, "La multa es del 1 por mil diario.");

            let calls = provider.get_calls();
            assert!(calls[0].system_prompt.contains("Documento en foco"));
            assert!(calls[0].system_prompt.contains("pliego_equipos.pdf"));
        }
    }

    #[tokio::test]
    async fn health_delegates_to_dispatcher() {
        let provider = MockAiProvider::named("openai", "gpt-4o");
        let service = service_over(provider);

        let status = service.check_health().await;

        assert!(status.is_healthy());
        assert_eq!(status.preferred_provider, "openai");
    }
}
