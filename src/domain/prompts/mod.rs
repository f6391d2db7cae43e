//! System prompt builders for the four analysis operations.
//!
//! Pure functions from context to prompt text: same input, byte-identical
//! output, with no timestamps or randomness mixed in. Each builder stitches
//! together the analyst role, the country legal-framework block, the document
//! state (previews truncated to a fixed cap), registration validation when
//! present, the required output contract, and the mandatory Spanish output
//! language.
//!
//! Conversation history is NOT part of these prompts: it travels as provider
//! turns, and only the Gemini adapter flattens it into labeled text.

pub mod legal;

use std::fmt::Write;

use crate::domain::context::{AnalysisContext, RucValidation, WorkspaceContext};

/// Character cap for each document preview embedded in a prompt.
///
/// Counted in `char`s so multi-byte Spanish text never splits; long documents
/// are cut here to bound prompt size.
pub const DOCUMENT_PREVIEW_CHARS: usize = 1500;

/// Marker appended to a preview that was cut at the cap.
const TRUNCATION_MARKER: &str = "[... contenido truncado ...]";

const ANALYST_ROLE: &str = "Eres un analista experto en contratación pública y licitaciones en América Latina. \
Analizas pliegos de condiciones, propuestas y contratos para identificar requisitos, riesgos, \
inconsistencias y oportunidades de mejora, siempre con base en el texto de los documentos.";

const CHAT_ROLE: &str = "Eres el asistente de análisis de un espacio de trabajo de licitaciones. \
Respondes preguntas sobre los documentos del espacio usando exclusivamente la información \
disponible en ellos; cuando un dato no conste en los documentos, dilo explícitamente.";

const SPANISH_OUTPUT_CLAUSE: &str = "Responde siempre en español, sin importar el idioma de los documentos o de la pregunta.";

const INSIGHT_OUTPUT_CONTRACT: &str = r#"## Formato de respuesta

Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional y sin bloques de código, con esta estructura exacta:

{
  "summary": "resumen ejecutivo del documento",
  "key_findings": ["hallazgo relevante"],
  "recommendations": ["recomendación accionable"],
  "risk_assessment": {
    "level": "low|medium|high",
    "score": 5,
    "factors": ["factor que sustenta el riesgo"]
  }
}

El campo score es un entero entre 1 (riesgo mínimo) y 10 (riesgo máximo)."#;

const COMPARISON_OUTPUT_CONTRACT: &str = r#"## Formato de respuesta

Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional y sin bloques de código, con esta estructura exacta. Usa como clave de cada documento exactamente su nombre de archivo, tal como aparece arriba:

{
  "summary": "resumen comparativo",
  "strengths": { "<nombre de archivo>": ["fortaleza"] },
  "weaknesses": { "<nombre de archivo>": ["debilidad"] },
  "recommendation": {
    "preferred": "<nombre de archivo del documento recomendado>",
    "reasoning": "por qué se recomienda",
    "improvements": ["mejora sugerida"]
  },
  "risk_matrix": { "<nombre de archivo>": { "legal": 5, "financial": 5, "operational": 5 } }
}

Cada puntaje de la matriz de riesgos es un entero entre 1 (riesgo mínimo) y 10 (riesgo máximo)."#;

const CHAT_OUTPUT_CONTRACT: &str = r#"## Formato de respuesta

Responde en markdown claro: usa títulos cuando ayuden a organizar la respuesta, listas para enumeraciones y citas breves entre comillas cuando transcribas texto de un documento. Menciona siempre de qué documento proviene cada dato."#;

/// System prompt for structured single-document analysis.
pub fn document_insight_prompt(ctx: &AnalysisContext) -> String {
    let mut prompt = String::new();
    prompt.push_str(ANALYST_ROLE);
    prompt.push_str("\n\n");
    prompt.push_str(legal::legal_framework(&ctx.country));
    prompt.push_str("\n\n");
    push_document_block(&mut prompt, "## Documento a analizar", ctx);
    prompt.push('\n');
    prompt.push_str(INSIGHT_OUTPUT_CONTRACT);
    prompt.push_str("\n\n");
    prompt.push_str(SPANISH_OUTPUT_CLAUSE);
    prompt
}

/// System prompt for multi-document comparison.
///
/// `emphasis` is an optional caller question woven in as an extra instruction;
/// the output contract stays structured either way.
pub fn comparison_prompt(ctxs: &[AnalysisContext], emphasis: Option<&str>) -> String {
    let country = ctxs.first().map(|ctx| ctx.country.as_str()).unwrap_or("");

    let mut prompt = String::new();
    prompt.push_str(ANALYST_ROLE);
    prompt.push_str("\n\n");
    prompt.push_str(legal::legal_framework(country));
    prompt.push_str("\n\n## Documentos a comparar\n");

    for (index, ctx) in ctxs.iter().enumerate() {
        let _ = write!(prompt, "\n### Documento {}: {}", index + 1, ctx.file_name);
        let _ = write!(prompt, "\nTipo: {}", ctx.document_kind);
        if let Some(ruc) = &ctx.ruc {
            push_ruc_lines(&mut prompt, ruc);
        }
        let _ = write!(prompt, "\nContenido:\n{}\n", preview(&ctx.extracted_text));
    }

    if let Some(question) = emphasis {
        let _ = write!(prompt, "\nPresta especial atención a lo siguiente: {}\n", question);
    }

    prompt.push('\n');
    prompt.push_str(COMPARISON_OUTPUT_CONTRACT);
    prompt.push_str("\n\n");
    prompt.push_str(SPANISH_OUTPUT_CLAUSE);
    prompt
}

/// System prompt for workspace-wide chat.
pub fn workspace_chat_prompt(workspace: &WorkspaceContext) -> String {
    let mut prompt = String::new();
    prompt.push_str(CHAT_ROLE);
    prompt.push_str("\n\n");
    prompt.push_str(legal::legal_framework(&workspace.country));
    let _ = write!(prompt, "\n\n## Espacio de trabajo: {}\n", workspace.name);

    if workspace.documents.is_empty() {
        prompt.push_str("\nEl espacio de trabajo todavía no tiene documentos.\n");
    } else {
        for (index, doc) in workspace.documents.iter().enumerate() {
            let _ = write!(
                prompt,
                "\n### Documento {}: {} ({})\n{}\n",
                index + 1,
                doc.file_name,
                doc.kind,
                preview(&doc.extracted_text)
            );
        }
    }

    prompt.push('\n');
    prompt.push_str(CHAT_OUTPUT_CONTRACT);
    prompt.push_str("\n\n");
    prompt.push_str(SPANISH_OUTPUT_CLAUSE);
    prompt
}

/// System prompt for chat focused on a single document.
pub fn document_chat_prompt(ctx: &AnalysisContext) -> String {
    let mut prompt = String::new();
    prompt.push_str(CHAT_ROLE);
    prompt.push_str("\n\n");
    prompt.push_str(legal::legal_framework(&ctx.country));
    prompt.push_str("\n\n");
    push_document_block(&mut prompt, "## Documento en foco", ctx);
    prompt.push('\n');
    prompt.push_str(CHAT_OUTPUT_CONTRACT);
    prompt.push_str("\n\n");
    prompt.push_str(SPANISH_OUTPUT_CLAUSE);
    prompt
}

/// One document section: heading, metadata, optional RUC lines, preview.
fn push_document_block(prompt: &mut String, heading: &str, ctx: &AnalysisContext) {
    let _ = write!(prompt, "{}\n", heading);
    let _ = write!(prompt, "\nArchivo: {}\nTipo: {}", ctx.file_name, ctx.document_kind);
    if let Some(ruc) = &ctx.ruc {
        push_ruc_lines(prompt, ruc);
    }
    let _ = write!(prompt, "\nContenido:\n{}\n", preview(&ctx.extracted_text));
}

fn push_ruc_lines(prompt: &mut String, ruc: &RucValidation) {
    let estado = if ruc.is_valid { "válido" } else { "no válido" };
    let _ = write!(prompt, "\nRUC declarado: {} (estado: {})", ruc.number, estado);
    if let Some(name) = &ruc.registered_name {
        let _ = write!(prompt, "\nRazón social registrada: {}", name);
    }
}

/// Document text cut at [`DOCUMENT_PREVIEW_CHARS`] chars, with a marker when
/// anything was dropped.
fn preview(text: &str) -> String {
    match text.char_indices().nth(DOCUMENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}\n{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
