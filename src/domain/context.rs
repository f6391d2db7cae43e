//! Analysis input types - the assembled state fed into prompt building.
//!
//! The orchestration core never queries the workspace/document store. Calling
//! code assembles these context objects (extracted text, document metadata,
//! conversation history) and hands them in per request. Everything here is
//! immutable for the duration of a call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of an uploaded tender document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Tender terms published by the contracting entity.
    Pliego,
    /// Bid submitted by a supplier.
    Propuesta,
    /// Awarded/signed contract.
    Contrato,
    /// Anything that does not fit the tender taxonomy.
    Otro,
}

impl DocumentKind {
    /// Spanish display name used inside prompt text.
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Pliego => "Pliego de condiciones",
            DocumentKind::Propuesta => "Propuesta / Oferta",
            DocumentKind::Contrato => "Contrato",
            DocumentKind::Otro => "Documento",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of validating a supplier's tax registration (RUC) against the
/// document under analysis.
///
/// Present only when the upload pipeline managed to extract and verify a
/// registration number; prompt builders inject it verbatim when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RucValidation {
    /// Registration number as extracted from the document.
    pub number: String,
    /// Whether the number passed registry validation.
    pub is_valid: bool,
    /// Legal name registered under the number, when the registry returned one.
    pub registered_name: Option<String>,
}

impl RucValidation {
    /// Creates a validation result.
    pub fn new(number: impl Into<String>, is_valid: bool) -> Self {
        Self {
            number: number.into(),
            is_valid,
            registered_name: None,
        }
    }

    /// Sets the registered legal name.
    pub fn with_registered_name(mut self, name: impl Into<String>) -> Self {
        self.registered_name = Some(name.into());
        self
    }
}

/// Input to single-document operations (insight, focused chat, comparison
/// entries).
///
/// Immutable per call; `extracted_text` is the full text recovered at upload
/// time. Prompt builders truncate it, callers never pre-truncate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// What kind of tender document this is.
    pub document_kind: DocumentKind,
    /// Full extracted text of the document.
    pub extracted_text: String,
    /// Country whose procurement law governs the document.
    pub country: String,
    /// Original file name; doubles as the document label in comparison maps.
    pub file_name: String,
    /// Registration validation outcome, when available.
    pub ruc: Option<RucValidation>,
}

impl AnalysisContext {
    /// Creates a context with the required fields.
    pub fn new(
        document_kind: DocumentKind,
        extracted_text: impl Into<String>,
        country: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            document_kind,
            extracted_text: extracted_text.into(),
            country: country.into(),
            file_name: file_name.into(),
            ruc: None,
        }
    }

    /// Attaches a registration validation result.
    pub fn with_ruc(mut self, ruc: RucValidation) -> Self {
        self.ruc = Some(ruc);
        self
    }

    /// Label identifying this document in comparison output.
    pub fn label(&self) -> &str {
        &self.file_name
    }
}

/// Summary of one document inside a workspace, for workspace-wide chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOverview {
    /// Original file name.
    pub file_name: String,
    /// Document classification.
    pub kind: DocumentKind,
    /// Full extracted text; truncated by the prompt builder.
    pub extracted_text: String,
}

impl DocumentOverview {
    /// Creates a document overview.
    pub fn new(
        file_name: impl Into<String>,
        kind: DocumentKind,
        extracted_text: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            extracted_text: extracted_text.into(),
        }
    }
}

/// Input to workspace-wide chat: the workspace identity plus every document
/// the conversation may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceContext {
    /// Workspace display name.
    pub name: String,
    /// Country whose procurement law governs the workspace.
    pub country: String,
    /// Documents uploaded to the workspace, in upload order.
    pub documents: Vec<DocumentOverview>,
}

impl WorkspaceContext {
    /// Creates a workspace context.
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            documents: Vec::new(),
        }
    }

    /// Adds a document to the workspace.
    pub fn with_document(mut self, document: DocumentOverview) -> Self {
        self.documents.push(document);
        self
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// End-user input.
    User,
    /// Model response.
    Assistant,
}

/// One turn in an ordered, append-only conversation.
///
/// The timestamp is carried for callers (conversation persistence lives
/// outside this core) and never reaches prompt text, so prompt building stays
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who sent this turn.
    pub role: TurnRole,
    /// Turn content.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Creates a turn with an explicit timestamp.
    pub fn new(role: TurnRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Creates a user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content, Utc::now())
    }

    /// Creates an assistant turn stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content, Utc::now())
    }
}
