use async_trait::async_trait;
use guayavita::pos::SourceLocator;
use parking_lot::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

#[derive(Debug)]
pub struct Backend {
    client: Client,
    client_capabilities: RwLock<ClientCapabilities>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            client_capabilities: RwLock::new(ClientCapabilities::default()),
        }
    }

    fn has_publish_diagnostics(&self) -> bool {
        let lock = self.client_capabilities.read();
        if let Some(text_document) = &lock.text_document {
            text_document.publish_diagnostics.is_some()
        } else {
            false
        }
    }

    async fn check(&self, uri: Url, text: &str, version: i32) {
        if !self.has_publish_diagnostics() {
            return;
        }
        let diagnostics = diagnose(uri.path(), text);
        self.client
            .log_message(
                MessageType::LOG,
                format!("{}: {} diagnostic(s)", uri, diagnostics.len()),
            )
            .await;
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

/// Parses `text` and converts the syntax errors into LSP diagnostics with
/// UTF-16 based ranges.
pub fn diagnose(filename: &str, text: &str) -> Vec<Diagnostic> {
    let (_, diagnostics) = guayavita::parse(filename, text);
    let locator = SourceLocator::new(text);
    diagnostics
        .iter()
        .map(|diagnostic| {
            let range = Range {
                start: position(&locator, text, diagnostic.span.start.offset),
                end: position(&locator, text, diagnostic.span.end.offset),
            };
            let mut message = diagnostic.message.clone();
            for note in &diagnostic.notes {
                message.push_str("\nnote: ");
                message.push_str(note);
            }
            Diagnostic {
                range,
                severity: Some(severity(diagnostic.severity)),
                code: None,
                code_description: None,
                source: Some("guayavita".to_owned()),
                message,
                related_information: None,
                tags: None,
                data: None,
            }
        })
        .collect()
}

fn position(locator: &SourceLocator, text: &str, offset: usize) -> Position {
    let pos = locator.position_utf16(text, offset);
    Position {
        line: pos.line,
        character: pos.character,
    }
}

fn severity(severity: guayavita::Severity) -> DiagnosticSeverity {
    match severity {
        guayavita::Severity::Error => DiagnosticSeverity::ERROR,
        guayavita::Severity::Warning => DiagnosticSeverity::WARNING,
        guayavita::Severity::Note => DiagnosticSeverity::INFORMATION,
    }
}

#[async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        {
            let mut lock = self.client_capabilities.write();
            *lock = params.capabilities.clone();
        }
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncKind::FULL.into()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "guayavita language server initialized")
            .await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;
        self.check(uri, &text, version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            let VersionedTextDocumentIdentifier { uri, version } = params.text_document;
            self.check(uri, &change.text, version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        if self.has_publish_diagnostics() {
            self.client
                .publish_diagnostics(params.text_document.uri, vec![], None)
                .await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnose_valid() {
        assert!(diagnose("ok.gvt", "fun main(): none { print(1) }").is_empty());
    }

    #[test]
    fn test_diagnose_utf16_range() {
        let diagnostics = diagnose("t.gvt", "def s = \"🍐\"\ndef t = 🍐");
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.message, "unexpected character `🍐`");
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(
            diagnostic.range,
            Range {
                start: Position {
                    line: 1,
                    character: 8,
                },
                end: Position {
                    line: 1,
                    character: 10,
                },
            }
        );
    }

    #[test]
    fn test_diagnose_notes() {
        let diagnostics = diagnose("t.gvt", "def a = b | c");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "unexpected `|`; did you mean `||`?\nnote: `|`-separated alternatives are not supported"
        );
    }
}
