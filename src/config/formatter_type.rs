/**
 * Formatter names accepted by `logger.formatter.name`.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterKind {
    Text,
    Json,
    /// Any other name; the original text is kept for diagnostics.
    Unrecognized(String),
}

impl FormatterKind {
    /**
     * Parses a formatter name, case-insensitively.
     */
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "text" => FormatterKind::Text,
            "json" => FormatterKind::Json,
            _ => FormatterKind::Unrecognized(name.to_string()),
        }
    }
}
