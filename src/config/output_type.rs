/**
 * Output sink names accepted by `logger.out.name`.
 */
/// Log file used when `logger.out.options.filename` is not given.
pub const DEFAULT_LOG_FILE: &str = "dbutil.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
    File,
    /// Any other name; the original text is kept for diagnostics.
    Unrecognized(String),
}

impl OutputKind {
    /**
     * Parses a sink name, case-insensitively.
     */
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "stdout" => OutputKind::Stdout,
            "stderr" => OutputKind::Stderr,
            "file" => OutputKind::File,
            _ => OutputKind::Unrecognized(name.to_string()),
        }
    }
}
