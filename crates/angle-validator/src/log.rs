// log.rs -- Splitting the engine's combined log into sections
//
// The engine reports everything through one string made of delimited blocks:
//
//   #### BEGIN COMPILER 0 INFO LOG ####
//   <text>
//
//   #### END COMPILER 0 INFO LOG ####
//
// The body of a block is everything between the BEGIN line and the END line,
// minus the single newline the engine appends after the text.

use std::fmt;

const MARKER: &str = "####";
const BEGIN: &str = "BEGIN";
const END: &str = "END";
const COMPILER: &str = "COMPILER";

/// What a section holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Errors and warnings.
    InfoLog,
    /// Translated source.
    ObjectCode,
    /// Active attributes, uniforms, varyings and outputs.
    Variables,
    Other(String),
}

impl SectionKind {
    fn parse(label: &str) -> Self {
        match label {
            "INFO LOG" => SectionKind::InfoLog,
            "OBJ CODE" => SectionKind::ObjectCode,
            "VARIABLES" => SectionKind::Variables,
            other => SectionKind::Other(other.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SectionKind::InfoLog => "INFO LOG",
            SectionKind::ObjectCode => "OBJ CODE",
            SectionKind::Variables => "VARIABLES",
            SectionKind::Other(label) => label,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSection {
    pub compiler: u32,
    pub kind: SectionKind,
    pub text: String,
    /// False when the log ended before the matching END line.
    pub terminated: bool,
}

/// A decoded diagnostic log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticLog {
    /// Text found outside any section (usage messages, driver errors).
    pub preamble: String,
    pub sections: Vec<LogSection>,
}

impl DiagnosticLog {
    pub fn parse(raw: &str) -> Self {
        let mut log = DiagnosticLog::default();
        let mut open: Option<(u32, SectionKind, Vec<&str>)> = None;

        for line in raw.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match open.take() {
                Some((compiler, kind, mut body)) => {
                    if parse_marker(line, END).as_ref() == Some(&(compiler, kind.clone())) {
                        log.sections.push(LogSection {
                            compiler,
                            text: section_text(&body),
                            kind,
                            terminated: true,
                        });
                    } else {
                        body.push(line);
                        open = Some((compiler, kind, body));
                    }
                }
                None => {
                    if let Some((compiler, kind)) = parse_marker(line, BEGIN) {
                        open = Some((compiler, kind, Vec::new()));
                    } else if !line.is_empty() {
                        if !log.preamble.is_empty() {
                            log.preamble.push('\n');
                        }
                        log.preamble.push_str(line);
                    }
                }
            }
        }

        if let Some((compiler, kind, body)) = open {
            tracing::warn!(%kind, compiler, "diagnostic log section is not terminated");
            log.sections.push(LogSection {
                compiler,
                text: body.join("\n"),
                kind,
                terminated: false,
            });
        }
        log
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.sections.is_empty()
    }

    /// First section of `kind`, if the engine produced one.
    pub fn section(&self, kind: &SectionKind) -> Option<&LogSection> {
        self.sections.iter().find(|s| &s.kind == kind)
    }

    pub fn info_log(&self) -> Option<&str> {
        self.section(&SectionKind::InfoLog).map(|s| s.text.as_str())
    }

    pub fn object_code(&self) -> Option<&str> {
        self.section(&SectionKind::ObjectCode).map(|s| s.text.as_str())
    }

    pub fn variables(&self) -> Option<&str> {
        self.section(&SectionKind::Variables).map(|s| s.text.as_str())
    }

    /// Drop every section of `kind`.
    pub fn remove(&mut self, kind: &SectionKind) {
        self.sections.retain(|s| &s.kind != kind);
    }
}

/// `#### <word> COMPILER <n> <label> ####`
fn parse_marker(line: &str, word: &str) -> Option<(u32, SectionKind)> {
    let inner = line
        .strip_prefix(MARKER)?
        .strip_suffix(MARKER)?
        .trim();
    let rest = inner.strip_prefix(word)?.trim_start();
    let rest = rest.strip_prefix(COMPILER)?.trim_start();
    let (index, label) = rest.split_once(' ')?;
    let compiler = index.parse().ok()?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some((compiler, SectionKind::parse(label)))
}

// Lines between the markers; the last one is the blank left by the newline the
// engine appends to the text.
fn section_text(body: &[&str]) -> String {
    let lines = match body.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => body,
    };
    lines.join("\n")
}
