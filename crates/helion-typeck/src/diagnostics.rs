//! Ariadne-based rendering of type-core errors.
//!
//! Every error kind is first reduced to a [`Diagnostic`] (code, message,
//! primary span, label, optional help) and then rendered either as an
//! ariadne report against the annotation source or as one JSON object.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use helion_common::{ParseError, Span};

use crate::error::{DatatypeError, TypeError};

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text with no escape codes, used by tests.
    pub fn colorless() -> Self {
        DiagnosticOptions {
            color: false,
            json: false,
        }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            color: true,
            json: false,
        }
    }
}

/// An error reduced to what a report needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
    pub label: String,
    pub help: Option<String>,
}

/// Errors that can be reported to a user.
pub trait Diagnose {
    fn diagnostic(&self) -> Diagnostic;
}

// ── Error Codes ────────────────────────────────────────────────────────

impl Diagnose for TypeError {
    fn diagnostic(&self) -> Diagnostic {
        match self {
            TypeError::Mismatch {
                expected,
                found,
                origin,
            } => Diagnostic {
                code: "E0001",
                message: self.to_string(),
                span: origin.span(),
                label: format!("expected {}, found {} ({})", expected, found, origin),
                help: None,
            },
            TypeError::InfiniteType { origin, .. } => Diagnostic {
                code: "E0002",
                message: self.to_string(),
                span: origin.span(),
                label: "recursive type here".to_string(),
                help: Some("a type cannot contain itself".to_string()),
            },
            TypeError::ParameterArity { span, .. } => Diagnostic {
                code: "E0003",
                message: self.to_string(),
                span: Some(*span),
                label: "type parameter applied to arguments".to_string(),
                help: Some("use an upper-case name to refer to a type constructor".to_string()),
            },
            TypeError::UnknownGlobal { name } => Diagnostic {
                code: "E0004",
                message: self.to_string(),
                span: None,
                label: format!("`{}` is not defined", name),
                help: None,
            },
        }
    }
}

impl Diagnose for DatatypeError {
    fn diagnostic(&self) -> Diagnostic {
        let (code, span, label) = match self {
            DatatypeError::UnspecializedSubtype { .. } => ("E0101", None, "generic type"),
            DatatypeError::UnspecializedLowering { .. } => ("E0102", None, "generic type"),
            DatatypeError::UnspecializedFields { .. } => ("E0103", None, "generic type"),
            DatatypeError::DuplicateType { .. } => ("E0104", None, "defined again here"),
            DatatypeError::UnknownType { span, .. } => ("E0105", Some(*span), "not found in scope"),
            DatatypeError::SpecializationArity { .. } => {
                ("E0106", None, "wrong number of parameters")
            }
            DatatypeError::FieldOnNonObject { .. } => ("E0107", None, "not an object type"),
            DatatypeError::InvalidFloatWidth { .. } => ("E0108", None, "unsupported width"),
            DatatypeError::ParameterArity { span, .. } => {
                ("E0109", Some(*span), "type parameter applied to arguments")
            }
        };
        Diagnostic {
            code,
            message: self.to_string(),
            span,
            label: label.to_string(),
            help: None,
        }
    }
}

impl Diagnose for ParseError {
    fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            code: "P0001",
            message: format!("parse error: {}", self),
            span: Some(self.span),
            label: self.kind.to_string(),
            help: None,
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Clamp a span into `source`, widening empty spans to one character when
/// the source allows it.
fn clamp(span: Option<Span>, source_len: usize) -> Range<usize> {
    let range = span.map(|s| s.range()).unwrap_or(0..source_len);
    let start = range.start.min(source_len);
    let end = range.end.min(source_len).max(start);
    if start == end {
        start..end.saturating_add(1).min(source_len)
    } else {
        start..end
    }
}

/// The JSON form of a diagnostic: one object per error.
pub fn diagnostic_json(diag: &Diagnostic, filename: &str, source_len: usize) -> serde_json::Value {
    let range = clamp(diag.span, source_len);
    serde_json::json!({
        "code": diag.code,
        "severity": "error",
        "message": diag.message,
        "file": filename,
        "spans": [{
            "start": range.start,
            "end": range.end,
            "label": diag.label,
        }],
        "fix": diag.help,
    })
}

/// Render an error against `source`, as text or JSON depending on `options`.
pub fn render_diagnostic<E: Diagnose>(
    error: &E,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let diag = error.diagnostic();
    if options.json {
        return diagnostic_json(&diag, filename, source.len()).to_string();
    }

    let config = Config::default().with_color(options.color);
    let range = clamp(diag.span, source.len());

    let mut builder = Report::build(ReportKind::Error, range.clone())
        .with_code(diag.code)
        .with_message(&diag.message)
        .with_config(config)
        .with_label(
            Label::new(range)
                .with_message(&diag.label)
                .with_color(Color::Red),
        );
    if let Some(help) = &diag.help {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = builder.finish().write(Source::from(source), &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
