use serde::{Deserialize, Serialize};

use crate::Span;

/// A named tile shape the generator may pick, e.g. a 2x2 "large" poster
/// tile or a 1x1 "small" one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeClass {
    pub name: String,
    pub span: Span,
}

impl SizeClass {
    pub fn new(name: impl Into<String>, col_span: u32, row_span: u32) -> Self {
        Self {
            name: name.into(),
            span: Span { col_span, row_span },
        }
    }
}

/// The stock catalog: the shapes a content surface starts with.
pub fn default_size_classes() -> Vec<SizeClass> {
    vec![
        SizeClass::new("large", 2, 2),
        SizeClass::new("tall", 1, 2),
        SizeClass::new("wide", 2, 1),
        SizeClass::new("small", 1, 1),
    ]
}

/// Minimal-area entry of a catalog (ties go to the narrower shape).
/// The generator falls back to this when a drawn class is wider than the
/// grid itself.
pub fn smallest_class(catalog: &[SizeClass]) -> Option<&SizeClass> {
    catalog
        .iter()
        .min_by_key(|c| (c.span.col_span * c.span.row_span, c.span.col_span))
}
