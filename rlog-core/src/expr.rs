//! Expressions declaring what a metric extracts from an event.
//!
//! An expression is one of
//!
//! * a numeric literal, e.g. `1`, passed to the metric unchanged,
//! * a field name, e.g. `reward`, looked up in the event,
//! * a transform applied to a field, e.g. `clip(reward)`.
//!
//! Expressions are parsed once, when a metric is constructed, so that a
//! misspelled transform is reported at registration instead of at the first
//! event carrying the field.
use crate::{error::RlogError, metric::Arg, record::Record};
use std::{fmt, str::FromStr};

/// The closed set of transform functions usable inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Symmetric clamp to `[-1, 1]`.
    Clip,

    /// Integer cast, truncating toward zero.
    Int,
}

impl Transform {
    /// Name of the transform as written in expressions.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Clip => "clip",
            Transform::Int => "int",
        }
    }

    /// Applies the transform to a single value.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Transform::Clip => x.clamp(-1.0, 1.0),
            Transform::Int => x.trunc(),
        }
    }
}

impl FromStr for Transform {
    type Err = RlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clip" => Ok(Transform::Clip),
            "int" => Ok(Transform::Int),
            _ => Err(RlogError::UnknownTransformError(s.to_string())),
        }
    }
}

/// A compiled rule extracting one accumulate-argument from an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant passed as-is.
    Literal(f64),

    /// Value of the named field.
    Field(String),

    /// Value of the named field after a transform.
    Apply {
        /// The transform to apply.
        transform: Transform,
        /// The field it is applied to.
        field: String,
    },
}

impl Expr {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// * [`RlogError::UnknownTransformError`] if `fn(field)` names an unknown `fn`.
    /// * [`RlogError::InvalidExpressionError`] if the expression is malformed.
    pub fn parse(src: &str) -> Result<Self, RlogError> {
        let s = src.trim();
        let invalid = || RlogError::InvalidExpressionError(src.to_string());

        if s.is_empty() {
            return Err(invalid());
        }
        if let Some(v) = parse_literal(s) {
            return Ok(Expr::Literal(v));
        }

        match s.find('(') {
            Some(open) => {
                if !s.ends_with(')') {
                    return Err(invalid());
                }
                let name = s[..open].trim();
                let field = s[open + 1..s.len() - 1].trim();
                if name.is_empty() || field.is_empty() || field.contains(['(', ')']) {
                    return Err(invalid());
                }
                Ok(Expr::Apply {
                    transform: name.parse()?,
                    field: field.to_string(),
                })
            }
            None if s.contains(')') => Err(invalid()),
            None => Ok(Expr::Field(s.to_string())),
        }
    }

    /// The event field this expression reads, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Expr::Literal(_) => None,
            Expr::Field(field) | Expr::Apply { field, .. } => Some(field),
        }
    }

    /// Resolves the expression against an event.
    ///
    /// Batched fields are transformed element-wise.
    pub fn resolve(&self, event: &Record) -> Result<Arg, RlogError> {
        match self {
            Expr::Literal(v) => Ok(Arg::Scalar(*v)),
            Expr::Field(field) => lookup(event, field),
            Expr::Apply { transform, field } => {
                Ok(lookup(event, field)?.map(|x| transform.apply(x)))
            }
        }
    }
}

/// A finite number written with digits, so that fields named `inf` or `nan`
/// stay fields.
fn parse_literal(s: &str) -> Option<f64> {
    let first = s.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lookup(event: &Record, field: &str) -> Result<Arg, RlogError> {
    match event.get(field) {
        Some(value) => Arg::from_record_value(field, value),
        None => Err(RlogError::MissingFieldError(field.to_string())),
    }
}

impl FromStr for Expr {
    type Err = RlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Field(field) => write!(f, "{}", field),
            Expr::Apply { transform, field } => write!(f, "{}({})", transform.name(), field),
        }
    }
}
