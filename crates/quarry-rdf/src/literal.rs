//! Typed-literal construction under a validation policy.
//!
//! The mapper asks for literals through a [`LiteralContext`]; the configured
//! [`LiteralConversionMode`] decides what happens when a lexical form is not
//! valid for its datatype. Lexical grammars come from `oxsdatatypes`.

use std::fmt;
use std::str::FromStr;

use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNodeRef};
use oxsdatatypes::{
    Boolean, Date, DateTime, DayTimeDuration, Decimal, Double, Duration, Float, GDay, GMonth,
    GMonthDay, GYear, GYearMonth, Integer, Time, YearMonthDuration,
};
use quarry_core::JobLog;

use crate::error::RdfError;

const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

// ---------------------------------------------------------------------------
// LiteralConversionMode
// ---------------------------------------------------------------------------

/// Recovery strategy for invalid typed literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LiteralConversionMode {
    /// Accept every lexical form as-is.
    NoValidation,
    /// Reject the record.
    ValidateAndFail,
    /// Drop the datatype and keep the text as a plain string.
    ValidateAndFallbackToString,
    /// Replace the value with a well-typed placeholder.
    #[default]
    ValidateAndFallbackToPlaceholder,
}

impl LiteralConversionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoValidation => "noValidation",
            Self::ValidateAndFail => "validateAndFail",
            Self::ValidateAndFallbackToString => "validateAndFallbackToString",
            Self::ValidateAndFallbackToPlaceholder => "validateAndFallbackToPlaceholder",
        }
    }

    /// Parse a configured value, falling back to the default with a warning.
    #[must_use]
    pub fn from_config(value: &str) -> Self {
        value.parse().unwrap_or_else(|()| {
            let fallback = Self::default();
            tracing::warn!(
                value,
                fallback = fallback.as_str(),
                "invalid literal conversion mode"
            );
            fallback
        })
    }
}

impl FromStr for LiteralConversionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::NoValidation,
            Self::ValidateAndFail,
            Self::ValidateAndFallbackToString,
            Self::ValidateAndFallbackToPlaceholder,
        ]
        .into_iter()
        .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or(())
    }
}

impl fmt::Display for LiteralConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LiteralPolicy
// ---------------------------------------------------------------------------

/// Literal factory applying a [`LiteralConversionMode`].
///
/// Chosen once at startup and shared by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiteralPolicy {
    mode: LiteralConversionMode,
}

impl LiteralPolicy {
    #[must_use]
    pub const fn new(mode: LiteralConversionMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> LiteralConversionMode {
        self.mode
    }

    /// Build a literal of `datatype` from `lexical`.
    ///
    /// Recovered values are reported to `log` as warnings.
    ///
    /// # Errors
    ///
    /// Returns [`RdfError::InvalidLiteral`] in `validateAndFail` mode and
    /// [`RdfError::NoPlaceholder`] in placeholder mode when the datatype has no
    /// known placeholder.
    pub fn typed_literal(
        &self,
        lexical: &str,
        datatype: NamedNodeRef<'_>,
        log: &JobLog,
    ) -> Result<Literal, RdfError> {
        if self.mode == LiteralConversionMode::NoValidation || is_valid(lexical, datatype) {
            return Ok(Literal::new_typed_literal(lexical, datatype));
        }

        match self.mode {
            LiteralConversionMode::NoValidation => Ok(Literal::new_typed_literal(lexical, datatype)),
            LiteralConversionMode::ValidateAndFail => {
                let error = RdfError::InvalidLiteral {
                    lexical: lexical.to_string(),
                    datatype: datatype.as_str().to_string(),
                };
                tracing::debug!(%error, "rejecting literal");
                Err(error)
            }
            LiteralConversionMode::ValidateAndFallbackToString => {
                log.warn(format!(
                    "Invalid value for datatype {}: '{lexical}', returning plain string instead",
                    datatype.as_str()
                ));
                Ok(Literal::new_simple_literal(lexical))
            }
            LiteralConversionMode::ValidateAndFallbackToPlaceholder => {
                let Some(placeholder) = placeholder(lexical, datatype) else {
                    return Err(RdfError::NoPlaceholder {
                        lexical: lexical.to_string(),
                        datatype: datatype.as_str().to_string(),
                    });
                };
                log.warn(format!(
                    "Invalid value for datatype {}: '{lexical}', returning placeholder instead",
                    datatype.as_str()
                ));
                Ok(Literal::new_typed_literal(placeholder, datatype))
            }
        }
    }

    /// Build a language-tagged literal.
    ///
    /// Malformed language tags are accepted as-is without validation, fall
    /// back to a plain string in the string and placeholder modes, and fail
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RdfError::InvalidLiteral`] in `validateAndFail` mode.
    pub fn language_literal(
        &self,
        lexical: &str,
        language: &str,
        log: &JobLog,
    ) -> Result<Literal, RdfError> {
        if self.mode == LiteralConversionMode::NoValidation {
            return Ok(Literal::new_language_tagged_literal_unchecked(
                lexical,
                language.to_ascii_lowercase(),
            ));
        }
        match Literal::new_language_tagged_literal(lexical, language) {
            Ok(literal) => Ok(literal),
            Err(_) if self.mode == LiteralConversionMode::ValidateAndFail => {
                Err(RdfError::InvalidLiteral {
                    lexical: lexical.to_string(),
                    datatype: format!("rdf:langString@{language}"),
                })
            }
            Err(_) => {
                log.warn(format!(
                    "Invalid language tag '{language}' for '{lexical}', returning plain string instead"
                ));
                Ok(Literal::new_simple_literal(lexical))
            }
        }
    }
}

/// A policy bundled with the job log it reports into.
#[derive(Debug, Clone, Copy)]
pub struct LiteralContext<'a> {
    pub policy: &'a LiteralPolicy,
    pub log: &'a JobLog,
}

impl<'a> LiteralContext<'a> {
    #[must_use]
    pub const fn new(policy: &'a LiteralPolicy, log: &'a JobLog) -> Self {
        Self { policy, log }
    }

    /// See [`LiteralPolicy::typed_literal`].
    ///
    /// # Errors
    ///
    /// Propagates policy rejections.
    pub fn typed(&self, lexical: &str, datatype: NamedNodeRef<'_>) -> Result<Literal, RdfError> {
        self.policy.typed_literal(lexical, datatype, self.log)
    }

    /// See [`LiteralPolicy::language_literal`].
    ///
    /// # Errors
    ///
    /// Propagates policy rejections.
    pub fn language(&self, lexical: &str, language: &str) -> Result<Literal, RdfError> {
        self.policy.language_literal(lexical, language, self.log)
    }
}

// ---------------------------------------------------------------------------
// Validation and placeholders
// ---------------------------------------------------------------------------

fn xsd_local_name(datatype: NamedNodeRef<'_>) -> Option<&str> {
    datatype.as_str().strip_prefix(XSD_NS)
}

fn parses<T: FromStr>(lexical: &str) -> bool {
    lexical.parse::<T>().is_ok()
}

fn integer_in(lexical: &str, accept: impl Fn(i64) -> bool) -> bool {
    parses::<Integer>(lexical) && lexical.parse::<i64>().is_ok_and(accept)
}

fn unsigned<T: FromStr>(lexical: &str) -> bool {
    lexical.strip_prefix('+').unwrap_or(lexical).parse::<T>().is_ok()
}

/// Whether `lexical` is in the lexical space of `datatype`.
///
/// Datatypes outside XSD, and XSD datatypes without a grammar here, are
/// treated as valid.
fn is_valid(lexical: &str, datatype: NamedNodeRef<'_>) -> bool {
    let Some(name) = xsd_local_name(datatype) else {
        return true;
    };
    match name {
        "boolean" => parses::<Boolean>(lexical),
        "decimal" => parses::<Decimal>(lexical),
        "integer" | "long" => parses::<Integer>(lexical),
        "int" => integer_in(lexical, |v| i32::try_from(v).is_ok()),
        "short" => integer_in(lexical, |v| i16::try_from(v).is_ok()),
        "byte" => integer_in(lexical, |v| i8::try_from(v).is_ok()),
        "nonNegativeInteger" => integer_in(lexical, |v| v >= 0),
        "positiveInteger" => integer_in(lexical, |v| v > 0),
        "nonPositiveInteger" => integer_in(lexical, |v| v <= 0),
        "negativeInteger" => integer_in(lexical, |v| v < 0),
        "unsignedLong" => unsigned::<u64>(lexical),
        "unsignedInt" => unsigned::<u32>(lexical),
        "unsignedShort" => unsigned::<u16>(lexical),
        "unsignedByte" => unsigned::<u8>(lexical),
        "float" => parses::<Float>(lexical),
        "double" => parses::<Double>(lexical),
        "date" => parses::<Date>(lexical),
        "dateTime" => parses::<DateTime>(lexical),
        "dateTimeStamp" => lexical
            .parse::<DateTime>()
            .is_ok_and(|value| value.timezone_offset().is_some()),
        "time" => parses::<Time>(lexical),
        "duration" => parses::<Duration>(lexical),
        "yearMonthDuration" => parses::<YearMonthDuration>(lexical),
        "dayTimeDuration" => parses::<DayTimeDuration>(lexical),
        "gYear" => parses::<GYear>(lexical),
        "gYearMonth" => parses::<GYearMonth>(lexical),
        "gMonth" => parses::<GMonth>(lexical),
        "gDay" => parses::<GDay>(lexical),
        "gMonthDay" => parses::<GMonthDay>(lexical),
        _ => true,
    }
}

/// Stand-in value keeping a statement well-typed, if one is known.
fn placeholder(lexical: &str, datatype: NamedNodeRef<'_>) -> Option<String> {
    if datatype == xsd::STRING {
        return Some(lexical.to_string());
    }
    let value = match xsd_local_name(datatype)? {
        "decimal" | "integer" | "long" | "int" | "short" | "byte" | "nonNegativeInteger"
        | "positiveInteger" | "nonPositiveInteger" | "negativeInteger" | "unsignedLong"
        | "unsignedInt" | "unsignedShort" | "unsignedByte" => "0",
        "float" | "double" => "NaN",
        "boolean" => "false",
        "dateTime" | "dateTimeStamp" => "1970-01-01T00:00:00Z",
        "date" => "1970-01-01",
        "duration" => "P0Y",
        _ => return None,
    };
    Some(value.to_string())
}
