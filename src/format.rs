//! # Content Formats
//!
//! Every sealed file is tagged with the format its plaintext is written in.
//! The format is either declared by the filter configuration
//! (`--input-type yaml`) or inferred from the path suffix:
//!
//! | suffix            | format   |
//! |-------------------|----------|
//! | `.yaml`, `.yml`   | `yaml`   |
//! | `.json`           | `json`   |
//! | `.env`            | `dotenv` |
//! | `.ini`            | `ini`    |
//! | anything else     | `binary` |
//!
//! A configured `default_format` replaces `binary` as the fallback.

use crate::error::{Result, SealError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Binary,
    Dotenv,
    Ini,
    Json,
    Yaml,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Binary,
        Format::Dotenv,
        Format::Ini,
        Format::Json,
        Format::Yaml,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Binary => "binary",
            Format::Dotenv => "dotenv",
            Format::Ini => "ini",
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    /// Byte written into the envelope header
    pub fn tag(self) -> u8 {
        match self {
            Format::Binary => 0,
            Format::Dotenv => 1,
            Format::Ini => 2,
            Format::Json => 3,
            Format::Yaml => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Infer the format from a path suffix, `None` when nothing matches
    pub fn for_path(path: &str) -> Option<Self> {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(Format::Yaml)
        } else if path.ends_with(".json") {
            Some(Format::Json)
        } else if path.ends_with(".env") {
            Some(Format::Dotenv)
        } else if path.ends_with(".ini") {
            Some(Format::Ini)
        } else {
            None
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SealError::UnknownFormat(s.to_string()))
    }
}

/// Declared input/output formats.
///
/// Payloads are never parsed, so the only format that matters is the one an
/// envelope is sealed under. That is the output format; a declared input
/// format stands in for it when no output format is given, and the path
/// suffix is used when neither is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatRequest {
    pub input: Option<Format>,
    pub output: Option<Format>,
    /// Fallback when neither a declaration nor the suffix decides
    pub default: Option<Format>,
}

impl FormatRequest {
    pub fn infer() -> Self {
        Self::default()
    }

    pub fn explicit(input: Format, output: Format) -> Self {
        Self {
            input: Some(input),
            output: Some(output),
            default: None,
        }
    }

    /// Parse optional CLI strings; empty strings count as "infer".
    pub fn parse(input: Option<&str>, output: Option<&str>) -> Result<Self> {
        let parse_one = |value: Option<&str>| -> Result<Option<Format>> {
            match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => s.parse().map(Some),
            }
        };
        Ok(Self {
            input: parse_one(input)?,
            output: parse_one(output)?,
            default: None,
        })
    }

    pub fn with_default(mut self, default: Option<Format>) -> Self {
        self.default = default;
        self
    }

    /// Format envelopes for `path` are sealed and opened under
    pub fn resolve_output(&self, path: &str) -> Format {
        self.output
            .or(self.input)
            .or_else(|| Format::for_path(path))
            .or(self.default)
            .unwrap_or(Format::Binary)
    }
}
