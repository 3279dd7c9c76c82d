//! Token estimation for LLM context budgeting
//!
//! Counts tokens with tiktoken (cl100k_base by default), with an o200k_base
//! option and a character-class estimate that needs no BPE tables.

use once_cell::sync::Lazy;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Encoding used for the token estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base (GPT-4, GPT-3.5-turbo)
    #[default]
    Cl100k,
    /// o200k_base (GPT-4o)
    O200k,
    /// Character-class estimate, no BPE
    Heuristic,
}

const MODEL_NAMES: &[&str] = &["cl100k", "o200k", "heuristic"];

impl TokenModel {
    pub fn name(&self) -> &'static str {
        match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        }
    }

    pub fn available_models() -> &'static [&'static str] {
        MODEL_NAMES
    }

    fn encoder(&self) -> Option<&'static Result<CoreBPE, String>> {
        match self {
            TokenModel::Cl100k => Some(&*CL100K),
            TokenModel::O200k => Some(&*O200K),
            TokenModel::Heuristic => None,
        }
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "gpt-4" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt-4o" => Ok(TokenModel::O200k),
            "heuristic" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown token model '{}' (expected one of: {})",
                s,
                MODEL_NAMES.join(", ")
            )),
        }
    }
}

static CL100K: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("cannot load cl100k_base: {}", e)));

static O200K: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("cannot load o200k_base: {}", e)));

/// Count tokens in text, or `None` if the encoder is unavailable or fails
///
/// Never panics: a failure inside the encoder is reported as `None` so the
/// caller can render the estimate as unknown.
pub fn try_count_tokens(text: &str, model: TokenModel) -> Option<usize> {
    if text.is_empty() {
        return Some(0);
    }

    let encoder = match model.encoder() {
        None => return Some(estimate_tokens(text)),
        Some(Ok(encoder)) => encoder,
        Some(Err(e)) => {
            log::warn!("{}", e);
            return None;
        }
    };

    let counted = panic::catch_unwind(AssertUnwindSafe(|| {
        encoder.encode_ordinary(text).len()
    }));
    match counted {
        Ok(count) => Some(count),
        Err(_) => {
            log::warn!("{} encoder failed, token count unknown", model);
            None
        }
    }
}

/// Character-class token estimate
///
/// Runs of ASCII word characters cost one token per four characters,
/// other visible ASCII characters one token each, and every non-ASCII
/// character one token. Whitespace is free.
pub fn estimate_tokens(text: &str) -> usize {
    let mut tokens = 0usize;
    let mut run = 0usize;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            run += 1;
            continue;
        }
        tokens += run.div_ceil(4);
        run = 0;
        if !c.is_whitespace() {
            tokens += 1;
        }
    }

    tokens + run.div_ceil(4)
}
