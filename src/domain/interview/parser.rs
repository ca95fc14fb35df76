//! Response parser.
//!
//! Turns the interviewer model's free-form reply into a question plus an
//! optional set of choices. Extraction runs a fixed cascade of strategies;
//! the first strategy that produces a result wins and later ones are not
//! tried. Parsing never fails: text that no strategy recognizes becomes a
//! plain free-text question.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a choices label followed by one or more bracketed items,
/// e.g. `選択肢: [正直さ] [優しさ]`.
static CHOICE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:選択肢|[Cc]hoices|[Oo]ptions)[:：]\s*(\[.+?\](?:\s*\[.+?\])*)")
        .expect("choice marker pattern is valid")
});

static BRACKET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracket item pattern is valid"));

/// "Is it A or B" phrasings, highest priority first.
static NATURAL_ALTERNATIVES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 「A」と「B」、どちら / 「A」か「B」どちら
        r"「([^」]+)」(?:と|か)「([^」]+)」、?どちら",
        // 「A」と「B」 / 「A」または「B」
        r"「([^」]+)」(?:と|または)「([^」]+)」",
        // "A" or "B"
        r#"["“]([^"”]+)["”]\s+or\s+["“]([^"”]+)["”]"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("natural alternative pattern is valid"))
    .collect()
});

/// A question extracted from a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub text: String,
    /// Distinct, non-empty choices in order of appearance.
    pub options: Option<Vec<String>>,
}

impl ParsedQuestion {
    /// A question that expects a free-text answer.
    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: None,
        }
    }

    pub fn has_options(&self) -> bool {
        self.options.as_ref().is_some_and(|o| !o.is_empty())
    }
}

/// One step of the extraction cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// A labelled list of bracketed choices; the list is stripped from the text.
    ExplicitMarker,
    /// Two quoted alternatives inside the question itself; the text is kept whole.
    NaturalAlternatives,
}

impl ExtractionStrategy {
    /// Default priority order.
    pub const CASCADE: [ExtractionStrategy; 2] = [
        ExtractionStrategy::ExplicitMarker,
        ExtractionStrategy::NaturalAlternatives,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExplicitMarker => "explicit_marker",
            Self::NaturalAlternatives => "natural_alternatives",
        }
    }

    /// Runs this strategy alone. `None` means "did not match".
    pub fn extract(&self, raw: &str) -> Option<ParsedQuestion> {
        match self {
            Self::ExplicitMarker => extract_explicit_marker(raw),
            Self::NaturalAlternatives => extract_natural_alternatives(raw),
        }
    }
}

/// Result of a parse together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub question: ParsedQuestion,
    /// `None` when the free-text fallback was used.
    pub strategy: Option<ExtractionStrategy>,
}

/// Runs a cascade of extraction strategies in priority order.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(ExtractionStrategy::CASCADE.to_vec())
    }
}

impl ResponseParser {
    /// Creates a parser with a custom strategy order.
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    pub fn parse(&self, raw: &str) -> ParsedQuestion {
        self.parse_detailed(raw).question
    }

    pub fn parse_detailed(&self, raw: &str) -> ParseOutcome {
        self.strategies
            .iter()
            .find_map(|strategy| {
                strategy.extract(raw).map(|question| ParseOutcome {
                    question,
                    strategy: Some(*strategy),
                })
            })
            .unwrap_or_else(|| ParseOutcome {
                question: ParsedQuestion::free_text(raw),
                strategy: None,
            })
    }
}

/// Parses a reply with the default cascade.
pub fn parse_response(raw: &str) -> ParsedQuestion {
    ResponseParser::default().parse(raw)
}

fn extract_explicit_marker(raw: &str) -> Option<ParsedQuestion> {
    let captures = CHOICE_MARKER.captures(raw)?;
    let span = captures.get(0)?;
    let items = captures.get(1)?.as_str();

    let mut options: Vec<String> = Vec::new();
    for item in BRACKET_ITEM.captures_iter(items) {
        let Some(inner) = item.get(1) else { continue };
        let option = inner.as_str().trim();
        if option.is_empty() || options.iter().any(|o| o == option) {
            continue;
        }
        options.push(option.to_string());
    }

    if options.is_empty() {
        return None;
    }

    let text = format!("{}{}", &raw[..span.start()], &raw[span.end()..]);

    Some(ParsedQuestion {
        text: text.trim().to_string(),
        options: Some(options),
    })
}

fn extract_natural_alternatives(raw: &str) -> Option<ParsedQuestion> {
    NATURAL_ALTERNATIVES.iter().find_map(|pattern| {
        let captures = pattern.captures(raw)?;
        let first = captures.get(1)?.as_str();
        let second = captures.get(2)?.as_str();

        if first.trim().is_empty() || second.trim().is_empty() || first == second {
            return None;
        }

        Some(ParsedQuestion {
            text: raw.to_string(),
            options: Some(vec![first.to_string(), second.to_string()]),
        })
    })
}
