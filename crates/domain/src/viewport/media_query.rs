//! Media query parsing and evaluation
//!
//! Supports the subset a layout actually uses:
//! - width/height ranges: `(min-width: 768px)`, `(max-height: 40em)`
//! - `(orientation: portrait|landscape)`
//! - `(prefers-color-scheme: dark|light)`
//! - media types `all`, `screen`, `print`, with `not` / `only` prefixes
//! - `and` between terms and `,` between alternatives

use std::fmt;
use std::str::FromStr;

use super::geometry::{ColorScheme, MediaType, Viewport};
use crate::error::{DomainError, DomainResult};

/// Pixels per `em`/`rem` when the query uses relative units.
const PX_PER_EM: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Feature {
    MinWidth(f64),
    MaxWidth(f64),
    MinHeight(f64),
    MaxHeight(f64),
    Orientation(Orientation),
    ColorScheme(ColorScheme),
}

impl Feature {
    fn matches(self, viewport: &Viewport) -> bool {
        match self {
            Self::MinWidth(px) => viewport.width >= px,
            Self::MaxWidth(px) => viewport.width <= px,
            Self::MinHeight(px) => viewport.height >= px,
            Self::MaxHeight(px) => viewport.height <= px,
            Self::Orientation(Orientation::Portrait) => viewport.height >= viewport.width,
            Self::Orientation(Orientation::Landscape) => viewport.width > viewport.height,
            Self::ColorScheme(scheme) => viewport.color_scheme == scheme,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Alternative {
    negated: bool,
    media_type: MediaType,
    features: Vec<Feature>,
}

impl Alternative {
    fn matches(&self, viewport: &Viewport) -> bool {
        let type_ok = match self.media_type {
            MediaType::All => true,
            expected => viewport.media_type == expected,
        };
        let hit = type_ok && self.features.iter().all(|f| f.matches(viewport));
        hit != self.negated
    }
}

/// A parsed media query list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    source: String,
    alternatives: Vec<Alternative>,
}

impl MediaQuery {
    /// Parses a media query list.
    ///
    /// An empty string is a query that always matches.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMediaQuery`] for syntax the parser
    /// does not understand.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let source = input.trim().to_string();
        let alternatives = if source.is_empty() {
            Vec::new()
        } else {
            source
                .split(',')
                .map(parse_alternative)
                .collect::<DomainResult<Vec<_>>>()?
        };
        Ok(Self {
            source,
            alternatives,
        })
    }

    /// Evaluates the query against `viewport`.
    #[must_use]
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.alternatives.is_empty() || self.alternatives.iter().any(|a| a.matches(viewport))
    }

    /// The query text as given.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for MediaQuery {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Group(&'a str),
}

fn tokenize(input: &str) -> DomainResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('(') {
            let Some(end) = after.find(')') else {
                return Err(invalid(input, "unclosed parenthesis"));
            };
            tokens.push(Token::Group(after[..end].trim()));
            rest = after[end + 1..].trim_start();
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                .unwrap_or(rest.len());
            if end == 0 {
                return Err(invalid(input, "unexpected ')'"));
            }
            tokens.push(Token::Word(&rest[..end]));
            rest = rest[end..].trim_start();
        }
    }

    Ok(tokens)
}

fn parse_alternative(input: &str) -> DomainResult<Alternative> {
    let tokens = tokenize(input)?;
    let mut iter = tokens.into_iter().peekable();
    let mut negated = false;
    let mut media_type = None;
    let mut features = Vec::new();

    let prefix = match iter.peek() {
        Some(Token::Word(word)) => Some(word.to_ascii_lowercase()),
        _ => None,
    };
    match prefix.as_deref() {
        Some("not") => {
            negated = true;
            iter.next();
        }
        Some("only") => {
            iter.next();
        }
        _ => {}
    }

    let mut expect_term = true;
    for token in iter {
        match (expect_term, token) {
            (true, Token::Group(group)) => {
                features.push(parse_feature(input, group)?);
                expect_term = false;
            }
            (true, Token::Word(word)) if media_type.is_none() && features.is_empty() => {
                media_type = Some(parse_media_type(input, word)?);
                expect_term = false;
            }
            (false, Token::Word(word)) if word.eq_ignore_ascii_case("and") => {
                expect_term = true;
            }
            (_, token) => return Err(invalid(input, &format!("unexpected {token:?}"))),
        }
    }

    if expect_term {
        return Err(invalid(input, "expected a media type or feature"));
    }
    if negated && media_type.is_none() {
        return Err(invalid(input, "'not' requires a media type"));
    }

    Ok(Alternative {
        negated,
        media_type: media_type.unwrap_or(MediaType::All),
        features,
    })
}

fn parse_media_type(query: &str, word: &str) -> DomainResult<MediaType> {
    match word.to_ascii_lowercase().as_str() {
        "all" => Ok(MediaType::All),
        "screen" => Ok(MediaType::Screen),
        "print" => Ok(MediaType::Print),
        other => Err(invalid(query, &format!("unknown media type '{other}'"))),
    }
}

fn parse_feature(query: &str, group: &str) -> DomainResult<Feature> {
    let Some((name, value)) = group.split_once(':') else {
        return Err(invalid(query, &format!("feature '{group}' has no value")));
    };
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim().to_ascii_lowercase();

    let feature = match name.as_str() {
        "min-width" => Feature::MinWidth(parse_length(query, &value)?),
        "max-width" => Feature::MaxWidth(parse_length(query, &value)?),
        "min-height" => Feature::MinHeight(parse_length(query, &value)?),
        "max-height" => Feature::MaxHeight(parse_length(query, &value)?),
        "orientation" => match value.as_str() {
            "portrait" => Feature::Orientation(Orientation::Portrait),
            "landscape" => Feature::Orientation(Orientation::Landscape),
            _ => return Err(invalid(query, &format!("unknown orientation '{value}'"))),
        },
        "prefers-color-scheme" => match value.as_str() {
            "dark" => Feature::ColorScheme(ColorScheme::Dark),
            "light" => Feature::ColorScheme(ColorScheme::Light),
            _ => return Err(invalid(query, &format!("unknown color scheme '{value}'"))),
        },
        _ => return Err(invalid(query, &format!("unsupported feature '{name}'"))),
    };

    Ok(feature)
}

fn parse_length(query: &str, value: &str) -> DomainResult<f64> {
    let (number, scale) = if let Some(n) = value.strip_suffix("px") {
        (n, Some(1.0))
    } else if let Some(n) = value.strip_suffix("rem") {
        (n, Some(PX_PER_EM))
    } else if let Some(n) = value.strip_suffix("em") {
        (n, Some(PX_PER_EM))
    } else {
        (value, None)
    };

    let parsed: f64 = number
        .trim()
        .parse()
        .map_err(|_| invalid(query, &format!("invalid length '{value}'")))?;

    // A bare number is only valid for zero.
    let Some(scale) = scale.or_else(|| (parsed == 0.0).then_some(1.0)) else {
        return Err(invalid(query, &format!("length '{value}' needs a unit")));
    };
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(query, &format!("invalid length '{value}'")));
    }

    Ok(parsed * scale)
}

fn invalid(query: &str, reason: &str) -> DomainError {
    DomainError::InvalidMediaQuery(format!("{reason} in '{}'", query.trim()))
}

/// Tracks whether a media query matches as the viewport changes.
///
/// Starts out not matching, which is also the answer when no viewport is
/// known (for example while rendering on a server).
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryWatcher {
    query: MediaQuery,
    matches: bool,
}

impl MediaQueryWatcher {
    /// Creates a watcher for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not parse.
    pub fn new(query: &str) -> DomainResult<Self> {
        Ok(Self {
            query: MediaQuery::parse(query)?,
            matches: false,
        })
    }

    /// Current answer.
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.matches
    }

    /// The watched query.
    #[must_use]
    pub const fn query(&self) -> &MediaQuery {
        &self.query
    }

    /// Re-evaluates against `viewport`, returning the new answer if it changed.
    pub fn update(&mut self, viewport: &Viewport) -> Option<bool> {
        let now = self.query.matches(viewport);
        (now != self.matches).then(|| {
            self.matches = now;
            now
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn phone() -> Viewport {
        Viewport::new(375.0, 812.0)
    }

    fn desktop() -> Viewport {
        Viewport::new(1440.0, 900.0)
    }

    #[test]
    fn test_width_ranges() {
        let mobile = MediaQuery::parse("(max-width: 768px)").unwrap();
        assert!(mobile.matches(&phone()));
        assert!(!mobile.matches(&desktop()));

        let wide = MediaQuery::parse("(min-width: 64em)").unwrap();
        assert!(wide.matches(&desktop()));
        assert!(!wide.matches(&phone()));
    }

    #[test]
    fn test_conjunction_and_media_type() {
        let tablet = MediaQuery::parse("screen and (min-width: 600px) and (max-width: 1024px)")
            .unwrap();
        assert!(tablet.matches(&Viewport::new(800.0, 1000.0)));
        assert!(!tablet.matches(&desktop()));
    }

    #[test]
    fn test_alternatives_and_negation() {
        let query = MediaQuery::parse("print, (orientation: portrait)").unwrap();
        assert!(query.matches(&phone()));
        assert!(!query.matches(&desktop()));

        let not_print = MediaQuery::parse("not print").unwrap();
        assert!(not_print.matches(&desktop()));

        let only_screen = MediaQuery::parse("only screen and (orientation: landscape)").unwrap();
        assert!(only_screen.matches(&desktop()));
    }

    #[test]
    fn test_color_scheme() {
        let dark = MediaQuery::parse("(prefers-color-scheme: dark)").unwrap();
        assert!(!dark.matches(&desktop()));
        assert!(dark.matches(&desktop().with_color_scheme(ColorScheme::Dark)));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(MediaQuery::parse("  ").unwrap().matches(&phone()));
    }

    #[test]
    fn test_rejects_bad_syntax() {
        for bad in [
            "(min-width: 10px",
            "(min-width)",
            "(min-width: 10vw)",
            "(min-width: 100)",
            "(hover: hover)",
            "screen (min-width: 1px)",
            "screen and",
            "not (min-width: 1px)",
            "tv",
        ] {
            assert!(
                matches!(MediaQuery::parse(bad), Err(DomainError::InvalidMediaQuery(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_bare_zero_is_allowed() {
        assert!(MediaQuery::parse("(min-width: 0)").unwrap().matches(&phone()));
    }

    #[test]
    fn test_watcher_reports_changes_only() {
        let mut watcher = MediaQueryWatcher::new("(max-width: 768px)").unwrap();
        assert!(!watcher.matches());

        assert_eq!(watcher.update(&phone()), Some(true));
        assert_eq!(watcher.update(&Viewport::new(400.0, 700.0)), None);
        assert_eq!(watcher.update(&desktop()), Some(false));
        assert!(!watcher.matches());
    }
}
