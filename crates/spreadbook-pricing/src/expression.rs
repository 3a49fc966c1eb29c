//! Compound instrument expression parsing.
//!
//! Two families of expressions are recognized:
//!
//! - **Structural shorthand** — dot-separated, no arithmetic operators.
//!   `aud.10y` is an outright, `aud.5y5y` a forward-forward, `aud.130526.1y`
//!   a fixed-date leg, `aud.5y.10y` a curve spread, and
//!   `aud.5y5y.10y10y.20y10y` a butterfly.
//! - **General arithmetic** — atoms combined with `+`, `-`, and optional
//!   `coefficient*` prefixes, e.g. `2*aud.5y5y - aud.2y2y - aud.10y10y` or
//!   `aud.10y10y - eur.10y10y`.
//!
//! Futures expressions (`xmz5 comdty - ymz5 comdty`) use the same
//! arithmetic rules over the listed-contract atom grammar.
//!
//! Parsing produces an ordered list of signed legs; the order is
//! deterministic (structural forms emit long/body legs first, arithmetic
//! forms emit legs in textual order) and downstream solving relies on it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PricingError, PricingResult};

/// One primitive instrument inside a compound expression, with its signed
/// multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLeg {
    /// Instrument atom, e.g. "aud.5y5y" or "xmz5 comdty".
    pub atom: String,
    /// Signed multiplier applied to this leg's level.
    pub coefficient: Decimal,
}

impl ParsedLeg {
    fn new(atom: impl Into<String>, coefficient: Decimal) -> Self {
        Self {
            atom: atom.into(),
            coefficient,
        }
    }
}

// =============================================================================
// ATOM GRAMMAR
// =============================================================================

/// Currency/sub-code: lowercase alphanumeric with at least one letter
/// ("aud", "eurxc", "aud6s3s"). Requiring a letter keeps decimal
/// coefficients like "2.5" from reading as atoms.
pub(crate) fn is_code(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && s.bytes().any(|b| b.is_ascii_lowercase())
}

/// Bare tenor: digits followed by one of y/m/d ("10y", "6m", "90d").
pub(crate) fn is_bare_tenor(s: &str) -> bool {
    s.len() >= 2
        && s[..s.len() - 1].bytes().all(|b| b.is_ascii_digit())
        && matches!(s.as_bytes()[s.len() - 1], b'y' | b'm' | b'd')
}

/// Splits a forward-forward tenor ("5y5y") into its forward and tenor
/// halves. Returns `None` for anything else.
pub(crate) fn split_forward_tenor(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits >= bytes.len() {
        return None;
    }
    if !matches!(bytes[digits], b'y' | b'm' | b'd') {
        return None;
    }
    let (forward, rest) = s.split_at(digits + 1);
    if is_bare_tenor(rest) {
        Some((forward, rest))
    } else {
        None
    }
}

/// Fixed-date part: exactly six digits (DDMMYY).
pub(crate) fn is_fixed_date(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a string is a complete curve instrument atom.
pub(crate) fn is_curve_atom(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [code, tenor] => {
            is_code(code) && (is_bare_tenor(tenor) || split_forward_tenor(tenor).is_some())
        }
        [code, date, tenor] => is_code(code) && is_fixed_date(date) && is_bare_tenor(tenor),
        _ => false,
    }
}

const FUTURES_SUFFIXES: [&str; 3] = ["comdty", "curncy", "index"];

/// Whether a string is a complete futures contract atom
/// ("xmz5 comdty", "eurusd curncy").
pub(crate) fn is_futures_atom(s: &str) -> bool {
    match s.split_once(' ') {
        Some((code, suffix)) => {
            !code.is_empty()
                && code
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
                && FUTURES_SUFFIXES.contains(&suffix)
        }
        None => false,
    }
}

// =============================================================================
// TOKENIZER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Plus,
    Minus,
    Star,
    Term(String),
}

fn tokenize(expr: &str) -> PricingResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut term = String::new();

    for ch in expr.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '.' => term.push(ch),
            '+' | '-' | '*' | ' ' | '\t' => {
                if !term.is_empty() {
                    tokens.push(Token::Term(std::mem::take(&mut term)));
                }
                match ch {
                    '+' => tokens.push(Token::Plus),
                    '-' => tokens.push(Token::Minus),
                    '*' => tokens.push(Token::Star),
                    _ => {}
                }
            }
            other => {
                return Err(PricingError::parse_failed(
                    expr,
                    format!("unexpected character {other:?}"),
                ))
            }
        }
    }
    if !term.is_empty() {
        tokens.push(Token::Term(term));
    }
    Ok(tokens)
}

/// Joins adjacent word pairs like ("xmz5", "comdty") into single futures
/// atom terms, so the segment walk below sees one term per contract.
fn merge_futures_terms(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Token::Term(word) = &token {
            if FUTURES_SUFFIXES.contains(&word.as_str()) {
                if let Some(Token::Term(prev)) = merged.last_mut() {
                    if !prev.contains(' ') {
                        prev.push(' ');
                        prev.push_str(word);
                        continue;
                    }
                }
            }
        }
        merged.push(token);
    }
    merged
}

/// Walks the token stream tracking a running sign across top-level `+`/`-`,
/// consuming one `[coefficient*]atom` segment at a time. Each atom token is
/// consumed exactly once, so atom text can never re-match inside a segment.
fn legs_from_tokens(
    tokens: &[Token],
    is_atom: fn(&str) -> bool,
    expr: &str,
) -> PricingResult<Vec<ParsedLeg>> {
    let mut legs = Vec::new();
    let mut sign = Decimal::ONE;
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Plus => {
                sign = Decimal::ONE;
                i += 1;
            }
            Token::Minus => {
                sign = -Decimal::ONE;
                i += 1;
            }
            Token::Star => {
                return Err(PricingError::parse_failed(expr, "dangling '*'"));
            }
            Token::Term(term) => {
                if matches!(tokens.get(i + 1), Some(Token::Star)) {
                    // coefficient*atom segment
                    let coefficient: Decimal = term.parse().map_err(|_| {
                        PricingError::parse_failed(expr, format!("invalid coefficient {term:?}"))
                    })?;
                    let atom = match tokens.get(i + 2) {
                        Some(Token::Term(atom)) if is_atom(atom) => atom,
                        _ => {
                            return Err(PricingError::parse_failed(
                                expr,
                                format!("expected instrument after {term}*"),
                            ))
                        }
                    };
                    legs.push(ParsedLeg::new(atom.as_str(), coefficient * sign));
                    i += 3;
                } else if is_atom(term) {
                    legs.push(ParsedLeg::new(term.as_str(), sign));
                    i += 1;
                } else {
                    return Err(PricingError::parse_failed(
                        expr,
                        format!("unrecognized term {term:?}"),
                    ));
                }
                // A segment must be followed by an operator or the end.
                if let Some(Token::Term(next)) = tokens.get(i) {
                    return Err(PricingError::parse_failed(
                        expr,
                        format!("expected '+' or '-' before {next:?}"),
                    ));
                }
            }
        }
    }

    if legs.is_empty() {
        return Err(PricingError::parse_failed(
            expr,
            "no instrument atoms recognized",
        ));
    }
    Ok(legs)
}

// =============================================================================
// STRUCTURAL SHORTHAND
// =============================================================================

/// Promotes a bare tenor to its zero-forward outright atom, so the legs of
/// `aud.5y.10y` quote and resolve as `aud.0y10y` / `aud.0y5y`.
fn spread_leg_atom(code: &str, part: &str, expr: &str) -> PricingResult<String> {
    if is_bare_tenor(part) {
        Ok(format!("{code}.0y{part}"))
    } else if split_forward_tenor(part).is_some() {
        Ok(format!("{code}.{part}"))
    } else {
        Err(PricingError::parse_failed(
            expr,
            format!("unrecognized tenor part {part:?}"),
        ))
    }
}

fn butterfly_leg_atom(code: &str, part: &str, expr: &str) -> PricingResult<String> {
    if is_bare_tenor(part) || split_forward_tenor(part).is_some() {
        Ok(format!("{code}.{part}"))
    } else {
        Err(PricingError::parse_failed(
            expr,
            format!("unrecognized tenor part {part:?}"),
        ))
    }
}

fn parse_structural(s: &str, expr: &str) -> PricingResult<Vec<ParsedLeg>> {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [_, _] if is_curve_atom(s) => Ok(vec![ParsedLeg::new(s, Decimal::ONE)]),

        [_, part] => Err(PricingError::parse_failed(
            expr,
            format!("unrecognized tenor part {part:?}"),
        )),

        [code, date, tenor] if is_code(code) && is_fixed_date(date) && is_bare_tenor(tenor) => {
            Ok(vec![ParsedLeg::new(s, Decimal::ONE)])
        }

        // Spread: long leg (last part) +1, short leg -1.
        [code, near, far] if is_code(code) => Ok(vec![
            ParsedLeg::new(spread_leg_atom(code, far, expr)?, Decimal::ONE),
            ParsedLeg::new(spread_leg_atom(code, near, expr)?, -Decimal::ONE),
        ]),

        // Butterfly: body x2 first, then the wings in expression order.
        [code, wing1, body, wing2] if is_code(code) => Ok(vec![
            ParsedLeg::new(butterfly_leg_atom(code, body, expr)?, Decimal::TWO),
            ParsedLeg::new(butterfly_leg_atom(code, wing1, expr)?, -Decimal::ONE),
            ParsedLeg::new(butterfly_leg_atom(code, wing2, expr)?, -Decimal::ONE),
        ]),

        _ => Err(PricingError::parse_failed(
            expr,
            "expected 2-4 dot-separated parts",
        )),
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Parses a curve instrument expression into signed legs.
///
/// # Errors
///
/// Returns `PricingError::ParseFailed` for malformed expressions,
/// unrecognized terms, or expressions with no instrument atoms.
pub fn parse_curve_expression(expr: &str) -> PricingResult<Vec<ParsedLeg>> {
    let normalized = expr.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(PricingError::parse_failed(expr, "empty expression"));
    }
    if normalized.contains('/') {
        return Err(PricingError::parse_failed(expr, "unsupported operator '/'"));
    }

    let legs = if normalized.contains(['+', '-', '*']) {
        let tokens = tokenize(&normalized)?;
        legs_from_tokens(&tokens, is_curve_atom, expr)?
    } else {
        parse_structural(&normalized, expr)?
    };

    debug!(expression = expr, legs = legs.len(), "parsed curve expression");
    Ok(legs)
}

/// Parses a futures contract expression into signed legs.
///
/// # Errors
///
/// Returns `PricingError::ParseFailed` for malformed expressions,
/// unrecognized terms, or expressions with no contract atoms.
pub fn parse_futures_expression(expr: &str) -> PricingResult<Vec<ParsedLeg>> {
    let normalized = expr.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(PricingError::parse_failed(expr, "empty expression"));
    }
    if normalized.contains('/') {
        return Err(PricingError::parse_failed(expr, "unsupported operator '/'"));
    }

    let tokens = merge_futures_terms(tokenize(&normalized)?);
    let legs = legs_from_tokens(&tokens, is_futures_atom, expr)?;

    debug!(expression = expr, legs = legs.len(), "parsed futures expression");
    Ok(legs)
}
