//! License information — atomic licenses combined by an AND/OR boolean tree
//!
//! Declared, observed, overridden, and configured license facts all carry a
//! `LicenseExpression`. Configured overlays arrive as strings
//! (`MIT OR Apache-2.0`), so the textual form parses here too.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Atomic License ─────────────────────────────────────────────────

/// One atomic license: a short identifier (SPDX where possible) plus
/// optional long name and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl License {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            long_name: None,
            text: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
    }

    pub fn family(&self) -> LicenseFamily {
        LicenseFamily::from_spdx(&self.id)
    }
}

// ─── Expression Tree ────────────────────────────────────────────────

/// A license expression: an atom or an explicit AND/OR combination.
///
/// Two licenses combine as `(A AND B)`; three or more right-fold:
/// `(A AND (B AND C))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseExpression {
    Atom(License),
    And(Box<LicenseExpression>, Box<LicenseExpression>),
    Or(Box<LicenseExpression>, Box<LicenseExpression>),
}

impl LicenseExpression {
    pub fn atom(id: impl Into<String>) -> Self {
        Self::Atom(License::new(id))
    }

    pub fn and(left: LicenseExpression, right: LicenseExpression) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: LicenseExpression, right: LicenseExpression) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Right-fold a list into a conjunction: `[A, B, C]` → `(A AND (B AND C))`
    pub fn and_all(mut terms: Vec<LicenseExpression>) -> Option<LicenseExpression> {
        let last = terms.pop()?;
        Some(terms.into_iter().rev().fold(last, |acc, t| Self::and(t, acc)))
    }

    /// An expression is empty when every atom in it is empty
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Atom(l) => l.is_empty(),
            Self::And(a, b) | Self::Or(a, b) => a.is_empty() && b.is_empty(),
        }
    }

    /// Flatten to the atomic licenses, left to right
    pub fn licenses(&self) -> Vec<&License> {
        match self {
            Self::Atom(l) => vec![l],
            Self::And(a, b) | Self::Or(a, b) => {
                let mut r = a.licenses();
                r.extend(b.licenses());
                r
            }
        }
    }

    /// Check if any atom belongs to a copyleft family
    pub fn has_copyleft(&self) -> bool {
        self.licenses().iter().any(|l| l.family().is_copyleft())
    }

    /// Parse the textual form. `AND` binds tighter than `OR`;
    /// parentheses group sub-expressions.
    pub fn parse(input: &str) -> Result<Self, String> {
        let tokens = tokenize(input)?;
        let (expr, rest) = parse_or(&tokens)?;
        if !rest.is_empty() {
            return Err(format!("Unexpected tokens after expression: {:?}", rest));
        }
        Ok(expr)
    }
}

impl fmt::Display for LicenseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(l) => write!(f, "{}", l.id),
            Self::And(a, b) => write!(f, "({} AND {})", a, b),
            Self::Or(a, b) => write!(f, "({} OR {})", a, b),
        }
    }
}

// ─── Tokenizer ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ' ' || c == '\t' || c == '(' || c == ')' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                match word.to_uppercase().as_str() {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Identifier(word)),
                }
            }
        }
    }

    Ok(tokens)
}

// ─── Recursive Descent Parser ───────────────────────────────────────
// Precedence: AND > OR

fn parse_or(tokens: &[Token]) -> Result<(LicenseExpression, &[Token]), String> {
    let (mut left, mut rest) = parse_and(tokens)?;

    while !rest.is_empty() && rest[0] == Token::Or {
        let (right, r) = parse_and(&rest[1..])?;
        left = LicenseExpression::or(left, right);
        rest = r;
    }

    Ok((left, rest))
}

fn parse_and(tokens: &[Token]) -> Result<(LicenseExpression, &[Token]), String> {
    let (mut left, mut rest) = parse_primary(tokens)?;

    while !rest.is_empty() && rest[0] == Token::And {
        let (right, r) = parse_primary(&rest[1..])?;
        left = LicenseExpression::and(left, right);
        rest = r;
    }

    Ok((left, rest))
}

fn parse_primary(tokens: &[Token]) -> Result<(LicenseExpression, &[Token]), String> {
    if tokens.is_empty() {
        return Err("Unexpected end of expression".to_string());
    }

    match &tokens[0] {
        Token::LParen => {
            let (expr, rest) = parse_or(&tokens[1..])?;
            if rest.is_empty() || rest[0] != Token::RParen {
                return Err("Missing closing parenthesis".to_string());
            }
            Ok((expr, &rest[1..]))
        }
        Token::Identifier(id) => Ok((LicenseExpression::atom(id.clone()), &tokens[1..])),
        other => Err(format!("Unexpected token: {:?}", other)),
    }
}

// ─── License Families ───────────────────────────────────────────────

/// Broad classification used by the built-in policy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseFamily {
    /// MIT, BSD, ISC, Apache — few obligations beyond attribution
    Permissive,
    /// LGPL, MPL, EPL — modified files must be disclosed
    WeakCopyleft,
    /// GPL — derivative works must use the same license
    StrongCopyleft,
    /// AGPL, SSPL — propagates across network boundaries
    NetworkCopyleft,
    /// Commercial, all-rights-reserved
    Proprietary,
    /// Unrecognized identifier
    Unknown,
}

impl LicenseFamily {
    pub fn is_copyleft(&self) -> bool {
        matches!(
            self,
            Self::StrongCopyleft | Self::WeakCopyleft | Self::NetworkCopyleft
        )
    }

    /// Determine family from an SPDX-ish identifier.
    /// `-only`/`-or-later`/`+` suffixes do not change the family.
    pub fn from_spdx(spdx: &str) -> Self {
        let upper = spdx.trim().to_uppercase();
        let normalized = upper
            .trim_end_matches("-ONLY")
            .trim_end_matches("-OR-LATER")
            .trim_end_matches('+');

        match normalized {
            s if s.starts_with("AGPL") || s.contains("SSPL") => Self::NetworkCopyleft,
            s if s.starts_with("LGPL") => Self::WeakCopyleft,
            s if s.starts_with("GPL") => Self::StrongCopyleft,
            s if s.starts_with("MPL") || s.starts_with("EPL") || s.starts_with("CDDL") => {
                Self::WeakCopyleft
            }
            s if s.starts_with("EUPL") || s.starts_with("CECILL") => Self::WeakCopyleft,
            "MIT" | "ISC" | "ZLIB" | "UNLICENSE" | "CC0-1.0" | "0BSD" => Self::Permissive,
            s if s.starts_with("BSD-") || s.starts_with("APACHE-") => Self::Permissive,
            s if s.contains("PROPRIETARY") || s.contains("COMMERCIAL") => Self::Proprietary,
            "" => Self::Unknown,
            _ => Self::Unknown,
        }
    }
}
