//! printf-style templates for ticket ids and commit messages.
//!
//! Only three conversions are understood: `%d` (integer), `%s` (string) and
//! `%%` (a literal percent sign). Templates are parsed once, when the session
//! is assembled, and checked against the exact list of slots their caller
//! will fill, so rendering itself cannot fail.

use crate::error::{EvolveError, Result};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Int,
    Str,
}

impl Slot {
    fn conversion(self) -> &'static str {
        match self {
            Slot::Int => "%d",
            Slot::Str => "%s",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot(Slot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

static CONVERSION_RE: OnceLock<Regex> = OnceLock::new();

fn conversion_re() -> &'static Regex {
    CONVERSION_RE.get_or_init(|| Regex::new(r"%(.?)").unwrap())
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: String| EvolveError::InvalidTemplate {
            template: source.to_string(),
            reason,
        };

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut last = 0;
        for caps in conversion_re().captures_iter(source) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            literal.push_str(&source[last..whole.start]);
            last = whole.end;
            match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
                "%" => literal.push('%'),
                "d" | "s" => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    let slot = if &caps[1] == "d" { Slot::Int } else { Slot::Str };
                    pieces.push(Piece::Slot(slot));
                }
                "" => return Err(invalid("dangling '%' at end of template".to_string())),
                other => return Err(invalid(format!("unsupported conversion '%{other}'"))),
            }
        }
        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// Parse and require exactly `expected` slots, in order.
    pub fn with_slots(source: &str, expected: &[Slot]) -> Result<Self> {
        let template = Self::parse(source)?;
        let found = template.slots();
        if found != expected {
            let want: Vec<&str> = expected.iter().map(|s| s.conversion()).collect();
            let got: Vec<&str> = found.iter().map(|s| s.conversion()).collect();
            return Err(EvolveError::InvalidTemplate {
                template: source.to_string(),
                reason: format!(
                    "expected placeholders [{}] but found [{}]",
                    want.join(", "),
                    got.join(", ")
                ),
            });
        }
        Ok(template)
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Slot(s) => Some(*s),
                Piece::Literal(_) => None,
            })
            .collect()
    }

    /// For a template with a single `%d`, the number that renders to `text`,
    /// if there is one.
    pub fn int_for(&self, text: &str) -> Option<u64> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut seen = false;
        for piece in &self.pieces {
            match piece {
                Piece::Literal(lit) if seen => suffix.push_str(lit),
                Piece::Literal(lit) => prefix.push_str(lit),
                Piece::Slot(Slot::Int) if !seen => seen = true,
                Piece::Slot(_) => return None,
            }
        }
        if !seen {
            return None;
        }
        let digits = text.strip_prefix(prefix.as_str())?.strip_suffix(suffix.as_str())?;
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits.len() == 1 || !digits.starts_with('0'));
        if !canonical {
            return None;
        }
        digits.parse().ok()
    }

    /// Fill the slots in order. Missing arguments render as empty strings.
    pub fn render(&self, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.source.len() + 32);
        let mut args = args.iter();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Slot(_) => out.push_str(args.next().copied().unwrap_or("")),
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_template_renders_number() {
        let t = Template::with_slots("ACME-%d", &[Slot::Int]).unwrap();
        assert_eq!(t.render(&["7"]), "ACME-7");
    }

    #[test]
    fn message_template_keeps_leading_blank_ticket() {
        let t = Template::with_slots("%s %s", &[Slot::Str, Slot::Str]).unwrap();
        assert_eq!(t.render(&["", "body"]), " body");
        assert_eq!(t.render(&["ACME-1", "body"]), "ACME-1 body");
    }

    #[test]
    fn percent_escape_is_literal() {
        let t = Template::with_slots("100%% done: %s", &[Slot::Str]).unwrap();
        assert_eq!(t.render(&["yes"]), "100% done: yes");
    }

    #[test]
    fn wrong_slot_count_is_rejected() {
        let err = Template::with_slots("ACME", &[Slot::Int]).unwrap_err();
        assert!(matches!(err, EvolveError::InvalidTemplate { .. }));
        assert!(Template::with_slots("%s", &[Slot::Str, Slot::Str]).is_err());
        assert!(Template::with_slots("%s-%d", &[Slot::Int]).is_err());
    }

    #[test]
    fn int_for_inverts_render() {
        let t = Template::with_slots("T-%d-x", &[Slot::Int]).unwrap();
        assert_eq!(t.int_for("T-42-x"), Some(42));
        assert_eq!(t.int_for("T-042-x"), None);
        assert_eq!(t.int_for("T--x"), None);
        assert_eq!(t.int_for("T-4a-x"), None);
        assert_eq!(t.int_for("master"), None);

        let s = Template::with_slots("%s", &[Slot::Str]).unwrap();
        assert_eq!(s.int_for("7"), None);
    }

    #[test]
    fn unsupported_conversion_is_rejected() {
        assert!(Template::parse("T-%x").is_err());
        assert!(Template::parse("T-%").is_err());
    }
}
