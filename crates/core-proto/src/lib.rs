//! Wire protocol for the line-oriented UDP command language.
//!
//! Scope: turn one trimmed datagram line into a typed [`Command`], or reject
//! it with a [`ParseError`]. Parsing never clamps numeric values or validates
//! colors — those are Cell Model (`core-grid`) concerns applied at ingress
//! into the grid, not at the wire boundary. This keeps `parse` a pure,
//! allocation-light function that rejects only what the grammar itself
//! disallows (§4.2).

use std::fmt;

/// Horizontal text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

impl Anchor {
    /// Map a wire token to an anchor, case-insensitively. Unknown tokens fall
    /// back to `Left` per the protocol's anchor table.
    pub fn from_token(token: &str) -> Anchor {
        match token.to_ascii_lowercase().as_str() {
            "c" | "center" | "centre" | "mid" | "middle" => Anchor::Center,
            "r" | "right" => Anchor::Right,
            _ => Anchor::Left,
        }
    }

    /// True if `token` is recognized as one of the align keywords (used by
    /// the implicit `SET` form to disambiguate the 5th token).
    fn is_align_token(token: &str) -> bool {
        matches!(
            token.to_ascii_lowercase().as_str(),
            "l" | "left" | "c" | "center" | "centre" | "mid" | "middle" | "r" | "right"
        )
    }
}

/// Style fields shared by `RING`, `RINGSET`, and the style half of a
/// freshly-initialized `RINGVAL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingStyle {
    pub fg_outer: String,
    pub fg_inner: String,
    pub bg: String,
    pub size_px: i64,
    pub width_outer: i64,
    pub width_inner: i64,
}

/// A fully parsed wire command, addressed by `(row, col)` exactly as typed
/// downstream components expect. Numeric fields are carried unclamped;
/// `core-grid` owns clamping to `[0,127]` on ingress (§3 invariant 4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Implicit `SET` form: `<col> <row> <fg> <bg> [<align>] <text...>`.
    Set {
        row: i64,
        col: i64,
        fg: String,
        bg: String,
        align: Option<Anchor>,
        text: String,
    },
    SetBg {
        row: i64,
        col: i64,
        bg: String,
    },
    SetAlign {
        row: i64,
        col: i64,
        align: Anchor,
    },
    BarValue {
        row: i64,
        col: i64,
        value: i64,
    },
    RingStyle {
        row: i64,
        col: i64,
        style: RingStyle,
    },
    RingValue {
        row: i64,
        col: i64,
        outer: i64,
        inner: i64,
        center_text: Option<String>,
    },
    RingAll {
        row: i64,
        col: i64,
        outer: i64,
        inner: i64,
        style: RingStyle,
    },
    RingExtraArcs {
        row: i64,
        col: i64,
        v1: i64,
        v2: i64,
    },
}

impl Command {
    /// The `(row, col)` address every command variant carries.
    pub fn address(&self) -> (i64, i64) {
        match self {
            Command::Set { row, col, .. }
            | Command::SetBg { row, col, .. }
            | Command::SetAlign { row, col, .. }
            | Command::BarValue { row, col, .. }
            | Command::RingStyle { row, col, .. }
            | Command::RingValue { row, col, .. }
            | Command::RingAll { row, col, .. }
            | Command::RingExtraArcs { row, col, .. } => (*row, *col),
        }
    }
}

/// Reason a line was rejected. The network boundary only ever "drops" (§4.1),
/// but carrying the reason as a typed enum (rather than a string) lets tests
/// and telemetry match on it without parsing log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("unknown command head")]
    UnknownHead,
    #[error("too few tokens for this head")]
    TooFewTokens,
    #[error("expected an integer token")]
    InvalidInteger,
}

/// Parse one trimmed line into a [`Command`].
///
/// `line` should already have leading/trailing whitespace and a single
/// trailing `;` stripped by the caller (the Datagram Receiver does this
/// before handing bytes here); `parse` additionally tolerates an untrimmed
/// trailing `;` on the implicit `SET` text tail since that field runs to
/// end-of-line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut tokens = line.split_ascii_whitespace();
    let first = tokens.next().ok_or(ParseError::Empty)?;

    match first.to_ascii_uppercase().as_str() {
        "BG" => parse_bg(tokens),
        "ALIGN" => parse_align(tokens),
        "BAR" => parse_bar(tokens),
        "RING" => parse_ring(tokens),
        "RINGVAL" => parse_ringval(line),
        "RINGSET" => parse_ringset(tokens),
        "ARC" => parse_arc(tokens),
        _ => parse_set(line),
    }
}

fn next_int<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<i64, ParseError> {
    tokens
        .next()
        .ok_or(ParseError::TooFewTokens)?
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger)
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, ParseError> {
    tokens.next().ok_or(ParseError::TooFewTokens)
}

fn parse_bg<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let row = next_int(&mut tokens)?;
    let col = next_int(&mut tokens)?;
    let bg = next_token(&mut tokens)?.to_string();
    Ok(Command::SetBg { row, col, bg })
}

fn parse_align<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let row = next_int(&mut tokens)?;
    let col = next_int(&mut tokens)?;
    let align = Anchor::from_token(next_token(&mut tokens)?);
    Ok(Command::SetAlign { row, col, align })
}

fn parse_bar<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let row = next_int(&mut tokens)?;
    let col = next_int(&mut tokens)?;
    let value = next_int(&mut tokens)?;
    Ok(Command::BarValue { row, col, value })
}

fn parse_ring_style<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<RingStyle, ParseError> {
    let fg_outer = next_token(tokens)?.to_string();
    let fg_inner = next_token(tokens)?.to_string();
    let bg = next_token(tokens)?.to_string();
    let size_px = next_int(tokens)?;
    let width_outer = next_int(tokens)?;
    let width_inner = next_int(tokens)?;
    Ok(RingStyle {
        fg_outer,
        fg_inner,
        bg,
        size_px,
        width_outer,
        width_inner,
    })
}

/// `RING` and `ARC` use the `col row` order, the opposite of `SET`/`BG`/
/// `ALIGN`/`BAR`. This asymmetry is load-bearing (§4.2) — swapping it is a
/// conformance bug, not a style choice.
fn parse_ring<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let col = next_int(&mut tokens)?;
    let row = next_int(&mut tokens)?;
    let style = parse_ring_style(&mut tokens)?;
    Ok(Command::RingStyle { row, col, style })
}

fn parse_ringval(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_ascii_whitespace();
    let _head = tokens.next().ok_or(ParseError::TooFewTokens)?;
    let col = next_int(&mut tokens)?;
    let row = next_int(&mut tokens)?;
    let outer = next_int(&mut tokens)?;
    let inner = next_int(&mut tokens)?;
    let rest: Vec<&str> = tokens.collect();
    let center_text = if rest.is_empty() {
        None
    } else {
        let joined = rest.join(" ");
        Some(joined.strip_suffix(';').unwrap_or(&joined).to_string())
    };
    Ok(Command::RingValue {
        row,
        col,
        outer,
        inner,
        center_text,
    })
}

fn parse_ringset<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let col = next_int(&mut tokens)?;
    let row = next_int(&mut tokens)?;
    let outer = next_int(&mut tokens)?;
    let inner = next_int(&mut tokens)?;
    let style = parse_ring_style(&mut tokens)?;
    Ok(Command::RingAll {
        row,
        col,
        outer,
        inner,
        style,
    })
}

fn parse_arc<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Command, ParseError> {
    let col = next_int(&mut tokens)?;
    let row = next_int(&mut tokens)?;
    let v1 = next_int(&mut tokens)?;
    let v2 = next_int(&mut tokens)?;
    Ok(Command::RingExtraArcs { row, col, v1, v2 })
}

/// Implicit `SET`: `<col> <row> <fg> <bg> [<align>] <text...>`. The 5th
/// token is `align` iff it is a recognized align keyword; otherwise it is
/// the start of `text`, which always runs to end-of-line.
fn parse_set(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_ascii_whitespace();
    let col = next_int(&mut tokens)?;
    let row = next_int(&mut tokens)?;
    let fg = next_token(&mut tokens)?.to_string();
    let bg = next_token(&mut tokens)?.to_string();

    let rest: Vec<&str> = tokens.collect();
    let (align, text_tokens): (Option<Anchor>, &[&str]) = match rest.first() {
        Some(tok) if Anchor::is_align_token(tok) => (Some(Anchor::from_token(tok)), &rest[1..]),
        _ => (None, &rest[..]),
    };
    let joined = text_tokens.join(" ");
    let text = joined.strip_suffix(';').unwrap_or(&joined).to_string();
    Ok(Command::Set {
        row,
        col,
        fg,
        bg,
        align,
        text,
    })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, col) = self.address();
        write!(f, "{:?}@({row},{col})", std::mem::discriminant(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_implicit_set_without_align() {
        let cmd = parse("0 0 #ffffff #000000 HELLO").unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                row: 0,
                col: 0,
                fg: "#ffffff".into(),
                bg: "#000000".into(),
                align: None,
                text: "HELLO".into(),
            }
        );
    }

    #[test]
    fn parses_implicit_set_with_align_and_trailing_semicolon() {
        let cmd = parse("0 0 #ffffff #000000 left HELLO WORLD;").unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                row: 0,
                col: 0,
                fg: "#ffffff".into(),
                bg: "#000000".into(),
                align: Some(Anchor::Left),
                text: "HELLO WORLD".into(),
            }
        );
    }

    #[test]
    fn set_disambiguates_non_align_fifth_token_as_text() {
        let cmd = parse("0 0 #fff #000 NOTANALIGN rest").unwrap();
        match cmd {
            Command::Set { align, text, .. } => {
                assert_eq!(align, None);
                assert_eq!(text, "NOTANALIGN rest");
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn parses_bg_with_row_col_order() {
        let cmd = parse("BG 1 2 #123456").unwrap();
        assert_eq!(
            cmd,
            Command::SetBg {
                row: 1,
                col: 2,
                bg: "#123456".into(),
            }
        );
    }

    #[test]
    fn parses_align_case_insensitive_head() {
        let cmd = parse("align 3 1 center").unwrap();
        assert_eq!(
            cmd,
            Command::SetAlign {
                row: 3,
                col: 1,
                align: Anchor::Center,
            }
        );
    }

    #[test]
    fn parses_bar() {
        let cmd = parse("BAR 3 0 64").unwrap();
        assert_eq!(
            cmd,
            Command::BarValue {
                row: 3,
                col: 0,
                value: 64,
            }
        );
    }

    #[test]
    fn parses_ring_with_col_row_order() {
        let cmd = parse("RING 2 1 #aaa #bbb #000 280 10 27").unwrap();
        assert_eq!(
            cmd,
            Command::RingStyle {
                row: 1,
                col: 2,
                style: RingStyle {
                    fg_outer: "#aaa".into(),
                    fg_inner: "#bbb".into(),
                    bg: "#000".into(),
                    size_px: 280,
                    width_outer: 10,
                    width_inner: 27,
                },
            }
        );
    }

    #[test]
    fn parses_ringval_without_text() {
        let cmd = parse("RINGVAL 0 1 64 32").unwrap();
        assert_eq!(
            cmd,
            Command::RingValue {
                row: 1,
                col: 0,
                outer: 64,
                inner: 32,
                center_text: None,
            }
        );
    }

    #[test]
    fn parses_ringval_with_text() {
        let cmd = parse("RINGVAL 0 1 64 32 LOUD MIX;").unwrap();
        assert_eq!(
            cmd,
            Command::RingValue {
                row: 1,
                col: 0,
                outer: 64,
                inner: 32,
                center_text: Some("LOUD MIX".into()),
            }
        );
    }

    #[test]
    fn parses_ringset() {
        let cmd = parse("RINGSET 2 1 10 20 #aaa #bbb #000 280 10 27").unwrap();
        assert_eq!(
            cmd,
            Command::RingAll {
                row: 1,
                col: 2,
                outer: 10,
                inner: 20,
                style: RingStyle {
                    fg_outer: "#aaa".into(),
                    fg_inner: "#bbb".into(),
                    bg: "#000".into(),
                    size_px: 280,
                    width_outer: 10,
                    width_inner: 27,
                },
            }
        );
    }

    #[test]
    fn parses_arc_with_col_row_order() {
        let cmd = parse("ARC 2 1 5 9").unwrap();
        assert_eq!(
            cmd,
            Command::RingExtraArcs {
                row: 1,
                col: 2,
                v1: 5,
                v2: 9,
            }
        );
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_too_few_tokens() {
        assert_eq!(parse("BG 1"), Err(ParseError::TooFewTokens));
        assert_eq!(parse("BAR 1 2"), Err(ParseError::TooFewTokens));
    }

    #[test]
    fn rejects_non_integer_where_integer_expected() {
        assert_eq!(parse("BG x 2 #fff"), Err(ParseError::InvalidInteger));
    }

    #[test]
    fn accepts_negative_addresses_leaving_range_guard_to_the_grid() {
        // The parser only rejects what the grammar disallows; address-range
        // guarding is a Cell Model concern (§4.1 P6).
        let cmd = parse("BG -1 2 #fff").unwrap();
        assert_eq!(cmd.address(), (-1, 2));
    }
}
