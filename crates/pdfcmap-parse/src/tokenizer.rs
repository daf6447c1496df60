//! PostScript-subset tokenizer for CMap files.
//!
//! Parses raw CMap bytes into a sequence of [`Operator`]s, each carrying the
//! [`Operand`]s that preceded it. CMap files are PostScript resources, so
//! `begincidrange`, `def`, `usecmap` and friends all arrive as operators
//! and the grammar interpreter only has to look at operator names and their
//! operand lists.

use crate::error::ParseError;

/// A CMap operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real (floating-point) number (e.g., `10.001`).
    Real(f64),
    /// Name object (e.g., `/CMapName`). Stored without the leading `/`.
    Name(String),
    /// Literal string delimited by parentheses, stored as raw bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string delimited by angle brackets, stored as decoded bytes.
    HexString(Vec<u8>),
    /// Array of operands (e.g., `[<0041> <0042>]`).
    Array(Vec<Operand>),
    /// Boolean value (`true` or `false`).
    Boolean(bool),
    /// The null object.
    Null,
    /// Dictionary object (`<< /Key value ... >>`).
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Short type label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Integer(_) => "integer",
            Operand::Real(_) => "real",
            Operand::Name(_) => "name",
            Operand::LiteralString(_) => "string",
            Operand::HexString(_) => "hex string",
            Operand::Array(_) => "array",
            Operand::Boolean(_) => "boolean",
            Operand::Null => "null",
            Operand::Dictionary(_) => "dictionary",
        }
    }
}

/// A keyword with the operands collected on the stack before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name (e.g., `"begincodespacerange"`, `"def"`, `"usecmap"`).
    pub name: String,
    /// Operands that preceded this operator on the operand stack.
    pub operands: Vec<Operand>,
}

/// Parse CMap bytes into a sequence of operators.
///
/// Comments (`%` to end of line) are stripped and procedure braces are
/// skipped. Operands left on the stack after the last keyword are dropped.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] for malformed lexemes.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, ParseError> {
    let mut ops = Vec::new();
    let mut operand_stack: Vec<Operand> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        skip_whitespace_and_comments(input, &mut pos);
        if pos >= input.len() {
            break;
        }

        let b = input[pos];

        match b {
            b'(' => {
                let s = parse_literal_string(input, &mut pos)?;
                operand_stack.push(Operand::LiteralString(s));
            }
            b'<' => {
                if pos + 1 < input.len() && input[pos + 1] == b'<' {
                    let dict = parse_dictionary(input, &mut pos)?;
                    operand_stack.push(Operand::Dictionary(dict));
                } else {
                    let s = parse_hex_string(input, &mut pos)?;
                    operand_stack.push(Operand::HexString(s));
                }
            }
            b'[' => {
                pos += 1; // skip '['
                let arr = parse_array(input, &mut pos)?;
                operand_stack.push(Operand::Array(arr));
            }
            b'/' => {
                let name = parse_name(input, &mut pos);
                operand_stack.push(Operand::Name(name));
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                let num = parse_number(input, &mut pos)?;
                operand_stack.push(num);
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                let keyword = parse_keyword(input, &mut pos);
                match keyword.as_str() {
                    "true" => operand_stack.push(Operand::Boolean(true)),
                    "false" => operand_stack.push(Operand::Boolean(false)),
                    "null" => operand_stack.push(Operand::Null),
                    _ => ops.push(Operator {
                        name: keyword,
                        operands: std::mem::take(&mut operand_stack),
                    }),
                }
            }
            b']' => {
                return Err(ParseError::Syntax(format!(
                    "unexpected ']' outside array at byte {pos}"
                )));
            }
            _ => {
                // Procedure braces and stray delimiters carry no CMap data.
                pos += 1;
            }
        }
    }

    Ok(ops)
}

/// Returns `true` if `b` is a PostScript whitespace character.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// Returns `true` if `b` is a PostScript delimiter character.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while *pos < input.len() {
        if is_whitespace(input[*pos]) {
            *pos += 1;
        } else if input[*pos] == b'%' {
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Parse a literal string `(...)` with balanced parentheses and escape sequences.
fn parse_literal_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, ParseError> {
    debug_assert_eq!(input[*pos], b'(');
    *pos += 1; // skip opening '('

    let mut result = Vec::new();
    let mut depth = 1u32;

    while *pos < input.len() {
        let b = input[*pos];
        match b {
            b'(' => {
                depth += 1;
                result.push(b'(');
                *pos += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    *pos += 1; // skip closing ')'
                    return Ok(result);
                }
                result.push(b')');
                *pos += 1;
            }
            b'\\' => {
                *pos += 1;
                if *pos >= input.len() {
                    return Err(ParseError::Syntax(
                        "unterminated escape in literal string".to_string(),
                    ));
                }
                let escaped = input[*pos];
                match escaped {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(0x08),
                    b'f' => result.push(0x0C),
                    b'(' | b')' | b'\\' => result.push(escaped),
                    b'\r' => {
                        // Line continuation, CR or CR+LF
                        *pos += 1;
                        if *pos < input.len() && input[*pos] == b'\n' {
                            *pos += 1;
                        }
                        continue;
                    }
                    b'\n' => {
                        *pos += 1;
                        continue;
                    }
                    b'0'..=b'7' => {
                        let mut val = escaped - b'0';
                        for _ in 0..2 {
                            if *pos + 1 < input.len() && (b'0'..=b'7').contains(&input[*pos + 1]) {
                                *pos += 1;
                                val = val.wrapping_mul(8).wrapping_add(input[*pos] - b'0');
                            } else {
                                break;
                            }
                        }
                        result.push(val);
                        *pos += 1;
                        continue;
                    }
                    _ => result.push(escaped),
                }
                *pos += 1;
            }
            _ => {
                result.push(b);
                *pos += 1;
            }
        }
    }

    Err(ParseError::Syntax("unterminated literal string".to_string()))
}

/// Parse a hex string `<...>`.
///
/// Whitespace between digits is ignored; an odd digit count gets a trailing `0`.
fn parse_hex_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, ParseError> {
    debug_assert_eq!(input[*pos], b'<');
    let start = *pos;
    *pos += 1; // skip '<'

    let mut hex_chars = Vec::new();
    let mut closed = false;
    while *pos < input.len() {
        let b = input[*pos];
        *pos += 1;
        if b == b'>' {
            closed = true;
            break;
        }
        if !is_whitespace(b) {
            hex_chars.push(b);
        }
    }
    if !closed {
        return Err(ParseError::Syntax(format!(
            "unterminated hex string at byte {start}"
        )));
    }

    if hex_chars.len() % 2 != 0 {
        hex_chars.push(b'0');
    }

    let mut result = Vec::with_capacity(hex_chars.len() / 2);
    for chunk in hex_chars.chunks(2) {
        let hi = hex_digit(chunk[0])?;
        let lo = hex_digit(chunk[1])?;
        result.push((hi << 4) | lo);
    }

    Ok(result)
}

/// Convert a hex digit character to its value (0-15).
fn hex_digit(b: u8) -> Result<u8, ParseError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(ParseError::Syntax(format!(
            "invalid hex digit: {:?}",
            b as char
        ))),
    }
}

/// Parse an array until `]`. Assumes `[` already consumed.
fn parse_array(input: &[u8], pos: &mut usize) -> Result<Vec<Operand>, ParseError> {
    let mut elements = Vec::new();

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(ParseError::Syntax("unterminated array".to_string()));
        }

        if input[*pos] == b']' {
            *pos += 1; // skip ']'
            return Ok(elements);
        }

        elements.push(parse_value(input, pos, "array")?);
    }
}

/// Parse a dictionary `<< /Key value ... >>`. Assumes current bytes are `<<`.
fn parse_dictionary(input: &[u8], pos: &mut usize) -> Result<Vec<(String, Operand)>, ParseError> {
    *pos += 2; // skip '<<'

    let mut entries = Vec::new();

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(ParseError::Syntax("unterminated dictionary".to_string()));
        }

        if *pos + 1 < input.len() && input[*pos] == b'>' && input[*pos + 1] == b'>' {
            *pos += 2; // skip '>>'
            return Ok(entries);
        }

        if input[*pos] != b'/' {
            return Err(ParseError::Syntax(
                "expected name key in dictionary".to_string(),
            ));
        }
        let key = parse_name(input, pos);

        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(ParseError::Syntax(
                "unterminated dictionary value".to_string(),
            ));
        }

        let value = parse_value(input, pos, "dictionary")?;
        entries.push((key, value));
    }
}

/// Parse a single value nested inside an array or dictionary.
///
/// Bare keywords are kept as names; they never act as operators here.
fn parse_value(input: &[u8], pos: &mut usize, context: &str) -> Result<Operand, ParseError> {
    let b = input[*pos];
    match b {
        b'/' => Ok(Operand::Name(parse_name(input, pos))),
        b'(' => Ok(Operand::LiteralString(parse_literal_string(input, pos)?)),
        b'<' => {
            if *pos + 1 < input.len() && input[*pos + 1] == b'<' {
                Ok(Operand::Dictionary(parse_dictionary(input, pos)?))
            } else {
                Ok(Operand::HexString(parse_hex_string(input, pos)?))
            }
        }
        b'[' => {
            *pos += 1;
            Ok(Operand::Array(parse_array(input, pos)?))
        }
        b'0'..=b'9' | b'+' | b'-' | b'.' => parse_number(input, pos),
        b'a'..=b'z' | b'A'..=b'Z' => {
            let kw = parse_keyword(input, pos);
            match kw.as_str() {
                "true" => Ok(Operand::Boolean(true)),
                "false" => Ok(Operand::Boolean(false)),
                "null" => Ok(Operand::Null),
                _ => Ok(Operand::Name(kw)),
            }
        }
        _ => Err(ParseError::Syntax(format!(
            "unexpected byte in {context}: 0x{b:02X}"
        ))),
    }
}

/// Parse a `/Name` token. Assumes current byte is `/`.
fn parse_name(input: &[u8], pos: &mut usize) -> String {
    debug_assert_eq!(input[*pos], b'/');
    *pos += 1; // skip '/'

    let start = *pos;
    while *pos < input.len() && !is_whitespace(input[*pos]) && !is_delimiter(input[*pos]) {
        *pos += 1;
    }

    // Handle #XX hex escapes in names
    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let (Ok(hi), Ok(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                name.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&name).into_owned()
}

/// Parse a number (integer or real).
fn parse_number(input: &[u8], pos: &mut usize) -> Result<Operand, ParseError> {
    let start = *pos;
    let mut has_dot = false;

    if *pos < input.len() && (input[*pos] == b'+' || input[*pos] == b'-') {
        *pos += 1;
    }

    while *pos < input.len() {
        let b = input[*pos];
        if b == b'.' {
            if has_dot {
                break;
            }
            has_dot = true;
            *pos += 1;
        } else if b.is_ascii_digit() {
            *pos += 1;
        } else {
            break;
        }
    }

    let token = &input[start..*pos];
    let s = std::str::from_utf8(token)
        .map_err(|_| ParseError::Syntax("invalid UTF-8 in number token".to_string()))?;

    if has_dot {
        let val: f64 = s
            .parse()
            .map_err(|_| ParseError::Syntax(format!("invalid real number: {s}")))?;
        Ok(Operand::Real(val))
    } else {
        let val: i64 = s
            .parse()
            .map_err(|_| ParseError::Syntax(format!("invalid integer: {s}")))?;
        Ok(Operand::Integer(val))
    }
}

/// Parse a keyword: a letter followed by letters or digits.
fn parse_keyword(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < input.len() && input[*pos].is_ascii_alphanumeric() {
        *pos += 1;
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}
