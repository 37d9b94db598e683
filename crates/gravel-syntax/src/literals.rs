//! Literal decoding: numeric typing and string escape processing.
//!
//! Numbers follow Groovy's typing rules. Unsuffixed integers take the
//! narrowest of `int`, `long` and `BigInteger`; unsuffixed decimals are
//! `BigDecimal`. Arbitrary-precision values are kept as canonical decimal
//! text.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum NumberValue {
    Int(i32),
    Long(i64),
    /// Decimal digits with an optional leading `-`.
    BigInteger(String),
    Float(f32),
    Double(f64),
    /// The literal text without suffix and digit separators.
    BigDecimal(String),
}

impl NumberValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            NumberValue::Int(_) => "int",
            NumberValue::Long(_) => "long",
            NumberValue::BigInteger(_) => "java.math.BigInteger",
            NumberValue::Float(_) => "float",
            NumberValue::Double(_) => "double",
            NumberValue::BigDecimal(_) => "java.math.BigDecimal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LiteralError {
    pub message: String,
}

impl LiteralError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn out_of_range(text: &str, ty: &str) -> Self {
        Self::new(format!(
            "Number of value {text} does not fit in the range of {ty}, but {ty} is expected."
        ))
    }
}

/// Magnitude of an integer literal in base 1e9 limbs, least significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Magnitude {
    limbs: Vec<u32>,
}

const LIMB_BASE: u64 = 1_000_000_000;

impl Magnitude {
    fn zero() -> Self {
        Self { limbs: vec![0] }
    }

    fn mul_add(&mut self, radix: u32, digit: u32) {
        let mut carry = u64::from(digit);
        for limb in &mut self.limbs {
            let value = u64::from(*limb) * u64::from(radix) + carry;
            *limb = (value % LIMB_BASE) as u32;
            carry = value / LIMB_BASE;
        }
        while carry > 0 {
            self.limbs.push((carry % LIMB_BASE) as u32);
            carry /= LIMB_BASE;
        }
    }

    fn to_u128(&self) -> Option<u128> {
        let mut value: u128 = 0;
        for &limb in self.limbs.iter().rev() {
            value = value
                .checked_mul(u128::from(LIMB_BASE))?
                .checked_add(u128::from(limb))?;
        }
        Some(value)
    }

    fn to_decimal(&self) -> String {
        let mut out = String::new();
        let mut iter = self.limbs.iter().rev().skip_while(|&&limb| limb == 0).peekable();
        match iter.next() {
            None => return "0".to_string(),
            Some(first) => out.push_str(&first.to_string()),
        }
        for limb in iter {
            out.push_str(&format!("{limb:09}"));
        }
        out
    }
}

/// Parse an integer literal, optionally preceded by `-`.
pub fn parse_integer(text: &str) -> Result<NumberValue, LiteralError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (body, suffix) = match body.chars().last() {
        Some(c @ ('i' | 'I' | 'l' | 'L' | 'g' | 'G')) => {
            (&body[..body.len() - 1], Some(c.to_ascii_lowercase()))
        }
        _ => (body, None),
    };

    let (radix, digits) = if let Some(rest) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() {
        return Err(LiteralError::new(format!("Invalid number literal: {text}")));
    }
    let mut magnitude = Magnitude::zero();
    for c in digits.chars() {
        let digit = c
            .to_digit(radix)
            .ok_or_else(|| LiteralError::new(format!("Invalid number literal: {text}")))?;
        magnitude.mul_add(radix, digit);
    }

    let signed = magnitude.to_u128().and_then(|value| {
        let value = i128::try_from(value).ok()?;
        Some(if negative { -value } else { value })
    });

    match suffix {
        Some('i') => match signed {
            Some(value) if radix != 10 => Ok(NumberValue::Int(value as i32)),
            Some(value) => i32::try_from(value)
                .map(NumberValue::Int)
                .map_err(|_| LiteralError::out_of_range(text, "int")),
            None => Err(LiteralError::out_of_range(text, "int")),
        },
        Some('l') => match signed {
            Some(value) if radix != 10 => Ok(NumberValue::Long(value as i64)),
            Some(value) => i64::try_from(value)
                .map(NumberValue::Long)
                .map_err(|_| LiteralError::out_of_range(text, "long")),
            None => Err(LiteralError::out_of_range(text, "long")),
        },
        Some(_) => Ok(big_integer(negative, &magnitude)),
        None => Ok(match signed {
            Some(value) => {
                if let Ok(int) = i32::try_from(value) {
                    NumberValue::Int(int)
                } else if let Ok(long) = i64::try_from(value) {
                    NumberValue::Long(long)
                } else {
                    big_integer(negative, &magnitude)
                }
            }
            None => big_integer(negative, &magnitude),
        }),
    }
}

fn big_integer(negative: bool, magnitude: &Magnitude) -> NumberValue {
    let digits = magnitude.to_decimal();
    if negative && digits != "0" {
        NumberValue::BigInteger(format!("-{digits}"))
    } else {
        NumberValue::BigInteger(digits)
    }
}

/// Parse a floating point literal, optionally preceded by `-`.
pub fn parse_decimal(text: &str) -> Result<NumberValue, LiteralError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (body, suffix) = match cleaned.chars().last() {
        Some(c @ ('f' | 'F' | 'd' | 'D' | 'g' | 'G')) => {
            (&cleaned[..cleaned.len() - 1], Some(c.to_ascii_lowercase()))
        }
        _ => (cleaned.as_str(), None),
    };
    let invalid = || LiteralError::new(format!("Invalid number literal: {text}"));
    if body.is_empty() || body == "-" {
        return Err(invalid());
    }

    match suffix {
        Some('f') => {
            let value: f32 = body.parse().map_err(|_| invalid())?;
            if value.is_infinite() {
                return Err(LiteralError::out_of_range(text, "float"));
            }
            Ok(NumberValue::Float(value))
        }
        Some('d') => {
            let value: f64 = body.parse().map_err(|_| invalid())?;
            if value.is_infinite() {
                return Err(LiteralError::out_of_range(text, "double"));
            }
            Ok(NumberValue::Double(value))
        }
        _ => {
            body.parse::<f64>().map_err(|_| invalid())?;
            Ok(NumberValue::BigDecimal(body.to_string()))
        }
    }
}

/// Quotation style of a string literal or GString.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringStyle {
    Single,
    Double,
    TripleSingle,
    TripleDouble,
    Slashy,
    DollarSlashy,
}

impl StringStyle {
    /// Style of a literal from its opening characters.
    pub fn of(text: &str) -> StringStyle {
        if text.starts_with("'''") {
            StringStyle::TripleSingle
        } else if text.starts_with("\"\"\"") {
            StringStyle::TripleDouble
        } else if text.starts_with('\'') {
            StringStyle::Single
        } else if text.starts_with('"') {
            StringStyle::Double
        } else if text.starts_with("$/") {
            StringStyle::DollarSlashy
        } else {
            StringStyle::Slashy
        }
    }

    fn open_len(self) -> usize {
        match self {
            StringStyle::Single | StringStyle::Double | StringStyle::Slashy => 1,
            StringStyle::DollarSlashy => 2,
            StringStyle::TripleSingle | StringStyle::TripleDouble => 3,
        }
    }

    fn close_len(self) -> usize {
        self.open_len()
    }

    fn multiline(self) -> bool {
        !matches!(self, StringStyle::Single | StringStyle::Double)
    }
}

/// Where a GString segment sits between interpolated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPosition {
    Begin,
    Part,
    End,
}

/// Decode a complete string literal token.
pub fn string_value(text: &str) -> Result<String, LiteralError> {
    let style = StringStyle::of(text);
    let open = style.open_len();
    let close = style.close_len();
    if text.len() < open + close {
        return Err(LiteralError::new(format!("Unterminated string literal: {text}")));
    }
    decode_body(&text[open..text.len() - close], style)
}

/// Decode one literal segment of a GString. `style` is taken from the
/// `GStringBegin` token.
pub fn gstring_segment(
    text: &str,
    position: SegmentPosition,
    style: StringStyle,
) -> Result<String, LiteralError> {
    let body = match position {
        SegmentPosition::Begin => text
            .get(style.open_len()..text.len().saturating_sub(1))
            .unwrap_or(""),
        SegmentPosition::Part => text.get(..text.len().saturating_sub(1)).unwrap_or(""),
        SegmentPosition::End => text
            .get(..text.len().saturating_sub(style.close_len()))
            .unwrap_or(""),
    };
    decode_body(body, style)
}

fn decode_body(body: &str, style: StringStyle) -> Result<String, LiteralError> {
    let body = if style.multiline() {
        remove_cr(body)
    } else {
        body.to_string()
    };
    match style {
        StringStyle::Slashy => replace_slashy_escapes(&body),
        StringStyle::DollarSlashy => replace_dollar_slashy_escapes(&body),
        _ => replace_standard_escapes(&body),
    }
}

/// Normalize `\r\n` and lone `\r` line terminators to `\n`.
pub fn remove_cr(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn replace_standard_escapes(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            's' => out.push(' '),
            '"' | '\'' | '\\' | '$' => out.push(next),
            '\n' => {}
            'u' => out.push(unicode_escape(&mut chars)?),
            '0'..='7' => {
                let max_len = if next <= '3' { 3 } else { 2 };
                let mut value = next.to_digit(8).unwrap_or(0);
                let mut len = 1;
                while len < max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                            len += 1;
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn replace_slashy_escapes(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('/') => {
                chars.next();
                out.push('/');
            }
            Some('\n') => {
                chars.next();
            }
            Some('u') => {
                chars.next();
                out.push(unicode_escape(&mut chars)?);
            }
            _ => out.push('\\'),
        }
    }
    Ok(out)
}

fn replace_dollar_slashy_escapes(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('$', Some('/')) => {
                chars.next();
                out.push('/');
            }
            ('$', Some('$')) => {
                chars.next();
                out.push('$');
            }
            ('\\', Some('u')) => {
                chars.next();
                out.push(unicode_escape(&mut chars)?);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Decode the hex digits of a `\u` escape. Repeated `u`s are allowed.
fn unicode_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<char, LiteralError> {
    while chars.peek() == Some(&'u') {
        chars.next();
    }
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| LiteralError::new("Invalid unicode escape"))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| LiteralError::new("Invalid unicode escape"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuffixed_integers_take_the_narrowest_type() {
        assert_eq!(parse_integer("123"), Ok(NumberValue::Int(123)));
        assert_eq!(parse_integer("2147483648"), Ok(NumberValue::Long(2147483648)));
        assert_eq!(parse_integer("-2147483648"), Ok(NumberValue::Int(i32::MIN)));
        assert_eq!(
            parse_integer("9223372036854775808"),
            Ok(NumberValue::BigInteger("9223372036854775808".into()))
        );
        assert_eq!(parse_integer("1_000"), Ok(NumberValue::Int(1000)));
    }

    #[test]
    fn radix_prefixes_and_suffixes() {
        assert_eq!(parse_integer("0x1F"), Ok(NumberValue::Int(31)));
        assert_eq!(parse_integer("0b101"), Ok(NumberValue::Int(5)));
        assert_eq!(parse_integer("017"), Ok(NumberValue::Int(15)));
        assert_eq!(parse_integer("5L"), Ok(NumberValue::Long(5)));
        assert_eq!(parse_integer("5g"), Ok(NumberValue::BigInteger("5".into())));
        assert_eq!(parse_integer("0xFFFFFFFFi"), Ok(NumberValue::Int(-1)));
        assert!(parse_integer("09").is_err());
    }

    #[test]
    fn suffixed_integers_out_of_range() {
        assert_eq!(
            parse_integer("2147483648i").unwrap_err().message,
            "Number of value 2147483648i does not fit in the range of int, but int is expected."
        );
        assert_eq!(
            parse_integer("9223372036854775808L").unwrap_err().message,
            "Number of value 9223372036854775808L does not fit in the range of long, but long is expected."
        );
    }

    #[test]
    fn big_integers_keep_every_digit() {
        assert_eq!(
            parse_integer("-123456789012345678901234567890"),
            Ok(NumberValue::BigInteger("-123456789012345678901234567890".into()))
        );
        assert_eq!(
            parse_integer("1000000000000000000000000000"),
            Ok(NumberValue::BigInteger("1000000000000000000000000000".into()))
        );
    }

    #[test]
    fn decimals() {
        assert_eq!(parse_decimal("1.5"), Ok(NumberValue::BigDecimal("1.5".into())));
        assert_eq!(parse_decimal("-1.50"), Ok(NumberValue::BigDecimal("-1.50".into())));
        assert_eq!(parse_decimal("1.5f"), Ok(NumberValue::Float(1.5)));
        assert_eq!(parse_decimal("2e3d"), Ok(NumberValue::Double(2000.0)));
        assert!(parse_decimal("1e999f").is_err());
    }

    #[test]
    fn standard_escapes() {
        assert_eq!(string_value(r"'a\tb\n'").unwrap(), "a\tb\n");
        assert_eq!(string_value(r#""\"\$A\101""#).unwrap(), "\"$AA");
        assert_eq!(string_value("'''a\r\nb'''").unwrap(), "a\nb");
        assert_eq!(string_value("'a\\\nb'").unwrap(), "ab");
    }

    #[test]
    fn slashy_escapes() {
        assert_eq!(string_value(r"/a\/b\d/").unwrap(), r"a/b\d");
        assert_eq!(string_value(r"$/a$/b$$c\d/$").unwrap(), r"a/b$c\d");
    }

    #[test]
    fn gstring_segments() {
        let style = StringStyle::of("\"a$");
        assert_eq!(style, StringStyle::Double);
        assert_eq!(gstring_segment("\"a\\t$", SegmentPosition::Begin, style).unwrap(), "a\t");
        assert_eq!(gstring_segment(" and $", SegmentPosition::Part, style).unwrap(), " and ");
        assert_eq!(gstring_segment("!\"", SegmentPosition::End, style).unwrap(), "!");
        let triple = StringStyle::of("\"\"\"x$");
        assert_eq!(gstring_segment("\"\"\"x$", SegmentPosition::Begin, triple).unwrap(), "x");
        assert_eq!(gstring_segment("y\"\"\"", SegmentPosition::End, triple).unwrap(), "y");
    }
}
