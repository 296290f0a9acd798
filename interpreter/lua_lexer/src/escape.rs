//! String escape decoding.
//!
//! Turns the raw body of a quoted literal (delimiters already stripped)
//! into the byte content the runtime sees. Escapes may produce arbitrary
//! bytes, so the output is `Vec<u8>`, not `String`.

/// Error produced while decoding an escape sequence.
///
/// `offset` is the byte position of the backslash within the literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    pub message: String,
    pub offset: usize,
}

/// Decode the escapes of a quoted string body.
pub fn decode_escapes(body: &str) -> Result<Vec<u8>, EscapeError> {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let start = i;
        i += 1;
        let Some(&esc) = bytes.get(i) else {
            return Err(EscapeError {
                message: "unfinished escape sequence".to_string(),
                offset: start,
            });
        };
        i += 1;
        match esc {
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'\'' => out.push(b'\''),
            b'\n' => out.push(b'\n'),
            // \z skips following whitespace, newlines included.
            b'z' => {
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
            }
            b'x' => {
                let hex = bytes
                    .get(i..i + 2)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit));
                let Some(hex) = hex else {
                    return Err(EscapeError {
                        message: "hexadecimal digit expected".to_string(),
                        offset: start,
                    });
                };
                let hi = hex_value(hex[0]);
                let lo = hex_value(hex[1]);
                out.push(hi << 4 | lo);
                i += 2;
            }
            b'0'..=b'9' => {
                // Up to three decimal digits, value at most 255.
                let mut value = u32::from(esc - b'0');
                let mut digits = 1;
                while digits < 3 {
                    match bytes.get(i) {
                        Some(d) if d.is_ascii_digit() => {
                            value = value * 10 + u32::from(d - b'0');
                            i += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                if value > 255 {
                    return Err(EscapeError {
                        message: "decimal escape too large".to_string(),
                        offset: start,
                    });
                }
                out.push(value as u8);
            }
            other => {
                return Err(EscapeError {
                    message: format!("invalid escape sequence '\\{}'", other as char),
                    offset: start,
                });
            }
        }
    }
    Ok(out)
}

#[inline]
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(decode_escapes("hello").unwrap(), b"hello");
    }

    #[test]
    fn named_escapes() {
        assert_eq!(
            decode_escapes(r#"a\n\t\r\\\'\"x"#).unwrap(),
            b"a\n\t\r\\'\"x"
        );
        assert_eq!(decode_escapes(r"\a\b\f\v").unwrap(), &[7, 8, 12, 11]);
    }

    #[test]
    fn hex_escape() {
        assert_eq!(decode_escapes(r"\x41\x00\xff").unwrap(), &[0x41, 0, 0xff]);
    }

    #[test]
    fn hex_escape_requires_two_digits() {
        assert!(decode_escapes(r"\x4").is_err());
        assert!(decode_escapes(r"\xg0").is_err());
    }

    #[test]
    fn decimal_escape() {
        assert_eq!(decode_escapes(r"\65\066\0z").unwrap(), b"AB\0z");
    }

    #[test]
    fn decimal_escape_too_large() {
        let err = decode_escapes(r"\256").unwrap_err();
        assert_eq!(err.message, "decimal escape too large");
    }

    #[test]
    fn z_skips_whitespace() {
        assert_eq!(decode_escapes("a\\z  \n\t b").unwrap(), b"ab");
    }

    #[test]
    fn invalid_escape_reports_offset() {
        let err = decode_escapes(r"ab\qcd").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.message, "invalid escape sequence '\\q'");
    }

    #[test]
    fn trailing_backslash_is_unfinished() {
        let err = decode_escapes("ab\\").unwrap_err();
        assert_eq!(err.message, "unfinished escape sequence");
    }
}
