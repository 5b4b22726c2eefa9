//! Page token codec
//!
//! A page token is the client-facing form of a [`Cursor`]. The cursor's
//! fields are packed into a query-string payload (`o=<offset>&r=1&p=<position>`,
//! each key present only when it differs from the start cursor) which is
//! then encoded as URL-safe base64, so a token can be dropped into a URL
//! query parameter untouched.
//!
//! Tokens are client controlled. Decoding validates every field on its own
//! and reports anything unexpected as a [`TokenError`]; it never panics.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::cursor::Cursor;
use crate::error::TokenError;
use crate::position::Position;
use crate::utils::number::parse_positive_int;

/// Upper bound on accepted token length, checked before any decoding
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

const OFFSET_KEY: &str = "o";
const REVERSE_KEY: &str = "r";
const POSITION_KEY: &str = "p";

/// URL-safe alphabet, no padding on encode, either form accepted on decode
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes cursors to tokens and back
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec {
    offset_cutoff: Option<u64>,
}

impl TokenCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp decoded offsets to `cutoff`
    pub fn with_offset_cutoff(mut self, cutoff: u64) -> Self {
        self.offset_cutoff = Some(cutoff);
        self
    }

    pub fn offset_cutoff(&self) -> Option<u64> {
        self.offset_cutoff
    }

    /// Encode `cursor`; the start cursor encodes to the empty string
    pub fn encode(&self, cursor: &Cursor) -> String {
        let mut pairs = Vec::with_capacity(3);

        if cursor.offset() != 0 {
            pairs.push(format!("{OFFSET_KEY}={}", cursor.offset()));
        }
        if cursor.reverse() {
            pairs.push(format!("{REVERSE_KEY}=1"));
        }
        if let Some(position) = cursor.position() {
            pairs.push(format!("{POSITION_KEY}={}", escape(position.as_str())));
        }

        if pairs.is_empty() {
            return String::new();
        }
        TOKEN_ENGINE.encode(pairs.join("&"))
    }

    /// Decode a token
    ///
    /// An absent or empty token means "first page, natural order" and
    /// decodes to `None`.
    pub fn decode(&self, token: Option<&str>) -> Result<Option<Cursor>, TokenError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };

        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong {
                len: token.len(),
                max: MAX_TOKEN_LEN,
            });
        }

        let bytes = TOKEN_ENGINE
            .decode(token)
            .map_err(|e| TokenError::MalformedToken(format!("not base64: {e}")))?;
        let payload = String::from_utf8(bytes)
            .map_err(|_| TokenError::MalformedToken("payload is not UTF-8".to_string()))?;

        let fields = TokenFields::parse(&payload)?;
        fields.into_cursor(self.offset_cutoff).map(Some)
    }
}

/// Raw, still unvalidated token fields
#[derive(Debug, Default)]
struct TokenFields {
    offset: Option<String>,
    reverse: Option<String>,
    position: Option<String>,
}

impl TokenFields {
    fn parse(payload: &str) -> Result<Self, TokenError> {
        let mut fields = Self::default();

        for pair in payload.split('&') {
            let (key, raw) = pair
                .split_once('=')
                .ok_or_else(|| TokenError::MalformedToken(format!("field without value: '{pair}'")))?;

            let slot = match key {
                OFFSET_KEY => &mut fields.offset,
                REVERSE_KEY => &mut fields.reverse,
                POSITION_KEY => &mut fields.position,
                // unknown keys are ignored
                _ => continue,
            };

            if slot.is_some() {
                return Err(TokenError::MalformedToken(format!(
                    "field '{key}' given more than once"
                )));
            }
            *slot = Some(unescape(raw)?);
        }

        Ok(fields)
    }

    fn into_cursor(self, offset_cutoff: Option<u64>) -> Result<Cursor, TokenError> {
        let offset = match self.offset {
            Some(text) => parse_positive_int(&text, false, offset_cutoff)
                .ok_or(TokenError::InvalidOffset(text))?,
            None => 0,
        };

        let reverse = match self.reverse {
            Some(text) => {
                let value: i64 = text.parse().map_err(|_| {
                    TokenError::MalformedToken(format!("invalid reverse flag '{text}'"))
                })?;
                value != 0
            }
            None => false,
        };

        Ok(Cursor::new(offset, reverse, self.position.map(Position::new)))
    }
}

/// Percent-escape the characters that would break the payload's structure
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '+' => out.push_str("%2B"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, TokenError> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let byte = bytes
                .get(idx + 1..idx + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| TokenError::MalformedToken("invalid escape".to_string()))?;
            out.push(byte);
            idx += 3;
        } else {
            out.push(bytes[idx]);
            idx += 1;
        }
    }

    String::from_utf8(out).map_err(|_| TokenError::MalformedToken("field is not UTF-8".to_string()))
}

#[cfg(test)]
mod tests;
