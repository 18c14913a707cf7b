use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bibtex::{RawRecord, RawRecordBuilder};
use crate::error::BibDigestError;

static ENTRY_START_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@\s*([A-Za-z]+)\s*([{(])").expect("Invalid BibTeX entry regex pattern")
});
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Parse BibTeX text into records, in the order they appear.
///
/// `@comment` and `@preamble` blocks are skipped and `@string` macros are
/// substituted into later bare-word values. Anything outside an `@` block
/// is ignored, as BibTeX itself does.
pub fn parse_bibtex(content: &str) -> Result<Vec<RawRecord>, BibDigestError> {
    let mut records = Vec::new();
    let mut macros: HashMap<String, String> = HashMap::new();
    let mut pos = 0;

    while let Some(caps) = ENTRY_START_REGEX.captures_at(content, pos) {
        let kind = caps[1].to_lowercase();
        let close = if &caps[2] == "(" { b')' } else { b'}' };
        let body_start = caps.get(0).map_or(content.len(), |m| m.end());
        let mut cursor = Cursor::new(content, body_start);

        match kind.as_str() {
            "comment" | "preamble" => cursor.skip_block(close)?,
            "string" => {
                let (name, value) = cursor.parse_field(&macros)?;
                cursor.skip_whitespace();
                cursor.expect(close, "expected end of @string definition")?;
                macros.insert(name, value);
            }
            _ => records.push(cursor.parse_entry(kind, close, &macros)?),
        }

        pos = cursor.pos;
    }

    Ok(records)
}

/// Collapse runs of whitespace (including line breaks inside values)
fn normalize_whitespace(value: &str) -> String {
    WHITESPACE_REGEX.replace_all(value.trim(), " ").into_owned()
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'+' | b'/')
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn line_at(&self, pos: usize) -> usize {
        self.text[..pos.min(self.text.len())].matches('\n').count() + 1
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> BibDigestError {
        BibDigestError::MalformedBibliography {
            line: self.line_at(pos),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn expect(&mut self, byte: u8, message: &str) -> Result<(), BibDigestError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_at(self.pos, message))
        }
    }

    /// Skip the remainder of a block whose opening delimiter was consumed
    fn skip_block(&mut self, close: u8) -> Result<(), BibDigestError> {
        let open = if close == b')' { b'(' } else { b'{' };
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(self.error_at(start, "unterminated block"))
    }

    fn parse_entry(
        &mut self,
        kind: String,
        close: u8,
        macros: &HashMap<String, String>,
    ) -> Result<RawRecord, BibDigestError> {
        let start = self.pos;
        self.skip_whitespace();
        let key = self
            .take_while(|b| b != b',' && b != close && !b.is_ascii_whitespace())
            .to_string();
        let builder = RawRecordBuilder::new(key.clone(), kind);

        self.skip_whitespace();
        match self.peek() {
            Some(b',') => self.pos += 1,
            Some(b) if b == close => {
                self.pos += 1;
                return Ok(builder.build());
            }
            None => return Err(self.error_at(start, format!("unterminated entry '{}'", key))),
            Some(_) => {
                return Err(self.error_at(self.pos, format!("expected ',' after citation key '{}'", key)))
            }
        }

        let mut fields = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error_at(start, format!("unterminated entry '{}'", key))),
                Some(_) => {}
            }

            fields.push(self.parse_field(macros)?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error_at(start, format!("unterminated entry '{}'", key))),
                Some(_) => {
                    let found = self
                        .text
                        .get(self.pos..)
                        .and_then(|rest| rest.chars().next())
                        .unwrap_or('?');
                    return Err(self.error_at(
                        self.pos,
                        format!("unexpected character '{}' in entry '{}'", found, key),
                    ));
                }
            }
        }

        Ok(builder.fields(fields).build())
    }

    /// Parse `name = value`, returning the lower-cased name and the value
    fn parse_field(
        &mut self,
        macros: &HashMap<String, String>,
    ) -> Result<(String, String), BibDigestError> {
        self.skip_whitespace();
        let name = self.take_while(is_name_byte);
        if name.is_empty() {
            return Err(self.error_at(self.pos, "expected field name"));
        }
        self.skip_whitespace();
        self.expect(b'=', &format!("expected '=' after field '{}'", name))?;
        let value = self.parse_value(macros)?;
        Ok((name.to_lowercase(), normalize_whitespace(&value)))
    }

    /// Parse a value: braced, quoted or bare pieces joined with `#`
    fn parse_value(&mut self, macros: &HashMap<String, String>) -> Result<String, BibDigestError> {
        let mut value = String::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            match self.peek() {
                Some(b'{') => {
                    self.pos += 1;
                    let end = self.find_closing_brace(start)?;
                    value.push_str(&self.text[start + 1..end]);
                }
                Some(b'"') => {
                    self.pos += 1;
                    let end = self.find_closing_quote(start)?;
                    value.push_str(&self.text[start + 1..end]);
                }
                Some(b) if is_name_byte(b) => {
                    let word = self.take_while(is_name_byte);
                    match macros.get(&word.to_lowercase()) {
                        Some(expanded) => value.push_str(expanded),
                        None => value.push_str(word),
                    }
                }
                _ => return Err(self.error_at(start, "expected field value")),
            }

            self.skip_whitespace();
            if self.peek() == Some(b'#') {
                self.pos += 1;
            } else {
                return Ok(value);
            }
        }
    }

    /// Advance past the `}` matching an already-consumed `{`; returns its offset
    fn find_closing_brace(&mut self, start: usize) -> Result<usize, BibDigestError> {
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.pos;
                        self.pos += 1;
                        return Ok(end);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error_at(start, "unbalanced braces in field value"))
    }

    /// Advance past the closing `"` of a quoted value; braces may nest quotes
    fn find_closing_quote(&mut self, start: usize) -> Result<usize, BibDigestError> {
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'"' if depth == 0 => {
                    let end = self.pos;
                    self.pos += 1;
                    return Ok(end);
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error_at(start, "unterminated quoted field value"))
    }
}
