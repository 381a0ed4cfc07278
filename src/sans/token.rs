//! Lexing of a byte source into tokens.

/// A lexical unit of a document, tagged with the position it started at.
///
/// Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    fn new(kind: TokenKind, line: u32, column: u32) -> Self {
        Self { kind, line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The `:` marking the start of a record.
    StartCode,
    /// A pair of hex digits.
    HexByte(u8),
    /// A single line break.
    EndOfLine,
    /// The end of the input. Always the last token unless lexing failed.
    EndOfInput,
    /// Input that cannot be lexed. Always the last token.
    Invalid(Lexical),
}

/// Reason a token is [`TokenKind::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexical {
    /// A character other than a hex digit inside a record.
    HexDigit,
    /// A line break, start code, or the end of input between two digits.
    SplitByte,
}

/// A byte read from the source, with the position it was read at. A `None`
/// byte marks the end of the input.
#[derive(Debug, Clone, Copy)]
struct Unit {
    byte: Option<u8>,
    line: u32,
    column: u32,
}

/// Lazily lexes a fallible byte source into tokens.
///
/// Bytes preceding the first start code of a line are skipped. `\r`, `\n`
/// and `\r\n` each count as a single line break, and consecutive breaks
/// produce one [`TokenKind::EndOfLine`] each, emitted when the next
/// non-break byte (or the end of input) is reached. A start code discards
/// pending breaks instead.
///
/// Errors from the source are passed through as they occur. Lexing resumes
/// where it stopped if the source is polled again, even between the two
/// digits of a byte.
#[derive(Debug)]
pub struct Tokenizer<I> {
    input: I,
    line: u32,
    column: u32,
    after_cr: bool,
    in_record: bool,
    breaks: u32,
    break_at: (u32, u32),
    held: Option<Unit>,
    finished: bool,
}

impl<I> Tokenizer<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            line: 1,
            column: 1,
            after_cr: false,
            in_record: false,
            breaks: 0,
            break_at: (1, 1),
            held: None,
            finished: false,
        }
    }

    /// The position of the next byte to be read from the source.
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    fn invalid(&mut self, reason: Lexical, at: Unit) -> Token {
        self.finished = true;
        Token::new(TokenKind::Invalid(reason), at.line, at.column)
    }
}

impl<I, E> Tokenizer<I>
where
    I: Iterator<Item = Result<u8, E>>,
{
    /// Read a byte from the source, advancing the position. The `\n` of a
    /// `\r\n` pair is absorbed into the `\r`.
    fn pull(&mut self) -> Result<Unit, E> {
        loop {
            let (line, column) = (self.line, self.column);
            let byte = self.input.next().transpose()?;
            let after_cr = core::mem::replace(&mut self.after_cr, byte == Some(b'\r'));

            match byte {
                Some(b'\n') if after_cr => continue,
                Some(b'\r' | b'\n') => {
                    self.line = self.line.saturating_add(1);
                    self.column = 1;
                }
                Some(_) => self.column = self.column.saturating_add(1),
                None => {}
            }

            return Ok(Unit { byte, line, column });
        }
    }

    /// Complete a byte from its first digit.
    fn pair(&mut self, high: Unit, digit: u8) -> Result<Token, E> {
        let Some(high_value) = hex_value(digit) else {
            return Ok(self.invalid(Lexical::HexDigit, high));
        };

        let low = match self.pull() {
            Ok(low) => low,
            Err(err) => {
                self.held = Some(high);
                return Err(err);
            }
        };

        Ok(match low.byte {
            None | Some(b'\r' | b'\n' | b':') => self.invalid(Lexical::SplitByte, low),
            Some(digit) => match hex_value(digit) {
                Some(low_value) => Token::new(
                    TokenKind::HexByte(high_value << 4 | low_value),
                    high.line,
                    high.column,
                ),
                None => self.invalid(Lexical::HexDigit, low),
            },
        })
    }
}

impl<I, E> Iterator for Tokenizer<I>
where
    I: Iterator<Item = Result<u8, E>>,
{
    type Item = Result<Token, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let unit = match self.held.take() {
                Some(unit) => unit,
                None => match self.pull() {
                    Ok(unit) => unit,
                    Err(err) => return Some(Err(err)),
                },
            };

            if let Some(b'\r' | b'\n') = unit.byte {
                if self.breaks == 0 {
                    self.break_at = (unit.line, unit.column);
                }
                self.breaks += 1;
                self.in_record = false;
                continue;
            }

            // A start code discards pending line breaks. Anything else flushes
            // them before it is lexed.
            if unit.byte == Some(b':') {
                self.breaks = 0;
            } else if self.breaks != 0 {
                let (line, column) = self.break_at;
                self.breaks -= 1;
                self.break_at = (line.saturating_add(1), 1);
                self.held = Some(unit);
                return Some(Ok(Token::new(TokenKind::EndOfLine, line, column)));
            }

            let token = match unit.byte {
                None => {
                    self.finished = true;
                    Token::new(TokenKind::EndOfInput, unit.line, unit.column)
                }
                Some(b':') => {
                    self.in_record = true;
                    Token::new(TokenKind::StartCode, unit.line, unit.column)
                }
                Some(_) if !self.in_record => continue,
                Some(digit) => match self.pair(unit, digit) {
                    Ok(token) => token,
                    Err(err) => return Some(Err(err)),
                },
            };

            return Some(Ok(token));
        }
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
