//! Pull-based tokenizer over an in-memory byte buffer.
//!
//! The lexer borrows the source for the duration of compilation; it
//! never owns it. Call [`Lexer::next_token`] until it returns a token
//! of kind [`TokenKind::Eof`] — further calls keep returning `Eof`.

use crate::error::{CompileError, Result};
use crate::token::{Keyword, Token, TokenKind, MAX_IDENT_LEN};

pub struct Lexer<'s> {
    source: &'s [u8],
    pos: usize,
    line: u32,
    done: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Lexer {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            done: false,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns the next token. Idempotent once end-of-input is reached.
    pub fn next_token(&mut self) -> Result<Token> {
        if self.done {
            return Ok(Token::new(TokenKind::Eof, self.line, ""));
        }

        self.skip_whitespace_and_comments();

        let line = self.line;
        let b = match self.peek_byte() {
            None => {
                self.done = true;
                return Ok(Token::new(TokenKind::Eof, line, ""));
            }
            Some(b) => b,
        };

        if b == b'\n' {
            self.pos += 1;
            self.line += 1;
            return Ok(Token::new(TokenKind::Newline, line, "\n"));
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            return self.lex_identifier_or_keyword(line);
        }

        if b.is_ascii_digit() {
            return self.lex_integer(line);
        }

        match b {
            b'+' => self.single(line, TokenKind::Plus, "+"),
            b'-' => self.single(line, TokenKind::Minus, "-"),
            b'*' => self.single(line, TokenKind::Star, "*"),
            b'/' => self.single(line, TokenKind::Slash, "/"),
            b'&' => self.single(line, TokenKind::Amp, "&"),
            b'|' => self.single(line, TokenKind::Pipe, "|"),
            b';' => self.single(line, TokenKind::Semicolon, ";"),
            b':' => self.single(line, TokenKind::Colon, ":"),
            b'[' => self.single(line, TokenKind::LBracket, "["),
            b']' => self.single(line, TokenKind::RBracket, "]"),
            b'<' => self.two_char_op(line, b'=', TokenKind::Le, TokenKind::Lt, "<"),
            b'>' => self.two_char_op(line, b'=', TokenKind::Ge, TokenKind::Gt, ">"),
            b'=' => self.two_char_op(line, b'=', TokenKind::EqEq, TokenKind::Eq, "="),
            b'!' => {
                if self.peek_byte_at(1) == Some(b'=') {
                    self.pos += 2;
                    Ok(Token::new(TokenKind::Ne, line, "!="))
                } else {
                    self.pos += 1;
                    Err(CompileError::InvalidToken {
                        line,
                        lexeme: "!".to_string(),
                    })
                }
            }
            other => {
                self.pos += 1;
                Err(CompileError::InvalidToken {
                    line,
                    lexeme: (other as char).to_string(),
                })
            }
        }
    }

    fn single(&mut self, line: u32, kind: TokenKind, lexeme: &str) -> Result<Token> {
        self.pos += 1;
        Ok(Token::new(kind, line, lexeme))
    }

    /// Handles operators that may be extended by a trailing `=`.
    fn two_char_op(
        &mut self,
        line: u32,
        second: u8,
        wide: TokenKind,
        narrow: TokenKind,
        lexeme: &str,
    ) -> Result<Token> {
        if self.peek_byte_at(1) == Some(second) {
            self.pos += 2;
            Ok(Token::new(wide, line, format!("{lexeme}=")))
        } else {
            self.pos += 1;
            Ok(Token::new(narrow, line, lexeme))
        }
    }

    fn lex_identifier_or_keyword(&mut self, line: u32) -> Result<Token> {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();

        if lexeme.len() > MAX_IDENT_LEN {
            return Err(CompileError::IdentifierTooLong {
                line,
                lexeme,
                max: MAX_IDENT_LEN,
            });
        }

        let kind = match lexeme.as_str() {
            "if" => TokenKind::Keyword(Keyword::If),
            "goto" => TokenKind::Keyword(Keyword::Goto),
            "MEM" => TokenKind::Keyword(Keyword::Mem),
            _ => TokenKind::Identifier,
        };
        Ok(Token::new(kind, line, lexeme))
    }

    fn lex_integer(&mut self, line: u32) -> Result<Token> {
        let start = self.pos;

        let is_hex = self.peek_byte() == Some(b'0')
            && matches!(self.peek_byte_at(1), Some(b'x') | Some(b'X'));

        if is_hex {
            self.pos += 2;
            let digits_start = self.pos;
            while self
                .peek_byte()
                .map(|b| b.is_ascii_hexdigit())
                .unwrap_or(false)
            {
                self.pos += 1;
            }
            let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
            let digits = std::str::from_utf8(&self.source[digits_start..self.pos]).unwrap();
            return match u64::from_str_radix(digits, 16) {
                Ok(v) => Ok(Token::integer(line, lexeme, v as i64)),
                Err(_) => Err(CompileError::IntegerOverflow { line, lexeme }),
            };
        }

        while self.peek_byte().map(|b| b.is_ascii_digit()).unwrap_or(false) {
            self.pos += 1;
        }
        let lexeme = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        match lexeme.parse::<i64>() {
            Ok(v) => Ok(Token::integer(line, lexeme, v)),
            Err(_) => Err(CompileError::IntegerOverflow { line, lexeme }),
        }
    }
}

/// Drains a [`Lexer`] to completion, for callers that want the whole
/// token stream up front (tests, `--dump-tokens`).
pub fn tokens(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.is_eof();
        out.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(out)
}
