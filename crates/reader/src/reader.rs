//! The recursive-descent reader (spec §4.2): turns a token stream into
//! `Cell` trees. Reader macros (`'`, `` ` ``, `,`, `,@`) rewrite to their
//! canonical head-symbol forms so the expander and evaluator never see
//! the shorthand syntax.

use crate::lexer::{Lexer, Token, TokenKind};
use crate::number::parse_number;
use cozenage_core::{Bytevector, BytevectorKind, Cell, Interner, SchemeError};

pub struct Reader<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'a mut Interner,
}

impl<'a> Reader<'a> {
    pub fn new(src: &str, interner: &'a mut Interner) -> Self {
        Reader {
            tokens: Lexer::new(src).tokenize(),
            pos: 0,
            interner,
        }
    }

    /// Read every top-level datum in the source, stopping at `Eof`.
    pub fn read_all(&mut self) -> Result<Vec<Cell>, SchemeError> {
        let mut out = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            out.push(self.read_datum()?);
        }
        Ok(out)
    }

    /// Read a single datum, or `None` at end of input.
    pub fn read_one(&mut self) -> Result<Option<Cell>, SchemeError> {
        if self.peek().kind == TokenKind::Eof {
            return Ok(None);
        }
        self.read_datum().map(Some)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn read_datum(&mut self) -> Result<Cell, SchemeError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Eof => Err(SchemeError::syntax("unexpected end of input")),
            TokenKind::Error => {
                self.advance();
                Err(SchemeError::syntax(tok.text.as_str()))
            }
            TokenKind::LParen => self.read_list(TokenKind::RParen),
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.advance();
                Err(SchemeError::syntax("unexpected closing delimiter"))
            }
            TokenKind::Hash => {
                self.advance();
                if tok.text == "#(" {
                    self.read_vector()
                } else if tok.text == "#u8(" {
                    self.read_bytevector()
                } else {
                    Err(SchemeError::syntax(format!("unsupported # syntax: {}", tok.text)))
                }
            }
            TokenKind::MapStart | TokenKind::SetStart => {
                // Lexed for fidelity with the token table, but hash
                // tables and sets are runtime library values built via
                // `make-hash-table`/`make-set`, not reader literals.
                self.advance();
                Err(SchemeError::syntax("map/set literal syntax is not supported; use make-hash-table or make-set"))
            }
            TokenKind::Quote => {
                self.advance();
                self.wrap_reader_macro("quote")
            }
            TokenKind::Quasiquote => {
                self.advance();
                self.wrap_reader_macro("quasiquote")
            }
            TokenKind::Comma => {
                self.advance();
                self.wrap_reader_macro("unquote")
            }
            TokenKind::CommaAt => {
                self.advance();
                self.wrap_reader_macro("unquote-splicing")
            }
            TokenKind::Number => {
                self.advance();
                let n = parse_number(&tok.text)
                    .ok_or_else(|| SchemeError::syntax(format!("malformed number literal: {}", tok.text)))?;
                Ok(Cell::Number(n))
            }
            TokenKind::Boolean => {
                self.advance();
                match tok.text.as_str() {
                    "#t" | "#true" => Ok(Cell::boolean(true)),
                    "#f" | "#false" => Ok(Cell::boolean(false)),
                    other => Err(SchemeError::syntax(format!("malformed boolean literal: {other}"))),
                }
            }
            TokenKind::Char => {
                self.advance();
                Ok(Cell::Char(parse_char_literal(&tok.text)?))
            }
            TokenKind::String => {
                self.advance();
                Ok(Cell::string(unescape_string(&tok.text)))
            }
            TokenKind::Symbol => {
                self.advance();
                Ok(Cell::symbol(self.interner.intern(&tok.text)))
            }
        }
    }

    fn wrap_reader_macro(&mut self, head: &str) -> Result<Cell, SchemeError> {
        let sym = self.interner.intern(head);
        let datum = self.read_datum()?;
        Ok(Cell::list(vec![Cell::symbol(sym), datum]))
    }

    fn read_list(&mut self, close: TokenKind) -> Result<Cell, SchemeError> {
        self.advance(); // consume the opening delimiter
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Err(SchemeError::syntax("unterminated list")),
                k if k == close || matches!(k, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace) => {
                    self.advance();
                    return Ok(Cell::list(items));
                }
                TokenKind::Symbol if self.peek().text == "." => {
                    self.advance();
                    let tail = self.read_datum()?;
                    match self.peek().kind {
                        k if matches!(k, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace) => {
                            self.advance();
                            return Ok(Cell::list_with_tail(items, tail));
                        }
                        _ => return Err(SchemeError::syntax("malformed dotted list")),
                    }
                }
                _ => items.push(self.read_datum()?),
            }
        }
    }

    fn read_vector(&mut self) -> Result<Cell, SchemeError> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Err(SchemeError::syntax("unterminated vector literal")),
                TokenKind::RParen => {
                    self.advance();
                    return Ok(Cell::Vector(std::rc::Rc::new(std::cell::RefCell::new(items))));
                }
                _ => items.push(self.read_datum()?),
            }
        }
    }

    fn read_bytevector(&mut self) -> Result<Cell, SchemeError> {
        let mut data = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof => return Err(SchemeError::syntax("unterminated bytevector literal")),
                TokenKind::RParen => {
                    self.advance();
                    let bv = Bytevector::new(BytevectorKind::U8, data);
                    return Ok(Cell::Bytevector(std::rc::Rc::new(std::cell::RefCell::new(bv))));
                }
                TokenKind::Number => {
                    let tok = self.advance();
                    let n = parse_number(&tok.text)
                        .ok_or_else(|| SchemeError::syntax("malformed bytevector element"))?;
                    match n {
                        cozenage_core::Number::Integer(i) if (0..=255).contains(&i) => data.push(i),
                        _ => return Err(SchemeError::syntax("bytevector elements must be exact integers 0-255")),
                    }
                }
                _ => return Err(SchemeError::syntax("bytevector literal may only contain byte values")),
            }
        }
    }
}

/// Reverse the lexer's pass-through escaping: `\n`, `\t`, `\\`, `\"`,
/// and a backslash immediately followed by a newline (line-continuation,
/// which swallows the newline and any leading whitespace on the next line).
fn unescape_string(text: &str) -> String {
    let mut out = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\n') => {
                while matches!(chars.peek(), Some(c) if c.is_whitespace() && *c != '\n') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn parse_char_literal(text: &str) -> Result<char, SchemeError> {
    if text.chars().count() == 1 {
        return Ok(text.chars().next().unwrap());
    }
    match text.to_ascii_lowercase().as_str() {
        "space" => Ok(' '),
        "newline" | "linefeed" => Ok('\n'),
        "tab" => Ok('\t'),
        "nul" | "null" => Ok('\0'),
        "return" => Ok('\r'),
        "backspace" => Ok('\u{8}'),
        "delete" | "rubout" => Ok('\u{7f}'),
        "escape" | "altmode" => Ok('\u{1b}'),
        "alarm" => Ok('\u{7}'),
        _ => {
            if let Some(hex) = text.strip_prefix('x').or_else(|| text.strip_prefix('X')) {
                let code = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| SchemeError::syntax(format!("malformed character literal: #\\{text}")))?;
                return Ok(code);
            }
            Err(SchemeError::syntax(format!("unrecognized character literal: #\\{text}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(src: &str) -> Cell {
        let mut interner = Interner::new();
        let mut reader = Reader::new(src, &mut interner);
        reader.read_one().unwrap().unwrap()
    }

    #[test]
    fn reads_simple_list() {
        let cell = read_one("(+ 1 2)");
        assert_eq!(cell.to_string(), "(+ 1 2)");
    }

    #[test]
    fn reads_dotted_pair() {
        let cell = read_one("(1 . 2)");
        assert_eq!(cell.to_string(), "(1 . 2)");
    }

    #[test]
    fn quote_rewrites_to_canonical_form() {
        let cell = read_one("'x");
        assert_eq!(cell.to_string(), "(quote x)");
    }

    #[test]
    fn quasiquote_unquote_splicing_rewrite() {
        let cell = read_one("`(1 ,@xs)");
        let items = cell.to_vec().unwrap();
        assert_eq!(items[0].to_string(), "quasiquote");
        let inner = items[1].to_vec().unwrap();
        assert_eq!(inner[1].to_string(), "(unquote-splicing xs)");
    }

    #[test]
    fn vector_literal() {
        let cell = read_one("#(1 2 3)");
        assert_eq!(cell.to_string(), "#(1 2 3)");
    }

    #[test]
    fn bytevector_literal() {
        let cell = read_one("#u8(0 255 1)");
        assert_eq!(cell.to_string(), "#u8(0 255 1)");
    }

    #[test]
    fn string_escape_sequences_are_interpreted() {
        let cell = read_one("\"a\\nb\"");
        assert_eq!(cell.to_string(), "a\nb");
    }

    #[test]
    fn character_literal_names() {
        assert_eq!(read_one("#\\space").to_string(), " ");
        assert_eq!(read_one("#\\a").to_string(), "a");
    }

    #[test]
    fn map_literal_syntax_is_rejected() {
        let mut interner = Interner::new();
        let mut reader = Reader::new("#[1 2]", &mut interner);
        assert!(reader.read_one().is_err());
    }

    #[test]
    fn reads_multiple_top_level_forms() {
        let mut interner = Interner::new();
        let mut reader = Reader::new("1 2 3", &mut interner);
        let forms = reader.read_all().unwrap();
        assert_eq!(forms.len(), 3);
    }
}
