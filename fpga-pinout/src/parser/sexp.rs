use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input (list opened at byte {0} is never closed)")]
    UnclosedList(usize),
    #[error("Unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("Unexpected ')' at byte {0}")]
    UnexpectedClose(usize),
    #[error("Empty input")]
    Empty,
}

/// A KiCad s-expression: either a bare/quoted atom or a parenthesized list.
#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// The leading atom of a list, e.g. `net` for `(net (code "1") ...)`.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    pub fn is_list_of(&self, key: &str) -> bool {
        self.head() == Some(key)
    }

    /// Direct child lists headed by `key`.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SExp> + 'a {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter(move |item| item.is_list_of(key))
    }

    /// First direct child list headed by `key`.
    pub fn get(&self, key: &str) -> Option<&SExp> {
        self.as_list()?.iter().find(|item| item.is_list_of(key))
    }

    /// String value of a `(key "value")` child.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_list()?.get(1)?.as_atom()
    }

    /// Depth-first search for the first list headed by `key`, including `self`.
    pub fn find(&self, key: &str) -> Option<&SExp> {
        if self.is_list_of(key) {
            return Some(self);
        }
        self.as_list()?
            .iter()
            .skip(1)
            .find_map(|item| item.find(key))
    }
}

/// Recursive-descent reader for one top-level s-expression.
pub struct SExpParser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> SExpParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
        }
    }

    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        match self.chars.peek() {
            None => Err(ParseError::Empty),
            Some(_) => self.parse_sexp(),
        }
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        match self.chars.peek().copied() {
            Some((pos, '(')) => {
                self.chars.next();
                self.parse_list(pos)
            }
            Some((pos, ')')) => Err(ParseError::UnexpectedClose(pos)),
            Some((pos, '"')) => {
                self.chars.next();
                self.parse_string(pos)
            }
            Some(_) => Ok(self.parse_symbol()),
            None => Err(ParseError::Empty),
        }
    }

    fn parse_list(&mut self, open: usize) -> Result<SExp, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None => return Err(ParseError::UnclosedList(open)),
                Some((_, ')')) => {
                    self.chars.next();
                    return Ok(SExp::List(items));
                }
                Some(_) => items.push(self.parse_sexp()?),
            }
        }
    }

    fn parse_string(&mut self, start: usize) -> Result<SExp, ParseError> {
        let mut s = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '"' => return Ok(SExp::Atom(s)),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, 'r')) => s.push('\r'),
                    Some((_, other)) => s.push(other),
                    None => break,
                },
                _ => s.push(ch),
            }
        }
        Err(ParseError::UnterminatedString(start))
    }

    fn parse_symbol(&mut self) -> SExp {
        let mut s = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.chars.next();
        }
        SExp::Atom(s)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, ch)| ch.is_whitespace()).is_some() {}
    }
}
