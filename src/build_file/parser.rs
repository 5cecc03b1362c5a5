//! Parser for build files.
//!
//! ```text
//! file    := stmt*
//! stmt    := IDENT "(" args? ")"
//! load    := "load" "(" STRING ("," STRING)* ","? ")"
//! call    := IDENT "(" (arg ("," arg)* ","?)? ")"
//! arg     := IDENT "=" value | expr
//! value   := STRING | "[" (STRING ("," STRING)* ","?)? "]" | expr
//! ```
//!
//! Anything that is not a plain string or list of strings is kept as raw
//! source text and written back unchanged. `#` starts a comment that runs to
//! the end of the line; comments are attached to the statement that follows
//! them, or to the file when nothing follows.

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::core::{AttrValue, LoadInfo, Rule, RuleFile};

/// Syntax error in a build file.
#[derive(Debug, Error, Diagnostic)]
#[error("{file}:{line}:{column}: {message}")]
#[diagnostic(code(modbound::build_file::syntax))]
pub struct BuildFileError {
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eq,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{}`", name),
            Token::Str(_) => "string".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Eq => "`=`".to_string(),
            Token::Eof => "end of file".to_string(),
        }
    }
}

/// Lexer position plus the number of comments collected so far.
#[derive(Clone, Copy)]
struct Checkpoint {
    pos: usize,
    comments: usize,
}

struct Parser<'a> {
    src: &'a str,
    path: &'a Path,
    pos: usize,
    /// Byte offset where the most recently lexed token starts
    start: usize,
    /// Comments not yet claimed by a statement
    comments: Vec<String>,
}

/// Parse build file contents.
pub fn parse(contents: &str, path: &Path) -> Result<RuleFile, BuildFileError> {
    Parser {
        src: contents,
        path,
        pos: 0,
        start: 0,
        comments: Vec::new(),
    }
    .file()
}

impl<'a> Parser<'a> {
    fn file(mut self) -> Result<RuleFile, BuildFileError> {
        let mut loads = Vec::new();
        let mut rules = Vec::new();
        let mut trailing = Vec::new();

        loop {
            let token = self.next()?;
            let mut comments = std::mem::take(&mut self.comments);
            match token {
                Token::Eof => {
                    trailing = comments;
                    break;
                }
                Token::Ident(kind) => {
                    self.expect(Token::LParen)?;
                    if kind == "load" {
                        let mut load = self.load()?;
                        comments.append(&mut self.comments);
                        load.comments = comments;
                        loads.push(load);
                    } else {
                        let mut rule = self.call(kind)?;
                        comments.append(&mut self.comments);
                        rule.set_comments(comments);
                        rules.push(rule);
                    }
                }
                other => {
                    return Err(self.error(format!(
                        "expected a rule or load statement, found {}",
                        other.describe()
                    )))
                }
            }
        }

        let mut file = RuleFile::from_parts(self.path, loads, rules);
        file.set_trailing_comments(trailing);
        Ok(file)
    }

    fn load(&mut self) -> Result<LoadInfo, BuildFileError> {
        let mut strings = Vec::new();
        loop {
            match self.next()? {
                Token::RParen => break,
                Token::Str(s) => strings.push(s),
                other => {
                    return Err(self.error(format!(
                        "expected a string in load statement, found {}",
                        other.describe()
                    )))
                }
            }
            match self.next()? {
                Token::Comma => continue,
                Token::RParen => break,
                other => return Err(self.error(format!("expected `,` or `)`, found {}", other.describe()))),
            }
        }

        let mut strings = strings.into_iter();
        let Some(label) = strings.next() else {
            return Err(self.error("load statement needs a label".to_string()));
        };
        Ok(LoadInfo::new(label, strings.collect()))
    }

    fn call(&mut self, kind: String) -> Result<Rule, BuildFileError> {
        let mut name = None;
        let mut args = Vec::new();
        let mut attrs = Vec::new();

        loop {
            if self.eat(Token::RParen) {
                break;
            }

            match self.keyword() {
                Some(key) => {
                    let value = self.value()?;
                    match value {
                        AttrValue::String(s) if key == "name" && name.is_none() => name = Some(s),
                        value => attrs.push((key, value)),
                    }
                }
                None => args.push(self.raw()?),
            }

            match self.next()? {
                Token::Comma => continue,
                Token::RParen => break,
                other => return Err(self.error(format!("expected `,` or `)`, found {}", other.describe()))),
            }
        }

        let mut rule = Rule::new(kind, name.unwrap_or_default());
        for arg in args {
            rule.push_arg(arg);
        }
        for (key, value) in attrs {
            rule.set_attr(key, value);
        }
        Ok(rule)
    }

    /// Consume `IDENT =` if it comes next and return the identifier.
    fn keyword(&mut self) -> Option<String> {
        let checkpoint = self.checkpoint();
        if let Ok(Token::Ident(key)) = self.next() {
            if let Ok(Token::Eq) = self.next() {
                if self.peek() != Some('=') {
                    return Some(key);
                }
            }
        }
        self.rewind(checkpoint);
        None
    }

    fn value(&mut self) -> Result<AttrValue, BuildFileError> {
        let checkpoint = self.checkpoint();
        if let Some(value) = self.plain_value() {
            let after = self.checkpoint();
            let ends_here = matches!(self.next(), Ok(Token::Comma | Token::RParen));
            self.rewind(after);
            if ends_here {
                return Ok(value);
            }
        }
        self.rewind(checkpoint);
        Ok(AttrValue::Raw(self.raw()?))
    }

    /// A string or a list of strings, or `None` for anything else.
    fn plain_value(&mut self) -> Option<AttrValue> {
        match self.next().ok()? {
            Token::Str(s) => Some(AttrValue::String(s)),
            Token::LBracket => {
                let mut items = Vec::new();
                loop {
                    match self.next().ok()? {
                        Token::RBracket => break,
                        Token::Str(s) => items.push(s),
                        _ => return None,
                    }
                    match self.next().ok()? {
                        Token::Comma => continue,
                        Token::RBracket => break,
                        _ => return None,
                    }
                }
                Some(AttrValue::List(items))
            }
            _ => None,
        }
    }

    /// Scan one argument expression as source text, up to the `,` or `)`
    /// that ends it.
    fn raw(&mut self) -> Result<String, BuildFileError> {
        self.skip_trivia();
        let begin = self.pos;
        let mut end = begin;
        let mut open: Vec<(char, usize)> = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '(' | '[' | '{' => open.push((c, self.pos)),
                ')' | ']' | '}' => {
                    let Some((opener, _)) = open.pop() else {
                        break;
                    };
                    let want = closing(opener);
                    if c != want {
                        self.start = self.pos;
                        return Err(self.error(format!("expected `{}`, found `{}`", want, c)));
                    }
                }
                ',' if open.is_empty() => break,
                '#' if open.is_empty() => break,
                '#' => {
                    let rest = &self.src[self.pos..];
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                    continue;
                }
                '"' | '\'' => {
                    self.skip_quoted(c)?;
                    end = self.pos;
                    continue;
                }
                _ => {}
            }
            self.pos += c.len_utf8();
            if !c.is_whitespace() {
                end = self.pos;
            }
        }

        if let Some((opener, at)) = open.last() {
            self.start = *at;
            return Err(self.error(format!("unclosed `{}`", opener)));
        }
        if end == begin {
            self.start = self.pos;
            let found = self.peek().map_or("end of file".to_string(), |c| format!("`{}`", c));
            return Err(self.error(format!("expected an expression, found {}", found)));
        }
        Ok(self.src[begin..end].to_string())
    }

    /// Step over a quoted string inside a raw expression.
    fn skip_quoted(&mut self, quote: char) -> Result<(), BuildFileError> {
        self.start = self.pos;
        let rest = &self.src[self.pos..];
        let triple: String = std::iter::repeat(quote).take(3).collect();

        if let Some(body) = rest.strip_prefix(triple.as_str()) {
            let Some(len) = body.find(triple.as_str()) else {
                return Err(self.error("unterminated string".to_string()));
            };
            self.pos += 2 * triple.len() + len;
            return Ok(());
        }

        let mut chars = rest.char_indices().skip(1);
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => break,
                c if c == quote => {
                    self.pos += offset + c.len_utf8();
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(self.error("unterminated string".to_string()))
    }

    fn expect(&mut self, want: Token) -> Result<(), BuildFileError> {
        let got = self.next()?;
        if got == want {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                want.describe(),
                got.describe()
            )))
        }
    }

    /// Consume `want` if it is the next token.
    fn eat(&mut self, want: Token) -> bool {
        let checkpoint = self.checkpoint();
        if self.next().is_ok_and(|got| got == want) {
            return true;
        }
        self.rewind(checkpoint);
        false
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            comments: self.comments.len(),
        }
    }

    fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.comments.truncate(checkpoint.comments);
    }

    fn next(&mut self) -> Result<Token, BuildFileError> {
        self.skip_trivia();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '=' => Token::Eq,
            '"' => return self.string(),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let rest = &self.src[self.pos..];
                let len = rest
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(rest.len());
                self.pos += len;
                return Ok(Token::Ident(rest[..len].to_string()));
            }
            other => return Err(self.error(format!("unexpected character `{}`", other))),
        };
        self.pos += 1;
        Ok(token)
    }

    fn string(&mut self) -> Result<Token, BuildFileError> {
        // Opening quote.
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.src[self.pos..].char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(Token::Str(out));
                }
                '\\' => match chars.next() {
                    Some((_, '"')) => out.push('"'),
                    Some((_, '\\')) => out.push('\\'),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((esc_offset, other)) => {
                        self.start = self.pos + esc_offset - 1;
                        return Err(self.error(format!("unsupported escape `\\{}`", other)));
                    }
                    None => break,
                },
                '\n' => break,
                c => out.push(c),
            }
        }

        Err(self.error("unterminated string".to_string()))
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c == '#' {
                let rest = &self.src[self.pos..];
                let len = rest.find('\n').unwrap_or(rest.len());
                self.comments.push(rest[..len].trim_end().to_string());
                self.pos += len;
            } else if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn error(&self, message: String) -> BuildFileError {
        let before = &self.src[..self.start];
        let line = before.matches('\n').count() + 1;
        let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
        let file = self.path.display().to_string();
        let len = self.src[self.start..].chars().next().map_or(0, char::len_utf8);

        BuildFileError {
            message,
            file: file.clone(),
            line,
            column,
            src: NamedSource::new(file, self.src.to_string()),
            span: (self.start, len).into(),
        }
    }
}

fn closing(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
