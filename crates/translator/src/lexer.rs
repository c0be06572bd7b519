//! Line-buffered token scanner.
//!
//! The whole input is decoded and buffered up front so that pass 2 can
//! `rewind` and observe exactly the token sequence pass 1 saw. The
//! scanner works on the remaining text of the current line: each rule
//! is tried in order and consumes its match from the front.
//!
//! Pushback is a small stack rather than a single slot so nested
//! lookahead survives (`unfetch` after `peek` after `unfetch`), and it
//! is strictly LIFO: `fetch` after `unfetch(t)` always returns `t`.
//!
//! Besides tokens the scanner tracks the physical and BASIC line
//! numbers, extracts the leading numeric label of each line (readable
//! once through `get_go_lineno`), collects `#c`...`#endc` blocks and
//! comment-mode lines into the ccode buffer, and keeps enough state to
//! point a caret at the current scan position in diagnostics.

use crate::keyword::{Keyword, Tables};
use crate::namespace::Pass;
use crate::token::Token;

pub struct TokenGen<'a> {
    tables: &'a Tables,
    source: String,
    /// Tab stops for `-c` comment insertion; `None` disables it.
    cindent: Option<usize>,
    verbose: bool,
    pass: Pass,

    /// Byte offset of the next unread physical line.
    pos: usize,
    /// Remaining text of the current line.
    line: String,
    /// The current line as read, for diagnostics.
    curline: String,
    lineno: usize,
    baslineno: usize,
    golineno: u32,
    first_token: bool,
    cached: Vec<Token>,
    /// Drop comment tokens (set while between functions).
    pub nocomment: bool,
    ccode: String,
    /// Remaining-line lengths before/after the last fetch, in chars.
    prelen: usize,
    curlen: usize,
}

impl<'a> TokenGen<'a> {
    pub fn new(source: String, tables: &'a Tables, cindent: Option<usize>, verbose: bool) -> Self {
        let mut t = TokenGen {
            tables,
            source,
            cindent,
            verbose,
            pass: Pass::One,
            pos: 0,
            line: String::new(),
            curline: String::new(),
            lineno: 0,
            baslineno: 0,
            golineno: 0,
            first_token: true,
            cached: Vec::new(),
            nocomment: false,
            ccode: String::new(),
            prelen: 0,
            curlen: 0,
        };
        t.rewind();
        t
    }

    pub fn set_pass(&mut self, pass: Pass) {
        self.pass = pass;
    }

    /// Restart scanning from the first byte of the input.
    pub fn rewind(&mut self) {
        self.pos = 0;
        self.line.clear();
        self.curline.clear();
        self.lineno = 0;
        self.baslineno = 0;
        self.golineno = 0;
        self.first_token = true;
        self.cached.clear();
        self.nocomment = false;
        self.ccode.clear();
        self.prelen = 0;
        self.curlen = 0;
    }

    /// The numeric label of the current line, once; later calls return 0
    /// until the next labelled line is read.
    pub fn get_go_lineno(&mut self) -> u32 {
        let r = self.golineno;
        self.golineno = 0;
        r
    }

    /// "physical (basic)" line numbers for diagnostics.
    pub fn error_lineno(&self) -> String {
        format!("{} ({})", self.lineno, self.baslineno)
    }

    /// The current source line and the caret column for diagnostics.
    pub fn caret(&self) -> (String, usize) {
        let col = self.curline.chars().count().saturating_sub(self.prelen);
        (self.curline.clone(), col)
    }

    /// Take the accumulated `#c` / comment-mode text.
    pub fn take_ccode(&mut self) -> String {
        std::mem::take(&mut self.ccode)
    }

    /// A source line with comment markers removed, for safe embedding in
    /// a C comment.
    fn bas_comment_line(line: &str) -> String {
        line.replace("/*", "").replace("*/", "").trim_end_matches('\n').to_string()
    }

    /// Read the next physical line into `line`. Returns false at end of
    /// input.
    fn read_line(&mut self) -> bool {
        self.line.clear();
        if self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            match rest.find('\n') {
                Some(n) => {
                    self.line.push_str(&rest[..=n]);
                    self.pos += n + 1;
                }
                None => {
                    self.line.push_str(rest);
                    self.pos = self.source.len();
                }
            }
        }
        self.curline = self.line.clone();
        self.golineno = 0;
        self.first_token = true;
        if self.line.is_empty() {
            return false;
        }

        self.lineno += 1;
        self.baslineno += 1;
        if let Some(ci) = self.cindent {
            self.ccode.push_str(&"\t".repeat(ci));
            self.ccode
                .push_str(&format!("/*==={}===*/\n", Self::bas_comment_line(&self.line)));
        }
        if self.verbose && self.pass == Pass::Two {
            eprint!("{}", self.line);
        }

        // leading numeric label
        let blank = self.line.chars().take_while(|c| *c == ' ' || *c == '\t').count();
        let digits: String = self.line[blank..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            let n = digits.parse::<u32>().unwrap_or(0);
            self.golineno = n;
            self.baslineno = n as usize;
            let mut consumed = blank + digits.len();
            consumed += self.line[consumed..]
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .count();
            self.line.drain(..consumed);
        }
        true
    }

    /// Make sure the current line has unread text, reading (and handling
    /// `#c` blocks) as needed. Returns false at end of input.
    fn getline(&mut self) -> bool {
        if self.line.is_empty() {
            self.read_line();
            if self.line.starts_with("#c") {
                while self.read_line() {
                    if self.line.starts_with("#endc") {
                        break;
                    }
                    let l = self.line.clone();
                    self.ccode.push_str(&l);
                }
                self.read_line();
            }
        }
        let strip = self
            .line
            .chars()
            .take_while(|c| matches!(c, ' ' | '\t' | '\r' | '\u{1a}'))
            .count();
        self.line.drain(..strip);
        self.prelen = self.line.chars().count();
        self.curlen = self.prelen;
        !self.line.is_empty()
    }

    fn take(&mut self, n: usize) -> String {
        self.line.drain(..n).collect()
    }

    /// Scan one token from the input.
    fn get(&mut self) -> Token {
        if !self.getline() {
            return Token::Keyword(Keyword::Eof);
        }
        if self.line == "\n" {
            self.line.clear();
            return Token::Keyword(Keyword::Eol);
        }
        // comments survive only at the start of a line
        if self.line.starts_with("/*") {
            if self.first_token && !self.nocomment {
                let comment = format!("/*{}*/", Self::bas_comment_line(&self.line));
                self.line = "\n".to_string();
                return Token::Comment(comment);
            }
            self.line.clear();
            return Token::Keyword(Keyword::Eol);
        }

        self.first_token = false;

        let first = self.line.chars().next().unwrap();

        // string literal; an unterminated string is closed at end of line
        if first == '"' {
            let body: String = self.line[1..]
                .chars()
                .take_while(|c| *c != '"' && *c != '\n')
                .collect();
            let mut consumed = 1 + body.len();
            let mut text = format!("\"{}", body);
            if self.line[consumed..].starts_with('"') {
                consumed += 1;
            }
            text.push('"');
            self.take(consumed);
            return Token::Str(text.replace('\\', "\\\\"));
        }
        // character literal 'x'
        if first == '\'' {
            let mut it = self.line.chars();
            it.next();
            match (it.next(), it.next()) {
                (Some('\''), _) => return Token::Int(self.take(2)),
                (Some(c), Some('\'')) if c != '\'' => {
                    let n = 2 + c.len_utf8();
                    return Token::Int(self.take(n));
                }
                _ => {}
            }
        }
        // &H / &O / &B radix literals
        if first == '&' {
            if let Some(tok) = self.scan_radix() {
                return tok;
            }
        }
        // numbers
        if let Some((tok, n)) = scan_numeric(&self.line) {
            self.take(n);
            return tok;
        }
        // identifier or reserved word
        if first.is_ascii_alphabetic() || first == '_' {
            let word: String = self
                .line
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
                .collect();
            self.take(word.len());
            return match self.tables.find_keyword(&word) {
                Some(k) => Token::Keyword(k),
                None => Token::Variable(word.replace('$', "S")),
            };
        }
        // operator, longest match first
        if let Some((kw, n)) = Tables::find_op(&self.line) {
            self.take(n);
            return Token::Keyword(kw);
        }
        // anything else is a bare symbol
        let c = first;
        self.take(c.len_utf8());
        Token::Symbol(c)
    }

    fn scan_radix(&mut self) -> Option<Token> {
        let mut chars = self.line.chars();
        chars.next();
        let marker = chars.next()?;
        let (prefix, pred): (&str, fn(char) -> bool) = match marker.to_ascii_lowercase() {
            'h' => ("0x", |c| c.is_ascii_hexdigit()),
            'o' => ("0", |c| ('0'..='7').contains(&c)),
            'b' => ("0b", |c| c == '0' || c == '1'),
            _ => return None,
        };
        let digits: String = self.line[2..].chars().take_while(|&c| pred(c)).collect();
        if digits.is_empty() {
            return None;
        }
        self.take(2 + digits.len());
        Some(Token::Int(format!("{}{}", prefix, digits)))
    }

    /// Next token, consuming pushback first.
    pub fn fetch(&mut self) -> Token {
        self.prelen = self.curlen;
        self.curlen = self.line.chars().count();
        match self.cached.pop() {
            Some(t) => t,
            None => self.get(),
        }
    }

    /// Push a token back; the next `fetch` returns it.
    pub fn unfetch(&mut self, t: Token) {
        self.cached.push(t);
        self.curlen = self.prelen;
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        if let Some(t) = self.cached.last() {
            return t.clone();
        }
        let t = self.fetch();
        self.cached.push(t.clone());
        t
    }

    /// Skip forward to the next statement boundary (`:`, end of line, or
    /// end of file). Used for error recovery.
    pub fn skip_statement(&mut self) {
        loop {
            let t = self.fetch();
            if t.is_symbol(':') || t.is_keyword(Keyword::Eol) || t.is_keyword(Keyword::Eof) {
                return;
            }
        }
    }
}

/// Scan a float or integer literal at the start of `line`.
/// Floats are `D+.D*` or `.D+` with an optional signed exponent, or a
/// plain integer with a `#` suffix; the text keeps the mantissa and
/// exponent and gains a `(double)` prefix. Integers lose leading zeros
/// so C does not read them as octal.
fn scan_numeric(line: &str) -> Option<(Token, usize)> {
    let b = line.as_bytes();
    let d1 = b.iter().take_while(|c| c.is_ascii_digit()).count();

    if d1 < b.len() && b[d1] == b'.' {
        let d2 = b[d1 + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if d1 > 0 || d2 > 0 {
            let mut end = d1 + 1 + d2;
            // optional exponent, consumed only when digits follow
            if end < b.len() && (b[end] == b'e' || b[end] == b'E') {
                let mut k = end + 1;
                if k < b.len() && (b[k] == b'+' || b[k] == b'-') {
                    k += 1;
                }
                let de = b[k..].iter().take_while(|c| c.is_ascii_digit()).count();
                if de > 0 {
                    end = k + de;
                }
            }
            let text = format!("(double){}", &line[..end]);
            let consumed = if end < b.len() && b[end] == b'#' { end + 1 } else { end };
            return Some((Token::Float(text), consumed));
        }
    }
    if d1 > 0 {
        if d1 < b.len() && b[d1] == b'#' {
            return Some((Token::Float(format!("(double){}", &line[..d1])), d1 + 1));
        }
        let stripped = line[..d1].trim_start_matches('0');
        let text = if stripped.is_empty() { "0" } else { stripped };
        return Some((Token::Int(text.to_string()), d1));
    }
    None
}
