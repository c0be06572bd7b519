//! Statement-level translation.
//!
//! The translator is a parser and a code generator in one: statements
//! are recognised by keyword dispatch and immediately rendered as C
//! text. It runs twice over the same token stream:
//!
//! - Pass 1 populates the namespace, collects the GOTO-label and
//!   GOSUB-subroutine line-number sets, and finds the per-statement
//!   maximum of string scratch buffers. Its emitted text is thrown
//!   away; syntax errors are suppressed because the symbol table is
//!   still incomplete.
//! - Pass 2 rewinds the lexer and emits the translation with full
//!   symbol knowledge. Definition errors cannot occur any more; syntax
//!   errors are reported and recovery skips to the next statement
//!   boundary.
//!
//! Control-flow context lives in a stack of [`Frame`]s. Single-line
//! `then`/`else` frames close at end of line, brace frames close on
//! `}`; `main`, GOSUB bodies and user functions close through
//! [`Translator::nest_close`], which also verifies nothing else is
//! left open.
//!
//! # Module structure
//!
//! - `statements.rs`: statement dispatch, declarations, assignment
//! - `expr.rs`: the recursive-descent expression parser
//! - `exfncall.rs`: built-in / external function call dispatch

mod exfncall;
mod expr;
mod statements;

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::config::Config;
use crate::error::{Result, TranslateError};
use crate::keyword::Tables;
use crate::lexer::TokenGen;
use crate::namespace::{NameSpace, Pass};
use crate::token::Token;
use crate::variable::BasType;

/// One open control-flow construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Frame {
    /// The body of `main`.
    Main,
    /// A GOSUB subroutine body, opened at its target line.
    Subr,
    /// A user function between `func` and `endfunc`.
    Func,
    For,
    While,
    Repeat,
    Switch,
    /// `then` branch ending at end of line.
    ThenLine,
    /// `then {` branch ending at `}`.
    ThenBlock,
    /// `else` branch ending at end of line.
    ElseLine,
    /// `else {` branch ending at `}`.
    ElseBlock,
}

fn nest_error(frame: Frame) -> TranslateError {
    let what = match frame {
        Frame::For => "for - next",
        Frame::While => "while - endwhile",
        Frame::Repeat => "repeat - until",
        Frame::Switch => "switch - endswitch",
        Frame::Func => "func - endfunc",
        Frame::ThenLine | Frame::ThenBlock | Frame::ElseLine | Frame::ElseBlock => {
            "if - then - else"
        }
        Frame::Main | Frame::Subr => "block nesting",
    };
    TranslateError::Syntax(format!("mismatched {}", what))
}

/// Unwrap a parse result that must be present.
pub(crate) fn expect<T>(v: Option<T>) -> Result<T> {
    v.ok_or_else(TranslateError::syntax)
}

pub(crate) fn expect_msg<T>(v: Option<T>, msg: &str) -> Result<T> {
    v.ok_or_else(|| TranslateError::Syntax(msg.to_string()))
}

/// The two-pass statement translator.
pub struct Translator<'a> {
    pub(crate) cfg: Config,
    pub(crate) tables: &'a Tables,
    pub(crate) lexer: TokenGen<'a>,
    pub(crate) nsp: NameSpace,
    pub(crate) pass: Pass,

    /// GOTO targets collected in pass 1, in first-reference order.
    pub(crate) labels: Vec<u32>,
    /// GOSUB targets collected in pass 1, in first-reference order.
    pub(crate) subrs: Vec<u32>,
    /// String scratch buffers used by the current statement.
    pub(crate) strtmp: usize,
    /// Running maximum of `strtmp` over all statements.
    pub(crate) strtmp_max: usize,
    /// Next `_initmp` array-assignment temporary, reset per pass.
    pub(crate) initmp: usize,
    /// Extension groups referenced through the signature table.
    pub(crate) groups: BTreeSet<String>,

    pub(crate) nest: Vec<Frame>,
    pub(crate) indent: usize,

    file_name: String,
    errors: usize,
    b_exit: &'static str,
}

impl<'a> Translator<'a> {
    pub fn new(source: &str, tables: &'a Tables, config: &Config, file_name: &str) -> Self {
        let lexer = TokenGen::new(
            source.to_string(),
            tables,
            config.bas_comment,
            config.verbose,
        );
        let b_exit = if config.no_binit { "exit" } else { "b_exit" };
        Translator {
            cfg: config.clone(),
            tables,
            lexer,
            nsp: NameSpace::new(),
            pass: Pass::One,
            labels: Vec::new(),
            subrs: Vec::new(),
            strtmp: 0,
            strtmp_max: 0,
            initmp: 0,
            groups: BTreeSet::new(),
            nest: vec![Frame::Main],
            indent: 0,
            file_name: file_name.to_string(),
            errors: 0,
            b_exit,
        }
    }

    /// Number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    fn set_pass(&mut self, pass: Pass) {
        self.pass = pass;
        self.update_strtmp();
        self.nsp.set_pass(pass);
        self.nsp.leave_local();
        self.initmp = 0;
        self.nest = vec![Frame::Main];
        self.indent = 0;
        self.lexer.set_pass(pass);
        self.lexer.rewind();
    }

    /// Fold the current statement's scratch count into the running
    /// maximum and reset it.
    pub(crate) fn update_strtmp(&mut self) {
        self.strtmp_max = self.strtmp_max.max(self.strtmp);
        self.strtmp = 0;
    }

    pub(crate) fn nest_in(&mut self, frame: Frame) {
        self.nest.push(frame);
    }

    /// Close the innermost frame, which must be `frame`.
    pub(crate) fn nest_out(&mut self, frame: Frame) -> Result<()> {
        match self.nest.last() {
            Some(&top) if top == frame => {
                self.nest.pop();
                self.indent = self.indent.saturating_sub(1);
                Ok(())
            }
            _ => Err(nest_error(frame)),
        }
    }

    /// Close the `main` or subroutine body if one is open; anything
    /// else still open at this point is a nesting error.
    pub(crate) fn nest_close(&mut self) -> Result<String> {
        match self.nest.as_slice() {
            [Frame::Main] => {
                // main fell off the end without END
                let r = format!("{}{}(0);\n", self.indent_str(), self.b_exit);
                self.nest_out(Frame::Main)?;
                Ok(r + "}\n")
            }
            [Frame::Subr] => {
                self.nest_out(Frame::Subr)?;
                Ok("}\n".to_string())
            }
            [] => Ok(String::new()),
            [.., top] => {
                let top = *top;
                self.nest.clear();
                Err(nest_error(top))
            }
        }
    }

    pub(crate) fn indent_str(&self) -> String {
        "\t".repeat(self.indent)
    }

    /// Emit the pending label or subroutine opening for the line the
    /// last statement started on.
    fn gen_label(&mut self) -> Result<String> {
        let l = self.lexer.get_go_lineno();
        if l == 0 {
            return Ok(String::new());
        }
        if self.labels.contains(&l) {
            return Ok(format!("L{:06}:\n", l));
        }
        if self.subrs.contains(&l) {
            self.lexer.nocomment = false;
            let mut r = self.nest_close()?;
            self.nest_in(Frame::Subr);
            r.push_str("\n/***************************/\n");
            self.indent += 1;
            write!(r, "void S{:06}(void)\n{{\n", l)?;
            return Ok(r);
        }
        Ok(String::new())
    }

    /// Global declarations plus one prototype per GOSUB subroutine.
    fn gen_define(&self) -> String {
        let mut r = self.nsp.definitions(None);
        for l in &self.subrs {
            r.push_str(&format!("void S{:06}(void);\n", l));
        }
        r
    }

    /// Report an error with the offending line and a caret at the
    /// current scan position.
    fn report(&mut self, e: &TranslateError) {
        self.errors += 1;
        eprintln!(
            "{}:{}\t: error: {}",
            self.file_name,
            self.lexer.error_lineno(),
            e
        );
        let (line, col) = self.lexer.caret();
        if !line.is_empty() {
            eprint!("{}", line);
            if !line.ends_with('\n') {
                eprintln!();
            }
            eprintln!("{}^", " ".repeat(col));
        }
    }

    /// Run both passes and return the generated C source.
    ///
    /// Translation errors are reported to stderr and recovered from
    /// (check [`Translator::error_count`]); `Err` is returned only for
    /// output formatting failures or, with the debug flag, for the
    /// first pass-2 error.
    pub fn translate(&mut self) -> Result<String> {
        self.set_pass(Pass::One);
        loop {
            match self.statement() {
                Ok(None) => break,
                Ok(Some(_)) => {}
                Err(e @ TranslateError::Definition(_)) => self.report(&e),
                Err(e @ TranslateError::Format(_)) => return Err(e),
                // only pass 2 is authoritative for syntax errors
                Err(_) => self.lexer.skip_statement(),
            }
        }

        self.set_pass(Pass::Two);
        let mut out = String::new();
        out.push_str("#include <basic0.h>\n");
        out.push_str("#include <string.h>\n");
        if self.cfg.no_binit {
            out.push_str("#include <stdlib.h>\n");
        }
        for g in &self.groups {
            if !g.is_empty() {
                writeln!(out, "#include <{}.h>", g.to_lowercase())?;
            }
        }
        out.push('\n');
        out.push_str(&self.gen_define());
        for i in 0..self.strtmp_max {
            writeln!(out, "static unsigned char strtmp{}[258];", i)?;
        }
        out.push_str("\n/******** program start ********/\n");
        out.push_str("void main(int b_argc, char *b_argv[])\n{\n");
        if !self.cfg.no_binit {
            out.push_str("\tb_init();\n");
        }

        loop {
            self.indent = self.nest.len();
            match self.statement() {
                Ok(s) => {
                    out.push_str(&self.lexer.take_ccode());
                    out.push_str(&self.gen_label()?);
                    match s {
                        None => break,
                        Some(text) => {
                            for l in text.lines() {
                                writeln!(out, "{}{}", self.indent_str(), l)?;
                            }
                        }
                    }
                }
                Err(TranslateError::Definition(_)) => {}
                Err(e @ TranslateError::Format(_)) => return Err(e),
                Err(e) => {
                    if self.cfg.debug {
                        return Err(e);
                    }
                    self.report(&e);
                    self.lexer.skip_statement();
                }
            }
        }
        match self.nest_close() {
            Ok(s) => out.push_str(&s),
            Err(e) => self.report(&e),
        }
        Ok(out)
    }

    // small token helpers shared by the statement and expression layers

    /// Consume the next token if it is the symbol `c`.
    pub(crate) fn check_symbol(&mut self, c: char) -> bool {
        let t = self.lexer.fetch();
        if t.is_symbol(c) {
            true
        } else {
            self.lexer.unfetch(t);
            false
        }
    }

    /// Consume the next token if it is the keyword `k`.
    pub(crate) fn check_keyword(&mut self, k: crate::keyword::Keyword) -> bool {
        let t = self.lexer.fetch();
        if t.is_keyword(k) {
            true
        } else {
            self.lexer.unfetch(t);
            false
        }
    }

    /// Consume the next token if it names a variable type.
    pub(crate) fn check_vartype(&mut self) -> Option<BasType> {
        let t = self.lexer.fetch();
        match t.vartype() {
            Some(ty) => Some(ty),
            None => {
                self.lexer.unfetch(t);
                None
            }
        }
    }

    /// Consume the next token if it is a string literal.
    pub(crate) fn check_str(&mut self) -> Option<String> {
        let t = self.lexer.fetch();
        match t {
            Token::Str(s) => Some(s),
            other => {
                self.lexer.unfetch(other);
                None
            }
        }
    }

    pub(crate) fn next_symbol(&mut self, c: char) -> Result<()> {
        if self.check_symbol(c) {
            Ok(())
        } else {
            Err(TranslateError::Syntax(format!("missing '{}'", c)))
        }
    }

    pub(crate) fn next_keyword(&mut self, k: crate::keyword::Keyword) -> Result<()> {
        if self.check_keyword(k) {
            Ok(())
        } else {
            Err(TranslateError::Syntax(format!("missing '{}'", k.name())))
        }
    }

    /// The next token must be a variable name.
    pub(crate) fn next_variable(&mut self) -> Result<String> {
        match self.lexer.fetch() {
            Token::Variable(name) => Ok(name),
            other => {
                self.lexer.unfetch(other);
                Err(TranslateError::syntax())
            }
        }
    }

    /// The next token must be an integer literal; returns its value.
    pub(crate) fn next_lineno(&mut self) -> Result<u32> {
        match self.lexer.fetch() {
            Token::Int(text) => text
                .parse::<u32>()
                .map_err(|_| TranslateError::Syntax("bad line number".to_string())),
            other => {
                self.lexer.unfetch(other);
                Err(TranslateError::syntax())
            }
        }
    }
}
