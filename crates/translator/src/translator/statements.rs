//! Statement dispatch and rendering.
//!
//! `statement` reads one X-BASIC statement and returns its C text
//! (`Ok(None)` at end of input). Statement keywords dispatch directly;
//! a leading type keyword starts a declaration; anything else is tried
//! as an assignment and then as a plain function call.

use super::{expect, expect_msg, Frame, Translator};
use crate::error::{Result, TranslateError};
use crate::keyword::Keyword;
use crate::namespace::Pass;
use crate::token::{CValue, ExprType, Token};
use crate::variable::{BasType, Lvalue, Variable};

impl<'a> Translator<'a> {
    /// Translate one statement. Returns `None` at end of input.
    pub(crate) fn statement(&mut self) -> Result<Option<String>> {
        while self.check_symbol(':') {}
        if self.check_keyword(Keyword::Eof) {
            return Ok(None);
        }

        self.update_strtmp();

        if let Some(ty) = self.check_vartype() {
            self.defvar(ty)?;
            return Ok(Some(String::new()));
        }

        let t = self.lexer.fetch();
        match t {
            Token::Keyword(k) => self.keyword_statement(k),
            Token::Symbol('}') => self.close_brace(),
            Token::Comment(text) => Ok(Some(text)),
            other => self.assign_or_call(other),
        }
    }

    fn keyword_statement(&mut self, k: Keyword) -> Result<Option<String>> {
        match k {
            Keyword::Eol => {
                // a single-line then/else branch ends with its line
                if matches!(self.nest.last(), Some(Frame::ThenLine | Frame::ElseLine)) {
                    let top = *self.nest.last().unwrap();
                    self.nest_out(top)?;
                    return Ok(Some("}\n".to_string()));
                }
                Ok(Some(String::new()))
            }

            Keyword::Dim => {
                let ty = self.check_vartype().unwrap_or(BasType::Int);
                self.defvar(ty)?;
                Ok(Some(String::new()))
            }

            Keyword::Print => self.print_statement(false),
            Keyword::Lprint => self.print_statement(true),
            Keyword::Input => self.input_statement(),
            Keyword::Linput => self.linput_statement(),

            Keyword::If => {
                let x = self.expr_required()?;
                self.next_keyword(Keyword::Then)?;
                let frame = if self.check_symbol('{') {
                    Frame::ThenBlock
                } else {
                    Frame::ThenLine
                };
                self.nest_in(frame);
                Ok(Some(format!("if ({}) {{\n", x.text)))
            }

            Keyword::Else => {
                let mut r = String::new();
                if matches!(self.nest.last(), Some(Frame::ElseLine)) {
                    // an inner single-line else ends here
                    self.nest_out(Frame::ElseLine)?;
                    r.push_str("}\n");
                }
                self.nest_out(Frame::ThenLine)?;
                if self.check_keyword(Keyword::If) {
                    let x = self.expr_required()?;
                    self.next_keyword(Keyword::Then)?;
                    let frame = if self.check_symbol('{') {
                        Frame::ThenBlock
                    } else {
                        Frame::ThenLine
                    };
                    self.nest_in(frame);
                    Ok(Some(format!("{}}} else if ({}) {{\n", r, x.text)))
                } else {
                    let frame = if self.check_symbol('{') {
                        Frame::ElseBlock
                    } else {
                        Frame::ElseLine
                    };
                    self.nest_in(frame);
                    Ok(Some(format!("{}}} else {{\n", r)))
                }
            }

            Keyword::For => {
                let v = {
                    let lv = self.lvalue(None, false, true)?;
                    expect(lv)?
                };
                self.next_keyword(Keyword::Eq)?;
                let from = self.expr_required()?;
                self.next_keyword(Keyword::To)?;
                let to = self.expr_required()?;
                self.nest_in(Frame::For);
                Ok(Some(format!(
                    "for ({0} = {1}; {0} <= {2}; {0}++) {{\n",
                    v.name, from.text, to.text
                )))
            }

            Keyword::Next => {
                self.nest_out(Frame::For)?;
                Ok(Some("}\n".to_string()))
            }

            Keyword::While => {
                let x = self.expr_required()?;
                self.nest_in(Frame::While);
                Ok(Some(format!("while ({}) {{\n", x.text)))
            }

            Keyword::Endwhile => {
                self.nest_out(Frame::While)?;
                Ok(Some("}\n".to_string()))
            }

            Keyword::Repeat => {
                self.nest_in(Frame::Repeat);
                Ok(Some("do {\n".to_string()))
            }

            Keyword::Until => {
                let x = self.expr_required()?;
                self.nest_out(Frame::Repeat)?;
                Ok(Some(format!("}} while (!({}));\n", x.text)))
            }

            Keyword::Switch => {
                let x = self.expr_required()?;
                self.nest_in(Frame::Switch);
                Ok(Some(format!("switch ({}) {{\n", x.text)))
            }

            Keyword::Case => {
                let x = self.expr_required()?;
                self.indent = self.indent.saturating_sub(1);
                Ok(Some(format!("case {}:\n", x.text)))
            }

            Keyword::Default => {
                self.indent = self.indent.saturating_sub(1);
                Ok(Some("default:\n".to_string()))
            }

            Keyword::Endswitch => {
                self.nest_out(Frame::Switch)?;
                Ok(Some("}\n".to_string()))
            }

            Keyword::Goto => {
                let l = self.next_lineno()?;
                if self.pass == Pass::One && !self.labels.contains(&l) {
                    self.labels.push(l);
                }
                Ok(Some(format!("goto L{:06};\n", l)))
            }

            Keyword::Gosub => {
                let l = self.next_lineno()?;
                if self.pass == Pass::One && !self.subrs.contains(&l) {
                    self.subrs.push(l);
                }
                Ok(Some(format!("S{:06}();\n", l)))
            }

            Keyword::Func => self.func_statement(),

            Keyword::Endfunc => {
                self.nsp.leave_local();
                self.nest_out(Frame::Func)?;
                self.lexer.nocomment = true;
                Ok(Some("}\n".to_string()))
            }

            Keyword::Return => self.return_statement(),

            Keyword::Break => {
                self.check_symbol(';');
                Ok(Some("break;\n".to_string()))
            }

            Keyword::Continue => Ok(Some("continue;\n".to_string())),

            Keyword::Locate => {
                let mut r = String::new();
                let x = self.expr()?;
                match x {
                    Some(x) => {
                        self.next_symbol(',')?;
                        let y = self.expr_required()?;
                        r = format!("locate({},{});\n", x.text, y.text);
                    }
                    None => self.next_symbol(',')?,
                }
                if self.check_symbol(',') {
                    let a = self.expr_required()?;
                    r.push_str(&format!("b_csw({});\n", a.text));
                }
                Ok(Some(r))
            }

            Keyword::Error => {
                // not supported at runtime, keep it visible in the output
                let x = self.lexer.fetch();
                Ok(Some(format!("/* error {} */\n", x.text())))
            }

            Keyword::End => {
                let mut r = String::new();
                if matches!(self.nest.as_slice(), [Frame::Main]) {
                    self.nest_out(Frame::Main)?;
                    self.lexer.nocomment = true;
                    r.push_str("}\n");
                }
                Ok(Some(format!("{}(0);\n{}", self.b_exit, r)))
            }

            k => match self.exfn_call(k, false)? {
                Some(v) => Ok(Some(format!("{};\n", v.text))),
                None => Err(TranslateError::syntax()),
            },
        }
    }

    /// A bare `}` closes then/else branches.
    fn close_brace(&mut self) -> Result<Option<String>> {
        let mut r = String::new();
        if matches!(self.nest.last(), Some(Frame::ThenLine | Frame::ElseLine)) {
            // an inner single-line branch ends together with the block
            r.push_str("}\n");
            self.nest.pop();
        }
        if matches!(self.nest.last(), Some(Frame::ElseBlock)) {
            self.nest_out(Frame::ElseBlock)?;
            return Ok(Some(r + "}\n"));
        }
        self.nest_out(Frame::ThenBlock)?;
        if !self.check_keyword(Keyword::Else) {
            return Ok(Some(r + "}\n"));
        }
        if self.check_keyword(Keyword::If) {
            let x = self.expr_required()?;
            self.next_keyword(Keyword::Then)?;
            let frame = if self.check_symbol('{') {
                Frame::ThenBlock
            } else {
                Frame::ThenLine
            };
            self.nest_in(frame);
            Ok(Some(format!("{}}} else if ({}) {{\n", r, x.text)))
        } else {
            let frame = if self.check_symbol('{') {
                Frame::ElseBlock
            } else {
                Frame::ElseLine
            };
            self.nest_in(frame);
            Ok(Some(format!("{}}} else {{\n", r)))
        }
    }

    fn print_statement(&mut self, lprint: bool) -> Result<Option<String>> {
        let lp = if lprint { "l" } else { "" };
        let mut r = String::new();
        let mut crlf = true;
        if self.check_keyword(Keyword::Using) {
            let fmt = {
                let v = self.expr()?;
                expect_msg(v, "missing format string for using")?
            };
            expect_msg(
                if fmt.is_str() { Some(()) } else { None },
                "missing format string for using",
            )?;
            self.next_symbol(';')?;
            r = format!("b_s{}print(using(strtmp{},{}", lp, self.strtmp, fmt.text);
            self.strtmp += 1;
            loop {
                if let Some(x) = self.expr()? {
                    if x.is_str() {
                        r.push_str(&format!(",{}", x.text));
                    } else {
                        r.push_str(&format!(",(double)({})", x.text));
                    }
                }
                if !self.check_symbol(',') {
                    break;
                }
            }
            r.push_str("));\n");
            crlf = !self.check_symbol(';');
        } else {
            loop {
                if let Some(x) = self.expr()? {
                    let call = match x.ty {
                        ExprType::Str => "s",
                        ExprType::Float => "f",
                        _ => "i",
                    };
                    r.push_str(&format!("b_{}{}print({});\n", call, lp, x.text));
                    crlf = true;
                } else if self.check_keyword(Keyword::Tab) {
                    self.next_symbol('(')?;
                    let x = self.expr_required()?;
                    self.next_symbol(')')?;
                    r.push_str(&format!("b_t{}print({});\n", lp, x.text));
                    crlf = true;
                }

                if self.check_symbol(';') {
                    crlf = false;
                } else if self.check_symbol(',') {
                    r.push_str(&format!("b_s{}print(STRTAB);\n", lp));
                    crlf = false;
                } else {
                    break;
                }
            }
        }
        if crlf {
            r.push_str(&format!("b_s{}print(STRCRLF);\n", lp));
        }
        Ok(Some(r))
    }

    fn input_statement(&mut self) -> Result<Option<String>> {
        let mut prompt = "\"? \"".to_string();
        if let Some(p) = self.check_str() {
            prompt = p;
            if self.check_symbol(';') {
                prompt.push_str(" \"? \"");
            } else {
                self.next_symbol(',')?;
            }
        }
        let mut r = format!("b_input({}", prompt);
        loop {
            let a = {
                let lv = self.lvalue(None, false, false)?;
                expect(lv)?
            };
            if a.ty == BasType::Str {
                r.push_str(&format!(",sizeof({0}),{0}", a.name));
            } else {
                let code = match a.ty {
                    BasType::Char => 0x201,
                    BasType::Float => 0x208,
                    _ => 0x204,
                };
                r.push_str(&format!(",0x{:x},&{}", code, a.name));
            }
            if !self.check_symbol(',') {
                break;
            }
        }
        r.push_str(",-1);\n");
        Ok(Some(r))
    }

    fn linput_statement(&mut self) -> Result<Option<String>> {
        let mut r = String::new();
        if let Some(p) = self.check_str() {
            self.next_symbol(';')?;
            r.push_str(&format!("b_sprint({});\n", p));
        }
        let a = {
            let lv = self.lvalue(None, false, false)?;
            expect(lv)?
        };
        expect(if a.ty == BasType::Str { Some(()) } else { None })?;
        r.push_str(&format!("b_linput({0},sizeof({0}));\n", a.name));
        Ok(Some(r))
    }

    fn func_statement(&mut self) -> Result<Option<String>> {
        self.lexer.nocomment = false;

        // result type defaults to int
        let fty = self.check_vartype().unwrap_or(BasType::Int);
        let func = self.next_variable()?;
        self.nsp.enter_local(&func);

        self.next_symbol('(')?;
        let mut arg = String::new();
        if self.check_symbol(')') {
            arg.push_str("void");
        } else {
            loop {
                let name = self.next_variable()?;
                // argument type defaults to int
                let ty = if self.check_symbol(';') {
                    expect(self.check_vartype())?
                } else {
                    BasType::Int
                };
                let suffix = if ty == BasType::Str { "[32+1]" } else { "" };
                let mut v = Variable::new(&name, ty);
                v.arg = suffix.to_string();
                v.funcarg = true;
                let v = self.nsp.define(v, false)?;
                arg.push_str(&format!("{} {}{}", v.typename(false, false), name, suffix));
                if !self.check_symbol(',') {
                    break;
                }
                arg.push_str(", ");
            }
            self.next_symbol(')')?;
        }

        // the function itself is a global symbol
        let mut fv = Variable::new(&func, fty);
        fv.arg = arg.clone();
        fv.func = true;
        let fv = self.nsp.define(fv, true)?;

        let mut r = self.nest_close()?;
        self.nest_in(Frame::Func);
        r.push_str("\n/***************************/\n");
        r.push_str(&format!(
            "{} {}({})\n{{\n",
            fv.typename(true, false),
            func,
            arg
        ));
        if self.pass == Pass::Two {
            let mut sep = "";
            for l in self.nsp.definitions(Some(&func)).lines() {
                r.push_str(&format!("\t{}\n", l));
                sep = "\n";
            }
            r.push_str(sep);
        }
        Ok(Some(r))
    }

    fn return_statement(&mut self) -> Result<Option<String>> {
        if self.check_symbol('(') {
            let val = self.expr()?;
            if let Some(v) = &val {
                if !self.cfg.bc_compat {
                    // a local str buffer dies with the function
                    if let Some(var) = self.nsp.find(&v.text, true) {
                        if var.ty == BasType::Str && !var.funcarg {
                            return Err(TranslateError::Syntax(format!(
                                "local str variable {} cannot be returned",
                                var.name
                            )));
                        }
                    }
                }
            }
            self.next_symbol(')')?;
            Ok(Some(match val {
                Some(v) => format!("return {};\n", v.text),
                None => "return 0;\n".to_string(),
            }))
        } else {
            let mut tail = String::new();
            if matches!(self.nest.as_slice(), [Frame::Subr]) {
                self.nest_out(Frame::Subr)?;
                self.lexer.nocomment = true;
                tail.push_str("}\n");
            }
            Ok(Some(format!("return;\n{}", tail)))
        }
    }

    /// Declare one or more variables of base type `ty`.
    fn defvar(&mut self, ty: BasType) -> Result<()> {
        loop {
            let name = self.next_variable()?;
            let mut suffix = String::new();
            let mut array = false;
            // parentheses make an array even without dim
            if self.check_symbol('(') {
                array = true;
                loop {
                    // +1 pads for BASIC's inclusive 0..N bounds
                    suffix.push_str(&format!("[({})+1]", self.expr_required()?.text));
                    if !self.check_symbol(',') {
                        break;
                    }
                }
                self.next_symbol(')')?;
            }
            if ty == BasType::Str {
                if self.check_symbol('[') {
                    suffix.push_str(&format!("[{}+1]", self.expr_required()?.text));
                    self.next_symbol(']')?;
                } else {
                    suffix.push_str("[32+1]");
                }
            }
            let init = if self.check_keyword(Keyword::Eq) {
                self.initvar(array)?
            } else {
                String::new()
            };
            let mut v = Variable::new(&name, ty);
            v.array = array;
            v.arg = suffix;
            v.init = init;
            self.nsp.define(v, false)?;
            if !self.check_symbol(',') {
                break;
            }
        }
        Ok(())
    }

    /// Capture an initialiser. Array initialisers are brace-balanced
    /// token sequences re-emitted verbatim; anything goes inside as
    /// long as the braces match.
    fn initvar(&mut self, array: bool) -> Result<String> {
        if !array {
            return Ok(self.expr_required()?.text);
        }
        self.next_symbol('{')?;
        let mut text = String::from("{");
        let mut depth = 1;
        while depth > 0 {
            if self.check_symbol('{') {
                text.push('{');
                depth += 1;
            } else if self.check_symbol('}') {
                text.push('}');
                depth -= 1;
            } else {
                let t = self.lexer.fetch();
                match t {
                    Token::Symbol(c) => text.push(c),
                    Token::Keyword(Keyword::Eol) => text.push('\n'),
                    Token::Comment(c) => text.push_str(&c),
                    other => {
                        self.lexer.unfetch(other);
                        text.push_str(&self.expr_required()?.text);
                    }
                }
            }
        }
        Ok(text)
    }

    /// Resolve an assignable variable/array reference. Returns
    /// `Ok(None)` when the tokens do not form one (a function call,
    /// usually). `islet` allows whole-array targets and implicit
    /// definition; `isfor` allows implicit definition only.
    pub(crate) fn lvalue(
        &mut self,
        var: Option<Token>,
        islet: bool,
        isfor: bool,
    ) -> Result<Option<Lvalue>> {
        let var = match var {
            Some(t) => t,
            None => self.lexer.fetch(),
        };
        let Token::Variable(name) = var else {
            return Ok(None);
        };
        let mut v = self.nsp.find(&name, false);
        if self.lexer.peek().is_symbol('(') {
            // an undefined or non-array name with parens is a call
            match &v {
                Some(entry) if entry.array => {}
                _ => return Ok(None),
            }
        } else if v.is_none() {
            if islet || isfor {
                // assignment targets spring into being as int globals
                self.nsp.define(Variable::new(&name, BasType::Int), true)?;
                v = self.nsp.find(&name, false);
            } else {
                return Ok(None);
            }
        }
        let v = expect(v)?;

        let mut ty = v.ty;
        let mut array = v.array;
        let mut sub = String::new();
        if v.array {
            if self.check_symbol('(') {
                sub.push('[');
                loop {
                    if let Some(a) = self.expr()? {
                        sub.push_str(&a.text);
                    }
                    if !self.check_symbol(',') {
                        break;
                    }
                    sub.push_str("][");
                }
                self.next_symbol(')')?;
                sub.push(']');
                array = false;
            } else if !islet {
                // a whole array can only be an assignment target
                return Ok(None);
            }
        }
        if ty == BasType::Str && !array {
            if !self.cfg.bc_compat && islet && v.funcarg {
                return Err(TranslateError::Syntax(format!(
                    "cannot assign to str function argument {}",
                    v.name
                )));
            }
            if self.check_symbol('[') {
                // substring access yields a single character
                let a = self.expr_required()?;
                self.next_symbol(']')?;
                sub.push_str(&format!("[{}]", a.text));
                ty = BasType::Char;
            }
        }
        Ok(Some(Lvalue {
            name: format!("{}{}", v.name, sub),
            ty,
            array,
        }))
    }

    /// A call to a user function (or to one the namespace has never
    /// seen, which is only an error under `-u`).
    pub(crate) fn fncall(&mut self, var: Token) -> Result<Option<CValue>> {
        let Token::Variable(name) = var else {
            return Ok(None);
        };
        let v = self.nsp.find(&name, false);
        if self.cfg.undef_error && v.is_none() && self.pass != Pass::One {
            return Err(TranslateError::Syntax(format!(
                "call to undefined function {}",
                name
            )));
        }
        let mut arg = String::new();
        self.next_symbol('(')?;
        loop {
            if let Some(a) = self.expr()? {
                arg.push_str(&a.text);
            }
            if !self.check_symbol(',') {
                break;
            }
            arg.push_str(", ");
        }
        self.next_symbol(')')?;
        let ty = match v {
            Some(v) => ExprType::from(v.ty),
            None => ExprType::Unknown,
        };
        Ok(Some(CValue::new(ty, format!("{}({})", name, arg))))
    }

    /// Fallback for statements starting with a variable: assignment
    /// first, then a plain call.
    fn assign_or_call(&mut self, t: Token) -> Result<Option<String>> {
        if let Some(lv) = self.lvalue(Some(t.clone()), true, false)? {
            self.next_keyword(Keyword::Eq)?;
            let init = self.initvar(lv.array)?;
            if lv.array {
                // whole-array assignment copies from a static temporary
                let v = expect(self.nsp.find(&lv.name, false))?;
                let tmp = format!("_initmp{:04}", self.initmp);
                let mut tv = Variable::new(&tmp, v.ty);
                tv.array = true;
                tv.static_const = true;
                tv.arg = v.arg.clone();
                tv.init = init;
                self.nsp.define(tv, false)?;
                self.initmp += 1;
                return Ok(Some(format!(
                    "memcpy({0}, {1}, sizeof({0}));\n",
                    lv.name, tmp
                )));
            }
            if lv.ty == BasType::Str {
                return Ok(Some(format!(
                    "b_strncpy(sizeof({0}),{0},{1});\n",
                    lv.name, init
                )));
            }
            return Ok(Some(format!("{} = {};\n", lv.name, init)));
        }
        let v = self.fncall(t)?;
        let v = expect(v)?;
        Ok(Some(format!("{};\n", v.text)))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::keyword::Tables;
    use crate::translator::Translator;

    const DEF: &str = "\
[BASIC]
I\tabs\t(N)\t\t: b_abs(%)
I\tint$$\t(N)\t\t: b_int(%)
S\tstr$\t(N)\t\t: b_striS($,%)
S\tchr$\t(I)\t\t: b_chrS($,%)
F\tpi\t(F-)\t\t: pi(%)
\texit\t(I-)\t\t: exit(%)
S\tdate$\t\t\t: b_dateS($)
\tdate$$\tS\t\t: b_setdateS(%)
S\tinkey$\t\t\t: b_inkeyS($)
S\tinkey$$\t(I)\t\t: b_inkey0S($,%)
\tcolor\tI-,I-,I-,I-\t: b_color(%,%,%,%)
I\tcolor$$\t[I]\t\t: b_cpalet(%)
I\tasort\t(IA)\t\t: b_asort(%,#,@)
[MOUSE]
I\tmsstat\t(I,I)\t\t: m_msstat(&,&)
";

    fn translate_with(src: &str, config: &Config) -> (String, usize) {
        let mut tables = Tables::new();
        tables.load_exfn(DEF);
        let mut t = Translator::new(src, &tables, config, "test.bas");
        let out = t.translate().unwrap();
        (out, t.error_count())
    }

    fn translate(src: &str) -> String {
        let (out, errors) = translate_with(src, &Config::new());
        assert_eq!(errors, 0, "unexpected errors for {:?}", src);
        out
    }

    #[test]
    fn test_if_then_single_line() {
        let out = translate("int a,b\nif a=b then print 1\n");
        assert!(out.contains(
            "\tif (-(a == b)) {\n\t\tb_iprint(1);\n\t\tb_sprint(STRCRLF);\n\t}\n"
        ));
    }

    #[test]
    fn test_if_then_else_blocks() {
        let out = translate("int a\nif a then {\nprint 1\n} else {\nprint 2\n}\n");
        assert!(out.contains("\tif (a) {\n"));
        assert!(out.contains("\t} else {\n"));
        assert!(out.contains("\t\tb_iprint(2);\n"));
    }

    #[test]
    fn test_else_if_chain() {
        let out = translate("int a\nif a then {\nprint 1\n} else if a=2 then {\nprint 2\n}\n");
        assert!(out.contains("\t} else if (-(a == 2)) {\n"));
    }

    #[test]
    fn test_for_next() {
        let out = translate("for i=0 to 9\nprint i\nnext\n");
        assert!(out.contains("static int i;\n"));
        assert!(out.contains("\tfor (i = 0; i <= 9; i++) {\n"));
        assert!(out.contains("\t\tb_iprint(i);\n"));
        assert!(out.contains("\t}\n"));
    }

    #[test]
    fn test_while_endwhile() {
        let out = translate("a=0\nwhile a<10\na=a+1\nendwhile\n");
        assert!(out.contains("\twhile (-(a < 10)) {\n"));
        assert!(out.contains("\t\ta = (a + 1);\n"));
    }

    #[test]
    fn test_repeat_until() {
        let out = translate("a=0\nrepeat\na=a+1\nuntil a=10\n");
        assert!(out.contains("\tdo {\n"));
        assert!(out.contains("\t} while (!(-(a == 10)));\n"));
    }

    #[test]
    fn test_switch_case_default() {
        let out = translate("int a\nswitch a\ncase 1\nprint 1\nbreak\ndefault\nprint 2\nendswitch\n");
        assert!(out.contains("\tswitch (a) {\n"));
        assert!(out.contains("\tcase 1:\n"));
        assert!(out.contains("\t\tbreak;\n"));
        assert!(out.contains("\tdefault:\n"));
        assert!(out.contains("\t}\n"));
    }

    #[test]
    fn test_print_variants_and_tab() {
        let out = translate("float f\nstr s\nprint 1;f,s;tab(5)\n");
        assert!(out.contains("\tb_iprint(1);\n"));
        assert!(out.contains("\tb_fprint(f);\n"));
        assert!(out.contains("\tb_sprint(STRTAB);\n"));
        assert!(out.contains("\tb_sprint(s);\n"));
        assert!(out.contains("\tb_tprint(5);\n"));
        // trailing tab() item turns the CRLF back on
        assert!(out.contains("\tb_sprint(STRCRLF);\n"));
    }

    #[test]
    fn test_print_trailing_semicolon_suppresses_crlf() {
        let out = translate("print 1;\n");
        assert!(out.contains("\tb_iprint(1);\n"));
        assert!(!out.contains("STRCRLF"));
    }

    #[test]
    fn test_question_mark_is_print() {
        let out = translate("? 1\n");
        assert!(out.contains("\tb_iprint(1);\n"));
    }

    #[test]
    fn test_lprint() {
        let out = translate("lprint \"x\"\n");
        assert!(out.contains("\tb_slprint(\"x\");\n"));
        assert!(out.contains("\tb_slprint(STRCRLF);\n"));
    }

    #[test]
    fn test_print_using() {
        let out = translate("str s\nprint using \"##.#\";1.5,s\n");
        assert!(out.contains(
            "\tb_sprint(using(strtmp0,\"##.#\",(double)((double)1.5),s));\n"
        ));
    }

    #[test]
    fn test_input_type_codes() {
        let out = translate("int a\nchar c\nfloat f\nstr s\ninput \"N=\",a,c,f,s\n");
        assert!(out.contains(
            "\tb_input(\"N=\",0x204,&a,0x201,&c,0x208,&f,sizeof(s),s,-1);\n"
        ));
    }

    #[test]
    fn test_input_default_and_semicolon_prompt() {
        let out = translate("int a\ninput a\n");
        assert!(out.contains("\tb_input(\"? \",0x204,&a,-1);\n"));
        let out = translate("int a\ninput \"N=\";a\n");
        assert!(out.contains("\tb_input(\"N=\" \"? \",0x204,&a,-1);\n"));
    }

    #[test]
    fn test_linput() {
        let out = translate("str s\nlinput \"name? \";s\n");
        assert!(out.contains("\tb_sprint(\"name? \");\n"));
        assert!(out.contains("\tb_linput(s,sizeof(s));\n"));
    }

    #[test]
    fn test_locate_forms() {
        let out = translate("locate 1,2,3\n");
        assert!(out.contains("\tlocate(1,2);\n\tb_csw(3);\n"));
        let out = translate("locate ,,1\n");
        assert!(out.contains("\tb_csw(1);\n"));
        assert!(!out.contains("locate("));
    }

    #[test]
    fn test_error_statement_becomes_comment() {
        let out = translate("error 105\n");
        assert!(out.contains("\t/* error 105 */\n"));
    }

    #[test]
    fn test_declarations() {
        let out = translate("int a=1,b\nchar c\nfloat f\nstr s,t[80]\ndim float m(7)\n");
        assert!(out.contains("static int a = 1;\n"));
        assert!(out.contains("static int b;\n"));
        assert!(out.contains("static unsigned char c;\n"));
        assert!(out.contains("static double f;\n"));
        assert!(out.contains("static unsigned char s[32+1];\n"));
        assert!(out.contains("static unsigned char t[80+1];\n"));
        assert!(out.contains("static double m[(7)+1];\n"));
    }

    #[test]
    fn test_str_scalar_assignment() {
        let out = translate("str s\ns=\"abc\"\n");
        assert!(out.contains("\tb_strncpy(sizeof(s),s,\"abc\");\n"));
    }

    #[test]
    fn test_str_element_assignment() {
        let out = translate("str s\ns[0]='A'\n");
        assert!(out.contains("\ts[0] = 'A';\n"));
    }

    #[test]
    fn test_array_whole_assignment() {
        let out = translate("dim int a(3)={1,2,3,4}\nint b(3)\nb={1,2,3,4}\n");
        assert!(out.contains("static int a[(3)+1] = {1,2,3,4};\n"));
        assert!(out.contains("static int b[(3)+1];\n"));
        assert!(out.contains("static const int _initmp0000[(3)+1] = {1,2,3,4};\n"));
        assert!(out.contains("\tmemcpy(b, _initmp0000, sizeof(b));\n"));
    }

    #[test]
    fn test_func_definition_and_call() {
        let src = "\
func add(a,b)
return (a+b)
endfunc
c=add(1,2)
";
        let out = translate(src);
        assert!(out.contains("int add(int a, int b);\n"));
        assert!(out.contains("\nint add(int a, int b)\n{\n"));
        assert!(out.contains("\treturn (a + b);\n"));
        assert!(out.contains("\tc = add(1, 2);\n"));
    }

    #[test]
    fn test_func_locals_in_prologue() {
        let src = "\
func f()
int x
x=1
return (x)
endfunc
";
        let out = translate(src);
        assert!(out.contains("int f(void)\n{\n\tint x;\n\n"));
        assert!(out.contains("\tx = 1;\n"));
    }

    #[test]
    fn test_func_str_argument_buffer() {
        let out = translate("func g(s;str)\nreturn (0)\nendfunc\n");
        assert!(out.contains("int g(unsigned char s[32+1])\n"));
    }

    #[test]
    fn test_func_closes_main() {
        let out = translate("print 1\nfunc f()\nreturn (0)\nendfunc\n");
        let main_pos = out.find("void main").unwrap();
        let exit_pos = out.find("\tb_exit(0);\n}\n").unwrap();
        let func_pos = out.find("\nint f(void)").unwrap();
        assert!(main_pos < exit_pos && exit_pos < func_pos);
    }

    #[test]
    fn test_return_local_str_is_error() {
        let src = "\
func h()
str t
return (t)
endfunc
";
        let (_, errors) = translate_with(src, &Config::new());
        assert!(errors > 0);

        // allowed for str arguments, and in BC-compat mode
        let src_arg = "func h(t;str)\nreturn (t)\nendfunc\n";
        let (_, errors) = translate_with(src_arg, &Config::new());
        assert_eq!(errors, 0);
        let bc = Config {
            bc_compat: true,
            ..Config::new()
        };
        let (_, errors) = translate_with(src, &bc);
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_assign_to_str_funcarg_is_error() {
        let src = "func h(t;str)\nt=\"x\"\nreturn (0)\nendfunc\n";
        let (_, errors) = translate_with(src, &Config::new());
        assert!(errors > 0);
    }

    #[test]
    fn test_gosub_return_subroutine() {
        let src = "\
10 gosub 100
20 end
100 print 1
110 return
";
        let out = translate(src);
        assert!(out.contains("void S000100(void);\n"));
        assert!(out.contains("void S000100(void)\n{\n"));
        assert!(out.contains("\tS000100();\n"));
        assert_eq!(out.matches("void S000100(void)").count(), 2);
    }

    #[test]
    fn test_exfn_statement_elision() {
        let out = translate("color ,,1\n");
        assert!(out.contains("\tb_color(0x4e415349, 0x4e415349, 1, 0x4e415349);\n"));
        assert!(out.contains("#include <basic.h>\n"));
    }

    #[test]
    fn test_exfn_rewrites() {
        let out = translate("a=int(1.5)\n");
        assert!(out.contains("\ta = b_int((double)1.5);\n"));

        let out = translate("exit()\n");
        assert!(out.contains("\texit(0);\n"));

        let out = translate("float f\nf=pi()\n");
        assert!(out.contains("\tf = pi();\n"));

        let out = translate("f=abs(-1.5)\n");
        assert!(out.contains("\tf = fabs(-(double)1.5);\n"));

        let out = translate("a=abs(-2)\n");
        assert!(out.contains("\ta = b_abs(-2);\n"));

        let out = translate("str s\ns=str$(1.5)\n");
        assert!(out.contains("b_strfS(strtmp0,(double)1.5)"));
        let out = translate("str s\ns=str$(2)\n");
        assert!(out.contains("b_striS(strtmp0,2)"));

        let out = translate("str k\nk=inkey$\n");
        assert!(out.contains("b_inkeyS(strtmp0)"));
        let out = translate("str k\nk=inkey$(0)\n");
        assert!(out.contains("b_inkey0S(strtmp0,0)"));

        let out = translate("date$=\"2024/01/01\"\n");
        assert!(out.contains("\tb_setdateS(\"2024/01/01\");\n"));

        let out = translate("a=color[3]\n");
        assert!(out.contains("\ta = b_cpalet(3);\n"));
    }

    #[test]
    fn test_exfn_array_and_sizeof_args() {
        let out = translate("int a(7)\nb=asort(a)\n");
        assert!(out.contains("\tb = b_asort(a, sizeof(a), sizeof(a[0]));\n"));
    }

    #[test]
    fn test_exfn_pointer_args_and_group_include() {
        let out = translate("int x,y\na=msstat(x,y)\n");
        assert!(out.contains("\ta = m_msstat(&x, &y);\n"));
        assert!(out.contains("#include <mouse.h>\n"));
    }

    #[test]
    fn test_statement_only_exfn_in_expression_is_error() {
        let (_, errors) = translate_with("a=color(1)\n", &Config::new());
        assert!(errors > 0);
    }

    #[test]
    fn test_nest_errors_reported() {
        let (_, errors) = translate_with("next\n", &Config::new());
        assert!(errors > 0);
        let (_, errors) = translate_with("for i=0 to 9\n", &Config::new());
        assert!(errors > 0);
        let (_, errors) = translate_with("endwhile\n", &Config::new());
        assert!(errors > 0);
    }

    #[test]
    fn test_duplicate_definition_reported() {
        let (out, errors) = translate_with("int a\nint a\n", &Config::new());
        assert!(errors > 0);
        // the first definition survives
        assert!(out.contains("static int a;\n"));
    }

    #[test]
    fn test_goto_and_gosub_spaces_disjoint() {
        let src = "\
10 goto 30
20 gosub 100
30 end
100 return
";
        let out = translate(src);
        assert!(out.contains("L000030:\n"));
        assert!(out.contains("void S000100(void);\n"));
        assert!(!out.contains("L000100"));
        assert!(!out.contains("S000030"));
    }

    #[test]
    fn test_strtmp_count_is_per_statement_max() {
        let src = "\
str a,b
a=\"x\"+\"y\"
b=\"z\"+a+(\"w\"+b)
";
        let out = translate(src);
        assert!(out.contains("static unsigned char strtmp0[258];\n"));
        assert!(out.contains("static unsigned char strtmp1[258];\n"));
        assert!(!out.contains("strtmp2"));
    }

    #[test]
    fn test_no_binit_mode() {
        let cfg = Config {
            no_binit: true,
            ..Config::new()
        };
        let (out, errors) = translate_with("print 1\nend\n", &cfg);
        assert_eq!(errors, 0);
        assert!(out.contains("#include <stdlib.h>\n"));
        assert!(!out.contains("b_init();"));
        assert!(out.contains("exit(0);\n"));
        assert!(!out.contains("b_exit"));
    }

    #[test]
    fn test_comment_token_passthrough() {
        let out = translate("/* banner */\nprint 1\n");
        assert!(out.contains("\t/* banner */\n"));
    }

    #[test]
    fn test_c_block_passthrough() {
        let out = translate("#c\nint helper(void) { return 1; }\n#endc\nprint 1\n");
        assert!(out.contains("int helper(void) { return 1; }\n"));
    }

    #[test]
    fn test_bas_comment_mode() {
        let cfg = Config {
            bas_comment: Some(1),
            ..Config::new()
        };
        let (out, errors) = translate_with("print 1\n", &cfg);
        assert_eq!(errors, 0);
        assert!(out.contains("\t/*===print 1===*/\n"));
    }

    #[test]
    fn test_colon_separates_statements() {
        let out = translate("a=1:b=2\n");
        assert!(out.contains("\ta = 1;\n"));
        assert!(out.contains("\tb = 2;\n"));
    }

    #[test]
    fn test_debug_mode_aborts() {
        let mut tables = Tables::new();
        tables.load_exfn(DEF);
        let cfg = Config {
            debug: true,
            ..Config::new()
        };
        let mut t = Translator::new("next\n", &tables, &cfg, "test.bas");
        assert!(t.translate().is_err());
    }
}
