//! Recursive-descent expression parser.
//!
//! Each level returns `Ok(None)` when no expression starts at the
//! current token (nothing consumed) and errors only once an operator
//! has committed us to expecting a right-hand side. The result is a
//! typed C fragment.
//!
//! BASIC semantics preserved in the default (enhanced) mode:
//!
//! - `not`/`and`/`or`/`xor` are bitwise on `(int)` casts, not logical;
//! - comparisons yield `-1`/`0` through a `-(a op b)` wrapper, and
//!   string comparisons go through `b_strcmp` with the two-byte ASCII
//!   code of the operator;
//! - `mod`, `\`, `shr`/`shl` operands are cast to `(int)`;
//! - every binary arithmetic node is parenthesised.
//!
//! With BC.X compatibility on, those decorations are dropped and `not`
//! becomes logical `!`.
//!
//! `+` between strings builds a `b_stradd(strtmpN, a, b, ..., -1)`
//! chain, claiming one scratch buffer per chain.

use super::{expect, Translator};
use crate::error::Result;
use crate::keyword::Keyword;
use crate::token::{CValue, ExprType, Token};

impl<'a> Translator<'a> {
    /// Parse one expression, if present.
    pub(crate) fn expr(&mut self) -> Result<Option<CValue>> {
        self.op_xor()
    }

    /// Parse an expression that must be present.
    pub(crate) fn expr_required(&mut self) -> Result<CValue> {
        let v = self.expr()?;
        expect(v)
    }

    /// Consume the next token if it is one of the given operators.
    fn check_ops(&mut self, ops: &[Keyword]) -> Option<Keyword> {
        let t = self.lexer.fetch();
        if let Token::Keyword(k) = &t {
            if ops.contains(k) {
                return Some(*k);
            }
        }
        self.lexer.unfetch(t);
        None
    }

    fn op_xor(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_or()? else {
            return Ok(None);
        };
        while self.check_keyword(Keyword::Xor) {
            let a = expect(self.op_or()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} ^ {}", r.text, a.text)
            } else {
                format!("((int){} ^ (int){})", r.text, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_or(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_and()? else {
            return Ok(None);
        };
        while self.check_keyword(Keyword::Or) {
            let a = expect(self.op_and()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} | {}", r.text, a.text)
            } else {
                format!("((int){} | (int){})", r.text, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_and(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_not()? else {
            return Ok(None);
        };
        while self.check_keyword(Keyword::And) {
            let a = expect(self.op_not()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} & {}", r.text, a.text)
            } else {
                format!("((int){} & (int){})", r.text, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_not(&mut self) -> Result<Option<CValue>> {
        if self.check_keyword(Keyword::Not) {
            let r = expect(self.op_not()?)?;
            expect(r.result_type(None))?;
            return Ok(Some(CValue::int(if self.cfg.bc_compat {
                format!("!{}", r.text)
            } else {
                format!("(~((int){}))", r.text)
            })));
        }
        self.op_cmp()
    }

    fn op_cmp(&mut self) -> Result<Option<CValue>> {
        const OPS: &[Keyword] = &[
            Keyword::Eq,
            Keyword::Ne,
            Keyword::Gt,
            Keyword::Lt,
            Keyword::Ge,
            Keyword::Le,
        ];
        let Some(mut r) = self.op_shift()? else {
            return Ok(None);
        };
        while let Some(p) = self.check_ops(OPS) {
            // the C operator and the two-byte ASCII code b_strcmp takes
            let (op, code) = match p {
                Keyword::Eq => ("==", 0x3d20),
                Keyword::Ne => ("!=", 0x3c3e),
                Keyword::Gt => (">", 0x3e20),
                Keyword::Lt => ("<", 0x3c20),
                Keyword::Ge => (">=", 0x3e3d),
                _ => ("<=", 0x3c3d),
            };
            let a = expect(self.op_shift()?)?;
            let v = if r.is_str() {
                expect(if a.is_str() { Some(()) } else { None })?;
                let cmp = format!("b_strcmp({},0x{:x},{})", r.text, code, a.text);
                if self.cfg.bc_compat {
                    cmp
                } else {
                    format!("(({})?-1:0)", cmp)
                }
            } else {
                let cmp = format!("{} {} {}", r.text, op, a.text);
                if self.cfg.bc_compat {
                    cmp
                } else {
                    format!("-({})", cmp)
                }
            };
            r = CValue::int(v);
        }
        Ok(Some(r))
    }

    fn op_shift(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_addsub()? else {
            return Ok(None);
        };
        while let Some(p) = self.check_ops(&[Keyword::Shr, Keyword::Shl]) {
            let op = if p == Keyword::Shr { ">>" } else { "<<" };
            let a = expect(self.op_addsub()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} {} {}", r.text, op, a.text)
            } else {
                format!("((int){} {} (int){})", r.text, op, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_addsub(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_mod()? else {
            return Ok(None);
        };
        if r.is_str() {
            // string concatenation chains into one b_stradd call
            if !self.check_keyword(Keyword::Plus) {
                return Ok(Some(r));
            }
            let mut text = format!("b_stradd(strtmp{},{},", self.strtmp, r.text);
            self.strtmp += 1;
            loop {
                let a = expect(self.op_mod()?)?;
                expect(if a.is_str() { Some(()) } else { None })?;
                text.push_str(&a.text);
                text.push(',');
                if !self.check_keyword(Keyword::Plus) {
                    break;
                }
            }
            text.push_str("-1)");
            return Ok(Some(CValue::str(text)));
        }
        while let Some(p) = self.check_ops(&[Keyword::Plus, Keyword::Minus]) {
            let op = if p == Keyword::Plus { "+" } else { "-" };
            let a = expect(self.op_mod()?)?;
            let rty = expect(r.result_type(Some(&a)))?;
            let v = format!("{} {} {}", r.text, op, a.text);
            let v = if self.cfg.bc_compat { v } else { format!("({})", v) };
            r = CValue::new(rty, v);
        }
        Ok(Some(r))
    }

    fn op_mod(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_yen()? else {
            return Ok(None);
        };
        while self.check_keyword(Keyword::Mod) {
            let a = expect(self.op_yen()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} % {}", r.text, a.text)
            } else {
                format!("((int){} % (int){})", r.text, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_yen(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_muldiv()? else {
            return Ok(None);
        };
        while self.check_keyword(Keyword::Yen) {
            let a = expect(self.op_muldiv()?)?;
            expect(r.result_type(Some(&a)))?;
            r = CValue::int(if self.cfg.bc_compat {
                format!("{} / {}", r.text, a.text)
            } else {
                format!("((int){} / (int){})", r.text, a.text)
            });
        }
        Ok(Some(r))
    }

    fn op_muldiv(&mut self) -> Result<Option<CValue>> {
        let Some(mut r) = self.op_posneg()? else {
            return Ok(None);
        };
        while let Some(p) = self.check_ops(&[Keyword::Mul, Keyword::Div]) {
            let op = if p == Keyword::Mul { "*" } else { "/" };
            let a = expect(self.op_posneg()?)?;
            let rty = expect(r.result_type(Some(&a)))?;
            let v = format!("{} {} {}", r.text, op, a.text);
            let v = if self.cfg.bc_compat { v } else { format!("({})", v) };
            r = CValue::new(rty, v);
        }
        Ok(Some(r))
    }

    fn op_posneg(&mut self) -> Result<Option<CValue>> {
        if let Some(p) = self.check_ops(&[Keyword::Plus, Keyword::Minus]) {
            let op = if p == Keyword::Plus { "+" } else { "-" };
            let r = expect(self.op_posneg()?)?;
            let rty = expect(r.result_type(None))?;
            return Ok(Some(CValue::new(rty, format!("{}{}", op, r.text))));
        }
        self.paren()
    }

    fn paren(&mut self) -> Result<Option<CValue>> {
        if self.check_symbol('(') {
            let r = self.expr_required()?;
            self.next_symbol(')')?;
            return Ok(Some(CValue::new(r.ty, format!("({})", r.text))));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Option<CValue>> {
        let t = self.lexer.fetch();
        if let Some(v) = t.as_cvalue() {
            return Ok(Some(v));
        }
        if let Token::Keyword(k) = t {
            if let Some(v) = self.exfn_call(k, true)? {
                return Ok(Some(v));
            }
            self.lexer.unfetch(Token::Keyword(k));
            return Ok(None);
        }
        if let Some(lv) = self.lvalue(Some(t.clone()), false, false)? {
            return Ok(Some(CValue::new(ExprType::from(lv.ty), lv.name)));
        }
        if let Some(v) = self.fncall(t.clone())? {
            return Ok(Some(v));
        }
        self.lexer.unfetch(t);
        Ok(None)
    }
}
