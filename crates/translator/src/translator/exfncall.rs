//! Built-in / external function call dispatch.
//!
//! When a keyword resolves to a signature-table entry, the call site is
//! parsed against the entry's argument pattern and the C call is
//! rendered from its output pattern. A missing separator means every
//! remaining elidable argument was omitted; omitted arguments turn into
//! the NASI sentinel. A handful of built-ins cannot be expressed by the
//! table alone and are rewritten before dispatch.

use super::{expect, Translator};
use crate::error::{Result, TranslateError};
use crate::exfn::NASI;
use crate::keyword::Keyword;
use crate::token::{CValue, ExprType};

impl<'a> Translator<'a> {
    /// Parse and render a call to keyword `kw` if it is an external
    /// function. Returns `Ok(None)` when it is not one. `is_expr`
    /// marks expression position, where the entry must declare a
    /// return type.
    pub(crate) fn exfn_call(&mut self, kw: Keyword, is_expr: bool) -> Result<Option<CValue>> {
        let tables = self.tables;
        let next = self.lexer.peek();

        // int is also a type keyword, so resolve int(...) up front
        let kw = if kw == Keyword::Int && next.is_symbol('(') {
            match tables.find_keyword("int$$") {
                Some(k) => k,
                None => return Ok(None),
            }
        } else {
            kw
        };
        let Keyword::ExFn(mut idx) = kw else {
            return Ok(None);
        };

        // call-site rewrites that pick a sibling entry
        let name = tables.exfn(idx).name.as_str();
        if name == "inkey$" && next.is_symbol('(') {
            if let Some(i) = tables.exfn_index("inkey$$") {
                idx = i;
            }
        } else if name == "color" && next.is_symbol('[') {
            if let Some(i) = tables.exfn_index("color$$") {
                idx = i;
            }
        } else if name == "date$" && next.is_keyword(Keyword::Eq) {
            if let Some(i) = tables.exfn_index("date$$") {
                idx = i;
                self.next_keyword(Keyword::Eq)?;
            }
        } else if name == "time$" && next.is_keyword(Keyword::Eq) {
            if let Some(i) = tables.exfn_index("time$$") {
                idx = i;
                self.next_keyword(Keyword::Eq)?;
            }
        }
        let ex = tables.exfn(idx);

        // remember the group for the #include set
        self.groups.insert(ex.group.clone());

        let mut rty = match ex.ret {
            Some(t) => ExprType::from(t),
            None if is_expr => return Err(TranslateError::syntax()),
            None => ExprType::Int,
        };
        let mut cfunc = if ex.cfunc.is_empty() {
            ex.name.clone()
        } else {
            ex.cfunc.clone()
        };

        // collect call-site arguments against the pattern
        let pat: Vec<char> = ex.arg.chars().collect();
        let mut args: Vec<Option<String>> = Vec::new();
        let mut i = 0;
        while i < pat.len() {
            match pat[i] {
                c @ ('(' | '[' | ']' | ')') => self.next_symbol(c)?,
                ',' => {
                    if !self.check_symbol(',') {
                        // every remaining argument was omitted
                        i += 1;
                        while i < pat.len() {
                            match pat[i] {
                                'I' | 'S' | 'C' | 'F'
                                    if pat.get(i + 1) == Some(&'-') =>
                                {
                                    args.push(Some(NASI.to_string()));
                                    i += 2;
                                }
                                ',' => i += 1,
                                c @ ('(' | '[' | ']' | ')') => {
                                    self.next_symbol(c)?;
                                    i += 1;
                                }
                                _ => return Err(TranslateError::syntax()),
                            }
                        }
                        break;
                    }
                }
                'I' | 'S' | 'C' | 'F' | 'N' => {
                    if pat.get(i + 1) == Some(&'A') {
                        // array argument: a bare, defined array name
                        i += 1;
                        let vn = self.next_variable()?;
                        let va = expect(self.nsp.find(&vn, false))?;
                        expect(if va.array { Some(()) } else { None })?;
                        args.push(Some(vn));
                    } else {
                        let x = self.expr()?;
                        let elidable = pat.get(i + 1) == Some(&'-');
                        match x {
                            None if elidable => {
                                if ex.name == "exit" {
                                    args.push(Some("0".to_string()));
                                } else if ex.name == "pi" {
                                    cfunc = "pi".to_string();
                                    args.push(None);
                                } else {
                                    args.push(Some(NASI.to_string()));
                                }
                                i += 1;
                            }
                            None => return Err(TranslateError::syntax()),
                            Some(x) => {
                                if ex.name == "str$" && x.ty == ExprType::Float {
                                    cfunc = "b_strfS".to_string();
                                } else if ex.name == "abs" && x.ty == ExprType::Float {
                                    cfunc = "fabs".to_string();
                                    rty = ExprType::Float;
                                }
                                args.push(Some(x.text));
                            }
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        // render the C argument list
        let mut arg = String::new();
        let mut ai = 0usize;
        for c in ex.carg.chars() {
            match c {
                ',' => arg.push_str(", "),
                '#' => {
                    let prev = ai
                        .checked_sub(1)
                        .and_then(|j| args.get(j))
                        .and_then(|a| a.as_deref())
                        .unwrap_or("");
                    arg.push_str(&format!("sizeof({})", prev));
                }
                '@' => {
                    let prev = ai
                        .checked_sub(1)
                        .and_then(|j| args.get(j))
                        .and_then(|a| a.as_deref())
                        .unwrap_or("");
                    arg.push_str(&format!("sizeof({}[0])", prev));
                }
                '&' => {
                    if let Some(Some(v)) = args.get(ai) {
                        arg.push('&');
                        arg.push_str(v);
                    }
                    ai += 1;
                }
                '%' => {
                    if let Some(Some(v)) = args.get(ai) {
                        arg.push_str(v);
                    }
                    ai += 1;
                }
                '$' => {
                    arg.push_str(&format!("strtmp{}", self.strtmp));
                    self.strtmp += 1;
                }
                _ => {}
            }
        }
        Ok(Some(CValue::new(rty, format!("{}({})", cfunc, arg))))
    }
}
