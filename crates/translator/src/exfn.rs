//! External-function signature table.
//!
//! Built-in and extension functions are not hardcoded: a line-oriented
//! signature file maps each BASIC name to a C callee. `[group]` headers
//! switch the active extension group (the driver emits one
//! `#include <group.h>` per group actually used); data lines have the
//! shape
//!
//! ```text
//! (rtype)? name argpattern : cname(cargpattern)
//! ```
//!
//! where `rtype` is one of `I C F S` (absent for statement-only calls,
//! in which case the line starts with whitespace), `argpattern` is a
//! mini-language over the call-site syntax (`( ) [ ]` literal
//! punctuation, `,` separators, `I C F S N` typed expressions, `A` for
//! an array name, `-` for an elidable argument) and `cargpattern`
//! drives the emitted argument list (`%` value, `&` address, `#`/`@`
//! sizeof forms, `$` scratch buffer, `,` separator). Lines that do not
//! match are skipped.

use crate::keyword::Tables;
use crate::variable::BasType;

/// Literal text substituted for an elided argument ("NASI" in hex).
pub const NASI: &str = "0x4e415349";

/// One signature entry of the external-function table.
#[derive(Debug, Clone)]
pub struct ExFn {
    /// Return type; `None` restricts the call to statement position.
    pub ret: Option<BasType>,
    /// BASIC-side name (may contain `$`).
    pub name: String,
    /// Call-site argument pattern.
    pub arg: String,
    /// C function name; empty means "same as `name`".
    pub cfunc: String,
    /// Emitted-argument pattern.
    pub carg: String,
    /// Extension group, decides the `#include` the driver adds.
    pub group: String,
}

fn parse_ret(word: &str) -> Option<BasType> {
    match word {
        "I" => Some(BasType::Int),
        "C" => Some(BasType::Char),
        "F" => Some(BasType::Float),
        "S" => Some(BasType::Str),
        _ => None,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_arg_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '-' | '(' | ')' | '[' | ']')
}

/// Parse one data line into an entry. Returns `None` for headers,
/// comments, and anything malformed.
fn parse_line(line: &str, group: &str) -> Option<ExFn> {
    let (left, right) = line.split_once(':')?;

    // Optional return type: present only when the line starts with a
    // word (statement-only entries are indented).
    let mut rest = left;
    let mut ret = None;
    if rest.starts_with(|c: char| !c.is_whitespace()) {
        let word: String = rest.chars().take_while(|c| !c.is_whitespace()).collect();
        ret = Some(parse_ret(&word)?);
        rest = &rest[word.len()..];
    }
    let rest = rest.trim();

    let name: String = rest.chars().take_while(|&c| is_name_char(c)).collect();
    if name.is_empty() {
        return None;
    }
    let arg = rest[name.len()..].trim();
    if !arg.chars().all(is_arg_char) {
        return None;
    }

    let right = right.trim();
    let (cfunc, carg) = right.split_once('(')?;
    let carg = carg.strip_suffix(')')?;
    if !cfunc.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    if !carg.chars().all(|c| matches!(c, '#' | '@' | '&' | '$' | '%' | ',')) {
        return None;
    }

    Some(ExFn {
        ret,
        name,
        arg: arg.to_string(),
        cfunc: cfunc.to_string(),
        carg: carg.to_string(),
        group: group.to_string(),
    })
}

impl Tables {
    /// Load a signature file, registering each entry as a keyword so the
    /// lexer recognises the BASIC names. Returns the number of entries
    /// loaded.
    pub fn load_exfn(&mut self, text: &str) -> usize {
        let mut group = String::new();
        let mut count = 0;
        for line in text.lines() {
            let trimmed = line.trim_end();
            if let Some(rest) = trimmed.strip_prefix('[') {
                if let Some(g) = rest.strip_suffix(']') {
                    group = g.to_string();
                    continue;
                }
            }
            if let Some(exfn) = parse_line(trimmed, &group) {
                self.register_exfn(exfn);
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    const DEF: &str = "\
[BASIC]
I\tabs\t(N)\t\t: b_abs(%)
S\tmid$\t(S,I,I-)\t: b_midS($,%,%,%)
\tcolor\tI-,I-,I-,I-\t: b_color(%,%,%,%)
this line does not parse
[MOUSE]
\tmsstat\t(I,I)\t\t: b_msstat(&,&)
";

    #[test]
    fn test_load_def_entries() {
        let mut t = Tables::new();
        assert_eq!(t.load_exfn(DEF), 4);

        let i = t.exfn_index("abs").unwrap();
        let abs = t.exfn(i);
        assert_eq!(abs.ret, Some(BasType::Int));
        assert_eq!(abs.arg, "(N)");
        assert_eq!(abs.cfunc, "b_abs");
        assert_eq!(abs.carg, "%");
        assert_eq!(abs.group, "BASIC");

        let c = t.exfn(t.exfn_index("color").unwrap());
        assert_eq!(c.ret, None);
        assert_eq!(c.arg, "I-,I-,I-,I-");

        let m = t.exfn(t.exfn_index("msstat").unwrap());
        assert_eq!(m.group, "MOUSE");
        assert_eq!(m.carg, "&,&");
    }

    #[test]
    fn test_entries_become_keywords() {
        let mut t = Tables::new();
        t.load_exfn(DEF);
        assert!(matches!(t.find_keyword("mid$"), Some(Keyword::ExFn(_))));
        assert_eq!(t.find_keyword("nosuch$"), None);
    }

    #[test]
    fn test_dollar_names_and_bad_lines() {
        let mut t = Tables::new();
        let n = t.load_exfn("S\tdate$\t\t: b_dateS($)\n\tdate$$\tS\t: b_setdateS(%)\nnot a line\n");
        assert_eq!(n, 2);
        assert!(t.exfn_index("date$$").is_some());
        let d = t.exfn(t.exfn_index("date$").unwrap());
        assert_eq!(d.arg, "");
        assert_eq!(d.ret, Some(BasType::Str));
    }
}
