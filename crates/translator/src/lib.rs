//! X-BASIC to C translator library.
//!
//! Translates Sharp X68000 X-BASIC programs into C source that links
//! against the prebuilt X-BASIC runtime library. Translation is two
//! passes over the same token stream: pass 1 builds the symbol table
//! and the GOTO/GOSUB line-number sets, pass 2 rewinds and emits C.
//!
//! ```rust,ignore
//! use bas2c::{Config, Tables, translate_source};
//!
//! let mut tables = Tables::new();
//! tables.load_exfn(&std::fs::read_to_string("bas2c.def")?);
//! let out = translate_source("print \"hi\"\n", &tables, &Config::new(), "demo.bas")?;
//! print!("{}", out.text);
//! ```

pub mod config;
pub mod error;
pub mod exfn;
pub mod keyword;
pub mod lexer;
pub mod namespace;
pub mod token;
pub mod translator;
pub mod variable;

pub use config::Config;
pub use error::{Result, TranslateError};
pub use exfn::ExFn;
pub use keyword::{Keyword, Tables};
pub use namespace::{NameSpace, Pass};
pub use token::{CValue, ExprType, Token};
pub use translator::Translator;
pub use variable::{BasType, Variable};

/// A finished translation: the generated C text and the number of
/// errors reported along the way (any error makes the CLI exit 1).
#[derive(Debug)]
pub struct Translation {
    pub text: String,
    pub errors: usize,
}

/// Translate one X-BASIC source text.
///
/// Recoverable translation errors are reported to stderr and counted in
/// the result; `Err` is reserved for output formatting failures and,
/// with [`Config::debug`], the first pass-2 error.
pub fn translate_source(
    source: &str,
    tables: &Tables,
    config: &Config,
    file_name: &str,
) -> Result<Translation> {
    let mut translator = Translator::new(source, tables, config, file_name);
    let text = translator.translate()?;
    Ok(Translation {
        text,
        errors: translator.error_count(),
    })
}

/// Decode raw input bytes: host UTF-8 first, CP932 (Shift_JIS) as the
/// fallback for legacy sources. Input stops at the first DOS EOF
/// marker (0x1A) and newlines are normalised to `\n`.
pub fn decode_source(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (cow, _, _) = encoding_rs::SHIFT_JIS.decode(bytes);
            cow.into_owned()
        }
    };
    let text = text.replace("\r\n", "\n");
    match text.find('\u{1a}') {
        Some(n) => text[..n].to_string(),
        None => text,
    }
}

/// Encode generated C as CP932 for use on the X68000 side.
pub fn encode_sjis(text: &str) -> Vec<u8> {
    let (cow, _, _) = encoding_rs::SHIFT_JIS.encode(text);
    cow.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const DEF: &str = "\
[BASIC]
I\tabs\t(N)\t\t: b_abs(%)
I\tint$$\t(N)\t\t: b_int(%)
S\tstr$\t(N)\t\t: b_striS($,%)
S\tchr$\t(I)\t\t: b_chrS($,%)
F\tpi\t(F-)\t\t: pi(%)
\texit\t(I-)\t\t: exit(%)
S\tinkey$\t\t\t: b_inkeyS($)
S\tinkey$$\t(I)\t\t: b_inkey0S($,%)
\tcolor\tI-,I-,I-,I-\t: b_color(%,%,%,%)
";

    fn tables() -> Tables {
        let mut t = Tables::new();
        t.load_exfn(DEF);
        t
    }

    fn translate(src: &str) -> Translation {
        translate_source(src, &tables(), &Config::new(), "test.bas").unwrap()
    }

    #[test]
    fn test_hello_world() {
        let t = translate("print \"a\"+\"b\"+\"c\"\n");
        assert_eq!(t.errors, 0);
        assert_eq!(
            t.text,
            "#include <basic0.h>\n\
             #include <string.h>\n\
             \n\
             static unsigned char strtmp0[258];\n\
             \n\
             /******** program start ********/\n\
             void main(int b_argc, char *b_argv[])\n\
             {\n\
             \tb_init();\n\
             \tb_sprint(b_stradd(strtmp0,\"a\",\"b\",\"c\",-1));\n\
             \tb_sprint(STRCRLF);\n\
             \tb_exit(0);\n\
             }\n"
        );
    }

    #[test]
    fn test_gosub_becomes_function() {
        let src = "\
10 gosub 100
20 end
100 print \"hi\"
110 return
";
        let t = translate(src);
        assert_eq!(t.errors, 0);
        assert_eq!(
            t.text,
            "#include <basic0.h>\n\
             #include <string.h>\n\
             \n\
             void S000100(void);\n\
             \n\
             /******** program start ********/\n\
             void main(int b_argc, char *b_argv[])\n\
             {\n\
             \tb_init();\n\
             \tS000100();\n\
             b_exit(0);\n\
             }\n\
             \n\
             /***************************/\n\
             void S000100(void)\n\
             {\n\
             \tb_sprint(\"hi\");\n\
             \tb_sprint(STRCRLF);\n\
             return;\n\
             }\n"
        );
    }

    #[test]
    fn test_goto_label() {
        let src = "\
10 a=0
20 a=a+1
30 goto 20
";
        let t = translate(src);
        assert_eq!(t.errors, 0);
        assert!(t.text.contains("static int a;\n"));
        assert!(t.text.contains("L000020:\n"));
        assert!(t.text.contains("\tgoto L000020;\n"));
        // the target line is a label, not a subroutine
        assert!(!t.text.contains("S000020"));
    }

    #[test]
    fn test_translation_is_deterministic() {
        let src = "\
int a(3)={1,2,3,4}
int b(3)
b={4,3,2,1}
print str$(1.5)+chr$(65)
";
        let first = translate(src).text;
        let second = translate(src).text;
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_sets_count_and_recovers() {
        // break outside any loop is fine; `next` without `for` is not
        let t = translate("next\nprint 1\n");
        assert!(t.errors > 0);
        // translation continued after the bad statement
        assert!(t.text.contains("b_iprint(1);"));
    }

    #[test]
    fn test_decode_utf8_and_eof_marker() {
        assert_eq!(decode_source(b"print 1\r\n\x1aignored"), "print 1\n");
        assert_eq!(decode_source(b"a=1\n"), "a=1\n");
    }

    #[test]
    fn test_decode_cp932_fallback() {
        // "あ" in CP932
        let bytes = [b'p', b'r', b'i', b'n', b't', b' ', b'"', 0x82, 0xa0, b'"', b'\n'];
        let decoded = decode_source(&bytes);
        assert_eq!(decoded, "print \"あ\"\n");
    }

    #[test]
    fn test_encode_sjis_roundtrip() {
        let bytes = encode_sjis("b_sprint(\"あ\");\n");
        assert!(bytes.windows(2).any(|w| w == [0x82, 0xa0]));
    }

    #[test]
    fn test_decode_cp932_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[b'a', b'=', b'1', b'\r', b'\n', 0x82, 0xa0]).unwrap();
        let bytes = std::fs::read(f.path()).unwrap();
        assert_eq!(decode_source(&bytes), "a=1\nあ");
    }
}
