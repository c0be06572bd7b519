//! Translator configuration.
//!
//! A plain struct of flags built by the CLI layer (or by tests) and
//! threaded through the translator. The defaults give the "enhanced"
//! output mode: extra parentheses, `(int)` casts around bitwise
//! operands, and `-1`/`0` comparison results matching BASIC truth
//! values.

/// Translation options.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Abort on the first pass-2 error instead of recovering (`-D`).
    pub debug: bool,
    /// Treat a call to an undefined function as an error in pass 2 (`-u`).
    pub undef_error: bool,
    /// Do not emit `b_init()`/`b_exit()`; `END` maps to `exit(0)` (`-n`).
    pub no_binit: bool,
    /// Echo each BASIC line to stderr while pass 2 runs (`-v`).
    pub verbose: bool,
    /// BC.X-compatible output: no redundant parens or casts, logical `!`
    /// for NOT, raw C comparison results (`-b`).
    pub bc_compat: bool,
    /// Insert each BASIC source line as a C comment indented by this many
    /// tab stops (`-c[N]`).
    pub bas_comment: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}
