//! Variables and their rendering as C declarations.

/// Base value type of a variable or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasType {
    Int,
    Char,
    Float,
    Str,
}

impl BasType {
    /// The C scalar type backing this BASIC type. `str` values live in
    /// `unsigned char` buffers.
    pub fn c_name(self) -> &'static str {
        match self {
            BasType::Int => "int",
            BasType::Char => "unsigned char",
            BasType::Float => "double",
            BasType::Str => "unsigned char",
        }
    }
}

/// One entry of a namespace: a variable, array, or function.
///
/// `arg` carries verbatim C text: the bracketed array bounds (including
/// the `+1` padding for BASIC's inclusive `0..N` indexing and the
/// `[32+1]` default string buffer) or, for functions, the rendered
/// parameter list. `init` is the verbatim C initialiser, if any.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: BasType,
    pub array: bool,
    /// Rendered as `static const` storage (array-assignment temporaries).
    pub static_const: bool,
    pub arg: String,
    pub init: String,
    pub func: bool,
    pub funcarg: bool,
}

impl Variable {
    pub fn new(name: &str, ty: BasType) -> Self {
        Variable {
            name: name.to_string(),
            ty,
            array: false,
            static_const: false,
            arg: String::new(),
            init: String::new(),
            func: false,
            funcarg: false,
        }
    }

    /// The C type prefix for a declaration of this entry.
    ///
    /// `fnres` selects the function-result rendering (`str` results are
    /// returned as `unsigned char *`); `global` adds the file-static
    /// storage class used for globals.
    pub fn typename(&self, fnres: bool, global: bool) -> String {
        if fnres && self.ty == BasType::Str {
            return "unsigned char *".to_string();
        }
        let storage = if self.static_const {
            "static const "
        } else if global {
            "static "
        } else {
            ""
        };
        format!("{}{}", storage, self.ty.c_name())
    }

    /// Render the C declaration for this entry, or an empty string for
    /// function arguments (those are declared in the signature).
    pub fn definition(&self, global: bool) -> String {
        if self.funcarg {
            return String::new();
        }
        if self.func {
            return format!("{} {}({});\n", self.typename(true, false), self.name, self.arg);
        }
        let mut r = format!("{} {}{}", self.typename(false, global), self.name, self.arg);
        if !self.init.is_empty() {
            r.push_str(&format!(" = {}", self.init));
        }
        r.push_str(";\n");
        r
    }
}

/// An assignable target resolved by the statement translator: the C
/// text of the reference (subscripts included) plus the type it has
/// after indexing. `array` is set only for whole-array assignment.
#[derive(Debug, Clone)]
pub struct Lvalue {
    pub name: String,
    pub ty: BasType,
    pub array: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typename_rendering() {
        let mut v = Variable::new("a", BasType::Int);
        assert_eq!(v.typename(false, false), "int");
        assert_eq!(v.typename(false, true), "static int");
        v.static_const = true;
        assert_eq!(v.typename(false, true), "static const int");

        let s = Variable::new("f", BasType::Str);
        assert_eq!(s.typename(true, false), "unsigned char *");
        assert_eq!(s.typename(false, false), "unsigned char");
    }

    #[test]
    fn test_scalar_definition() {
        let mut v = Variable::new("count", BasType::Int);
        v.init = "10".to_string();
        assert_eq!(v.definition(true), "static int count = 10;\n");
        assert_eq!(v.definition(false), "int count = 10;\n");
    }

    #[test]
    fn test_array_and_function_definitions() {
        let mut a = Variable::new("buf", BasType::Str);
        a.arg = "[32+1]".to_string();
        assert_eq!(a.definition(false), "unsigned char buf[32+1];\n");

        let mut f = Variable::new("area", BasType::Float);
        f.func = true;
        f.arg = "int w, int h".to_string();
        assert_eq!(f.definition(true), "double area(int w, int h);\n");

        let mut arg = Variable::new("w", BasType::Int);
        arg.funcarg = true;
        assert_eq!(arg.definition(false), "");
    }
}
