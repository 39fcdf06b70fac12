//! Expression nodes.

/// The static kind tag of an expression.
///
/// Lowering dispatches on this tag where the IR shape depends on the
/// operand's syntactic category (most notably `DBMS.PRINT` and the string
/// indirection rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    /// A string literal.
    Str,
    /// A numeric literal.
    Numeric,
    /// A variable reference.
    Variable,
    /// A function call.
    Call,
    /// A binary operation.
    BinOp,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A string literal. The payload is the text *between* the quotes;
    /// escape sequences are not processed.
    StringLiteral(String),
    /// A 64-bit signed numeric literal.
    NumericLiteral(i64),
    /// A variable reference, upper-cased.
    Variable(String),
    /// A qualified function call used in expression position.
    FunctionCall(FunctionCall),
    /// A binary operation.
    BinOp(Box<BinOp>),
}

impl Expr {
    /// Returns the static kind tag of this expression.
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::StringLiteral(_) => ExprKind::Str,
            Expr::NumericLiteral(_) => ExprKind::Numeric,
            Expr::Variable(_) => ExprKind::Variable,
            Expr::FunctionCall(_) => ExprKind::Call,
            Expr::BinOp(_) => ExprKind::BinOp,
        }
    }
}

/// A qualified call `<module>.<function>(args...)`.
///
/// Local calls are qualified with the enclosing package name by the parser,
/// so every call carries a module at lowering time. The module `DBMS`
/// resolves to runtime intrinsics instead of user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The qualifying module (package) name.
    pub module: String,
    /// The callee name within the module.
    pub function: String,
    /// Call arguments in source order.
    pub args: Vec<Expr>,
}

impl FunctionCall {
    /// Creates a call with no arguments yet.
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        FunctionCall {
            module: module.into(),
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn add_arg(&mut self, expr: Expr) {
        self.args.push(expr);
    }

    /// Returns the `<module>.<function>` name this call resolves through.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }
}

/// A binary operation `left op right`.
///
/// The operator is kept as source text; which operators are actually
/// implemented is a lowering concern, and an unimplemented operator is a
/// fatal lowering error naming the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinOp {
    pub left: Expr,
    pub op: String,
    pub right: Expr,
}

impl BinOp {
    pub fn new(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        BinOp {
            left,
            op: op.into(),
            right,
        }
    }
}
