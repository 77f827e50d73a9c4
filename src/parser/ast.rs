// AST (Abstract Syntax Tree) definitions for COOL programs
//
// The tree is strict: every node owns its children, nothing points back to a
// parent or sibling, and every node keeps the token that introduced it so later
// passes can report line/column positions.

use super::lexer::Token;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Implemented by every node; exposes the token that introduced it.
pub trait Node {
    fn token(&self) -> &Token;

    fn token_literal(&self) -> &str {
        &self.token().literal
    }

    fn location(&self) -> SourceLocation {
        self.token().location
    }
}

/// A capitalised type name (`Int`, `Main`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeIdentifier {
    pub token: Token,
    pub value: String,
}

impl TypeIdentifier {
    pub fn from_token(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

/// A value name: variable, attribute, method, formal or `self`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectIdentifier {
    pub token: Token,
    pub value: String,
}

impl ObjectIdentifier {
    pub fn from_token(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Comparison
    Lt,
    Le,
    Eq,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Eq => "=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Complement, // ~x
    IsVoid,     // isvoid x
    Not,        // not x
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Complement => "~",
            UnaryOperator::IsVoid => "isvoid",
            UnaryOperator::Not => "not",
        }
    }
}

/// Expressions. COOL has no statements; every construct produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    Identifier(ObjectIdentifier),
    Assignment {
        token: Token,
        target: ObjectIdentifier,
        value: Box<Expression>,
    },
    Binary {
        token: Token,
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        token: Token,
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Box<Expression>,
    },
    While {
        token: Token,
        condition: Box<Expression>,
        body: Box<Expression>,
    },
    Block {
        token: Token,
        body: Vec<Expression>,
    },
    New {
        token: Token,
        type_name: TypeIdentifier,
    },
}

impl Node for Expression {
    fn token(&self) -> &Token {
        match self {
            Expression::IntegerLiteral { token, .. } => token,
            Expression::StringLiteral { token, .. } => token,
            Expression::BooleanLiteral { token, .. } => token,
            Expression::Identifier(ident) => &ident.token,
            Expression::Assignment { token, .. } => token,
            Expression::Binary { token, .. } => token,
            Expression::Unary { token, .. } => token,
            Expression::If { token, .. } => token,
            Expression::While { token, .. } => token,
            Expression::Block { token, .. } => token,
            Expression::New { token, .. } => token,
        }
    }
}

/// Method parameter: `name : Type`
#[derive(Debug, Clone, PartialEq)]
pub struct Formal {
    pub token: Token,
    pub name: ObjectIdentifier,
    pub decl_type: TypeIdentifier,
}

/// `name(formals) : ReturnType { body };`
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub token: Token,
    pub name: ObjectIdentifier,
    pub formals: Vec<Formal>,
    pub return_type: TypeIdentifier,
    pub body: Expression,
}

/// `name : Type [<- init];`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub token: Token,
    pub name: ObjectIdentifier,
    pub decl_type: TypeIdentifier,
    pub init: Option<Expression>,
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Method(Method),
    Attribute(Attribute),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Method(method) => &method.name.value,
            Feature::Attribute(attr) => &attr.name.value,
        }
    }
}

/// Class definition. Features stay in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub token: Token,
    pub name: TypeIdentifier,
    pub features: Vec<Feature>,
    pub source_file: String,
}

/// Top-level program structure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub classes: Vec<Class>, // Declaration order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn token_literal(&self) -> &str {
        self.classes
            .first()
            .map(|class| class.token_literal())
            .unwrap_or("")
    }
}

macro_rules! impl_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn token(&self) -> &Token {
                    &self.token
                }
            }
        )*
    };
}

impl_node!(TypeIdentifier, ObjectIdentifier, Formal, Method, Attribute, Class);

impl Node for Feature {
    fn token(&self) -> &Token {
        match self {
            Feature::Method(method) => &method.token,
            Feature::Attribute(attr) => &attr.token,
        }
    }
}

// ===== Source rendering =====
//
// Binary and unary expressions are always parenthesised, so the printed form
// shows the tree shape exactly.

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            Expression::StringLiteral { value, .. } => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    match ch {
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\u{8}' => f.write_str("\\b")?,
                        '\u{c}' => f.write_str("\\f")?,
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("\"")
            }
            Expression::BooleanLiteral { value, .. } => write!(f, "{}", value),
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::Assignment { target, value, .. } => write!(f, "{} <- {}", target, value),
            Expression::Binary {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Unary {
                operator, operand, ..
            } => write!(f, "({} {})", operator, operand),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => write!(
                f,
                "if {} then {} else {} fi",
                condition, consequence, alternative
            ),
            Expression::While {
                condition, body, ..
            } => write!(f, "while {} loop {} pool", condition, body),
            Expression::Block { body, .. } => {
                f.write_str("{ ")?;
                for expr in body {
                    write!(f, "{}; ", expr)?;
                }
                f.write_str("}")
            }
            Expression::New { type_name, .. } => write!(f, "new {}", type_name),
        }
    }
}

impl fmt::Display for Formal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.decl_type)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Method(method) => {
                write!(f, "{}(", method.name)?;
                for (i, formal) in method.formals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", formal)?;
                }
                write!(f, ") : {} {{ {} }};", method.return_type, method.body)
            }
            Feature::Attribute(attr) => {
                write!(f, "{} : {}", attr.name, attr.decl_type)?;
                if let Some(init) = &attr.init {
                    write!(f, " <- {}", init)?;
                }
                f.write_str(";")
            }
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "class {} {{", self.name)?;
        for feature in &self.features {
            writeln!(f, "    {}", feature)?;
        }
        f.write_str("};")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", class)?;
        }
        Ok(())
    }
}
