use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug)]
pub struct ProgramData {
    pub body: Vec<StatementType>,
}

#[derive(Debug)]
pub enum StatementType {
    FunctionDeclaration(Rc<FunctionData>),
    VariableDeclaration {
        meta: Meta,
        kind: VariableDeclarationKind,
        declarations: Vec<VariableDeclaratorData>,
    },
    ReturnStatement {
        meta: Meta,
        argument: Option<ExpressionType>,
    },
    IfStatement {
        meta: Meta,
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    BlockStatement {
        meta: Meta,
        body: Vec<StatementType>,
    },
    ExpressionStatement {
        meta: Meta,
        expression: ExpressionType,
    },
    EmptyStatement {
        meta: Meta,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug)]
pub struct VariableDeclaratorData {
    pub name: String,
    pub init: Option<ExpressionType>,
}

#[derive(Debug)]
pub struct FunctionData {
    pub meta: Meta,
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: FunctionBodyData,
    /// Arrow functions never get a context of their own.
    pub is_arrow: bool,
}

#[derive(Debug)]
pub enum FunctionBodyData {
    Block(Vec<StatementType>),
    Expression(Box<ExpressionType>),
}

#[derive(Debug)]
pub enum ExpressionType {
    Literal(LiteralType),
    Identifier(String),
    ThisExpression,
    TemplateLiteral(Vec<TemplatePart>),
    ArrayExpression(Vec<ExpressionType>),
    ObjectExpression(Vec<PropertyData>),
    FunctionExpression(Rc<FunctionData>),
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    MemberExpression(MemberExpressionType),
    CallExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
    NewExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
}

#[derive(Debug)]
pub enum MemberExpressionType {
    SimpleMemberExpression {
        object: Box<ExpressionType>,
        property: String,
    },
    ComputedMemberExpression {
        object: Box<ExpressionType>,
        property: Box<ExpressionType>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    NullLiteral,
    BooleanLiteral(bool),
    StringLiteral(String),
    NumberLiteral(f64),
}

#[derive(Debug)]
pub enum TemplatePart {
    Text(String),
    Substitution(ExpressionType),
}

#[derive(Debug)]
pub struct PropertyData {
    pub key: String,
    pub value: ExpressionType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Not,
    Minus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    StrictlyEqual,
    StrictlyUnequal,
    LooselyEqual,
    LooselyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    InstanceOf,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    Or,
    And,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
}

impl ExpressionType {
    /// Source-like rendering of a callee, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            ExpressionType::Identifier(name) => name.clone(),
            ExpressionType::ThisExpression => "this".to_string(),
            ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
                object,
                property,
            }) => format!("{}.{}", object.describe(), property),
            ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
                object,
                ..
            }) => format!("{}[...]", object.describe()),
            ExpressionType::CallExpression { callee, .. } => format!("{}(...)", callee.describe()),
            _ => "expression".to_string(),
        }
    }
}
