use crate::intern::{FileId, Symbol};

/// Position of a token or IR node in the preprocessed source. The file is a
/// handle into the compilation context's file pool, which `#line` directives
/// extend; locations stay valid for the life of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
}

impl SourceLoc {
    pub fn new(file: FileId, line: u32, col: u32) -> Self {
        Self { file, line, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenType {
    // Storage and qualifier modifiers
    Extern,
    Static,
    Uniform,
    Volatile,
    Const,
    Precise,
    Shared,
    Groupshared,
    Nointerpolation,
    RowMajor,
    ColumnMajor,
    In,
    Out,
    Inout,

    // Declarations
    Struct,
    Typedef,
    Register,

    // Control flow
    If,
    Else,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,

    // Reserved effect-framework keywords, recognized but never lowered
    Technique,
    Pass,
    SamplerState,
    StateBlock,
    Compile,

    // Identifiers, classified against the live scope stack at lex time
    TypeName(Symbol),
    VarName(Symbol),
    NewIdent(Symbol),

    // Literals
    IntConst(i64),
    FloatConst(f64),
    BoolConst(bool),
    StringConst(Symbol),

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Inc,
    Dec,
    Not,
    Tilde,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    Shl,
    Shr,
    Amp,
    Pipe,
    Caret,
    AndAnd,
    OrOr,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    OrAssign,
    XorAssign,

    Eof,
}

impl TokenType {
    /// Short description used in syntax diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Extern => "'extern'",
            TokenType::Static => "'static'",
            TokenType::Uniform => "'uniform'",
            TokenType::Volatile => "'volatile'",
            TokenType::Const => "'const'",
            TokenType::Precise => "'precise'",
            TokenType::Shared => "'shared'",
            TokenType::Groupshared => "'groupshared'",
            TokenType::Nointerpolation => "'nointerpolation'",
            TokenType::RowMajor => "'row_major'",
            TokenType::ColumnMajor => "'column_major'",
            TokenType::In => "'in'",
            TokenType::Out => "'out'",
            TokenType::Inout => "'inout'",
            TokenType::Struct => "'struct'",
            TokenType::Typedef => "'typedef'",
            TokenType::Register => "'register'",
            TokenType::If => "'if'",
            TokenType::Else => "'else'",
            TokenType::While => "'while'",
            TokenType::Do => "'do'",
            TokenType::For => "'for'",
            TokenType::Return => "'return'",
            TokenType::Break => "'break'",
            TokenType::Continue => "'continue'",
            TokenType::Technique => "'technique'",
            TokenType::Pass => "'pass'",
            TokenType::SamplerState => "'sampler_state'",
            TokenType::StateBlock => "'stateblock'",
            TokenType::Compile => "'compile'",
            TokenType::TypeName(_) => "type name",
            TokenType::VarName(_) => "variable name",
            TokenType::NewIdent(_) => "identifier",
            TokenType::IntConst(_) => "integer constant",
            TokenType::FloatConst(_) => "floating constant",
            TokenType::BoolConst(_) => "boolean constant",
            TokenType::StringConst(_) => "string constant",
            TokenType::LParen => "'('",
            TokenType::RParen => "')'",
            TokenType::LBrace => "'{'",
            TokenType::RBrace => "'}'",
            TokenType::LBracket => "'['",
            TokenType::RBracket => "']'",
            TokenType::Comma => "','",
            TokenType::Semicolon => "';'",
            TokenType::Colon => "':'",
            TokenType::Dot => "'.'",
            TokenType::Question => "'?'",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Star => "'*'",
            TokenType::Slash => "'/'",
            TokenType::Percent => "'%'",
            TokenType::Inc => "'++'",
            TokenType::Dec => "'--'",
            TokenType::Not => "'!'",
            TokenType::Tilde => "'~'",
            TokenType::Lt => "'<'",
            TokenType::Gt => "'>'",
            TokenType::Le => "'<='",
            TokenType::Ge => "'>='",
            TokenType::EqEq => "'=='",
            TokenType::Ne => "'!='",
            TokenType::Shl => "'<<'",
            TokenType::Shr => "'>>'",
            TokenType::Amp => "'&'",
            TokenType::Pipe => "'|'",
            TokenType::Caret => "'^'",
            TokenType::AndAnd => "'&&'",
            TokenType::OrOr => "'||'",
            TokenType::Assign => "'='",
            TokenType::AddAssign => "'+='",
            TokenType::SubAssign => "'-='",
            TokenType::MulAssign => "'*='",
            TokenType::DivAssign => "'/='",
            TokenType::ModAssign => "'%='",
            TokenType::ShlAssign => "'<<='",
            TokenType::ShrAssign => "'>>='",
            TokenType::AndAssign => "'&='",
            TokenType::OrAssign => "'|='",
            TokenType::XorAssign => "'^='",
            TokenType::Eof => "end of file",
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenType::Extern
                | TokenType::Static
                | TokenType::Uniform
                | TokenType::Volatile
                | TokenType::Const
                | TokenType::Precise
                | TokenType::Shared
                | TokenType::Groupshared
                | TokenType::Nointerpolation
                | TokenType::RowMajor
                | TokenType::ColumnMajor
                | TokenType::In
                | TokenType::Out
                | TokenType::Inout
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenType,
    pub loc: SourceLoc,
}

impl Token {
    pub fn new(kind: TokenType, loc: SourceLoc) -> Self {
        Token { kind, loc }
    }
}
