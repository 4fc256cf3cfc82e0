//! Gauge Token 类型定义

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // 关键字
    If,
    Then,
    Else,
    True,
    False,
    Import,
    As,
    Export,
    To,

    // 字面量
    Number,
    String,

    // 标识符
    Identifier,

    // 双字符符号
    DoubleEqual,
    ExclamationEqual,
    GreaterThanEqual,
    LessThanEqual,
    AndAnd,
    OrOr,
    Arrow,

    // 单字符符号
    GreaterThan,
    LessThan,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,
    Exclamation,
    Question,
    Colon,
    Equal,
    Comma,
    Semicolon,
    Dot,
    Pipe,
    LeftParenthesis,
    RightParenthesis,
    LeftCurlyBrace,
    RightCurlyBrace,
    LeftSquareBracket,
    RightSquareBracket,

    Eof,
}

impl TokenKind {
    /// 关键字查找
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "import" => Some(TokenKind::Import),
            "as" => Some(TokenKind::As),
            "export" => Some(TokenKind::Export),
            "to" => Some(TokenKind::To),
            _ => None,
        }
    }

    /// Human readable form used in parser diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Import => "'import'",
            TokenKind::As => "'as'",
            TokenKind::Export => "'export'",
            TokenKind::To => "'to'",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::DoubleEqual => "'=='",
            TokenKind::ExclamationEqual => "'!='",
            TokenKind::GreaterThanEqual => "'>='",
            TokenKind::LessThanEqual => "'<='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Arrow => "'->'",
            TokenKind::GreaterThan => "'>'",
            TokenKind::LessThan => "'<'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Caret => "'^'",
            TokenKind::Exclamation => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Equal => "'='",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Pipe => "'|'",
            TokenKind::LeftParenthesis => "'('",
            TokenKind::RightParenthesis => "')'",
            TokenKind::LeftCurlyBrace => "'{'",
            TokenKind::RightCurlyBrace => "'}'",
            TokenKind::LeftSquareBracket => "'['",
            TokenKind::RightSquareBracket => "']'",
            TokenKind::Eof => "end of input",
        }
    }
}
