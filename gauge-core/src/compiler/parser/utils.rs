use super::ast::InfixOp;
use crate::compiler::lexer::TokenKind;

/// 一元运算符的操作数优先级：高于乘除，低于乘方（`-2^2 == -4`）
pub const UNARY_PRECEDENCE: i32 = 75;

/// 二元运算符及其优先级
pub fn infix_operator(kind: TokenKind) -> Option<(InfixOp, i32)> {
    let op = match kind {
        TokenKind::OrOr => (InfixOp::Or, 10),
        TokenKind::AndAnd => (InfixOp::And, 20),
        TokenKind::DoubleEqual => (InfixOp::Equal, 30),
        TokenKind::ExclamationEqual => (InfixOp::Unequal, 30),
        TokenKind::LessThan => (InfixOp::Smaller, 40),
        TokenKind::LessThanEqual => (InfixOp::SmallerEq, 40),
        TokenKind::GreaterThan => (InfixOp::Larger, 40),
        TokenKind::GreaterThanEqual => (InfixOp::LargerEq, 40),
        TokenKind::To => (InfixOp::To, 50),
        TokenKind::Plus => (InfixOp::Add, 60),
        TokenKind::Minus => (InfixOp::Subtract, 60),
        TokenKind::Asterisk => (InfixOp::Multiply, 70),
        TokenKind::Slash => (InfixOp::Divide, 70),
        TokenKind::Caret => (InfixOp::Pow, 80),
        _ => return None,
    };
    Some(op)
}

/// 获取运算符结合性
///
/// Returns: `true` 表示左结合，`false` 表示右结合
pub fn is_left_associative(op: InfixOp) -> bool {
    !matches!(op, InfixOp::Pow)
}
