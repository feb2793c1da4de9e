//! 自定义布尔表达式求值
//!
//! 原始配置面向通用表达式语言书写，这里实现其一个明确的子集：
//!
//! ```text
//! expr     := or
//! or       := and  (("or"  | "||") and)*
//! and      := unary (("and" | "&&") unary)*
//! unary    := ("not" | "!") unary | primary
//! primary  := "true" | "false" | contains | "(" expr ")"
//! contains := ["#"] "user" "." "contains" "(" 引号字符串 ")"
//! ```
//!
//! user.contains('g') 当且仅当 g 属于绑定的用户组集合时为 true，
//! 可选的 # 前缀兼容按原求值器语法（#user.contains('g')）书写的
//! 文档。子集之外的任何输入都会报错，而不是静默按 false 处理；
//! 语法本身保证求值结果必然是布尔值。

use std::collections::HashSet;
use std::fmt;

use config_resolver_api::ExpressionError;
use regex::Regex;

/// 求值入口：解析并计算表达式，变量 user 绑定为用户组集合
pub fn evaluate(expr: &str, user_groups: &HashSet<String>) -> Result<bool, ExpressionError> {
    let tokens = Lexer::new(expr).tokenize()?;
    let ast = Parser::new(tokens).parse()?;
    Ok(ast.eval(user_groups))
}

/// 词法记号种类
#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    True,
    False,
    And,
    Or,
    Not,
    LParen,
    RParen,
    /// user.contains('组名') 调用，携带组名字面量
    Contains(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Contains(group) => write!(f, "user.contains('{}')", group),
        }
    }
}

/// 词法记号及其在输入中的字节位置
#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

/// 词法分析器
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    contains_re: Regex,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            // 表达式通常很短，每次求值重新编译的成本可接受
            contains_re: Regex::new(r#"^#?user\.contains\(\s*(?:'([^']*)'|"([^"]*)")\s*\)"#)
                .expect("内置正则必然合法"),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        let pos = self.pos;
        let rest = &self.input[self.pos..];

        // 符号形式：双字符优先于单字符
        for (symbol, kind) in [
            ("&&", TokenKind::And),
            ("||", TokenKind::Or),
            ("(", TokenKind::LParen),
            (")", TokenKind::RParen),
            ("!", TokenKind::Not),
        ] {
            if rest.starts_with(symbol) {
                self.pos += symbol.len();
                return Ok(Token { kind, pos });
            }
        }

        // user.contains('...') 调用，# 前缀可选
        if let Some(caps) = self.contains_re.captures(rest) {
            let group = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            self.pos += caps.get(0).expect("捕获 0 恒存在").len();
            return Ok(Token {
                kind: TokenKind::Contains(group),
                pos,
            });
        }

        // 关键字：按完整单词匹配，避免 "nota" 被拆成 "not" + "a"
        let word: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !word.is_empty() {
            let kind = match word.as_str() {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "and" => TokenKind::And,
                "or" => TokenKind::Or,
                "not" => TokenKind::Not,
                _ => {
                    return Err(ExpressionError::UnrecognizedToken {
                        pos,
                        fragment: word,
                    });
                }
            };
            self.pos += word.len();
            return Ok(Token { kind, pos });
        }

        Err(ExpressionError::UnrecognizedToken {
            pos,
            fragment: rest.chars().take(8).collect(),
        })
    }
}

/// 表达式语法树
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(bool),
    Contains(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// 递归求值，and/or 短路
    fn eval(&self, user_groups: &HashSet<String>) -> bool {
        match self {
            Self::Literal(value) => *value,
            Self::Contains(group) => user_groups.contains(group),
            Self::Not(inner) => !inner.eval(user_groups),
            Self::And(left, right) => left.eval(user_groups) && right.eval(user_groups),
            Self::Or(left, right) => left.eval(user_groups) || right.eval(user_groups),
        }
    }
}

/// 语法分析器，递归下降，优先级 or < and < not
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Expr, ExpressionError> {
        let expr = self.parse_or()?;
        if let Some(extra) = self.tokens.get(self.pos) {
            return Err(ExpressionError::TrailingInput { pos: extra.pos });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat(&TokenKind::Not) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;

        match token.kind {
            TokenKind::True => Ok(Expr::Literal(true)),
            TokenKind::False => Ok(Expr::Literal(false)),
            TokenKind::Contains(group) => Ok(Expr::Contains(group)),
            TokenKind::LParen => {
                let expr = self.parse_or()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(match self.tokens.get(self.pos) {
                        Some(token) => ExpressionError::UnexpectedToken {
                            pos: token.pos,
                            token: token.kind.to_string(),
                        },
                        None => ExpressionError::UnexpectedEnd,
                    });
                }
                Ok(expr)
            }
            kind => Err(ExpressionError::UnexpectedToken {
                pos: token.pos,
                token: kind.to_string(),
            }),
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.tokens.get(self.pos).is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literals() {
        assert!(evaluate("true", &groups(&[])).unwrap());
        assert!(!evaluate("false", &groups(&[])).unwrap());
    }

    #[test]
    fn test_contains_hit_and_miss() {
        let user = groups(&["group-a", "group-b"]);
        assert!(evaluate("user.contains('group-a')", &user).unwrap());
        assert!(!evaluate("user.contains('group-z')", &user).unwrap());
    }

    #[test]
    fn test_hash_prefix_accepted() {
        let user = groups(&["group-c"]);
        assert!(evaluate("#user.contains('group-c')", &user).unwrap());
    }

    #[test]
    fn test_double_quoted_group_name() {
        let user = groups(&["group-a"]);
        assert!(evaluate(r#"user.contains("group-a")"#, &user).unwrap());
    }

    #[test]
    fn test_word_operators() {
        let user = groups(&["group-a", "group-b"]);
        assert!(evaluate(
            "#user.contains('group-a') and #user.contains('group-b')",
            &user
        )
        .unwrap());
        assert!(evaluate(
            "user.contains('group-z') or user.contains('group-a')",
            &user
        )
        .unwrap());
        assert!(evaluate("not user.contains('group-z')", &user).unwrap());
    }

    #[test]
    fn test_symbol_operators() {
        let user = groups(&["group-a"]);
        assert!(evaluate("user.contains('group-a') && !user.contains('group-b')", &user).unwrap());
        assert!(evaluate("false || user.contains('group-a')", &user).unwrap());
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // true or (false and false)，若 or 先结合则结果为 false
        assert!(evaluate("true or false and false", &groups(&[])).unwrap());
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert!(!evaluate("(true or false) and false", &groups(&[])).unwrap());
    }

    #[test]
    fn test_nested_not() {
        assert!(evaluate("not not true", &groups(&[])).unwrap());
        assert!(!evaluate("!!false", &groups(&[])).unwrap());
    }

    #[test]
    fn test_whitespace_tolerated() {
        let user = groups(&["group-a"]);
        assert!(evaluate("  user.contains( 'group-a' )   ", &user).unwrap());
    }

    #[test]
    fn test_empty_expression_fails() {
        assert_eq!(
            evaluate("", &groups(&[])).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        assert_eq!(
            evaluate("   ", &groups(&[])).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
    }

    #[test]
    fn test_unrecognized_token_fails() {
        let err = evaluate("1 + 1", &groups(&[])).unwrap_err();
        assert!(matches!(err, ExpressionError::UnrecognizedToken { .. }));

        // 未加引号的 contains 参数不在子集内
        let err = evaluate("user.contains(admin)", &groups(&[])).unwrap_err();
        assert!(matches!(err, ExpressionError::UnrecognizedToken { .. }));
    }

    #[test]
    fn test_unbalanced_paren_fails() {
        assert_eq!(
            evaluate("(true", &groups(&[])).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        let err = evaluate("true)", &groups(&[])).unwrap_err();
        assert!(matches!(err, ExpressionError::TrailingInput { .. }));
    }

    #[test]
    fn test_dangling_operator_fails() {
        assert_eq!(
            evaluate("true and", &groups(&[])).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        let err = evaluate("and true", &groups(&[])).unwrap_err();
        assert!(matches!(err, ExpressionError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_trailing_content_fails() {
        let err = evaluate("true true", &groups(&[])).unwrap_err();
        assert!(matches!(err, ExpressionError::TrailingInput { .. }));
    }

    #[test]
    fn test_empty_group_literal() {
        // 空组名是合法字面量，只是永远不命中非空组集合
        assert!(!evaluate("user.contains('')", &groups(&["group-a"])).unwrap());
        assert!(evaluate("user.contains('')", &groups(&[""])).unwrap());
    }

    #[test]
    fn test_complex_expression() {
        let user = groups(&["employees", "beta-testers"]);
        let expr = "(#user.contains('employees') or #user.contains('contractors')) \
                    and not #user.contains('suspended')";
        assert!(evaluate(expr, &user).unwrap());

        let suspended = groups(&["employees", "suspended"]);
        assert!(!evaluate(expr, &suspended).unwrap());
    }
}
