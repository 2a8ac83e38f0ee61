//! Rewrites the grammar applies to otherwise plain parse results.
//!
//! Each rule is a free function over finished nodes so it can be revisited
//! without touching the precedence climbing loop.
use crate::ast::{AstNode, Fixity, Numeral};

/// Identifiers which take a parenthesized group as call argument
pub const CALL_ALIASES: [&str; 2] = ["f", "g"];

/// Applies a prefix sign. An undecorated literal written right after the sign
/// absorbs it, everything else is wrapped in a unary operator.
pub fn fold_sign(sign: &str, operand: Option<AstNode>, literal_follows: bool) -> AstNode {
    match operand {
        Some(AstNode::Number { num, scripts }) if literal_follows && scripts.is_empty() => {
            let num = if sign == "-" { negate(num) } else { num };
            AstNode::Number { num, scripts }
        }
        operand => AstNode::prefix(sign, operand),
    }
}

fn negate(num: Numeral) -> Numeral {
    match num {
        Numeral::Float(value) => Numeral::Float(-value),
        Numeral::Exact(text) => match text.strip_prefix('-') {
            Some(positive) => Numeral::Exact(positive.to_string()),
            None => Numeral::Exact(format!("-{}", text)),
        },
    }
}

/// `2 1/2` is read as `2 + 1/2` with an invisible plus
pub fn mixed_number(whole: AstNode, fraction: AstNode) -> AstNode {
    AstNode::binary("+", whole, fraction)
}

pub fn inverse_function(name: &str) -> Option<&'static str> {
    match name {
        "sin" => Some("arcsin"),
        "cos" => Some("arccos"),
        "tan" => Some("arctan"),
        "cot" => Some("arccot"),
        "sec" => Some("arcsec"),
        "csc" => Some("arccsc"),
        "sinh" => Some("arsinh"),
        "cosh" => Some("arcosh"),
        "tanh" => Some("artanh"),
        "coth" => Some("arcoth"),
        "sech" => Some("arsech"),
        "csch" => Some("arcsch"),
        _ => None,
    }
}

fn is_minus_one(node: &AstNode) -> bool {
    match node {
        AstNode::Number { num, scripts } => scripts.is_empty() && num.value() == -1.0,
        AstNode::Unary {
            op,
            fixity: Fixity::Prefix,
            operand: Some(operand),
        } if op == "-" => match &**operand {
            AstNode::Number { num, scripts } => scripts.is_empty() && num.value() == 1.0,
            _ => false,
        },
        _ => false,
    }
}

/// `sin^{-1}` becomes `arcsin`. Other exponents stay on the call.
pub fn invert_function(call: AstNode) -> AstNode {
    match call {
        AstNode::Call {
            name,
            args,
            fence,
            mut scripts,
        } => {
            let inverse = match (inverse_function(&name), &scripts.sup) {
                (Some(inverse), Some(sup)) if is_minus_one(sup) => Some(inverse),
                _ => None,
            };
            match inverse {
                Some(inverse) => {
                    scripts.sup = None;
                    AstNode::Call {
                        name: inverse.to_string(),
                        args,
                        fence,
                        scripts,
                    }
                }
                None => AstNode::Call {
                    name,
                    args,
                    fence,
                    scripts,
                },
            }
        }
        other => other,
    }
}

/// Combines two adjacent primaries: an invisible multiplication, or a call
/// when the left side ends with one of the call aliases.
pub fn juxtapose(lhs: Option<AstNode>, rhs: Option<AstNode>) -> Option<AstNode> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(match call_alias(lhs, rhs) {
            Ok(call) => call,
            Err((lhs, rhs)) => AstNode::binary("*", lhs, rhs),
        }),
        (lhs, None) => lhs,
        (None, rhs) => rhs,
    }
}

/// Applies the alias at the right edge of an implicit product to a
/// parenthesized group. Hands both nodes back when there is none.
fn call_alias(lhs: AstNode, rhs: AstNode) -> Result<AstNode, (AstNode, AstNode)> {
    match (lhs, rhs) {
        (
            AstNode::Symbol {
                name,
                variant: None,
                scripts: name_scripts,
            },
            AstNode::Group {
                inner,
                fence,
                scripts,
            },
        ) if name_scripts.is_empty()
            && CALL_ALIASES.contains(&name.as_str())
            && fence.open == "(" =>
        {
            Ok(AstNode::Call {
                name,
                args: vec![*inner],
                fence: None,
                scripts,
            })
        }
        (
            AstNode::Binary {
                op,
                lhs: left,
                rhs: Some(right),
                scripts,
            },
            group,
        ) if op == "*" && scripts.is_empty() => match call_alias(*right, group) {
            Ok(call) => Ok(AstNode::Binary {
                op,
                lhs: left,
                rhs: Some(Box::new(call)),
                scripts,
            }),
            Err((right, group)) => Err((
                AstNode::Binary {
                    op,
                    lhs: left,
                    rhs: Some(Box::new(right)),
                    scripts,
                },
                group,
            )),
        },
        other => Err(other),
    }
}

/// Attaches scripts to a node. Nodes which can not carry them, or already
/// carry the same kind, are wrapped in a group first.
pub fn attach_scripts(node: AstNode, sup: Option<AstNode>, sub: Option<AstNode>) -> AstNode {
    if sup.is_none() && sub.is_none() {
        return node;
    }
    let clash = match node.scripts() {
        None => true,
        Some(scripts) => {
            (sup.is_some() && scripts.sup.is_some()) || (sub.is_some() && scripts.sub.is_some())
        }
    };
    let mut node = if clash { AstNode::group(node) } else { node };
    if let Some(scripts) = node.scripts_mut() {
        if let Some(sup) = sup {
            scripts.sup = Some(Box::new(sup));
        }
        if let Some(sub) = sub {
            scripts.sub = Some(Box::new(sub));
        }
    }
    node
}

#[cfg(test)]
mod specs {
    use super::*;
    use crate::ast::Scripts;

    #[test]
    fn sign_folds_into_literal() {
        assert_eq!(
            fold_sign("-", Some(AstNode::number(2.0)), true),
            AstNode::number(-2.0)
        );
        assert_eq!(
            fold_sign("+", Some(AstNode::number(2.0)), true),
            AstNode::number(2.0)
        );
    }

    #[test]
    fn sign_keeps_decorated_literal() {
        let squared = AstNode::number(2.0).with_sup(AstNode::number(2.0));
        assert_eq!(
            fold_sign("-", Some(squared.clone()), true),
            AstNode::prefix("-", Some(squared))
        );
    }

    #[test]
    fn sign_on_symbol() {
        assert_eq!(
            fold_sign("-", Some(AstNode::symbol("x")), false),
            AstNode::prefix("-", Some(AstNode::symbol("x")))
        );
    }

    #[test]
    fn sign_on_exact_literal() {
        assert_eq!(
            fold_sign("-", Some(AstNode::exact("3/4")), true),
            AstNode::exact("-3/4")
        );
    }

    #[test]
    fn invert_sine() {
        let call = AstNode::Call {
            name: "sin".to_string(),
            args: vec![AstNode::symbol("x")],
            fence: None,
            scripts: Scripts::sup(AstNode::prefix("-", Some(AstNode::number(1.0)))),
        };
        assert_eq!(
            invert_function(call),
            AstNode::call("arcsin", vec![AstNode::symbol("x")])
        );
    }

    #[test]
    fn keep_other_exponents() {
        let call = AstNode::call("sin", vec![]).with_sup(AstNode::number(2.0));
        assert_eq!(invert_function(call.clone()), call);
        let call = AstNode::call("ln", vec![]).with_sup(AstNode::number(-1.0));
        assert_eq!(invert_function(call.clone()), call);
    }

    #[test]
    fn alias_becomes_call() {
        assert_eq!(
            juxtapose(
                Some(AstNode::symbol("f")),
                Some(AstNode::group(AstNode::symbol("x")))
            ),
            Some(AstNode::call("f", vec![AstNode::symbol("x")]))
        );
        assert_eq!(
            juxtapose(
                Some(AstNode::symbol("h")),
                Some(AstNode::group(AstNode::symbol("x")))
            ),
            Some(AstNode::binary(
                "*",
                AstNode::symbol("h"),
                AstNode::group(AstNode::symbol("x"))
            ))
        );
    }

    #[test]
    fn scripts_promote_when_needed() {
        let root = AstNode::root(AstNode::symbol("x"), None);
        assert_eq!(
            attach_scripts(root.clone(), Some(AstNode::number(2.0)), None),
            AstNode::group(root).with_sup(AstNode::number(2.0))
        );
        let squared = AstNode::symbol("x").with_sup(AstNode::number(2.0));
        assert_eq!(
            attach_scripts(squared.clone(), None, Some(AstNode::symbol("i"))),
            squared.clone().with_sub(AstNode::symbol("i"))
        );
        assert_eq!(
            attach_scripts(squared.clone(), Some(AstNode::number(3.0)), None),
            AstNode::group(squared).with_sup(AstNode::number(3.0))
        );
    }
}
