use crate::ast::{AstNode, Fixity, Numeral, Scripts};
use crate::context::{Catalog, Context};
use std::fmt;

fn dump_atomic(catalog: &dyn Catalog, ast: &AstNode, bracket: bool, string: &mut String) {
    if bracket {
        string.push('(');
        dump_impl(catalog, ast, string);
        string.push(')');
    } else {
        dump_impl(catalog, ast, string);
    }
}

/// Leaves and nodes which print with their own delimiters
fn is_atomic(ast: &AstNode) -> bool {
    match ast {
        AstNode::Number { num, .. } => num.value() >= 0.0,
        AstNode::Symbol { .. }
        | AstNode::Text { .. }
        | AstNode::Group { .. }
        | AstNode::Call { .. }
        | AstNode::Root { .. }
        | AstNode::Error { .. } => true,
        _ => false,
    }
}

fn dump_scripts(catalog: &dyn Catalog, scripts: &Scripts, string: &mut String) {
    if let Some(sup) = &scripts.sup {
        string.push('^');
        dump_atomic(catalog, sup, !is_atomic(sup), string);
    }
    if let Some(sub) = &scripts.sub {
        string.push('_');
        dump_atomic(catalog, sub, !is_atomic(sub), string);
    }
}

fn dump_operand(catalog: &dyn Catalog, parent: &str, operand: Option<&AstNode>, string: &mut String) {
    if let Some(operand) = operand {
        let looser = match (
            operand.operator().and_then(|op| catalog.precedence(op)),
            catalog.precedence(parent),
        ) {
            (Some(child), Some(parent)) => child < parent,
            _ => false,
        };
        dump_atomic(catalog, operand, looser, string);
    }
}

fn postfix_mark(name: &str) -> Option<&'static str> {
    match name {
        "factorial" => Some("!"),
        "factorial2" => Some("!!"),
        "prime" => Some("'"),
        "prime2" => Some("''"),
        _ => None,
    }
}

fn dump_impl(catalog: &dyn Catalog, ast: &AstNode, string: &mut String) {
    match ast {
        AstNode::Number { num, scripts } => {
            match num {
                Numeral::Float(value) => string.push_str(&value.to_string()),
                Numeral::Exact(text) => string.push_str(text),
            }
            dump_scripts(catalog, scripts, string);
        }
        AstNode::Symbol { name, scripts, .. } => {
            string.push_str(name);
            dump_scripts(catalog, scripts, string);
        }
        AstNode::Text { content } => {
            string.push('"');
            string.push_str(content);
            string.push('"');
        }
        AstNode::Group {
            inner,
            fence,
            scripts,
        } => {
            let glyph = |glyph: &str| if glyph == "." { String::new() } else { glyph.to_string() };
            string.push_str(&glyph(&fence.open));
            dump_impl(catalog, inner, string);
            string.push_str(&glyph(&fence.close));
            dump_scripts(catalog, scripts, string);
        }
        AstNode::Binary {
            op,
            lhs,
            rhs,
            scripts,
        } => {
            if !scripts.is_empty() {
                string.push('(');
            }
            dump_operand(catalog, op, lhs.as_deref(), string);
            string.push_str(op);
            dump_operand(catalog, op, rhs.as_deref(), string);
            if !scripts.is_empty() {
                string.push(')');
                dump_scripts(catalog, scripts, string);
            }
        }
        AstNode::Unary {
            op,
            fixity,
            operand,
        } => {
            let operand = operand.as_deref();
            let bracket = operand.map_or(false, |operand| !is_atomic(operand));
            match (fixity, postfix_mark(op)) {
                (Fixity::Postfix, Some(mark)) => {
                    if let Some(operand) = operand {
                        dump_atomic(catalog, operand, bracket, string);
                    }
                    string.push_str(mark);
                }
                _ if catalog.is_function(op) => {
                    string.push_str(op);
                    string.push('(');
                    if let Some(operand) = operand {
                        dump_impl(catalog, operand, string);
                    }
                    string.push(')');
                }
                _ => {
                    string.push_str(op);
                    if let Some(operand) = operand {
                        dump_atomic(catalog, operand, bracket, string);
                    }
                }
            }
        }
        AstNode::Call {
            name,
            args,
            scripts,
            ..
        } => {
            match (postfix_mark(name), args.as_slice()) {
                (Some(mark), [arg]) => {
                    dump_atomic(catalog, arg, !is_atomic(arg), string);
                    string.push_str(mark);
                }
                _ => {
                    string.push_str(name);
                    string.push('(');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            string.push_str(", ");
                        }
                        dump_impl(catalog, arg, string);
                    }
                    string.push(')');
                }
            }
            dump_scripts(catalog, scripts, string);
        }
        AstNode::Fraction {
            numerator,
            denominator,
            scripts,
        } => {
            let compound = !scripts.is_empty();
            if compound {
                string.push('(');
            }
            dump_atomic(catalog, numerator, !is_atomic(numerator), string);
            string.push('/');
            dump_atomic(catalog, denominator, !is_atomic(denominator), string);
            if compound {
                string.push(')');
                dump_scripts(catalog, scripts, string);
            }
        }
        AstNode::Root { radicand, index } => match index {
            None => {
                string.push_str("sqrt(");
                dump_impl(catalog, radicand, string);
                string.push(')');
            }
            Some(index) => {
                string.push_str("root(");
                dump_impl(catalog, radicand, string);
                string.push_str(", ");
                dump_impl(catalog, index, string);
                string.push(')');
            }
        },
        AstNode::Complex {
            re, im, scripts, ..
        } => {
            string.push('(');
            string.push_str(&re.to_string());
            if *im >= 0.0 {
                string.push('+');
            }
            string.push_str(&im.to_string());
            string.push_str("i)");
            dump_scripts(catalog, scripts, string);
        }
        AstNode::Error { placeholder, .. } => {
            string.push('?');
            string.push_str(placeholder);
            string.push('?');
        }
    }
}

/// Compact infix text with the precedences of the given catalog
pub fn dump_with(catalog: &dyn Catalog, ast: &AstNode) -> String {
    let mut string = String::new();
    dump_impl(catalog, ast, &mut string);
    string
}

pub fn dump(ast: &AstNode) -> String {
    dump_with(&Context::standard(), ast)
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", dump(self))
    }
}

#[cfg(test)]
mod e2e {
    use super::*;
    use crate::parser::{lexer::tokenize, parse};

    fn reprint(source: &str) -> String {
        let context = Context::standard();
        let atoms = tokenize(source).unwrap();
        parse(&context, &atoms).unwrap().to_string()
    }

    #[test]
    fn infix_simple() {
        assert_eq!(reprint("a+b"), "a+b");
    }

    #[test]
    fn infix_precedence() {
        assert_eq!(reprint("2+3*4"), "2+3*4");
        assert_eq!(reprint("2x"), "2*x");
    }

    #[test]
    fn infix_parenthesis() {
        assert_eq!(reprint("(a+b)*c"), "(a+b)*c");
        let ast = AstNode::binary("*", AstNode::binary("+", AstNode::symbol("a"), AstNode::symbol("b")), AstNode::symbol("c"));
        assert_eq!(ast.to_string(), "(a+b)*c");
    }

    #[test]
    fn functions() {
        assert_eq!(reprint("|x|"), "abs(x)");
        assert_eq!(reprint("\\sqrt{x}"), "sqrt(x)");
        assert_eq!(reprint("\\sin x"), "sin(x)");
    }

    #[test]
    fn postfix_with_infix() {
        assert_eq!(reprint("(a+b)!"), "(a+b)!");
        assert_eq!(reprint("5!!"), "5!!");
    }

    #[test]
    fn scripts() {
        assert_eq!(reprint("x^{2}"), "x^2");
        assert_eq!(reprint("x_{i+1}"), "x_(i+1)");
    }

    #[test]
    fn errors() {
        assert_eq!(reprint("x)"), "x*?)?");
    }
}
