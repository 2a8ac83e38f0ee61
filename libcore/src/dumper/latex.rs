use super::base::{encloses_argument, fill_template, is_postfix_shaped, Slots};
use crate::ast::{AstNode, Fence, Fixity, Scripts};
use crate::context::{Catalog, Context};
use crate::format::{format, format_numeral, FormatOptions};

/// Magnitudes below this are treated as zero when rendering complex numbers
const COMPLEX_EPSILON: f64 = 1e-14;

const ERROR_HIGHLIGHT: &str = "\\bbox[#F56165]";

pub trait LaTeX {
    fn write_latex<W>(&self, writer: &mut W) -> Result<(), std::io::Error>
    where
        W: std::io::Write;

    fn writeln_latex<W>(&self, writer: &mut W) -> Result<(), std::io::Error>
    where
        W: std::io::Write;
}

struct Serializer<'a> {
    catalog: &'a dyn Catalog,
    options: &'a FormatOptions,
}

/// Renders a tree as LaTeX. Never fails, shapes without a rendering produce empty text.
pub fn render(catalog: &dyn Catalog, ast: &AstNode, options: &FormatOptions) -> String {
    Serializer { catalog, options }.node(ast)
}

pub fn dump_latex(ast: &AstNode) -> String {
    render(&Context::standard(), ast, &FormatOptions::default())
}

/// Functions whose single simple argument is written without parentheses
fn is_optional_paren(name: &str) -> bool {
    if matches!(name, "factorial" | "factorial2" | "ln" | "log" | "lb") {
        return true;
    }
    let name = name
        .strip_prefix("arc")
        .or_else(|| name.strip_prefix("ar"))
        .unwrap_or(name);
    let name = name.strip_suffix('h').unwrap_or(name);
    matches!(name, "sin" | "cos" | "tan" | "cot" | "sec" | "csc")
}

fn is_simple_argument(ast: &AstNode) -> bool {
    match ast {
        AstNode::Number { .. } | AstNode::Symbol { .. } | AstNode::Fraction { .. } => true,
        AstNode::Binary { op, .. } => op == "/",
        AstNode::Root { index, .. } => index.is_none(),
        AstNode::Call { name, .. } => name == "sqrt",
        _ => false,
    }
}

/// `&#x3b1;` and `&#945;` as used by some symbol tables
fn decode_entity(text: &str) -> Option<char> {
    let code = text.strip_prefix("&#")?.strip_suffix(';')?;
    let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    std::char::from_u32(value)
}

/// Parentheses written around an argument are supplied again by the call.
fn unwrap_group(ast: &AstNode) -> &AstNode {
    match ast {
        AstNode::Group {
            inner,
            fence,
            scripts,
        } if *fence == Fence::default() && scripts.is_empty() => &**inner,
        ast => ast,
    }
}

fn fence_glyph(glyph: &str) -> &str {
    match glyph {
        "." => "",
        "{" => "\\{",
        "}" => "\\}",
        glyph => glyph,
    }
}

fn wrap(fence: &Fence, body: &str) -> String {
    format!(
        "{}{}{}",
        fence_glyph(&fence.open),
        body,
        fence_glyph(&fence.close)
    )
}

fn parenthesize(body: &str) -> String {
    format!("({})", body)
}

impl<'a> Serializer<'a> {
    fn node(&self, ast: &AstNode) -> String {
        match ast {
            AstNode::Number { num, scripts } => {
                let mut text = format_numeral(num, self.options);
                if text.starts_with('-') && scripts.sup.is_some() {
                    text = parenthesize(&text);
                }
                self.decorate(text, scripts)
            }
            AstNode::Symbol {
                name,
                variant,
                scripts,
            } => {
                let symbol = ast.as_symbol(self.catalog).unwrap_or_else(|| name.clone());
                let symbol = match decode_entity(&symbol) {
                    Some(c) => c.to_string(),
                    None => symbol,
                };
                let text = match variant {
                    Some(variant) => format!("{}{{{}}}", variant.command(), symbol),
                    None => symbol,
                };
                self.decorate(text, scripts)
            }
            AstNode::Text { content } => format!("\\text{{{}}}", content),
            AstNode::Group {
                inner,
                fence,
                scripts,
            } => self.group(inner, fence, scripts),
            AstNode::Binary {
                op,
                lhs,
                rhs,
                scripts,
            } => self.binary(op, lhs.as_deref(), rhs.as_deref(), scripts),
            AstNode::Unary {
                op,
                fixity,
                operand,
            } => self.unary(op, *fixity, operand.as_deref()),
            AstNode::Call {
                name,
                args,
                fence,
                scripts,
            } => self.call(name, args, fence.as_ref(), scripts),
            AstNode::Fraction {
                numerator,
                denominator,
                scripts,
            } => {
                let text = format!(
                    "\\frac{{{}}}{{{}}}",
                    self.node(numerator),
                    self.node(denominator)
                );
                self.decorate(text, scripts)
            }
            AstNode::Root { radicand, index } => match index {
                None => format!("\\sqrt{{{}}}", self.node(radicand)),
                Some(index) => format!(
                    "\\sqrt[{}]{{{}}}",
                    self.node(index),
                    self.node(radicand)
                ),
            },
            AstNode::Complex {
                re,
                im,
                fence,
                scripts,
            } => self.complex(*re, *im, fence.as_ref(), scripts),
            AstNode::Error { placeholder, .. } => {
                format!("{}{{{}}}", ERROR_HIGHLIGHT, placeholder)
            }
        }
    }

    fn decorate(&self, text: String, scripts: &Scripts) -> String {
        let mut text = text;
        if let Some(sup) = &scripts.sup {
            text.push_str(&format!("^{{{}}}", self.node(sup)));
        }
        if let Some(sub) = &scripts.sub {
            text.push_str(&format!("_{{{}}}", self.node(sub)));
        }
        text
    }

    fn is_atomic(&self, ast: &AstNode) -> bool {
        !ast.has_scripts()
            && (ast.is_numeric(self.catalog) || ast.as_symbol(self.catalog).is_some())
    }

    fn group(&self, inner: &AstNode, fence: &Fence, scripts: &Scripts) -> String {
        let body = self.node(inner);
        let text = if fence.open == "." && fence.close == "." {
            if scripts.is_empty() {
                body
            } else {
                format!("{{{}}}", body)
            }
        } else if self.is_atomic(inner) && *fence == Fence::default() {
            body
        } else {
            wrap(fence, &body)
        };
        self.decorate(text, scripts)
    }

    fn precedence(&self, ast: &AstNode) -> Option<u32> {
        ast.operator().and_then(|op| self.catalog.precedence(op))
    }

    /// Fences an operand whose operator binds looser than its parent.
    fn operand(&self, parent: &str, ast: Option<&AstNode>, right: bool) -> String {
        let ast = match ast {
            Some(ast) => ast,
            None => return String::new(),
        };
        let text = self.node(ast);
        let looser = match (self.precedence(ast), self.catalog.precedence(parent)) {
            (Some(child), Some(parent)) => child < parent,
            _ => false,
        };
        let signed = right
            && match ast {
                AstNode::Number { num, .. } => num.value() < 0.0,
                AstNode::Unary {
                    fixity: Fixity::Prefix,
                    op,
                    ..
                } => op == "-" || op == "+",
                _ => false,
            };
        if looser || signed {
            parenthesize(&text)
        } else {
            text
        }
    }

    fn binary(
        &self,
        op: &str,
        lhs: Option<&AstNode>,
        rhs: Option<&AstNode>,
        scripts: &Scripts,
    ) -> String {
        if op == "/" {
            let text = format!(
                "\\frac{{{}}}{{{}}}",
                lhs.map(|lhs| self.node(lhs)).unwrap_or_default(),
                rhs.map(|rhs| self.node(rhs)).unwrap_or_default()
            );
            return self.decorated_expression(text, scripts);
        }
        let left = self.operand(op, lhs, false);
        let right = self.operand(op, rhs, true);
        let template = if op == "*" {
            format!("%0 {} %1", self.options.product.trim_end())
        } else {
            self.catalog.latex_template_for_operator(op)
        };
        let text = fill_template(
            &template,
            &Slots {
                argument: &left,
                operands: [&left, &right],
                sup: None,
                sub: None,
            },
        );
        self.decorated_expression(text, scripts)
    }

    /// Scripts on a compound expression apply to all of it.
    fn decorated_expression(&self, text: String, scripts: &Scripts) -> String {
        if scripts.is_empty() {
            text
        } else {
            self.decorate(parenthesize(&text), scripts)
        }
    }

    fn unary(&self, op: &str, fixity: Fixity, operand: Option<&AstNode>) -> String {
        let argument = match operand {
            None => String::new(),
            Some(operand) => {
                let operand = unwrap_group(operand);
                let text = self.node(operand);
                let compound = match operand {
                    AstNode::Binary { .. } => true,
                    operand => fixity == Fixity::Postfix && !is_simple_argument(operand),
                };
                if compound {
                    parenthesize(&text)
                } else {
                    text
                }
            }
        };
        let template = if self.catalog.is_function(op) {
            self.catalog.latex_template_for_function(op)
        } else {
            match fixity {
                Fixity::Prefix => self.catalog.latex_template_for_operator(op),
                Fixity::Postfix => format!("%{}", op),
            }
        };
        fill_template(
            &template,
            &Slots {
                argument: &argument,
                operands: ["", &argument],
                sup: None,
                sub: None,
            },
        )
    }

    fn call(&self, name: &str, args: &[AstNode], fence: Option<&Fence>, scripts: &Scripts) -> String {
        let default_fence = Fence::default();
        let fence = fence.unwrap_or(&default_fence);
        if name == "pow" && args.len() >= 2 {
            let base = unwrap_group(&args[0]);
            let base_text = self.node(base);
            let base = if self.is_atomic(base) {
                base_text
            } else {
                wrap(fence, &base_text)
            };
            let text = format!("{}^{{{}}}", base, self.node(&args[1]));
            return self.decorate(text, scripts);
        }

        let template = self.catalog.latex_template_for_function(name);
        let args: Vec<&AstNode> = args.iter().map(unwrap_group).collect();
        let joined = args
            .iter()
            .map(|arg| self.node(arg))
            .collect::<Vec<String>>()
            .join(", ");
        let argument = if encloses_argument(&template) {
            joined
        } else if args.len() == 1 && (is_optional_paren(name) || is_postfix_shaped(&template)) {
            if is_simple_argument(args[0]) {
                joined
            } else if template.ends_with('%') || is_postfix_shaped(&template) {
                wrap(fence, &joined)
            } else {
                joined
            }
        } else {
            wrap(fence, &joined)
        };

        let sup = scripts.sup.as_ref().map(|sup| self.node(sup));
        let sub = scripts.sub.as_ref().map(|sub| self.node(sub));
        fill_template(
            &template,
            &Slots {
                argument: &argument,
                operands: [&argument, ""],
                sup: sup.as_deref(),
                sub: sub.as_deref(),
            },
        )
    }

    fn complex(&self, re: f64, im: f64, fence: Option<&Fence>, scripts: &Scripts) -> String {
        let significant = |value: f64| value.abs() > COMPLEX_EPSILON;
        let mut text = String::new();
        let mut both = false;
        if !significant(re) && !significant(im) {
            text.push('0');
        } else {
            if significant(re) {
                text.push_str(&format(re, self.options));
            }
            if significant(im) {
                if significant(re) {
                    both = true;
                    if im > 0.0 {
                        text.push('+');
                    }
                }
                if im == -1.0 {
                    text.push('-');
                } else if im != 1.0 {
                    text.push_str(&format(im, self.options));
                }
                text.push_str("\\imaginaryI ");
            }
        }
        if both && scripts.sup.is_some() {
            let default_fence = Fence::default();
            text = wrap(fence.unwrap_or(&default_fence), &text);
        }
        self.decorate(text, scripts)
    }
}

impl LaTeX for AstNode {
    fn write_latex<W>(&self, writer: &mut W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        write!(writer, "{}", dump_latex(self))
    }

    fn writeln_latex<W>(&self, writer: &mut W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        writeln!(writer, "{}", dump_latex(self))
    }
}

#[cfg(test)]
mod e2e {
    use super::*;
    use crate::ast::Variant;
    use crate::parser::{lexer::tokenize, parse};

    fn latex(source: &str) -> String {
        let context = Context::standard();
        let atoms = tokenize(source).unwrap();
        let ast = parse(&context, &atoms).unwrap();
        render(&context, &ast, &FormatOptions::default())
    }

    fn num(value: f64) -> AstNode {
        AstNode::number(value)
    }

    fn sym(name: &str) -> AstNode {
        AstNode::symbol(name)
    }

    #[test]
    fn infix_precedence() {
        assert_eq!(latex("a+b*c"), "a+b \\cdot c");
        assert_eq!(latex("(a+b)*c"), "(a+b) \\cdot c");
    }

    #[test]
    fn operand_fencing_from_tree() {
        let ast = AstNode::binary(
            "*",
            AstNode::binary("+", sym("a"), sym("b")),
            sym("c"),
        );
        assert_eq!(dump_latex(&ast), "(a+b) \\cdot c");
        let ast = AstNode::binary("-", sym("a"), num(-2.0));
        assert_eq!(dump_latex(&ast), "a-(-2)");
    }

    #[test]
    fn argument_fences() {
        // Templates enclosing their argument need no extra fence
        assert_eq!(latex("|x+1|"), "\\left|x+1\\right|");
        assert_eq!(latex("\\lfloor x\\rfloor"), "\\left\\lfloor x\\right\\rfloor");
        // Postfix marks fence compound arguments only
        assert_eq!(latex("x'"), "x'");
        assert_eq!(latex("(x+1)'"), "(x+1)'");
        assert_eq!(latex("(a+b)!"), "(a+b)!");
        // Everything else is fenced
        assert_eq!(latex("\\exp x"), "\\exp (x)");
        assert_eq!(latex("2f(x)"), "2 \\cdot f(x)");
    }

    #[test]
    fn division_is_fraction() {
        assert_eq!(latex("1/2"), "\\frac{1}{2}");
        assert_eq!(latex("\\frac{x}{y}^2"), "\\frac{x}{y}^{2}");
    }

    #[test]
    fn groups_of_atoms_drop_fences() {
        assert_eq!(latex("(x)"), "x");
        assert_eq!(latex("(2)"), "2");
        assert_eq!(latex("\\left[x\\right]"), "[x]");
        assert_eq!(dump_latex(&AstNode::fenced(sym("x"), "{", "}")), "\\{x\\}");
        assert_eq!(dump_latex(&AstNode::fenced(sym("x"), ".", "|")), "x|");
    }

    #[test]
    fn functions() {
        assert_eq!(latex("\\sin x"), "\\sin x");
        assert_eq!(latex("\\sin(x+1)"), "\\sin (x+1)");
        assert_eq!(latex("\\sin^2 x"), "\\sin^{2} x");
        assert_eq!(latex("\\sin^{-1} x"), "\\arcsin x");
        assert_eq!(latex("\\exp x"), "\\exp (x)");
    }

    #[test]
    fn enclosing_templates_are_not_fenced() {
        assert_eq!(latex("|x+1|"), "\\left|x+1\\right|");
        assert_eq!(latex("\\lfloor x\\rfloor^2"), "\\left\\lfloor x\\right\\rfloor^{2}");
    }

    #[test]
    fn postfix_functions() {
        assert_eq!(latex("n!"), "n!");
        assert_eq!(latex("(a+b)!"), "(a+b)!");
        assert_eq!(latex("5!!"), "5!!");
        assert_eq!(latex("x'"), "x'");
    }

    #[test]
    fn unknown_function_gets_operatorname() {
        let ast = AstNode::call("sinc", vec![sym("x")]);
        assert_eq!(dump_latex(&ast), "\\operatorname{sinc}(x)");
        let ast = AstNode::call("f", vec![sym("x"), sym("y")]);
        assert_eq!(dump_latex(&ast), "f(x, y)");
    }

    #[test]
    fn power() {
        let ast = AstNode::call("pow", vec![sym("x"), num(2.0)]);
        assert_eq!(dump_latex(&ast), "x^{2}");
        let ast = AstNode::call(
            "pow",
            vec![AstNode::binary("+", sym("x"), num(1.0)), num(2.0)],
        );
        assert_eq!(dump_latex(&ast), "(x+1)^{2}");
    }

    #[test]
    fn radicals() {
        assert_eq!(latex("\\sqrt{x}"), "\\sqrt{x}");
        let ast = AstNode::root(sym("x"), Some(num(3.0)));
        assert_eq!(dump_latex(&ast), "\\sqrt[3]{x}");
    }

    #[test]
    fn symbols() {
        assert_eq!(latex("\\alpha+\\pi"), "\\alpha+\\pi");
        assert_eq!(dump_latex(&sym("&#x3b2;")), "β");
        assert_eq!(dump_latex(&sym("&#946;")), "β");
        let ast = AstNode::Symbol {
            name: "R".to_string(),
            variant: Some(Variant::DoubleStruck),
            scripts: Scripts::none(),
        };
        assert_eq!(dump_latex(&ast), "\\mathbb{R}");
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(latex("-x"), "-x");
        assert_eq!(dump_latex(&AstNode::prefix("-", Some(AstNode::binary("+", sym("a"), sym("b"))))), "-(a+b)");
        assert_eq!(latex("\\nabla\\times F"), "\\nabla\\times F");
    }

    #[test]
    fn scripted_numbers() {
        assert_eq!(latex("2^{10}"), "2^{10}");
        assert_eq!(dump_latex(&num(-2.0).with_sup(num(2.0))), "(-2)^{2}");
    }

    #[test]
    fn relations_and_sets() {
        assert_eq!(latex("x\\leq 2"), "x\\leq 2");
        assert_eq!(latex("A\\cup B"), "A\\cup B");
    }

    #[test]
    fn complex_numbers() {
        assert_eq!(dump_latex(&AstNode::complex(0.0, 0.0)), "0");
        assert_eq!(dump_latex(&AstNode::complex(2.0, 0.0)), "2");
        assert_eq!(dump_latex(&AstNode::complex(0.0, 1.0)), "\\imaginaryI ");
        assert_eq!(dump_latex(&AstNode::complex(1.0, -1.0)), "1-\\imaginaryI ");
        assert_eq!(dump_latex(&AstNode::complex(1.0, 3.0)), "1+3\\imaginaryI ");
        assert_eq!(
            dump_latex(&AstNode::complex(1.0, 3.0).with_sup(num(2.0))),
            "(1+3\\imaginaryI )^{2}"
        );
    }

    #[test]
    fn errors_are_highlighted() {
        assert_eq!(latex("x+1)"), "(x+1) \\cdot \\bbox[#F56165]{)}");
    }

    #[test]
    fn missing_operand_renders_empty() {
        assert_eq!(latex("x+"), "x+");
    }

    #[test]
    fn custom_product() {
        let options = FormatOptions {
            product: "\\times ".to_string(),
            ..Default::default()
        };
        let ast = AstNode::binary("*", num(2.0), sym("x"));
        assert_eq!(render(&Context::standard(), &ast, &options), "2 \\times x");
    }

    #[test]
    fn repeating_decimal() {
        assert_eq!(dump_latex(&num(1.0 / 3.0)), "0.\\overline{3}");
    }

    #[test]
    fn write_to_buffer() {
        let mut buffer: Vec<u8> = Vec::new();
        sym("x").writeln_latex(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "x\n");
    }
}
