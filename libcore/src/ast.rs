use crate::context::Catalog;
use std::f64::consts::{E, PI};

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// A numeric literal. Exact text (`"3/4"`, `"0.1"`) survives parsing untouched
/// and is only evaluated on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Numeral {
    Float(f64),
    Exact(String),
}

impl Numeral {
    pub fn value(&self) -> f64 {
        match self {
            Numeral::Float(value) => *value,
            Numeral::Exact(text) => match text.split_once('/') {
                Some((numerator, denominator)) => {
                    match (
                        numerator.trim().parse::<f64>(),
                        denominator.trim().parse::<f64>(),
                    ) {
                        (Ok(n), Ok(d)) => n / d,
                        _ => f64::NAN,
                    }
                }
                None => text.trim().parse::<f64>().unwrap_or(f64::NAN),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scripts {
    pub sup: Option<Box<AstNode>>,
    pub sub: Option<Box<AstNode>>,
}

impl Scripts {
    pub fn none() -> Scripts {
        Scripts::default()
    }

    pub fn sup(node: AstNode) -> Scripts {
        Scripts {
            sup: Some(Box::new(node)),
            sub: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sup.is_none() && self.sub.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
    pub open: String,
    pub close: String,
}

impl Fence {
    pub fn new(open: &str, close: &str) -> Fence {
        Fence {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

impl Default for Fence {
    fn default() -> Fence {
        Fence::new("(", ")")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fixity {
    Prefix,
    Postfix,
}

/// Style of a symbol, as selected by `\mathbb` and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Normal,
    DoubleStruck,
    Bold,
    Script,
    Fraktur,
    SansSerif,
    Monospace,
}

impl Variant {
    pub fn from_family(family: &str) -> Option<Variant> {
        match family.trim().trim_start_matches('\\') {
            "mathrm" => Some(Variant::Normal),
            "mathbb" => Some(Variant::DoubleStruck),
            "mathbf" => Some(Variant::Bold),
            "mathcal" | "mathscr" => Some(Variant::Script),
            "mathfrak" => Some(Variant::Fraktur),
            "mathsf" => Some(Variant::SansSerif),
            "mathtt" => Some(Variant::Monospace),
            _ => None,
        }
    }

    pub fn command(self) -> &'static str {
        match self {
            Variant::Normal => "\\mathrm",
            Variant::DoubleStruck => "\\mathbb",
            Variant::Bold => "\\mathbf",
            Variant::Script => "\\mathscr",
            Variant::Fraktur => "\\mathfrak",
            Variant::SansSerif => "\\mathsf",
            Variant::Monospace => "\\mathtt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    Number {
        num: Numeral,
        scripts: Scripts,
    },
    Symbol {
        name: String,
        variant: Option<Variant>,
        scripts: Scripts,
    },
    Text {
        content: String,
    },
    Group {
        inner: Box<AstNode>,
        fence: Fence,
        scripts: Scripts,
    },
    /// Operands are optional so that incomplete input like `2+` survives.
    Binary {
        op: String,
        lhs: Option<Box<AstNode>>,
        rhs: Option<Box<AstNode>>,
        scripts: Scripts,
    },
    Unary {
        op: String,
        fixity: Fixity,
        operand: Option<Box<AstNode>>,
    },
    Call {
        name: String,
        args: Vec<AstNode>,
        fence: Option<Fence>,
        scripts: Scripts,
    },
    Fraction {
        numerator: Box<AstNode>,
        denominator: Box<AstNode>,
        scripts: Scripts,
    },
    Root {
        radicand: Box<AstNode>,
        index: Option<Box<AstNode>>,
    },
    Complex {
        re: f64,
        im: f64,
        fence: Option<Fence>,
        scripts: Scripts,
    },
    Error {
        placeholder: String,
        message: String,
    },
}

impl AstNode {
    pub fn number(value: f64) -> AstNode {
        AstNode::Number {
            num: Numeral::Float(value),
            scripts: Scripts::none(),
        }
    }

    pub fn exact(text: &str) -> AstNode {
        AstNode::Number {
            num: Numeral::Exact(text.to_string()),
            scripts: Scripts::none(),
        }
    }

    pub fn symbol(name: &str) -> AstNode {
        AstNode::Symbol {
            name: name.to_string(),
            variant: None,
            scripts: Scripts::none(),
        }
    }

    pub fn text(content: &str) -> AstNode {
        AstNode::Text {
            content: content.to_string(),
        }
    }

    pub fn group(inner: AstNode) -> AstNode {
        AstNode::Group {
            inner: Box::new(inner),
            fence: Fence::default(),
            scripts: Scripts::none(),
        }
    }

    pub fn fenced(inner: AstNode, open: &str, close: &str) -> AstNode {
        AstNode::Group {
            inner: Box::new(inner),
            fence: Fence::new(open, close),
            scripts: Scripts::none(),
        }
    }

    pub fn binary(op: &str, lhs: AstNode, rhs: AstNode) -> AstNode {
        AstNode::partial_binary(op, Some(lhs), Some(rhs))
    }

    pub fn partial_binary(op: &str, lhs: Option<AstNode>, rhs: Option<AstNode>) -> AstNode {
        AstNode::Binary {
            op: op.to_string(),
            lhs: lhs.map(Box::new),
            rhs: rhs.map(Box::new),
            scripts: Scripts::none(),
        }
    }

    pub fn prefix(op: &str, operand: Option<AstNode>) -> AstNode {
        AstNode::Unary {
            op: op.to_string(),
            fixity: Fixity::Prefix,
            operand: operand.map(Box::new),
        }
    }

    pub fn postfix(op: &str, operand: Option<AstNode>) -> AstNode {
        AstNode::Unary {
            op: op.to_string(),
            fixity: Fixity::Postfix,
            operand: operand.map(Box::new),
        }
    }

    pub fn call(name: &str, args: Vec<AstNode>) -> AstNode {
        AstNode::Call {
            name: name.to_string(),
            args,
            fence: None,
            scripts: Scripts::none(),
        }
    }

    pub fn fraction(numerator: AstNode, denominator: AstNode) -> AstNode {
        AstNode::Fraction {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
            scripts: Scripts::none(),
        }
    }

    pub fn root(radicand: AstNode, index: Option<AstNode>) -> AstNode {
        AstNode::Root {
            radicand: Box::new(radicand),
            index: index.map(Box::new),
        }
    }

    pub fn complex(re: f64, im: f64) -> AstNode {
        AstNode::Complex {
            re,
            im,
            fence: None,
            scripts: Scripts::none(),
        }
    }

    pub fn error(placeholder: &str, message: &str) -> AstNode {
        AstNode::Error {
            placeholder: placeholder.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns the same node carrying the given superscript
    pub fn with_sup(mut self, sup: AstNode) -> AstNode {
        if let Some(scripts) = self.scripts_mut() {
            scripts.sup = Some(Box::new(sup));
        }
        self
    }

    pub fn with_sub(mut self, sub: AstNode) -> AstNode {
        if let Some(scripts) = self.scripts_mut() {
            scripts.sub = Some(Box::new(sub));
        }
        self
    }

    /// `None` for variants which can not carry an attachment
    pub fn scripts(&self) -> Option<&Scripts> {
        match self {
            AstNode::Number { scripts, .. }
            | AstNode::Symbol { scripts, .. }
            | AstNode::Group { scripts, .. }
            | AstNode::Binary { scripts, .. }
            | AstNode::Call { scripts, .. }
            | AstNode::Fraction { scripts, .. }
            | AstNode::Complex { scripts, .. } => Some(scripts),
            _ => None,
        }
    }

    pub fn scripts_mut(&mut self) -> Option<&mut Scripts> {
        match self {
            AstNode::Number { scripts, .. }
            | AstNode::Symbol { scripts, .. }
            | AstNode::Group { scripts, .. }
            | AstNode::Binary { scripts, .. }
            | AstNode::Call { scripts, .. }
            | AstNode::Fraction { scripts, .. }
            | AstNode::Complex { scripts, .. } => Some(scripts),
            _ => None,
        }
    }

    pub fn has_scripts(&self) -> bool {
        self.scripts().map_or(false, |scripts| !scripts.is_empty())
    }

    /// Name of the top-level infix operator, if any
    pub fn operator(&self) -> Option<&str> {
        match self {
            AstNode::Binary { op, .. } => Some(op),
            AstNode::Fraction { .. } => Some("/"),
            _ => None,
        }
    }

    /// Float value of a literal or of one of the built-in constants
    pub fn as_number(&self, catalog: &dyn Catalog) -> Option<f64> {
        match self {
            AstNode::Number { num, .. } => Some(num.value()),
            AstNode::Symbol { name, .. } => constant(name).or_else(|| {
                self.as_symbol(catalog)
                    .and_then(|latex| constant(&latex))
            }),
            _ => None,
        }
    }

    /// Identifier name in its catalog spelling
    pub fn as_symbol(&self, catalog: &dyn Catalog) -> Option<String> {
        match self {
            AstNode::Symbol { name, .. } => {
                Some(catalog.latex_for_symbol(name).unwrap_or_else(|| name.clone()))
            }
            _ => None,
        }
    }

    pub fn is_numeric(&self, catalog: &dyn Catalog) -> bool {
        self.as_number(catalog).is_some()
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|child| child.size()).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Direct sub trees including scripts
    pub fn children(&self) -> Vec<&AstNode> {
        let mut children: Vec<&AstNode> = match self {
            AstNode::Group { inner, .. } => vec![&**inner],
            AstNode::Binary { lhs, rhs, .. } => {
                lhs.iter().chain(rhs.iter()).map(|c| &**c).collect()
            }
            AstNode::Unary { operand, .. } => operand.iter().map(|c| &**c).collect(),
            AstNode::Call { args, .. } => args.iter().collect(),
            AstNode::Fraction {
                numerator,
                denominator,
                ..
            } => vec![&**numerator, &**denominator],
            AstNode::Root { radicand, index } => {
                let mut children: Vec<&AstNode> = vec![&**radicand];
                children.extend(index.iter().map(|c| &**c));
                children
            }
            _ => vec![],
        };
        if let Some(scripts) = self.scripts() {
            children.extend(scripts.sup.iter().map(|c| &**c));
            children.extend(scripts.sub.iter().map(|c| &**c));
        }
        children
    }

    pub fn contains_error(&self) -> bool {
        match self {
            AstNode::Error { .. } => true,
            _ => self.children().iter().any(|child| child.contains_error()),
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "π" | "\\pi" => Some(PI),
        "τ" | "\\tau" => Some(2.0 * PI),
        "ℯ" | "ⅇ" | "e" | "\\exponentialE" => Some(E),
        "ϕ" | "\\phi" => Some(GOLDEN_RATIO),
        _ => None,
    }
}

#[cfg(test)]
mod specs {
    use super::*;
    use crate::context::Context;

    #[test]
    fn numerals() {
        assert_eq!(Numeral::Exact("3/4".to_string()).value(), 0.75);
        assert_eq!(Numeral::Exact("1.5".to_string()).value(), 1.5);
        assert!(Numeral::Exact("1.2.3".to_string()).value().is_nan());
    }

    #[test]
    fn as_number_constants() {
        let context = Context::standard();
        assert_eq!(AstNode::symbol("π").as_number(&context), Some(PI));
        assert_eq!(AstNode::symbol("\\tau").as_number(&context), Some(2.0 * PI));
        assert_eq!(AstNode::symbol("e").as_number(&context), Some(E));
        assert_eq!(AstNode::symbol("x").as_number(&context), None);
        assert_eq!(AstNode::number(2.5).as_number(&context), Some(2.5));
        assert!(!AstNode::text("pi").is_numeric(&context));
    }

    #[test]
    fn as_symbol_uses_catalog() {
        let context = Context::standard();
        assert_eq!(
            AstNode::symbol("α").as_symbol(&context),
            Some("\\alpha".to_string())
        );
        assert_eq!(AstNode::symbol("x").as_symbol(&context), Some("x".to_string()));
        assert_eq!(AstNode::number(1.0).as_symbol(&context), None);
    }

    #[test]
    fn scripts_only_on_capable_nodes() {
        let root = AstNode::root(AstNode::symbol("x"), None).with_sup(AstNode::number(2.0));
        assert!(!root.has_scripts());
        let symbol = AstNode::symbol("x").with_sup(AstNode::number(2.0));
        assert!(symbol.has_scripts());
    }

    #[test]
    fn size_and_depth() {
        let tree = AstNode::binary(
            "+",
            AstNode::number(2.0),
            AstNode::binary("*", AstNode::number(3.0), AstNode::number(4.0)),
        );
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 3);
        assert!(!tree.contains_error());
    }
}
