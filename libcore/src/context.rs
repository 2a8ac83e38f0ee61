//! Operator catalog: precedences, canonical names and LaTeX templates.
//!
//! Templates use `%` for the argument, `%0`/`%1` for the left and right
//! operands and `%^`/`%_` for the superscript and subscript decorations.
use crate::error::Error;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

/// Lookups the parser and the serializer depend on.
pub trait Catalog {
    fn canonical_name(&self, token: &str) -> String;
    /// `None` if the name is not an infix operator
    fn precedence(&self, name: &str) -> Option<u32>;
    fn is_function(&self, name: &str) -> bool;
    fn latex_template_for_function(&self, name: &str) -> String;
    fn latex_template_for_operator(&self, name: &str) -> String;
    fn latex_for_symbol(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub precedence: Option<u32>,
    #[serde(default)]
    pub is_function: bool,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub latex: Option<String>,
}

impl Declaration {
    pub fn operator(precedence: u32) -> Declaration {
        Declaration {
            precedence: Some(precedence),
            ..Default::default()
        }
    }

    pub fn function(template: &str) -> Declaration {
        Declaration {
            is_function: true,
            template: Some(template.to_string()),
            ..Default::default()
        }
    }

    pub fn symbol(latex: &str) -> Declaration {
        Declaration {
            latex: Some(latex.to_string()),
            ..Default::default()
        }
    }

    fn with_template(mut self, template: &str) -> Declaration {
        self.template = Some(template.to_string());
        self
    }
}

pub const P_SEPARATOR: u32 = 100;
pub const P_IMPLICATION: u32 = 120;
pub const P_LOGIC: u32 = 150;
pub const P_RELATION: u32 = 200;
pub const P_SUM: u32 = 300;
pub const P_SET: u32 = 350;
pub const P_PRODUCT: u32 = 400;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub declarations: HashMap<String, Declaration>,
    /// Alternative spellings, e.g. `\times` for `*`
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Context {
    pub fn standard() -> Context {
        let mut context = Context::default();
        context.register_standard_operators();
        context
    }

    /// Loads additional declarations and merges them over the standard catalog.
    pub fn load(filename: &str) -> Result<Context, Error> {
        let file = File::open(filename)?;
        Context::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Context, Error> {
        let custom: Context = serde_yaml::from_reader(reader)?;
        let mut context = Context::standard();
        context.merge(custom);
        Ok(context)
    }

    pub fn merge(&mut self, other: Context) {
        self.declarations.extend(other.declarations);
        self.aliases.extend(other.aliases);
    }

    pub fn declare(&mut self, name: &str, declaration: Declaration) {
        self.declarations.insert(name.to_string(), declaration);
    }

    pub fn register_standard_operators(&mut self) {
        let operators: HashMap<&str, u32> = hashmap! {
            "," => P_SEPARATOR,
            ";" => P_SEPARATOR,
            "\\Rightarrow" => P_IMPLICATION,
            "\\implies" => P_IMPLICATION,
            "\\Leftrightarrow" => P_IMPLICATION,
            "\\iff" => P_IMPLICATION,
            "\\lor" => P_LOGIC,
            "\\land" => P_LOGIC,
            "=" => P_RELATION,
            "<" => P_RELATION,
            ">" => P_RELATION,
            "\\neq" => P_RELATION,
            "\\leq" => P_RELATION,
            "\\geq" => P_RELATION,
            "\\approx" => P_RELATION,
            "\\equiv" => P_RELATION,
            "\\sim" => P_RELATION,
            "\\in" => P_RELATION,
            "\\notin" => P_RELATION,
            "\\subset" => P_RELATION,
            "\\subseteq" => P_RELATION,
            "\\rightarrow" => P_RELATION,
            "\\leftarrow" => P_RELATION,
            "+" => P_SUM,
            "-" => P_SUM,
            "\\pm" => P_SUM,
            "\\mp" => P_SUM,
            "\\cup" => P_SET,
            "\\cap" => P_SET,
            "\\setminus" => P_SET,
            "*" => P_PRODUCT,
            "/" => P_PRODUCT,
        };
        for (name, precedence) in operators {
            self.declare(name, Declaration::operator(precedence));
        }
        self.declare(",", Declaration::operator(P_SEPARATOR).with_template("%0, %1"));
        self.declare(";", Declaration::operator(P_SEPARATOR).with_template("%0; %1"));
        self.declare(
            "/",
            Declaration::operator(P_PRODUCT).with_template("\\frac{%0}{%1}"),
        );

        let functions: HashMap<&str, &str> = hashmap! {
            "sin" => "\\sin%^%_ %",
            "cos" => "\\cos%^%_ %",
            "tan" => "\\tan%^%_ %",
            "cot" => "\\cot%^%_ %",
            "sec" => "\\sec%^%_ %",
            "csc" => "\\csc%^%_ %",
            "sinh" => "\\sinh%^%_ %",
            "cosh" => "\\cosh%^%_ %",
            "tanh" => "\\tanh%^%_ %",
            "coth" => "\\coth%^%_ %",
            "sech" => "\\operatorname{sech}%^%_ %",
            "csch" => "\\operatorname{csch}%^%_ %",
            "arcsin" => "\\arcsin%^%_ %",
            "arccos" => "\\arccos%^%_ %",
            "arctan" => "\\arctan%^%_ %",
            "arccot" => "\\operatorname{arccot}%^%_ %",
            "arcsec" => "\\operatorname{arcsec}%^%_ %",
            "arccsc" => "\\operatorname{arccsc}%^%_ %",
            "arsinh" => "\\operatorname{arsinh}%^%_ %",
            "arcosh" => "\\operatorname{arcosh}%^%_ %",
            "artanh" => "\\operatorname{artanh}%^%_ %",
            "arcoth" => "\\operatorname{arcoth}%^%_ %",
            "arsech" => "\\operatorname{arsech}%^%_ %",
            "arcsch" => "\\operatorname{arcsch}%^%_ %",
            "ln" => "\\ln%^%_ %",
            "log" => "\\log%^%_ %",
            "lg" => "\\lg%^%_ %",
            "lb" => "\\operatorname{lb}%^%_ %",
            "exp" => "\\exp%^%_ %",
            "det" => "\\det%^%_ %",
            "dim" => "\\dim%^%_ %",
            "gcd" => "\\gcd%^%_ %",
            "lcm" => "\\operatorname{lcm}%^%_ %",
            "min" => "\\min%^%_ %",
            "max" => "\\max%^%_ %",
            "lim" => "\\lim%^%_ %",
            "sqrt" => "\\sqrt{%}%^%_",
            "abs" => "\\left|%\\right|%^%_",
            "norm" => "\\left\\Vert %\\right\\Vert%^%_",
            "floor" => "\\left\\lfloor %\\right\\rfloor%^%_",
            "ceil" => "\\left\\lceil %\\right\\rceil%^%_",
            "angle" => "\\left\\langle %\\right\\rangle%^%_",
            "ucorner" => "\\left\\ulcorner %\\right\\urcorner%^%_",
            "lcorner" => "\\left\\llcorner %\\right\\lrcorner%^%_",
            "group" => "\\left\\lgroup %\\right\\rgroup%^%_",
            "moustache" => "\\left\\lmoustache %\\right\\rmoustache%^%_",
            "brace" => "\\left\\lbrace %\\right\\rbrace%^%_",
            "factorial" => "%!",
            "factorial2" => "%!!",
            "dagger" => "%\\dagger",
            "dagger2" => "%\\ddagger",
            "maltese" => "%\\maltese",
            "backprime" => "%\\backprime",
            "backprime2" => "%\\backprime\\backprime",
            "prime" => "%'",
            "prime2" => "%''",
            "degree" => "%\\degree",
            "$" => "%\\$",
            "%" => "%\\%",
            "_" => "%\\_",
            "sum" => "\\sum%^%_ %",
            "prod" => "\\prod%^%_ %",
            "coprod" => "\\coprod%^%_ %",
            "int" => "\\int%^%_ %",
            "oint" => "\\oint%^%_ %",
            "curl" => "\\nabla\\times %",
            "div" => "\\nabla\\cdot %",
        };
        for (name, template) in functions {
            self.declare(name, Declaration::function(template));
        }

        let symbols: HashMap<&str, &str> = hashmap! {
            "α" => "\\alpha",
            "β" => "\\beta",
            "γ" => "\\gamma",
            "δ" => "\\delta",
            "ε" => "\\epsilon",
            "ζ" => "\\zeta",
            "η" => "\\eta",
            "θ" => "\\theta",
            "ι" => "\\iota",
            "κ" => "\\kappa",
            "λ" => "\\lambda",
            "μ" => "\\mu",
            "ν" => "\\nu",
            "ξ" => "\\xi",
            "π" => "\\pi",
            "ρ" => "\\rho",
            "σ" => "\\sigma",
            "τ" => "\\tau",
            "ϕ" => "\\phi",
            "φ" => "\\varphi",
            "υ" => "\\upsilon",
            "χ" => "\\chi",
            "ψ" => "\\psi",
            "ω" => "\\omega",
            "Γ" => "\\Gamma",
            "Δ" => "\\Delta",
            "Θ" => "\\Theta",
            "Λ" => "\\Lambda",
            "Π" => "\\Pi",
            "Σ" => "\\Sigma",
            "Φ" => "\\Phi",
            "Ψ" => "\\Psi",
            "Ω" => "\\Omega",
            "∞" => "\\infty",
            "∇" => "\\nabla",
            "∂" => "\\partial",
            "ℓ" => "\\ell",
            "∅" => "\\emptyset",
        };
        for (name, latex) in symbols {
            self.declare(name, Declaration::symbol(latex));
        }

        let aliases: HashMap<&str, &str> = hashmap! {
            "\\cdot" => "*",
            "\\times" => "*",
            "\\ast" => "*",
            "⋅" => "*",
            "×" => "*",
            "−" => "-",
            "\\div" => "/",
            "÷" => "/",
            "\\ne" => "\\neq",
            "≠" => "\\neq",
            "\\le" => "\\leq",
            "≤" => "\\leq",
            "\\ge" => "\\geq",
            "≥" => "\\geq",
            "\\lt" => "<",
            "\\gt" => ">",
            "\\to" => "\\rightarrow",
            "\\gets" => "\\leftarrow",
            "\\wedge" => "\\land",
            "\\vee" => "\\lor",
        };
        for (alias, name) in aliases {
            self.aliases.insert(alias.to_string(), name.to_string());
        }
    }
}

impl Catalog for Context {
    fn canonical_name(&self, token: &str) -> String {
        let token = token.trim();
        if let Some(name) = self.aliases.get(token) {
            return name.clone();
        }
        if let Some(name) = token.strip_prefix('\\') {
            if self.is_function(name) {
                return name.to_string();
            }
        }
        token.to_string()
    }

    fn precedence(&self, name: &str) -> Option<u32> {
        self.declarations
            .get(name)
            .and_then(|declaration| declaration.precedence)
    }

    fn is_function(&self, name: &str) -> bool {
        match self.declarations.get(name) {
            None => false,
            Some(declaration) => declaration.is_function,
        }
    }

    fn latex_template_for_function(&self, name: &str) -> String {
        match self
            .declarations
            .get(name)
            .and_then(|declaration| declaration.template.as_ref())
        {
            Some(template) => template.clone(),
            None if name.chars().count() == 1 => format!("{}%^%_%", name),
            None => format!("\\operatorname{{{}}}%^%_%", name),
        }
    }

    fn latex_template_for_operator(&self, name: &str) -> String {
        if let Some(template) = self
            .declarations
            .get(name)
            .and_then(|declaration| declaration.template.as_ref())
        {
            return template.clone();
        }
        let glyph = self
            .latex_for_symbol(name)
            .unwrap_or_else(|| name.to_string());
        if glyph.starts_with('\\') {
            format!("%0{} %1", glyph)
        } else {
            format!("%0{}%1", glyph)
        }
    }

    fn latex_for_symbol(&self, name: &str) -> Option<String> {
        self.declarations
            .get(name)
            .and_then(|declaration| declaration.latex.clone())
    }
}

#[cfg(test)]
mod specs {
    use super::*;
    use stringreader::StringReader;

    #[test]
    fn canonical_aliases() {
        let context = Context::standard();
        assert_eq!(context.canonical_name("\\times"), "*");
        assert_eq!(context.canonical_name("\\cdot "), "*");
        assert_eq!(context.canonical_name("\\sin"), "sin");
        assert_eq!(context.canonical_name("\\alpha"), "\\alpha");
        assert_eq!(context.canonical_name("x"), "x");
    }

    #[test]
    fn precedences() {
        let context = Context::standard();
        assert!(context.precedence("*") > context.precedence("+"));
        assert!(context.precedence("+") > context.precedence("="));
        assert!(context.precedence("=") > context.precedence(","));
        assert_eq!(context.precedence("x"), None);
        assert_eq!(context.precedence("sin"), None);
    }

    #[test]
    fn default_templates() {
        let context = Context::standard();
        assert_eq!(context.latex_template_for_function("f"), "f%^%_%");
        assert_eq!(
            context.latex_template_for_function("sinc"),
            "\\operatorname{sinc}%^%_%"
        );
        assert_eq!(context.latex_template_for_operator("+"), "%0+%1");
        assert_eq!(context.latex_template_for_operator("\\cup"), "%0\\cup %1");
    }

    #[test]
    fn load_from_yaml_simple() {
        let reader = StringReader::new(
            r#"
            declarations:
              sinc:
                is_function: true
                template: "\\operatorname{sinc}%^%_ %"
              "\\oplus":
                precedence: 300
            aliases:
              "⊕": "\\oplus"
            "#,
        );

        let context = Context::from_reader(reader).unwrap();

        assert_eq!(
            context.declarations.get("sinc").unwrap(),
            &Declaration {
                precedence: None,
                is_function: true,
                template: Some("\\operatorname{sinc}%^%_ %".to_string()),
                latex: None,
            }
        );
        assert_eq!(context.canonical_name("\\sinc"), "sinc");
        assert_eq!(context.canonical_name("⊕"), "\\oplus");
        assert_eq!(context.precedence("\\oplus"), Some(300));
        // The standard catalog is still there
        assert!(context.is_function("sin"));
    }
}
