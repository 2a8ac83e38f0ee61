//! Tokens of a typeset math stream as delivered by an editing surface.
//!
//! Atoms are owned by the host and only read by the parser.

/// Value of the invisible atom that only exists to carry a script.
pub const ZERO_WIDTH: &str = "\u{200b}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomKind {
    Ord,
    TextOrd,
    Bin,
    Rel,
    Punct,
    Open,
    Close,
    /// `\bigl(`, `\Bigr]` and friends. The delimiter identity is explicit.
    SizedDelim {
        delim: String,
    },
    /// `\left( ... \right)`: the enclosed content travels with the atom.
    LeftRight {
        left: String,
        right: String,
        body: Vec<Atom>,
    },
    Op,
    GenFrac {
        numer: Vec<Atom>,
        denom: Vec<Atom>,
    },
    Surd {
        body: Vec<Atom>,
        index: Option<Vec<Atom>>,
    },
    /// Font switch like `\mathbb{R}`. The family `text` marks literal text.
    Font {
        family: String,
        body: Vec<Atom>,
    },
    Spacing,
    /// `\middle|` inside a left/right pair
    Delim,
}

impl AtomKind {
    pub fn category(&self) -> &'static str {
        match self {
            AtomKind::Ord => "mord",
            AtomKind::TextOrd => "textord",
            AtomKind::Bin => "mbin",
            AtomKind::Rel => "mrel",
            AtomKind::Punct => "mpunct",
            AtomKind::Open => "mopen",
            AtomKind::Close => "mclose",
            AtomKind::SizedDelim { .. } => "sizeddelim",
            AtomKind::LeftRight { .. } => "leftright",
            AtomKind::Op => "mop",
            AtomKind::GenFrac { .. } => "genfrac",
            AtomKind::Surd { .. } => "surd",
            AtomKind::Font { .. } => "font",
            AtomKind::Spacing => "spacing",
            AtomKind::Delim => "delim",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub kind: AtomKind,
    /// Markup that produced the atom, e.g. `\alpha` or `2`
    pub latex: String,
    /// Rendered glyph, e.g. `α`
    pub value: String,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub superscript: Option<Vec<Atom>>,
    #[serde(default)]
    pub subscript: Option<Vec<Atom>>,
}

impl Atom {
    pub fn new(kind: AtomKind, latex: &str, value: &str) -> Atom {
        Atom {
            kind,
            latex: latex.to_string(),
            value: value.to_string(),
            font: None,
            superscript: None,
            subscript: None,
        }
    }

    pub fn ord(value: &str) -> Atom {
        Atom::new(AtomKind::Ord, value, value)
    }

    /// An ordinary symbol spelled by a command, e.g. `Atom::symbol("\\pi", "π")`
    pub fn symbol(latex: &str, value: &str) -> Atom {
        Atom::new(AtomKind::Ord, latex, value)
    }

    pub fn text_ord(latex: &str) -> Atom {
        Atom::new(AtomKind::TextOrd, latex, latex)
    }

    pub fn bin(latex: &str) -> Atom {
        Atom::new(AtomKind::Bin, latex, latex)
    }

    pub fn rel(latex: &str) -> Atom {
        Atom::new(AtomKind::Rel, latex, latex)
    }

    pub fn punct(latex: &str) -> Atom {
        Atom::new(AtomKind::Punct, latex, latex)
    }

    pub fn open(latex: &str) -> Atom {
        Atom::new(AtomKind::Open, latex, latex)
    }

    pub fn close(latex: &str) -> Atom {
        Atom::new(AtomKind::Close, latex, latex)
    }

    pub fn op(latex: &str) -> Atom {
        Atom::new(AtomKind::Op, latex, latex.trim_start_matches('\\'))
    }

    pub fn sized(latex: &str, delim: &str) -> Atom {
        Atom::new(
            AtomKind::SizedDelim {
                delim: delim.to_string(),
            },
            latex,
            delim,
        )
    }

    pub fn left_right(left: &str, right: &str, body: Vec<Atom>) -> Atom {
        Atom::new(
            AtomKind::LeftRight {
                left: left.to_string(),
                right: right.to_string(),
                body,
            },
            "",
            "",
        )
    }

    pub fn frac(numer: Vec<Atom>, denom: Vec<Atom>) -> Atom {
        Atom::new(AtomKind::GenFrac { numer, denom }, "\\frac", "")
    }

    pub fn surd(body: Vec<Atom>, index: Option<Vec<Atom>>) -> Atom {
        Atom::new(AtomKind::Surd { body, index }, "\\sqrt", "")
    }

    pub fn font_switch(family: &str, body: Vec<Atom>) -> Atom {
        let latex = format!("\\{}", family);
        Atom::new(
            AtomKind::Font {
                family: family.to_string(),
                body,
            },
            &latex,
            "",
        )
    }

    pub fn spacing(latex: &str) -> Atom {
        Atom::new(AtomKind::Spacing, latex, "")
    }

    pub fn middle(latex: &str) -> Atom {
        Atom::new(AtomKind::Delim, latex, latex)
    }

    /// Invisible atom which only carries scripts
    pub fn placeholder() -> Atom {
        Atom::new(AtomKind::Ord, "", ZERO_WIDTH)
    }

    pub fn with_superscript(mut self, atoms: Vec<Atom>) -> Atom {
        self.superscript = Some(atoms);
        self
    }

    pub fn with_subscript(mut self, atoms: Vec<Atom>) -> Atom {
        self.subscript = Some(atoms);
        self
    }

    pub fn with_font(mut self, font: &str) -> Atom {
        self.font = Some(font.to_string());
        self
    }

    /// The spelling used for catalog lookups: trimmed markup, or the glyph if there is none.
    pub fn command(&self) -> &str {
        let latex = self.latex.trim();
        if latex.is_empty() {
            &self.value
        } else {
            latex
        }
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// Sequences owned by this atom: scripts, bodies, fraction and radical slots
    pub fn nested(&self) -> Vec<&[Atom]> {
        let mut nested: Vec<&[Atom]> = Vec::new();
        match &self.kind {
            AtomKind::LeftRight { body, .. } | AtomKind::Font { body, .. } => nested.push(body),
            AtomKind::GenFrac { numer, denom } => {
                nested.push(numer);
                nested.push(denom);
            }
            AtomKind::Surd { body, index } => {
                nested.push(body);
                if let Some(index) = index {
                    nested.push(index);
                }
            }
            _ => (),
        }
        if let Some(sup) = &self.superscript {
            nested.push(sup);
        }
        if let Some(sub) = &self.subscript {
            nested.push(sub);
        }
        nested
    }

    pub fn has_scripts(&self) -> bool {
        self.superscript.is_some() || self.subscript.is_some()
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == AtomKind::Ord && self.value == ZERO_WIDTH
    }

    pub fn is_spacing(&self) -> bool {
        self.kind == AtomKind::Spacing
    }

    /// Single decimal digit or decimal point, the characters a numeric literal starts with.
    pub fn is_digit(&self) -> bool {
        self.kind == AtomKind::Ord && is_digit_or_point(self.command())
    }
}

pub fn is_digit_or_point(text: &str) -> bool {
    text.len() == 1 && "0123456789.".contains(text)
}
