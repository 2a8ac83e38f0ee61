//! Turns LaTeX source into the atom stream an editing surface would deliver.
//!
//! Only the subset needed to feed the parser is understood. Whitespace is
//! dropped as in TeX math mode, so `2 1` reads as `21`.
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{alpha1, anychar, char, multispace0, satisfy};
use nom::combinator::{map, opt, recognize};
use nom::error::ErrorKind;
use nom::sequence::{delimited, preceded};
use nom::IResult;

use crate::atom::{Atom, AtomKind};
use crate::error::Error;

enum Piece {
    Atoms(Vec<Atom>),
    Sup(Vec<Atom>),
    Sub(Vec<Atom>),
}

/// Lexes a whole formula. Fails at the first construct which can not be read.
pub fn tokenize(input: &str) -> Result<Vec<Atom>, Error> {
    match sequence(input) {
        Ok((rest, atoms)) if rest.trim().is_empty() => Ok(atoms),
        Ok((rest, _)) => Err(Error::Lex {
            offset: input.len() - rest.len(),
            rest: rest.to_string(),
        }),
        Err(_) => Err(Error::Lex {
            offset: 0,
            rest: input.to_string(),
        }),
    }
}

fn sequence(input: &str) -> IResult<&str, Vec<Atom>> {
    let mut atoms = Vec::new();
    let mut rest = input;
    loop {
        let (next, _) = multispace0(rest)?;
        match piece(next) {
            Ok((next, piece)) => {
                push(&mut atoms, piece);
                rest = next;
            }
            Err(nom::Err::Error(_)) => return Ok((next, atoms)),
            Err(err) => return Err(err),
        }
    }
}

/// Scripts go to the previous atom, or to an invisible one if that is taken.
fn push(atoms: &mut Vec<Atom>, piece: Piece) {
    let (script, is_sup) = match piece {
        Piece::Atoms(new) => {
            atoms.extend(new);
            return;
        }
        Piece::Sup(script) => (script, true),
        Piece::Sub(script) => (script, false),
    };
    let occupied = match atoms.last() {
        Some(atom) if is_sup => atom.superscript.is_some() || atom.is_spacing(),
        Some(atom) => atom.subscript.is_some() || atom.is_spacing(),
        None => true,
    };
    if occupied {
        atoms.push(Atom::placeholder());
    }
    if let Some(atom) = atoms.last_mut() {
        if is_sup {
            atom.superscript = Some(script);
        } else {
            atom.subscript = Some(script);
        }
    }
}

fn piece(input: &str) -> IResult<&str, Piece> {
    alt((
        map(superscript, Piece::Sup),
        map(subscript, Piece::Sub),
        map(braced, Piece::Atoms),
        map(command, |atom| Piece::Atoms(vec![atom])),
        map(plain, |atom| Piece::Atoms(vec![atom])),
    ))(input)
}

fn superscript(input: &str) -> IResult<&str, Vec<Atom>> {
    preceded(char('^'), argument)(input)
}

fn subscript(input: &str) -> IResult<&str, Vec<Atom>> {
    preceded(char('_'), argument)(input)
}

/// A braced group, or a single token as in `x^2`
fn argument(input: &str) -> IResult<&str, Vec<Atom>> {
    preceded(
        multispace0,
        alt((group, map(alt((command, plain)), |atom| vec![atom]))),
    )(input)
}

fn group(input: &str) -> IResult<&str, Vec<Atom>> {
    delimited(char('{'), sequence, preceded(multispace0, char('}')))(input)
}

/// Braces in running text keep several atoms together with an invisible fence.
fn braced(input: &str) -> IResult<&str, Vec<Atom>> {
    let (rest, atoms) = group(input)?;
    if atoms.len() > 1 {
        Ok((rest, vec![Atom::left_right(".", ".", atoms)]))
    } else {
        Ok((rest, atoms))
    }
}

fn control(input: &str) -> IResult<&str, &str> {
    preceded(char('\\'), alt((alpha1, recognize(anychar))))(input)
}

fn literal_text(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        delimited(char('{'), take_until("}"), char('}')),
    )(input)
}

/// The glyph after `\left`, `\right`, `\middle` or `\big`
fn delimiter_token(input: &str) -> IResult<&str, String> {
    let (rest, _) = multispace0(input)?;
    if let Ok((rest, name)) = control(rest) {
        let glyph = match name {
            "{" | "}" => name.to_string(),
            "|" => "\\Vert".to_string(),
            name => format!("\\{}", name),
        };
        return Ok((rest, glyph));
    }
    map(recognize(anychar), str::to_string)(rest)
}

fn command(input: &str) -> IResult<&str, Atom> {
    let (rest, name) = control(input)?;
    let latex = format!("\\{}", name);
    match name {
        "frac" | "dfrac" | "tfrac" => {
            let (rest, numer) = argument(rest)?;
            let (rest, denom) = argument(rest)?;
            Ok((rest, Atom::frac(numer, denom)))
        }
        "sqrt" => {
            let (rest, index) = opt(preceded(
                multispace0,
                delimited(char('['), take_until("]"), char(']')),
            ))(rest)?;
            let index = match index {
                Some(text) => Some(sequence(text)?.1),
                None => None,
            };
            let (rest, body) = argument(rest)?;
            Ok((rest, Atom::surd(body, index)))
        }
        "left" => {
            let (rest, left) = delimiter_token(rest)?;
            let (rest, body) = sequence(rest)?;
            let (rest, _) = tag("\\right")(rest)?;
            let (rest, right) = delimiter_token(rest)?;
            Ok((rest, Atom::left_right(&left, &right, body)))
        }
        // Ends the body of the enclosing `\left`
        "right" => Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Tag))),
        "middle" => {
            let (rest, glyph) = delimiter_token(rest)?;
            Ok((rest, Atom::middle(&glyph)))
        }
        "big" | "bigl" | "bigr" | "bigm" | "Big" | "Bigl" | "Bigr" | "Bigm" | "bigg" | "biggl"
        | "biggr" | "biggm" | "Bigg" | "Biggl" | "Biggr" | "Biggm" => {
            let (rest, glyph) = delimiter_token(rest)?;
            Ok((rest, Atom::sized(&latex, &glyph)))
        }
        "text" | "textrm" | "textit" | "textbf" | "mbox" => {
            let (rest, content) = literal_text(rest)?;
            let body = content
                .chars()
                .map(|c| Atom::text_ord(&c.to_string()))
                .collect();
            Ok((rest, Atom::font_switch(name, body)))
        }
        "mathbb" | "mathbf" | "mathrm" | "mathit" | "mathcal" | "mathscr" | "mathfrak"
        | "mathsf" | "mathtt" | "boldsymbol" => {
            let (rest, body) = argument(rest)?;
            Ok((rest, Atom::font_switch(name, body)))
        }
        "operatorname" => {
            let (rest, content) = literal_text(rest)?;
            Ok((rest, Atom::op(&format!("\\{}", content.trim()))))
        }
        name => Ok((rest, simple_command(name, &latex))),
    }
}

/// Commands without arguments
fn simple_command(name: &str, latex: &str) -> Atom {
    if let Some(glyph) = keyword_symbol(name) {
        return Atom::symbol(latex, &glyph.to_string());
    }
    match name {
        "sin" | "cos" | "tan" | "cot" | "sec" | "csc" | "sinh" | "cosh" | "tanh" | "coth"
        | "arcsin" | "arccos" | "arctan" | "ln" | "log" | "lg" | "exp" | "det" | "dim" | "gcd"
        | "min" | "max" | "lim" | "sum" | "prod" | "coprod" | "int" | "oint" => Atom::op(latex),
        "cdot" | "times" | "ast" | "div" | "pm" | "mp" | "cup" | "cap" | "setminus" | "land"
        | "lor" | "wedge" | "vee" => Atom::bin(latex),
        "ne" | "neq" | "le" | "leq" | "ge" | "geq" | "lt" | "gt" | "approx" | "equiv" | "sim"
        | "in" | "notin" | "subset" | "subseteq" | "to" | "rightarrow" | "gets"
        | "leftarrow" | "Rightarrow" | "implies" | "Leftrightarrow" | "iff" => Atom::rel(latex),
        "langle" | "lfloor" | "lceil" | "lvert" | "lVert" | "lbrack" | "ulcorner" | "llcorner"
        | "lgroup" | "lmoustache" | "lbrace" => Atom::open(latex),
        "rangle" | "rfloor" | "rceil" | "rvert" | "rVert" | "rbrack" | "urcorner" | "lrcorner"
        | "rgroup" | "rmoustache" | "rbrace" => Atom::close(latex),
        "{" => Atom::open("{"),
        "}" => Atom::close("}"),
        "vert" | "Vert" => Atom::text_ord(latex),
        "|" => Atom::text_ord("\\Vert"),
        "," | ";" | ":" | "!" | " " | "quad" | "qquad" => Atom::spacing(latex),
        "dag" | "dagger" | "ddagger" | "maltese" | "backprime" | "backdoubleprime" | "prime"
        | "doubleprime" | "degree" | "$" | "%" | "_" => Atom::text_ord(latex),
        _ => Atom::new(AtomKind::Ord, latex, ""),
    }
}

fn keyword_symbol(keyword: &str) -> Option<char> {
    match keyword {
        "alpha" => Some('α'),
        "beta" => Some('β'),
        "gamma" => Some('γ'),
        "delta" => Some('δ'),
        "epsilon" => Some('ε'),
        "zeta" => Some('ζ'),
        "eta" => Some('η'),
        "theta" => Some('θ'),
        "iota" => Some('ι'),
        "kappa" => Some('κ'),
        "lambda" => Some('λ'),
        "mu" => Some('μ'),
        "nu" => Some('ν'),
        "xi" => Some('ξ'),
        "pi" => Some('π'),
        "rho" => Some('ρ'),
        "sigma" => Some('σ'),
        "tau" => Some('τ'),
        "upsilon" => Some('υ'),
        "phi" => Some('ϕ'),
        "varphi" => Some('φ'),
        "chi" => Some('χ'),
        "psi" => Some('ψ'),
        "omega" => Some('ω'),
        "Gamma" => Some('Γ'),
        "Delta" => Some('Δ'),
        "Theta" => Some('Θ'),
        "Lambda" => Some('Λ'),
        "Pi" => Some('Π'),
        "Sigma" => Some('Σ'),
        "Phi" => Some('Φ'),
        "Psi" => Some('Ψ'),
        "Omega" => Some('Ω'),
        "infty" => Some('∞'),
        "nabla" => Some('∇'),
        "partial" => Some('∂'),
        "ell" => Some('ℓ'),
        "emptyset" => Some('∅'),
        "exponentialE" => Some('ℯ'),
        _ => None,
    }
}

fn plain(input: &str) -> IResult<&str, Atom> {
    let (rest, c) = satisfy(|c| !"{}^_\\".contains(c) && !c.is_whitespace())(input)?;
    let glyph = c.to_string();
    let atom = match c {
        '+' | '-' | '*' | '/' | '−' | '⋅' | '×' | '÷' => Atom::bin(&glyph),
        '=' | '<' | '>' | '≠' | '≤' | '≥' => Atom::rel(&glyph),
        ',' | ';' => Atom::punct(&glyph),
        '(' | '[' => Atom::open(&glyph),
        ')' | ']' => Atom::close(&glyph),
        '|' | '!' => Atom::text_ord(&glyph),
        '\'' => Atom::text_ord("\\prime"),
        _ => Atom::ord(&glyph),
    };
    Ok((rest, atom))
}

#[cfg(test)]
mod specs {
    use super::*;

    #[test]
    fn operators_and_digits() {
        let actual = tokenize("12+x").unwrap();
        let expected = vec![
            Atom::ord("1"),
            Atom::ord("2"),
            Atom::bin("+"),
            Atom::ord("x"),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn special_operators() {
        let actual = tokenize("x−2⋅y").unwrap();
        let expected = vec![
            Atom::ord("x"),
            Atom::bin("−"),
            Atom::ord("2"),
            Atom::bin("⋅"),
            Atom::ord("y"),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn scripts_attach_to_previous_atom() {
        let actual = tokenize("x^{2}_i").unwrap();
        let expected = vec![Atom::ord("x")
            .with_superscript(vec![Atom::ord("2")])
            .with_subscript(vec![Atom::ord("i")])];
        assert_eq!(actual, expected);
    }

    #[test]
    fn repeated_script_goes_to_placeholder() {
        let actual = tokenize("x^2^3").unwrap();
        let expected = vec![
            Atom::ord("x").with_superscript(vec![Atom::ord("2")]),
            Atom::placeholder().with_superscript(vec![Atom::ord("3")]),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn fraction_and_radical() {
        let actual = tokenize("\\frac{1}{2}\\sqrt[3]{x}").unwrap();
        let expected = vec![
            Atom::frac(vec![Atom::ord("1")], vec![Atom::ord("2")]),
            Atom::surd(vec![Atom::ord("x")], Some(vec![Atom::ord("3")])),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn left_right_carries_body() {
        let actual = tokenize("\\left\\lfloor x \\right\\rfloor").unwrap();
        let expected = vec![Atom::left_right(
            "\\lfloor",
            "\\rfloor",
            vec![Atom::ord("x")],
        )];
        assert_eq!(actual, expected);
    }

    #[test]
    fn commands() {
        let actual = tokenize("\\alpha\\cdot\\sin\\,\\mathbb{R}").unwrap();
        let kinds: Vec<&str> = actual.iter().map(Atom::category).collect();
        assert_vec_eq!(kinds, vec!["mord", "mbin", "mop", "spacing", "font"]);
        assert_eq!(actual[0].value, "α");
        assert_eq!(actual[2].value, "sin");
    }

    #[test]
    fn text_is_kept_verbatim() {
        let actual = tokenize("\\text{if}").unwrap();
        match &actual[0].kind {
            AtomKind::Font { family, body } => {
                assert_eq!(family, "text");
                assert_eq!(body.len(), 2);
            }
            other => panic!("Expected font, got {:?}", other),
        }
    }

    #[test]
    fn braces_group_several_atoms() {
        let actual = tokenize("{a+b}^2").unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].category(), "leftright");
        assert!(actual[0].has_scripts());
    }

    #[test]
    fn unbalanced_brace_fails() {
        match tokenize("x}") {
            Err(Error::Lex { offset, .. }) => assert_eq!(offset, 1),
            other => panic!("Expected lex error, got {:?}", other),
        }
    }
}
