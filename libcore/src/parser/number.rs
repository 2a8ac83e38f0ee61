//! Scanning of numeric literals spread over several atoms.
use crate::atom::{Atom, AtomKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Mantissa,
    /// Right after the exponent marker: a sign or a digit
    ExponentStart,
    ExponentDigits,
}

#[derive(Debug, PartialEq)]
pub struct Literal {
    /// Position after the last atom of the literal
    pub end: usize,
    /// Text with group separators removed and `d`/`D` markers normalized to `e`
    pub text: String,
}

fn is_decimal_digit(atom: &Atom) -> bool {
    atom.kind == AtomKind::Ord && atom.command().len() == 1 && atom.command().as_bytes()[0].is_ascii_digit()
}

fn is_sign(atom: &Atom) -> bool {
    atom.kind == AtomKind::Bin && matches!(atom.command(), "+" | "-" | "−")
}

fn is_exponent_marker(atom: &Atom) -> bool {
    atom.kind == AtomKind::Ord && !atom.has_scripts() && matches!(atom.command(), "e" | "E" | "d" | "D")
}

/// A marker only starts an exponent if digits follow, so `2e^x` keeps its `e`.
fn exponent_follows(atoms: &[Atom], pos: usize) -> bool {
    match atoms.get(pos) {
        Some(atom) if is_decimal_digit(atom) => true,
        Some(atom) if is_sign(atom) => atoms.get(pos + 1).map_or(false, is_decimal_digit),
        _ => false,
    }
}

/// A comma separates groups only in front of exactly three digits.
fn group_follows(atoms: &[Atom], pos: usize) -> bool {
    (pos..pos + 3).all(|i| atoms.get(i).map_or(false, is_decimal_digit))
        && !atoms.get(pos + 3).map_or(false, is_decimal_digit)
}

fn digit_after_spacing(atoms: &[Atom], pos: usize) -> bool {
    atoms[pos..]
        .iter()
        .find(|atom| !atom.is_spacing())
        .map_or(false, |atom| atom.is_digit())
}

/// Consumes the longest run of atoms forming one literal, starting at a digit or point.
pub fn scan(atoms: &[Atom], start: usize) -> Literal {
    let mut state = State::Mantissa;
    let mut text = String::new();
    let mut pos = start;
    while let Some(atom) = atoms.get(pos) {
        if atom.is_spacing() {
            if state != State::ExponentStart && digit_after_spacing(atoms, pos) {
                pos += 1;
                continue;
            }
            break;
        }
        let accepted = match state {
            State::Mantissa if atom.is_digit() => {
                text.push_str(atom.command());
                true
            }
            State::Mantissa
                if atom.kind == AtomKind::Punct
                    && atom.command() == ","
                    && group_follows(atoms, pos + 1) =>
            {
                true
            }
            State::Mantissa if is_exponent_marker(atom) && exponent_follows(atoms, pos + 1) => {
                text.push('e');
                state = State::ExponentStart;
                true
            }
            State::ExponentStart if is_sign(atom) => {
                text.push(if atom.command() == "+" { '+' } else { '-' });
                state = State::ExponentDigits;
                true
            }
            State::ExponentStart | State::ExponentDigits if is_decimal_digit(atom) => {
                text.push_str(atom.command());
                state = State::ExponentDigits;
                true
            }
            _ => false,
        };
        if !accepted {
            break;
        }
        pos += 1;
        // Scripts belong to the whole literal, which ends here
        if atom.has_scripts() {
            break;
        }
    }
    Literal { end: pos, text }
}

#[cfg(test)]
mod specs {
    use super::*;

    fn atoms(text: &str) -> Vec<Atom> {
        text.chars()
            .map(|c| match c {
                ',' => Atom::punct(","),
                '+' | '-' => Atom::bin(&c.to_string()),
                ' ' => Atom::spacing("\\,"),
                _ => Atom::ord(&c.to_string()),
            })
            .collect()
    }

    #[test]
    fn plain_digits() {
        let atoms = atoms("3.25+x");
        assert_eq!(
            scan(&atoms, 0),
            Literal {
                end: 4,
                text: "3.25".to_string()
            }
        );
    }

    #[test]
    fn group_separators() {
        let atoms = atoms("1,234,567");
        assert_eq!(scan(&atoms, 0).text, "1234567");
        assert_eq!(scan(&atoms, 0).end, 9);
    }

    #[test]
    fn comma_between_items() {
        let atoms = atoms("1,2");
        assert_eq!(scan(&atoms, 0).text, "1");
        assert_eq!(scan(&atoms, 0).end, 1);
    }

    #[test]
    fn exponents() {
        assert_eq!(scan(&atoms("1.5E-3"), 0).text, "1.5e-3");
        assert_eq!(scan(&atoms("2d4"), 0).text, "2e4");
        let atoms = atoms("2ex");
        assert_eq!(scan(&atoms, 0).text, "2");
        assert_eq!(scan(&atoms, 0).end, 1);
    }

    #[test]
    fn spacing_inside_literal() {
        let atoms = atoms("1 000 x");
        let literal = scan(&atoms, 0);
        assert_eq!(literal.text, "1000");
        assert_eq!(literal.end, 5);
    }

    #[test]
    fn stops_after_scripted_digit() {
        let atoms = vec![
            Atom::ord("1"),
            Atom::ord("2").with_superscript(vec![Atom::ord("3")]),
            Atom::ord("4"),
        ];
        let literal = scan(&atoms, 0);
        assert_eq!(literal.text, "12");
        assert_eq!(literal.end, 2);
    }
}
