//! Precedence climbing parser turning a stream of atoms into an `AstNode`.
//!
//! Every step takes a cursor position and returns the position after the
//! consumed atoms together with the node it produced. Nothing is mutated in
//! place, the only backtracking is the one-atom lookahead of digraphs.
use crate::ast::{AstNode, Variant};
use crate::atom::{Atom, AtomKind};
use crate::context::Catalog;

mod delimiter;
pub mod lexer;
mod number;
pub mod policy;

pub use delimiter::{pairing_function, postfix_function, right_delimiter};

/// Bounds checked before parsing untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Atoms including those nested in scripts and bodies
    pub max_atoms: usize,
    pub max_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> ParseLimits {
        ParseLimits {
            max_atoms: 10_000,
            max_depth: 64,
        }
    }
}

/// Parses a sequence of atoms. Returns `None` if there is nothing but spacing.
///
/// Unrecognized atoms become `AstNode::Error` in place, parsing continues after them.
pub fn parse(catalog: &dyn Catalog, atoms: &[Atom]) -> Option<AstNode> {
    Parser::new(catalog, atoms).parse_all()
}

/// Like `parse`, but refuses input exceeding the limits with a single error node.
pub fn parse_with_limits(
    catalog: &dyn Catalog,
    atoms: &[Atom],
    limits: &ParseLimits,
) -> Option<AstNode> {
    let (count, depth) = measure(atoms);
    if count > limits.max_atoms || depth > limits.max_depth {
        debug!(
            "Refusing input with {} atoms nested {} levels deep",
            count, depth
        );
        return Some(AstNode::error(
            "",
            &format!(
                "input exceeds {} atoms or {} levels",
                limits.max_atoms, limits.max_depth
            ),
        ));
    }
    parse(catalog, atoms)
}

/// Total number of atoms and maximal nesting depth
fn measure(atoms: &[Atom]) -> (usize, usize) {
    let mut count = 0;
    let mut depth = 0;
    let mut pending: Vec<(&[Atom], usize)> = vec![(atoms, 1)];
    while let Some((sequence, level)) = pending.pop() {
        count += sequence.len();
        depth = depth.max(level);
        for atom in sequence.iter() {
            for nested in atom.nested() {
                pending.push((nested, level + 1));
            }
        }
    }
    (count, depth)
}

/// Cursor position and the node produced so far
#[derive(Debug)]
struct Step {
    pos: usize,
    ast: Option<AstNode>,
}

impl Step {
    fn new(pos: usize, ast: AstNode) -> Step {
        Step { pos, ast: Some(ast) }
    }

    fn empty(pos: usize) -> Step {
        Step { pos, ast: None }
    }
}

struct Operator {
    name: String,
    precedence: u32,
    /// Position after the operator atom
    next: usize,
}

#[derive(Clone, Copy)]
struct Parser<'a> {
    catalog: &'a dyn Catalog,
    atoms: &'a [Atom],
    /// Closing glyph of the innermost self-closing fence being parsed
    closer: Option<&'a str>,
}

impl<'a> Parser<'a> {
    fn new(catalog: &'a dyn Catalog, atoms: &'a [Atom]) -> Parser<'a> {
        Parser {
            catalog,
            atoms,
            closer: None,
        }
    }

    /// Leftovers after a complete expression, like a stray closing fence,
    /// are parsed on their own and joined by an invisible multiplication.
    fn parse_all(&self) -> Option<AstNode> {
        let mut result: Option<AstNode> = None;
        let mut pos = 0;
        loop {
            pos = self.skip_spacing(pos);
            if pos >= self.atoms.len() {
                break;
            }
            if result.is_some() {
                debug!("Resuming after unparsed atom at {}", pos);
            }
            let step = self.expression(self.primary(pos), 0);
            let (next, chunk) = if step.pos > pos {
                (step.pos, step.ast)
            } else {
                (pos + 1, Some(self.unexpected(&self.atoms[pos])))
            };
            result = policy::juxtapose(result, chunk);
            pos = next;
        }
        result
    }

    fn skip_spacing(&self, pos: usize) -> usize {
        let mut pos = pos;
        while self.atoms.get(pos).map_or(false, Atom::is_spacing) {
            pos += 1;
        }
        pos
    }

    fn canonical(&self, atom: &Atom) -> String {
        self.catalog.canonical_name(atom.command())
    }

    fn precedence(&self, atom: &Atom) -> Option<u32> {
        self.catalog.precedence(&self.canonical(atom))
    }

    /// Operator at `pos` binding at least as tight as `min_precedence`.
    /// A middle delimiter acts as an operator of the lowest precedence.
    fn operator(&self, pos: usize, min_precedence: u32) -> Option<Operator> {
        let pos = self.skip_spacing(pos);
        let atom = self.atoms.get(pos)?;
        let precedence = if atom.kind == AtomKind::Delim {
            0
        } else {
            self.precedence(atom)?
        };
        if precedence < min_precedence {
            return None;
        }
        Some(Operator {
            name: self.canonical(atom),
            precedence,
            next: pos + 1,
        })
    }

    /// `expression := primary (operator primary)*` folded to the left.
    fn expression(&self, step: Step, min_precedence: u32) -> Step {
        let Step { mut pos, ast: mut lhs } = step;
        while let Some(operator) = self.operator(pos, min_precedence) {
            let mut rhs = self.primary(operator.next);
            while let Some(next) = self.operator(rhs.pos, operator.precedence + 1) {
                rhs = self.expression(rhs, next.precedence);
            }
            pos = rhs.pos;
            lhs = Some(AstNode::partial_binary(&operator.name, lhs, rhs.ast));
        }
        Step { pos, ast: lhs }
    }

    /// A primary followed by any primaries it is implicitly multiplied with
    fn primary(&self, pos: usize) -> Step {
        let mut step = self.single_primary(pos);
        loop {
            let at = self.skip_spacing(step.pos);
            if !self.starts_primary(at) {
                return step;
            }
            let rhs = self.single_primary(at);
            if rhs.pos <= at {
                return step;
            }
            step = Step {
                pos: rhs.pos,
                ast: policy::juxtapose(step.ast, rhs.ast),
            };
        }
    }

    fn starts_primary(&self, pos: usize) -> bool {
        let atom = match self.atoms.get(pos) {
            Some(atom) => atom,
            None => return false,
        };
        if atom.is_placeholder() {
            return false;
        }
        match &atom.kind {
            AtomKind::Ord | AtomKind::TextOrd => {
                let glyph = atom.command();
                self.precedence(atom).is_none()
                    && postfix_function(glyph).is_none()
                    && !delimiter::is_closing_only(glyph)
                    && (!delimiter::is_self_closing(glyph) || self.closer != Some(glyph))
            }
            AtomKind::Op => self.precedence(atom).is_none(),
            AtomKind::SizedDelim { delim } => self.opens_sized(delim),
            AtomKind::Surd { .. }
            | AtomKind::GenFrac { .. }
            | AtomKind::Font { .. }
            | AtomKind::LeftRight { .. }
            | AtomKind::Open => true,
            _ => false,
        }
    }

    fn opens_sized(&self, delim: &str) -> bool {
        right_delimiter(delim).is_some()
            && (!delimiter::is_self_closing(delim) || self.closer != Some(delim))
    }

    fn single_primary(&self, pos: usize) -> Step {
        let pos = self.skip_spacing(pos);
        let atom = match self.atoms.get(pos) {
            Some(atom) => atom,
            None => return Step::empty(pos),
        };

        if atom.is_placeholder() {
            debug!("Scripts without a base at {}", pos);
            return self.decorate(AstNode::error("", "missing operand"), Some(atom), pos + 1);
        }

        if let Some((name, next)) = self.prefix_digraph(pos) {
            let operand = self.primary(next);
            return Step {
                pos: operand.pos,
                ast: Some(AstNode::prefix(name, operand.ast)),
            };
        }

        if atom.kind == AtomKind::Bin {
            let sign = self.canonical(atom);
            if sign == "+" || sign == "-" {
                let literal_follows = self
                    .atoms
                    .get(self.skip_spacing(pos + 1))
                    .map_or(false, Atom::is_digit);
                let operand = self.single_primary(pos + 1);
                return Step::new(
                    operand.pos,
                    policy::fold_sign(&sign, operand.ast, literal_follows),
                );
            }
        }

        if atom.is_digit() {
            return self.number(pos);
        }

        match &atom.kind {
            AtomKind::GenFrac { numer, denom } => {
                let fraction = AstNode::fraction(self.slot(numer), self.slot(denom));
                return self.decorate(fraction, Some(atom), pos + 1);
            }
            AtomKind::Surd { body, index } => {
                let radicand = self.slot(body);
                let root = match index {
                    None => AstNode::root(radicand, None),
                    Some(index) => AstNode::call(
                        "pow",
                        vec![
                            radicand,
                            AstNode::fraction(AstNode::number(1.0), self.slot(index)),
                        ],
                    ),
                };
                return self.decorate(root, Some(atom), pos + 1);
            }
            _ => (),
        }

        if matches!(atom.kind, AtomKind::Ord | AtomKind::TextOrd | AtomKind::Op) {
            let name = self.canonical(atom);
            if self.catalog.is_function(&name) && self.catalog.precedence(&name).is_none() {
                return self.function(pos, &name);
            }
        }

        if let Some(step) = self.delimited(pos) {
            return step;
        }

        match &atom.kind {
            AtomKind::Ord | AtomKind::TextOrd | AtomKind::Op
                if self.precedence(atom).is_none()
                    && !delimiter::is_closing_only(atom.command()) =>
            {
                self.decorate(self.identifier(atom), Some(atom), pos + 1)
            }
            AtomKind::Font { family, body } => {
                let content: String = body.iter().map(|atom| atom.value.as_str()).collect();
                let node = match family.as_str() {
                    "text" | "textrm" | "mbox" | "textit" | "textbf" => AstNode::text(&content),
                    family => AstNode::Symbol {
                        name: content,
                        variant: Variant::from_family(family),
                        scripts: Default::default(),
                    },
                };
                self.decorate(node, Some(atom), pos + 1)
            }
            // Operators are left to the expression loop, with a missing left operand
            AtomKind::Delim => Step::empty(pos),
            _ if self.precedence(atom).is_some() => Step::empty(pos),
            _ => Step::new(pos + 1, self.unexpected(atom)),
        }
    }

    fn unexpected(&self, atom: &Atom) -> AstNode {
        let glyph = atom.command();
        debug!("Unexpected token {}/{}", atom.category(), glyph);
        AstNode::error(
            glyph,
            &format!("unexpected token {}/{}", atom.category(), glyph),
        )
    }

    /// Content of a fraction or radical slot, an error if it is empty
    fn slot(&self, atoms: &[Atom]) -> AstNode {
        parse(self.catalog, atoms).unwrap_or_else(|| AstNode::error("", "missing operand"))
    }

    fn identifier(&self, atom: &Atom) -> AstNode {
        let canonical = self.canonical(atom);
        let name = if canonical.starts_with('\\') && !atom.value.is_empty() {
            match atom.kind {
                AtomKind::Op => atom.value.clone(),
                _ => atom.value.chars().take(1).collect(),
            }
        } else {
            canonical
        };
        AstNode::Symbol {
            name,
            variant: atom.font.as_deref().and_then(Variant::from_family),
            scripts: Default::default(),
        }
    }

    /// Scans a literal. A generalized fraction right after it forms a mixed number.
    fn number(&self, pos: usize) -> Step {
        let literal = number::scan(self.atoms, pos);
        let node = match literal.text.parse::<f64>() {
            Ok(value) => AstNode::number(value),
            Err(_) => {
                debug!("Malformed number {}", literal.text);
                AstNode::error(&literal.text, &format!("malformed number {}", literal.text))
            }
        };
        let last = &self.atoms[literal.end - 1];
        if !last.has_scripts() && matches!(node, AstNode::Number { .. }) {
            let next = self.skip_spacing(literal.end);
            let fraction_follows = self
                .atoms
                .get(next)
                .map_or(false, |atom| matches!(atom.kind, AtomKind::GenFrac { .. }));
            if fraction_follows {
                let fraction = self.single_primary(next);
                if let Some(ast) = fraction.ast {
                    return Step::new(fraction.pos, policy::mixed_number(node, ast));
                }
            }
        }
        self.decorate(node, Some(last), literal.end)
    }

    /// Function name, its scripts, then exactly one primary as argument
    fn function(&self, pos: usize, name: &str) -> Step {
        let atom = &self.atoms[pos];
        let (next, call) = self.attach_scripts(AstNode::call(name, vec![]), Some(atom), pos + 1);
        let call = policy::invert_function(call);
        let argument = self.primary(next);
        let call = match (call, argument.ast) {
            (
                AstNode::Call {
                    name,
                    mut args,
                    fence,
                    scripts,
                },
                Some(arg),
            ) => {
                args.push(arg);
                AstNode::Call {
                    name,
                    args,
                    fence,
                    scripts,
                }
            }
            (call, _) => call,
        };
        Step::new(argument.pos, call)
    }

    /// `\nabla\times` and `\nabla\cdot`, recognized with one atom of lookahead
    fn prefix_digraph(&self, pos: usize) -> Option<(&'static str, usize)> {
        let atom = self.atoms.get(pos)?;
        if (atom.command() != "\\nabla" && atom.value != "∇") || atom.has_scripts() {
            return None;
        }
        let name = match self.atoms.get(pos + 1)?.command() {
            "\\times" | "×" => "curl",
            "\\cdot" | "⋅" => "div",
            _ => return None,
        };
        trace!("Digraph {} at {}", name, pos);
        Some((name, pos + 2))
    }

    /// Any of the three fence encodings: a left/right atom carrying its body,
    /// a sized delimiter pair, or plain opening and closing atoms.
    fn delimited(&self, pos: usize) -> Option<Step> {
        let atom = &self.atoms[pos];
        match &atom.kind {
            AtomKind::LeftRight { left, right, body } => {
                let inner = parse(self.catalog, body);
                Some(self.fence(left, right, inner, Some(atom), pos + 1))
            }
            AtomKind::SizedDelim { delim } => {
                let right = right_delimiter(delim)?;
                Some(self.enclosed(pos, delim, right))
            }
            AtomKind::Open | AtomKind::Ord | AtomKind::TextOrd => {
                let right = right_delimiter(atom.command())?;
                Some(self.enclosed(pos, atom.command(), right))
            }
            _ => None,
        }
    }

    /// Parses up to the first matching closing glyph. A missing one is tolerated.
    fn enclosed(&self, pos: usize, left: &str, right: &'static str) -> Step {
        let inner_parser = if delimiter::is_self_closing(right) {
            Parser {
                closer: Some(right),
                ..*self
            }
        } else {
            *self
        };
        let inner = inner_parser.expression(inner_parser.primary(pos + 1), 0);
        let close = self.skip_spacing(inner.pos);
        match self.atoms.get(close) {
            Some(atom) if closes(atom, right) => {
                self.fence(left, right, inner.ast, Some(atom), close + 1)
            }
            _ => {
                debug!("Missing closing {} for fence opened at {}", right, pos);
                self.fence(left, right, inner.ast, None, inner.pos)
            }
        }
    }

    fn fence(
        &self,
        left: &str,
        right: &str,
        inner: Option<AstNode>,
        closing: Option<&Atom>,
        pos: usize,
    ) -> Step {
        let node = match (pairing_function(left, right), inner) {
            (Some(name), inner) => AstNode::call(name, inner.into_iter().collect()),
            (None, Some(inner)) if left == "(" && right == ")" => AstNode::group(inner),
            (None, Some(inner)) => AstNode::fenced(inner, left, right),
            (None, None) => return Step::empty(pos),
        };
        self.decorate(node, closing, pos)
    }

    /// Scripts of the atom that produced the node, then postfix operators
    fn decorate(&self, node: AstNode, own: Option<&Atom>, pos: usize) -> Step {
        let (pos, node) = self.attach_scripts(node, own, pos);
        self.postfix(node, pos)
    }

    /// Scripts either sit on the atom itself or on a zero width atom right after it.
    fn attach_scripts(&self, node: AstNode, own: Option<&Atom>, pos: usize) -> (usize, AstNode) {
        let mut node = node;
        let mut pos = pos;
        if let Some(atom) = own.filter(|atom| atom.has_scripts()) {
            node = self.attach(node, atom);
        }
        if let Some(atom) = self.atoms.get(pos) {
            if atom.is_placeholder() && atom.has_scripts() {
                node = self.attach(node, atom);
                pos += 1;
            }
        }
        (pos, node)
    }

    fn attach(&self, node: AstNode, atom: &Atom) -> AstNode {
        let sup = atom
            .superscript
            .as_ref()
            .and_then(|atoms| parse(self.catalog, atoms));
        let sub = atom
            .subscript
            .as_ref()
            .and_then(|atoms| parse(self.catalog, atoms));
        policy::attach_scripts(node, sup, sub)
    }

    /// Trailing marks like `!` or `\prime`, applied greedily
    fn postfix(&self, node: AstNode, pos: usize) -> Step {
        let mut node = node;
        let mut pos = pos;
        loop {
            let at = self.skip_spacing(pos);
            let atom = match self.atoms.get(at) {
                Some(atom) => atom,
                None => break,
            };
            if !matches!(
                atom.kind,
                AtomKind::Ord | AtomKind::TextOrd | AtomKind::Close | AtomKind::Punct
            ) {
                break;
            }
            let glyph = atom.command();
            let second = self
                .atoms
                .get(at + 1)
                .filter(|next| glyph == "!" && !atom.has_scripts() && next.command() == "!");
            if let Some(second) = second {
                trace!("Digraph factorial2 at {}", at);
                let (end, decorated) = self.attach_scripts(
                    AstNode::postfix("factorial2", Some(node)),
                    Some(second),
                    at + 2,
                );
                node = decorated;
                pos = end;
            } else if let Some(name) = postfix_function(glyph) {
                let (end, decorated) =
                    self.attach_scripts(AstNode::call(name, vec![node]), Some(atom), at + 1);
                node = decorated;
                pos = end;
            } else {
                break;
            }
        }
        Step::new(pos, node)
    }
}

fn closes(atom: &Atom, right: &str) -> bool {
    match &atom.kind {
        AtomKind::SizedDelim { delim } => delim == right,
        AtomKind::Close | AtomKind::Ord | AtomKind::TextOrd => {
            atom.command() == right || atom.value == right
        }
        _ => false,
    }
}
