//! Catalog templates split into literal tags and placeholders.

#[derive(Debug, PartialEq)]
pub enum FormatItem<'a> {
    Tag(&'a str),
    /// `%`
    Argument,
    /// `%0` and `%1`
    Operand(usize),
    /// `%^`
    Sup,
    /// `%_`
    Sub,
}

/// Texts substituted into a template
pub struct Slots<'a> {
    pub argument: &'a str,
    pub operands: [&'a str; 2],
    pub sup: Option<&'a str>,
    pub sub: Option<&'a str>,
}

/// `\%` stays literal, every other `%` starts a placeholder.
pub fn parse_template(template: &str) -> Vec<FormatItem> {
    let bytes = template.as_bytes();
    let mut items = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'%') => i += 2,
            b'%' => {
                if start < i {
                    items.push(FormatItem::Tag(&template[start..i]));
                }
                let (item, width) = match bytes.get(i + 1) {
                    Some(b'0') => (FormatItem::Operand(0), 2),
                    Some(b'1') => (FormatItem::Operand(1), 2),
                    Some(b'^') => (FormatItem::Sup, 2),
                    Some(b'_') => (FormatItem::Sub, 2),
                    _ => (FormatItem::Argument, 1),
                };
                items.push(item);
                i += width;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        items.push(FormatItem::Tag(&template[start..]));
    }
    items
}

/// Substitutes all placeholders in one pass, so substituted text is never
/// scanned again. Decorations without a placeholder are appended.
pub fn fill_template(template: &str, slots: &Slots) -> String {
    let mut string = String::new();
    let mut sup_placed = false;
    let mut sub_placed = false;
    for item in parse_template(template) {
        match item {
            FormatItem::Tag(tag) => string.push_str(tag),
            FormatItem::Argument => string.push_str(slots.argument),
            FormatItem::Operand(i) => string.push_str(slots.operands[i]),
            FormatItem::Sup => {
                sup_placed = true;
                if let Some(sup) = slots.sup {
                    string.push_str(&format!("^{{{}}}", sup));
                }
            }
            FormatItem::Sub => {
                sub_placed = true;
                if let Some(sub) = slots.sub {
                    string.push_str(&format!("_{{{}}}", sub));
                }
            }
        }
    }
    if let Some(sup) = slots.sup.filter(|_| !sup_placed) {
        string.push_str(&format!("^{{{}}}", sup));
    }
    if let Some(sub) = slots.sub.filter(|_| !sub_placed) {
        string.push_str(&format!("_{{{}}}", sub));
    }
    string
}

fn tags(items: &[FormatItem]) -> String {
    items
        .iter()
        .filter_map(|item| match item {
            FormatItem::Tag(tag) => Some(*tag),
            _ => None,
        })
        .collect()
}

/// Whether the template puts its own fence around the argument, as `\sqrt{%}` or `\left|%\right|` do.
pub fn encloses_argument(template: &str) -> bool {
    let items = parse_template(template);
    items.iter().enumerate().any(|(i, item)| {
        if *item != FormatItem::Argument {
            return false;
        }
        let before = tags(&items[..i]);
        let after = tags(&items[i + 1..]);
        (before.ends_with('{') && after.starts_with('}'))
            || (before.contains("\\left") && after.contains("\\right"))
    })
}

/// Templates like `%!` which write the argument first
pub fn is_postfix_shaped(template: &str) -> bool {
    parse_template(template).first() == Some(&FormatItem::Argument)
}

#[cfg(test)]
mod specs {
    use super::*;

    fn slots<'a>(argument: &'a str, sup: Option<&'a str>) -> Slots<'a> {
        Slots {
            argument,
            operands: [argument, ""],
            sup,
            sub: None,
        }
    }

    #[test]
    fn template_items() {
        assert_eq!(
            parse_template("\\sin%^%_ %"),
            vec![
                FormatItem::Tag("\\sin"),
                FormatItem::Sup,
                FormatItem::Sub,
                FormatItem::Tag(" "),
                FormatItem::Argument
            ]
        );
        assert_eq!(
            parse_template("%0+%1"),
            vec![
                FormatItem::Operand(0),
                FormatItem::Tag("+"),
                FormatItem::Operand(1)
            ]
        );
    }

    #[test]
    fn escaped_percent_is_literal() {
        assert_eq!(
            parse_template("%\\%"),
            vec![FormatItem::Argument, FormatItem::Tag("\\%")]
        );
        assert_eq!(fill_template("%\\%", &slots("5", None)), "5\\%");
    }

    #[test]
    fn substitution_is_single_pass() {
        assert_eq!(fill_template("\\sqrt{%}", &slots("%0", None)), "\\sqrt{%0}");
    }

    #[test]
    fn decorations() {
        assert_eq!(fill_template("\\sin%^%_ %", &slots("x", Some("2"))), "\\sin^{2} x");
        assert_eq!(fill_template("\\sin%^%_ %", &slots("x", None)), "\\sin x");
        assert_eq!(fill_template("%!", &slots("n", Some("2"))), "n!^{2}");
    }

    #[test]
    fn enclosing_templates() {
        assert!(encloses_argument("\\sqrt{%}%^%_"));
        assert!(encloses_argument("\\left|%\\right|%^%_"));
        assert!(!encloses_argument("\\sin%^%_ %"));
        assert!(!encloses_argument("%!"));
        assert!(is_postfix_shaped("%!"));
        assert!(!is_postfix_shaped("\\sin%^%_ %"));
    }
}
