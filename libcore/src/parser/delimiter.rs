//! Fence pairs and the functions they denote.

/// Closing glyph expected for an opening one
pub fn right_delimiter(left: &str) -> Option<&'static str> {
    match left {
        "(" => Some(")"),
        "{" => Some("}"),
        "[" => Some("]"),
        "|" => Some("|"),
        "\\lbrace" => Some("\\rbrace"),
        "\\langle" => Some("\\rangle"),
        "\\lfloor" => Some("\\rfloor"),
        "\\lceil" => Some("\\rceil"),
        "\\vert" => Some("\\vert"),
        "\\lvert" => Some("\\rvert"),
        "\\Vert" => Some("\\Vert"),
        "\\lVert" => Some("\\rVert"),
        "\\lbrack" => Some("\\rbrack"),
        "\\ulcorner" => Some("\\urcorner"),
        "\\llcorner" => Some("\\lrcorner"),
        "\\lgroup" => Some("\\rgroup"),
        "\\lmoustache" => Some("\\rmoustache"),
        _ => None,
    }
}

/// Named function for a fence pair, e.g. `floor` for `\lfloor x \rfloor`
pub fn pairing_function(left: &str, right: &str) -> Option<&'static str> {
    match (left, right) {
        ("\\lfloor", "\\rfloor") => Some("floor"),
        ("\\lceil", "\\rceil") => Some("ceil"),
        ("\\vert", "\\vert") | ("\\lvert", "\\rvert") | ("|", "|") => Some("abs"),
        ("\\Vert", "\\Vert") | ("\\lVert", "\\rVert") => Some("norm"),
        ("\\ulcorner", "\\urcorner") => Some("ucorner"),
        ("\\llcorner", "\\lrcorner") => Some("lcorner"),
        ("\\langle", "\\rangle") => Some("angle"),
        ("\\lgroup", "\\rgroup") => Some("group"),
        ("\\lmoustache", "\\rmoustache") => Some("moustache"),
        ("\\lbrace", "\\rbrace") => Some("brace"),
        _ => None,
    }
}

/// Glyphs like `|` which open and close the same pair
pub fn is_self_closing(glyph: &str) -> bool {
    right_delimiter(glyph) == Some(glyph)
}

/// Whether a glyph can only end a pair
pub fn is_closing_only(glyph: &str) -> bool {
    right_delimiter(glyph).is_none()
        && matches!(
            glyph,
            ")" | "}"
                | "]"
                | "\\rbrace"
                | "\\rangle"
                | "\\rfloor"
                | "\\rceil"
                | "\\rvert"
                | "\\rVert"
                | "\\rbrack"
                | "\\urcorner"
                | "\\lrcorner"
                | "\\rgroup"
                | "\\rmoustache"
        )
}

/// Postfix function denoted by a trailing mark
pub fn postfix_function(glyph: &str) -> Option<&'static str> {
    match glyph {
        "!" => Some("factorial"),
        "\\dag" | "\\dagger" => Some("dagger"),
        "\\ddagger" => Some("dagger2"),
        "\\maltese" => Some("maltese"),
        "\\backprime" => Some("backprime"),
        "\\backdoubleprime" => Some("backprime2"),
        "\\prime" | "'" => Some("prime"),
        "\\doubleprime" => Some("prime2"),
        "\\$" => Some("$"),
        "\\%" => Some("%"),
        "\\_" => Some("_"),
        "\\degree" => Some("degree"),
        _ => None,
    }
}
