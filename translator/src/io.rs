use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

/// Strips a trailing `//` comment
fn code(line: &str) -> &str {
    match line.split_once("//") {
        Some((code, _)) => code,
        None => line,
    }
}

pub fn parse_expressions<R: BufRead>(reader: R) -> Result<Vec<String>, String> {
    let mut expressions = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|msg| msg.to_string())?;
        let code = code(&line).trim();
        if !code.is_empty() {
            expressions.push(code.to_string());
        }
    }
    Ok(expressions)
}

pub fn read_expressions(filename: &str) -> Result<Vec<String>, String> {
    let file = File::open(filename).map_err(|msg| format!("{}: {}", filename, msg))?;
    parse_expressions(BufReader::new(file))
}

#[cfg(test)]
mod specs {
    use super::*;

    #[test]
    fn comments_and_blank_lines() {
        let source = "// header\n2+3\n\n\\sin x // trailing\n";
        let actual = parse_expressions(source.as_bytes()).unwrap();
        assert_eq!(actual, vec!["2+3".to_string(), "\\sin x".to_string()]);
    }
}
