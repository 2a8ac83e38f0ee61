#[macro_use]
extern crate serde_derive;

use clap::{Parser, ValueEnum};
use itertools::Itertools;
use mathast::{
    parse_with_limits, render, tokenize, AstNode, Context, FormatOptions, ParseLimits,
    Transcript, TranscriptEntry,
};
use rayon::prelude::*;
use std::fs::File;
mod configuration;
use configuration::Configuration;
mod io;
use io::read_expressions;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AstFormat {
    Yaml,
    Plain,
    None,
}

#[derive(Parser, Debug)]
#[command(version, about = "Translates LaTeX formulas into syntax trees and back")]
struct Input {
    /// YAML file with formatting options, limits and an optional catalog
    #[clap(long)]
    config: Option<String>,

    /// YAML file with declarations merged over the standard catalog
    #[clap(long)]
    catalog: Option<String>,

    /// Prints the parsed tree below each result
    #[clap(long, value_enum, default_value = "none")]
    ast: AstFormat,

    /// Writes all results to this file as bincode
    #[clap(long)]
    bincode: Option<String>,

    /// Reads one expression per line instead of the arguments
    #[clap(long)]
    file: Option<String>,

    expressions: Vec<String>,
}

fn translate(
    context: &Context,
    options: &FormatOptions,
    limits: &ParseLimits,
    source: &str,
) -> TranscriptEntry {
    let ast = match tokenize(source) {
        Ok(atoms) => parse_with_limits(context, &atoms, limits),
        Err(err) => Some(AstNode::error(source, &err.to_string())),
    };
    let latex = ast
        .as_ref()
        .map(|ast| render(context, ast, options))
        .unwrap_or_default();
    TranscriptEntry {
        source: source.to_string(),
        ast,
        latex,
    }
}

fn print_entry(entry: &TranscriptEntry, format: AstFormat) -> Result<String, String> {
    let mut lines = vec![format!("{} => {}", entry.source, entry.latex)];
    match (&entry.ast, format) {
        (Some(ast), AstFormat::Plain) => lines.push(format!("  {}", ast)),
        (Some(ast), AstFormat::Yaml) => {
            let yaml = serde_yaml::to_string(ast).map_err(|msg| msg.to_string())?;
            lines.extend(yaml.lines().map(|line| format!("  {}", line)));
        }
        _ => (),
    }
    Ok(lines.join("\n"))
}

fn run(input: Input) -> Result<(), String> {
    let configuration = match &input.config {
        Some(filename) => Configuration::load(filename)?,
        None => Configuration::default(),
    };
    let context = match input.catalog.as_ref().or(configuration.catalog.as_ref()) {
        Some(filename) => Context::load(filename).map_err(|msg| format!("{}: {}", filename, msg))?,
        None => Context::standard(),
    };
    let expressions = match &input.file {
        Some(filename) => read_expressions(filename)?,
        None => input.expressions.clone(),
    };
    let limits = configuration.limits();

    let entries = expressions
        .par_iter()
        .map(|source| translate(&context, &configuration.format, &limits, source))
        .collect::<Vec<TranscriptEntry>>();

    let printed = entries
        .iter()
        .map(|entry| print_entry(entry, input.ast))
        .collect::<Result<Vec<String>, String>>()?;
    println!("{}", printed.iter().join("\n"));

    if let Some(filename) = &input.bincode {
        let writer = File::create(filename).map_err(|msg| format!("{}: {}", filename, msg))?;
        Transcript { entries }
            .write_bincode(writer)
            .map_err(|msg| msg.to_string())?;
    }
    Ok(())
}

fn main() {
    if let Err(msg) = run(Input::parse()) {
        eprintln!("{}", msg);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod specs {
    use super::*;

    #[test]
    fn translates_in_order() {
        let context = Context::standard();
        let options = FormatOptions::default();
        let limits = ParseLimits::default();
        let entry = translate(&context, &options, &limits, "2+3*4");
        assert_eq!(entry.latex, "2+3 \\cdot 4");
        assert_eq!(entry.ast.map(|ast| ast.to_string()), Some("2+3*4".to_string()));
    }

    #[test]
    fn lexer_failures_become_error_nodes() {
        let context = Context::standard();
        let entry = translate(
            &context,
            &FormatOptions::default(),
            &ParseLimits::default(),
            "x}",
        );
        assert!(matches!(entry.ast, Some(AstNode::Error { .. })));
        assert_eq!(entry.latex, "\\bbox[#F56165]{x}}");
    }

    #[test]
    fn plain_tree_output() {
        let entry = TranscriptEntry {
            source: "x".to_string(),
            ast: Some(AstNode::symbol("x")),
            latex: "x".to_string(),
        };
        assert_eq!(print_entry(&entry, AstFormat::Plain).unwrap(), "x => x\n  x");
        assert_eq!(print_entry(&entry, AstFormat::None).unwrap(), "x => x");
    }
}
