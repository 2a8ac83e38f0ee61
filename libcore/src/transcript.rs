//! Parsed expressions in a form other tools can load again.
use crate::ast::AstNode;
use crate::error::Error;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TranscriptEntry {
    /// Source text as written by the user
    pub source: String,
    pub ast: Option<AstNode>,
    pub latex: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn write_bincode<W>(&self, writer: W) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn read_bincode<R>(reader: R) -> Result<Transcript, Error>
    where
        R: std::io::Read,
    {
        Ok(bincode::deserialize_from(reader)?)
    }

    pub fn write_yaml<W>(&self, writer: W) -> Result<(), Error>
    where
        W: std::io::Write,
    {
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read_yaml<R>(reader: R) -> Result<Transcript, Error>
    where
        R: std::io::Read,
    {
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod specs {
    use super::*;
    use stringreader::StringReader;

    fn sample() -> Transcript {
        Transcript {
            entries: vec![
                TranscriptEntry {
                    source: "2x".to_string(),
                    ast: Some(AstNode::binary(
                        "*",
                        AstNode::number(2.0),
                        AstNode::symbol("x"),
                    )),
                    latex: "2 \\cdot x".to_string(),
                },
                TranscriptEntry {
                    source: "".to_string(),
                    ast: None,
                    latex: "".to_string(),
                },
            ],
        }
    }

    #[test]
    fn bincode_keeps_trees() {
        let mut buffer: Vec<u8> = Vec::new();
        sample().write_bincode(&mut buffer).unwrap();
        let actual = Transcript::read_bincode(&buffer[..]).unwrap();
        assert_eq!(actual, sample());
    }

    #[test]
    fn yaml_from_reader() {
        let reader = StringReader::new(
            "entries:\n  - source: x\n    ast:\n      Symbol:\n        name: x\n        variant: ~\n        scripts:\n          sup: ~\n          sub: ~\n    latex: x\n",
        );
        let actual = Transcript::read_yaml(reader).unwrap();
        assert_eq!(actual.entries.len(), 1);
        assert_eq!(actual.entries[0].ast, Some(AstNode::symbol("x")));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let reader = StringReader::new("entries: [");
        assert!(matches!(
            Transcript::read_yaml(reader),
            Err(Error::Yaml(_))
        ));
    }
}
