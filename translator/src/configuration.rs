use mathast::{FormatOptions, ParseLimits};
use std::fs::File;
extern crate serde_yaml;

#[derive(Serialize, Deserialize, Default)]
pub struct Configuration {
    #[serde(default)]
    pub format: FormatOptions,
    /// Declarations merged over the standard catalog
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(rename = "max-atoms", default)]
    pub max_atoms: Option<usize>,
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<usize>,
}

impl Configuration {
    pub fn load(filename: &str) -> Result<Configuration, String> {
        let file = match File::open(filename) {
            Ok(f) => f,
            Err(msg) => return Err(format!("{}: {}", filename, msg)),
        };
        match serde_yaml::from_reader(file) {
            Ok(r) => Ok(r),
            Err(msg) => Err(format!("{}: {}", filename, msg)),
        }
    }

    pub fn limits(&self) -> ParseLimits {
        let default = ParseLimits::default();
        ParseLimits {
            max_atoms: self.max_atoms.unwrap_or(default.max_atoms),
            max_depth: self.max_depth.unwrap_or(default.max_depth),
        }
    }
}
