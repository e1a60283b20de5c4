use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Transcribe,
    Process,
    GenerateStyle,
    GenerateImage,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transcribe => "transcribe",
            Operation::Process => "process",
            Operation::GenerateStyle => "generate_style",
            Operation::GenerateImage => "generate_image",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcribe" => Ok(Operation::Transcribe),
            "process" => Ok(Operation::Process),
            "generate_style" => Ok(Operation::GenerateStyle),
            "generate_image" => Ok(Operation::GenerateImage),
            _ => Err(format!("Invalid operation: {}", s)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
