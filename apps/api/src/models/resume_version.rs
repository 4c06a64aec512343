use serde::{Deserialize, Serialize};

/// Length of the rewritten resume the editor should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeVersion {
    #[default]
    Concise,
    Full,
}

impl ResumeVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeVersion::Concise => "concise",
            ResumeVersion::Full => "full",
        }
    }
}
