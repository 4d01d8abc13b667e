use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The analysis a job performs on the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    Calc,
    Parse,
    Interpreter,
    Sign,
    Security,
    ProgramVerification,
    Graph,
    Compiler,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 8] = [
        AnalysisKind::Calc,
        AnalysisKind::Parse,
        AnalysisKind::Interpreter,
        AnalysisKind::Sign,
        AnalysisKind::Security,
        AnalysisKind::ProgramVerification,
        AnalysisKind::Graph,
        AnalysisKind::Compiler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Calc => "Calc",
            AnalysisKind::Parse => "Parse",
            AnalysisKind::Interpreter => "Interpreter",
            AnalysisKind::Sign => "Sign",
            AnalysisKind::Security => "Security",
            AnalysisKind::ProgramVerification => "ProgramVerification",
            AnalysisKind::Graph => "Graph",
            AnalysisKind::Compiler => "Compiler",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownAnalysis(s.to_string()))
    }
}
