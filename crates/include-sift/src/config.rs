//! Configuration for an analysis run.

use serde::{Deserialize, Serialize};

/// Fine-tuning of what counts as a use.
///
/// Changing the policy serves two purposes: marking more things used
/// reduces false positives for "unused include", while marking fewer
/// improves "missing include" the same way; and different coding styles
/// make different decisions about which includes are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Does construction count as use of the type when the type is not
    /// named? e.g. `print_vector({x, y, z})` - is std::vector used?
    pub construction: bool,
    /// Is member access tracked as a reference?
    pub members: bool,
    /// Are overloaded-operator calls tracked as references?
    pub operators: bool,
}

/// Options for the diagnostic adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticOptions {
    /// Consider angle-bracket includes with recognized standard-library
    /// spellings for the unused check. The standalone tool enables this;
    /// editors typically leave it off until stdlib mappings are complete.
    pub analyze_stdlib: bool,
    /// Also report satisfied references and used includes, as remarks.
    pub show_satisfied: bool,
    /// After reporting a header unsatisfied once, treat later references
    /// to the same header as satisfied instead of repeating the error.
    pub recover: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            analyze_stdlib: true,
            show_satisfied: false,
            recover: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert!(!policy.construction);
        assert!(!policy.members);
        assert!(!policy.operators);

        let opts = DiagnosticOptions::default();
        assert!(opts.analyze_stdlib);
        assert!(!opts.show_satisfied);
        assert!(opts.recover);
    }
}
