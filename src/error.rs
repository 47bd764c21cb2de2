use thiserror::Error;

/// Everything that can go wrong while building or driving a fuzzy system.
///
/// All variants except `ForeignRegistry` and `MissingInput` are construction errors: once a registry
/// and rule base exist, evaluating crisp numbers never fails.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FuzzyError {
    #[error("invalid domain for variable `{variable}`: {reason}")]
    InvalidDomain { variable: String, reason: String },
    #[error("term `{term}` of variable `{variable}` has an invalid trapezoid {corners:?}: {reason}")]
    InvalidMembershipShape {
        variable: String,
        term: String,
        corners: [f64; 4],
        reason: String,
    },
    #[error("duplicate name `{name}` in {scope}")]
    DuplicateName { scope: String, name: String },
    #[error("rule {rule} references unknown {what} `{name}`")]
    InvalidRuleReference { rule: usize, what: &'static str, name: String },
    #[error("the rule base was built against a different variable registry")]
    ForeignRegistry,
    #[error("no crisp input was provided for variable `{variable}`")]
    MissingInput { variable: String },
}

pub type Result<T> = std::result::Result<T, FuzzyError>;
