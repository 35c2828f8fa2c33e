//! The closed set of backend calls.

use std::fmt;

use super::errors::BackendError;

/// One read-only backend call. Also the cache key for its result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Every registered representative with their email.
    Users,
    /// Full incentive record for one representative.
    UserDetail { rep: String },
    Summary { rep: String },
    Activity { rep: String },
    Leaderboard,
    Rules,
    Cycles,
}

impl Operation {
    /// Endpoint names accepted by [`Operation::from_endpoint`].
    pub const ENDPOINTS: [&'static str; 7] = [
        "users",
        "user",
        "summary",
        "activity",
        "leaderboard",
        "rules",
        "cycles",
    ];

    /// Value of the `action` query parameter sent to the backend.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::Users => "users",
            Operation::UserDetail { .. } => "user",
            Operation::Summary { .. } => "summary",
            Operation::Activity { .. } => "activity",
            Operation::Leaderboard => "leaderboard",
            Operation::Rules => "rules",
            Operation::Cycles => "cycles",
        }
    }

    pub fn rep(&self) -> Option<&str> {
        match self {
            Operation::UserDetail { rep }
            | Operation::Summary { rep }
            | Operation::Activity { rep } => Some(rep),
            _ => None,
        }
    }

    /// Map an endpoint name and optional `rep` parameter to an operation.
    ///
    /// A blank `rep` counts as missing.
    pub fn from_endpoint(name: &str, rep: Option<&str>) -> Result<Self, BackendError> {
        let rep = rep.map(str::trim).filter(|rep| !rep.is_empty());
        let with_rep = |operation: &'static str| {
            rep.map(str::to_string)
                .ok_or(BackendError::MissingParameter {
                    operation,
                    parameter: "rep",
                })
        };

        match name {
            "users" => Ok(Operation::Users),
            "user" => Ok(Operation::UserDetail {
                rep: with_rep("user")?,
            }),
            "summary" => Ok(Operation::Summary {
                rep: with_rep("summary")?,
            }),
            "activity" => Ok(Operation::Activity {
                rep: with_rep("activity")?,
            }),
            "leaderboard" => Ok(Operation::Leaderboard),
            "rules" => Ok(Operation::Rules),
            "cycles" => Ok(Operation::Cycles),
            _ => Err(BackendError::UnknownOperation {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rep() {
            Some(rep) => write!(f, "{}?rep={rep}", self.action()),
            None => f.write_str(self.action()),
        }
    }
}
