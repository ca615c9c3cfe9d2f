use crate::model::RunState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SortVizError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("cannot {action} while {from:?}")]
    IllegalStateTransition {
        from: RunState,
        action: &'static str,
    },
}
