pub mod command;
pub mod legend;
pub mod naming;
pub mod parameters;
pub mod pipeline;
pub mod placement;
pub mod query;
pub mod schedule;
pub mod session;

pub mod errors {
    use thiserror::Error;
    use zbim_core::element::{Category, ElementClass, ElementId};
    use zbim_core::host::HostError;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error(transparent)]
        Host(#[from] HostError),
        #[error("category {0:?} has no elements to resolve parameters from")]
        EmptyCategory(Category),
        #[error("element {0} not found")]
        ElementNotFound(ElementId),
        #[error("element {id} is not a {expected:?}")]
        UnexpectedKind { id: ElementId, expected: ElementClass },
    }
}
