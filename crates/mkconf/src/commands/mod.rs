//! CLI command implementations.

mod nav;
mod publish;

pub(crate) use nav::NavArgs;
pub(crate) use publish::PublishArgs;
