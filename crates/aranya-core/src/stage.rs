//! Stage Trait: the single contract every pipeline stage implements
use async_trait::async_trait;
use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::HerbError;

/// Data contract checked at the model call boundary.
///
/// Inputs that fail it never reach the network; outputs that fail it are
/// schema violations.
pub trait Contract {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<T: Contract> Contract for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        self.iter().try_for_each(Contract::validate)
    }
}

/// One independently invocable unit wrapping a single structured model call
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: Serialize + Send + Sync;
    type Output: Serialize + Send;

    /// Unique stage id (e.g. "identify.herb.v1")
    fn id(&self) -> &'static str;

    /// Run the stage once. Implementations issue exactly one model call and
    /// never retry.
    async fn run(
        &self,
        input: &Self::Input,
        ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError>;
}
