//! Operation factory: stamps validated requests with ownership and a tracking id.

use crate::domain::entities::{Operation, ValidatedRequest};
use crate::errors::IdentityError;
use crate::ports::outbound::{IdentityProvider, TrackingIdGenerator};

/// Builds the operation document for an accepted request.
pub struct OperationFactory<'a, I: ?Sized, G: ?Sized> {
    identity: &'a I,
    ids: &'a G,
}

impl<'a, I, G> OperationFactory<'a, I, G>
where
    I: IdentityProvider + ?Sized,
    G: TrackingIdGenerator + ?Sized,
{
    /// Factory over the caller identity and tracking id capabilities.
    pub fn new(identity: &'a I, ids: &'a G) -> Self {
        Self { identity, ids }
    }

    /// Fails only when the caller identity cannot be resolved.
    pub fn build(&self, request: ValidatedRequest) -> Result<Operation, IdentityError> {
        let owner_org = self.identity.caller_identity()?;
        Ok(Operation::assemble(request, owner_org, self.ids.next_id()))
    }
}
