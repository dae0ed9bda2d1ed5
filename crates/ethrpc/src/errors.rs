use alloy::transports::{RpcError, TransportError};

/// Messages nodes use to reject a transaction whose sender can't pay for gas
/// and value. geth and erigon report the first, hardhat and anvil the others.
const INSUFFICIENT_FUNDS: &[&str] = &[
    "insufficient funds",
    "sender doesn't have enough funds",
    "insufficient balance",
];

pub trait RpcErrorExt {
    /// Whether the node rejected a transaction because the sender lacks
    /// funds.
    fn is_insufficient_funds(&self) -> bool;

    /// Whether the node reported that executing the call reverted, for
    /// example while estimating gas for a deployment whose constructor
    /// reverts.
    fn is_revert(&self) -> bool;
}

impl RpcErrorExt for TransportError {
    fn is_insufficient_funds(&self) -> bool {
        match self {
            RpcError::ErrorResp(err) => {
                let message = err.message.to_lowercase();
                INSUFFICIENT_FUNDS
                    .iter()
                    .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }

    fn is_revert(&self) -> bool {
        match self {
            RpcError::ErrorResp(err) => {
                // Revert data may be empty (e.g. `revert()` without a reason)
                // in which case only the message identifies the revert.
                err.as_revert_data().is_some()
                    || err.message.to_lowercase().contains("execution reverted")
            }
            _ => false,
        }
    }
}

/// Create an arbitrary node error response with the given message.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_node_error(message: &'static str) -> TransportError {
    TransportError::ErrorResp(alloy::rpc::json_rpc::ErrorPayload {
        code: -32000,
        message: message.into(),
        data: None,
    })
}

/// Create an arbitrary error that never reached the node.
/// Useful for testing.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_transport_error() -> TransportError {
    alloy::transports::TransportErrorKind::backend_gone()
}
