use {
    alloy::{contract::Error as ContractError, transports::RpcError},
    anyhow::anyhow,
};

pub trait ContractErrorExt {
    /// Returns whether a given error is a contract error, this is considered to
    /// be all errors except the transport error where there is no revert data.
    fn is_contract_error(&self) -> bool;

    /// Returns whether a given error is a node error.
    fn is_node_error(&self) -> bool;

    /// Converts the error into an [`anyhow::Error`] that says whether the node
    /// failed or the contract rejected `action`.
    fn describe(self, action: &str) -> anyhow::Error;
}

impl ContractErrorExt for ContractError {
    fn is_contract_error(&self) -> bool {
        !self.is_node_error()
    }

    fn is_node_error(&self) -> bool {
        // Reverts reach us as transport errors that carry revert data, even if
        // that data is empty. Only transport errors without any revert data
        // are problems of the node itself.
        match self {
            ContractError::TransportError(RpcError::ErrorResp(err)) => {
                let no_revert_data = err.as_revert_data().is_none();
                tracing::debug!(?err, %no_revert_data, "transport rpc error");
                no_revert_data
            }
            ContractError::TransportError(_) => true,
            _ => false,
        }
    }

    fn describe(self, action: &str) -> anyhow::Error {
        let kind = if self.is_node_error() {
            "node error"
        } else {
            "contract rejected call"
        };
        anyhow!(self).context(format!("{kind} while trying to {action}"))
    }
}

/// Create an arbitrary alloy error that will convert into a "contract" error.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_alloy_contract_error() -> ContractError {
    ContractError::NotADeploymentTransaction
}

/// Create an arbitrary alloy error that will convert into a "node" error.
#[cfg(any(test, feature = "test-util"))]
pub fn testing_alloy_node_error() -> ContractError {
    ContractError::TransportError(alloy::transports::TransportError::ErrorResp(
        alloy::rpc::json_rpc::ErrorPayload::internal_error(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(testing_alloy_contract_error().is_contract_error());
        assert!(!testing_alloy_contract_error().is_node_error());
        assert!(testing_alloy_node_error().is_node_error());
        assert!(!testing_alloy_node_error().is_contract_error());
    }

    #[test]
    fn describes_errors() {
        let node = testing_alloy_node_error().describe("read the default fee");
        assert_eq!(
            node.to_string(),
            "node error while trying to read the default fee"
        );

        let contract = testing_alloy_contract_error().describe("create the pool");
        assert_eq!(
            contract.to_string(),
            "contract rejected call while trying to create the pool"
        );
    }
}
