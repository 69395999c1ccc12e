//! Encoded entry points of the reference tokens

use serde::{Deserialize, Serialize};

use dao_core::{Action, Address, Amount, CallError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCall {
    /// Move `amount` from the caller to `to`
    Transfer {
        to: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
    /// Move `amount` to `to` and notify it; the ledger locks it for the caller
    TransferAndCall {
        to: Address,
        #[serde(with = "dao_core::serde_amount")]
        amount: Amount,
    },
}

impl TokenCall {
    pub fn into_action(self, token: Address) -> Result<Action, CallError> {
        Action::call(token, 0, &self)
    }
}
