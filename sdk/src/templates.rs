//! Ready-made transactions.
//!
//! Currently just account creation: a payer account creates a new account
//! and registers one or more public keys on it. The new address is reported
//! through a `flow.AccountCreated` event once the transaction executes.

use crate::access::models::AccountKey;
use crate::encoding::EncodingError;
use crate::submit::TransactionRequest;
use crate::transaction::TransactionResult;
use crate::types::Address;
use crate::value::{Argument, Value};

/// Event type emitted for every new account.
pub const ACCOUNT_CREATED_EVENT: &str = "flow.AccountCreated";

/// Creates an account paid for by the single authorizer and adds each
/// hex-encoded key to it.
pub const CREATE_ACCOUNT_SCRIPT: &str = r#"transaction(publicKeys: [String]) {
    prepare(signer: AuthAccount) {
        let acct = AuthAccount(payer: signer)
        for key in publicKeys {
            acct.addPublicKey(key.decodeHex())
        }
    }
}"#;

/// The single `[String]` argument: each key's canonical encoding, hex.
pub fn create_account_arguments(keys: &[AccountKey]) -> Result<Vec<Argument>, EncodingError> {
    let encoded = keys
        .iter()
        .map(|k| Value::String(hex::encode(k.encode())))
        .collect();
    Ok(vec![Value::Array(encoded).to_argument()?])
}

/// A request for `creator` to create a new account holding `keys`. The
/// creator proposes, pays and authorizes.
pub fn create_account(
    keys: &[AccountKey],
    creator: Address,
    creator_key_index: u32,
) -> Result<TransactionRequest, EncodingError> {
    Ok(TransactionRequest::new(CREATE_ACCOUNT_SCRIPT, creator, creator_key_index)
        .with_arguments(create_account_arguments(keys)?)
        .with_authorizers(vec![creator]))
}

/// Address from the first `flow.AccountCreated` event of `result`, if any.
pub fn created_address(result: &TransactionResult) -> Result<Option<Address>, EncodingError> {
    for event in &result.events {
        if event.event_type != ACCOUNT_CREATED_EVENT {
            continue;
        }
        if let Some(Value::Address(address)) = event.field("address")? {
            return Ok(Some(address));
        }
    }
    Ok(None)
}
