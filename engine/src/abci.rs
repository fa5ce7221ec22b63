//! Request dispatcher for the opaque `process` exchange.
//!
//! The host runtime drives a ledger through the block lifecycle:
//!
//! ```text
//! InitChain → (BeginBlock → DeliverTx* → EndBlock → Commit)*
//! ```
//!
//! `Info` and `Query` are read-only and may arrive at any time. The open
//! block between `BeginBlock` and `Commit` is tracked in a [`BlockSession`]
//! owned next to the ledger.

use chainbridge_primitives::{
    abci::{CODE_BAD_ENCODING, CODE_OK, CODE_REJECTED},
    codec::{decode_request, decode_transaction, encode_response},
    AbciRequest, AbciResponse, BlockHeight, CoreError, CoreResult, GenesisAccount,
};
use tracing::{debug, warn};

use crate::ledger::Ledger;
use crate::validation::{validate_address, validate_genesis_accounts};

/// Block opened by `BeginBlock`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenBlock {
    height: BlockHeight,
    proposer: String,
    ended: bool,
}

/// Per-ledger lifecycle state for the request dispatcher.
#[derive(Debug, Clone, Default)]
pub struct BlockSession {
    open: Option<OpenBlock>,
}

impl BlockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of the open block, if any.
    pub fn open_height(&self) -> Option<BlockHeight> {
        self.open.as_ref().map(|b| b.height)
    }
}

/// Decode `request`, dispatch it, and encode the response.
///
/// Decode failures are `DeserializationError`, encode failures
/// `SerializationError`. Lifecycle violations are `StateError`.
pub fn process(ledger: &mut Ledger, session: &mut BlockSession, request: &[u8]) -> CoreResult<Vec<u8>> {
    let request = decode_request(request)?;
    debug!(request = request.name(), "processing request");
    let response = handle_request(ledger, session, request)?;
    encode_response(&response)
}

/// Dispatch a decoded request.
pub fn handle_request(
    ledger: &mut Ledger,
    session: &mut BlockSession,
    request: AbciRequest,
) -> CoreResult<AbciResponse> {
    match request {
        AbciRequest::Info => Ok(AbciResponse::Info {
            height: ledger.height(),
            latest_hash: ledger.latest_hash(),
            app_hash: ledger.state_root(),
        }),
        AbciRequest::InitChain {
            validators,
            genesis_accounts,
        } => init_chain(ledger, &validators, &genesis_accounts),
        AbciRequest::BeginBlock { height, proposer } => {
            begin_block(ledger, session, height, proposer)
        }
        AbciRequest::DeliverTx { tx } => deliver_tx(ledger, session, &tx),
        AbciRequest::EndBlock { height } => end_block(session, height),
        AbciRequest::Commit => commit(ledger, session),
        AbciRequest::Query { path, data } => Ok(query(ledger, &path, &data)),
    }
}

fn init_chain(
    ledger: &mut Ledger,
    validators: &[String],
    accounts: &[GenesisAccount],
) -> CoreResult<AbciResponse> {
    for v in validators {
        validate_address(v, "validator")?;
    }
    validate_genesis_accounts(accounts)?;
    for account in accounts {
        ledger.init_account(&account.address, account.balance)?;
    }
    debug!(
        accounts = accounts.len(),
        validators = validators.len(),
        "chain initialised"
    );
    Ok(AbciResponse::InitChain)
}

fn begin_block(
    ledger: &Ledger,
    session: &mut BlockSession,
    height: BlockHeight,
    proposer: String,
) -> CoreResult<AbciResponse> {
    if let Some(open) = &session.open {
        return Err(CoreError::State(format!(
            "block {} is already open",
            open.height
        )));
    }
    let expected = ledger.height() + 1;
    if height != expected {
        return Err(CoreError::State(format!(
            "begin_block height mismatch: expected {}, got {}",
            expected, height
        )));
    }
    validate_address(&proposer, "proposer")?;

    session.open = Some(OpenBlock {
        height,
        proposer,
        ended: false,
    });
    Ok(AbciResponse::BeginBlock)
}

/// Apply one encoded transaction. Never fails the call itself: rejections
/// are reported through the response code.
fn deliver_tx(
    ledger: &mut Ledger,
    session: &BlockSession,
    raw: &[u8],
) -> CoreResult<AbciResponse> {
    match &session.open {
        None => return Err(CoreError::State("deliver_tx without an open block".into())),
        Some(open) if open.ended => {
            return Err(CoreError::State(format!(
                "deliver_tx after end_block for height {}",
                open.height
            )))
        }
        Some(_) => {}
    }

    let tx = match decode_transaction(raw) {
        Ok(tx) => tx,
        Err(err) => {
            warn!(error = %err, "undecodable transaction");
            return Ok(AbciResponse::DeliverTx {
                code: CODE_BAD_ENCODING,
                log: err.to_string(),
            });
        }
    };

    Ok(match ledger.apply_transaction(tx) {
        Ok(()) => AbciResponse::DeliverTx {
            code: CODE_OK,
            log: String::new(),
        },
        Err(err) => AbciResponse::DeliverTx {
            code: CODE_REJECTED,
            log: err.to_string(),
        },
    })
}

fn end_block(session: &mut BlockSession, height: BlockHeight) -> CoreResult<AbciResponse> {
    let open = session
        .open
        .as_mut()
        .ok_or_else(|| CoreError::State("end_block without an open block".into()))?;
    if open.height != height {
        return Err(CoreError::State(format!(
            "end_block height mismatch: open {}, got {}",
            open.height, height
        )));
    }
    if open.ended {
        return Err(CoreError::State(format!("end_block repeated for height {}", height)));
    }
    open.ended = true;
    Ok(AbciResponse::EndBlock {
        validator_updates: Vec::new(),
    })
}

fn commit(ledger: &mut Ledger, session: &mut BlockSession) -> CoreResult<AbciResponse> {
    let open = session
        .open
        .as_ref()
        .ok_or_else(|| CoreError::State("commit without an open block".into()))?;
    if !open.ended {
        debug!(height = open.height, "commit before end_block");
    }

    let block = ledger.create_block(&open.proposer)?;
    let response = AbciResponse::Commit {
        height: block.height,
        app_hash: block.state_root,
    };
    session.open = None;
    Ok(response)
}

fn query(ledger: &Ledger, path: &str, _data: &[u8]) -> AbciResponse {
    let ok = |value: Vec<u8>| AbciResponse::Query {
        code: CODE_OK,
        value,
        log: String::new(),
    };

    if let Some(address) = path.strip_prefix("/balance/") {
        return ok(ledger.get_balance(address).to_le_bytes().to_vec());
    }
    if let Some(address) = path.strip_prefix("/nonce/") {
        return ok(ledger.get_nonce(address).to_le_bytes().to_vec());
    }
    match path {
        "/height" => ok(ledger.height().to_le_bytes().to_vec()),
        "/latest_hash" => ok(ledger.latest_hash().to_vec()),
        "/state_root" => ok(ledger.state_root().to_vec()),
        _ => AbciResponse::Query {
            code: CODE_REJECTED,
            value: Vec::new(),
            log: format!("unknown query path: {}", path),
        },
    }
}
