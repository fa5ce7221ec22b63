//! Deterministic binary serialization for transactions, block preimages and
//! the `process` request/response exchange.
//!
//! Encoding format:
//! - Fixed-size fields (Hash, u64, u32, u8) are written directly, little-endian
//! - Variable-length fields (Vec<u8>, String) are length-prefixed (u32 LE)
//! - Repeated fields are count-prefixed (u32 LE) then concatenated
//! - Requests and responses start with a one-byte tag
//!
//! Decoding rejects truncated input and trailing bytes.

use crate::abci::{AbciRequest, AbciResponse, GenesisAccount};
use crate::block::Transaction;
use crate::error::{CoreError, CoreResult};
use crate::types::{BlockHeight, Hash};

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> CoreResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(CoreError::Deserialization("unexpected end of data".into()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> CoreResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    fn read_u32(&mut self) -> CoreResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> CoreResult<u64> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_hash(&mut self) -> CoreResult<Hash> {
        let bytes = self.read_bytes(32)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(bytes);
        Ok(hash)
    }

    fn read_var_bytes(&mut self) -> CoreResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    fn read_string(&mut self) -> CoreResult<String> {
        let bytes = self.read_var_bytes()?;
        String::from_utf8(bytes)
            .map_err(|_| CoreError::Deserialization("invalid UTF-8".into()))
    }

    /// Read a sequence count. Each item occupies at least `min_item_len`
    /// bytes, so counts larger than the remaining input are rejected before
    /// any allocation.
    fn read_count(&mut self, min_item_len: usize) -> CoreResult<usize> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(min_item_len.max(1)) > self.remaining() {
            return Err(CoreError::Deserialization(format!(
                "sequence count {} exceeds remaining input",
                count
            )));
        }
        Ok(count)
    }

    fn finish(self) -> CoreResult<()> {
        if self.remaining() != 0 {
            return Err(CoreError::Deserialization(format!(
                "{} trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }
}

// ── Encoding helpers ──

fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_hash(buf: &mut Vec<u8>, h: &Hash) {
    buf.extend_from_slice(h);
}

fn write_len(buf: &mut Vec<u8>, len: usize) -> CoreResult<()> {
    let len = u32::try_from(len).map_err(|_| {
        CoreError::Serialization(format!("length {} exceeds u32::MAX", len))
    })?;
    write_u32(buf, len);
    Ok(())
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) -> CoreResult<()> {
    write_len(buf, data.len())?;
    buf.extend_from_slice(data);
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> CoreResult<()> {
    write_var_bytes(buf, s.as_bytes())
}

// ── Transaction encoding ──

fn write_transaction(buf: &mut Vec<u8>, tx: &Transaction) -> CoreResult<()> {
    write_string(buf, &tx.from)?;
    write_string(buf, &tx.to)?;
    write_u64(buf, tx.amount);
    write_u64(buf, tx.gas_fee);
    write_u64(buf, tx.timestamp);
    write_u64(buf, tx.nonce);
    write_var_bytes(buf, &tx.signature)
}

/// Encode a `Transaction` to deterministic bytes.
pub fn encode_transaction(tx: &Transaction) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(64 + tx.from.len() + tx.to.len() + tx.signature.len());
    write_transaction(&mut buf, tx)?;
    Ok(buf)
}

/// Decode a `Transaction` from bytes.
pub fn decode_transaction(data: &[u8]) -> CoreResult<Transaction> {
    let mut r = Reader::new(data);
    let tx = Transaction {
        from: r.read_string()?,
        to: r.read_string()?,
        amount: r.read_u64()?,
        gas_fee: r.read_u64()?,
        timestamp: r.read_u64()?,
        nonce: r.read_u64()?,
        signature: r.read_var_bytes()?,
    };
    r.finish()?;
    Ok(tx)
}

/// Encode the block hash preimage: `prev_hash || height || proposer || count || tx_hash*`.
pub fn encode_block_preimage(
    prev_hash: &Hash,
    height: BlockHeight,
    proposer: &str,
    tx_hashes: &[Hash],
) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(32 + 8 + 4 + proposer.len() + 4 + 32 * tx_hashes.len());
    write_hash(&mut buf, prev_hash);
    write_u64(&mut buf, height);
    write_string(&mut buf, proposer)?;
    write_len(&mut buf, tx_hashes.len())?;
    for h in tx_hashes {
        write_hash(&mut buf, h);
    }
    Ok(buf)
}

// ── Request encoding ──

/// Encode an `AbciRequest` to deterministic bytes.
pub fn encode_request(req: &AbciRequest) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    write_u8(&mut buf, req.tag());

    match req {
        AbciRequest::Info | AbciRequest::Commit => {}
        AbciRequest::InitChain {
            validators,
            genesis_accounts,
        } => {
            write_len(&mut buf, validators.len())?;
            for v in validators {
                write_string(&mut buf, v)?;
            }
            write_len(&mut buf, genesis_accounts.len())?;
            for account in genesis_accounts {
                write_string(&mut buf, &account.address)?;
                write_u64(&mut buf, account.balance);
            }
        }
        AbciRequest::BeginBlock { height, proposer } => {
            write_u64(&mut buf, *height);
            write_string(&mut buf, proposer)?;
        }
        AbciRequest::DeliverTx { tx } => {
            write_var_bytes(&mut buf, tx)?;
        }
        AbciRequest::EndBlock { height } => {
            write_u64(&mut buf, *height);
        }
        AbciRequest::Query { path, data } => {
            write_string(&mut buf, path)?;
            write_var_bytes(&mut buf, data)?;
        }
    }

    Ok(buf)
}

/// Decode an `AbciRequest` from bytes.
pub fn decode_request(data: &[u8]) -> CoreResult<AbciRequest> {
    let mut r = Reader::new(data);
    let tag = r.read_u8()?;

    let request = match tag {
        0x01 => AbciRequest::Info,
        0x02 => {
            let validator_count = r.read_count(4)?;
            let mut validators = Vec::with_capacity(validator_count);
            for _ in 0..validator_count {
                validators.push(r.read_string()?);
            }
            let account_count = r.read_count(12)?;
            let mut genesis_accounts = Vec::with_capacity(account_count);
            for _ in 0..account_count {
                genesis_accounts.push(GenesisAccount {
                    address: r.read_string()?,
                    balance: r.read_u64()?,
                });
            }
            AbciRequest::InitChain {
                validators,
                genesis_accounts,
            }
        }
        0x03 => AbciRequest::BeginBlock {
            height: r.read_u64()?,
            proposer: r.read_string()?,
        },
        0x04 => AbciRequest::DeliverTx {
            tx: r.read_var_bytes()?,
        },
        0x05 => AbciRequest::EndBlock {
            height: r.read_u64()?,
        },
        0x06 => AbciRequest::Commit,
        0x07 => AbciRequest::Query {
            path: r.read_string()?,
            data: r.read_var_bytes()?,
        },
        other => {
            return Err(CoreError::Deserialization(format!(
                "unknown request tag: 0x{:02x}",
                other
            )));
        }
    };

    r.finish()?;
    Ok(request)
}

// ── Response encoding ──

/// Encode an `AbciResponse` to deterministic bytes.
pub fn encode_response(resp: &AbciResponse) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(80);
    write_u8(&mut buf, resp.tag());

    match resp {
        AbciResponse::Info {
            height,
            latest_hash,
            app_hash,
        } => {
            write_u64(&mut buf, *height);
            write_hash(&mut buf, latest_hash);
            write_hash(&mut buf, app_hash);
        }
        AbciResponse::InitChain | AbciResponse::BeginBlock => {}
        AbciResponse::DeliverTx { code, log } => {
            write_u32(&mut buf, *code);
            write_string(&mut buf, log)?;
        }
        AbciResponse::EndBlock { validator_updates } => {
            write_len(&mut buf, validator_updates.len())?;
            for v in validator_updates {
                write_string(&mut buf, v)?;
            }
        }
        AbciResponse::Commit { height, app_hash } => {
            write_u64(&mut buf, *height);
            write_hash(&mut buf, app_hash);
        }
        AbciResponse::Query { code, value, log } => {
            write_u32(&mut buf, *code);
            write_var_bytes(&mut buf, value)?;
            write_string(&mut buf, log)?;
        }
    }

    Ok(buf)
}

/// Decode an `AbciResponse` from bytes.
pub fn decode_response(data: &[u8]) -> CoreResult<AbciResponse> {
    let mut r = Reader::new(data);
    let tag = r.read_u8()?;

    let response = match tag {
        0x01 => AbciResponse::Info {
            height: r.read_u64()?,
            latest_hash: r.read_hash()?,
            app_hash: r.read_hash()?,
        },
        0x02 => AbciResponse::InitChain,
        0x03 => AbciResponse::BeginBlock,
        0x04 => AbciResponse::DeliverTx {
            code: r.read_u32()?,
            log: r.read_string()?,
        },
        0x05 => {
            let count = r.read_count(4)?;
            let mut validator_updates = Vec::with_capacity(count);
            for _ in 0..count {
                validator_updates.push(r.read_string()?);
            }
            AbciResponse::EndBlock { validator_updates }
        }
        0x06 => AbciResponse::Commit {
            height: r.read_u64()?,
            app_hash: r.read_hash()?,
        },
        0x07 => AbciResponse::Query {
            code: r.read_u32()?,
            value: r.read_var_bytes()?,
            log: r.read_string()?,
        },
        other => {
            return Err(CoreError::Deserialization(format!(
                "unknown response tag: 0x{:02x}",
                other
            )));
        }
    };

    r.finish()?;
    Ok(response)
}
