//! Oraichain agent kit
//!
//! Ties the chain client to the transaction primitives: builds sign docs from
//! live account state, reconstructs `TxRaw` envelopes from externally signed
//! artifacts, broadcasts them and answers read-only queries. The kit never
//! holds key material.

use crate::client::{
    Account, BroadcastResult, ChainClient, DelegationResponse, RpcClient, TxInfo,
};
use crate::config::Config;
use crate::cosmos::{
    decode_base64, encode_body, encode_pubkey, make_auth_info_bytes, tx_raw_from_amino_signed_doc,
    tx_raw_from_direct_components, tx_raw_from_sign_doc_base64, Coin, Message, PubkeyType,
    SignDoc, SignMode, SignerEntry, StdFee, StdSignDoc, StdSignature, TxRaw,
};
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Everything needed to produce a sign doc for one signer
#[derive(Debug, Clone)]
pub struct SignDocRequest {
    pub sender_address: String,
    /// Base64 compressed secp256k1 public key
    pub public_key: String,
    pub messages: Vec<Message>,
    pub fee: StdFee,
    pub memo: String,
    pub timeout_height: Option<u64>,
    pub pubkey_type: PubkeyType,
    pub sign_mode: SignMode,
}

impl SignDocRequest {
    pub fn new(
        sender_address: impl Into<String>,
        public_key: impl Into<String>,
        messages: Vec<Message>,
        fee: StdFee,
    ) -> Self {
        Self {
            sender_address: sender_address.into(),
            public_key: public_key.into(),
            messages,
            fee,
            memo: String::new(),
            timeout_height: None,
            pubkey_type: PubkeyType::default(),
            sign_mode: SignMode::default(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_sign_mode(mut self, sign_mode: SignMode) -> Self {
        self.sign_mode = sign_mode;
        self
    }
}

/// Signer-less Oraichain toolkit over a [`ChainClient`]
pub struct OraichainAgentKit<C = RpcClient> {
    client: C,
    config: Config,
}

impl OraichainAgentKit<RpcClient> {
    /// Build a kit backed by the configured CometBFT endpoint
    pub fn connect(config: Config) -> Result<Self> {
        let client = RpcClient::new(&config.rpc)?;
        info!(rpc = %client.url(), "Oraichain agent kit ready");
        Ok(Self::new(client, config))
    }
}

impl<C: ChainClient> OraichainAgentKit<C> {
    pub fn new(client: C, config: Config) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fee used when a caller does not supply one
    pub fn default_fee(&self) -> Result<StdFee> {
        self.config.default_fee()
    }

    /// Sender must carry the configured bech32 account prefix
    fn check_sender(&self, sender_address: &str) -> Result<()> {
        let prefix = &self.config.chain.bech32_prefix;
        match sender_address.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.starts_with('1') => Ok(()),
            _ => Err(Error::validation(
                "senderAddress",
                format!("an address with the '{}' prefix", prefix),
            )),
        }
    }

    /// Account number, sequence and chain id, fetched concurrently
    async fn signing_context(&self, address: &str) -> Result<(Account, String)> {
        let (account, chain_id) =
            tokio::try_join!(self.client.get_sequence(address), self.client.get_chain_id())?;
        debug!(
            address,
            account_number = account.account_number,
            sequence = account.sequence,
            chain_id = %chain_id,
            "Fetched signing context"
        );
        Ok((account, chain_id))
    }

    /// Build a protobuf `SignDoc` for an external signer
    pub async fn build_sign_doc(&self, request: &SignDocRequest) -> Result<SignDoc> {
        self.check_sender(&request.sender_address)?;
        let pubkey = encode_pubkey(&request.public_key, request.pubkey_type)?;
        let gas_limit = request.fee.validate()?;
        let body_bytes = encode_body(&request.messages, &request.memo, request.timeout_height)?;

        let (account, chain_id) = self.signing_context(&request.sender_address).await?;
        let auth_info_bytes = make_auth_info_bytes(
            &[SignerEntry {
                pubkey,
                sequence: account.sequence,
            }],
            &request.fee.amount,
            gas_limit,
            request.fee.granter_str(),
            request.fee.payer_str(),
            request.sign_mode,
        );

        Ok(SignDoc {
            body_bytes,
            auth_info_bytes,
            chain_id,
            account_number: account.account_number,
        })
    }

    /// Build the Amino JSON sign doc for the same content
    pub async fn build_amino_sign_doc(
        &self,
        sender_address: &str,
        messages: &[Message],
        fee: &StdFee,
        memo: &str,
        timeout_height: Option<u64>,
    ) -> Result<StdSignDoc> {
        self.check_sender(sender_address)?;
        fee.validate()?;
        let (account, chain_id) = self.signing_context(sender_address).await?;
        StdSignDoc::new(
            messages,
            fee,
            &chain_id,
            memo,
            account.account_number,
            account.sequence,
            timeout_height,
        )
    }

    /// Bank send of a single coin
    pub fn transfer_message(&self, sender: &str, recipient: &str, amount: Coin) -> Result<Message> {
        let message = Message::send(sender, recipient, vec![amount]);
        message.validate()?;
        Ok(message)
    }

    /// Direct sign doc for a single bank send at the default fee
    pub async fn transfer(
        &self,
        sender: &str,
        public_key: &str,
        recipient: &str,
        amount: Coin,
    ) -> Result<SignDoc> {
        let message = self.transfer_message(sender, recipient, amount)?;
        let request = SignDocRequest::new(sender, public_key, vec![message], self.default_fee()?);
        self.build_sign_doc(&request).await
    }

    pub fn tx_raw_from_direct_components(
        &self,
        signed_body_bytes: &str,
        signed_auth_bytes: &str,
        signatures: &[String],
    ) -> Result<TxRaw> {
        tx_raw_from_direct_components(signed_body_bytes, signed_auth_bytes, signatures)
    }

    pub fn tx_raw_from_amino_signed_doc(
        &self,
        signed_doc: &StdSignDoc,
        signature: &StdSignature,
        pubkey_type: PubkeyType,
    ) -> Result<TxRaw> {
        tx_raw_from_amino_signed_doc(signed_doc, signature, pubkey_type)
    }

    /// Submit encoded `TxRaw` bytes with `broadcast_tx_sync`
    pub async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
        let local_hash = crate::cosmos::tx_hash(&tx_bytes);
        info!(tx_hash = %local_hash, size = tx_bytes.len(), "Broadcasting transaction");

        let result = self.client.broadcast_tx_sync(tx_bytes).await?;
        if result.is_rejected() {
            warn!(
                tx_hash = %result.tx_hash,
                code = result.code,
                codespace = %result.codespace,
                raw_log = %result.raw_log,
                "Transaction rejected by CheckTx"
            );
        } else {
            info!(tx_hash = %result.tx_hash, "Transaction accepted");
        }
        Ok(result)
    }

    pub async fn broadcast_tx(&self, tx: &TxRaw) -> Result<BroadcastResult> {
        self.broadcast(tx.to_bytes()).await
    }

    /// Broadcast base64 `TxRaw` bytes as produced by a wallet
    pub async fn broadcast_tx_sync(&self, signed_tx: &str) -> Result<BroadcastResult> {
        self.broadcast(decode_base64("signedTx", signed_tx)?).await
    }

    pub async fn broadcast_sign_doc_base64(
        &self,
        sign_doc_base64: &str,
        signature: &str,
    ) -> Result<BroadcastResult> {
        let tx = tx_raw_from_sign_doc_base64(sign_doc_base64, signature)?;
        self.broadcast_tx(&tx).await
    }

    pub async fn broadcast_signed_tx_from_direct_components(
        &self,
        signed_body_bytes: &str,
        signed_auth_bytes: &str,
        signatures: &[String],
    ) -> Result<BroadcastResult> {
        let tx = tx_raw_from_direct_components(signed_body_bytes, signed_auth_bytes, signatures)?;
        self.broadcast_tx(&tx).await
    }

    pub async fn broadcast_signed_tx_from_std_sign_doc(
        &self,
        signed_doc: &StdSignDoc,
        signature: &StdSignature,
        pubkey_type: PubkeyType,
    ) -> Result<BroadcastResult> {
        let tx = tx_raw_from_amino_signed_doc(signed_doc, signature, pubkey_type)?;
        self.broadcast_tx(&tx).await
    }

    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<Coin> {
        self.client.get_balance(address, denom).await
    }

    pub async fn get_delegation(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Option<DelegationResponse>> {
        self.client
            .get_delegation(delegator_address, validator_address)
            .await
    }

    pub async fn get_tx(&self, hash: &str) -> Result<Option<TxInfo>> {
        self.client.get_tx(hash).await
    }
}
