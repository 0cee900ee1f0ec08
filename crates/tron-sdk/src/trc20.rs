//! TRC20 token façade
//!
//! Binds the standard fungible-token interface to one contract. Amounts go
//! in as [`Decimal`] and come back as [`TokenAmount`], which renders any
//! 256-bit value exactly; the token's `decimals` governs the conversion and
//! no amount is ever rounded.

use tokio::sync::OnceCell;
use tracing::debug;

use tron_primitives::amount::{to_base_units, TokenAmount};
use tron_primitives::{Address, Decimal, U256};
use tron_proto::TransactionExtention;

use crate::abi::{decode, Abi, Arg, ParamType, Token};
use crate::client::TronClient;
use crate::context::CallContext;
use crate::contract::Contract;
use crate::error::{SdkError, SdkResult};

/// Cached token properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Fractional digits of one whole token
    pub decimals: u32,
}

/// Façade over one TRC20 contract
#[derive(Debug)]
pub struct Trc20 {
    contract: Contract,
    metadata: OnceCell<TokenMetadata>,
}

impl Trc20 {
    /// Bind to `address` and load name, symbol, and decimals
    pub async fn new(client: TronClient, ctx: &CallContext, address: Address) -> SdkResult<Self> {
        let token = Self::lazy(client, address);
        token.metadata(ctx).await?;
        Ok(token)
    }

    /// Bind to `address`; metadata is loaded by the first call needing it
    pub fn lazy(client: TronClient, address: Address) -> Self {
        Self {
            contract: Contract::new(client, address, Abi::trc20()),
            metadata: OnceCell::new(),
        }
    }

    /// Contract address
    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// Underlying contract handle
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Token metadata, loading it once
    pub async fn metadata(&self, ctx: &CallContext) -> SdkResult<&TokenMetadata> {
        self.metadata
            .get_or_try_init(|| async {
                let name = self.read_text(ctx, "name").await?;
                let symbol = self.read_text(ctx, "symbol").await?;
                let decimals = self.read_decimals(ctx).await?;
                debug!(token = %self.address(), %name, %symbol, decimals, "token metadata loaded");
                Ok::<_, SdkError>(TokenMetadata {
                    name,
                    symbol,
                    decimals,
                })
            })
            .await
    }

    /// Token name
    pub async fn name(&self, ctx: &CallContext) -> SdkResult<String> {
        Ok(self.metadata(ctx).await?.name.clone())
    }

    /// Ticker symbol
    pub async fn symbol(&self, ctx: &CallContext) -> SdkResult<String> {
        Ok(self.metadata(ctx).await?.symbol.clone())
    }

    /// Fractional digits
    pub async fn decimals(&self, ctx: &CallContext) -> SdkResult<u32> {
        Ok(self.metadata(ctx).await?.decimals)
    }

    // ==================== Reads ====================

    /// Balance of `holder` in base units
    pub async fn balance_of_raw(&self, ctx: &CallContext, holder: &Address) -> SdkResult<U256> {
        let out = self
            .contract
            .call(ctx, holder, "balanceOf", &[Arg::Address(*holder)])
            .await?;
        first_uint(&out, "balanceOf")
    }

    /// Balance of `holder`
    pub async fn balance_of(
        &self,
        ctx: &CallContext,
        holder: &Address,
    ) -> SdkResult<TokenAmount> {
        let raw = self.balance_of_raw(ctx, holder).await?;
        self.to_amount(ctx, raw).await
    }

    /// Amount `spender` may move out of `owner`'s balance, in base units
    pub async fn allowance_raw(
        &self,
        ctx: &CallContext,
        owner: &Address,
        spender: &Address,
    ) -> SdkResult<U256> {
        let out = self
            .contract
            .call(
                ctx,
                owner,
                "allowance",
                &[Arg::Address(*owner), Arg::Address(*spender)],
            )
            .await?;
        first_uint(&out, "allowance")
    }

    /// Amount `spender` may move out of `owner`'s balance
    pub async fn allowance(
        &self,
        ctx: &CallContext,
        owner: &Address,
        spender: &Address,
    ) -> SdkResult<TokenAmount> {
        let raw = self.allowance_raw(ctx, owner, spender).await?;
        self.to_amount(ctx, raw).await
    }

    /// Total supply
    pub async fn total_supply(&self, ctx: &CallContext) -> SdkResult<TokenAmount> {
        let out = self
            .contract
            .call(ctx, self.address(), "totalSupply", &[])
            .await?;
        let raw = first_uint(&out, "totalSupply")?;
        self.to_amount(ctx, raw).await
    }

    // ==================== Writes ====================

    /// Build an unsigned `transfer(to, amount)` from `from`
    pub async fn transfer(
        &self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> SdkResult<TransactionExtention> {
        require_positive(amount)?;
        require_distinct(from, to, "sender and recipient")?;
        let value = self.to_base(ctx, amount).await?;
        self.build(
            ctx,
            from,
            "transfer",
            &[Arg::Address(*to), Arg::Uint(value)],
        )
        .await
    }

    /// Build an unsigned `transferFrom(from, to, amount)` sent by `spender`
    pub async fn transfer_from(
        &self,
        ctx: &CallContext,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> SdkResult<TransactionExtention> {
        require_positive(amount)?;
        require_distinct(from, to, "sender and recipient")?;
        let value = self.to_base(ctx, amount).await?;
        self.build(
            ctx,
            spender,
            "transferFrom",
            &[Arg::Address(*from), Arg::Address(*to), Arg::Uint(value)],
        )
        .await
    }

    /// Build an unsigned `approve(spender, amount)`; zero revokes
    pub async fn approve(
        &self,
        ctx: &CallContext,
        owner: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> SdkResult<TransactionExtention> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(SdkError::InvalidAmount(format!(
                "allowance must not be negative, got {}",
                amount
            )));
        }
        require_distinct(owner, spender, "owner and spender")?;
        let value = self.to_base(ctx, amount).await?;
        self.build(
            ctx,
            owner,
            "approve",
            &[Arg::Address(*spender), Arg::Uint(value)],
        )
        .await
    }

    async fn build(
        &self,
        ctx: &CallContext,
        caller: &Address,
        method: &str,
        args: &[Arg],
    ) -> SdkResult<TransactionExtention> {
        let (ext, _) = self.contract.invoke(ctx, caller, 0, method, args).await?;
        Ok(ext)
    }

    // ==================== Conversion ====================

    async fn to_base(&self, ctx: &CallContext, amount: Decimal) -> SdkResult<U256> {
        let decimals = self.decimals(ctx).await?;
        Ok(to_base_units(amount, decimals)?)
    }

    async fn to_amount(&self, ctx: &CallContext, raw: U256) -> SdkResult<TokenAmount> {
        let decimals = self.decimals(ctx).await?;
        Ok(TokenAmount::new(raw, decimals))
    }

    /// `name`/`symbol`; legacy tokens return `bytes32` instead of `string`
    async fn read_text(&self, ctx: &CallContext, method: &str) -> SdkResult<String> {
        let result = self
            .contract
            .simulate(ctx, self.address(), 0, method, &[])
            .await?;
        if !result.success {
            return Err(SdkError::TxReverted {
                tx_id: None,
                message: result.revert_message.unwrap_or_default(),
            });
        }

        let data = result.return_data;
        if let Ok(tokens) = decode(&[ParamType::String], &data) {
            if let Some(Token::String(text)) = tokens.into_iter().next() {
                return Ok(text);
            }
        }
        if data.len() == 32 {
            let end = data.iter().position(|b| *b == 0).unwrap_or(32);
            if let Ok(text) = std::str::from_utf8(&data[..end]) {
                debug!(token = %self.address(), method, "bytes32 metadata");
                return Ok(text.to_string());
            }
        }
        Err(SdkError::DecodeInvalid(format!(
            "{} returned {} bytes that are neither string nor bytes32",
            method,
            data.len()
        )))
    }

    async fn read_decimals(&self, ctx: &CallContext) -> SdkResult<u32> {
        let out = self
            .contract
            .call(ctx, self.address(), "decimals", &[])
            .await?;
        let raw = first_uint(&out, "decimals")?;
        if raw > U256::from(u8::MAX) {
            return Err(SdkError::DecodeInvalid(format!("decimals {} out of range", raw)));
        }
        Ok(raw.low_u32())
    }
}

fn first_uint(tokens: &[Token], method: &str) -> SdkResult<U256> {
    tokens
        .first()
        .and_then(Token::as_uint)
        .ok_or_else(|| SdkError::DecodeInvalid(format!("{} returned no integer", method)))
}

fn require_positive(amount: Decimal) -> SdkResult<()> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(SdkError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn require_distinct(a: &Address, b: &Address, what: &str) -> SdkResult<()> {
    if a == b {
        return Err(SdkError::InvalidParameter(format!("{} are the same address", what)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, function_selector};
    use crate::transport::MockTransport;
    use std::str::FromStr;
    use tron_proto::{wallet, Return, TriggerSmartContract};

    fn addr(byte: u8) -> Address {
        Address::from_evm_bytes([byte; 20])
    }

    fn token_addr() -> Address {
        Address::from_base58("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap()
    }

    fn reply(data: Vec<u8>) -> TransactionExtention {
        TransactionExtention {
            constant_result: vec![data],
            result: Some(Return {
                result: true,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Answer constant calls by selector
    fn serve(mock: &MockTransport, decimals: u8, name: Vec<u8>) {
        let name_sel = function_selector("name()");
        let symbol_sel = function_selector("symbol()");
        let decimals_sel = function_selector("decimals()");
        let balance_sel = function_selector("balanceOf(address)");
        mock.set_handler(
            wallet::TRIGGER_CONSTANT_CONTRACT,
            move |req: TriggerSmartContract| {
                let selector: [u8; 4] = req.data[..4].try_into().unwrap();
                let data = if selector == name_sel {
                    name.clone()
                } else if selector == symbol_sel {
                    encode(&[ParamType::String], &[Token::String("USDT".into())]).unwrap()
                } else if selector == decimals_sel {
                    encode(&[ParamType::Uint(8)], &[Token::Uint(U256::from(decimals))]).unwrap()
                } else if selector == balance_sel {
                    encode(&[ParamType::Uint(256)], &[Token::Uint(U256::from(1_500_000u64))])
                        .unwrap()
                } else {
                    let supply = U256::from(10u64).pow(U256::from(15u64));
                    encode(&[ParamType::Uint(256)], &[Token::Uint(supply)]).unwrap()
                };
                Ok(reply(data))
            },
        );
        mock.set_handler(wallet::TRIGGER_CONTRACT, |req: TriggerSmartContract| {
            Ok(TransactionExtention {
                transaction: Some(tron_proto::Transaction {
                    raw_data: Some(tron_proto::TransactionRaw {
                        contract: vec![tron_proto::TransactionContract::new(&req)],
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                result: Some(Return {
                    result: true,
                    ..Default::default()
                }),
                ..Default::default()
            })
        });
    }

    fn string_name() -> Vec<u8> {
        encode(&[ParamType::String], &[Token::String("Tether USD".into())]).unwrap()
    }

    async fn token(mock: &MockTransport, decimals: u8) -> Trc20 {
        serve(mock, decimals, string_name());
        Trc20::new(
            TronClient::with_mock(mock.clone()),
            &CallContext::background(),
            token_addr(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_metadata_preloaded_once() {
        let mock = MockTransport::new();
        let token = token(&mock, 6).await;
        assert_eq!(mock.calls(wallet::TRIGGER_CONSTANT_CONTRACT), 3);

        let ctx = CallContext::background();
        let meta = token.metadata(&ctx).await.unwrap();
        assert_eq!(meta.name, "Tether USD");
        assert_eq!(meta.symbol, "USDT");
        assert_eq!(meta.decimals, 6);
        assert_eq!(token.decimals(&ctx).await.unwrap(), 6);
        assert_eq!(mock.calls(wallet::TRIGGER_CONSTANT_CONTRACT), 3);
    }

    #[tokio::test]
    async fn test_lazy_loads_on_first_use() {
        let mock = MockTransport::new();
        serve(&mock, 6, string_name());
        let token = Trc20::lazy(TronClient::with_mock(mock.clone()), token_addr());
        assert_eq!(mock.total_calls(), 0);

        let ctx = CallContext::background();
        let balance = token.balance_of(&ctx, &addr(1)).await.unwrap();
        assert_eq!(balance.to_decimal().unwrap(), Decimal::from_str("1.5").unwrap());
        assert_eq!(mock.calls(wallet::TRIGGER_CONSTANT_CONTRACT), 4);
    }

    #[tokio::test]
    async fn test_bytes32_name() {
        let mock = MockTransport::new();
        let mut legacy = vec![0u8; 32];
        legacy[..3].copy_from_slice(b"MKR");
        serve(&mock, 18, legacy);

        let token = Trc20::lazy(TronClient::with_mock(mock), token_addr());
        assert_eq!(token.name(&CallContext::background()).await.unwrap(), "MKR");
    }

    #[tokio::test]
    async fn test_balance_and_supply() {
        let mock = MockTransport::new();
        let token = token(&mock, 6).await;
        let ctx = CallContext::background();

        assert_eq!(
            token.balance_of_raw(&ctx, &addr(1)).await.unwrap(),
            U256::from(1_500_000u64)
        );
        let supply = token.total_supply(&ctx).await.unwrap();
        assert_eq!(supply.to_string(), "1000000000");
        assert_eq!(supply.to_decimal().unwrap(), Decimal::from_str("1000000000").unwrap());
    }

    #[tokio::test]
    async fn test_balance_wider_than_decimal() {
        let mock = MockTransport::new();
        let token = token(&mock, 18).await;
        let whale = U256::from_dec_str("123456789012345678901234567891").unwrap();
        let balance_sel = function_selector("balanceOf(address)");
        mock.set_handler(
            wallet::TRIGGER_CONSTANT_CONTRACT,
            move |req: TriggerSmartContract| {
                assert_eq!(req.data[..4], balance_sel);
                Ok(reply(
                    encode(&[ParamType::Uint(256)], &[Token::Uint(whale)]).unwrap(),
                ))
            },
        );
        let ctx = CallContext::background();

        let balance = token.balance_of(&ctx, &addr(1)).await.unwrap();
        assert_eq!(balance.raw(), whale);
        assert_eq!(balance.decimals(), 18);
        assert_eq!(balance.to_string(), "123456789012.345678901234567891");
    }

    #[tokio::test]
    async fn test_transfer_encodes_base_units() {
        let mock = MockTransport::new();
        let token = token(&mock, 6).await;
        let ctx = CallContext::background();

        let ext = token
            .transfer(&ctx, &addr(1), &addr(2), Decimal::from_str("1.5").unwrap())
            .await
            .unwrap();
        let trigger: TriggerSmartContract = ext.transaction.unwrap().raw_data.unwrap().contract[0]
            .parameter
            .as_ref()
            .unwrap()
            .unpack()
            .unwrap();

        let expected = crate::abi::encode_function_call(
            function_selector("transfer(address,uint256)"),
            &[ParamType::Address, ParamType::Uint(256)],
            &[Token::Address(addr(2)), Token::Uint(U256::from(1_500_000u64))],
        )
        .unwrap();
        assert_eq!(trigger.data, expected);
        assert_eq!(trigger.owner_address, addr(1).as_bytes().to_vec());
        assert_eq!(trigger.call_value, 0);
    }

    #[tokio::test]
    async fn test_too_precise_amount_rejected_before_build() {
        let mock = MockTransport::new();
        let token = token(&mock, 6).await;
        let ctx = CallContext::background();

        let err = token
            .transfer(&ctx, &addr(1), &addr(2), Decimal::from_str("1.0000001").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidAmount(_)));
        assert_eq!(mock.calls(wallet::TRIGGER_CONTRACT), 0);

        // trailing zeros are not significant
        token
            .transfer(&ctx, &addr(1), &addr(2), Decimal::from_str("1.5000000").unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transfer_validation() {
        let mock = MockTransport::new();
        serve(&mock, 6, string_name());
        let token = Trc20::lazy(TronClient::with_mock(mock.clone()), token_addr());
        let ctx = CallContext::background();

        assert!(matches!(
            token.transfer(&ctx, &addr(1), &addr(2), Decimal::ZERO).await,
            Err(SdkError::InvalidAmount(_))
        ));
        assert!(matches!(
            token.transfer(&ctx, &addr(1), &addr(1), Decimal::ONE).await,
            Err(SdkError::InvalidParameter(_))
        ));
        assert!(matches!(
            token
                .transfer_from(&ctx, &addr(3), &addr(1), &addr(2), Decimal::NEGATIVE_ONE)
                .await,
            Err(SdkError::InvalidAmount(_))
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_approve_zero_revokes() {
        let mock = MockTransport::new();
        let token = token(&mock, 6).await;
        let ctx = CallContext::background();

        token
            .approve(&ctx, &addr(1), &addr(2), Decimal::ZERO)
            .await
            .unwrap();
        assert!(matches!(
            token.approve(&ctx, &addr(1), &addr(1), Decimal::ONE).await,
            Err(SdkError::InvalidParameter(_))
        ));
        assert_eq!(mock.calls(wallet::TRIGGER_CONTRACT), 1);
    }
}
