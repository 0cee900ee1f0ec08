//! End-to-end scenarios against the mock transport

mod common;

use std::str::FromStr;

use common::{addr, init_tracing, transfer_tx, wallet};
use tron_primitives::amount::{from_base_units, to_base_units};
use tron_proto::{wallet as rpc, Return, TransactionExtention, TriggerSmartContract};
use tron_sdk::abi::{encode, function_selector, Abi, ParamType, Token};
use tron_sdk::{
    Address, CallContext, Decimal, EventRegistry, MockTransport, SdkError, TransactionWorkflow,
    TronClient, Trc20, TxState, H256, U256,
};

// ==================== Addresses ====================

#[test]
fn test_base58_round_trip() {
    let text = "TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK";
    let address: Address = text.parse().unwrap();

    assert_eq!(address.as_bytes().len(), 21);
    assert_eq!(address.as_bytes()[0], 0x41);
    assert_eq!(address.to_base58(), text);
    assert_eq!(address.to_string(), text);
}

// ==================== Events ====================

#[test]
fn test_trc20_transfer_event() {
    init_tracing();
    let registry = EventRegistry::new();
    registry.register_interface(&Abi::trc20());

    let topics = [
        "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
        "000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        "0000000000000000000000004e83362442b8d1bec281594cea3050c8eb01311c",
    ]
    .map(|t| H256::from_hex(t).unwrap());
    let data =
        hex::decode("00000000000000000000000000000000000000000000000000000000000003e8").unwrap();

    let event = registry.decode_log(&topics, &data).unwrap();
    assert_eq!(event.event_name, "Transfer");

    let shape: Vec<_> = event
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.kind.as_str()))
        .collect();
    assert_eq!(
        shape,
        [("from", "address"), ("to", "address"), ("value", "uint256")]
    );
    assert_eq!(event.param("value").unwrap().value, "1000");

    for param in &event.params[..2] {
        let parsed: Address = param.value.parse().unwrap();
        assert_eq!(parsed.prefix(), 0x41);
        assert!(param.value.starts_with('T'));
    }
}

#[test]
fn test_unknown_selector_fallback() {
    let registry = EventRegistry::new();
    registry.register_interface(&Abi::trc20());

    let mut topic = [0u8; 32];
    topic[..4].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    let event = registry.decode_log(&[H256::from_bytes(topic)], &[]).unwrap();

    assert_eq!(event.event_name, "unknown_event(0x12345678)");
    assert!(event.params.is_empty());
}

// ==================== Workflow ====================

#[tokio::test]
async fn test_workflow_state_guard() {
    init_tracing();
    let client = TronClient::with_mock(MockTransport::new());
    let workflow = TransactionWorkflow::new(client, transfer_tx(1_000_000)).unwrap();

    workflow.sign(&wallet(7)).await.unwrap();
    let err = workflow.set_fee_limit(100).await.unwrap_err();

    assert!(matches!(err, SdkError::InvalidState(_)));
    assert_eq!(workflow.state().await, TxState::Error);
}

#[tokio::test]
async fn test_native_transfer_end_to_end() {
    init_tracing();
    let mock = MockTransport::new();
    mock.set_handler(rpc::CREATE_TRANSACTION, |req: tron_proto::TransferContract| {
        let mut tx = common::transfer_tx(req.amount);
        if let Some(raw) = tx.raw_data.as_mut() {
            raw.contract = vec![tron_proto::TransactionContract::new(&req)];
        }
        Ok(TransactionExtention {
            transaction: Some(tx),
            result: Some(Return {
                result: true,
                ..Default::default()
            }),
            ..Default::default()
        })
    });
    let client = TronClient::with_mock(mock.clone());
    let ctx = CallContext::background();
    let sender = wallet(3);

    let built = client
        .create_transfer(&ctx, &sender.address(), &addr(9), 2_500_000)
        .await
        .unwrap();
    let workflow = TransactionWorkflow::new(client, built).unwrap();
    workflow.sign(&sender).await.unwrap();
    let result = workflow.broadcast(&ctx, 0).await.unwrap();

    assert!(result.accepted);
    assert_eq!(result.tx_id.len(), 64);
    assert_eq!(workflow.state().await, TxState::Broadcasted);
    assert_eq!(workflow.signers().await.unwrap(), vec![sender.address()]);
    assert_eq!(mock.calls(rpc::BROADCAST_TRANSACTION), 1);
}

// ==================== Amounts ====================

fn serve_token(mock: &MockTransport, decimals: u8) {
    let decimals_selector = function_selector("decimals()");
    mock.set_handler(
        rpc::TRIGGER_CONSTANT_CONTRACT,
        move |req: TriggerSmartContract| {
            let data = if req.data[..4] == decimals_selector {
                encode(&[ParamType::Uint(8)], &[Token::Uint(U256::from(decimals))]).unwrap()
            } else {
                encode(&[ParamType::String], &[Token::String("Token".into())]).unwrap()
            };
            Ok(TransactionExtention {
                constant_result: vec![data],
                result: Some(Return {
                    result: true,
                    ..Default::default()
                }),
                ..Default::default()
            })
        },
    );
}

#[tokio::test]
async fn test_amount_precision_rejected_without_rpc() {
    let mock = MockTransport::new();
    serve_token(&mock, 6);
    let ctx = CallContext::background();
    let token = Trc20::new(TronClient::with_mock(mock.clone()), &ctx, addr(0x55))
        .await
        .unwrap();
    let calls_before = mock.total_calls();

    let err = token
        .transfer(&ctx, &addr(1), &addr(2), Decimal::from_str("0.1234567").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::InvalidAmount(_)));
    assert_eq!(mock.total_calls(), calls_before);
}

#[test]
fn test_decimal_round_trip() {
    let amount = Decimal::from_str("123.456789").unwrap();
    assert_eq!(to_base_units(amount, 6).unwrap(), U256::from(123_456_789u64));
    assert_eq!(
        from_base_units(U256::from(123_456_789u64), 6).unwrap(),
        Decimal::from_str("123.456789").unwrap()
    );
}
