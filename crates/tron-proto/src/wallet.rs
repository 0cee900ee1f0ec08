//! Method paths of the `protocol.Wallet` gRPC service
//!
//! Each constant is the HTTP/2 `:path` of one unary method. The comment on
//! each names the request and response messages.

macro_rules! wallet_methods {
    ($($(#[$doc:meta])* $name:ident => $method:literal;)*) => {
        $(
            $(#[$doc])*
            pub const $name: &str = concat!("/protocol.Wallet/", $method);
        )*

        /// Every method path defined here
        pub const ALL: &[&str] = &[$($name),*];
    };
}

wallet_methods! {
    /// `Account` -> `Account`
    GET_ACCOUNT => "GetAccount";
    /// `Account` -> `AccountResourceMessage`
    GET_ACCOUNT_RESOURCE => "GetAccountResource";
    /// `EmptyMessage` -> `BlockExtention`
    GET_NOW_BLOCK => "GetNowBlock2";
    /// `NumberMessage` -> `BlockExtention`
    GET_BLOCK_BY_NUM => "GetBlockByNum2";
    /// `EmptyMessage` -> `ChainParameters`
    GET_CHAIN_PARAMETERS => "GetChainParameters";
    /// `TransferContract` -> `TransactionExtention`
    CREATE_TRANSACTION => "CreateTransaction2";
    /// `TransferAssetContract` -> `TransactionExtention`
    TRANSFER_ASSET => "TransferAsset2";
    /// `TriggerSmartContract` -> `TransactionExtention`
    TRIGGER_CONTRACT => "TriggerContract";
    /// `TriggerSmartContract` -> `TransactionExtention`
    TRIGGER_CONSTANT_CONTRACT => "TriggerConstantContract";
    /// `TriggerSmartContract` -> `EstimateEnergyMessage`
    ESTIMATE_ENERGY => "EstimateEnergy";
    /// `CreateSmartContract` -> `TransactionExtention`
    DEPLOY_CONTRACT => "DeployContract";
    /// `BytesMessage` -> `SmartContract`
    GET_CONTRACT => "GetContract";
    /// `Transaction` -> `Return`
    BROADCAST_TRANSACTION => "BroadcastTransaction";
    /// `BytesMessage` -> `Transaction`
    GET_TRANSACTION_BY_ID => "GetTransactionById";
    /// `BytesMessage` -> `TransactionInfo`
    GET_TRANSACTION_INFO_BY_ID => "GetTransactionInfoById";
    /// `BytesMessage` -> `AssetIssueContract`
    GET_ASSET_ISSUE_BY_ID => "GetAssetIssueById";
    /// `EmptyMessage` -> `AssetIssueList`
    GET_ASSET_ISSUE_LIST => "GetAssetIssueList";
    /// `FreezeBalanceV2Contract` -> `TransactionExtention`
    FREEZE_BALANCE_V2 => "FreezeBalanceV2";
    /// `UnfreezeBalanceV2Contract` -> `TransactionExtention`
    UNFREEZE_BALANCE_V2 => "UnfreezeBalanceV2";
    /// `DelegateResourceContract` -> `TransactionExtention`
    DELEGATE_RESOURCE => "DelegateResource";
    /// `UnDelegateResourceContract` -> `TransactionExtention`
    UNDELEGATE_RESOURCE => "UnDelegateResource";
    /// `WithdrawExpireUnfreezeContract` -> `TransactionExtention`
    WITHDRAW_EXPIRE_UNFREEZE => "WithdrawExpireUnfreeze";
    /// `EmptyMessage` -> `WitnessList`
    LIST_WITNESSES => "ListWitnesses";
    /// `VoteWitnessContract` -> `TransactionExtention`
    VOTE_WITNESS_ACCOUNT => "VoteWitnessAccount2";
    /// `EmptyMessage` -> `ProposalList`
    LIST_PROPOSALS => "ListProposals";
    /// `ProposalCreateContract` -> `TransactionExtention`
    PROPOSAL_CREATE => "ProposalCreate";
    /// `ProposalApproveContract` -> `TransactionExtention`
    PROPOSAL_APPROVE => "ProposalApprove";
    /// `EmptyMessage` -> `ExchangeList`
    LIST_EXCHANGES => "ListExchanges";
    /// `ExchangeTransactionContract` -> `TransactionExtention`
    EXCHANGE_TRANSACTION => "ExchangeTransaction";
}
