// src/blockchain/planner.rs

//! Turns a validated intent into an unsigned transaction plan.
//!
//! The planner holds no state between calls. Everything it resolves against
//! arrives in the [`PlanContext`]; the only suspension point is the single
//! quote call made on the swap paths.

use std::sync::Arc;

use chrono::Utc;
use ethers::types::{Address, U256};
use tracing::{debug, info};

use crate::blockchain::amount::{parse_amount, to_u64_units};
use crate::blockchain::models::{
    AggregatorQuoteQuery, PlanContext, PlanOutcome, SolanaTransferPlan, SwapQuote, UnsignedEvmTx,
    UnsignedPlan,
};
use crate::blockchain::registry::TokenRecord;
use crate::blockchain::services::jupiter::select_best_route;
use crate::blockchain::services::token::{
    checksum, erc20_transfer_data, parse_address, swap_exact_tokens_for_tokens_data,
};
use crate::blockchain::services::{AggregatorQuoter, RouterQuoter};
use crate::error::IntentError;
use crate::intent::forecast::forecast_all;
use crate::intent::{Chain, Intent, PricePredictionIntent, SwapIntent, TransferIntent};

/// Seconds a planned swap stays valid.
pub const SWAP_DEADLINE_SECS: i64 = 600;

const EIP1559_TX_TYPE: u8 = 2;
const BPS_DENOMINATOR: u64 = 10_000;

/// `out - floor(out * bps / 10000)`. A quote too large to scale is rejected
/// as a malformed router reply.
pub fn min_out(amount_out: U256, slippage_bps: u32) -> Result<U256, IntentError> {
    let scaled = amount_out.checked_mul(U256::from(slippage_bps)).ok_or_else(|| {
        IntentError::MalformedUpstream(format!("router quote {} is out of range", amount_out))
    })?;
    Ok(amount_out - scaled / U256::from(BPS_DENOMINATOR))
}

#[derive(Clone)]
pub struct Planner {
    evm: Arc<dyn RouterQuoter>,
    solana: Arc<dyn AggregatorQuoter>,
}

impl Planner {
    pub fn new(evm: Arc<dyn RouterQuoter>, solana: Arc<dyn AggregatorQuoter>) -> Self {
        Self { evm, solana }
    }

    pub async fn plan(&self, intent: &Intent, ctx: &PlanContext<'_>) -> Result<PlanOutcome, IntentError> {
        info!(kind = intent.kind(), chain = ?intent.chain(), "planning intent");
        match intent {
            Intent::PricePrediction(p) => Ok(self.plan_prediction(intent, p)),
            Intent::Transfer(t) => match t.chain {
                Chain::Evm { chain_id } => self.plan_evm_transfer(chain_id, t, ctx),
                Chain::Solana => self.plan_solana_transfer(t, ctx),
            },
            Intent::Swap(s) => match s.chain {
                Chain::Evm { chain_id } => self.plan_evm_swap(chain_id, s, ctx).await,
                Chain::Solana => self.plan_solana_swap(s, ctx).await,
            },
        }
    }

    fn plan_prediction(&self, intent: &Intent, p: &PricePredictionIntent) -> PlanOutcome {
        PlanOutcome::Prediction {
            ok: true,
            intent: intent.clone(),
            predictions: forecast_all(&p.tokens, p.effective_horizon_days()),
        }
    }

    fn plan_evm_transfer(
        &self,
        chain_id: u64,
        t: &TransferIntent,
        ctx: &PlanContext<'_>,
    ) -> Result<PlanOutcome, IntentError> {
        let token = ctx.registry.resolve(&t.chain, &t.token)?;
        let recipient_raw = ctx.address_book.resolve(&t.to)?;
        let recipient = parse_address(&recipient_raw, "recipient")
            .map_err(|_| IntentError::UnknownRecipient(recipient_raw.clone()))?;
        let amount = parse_amount(&t.amount, token.decimals)?;

        let payload = match token.contract_address() {
            None => UnsignedEvmTx {
                chain_id,
                tx_type: EIP1559_TX_TYPE,
                to: checksum(&recipient),
                data: None,
                value: Some(amount),
            },
            Some(contract) => {
                let contract = parse_address(contract, "token address")?;
                UnsignedEvmTx {
                    chain_id,
                    tx_type: EIP1559_TX_TYPE,
                    to: checksum(&contract),
                    data: Some(erc20_transfer_data(recipient, amount)),
                    value: Some(U256::zero()),
                }
            }
        };
        debug!(token = %token.symbol, amount = %amount, "evm transfer planned");

        Ok(PlanOutcome::EvmTransfer {
            unsigned: UnsignedPlan {
                payload,
                preview: "EVM transfer".to_string(),
            },
        })
    }

    fn plan_solana_transfer(&self, t: &TransferIntent, ctx: &PlanContext<'_>) -> Result<PlanOutcome, IntentError> {
        let token = ctx.registry.resolve(&t.chain, &t.token)?;
        let to = ctx.address_book.resolve(&t.to)?;
        let base_units = to_u64_units(parse_amount(&t.amount, token.decimals)?, &t.amount)?;

        Ok(PlanOutcome::SolanaTransfer {
            plan: SolanaTransferPlan {
                chain: "solana".to_string(),
                to,
                token: token.clone(),
                amount: t.amount.clone(),
                base_units: base_units.to_string(),
            },
        })
    }

    async fn plan_evm_swap(
        &self,
        chain_id: u64,
        s: &SwapIntent,
        ctx: &PlanContext<'_>,
    ) -> Result<PlanOutcome, IntentError> {
        let sell = ctx.registry.resolve(&s.chain, &s.sell_token)?;
        let buy = ctx.registry.resolve(&s.chain, &s.buy_token)?;
        let slippage_bps = s.effective_slippage_bps();
        let evm = &ctx.config.evm;

        let rpc_url = evm
            .rpc_url
            .as_deref()
            .ok_or_else(|| IntentError::Configuration("no EVM RPC URL configured".to_string()))?;
        let router = parse_address(
            evm.router
                .as_deref()
                .ok_or_else(|| IntentError::Configuration("no EVM router configured".to_string()))?,
            "router",
        )?;
        let recipient = parse_address(
            evm.to
                .as_deref()
                .ok_or_else(|| IntentError::Configuration("no EVM swap recipient configured".to_string()))?,
            "swap recipient",
        )?;
        let path = match &evm.path {
            Some(hops) => hops
                .iter()
                .map(|h| parse_address(h, "path hop"))
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![swap_leg(sell)?, swap_leg(buy)?],
        };

        let amount_in = parse_amount(&s.amount, sell.decimals)?;
        let amounts = self.evm.amounts_out(rpc_url, router, amount_in, &path).await?;
        let amount_out = amounts
            .last()
            .copied()
            .ok_or_else(|| IntentError::MalformedUpstream("router returned no amounts".to_string()))?;
        let min_out = min_out(amount_out, slippage_bps)?;
        let deadline = Utc::now().timestamp() + SWAP_DEADLINE_SECS;
        let deadline = u64::try_from(deadline).unwrap_or_default();

        info!(
            sell = %sell.symbol,
            buy = %buy.symbol,
            amount_in = %amount_in,
            amount_out = %amount_out,
            min_out = %min_out,
            slippage_bps,
            "evm swap quoted"
        );

        Ok(PlanOutcome::EvmSwap {
            quote: SwapQuote {
                amount_out: amount_out.to_string(),
                min_out: min_out.to_string(),
                slippage_bps,
            },
            unsigned: UnsignedPlan {
                payload: UnsignedEvmTx {
                    chain_id,
                    tx_type: EIP1559_TX_TYPE,
                    to: checksum(&router),
                    data: Some(swap_exact_tokens_for_tokens_data(
                        amount_in, min_out, &path, recipient, deadline,
                    )),
                    value: None,
                },
                preview: "EVM swap".to_string(),
            },
        })
    }

    async fn plan_solana_swap(&self, s: &SwapIntent, ctx: &PlanContext<'_>) -> Result<PlanOutcome, IntentError> {
        let sell = ctx.registry.resolve(&s.chain, &s.sell_token)?;
        let buy = ctx.registry.resolve(&s.chain, &s.buy_token)?;
        let query = AggregatorQuoteQuery {
            input_mint: mint_of(sell)?.to_string(),
            output_mint: mint_of(buy)?.to_string(),
            amount: to_u64_units(parse_amount(&s.amount, sell.decimals)?, &s.amount)?,
            slippage_bps: s.effective_slippage_bps(),
        };

        let response = self.solana.quote(&query).await?;
        let route = select_best_route(response).ok_or(IntentError::NoRoute)?;
        debug!(sell = %sell.symbol, buy = %buy.symbol, "solana route selected");
        Ok(PlanOutcome::SolanaSwap { route })
    }
}

fn swap_leg(token: &TokenRecord) -> Result<Address, IntentError> {
    match token.contract_address() {
        Some(addr) => parse_address(addr, "token address"),
        None => Err(IntentError::InvalidIntent(format!(
            "{} is a native asset with no contract address; set config.evm.path to swap it",
            token.symbol
        ))),
    }
}

fn mint_of(token: &TokenRecord) -> Result<&str, IntentError> {
    token.mint_address().ok_or_else(|| IntentError::UnknownToken {
        family: "solana".to_string(),
        symbol: token.symbol.clone(),
    })
}
