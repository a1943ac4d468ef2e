use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use veildex_fhe::{EncUint, FheEngine, RequestId, ThresholdDecryptor};
use veildex_token::EncryptedToken;
use veildex_types::{AccountId, Amount, EpochId, EpochPhase, PairConfig};

use crate::aggregate::{aggregate, AggregateFlow, FundedEpoch, FundedMint};
use crate::claims::ClaimLedger;
use crate::epoch::EpochClock;
use crate::error::{PairError, Result};
use crate::queue::{BurnOrder, MintOrder, OrderId, OrderKind, OrderQueue, SwapOrder};
use crate::settlement::{mint_entitlement, settle_flows, StagedSettlement};

/// Per-epoch settlement outcome: the revealed reserve pair plus the retained
/// ciphertext aggregates claims consume
///
/// Everything beyond the two public reserve values stays encrypted forever;
/// a claim combines the caller's own funded entry with these ratios and
/// never touches another participant's order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochOutcome {
    pub reserves_before: (Amount, Amount),
    pub reserves_after: (Amount, Amount),
    pub bootstrap: bool,
    pub swap_in0: EncUint,
    pub swap_in1: EncUint,
    pub swap_out0: EncUint,
    pub swap_out1: EncUint,
    pub burned: EncUint,
    pub burn_payout0: EncUint,
    pub burn_payout1: EncUint,
    pub minted_total: EncUint,
    pub minted: BTreeMap<AccountId, EncUint>,
    pub swap_funded: BTreeMap<AccountId, (EncUint, EncUint)>,
    pub burn_funded: BTreeMap<AccountId, EncUint>,
}

/// Settlement suspended across the threshold-decryption round trip
#[derive(Debug)]
struct PendingReveal {
    epoch: EpochId,
    request: RequestId,
    staged: StagedSettlement,
    agg: AggregateFlow,
    funded: FundedEpoch,
}

/// Result of a `batch_settlement` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Reserve pair revealed and committed; claims are open
    Settled {
        epoch: EpochId,
        reserves: (Amount, Amount),
    },
    /// Decryption requested; retry once the quorum has responded
    AwaitingReveal { epoch: EpochId },
}

/// Serializable operator view of the pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSnapshot {
    pub current_epoch: EpochId,
    pub phase: EpochPhase,
    pub reserves: (Amount, Amount),
}

/// A confidential constant-product pair settling order batches by epoch
///
/// Orders accumulate as ciphertexts, settle together at the epoch boundary,
/// and the only value ever decrypted is the post-epoch reserve pair
pub struct EncryptedPair {
    config: PairConfig,
    account: AccountId,
    clock: EpochClock,
    queue: OrderQueue,
    claims: ClaimLedger,
    reserves: (Amount, Amount),
    total_liquidity: EncUint,
    liquidity_token: EncryptedToken,
    outcomes: BTreeMap<EpochId, EpochOutcome>,
    pending: Option<PendingReveal>,
}

impl EncryptedPair {
    /// Create a pair; `account` is the pool's own address on both backing
    /// tokens and must hold the pulled order funds
    pub fn new(fhe: &mut dyn FheEngine, config: PairConfig, account: AccountId) -> Self {
        let liquidity_token = EncryptedToken::new(fhe, format!("{account}-lp"));
        EncryptedPair {
            config,
            account,
            clock: EpochClock::new(),
            queue: OrderQueue::new(),
            claims: ClaimLedger::new(),
            reserves: (Amount::ZERO, Amount::ZERO),
            total_liquidity: fhe.zero(),
            liquidity_token,
            outcomes: BTreeMap::new(),
            pending: None,
        }
    }

    pub fn current_trading_epoch(&self) -> EpochId {
        self.clock.current()
    }

    /// Plaintext reserves as of the latest settled epoch
    pub fn get_reserves(&self) -> (Amount, Amount) {
        self.reserves
    }

    pub fn epoch_phase(&self, epoch: EpochId) -> Option<EpochPhase> {
        self.clock.phase(epoch)
    }

    pub fn outcome(&self, epoch: EpochId) -> Option<&EpochOutcome> {
        self.outcomes.get(&epoch)
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// The pool's liquidity token (encrypted balances per provider)
    pub fn liquidity_token(&self) -> &EncryptedToken {
        &self.liquidity_token
    }

    pub fn snapshot(&self) -> PairSnapshot {
        PairSnapshot {
            current_epoch: self.clock.current(),
            phase: self
                .clock
                .phase(self.clock.current())
                .unwrap_or(EpochPhase::Open),
            reserves: self.reserves,
        }
    }

    fn check_epoch(&self, epoch_hint: EpochId) -> Result<EpochId> {
        let current = self.clock.current();
        if epoch_hint != current {
            return Err(PairError::EpochMismatch {
                expected: current,
                got: epoch_hint,
            });
        }
        Ok(current)
    }

    /// Queue an add-liquidity intent for the current epoch
    ///
    /// `epoch_hint` protects the submitter against landing in a later,
    /// differently-priced epoch. Both token allowances must already cover the
    /// deposit; no value moves until settlement
    pub fn add_liquidity(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        amount0: EncUint,
        amount1: EncUint,
        to: &AccountId,
        epoch_hint: EpochId,
    ) -> Result<OrderId> {
        let epoch = self.check_epoch(epoch_hint)?;
        token0
            .require_allowance(fhe, to, &self.account, amount0)
            .map_err(|_| PairError::StaleApproval(to.clone()))?;
        token1
            .require_allowance(fhe, to, &self.account, amount1)
            .map_err(|_| PairError::StaleApproval(to.clone()))?;
        let id = self.queue.submit_mint(fhe, epoch, to, amount0, amount1);
        tracing::debug!(epoch, submitter = %to, "add-liquidity order queued");
        Ok(id)
    }

    /// Queue a swap intent; either leg may be an encrypted zero, keeping the
    /// direction hidden
    pub fn swap_tokens(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        amount_in0: EncUint,
        amount_in1: EncUint,
        to: &AccountId,
        epoch_hint: EpochId,
    ) -> Result<OrderId> {
        let epoch = self.check_epoch(epoch_hint)?;
        token0
            .require_allowance(fhe, to, &self.account, amount_in0)
            .map_err(|_| PairError::StaleApproval(to.clone()))?;
        token1
            .require_allowance(fhe, to, &self.account, amount_in1)
            .map_err(|_| PairError::StaleApproval(to.clone()))?;
        let id = self.queue.submit_swap(fhe, epoch, to, amount_in0, amount_in1);
        tracing::debug!(epoch, submitter = %to, "swap order queued");
        Ok(id)
    }

    /// Queue a remove-liquidity intent
    ///
    /// The submitter's liquidity balance must cover the request when it is
    /// queued; it is clamped again at settlement in case the balance moved
    /// in between
    pub fn remove_liquidity(
        &mut self,
        fhe: &mut dyn FheEngine,
        liquidity: EncUint,
        to: &AccountId,
        epoch_hint: EpochId,
    ) -> Result<OrderId> {
        let epoch = self.check_epoch(epoch_hint)?;
        self.liquidity_token.require_balance(fhe, to, liquidity)?;
        let id = self.queue.submit_burn(fhe, epoch, to, liquidity);
        tracing::debug!(epoch, submitter = %to, "remove-liquidity order queued");
        Ok(id)
    }

    /// Close the current epoch, settle its batch, and reveal the new reserves
    ///
    /// While a previous epoch's reveal is outstanding this only re-polls the
    /// quorum: the AGGREGATE to REVEAL transition is single-shot per epoch. A
    /// retry that finds the quorum still silent fails with `RevealPending`
    pub fn batch_settlement(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        oracle: &mut dyn ThresholdDecryptor,
    ) -> Result<SettlementOutcome> {
        if let Some(pending) = self.pending.take() {
            return match oracle.poll(pending.request) {
                Some(values) => {
                    let epoch = pending.epoch;
                    let reserves = self.commit_reveal(pending, values)?;
                    Ok(SettlementOutcome::Settled { epoch, reserves })
                }
                None => {
                    let epoch = pending.epoch;
                    self.pending = Some(pending);
                    Err(PairError::RevealPending(epoch))
                }
            };
        }

        let epoch = self.clock.close_current();
        tracing::info!(epoch, next = self.clock.current(), "trading epoch closed");

        let funded = self.fund_epoch(fhe, token0, token1, epoch);
        if funded.is_empty() {
            // nothing flowed, so there is nothing to reveal
            let outcome = self.unchanged_outcome(fhe);
            self.outcomes.insert(epoch, outcome);
            self.clock.mark_settled(epoch);
            tracing::info!(epoch, "empty epoch settled; reserves unchanged");
            return Ok(SettlementOutcome::Settled {
                epoch,
                reserves: self.reserves,
            });
        }

        let agg = aggregate(fhe, &funded);
        let staged = settle_flows(fhe, &self.config, self.reserves, self.total_liquidity, &agg);
        let request = oracle.request(&[staged.new_reserve0, staged.new_reserve1]);
        tracing::debug!(epoch, request = request.value(), "reserve pair decryption requested");

        let pending = PendingReveal {
            epoch,
            request,
            staged,
            agg,
            funded,
        };
        match oracle.poll(request) {
            Some(values) => {
                let reserves = self.commit_reveal(pending, values)?;
                Ok(SettlementOutcome::Settled { epoch, reserves })
            }
            None => {
                self.pending = Some(pending);
                Ok(SettlementOutcome::AwaitingReveal { epoch })
            }
        }
    }

    /// Pull every queued order's funds in one batch; the effective
    /// (clamped) ciphertexts become the settled order amounts
    fn fund_epoch(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        epoch: EpochId,
    ) -> FundedEpoch {
        let mut funded = FundedEpoch::default();
        let (mints, swaps, burns): (
            Vec<(AccountId, MintOrder)>,
            Vec<(AccountId, SwapOrder)>,
            Vec<(AccountId, BurnOrder)>,
        ) = match self.queue.orders(epoch) {
            Some(orders) => (
                orders.mints.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                orders.swaps.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                orders.burns.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            ),
            None => return funded,
        };

        for (user, order) in mints {
            let in0 = token0.transfer_from(fhe, &self.account, &user, &self.account, order.amount0);
            let in1 = token1.transfer_from(fhe, &self.account, &user, &self.account, order.amount1);
            let liquidity = mint_entitlement(fhe, in0, in1, self.reserves, self.total_liquidity);
            funded.mints.insert(user, FundedMint { in0, in1, liquidity });
        }
        for (user, order) in swaps {
            let in0 =
                token0.transfer_from(fhe, &self.account, &user, &self.account, order.amount_in0);
            let in1 =
                token1.transfer_from(fhe, &self.account, &user, &self.account, order.amount_in1);
            funded.swaps.insert(user, (in0, in1));
        }
        for (user, order) in burns {
            let surrendered = self
                .liquidity_token
                .burn_encrypted(fhe, &user, order.liquidity);
            funded.burns.insert(user, surrendered);
        }
        funded
    }

    fn commit_reveal(
        &mut self,
        pending: PendingReveal,
        values: Vec<Amount>,
    ) -> Result<(Amount, Amount)> {
        let (reserve0, reserve1) = match values.as_slice() {
            &[r0, r1] => (r0, r1),
            other => {
                return Err(PairError::Internal(format!(
                    "quorum returned {} plaintexts for the reserve pair",
                    other.len()
                )))
            }
        };
        let outcome = EpochOutcome {
            reserves_before: self.reserves,
            reserves_after: (reserve0, reserve1),
            bootstrap: self.reserves.0.is_zero() && self.reserves.1.is_zero(),
            swap_in0: pending.agg.swap_in0,
            swap_in1: pending.agg.swap_in1,
            swap_out0: pending.staged.swap_out0,
            swap_out1: pending.staged.swap_out1,
            burned: pending.agg.burned,
            burn_payout0: pending.staged.burn_payout0,
            burn_payout1: pending.staged.burn_payout1,
            minted_total: pending.agg.minted,
            minted: pending
                .funded
                .mints
                .into_iter()
                .map(|(user, entry)| (user, entry.liquidity))
                .collect(),
            swap_funded: pending.funded.swaps,
            burn_funded: pending.funded.burns,
        };
        self.reserves = (reserve0, reserve1);
        self.total_liquidity = pending.staged.new_total_liquidity;
        self.outcomes.insert(pending.epoch, outcome);
        self.clock.mark_settled(pending.epoch);
        tracing::info!(
            epoch = pending.epoch,
            reserve0 = %reserve0,
            reserve1 = %reserve1,
            "reserves revealed; claims open"
        );
        Ok((reserve0, reserve1))
    }

    fn unchanged_outcome(&mut self, fhe: &mut dyn FheEngine) -> EpochOutcome {
        let zero = fhe.zero();
        EpochOutcome {
            reserves_before: self.reserves,
            reserves_after: self.reserves,
            bootstrap: false,
            swap_in0: zero,
            swap_in1: zero,
            swap_out0: zero,
            swap_out1: zero,
            burned: zero,
            burn_payout0: zero,
            burn_payout1: zero,
            minted_total: zero,
            minted: BTreeMap::new(),
            swap_funded: BTreeMap::new(),
            burn_funded: BTreeMap::new(),
        }
    }

    fn claimable_outcome(
        &self,
        epoch: EpochId,
        account: &AccountId,
        kind: OrderKind,
    ) -> Result<&EpochOutcome> {
        match self.clock.phase(epoch) {
            Some(EpochPhase::OpenForClaims) => {}
            Some(EpochPhase::Halted) => return Err(PairError::ClaimsHalted(epoch)),
            _ => return Err(PairError::EpochNotSettled(epoch)),
        }
        if self.claims.is_claimed(epoch, account, kind) {
            return Err(PairError::AlreadyClaimed {
                epoch,
                account: account.clone(),
                kind,
            });
        }
        self.outcomes
            .get(&epoch)
            .ok_or_else(|| PairError::Internal(format!("no outcome recorded for epoch {epoch}")))
    }

    /// Redeem the liquidity minted for an add-liquidity order
    /// Bootstrap-epoch claims forfeit the locked minimum liquidity
    pub fn claim_mint(
        &mut self,
        fhe: &mut dyn FheEngine,
        epoch: EpochId,
        account: &AccountId,
    ) -> Result<EncUint> {
        let outcome = self.claimable_outcome(epoch, account, OrderKind::Mint)?;
        let entitlement = *outcome
            .minted
            .get(account)
            .ok_or_else(|| PairError::OrderNotFound {
                epoch,
                account: account.clone(),
                kind: OrderKind::Mint,
            })?;
        let minted_total = outcome.minted_total;
        let bootstrap = outcome.bootstrap;

        let minted = if bootstrap {
            let lock = fhe.trivial(self.config.minimum_liquidity);
            fhe.sub(entitlement, lock)
        } else {
            entitlement
        };

        let prior = *self.claims.tally_mut(fhe, epoch);
        let new_minted = fhe.add(prior.minted, minted);
        let within = fhe.le(new_minted, minted_total);
        if !fhe.verify(within) {
            self.clock.halt(epoch);
            return Err(PairError::RoundingUnderflow(epoch));
        }
        self.claims.tally_mut(fhe, epoch).minted = new_minted;

        self.liquidity_token.mint_encrypted(fhe, account, minted);
        self.claims.record(epoch, account.clone(), OrderKind::Mint);
        tracing::debug!(epoch, claimer = %account, "mint claim executed");
        Ok(minted)
    }

    /// Redeem the counter-asset outputs of a swap order
    pub fn claim_swap(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        epoch: EpochId,
        account: &AccountId,
    ) -> Result<(EncUint, EncUint)> {
        let outcome = self.claimable_outcome(epoch, account, OrderKind::Swap)?;
        let (in0, in1) =
            *outcome
                .swap_funded
                .get(account)
                .ok_or_else(|| PairError::OrderNotFound {
                    epoch,
                    account: account.clone(),
                    kind: OrderKind::Swap,
                })?;
        let (total_in0, total_in1) = (outcome.swap_in0, outcome.swap_in1);
        let (total_out0, total_out1) = (outcome.swap_out0, outcome.swap_out1);

        // each direction pays out pro-rata to what the caller funded
        let share1 = fhe.mul_div(in0, total_out1, total_in0);
        let share0 = fhe.mul_div(in1, total_out0, total_in1);

        let prior = *self.claims.tally_mut(fhe, epoch);
        let new_out0 = fhe.add(prior.out0, share0);
        let new_out1 = fhe.add(prior.out1, share1);
        let within0 = fhe.le(new_out0, total_out0);
        let within1 = fhe.le(new_out1, total_out1);
        let ok0 = fhe.verify(within0);
        let ok1 = fhe.verify(within1);
        if !(ok0 && ok1) {
            self.clock.halt(epoch);
            return Err(PairError::RoundingUnderflow(epoch));
        }
        {
            let tally = self.claims.tally_mut(fhe, epoch);
            tally.out0 = new_out0;
            tally.out1 = new_out1;
        }

        token0.transfer(fhe, &self.account, account, share0);
        token1.transfer(fhe, &self.account, account, share1);
        self.claims.record(epoch, account.clone(), OrderKind::Swap);
        tracing::debug!(epoch, claimer = %account, "swap claim executed");
        Ok((share0, share1))
    }

    /// Redeem the underlying tokens for surrendered liquidity
    pub fn claim_burn(
        &mut self,
        fhe: &mut dyn FheEngine,
        token0: &mut EncryptedToken,
        token1: &mut EncryptedToken,
        epoch: EpochId,
        account: &AccountId,
    ) -> Result<(EncUint, EncUint)> {
        let outcome = self.claimable_outcome(epoch, account, OrderKind::Burn)?;
        let surrendered =
            *outcome
                .burn_funded
                .get(account)
                .ok_or_else(|| PairError::OrderNotFound {
                    epoch,
                    account: account.clone(),
                    kind: OrderKind::Burn,
                })?;
        let burned_total = outcome.burned;
        let (payout0, payout1) = (outcome.burn_payout0, outcome.burn_payout1);

        let share0 = fhe.mul_div(surrendered, payout0, burned_total);
        let share1 = fhe.mul_div(surrendered, payout1, burned_total);

        let prior = *self.claims.tally_mut(fhe, epoch);
        let new_payout0 = fhe.add(prior.payout0, share0);
        let new_payout1 = fhe.add(prior.payout1, share1);
        let within0 = fhe.le(new_payout0, payout0);
        let within1 = fhe.le(new_payout1, payout1);
        let ok0 = fhe.verify(within0);
        let ok1 = fhe.verify(within1);
        if !(ok0 && ok1) {
            self.clock.halt(epoch);
            return Err(PairError::RoundingUnderflow(epoch));
        }
        {
            let tally = self.claims.tally_mut(fhe, epoch);
            tally.payout0 = new_payout0;
            tally.payout1 = new_payout1;
        }

        token0.transfer(fhe, &self.account, account, share0);
        token1.transfer(fhe, &self.account, account, share1);
        self.claims.record(epoch, account.clone(), OrderKind::Burn);
        tracing::debug!(epoch, claimer = %account, "burn claim executed");
        Ok((share0, share1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veildex_fhe::{ClearEngine, LocalQuorum};

    fn amt(units: u32) -> Amount {
        Amount::from_units(units)
    }

    struct Fixture {
        fhe: ClearEngine,
        token0: EncryptedToken,
        token1: EncryptedToken,
        pair: EncryptedPair,
    }

    fn fixture() -> Fixture {
        let mut fhe = ClearEngine::new();
        let token0 = EncryptedToken::new(&mut fhe, "tok0");
        let token1 = EncryptedToken::new(&mut fhe, "tok1");
        let pair = EncryptedPair::new(&mut fhe, PairConfig::default(), AccountId::new("pair"));
        Fixture {
            fhe,
            token0,
            token1,
            pair,
        }
    }

    fn fund_and_approve(fx: &mut Fixture, user: &AccountId, units0: u32, units1: u32) {
        fx.token0.mint(&mut fx.fhe, user, amt(units0));
        fx.token1.mint(&mut fx.fhe, user, amt(units1));
        let a0 = fx.fhe.encrypt(amt(units0));
        let a1 = fx.fhe.encrypt(amt(units1));
        fx.token0.approve(user, fx.pair.account(), a0);
        fx.token1.approve(user, fx.pair.account(), a1);
    }

    #[test]
    fn test_epoch_hint_must_match_current_epoch() {
        let mut fx = fixture();
        let bob = AccountId::new("bob");
        fund_and_approve(&mut fx, &bob, 100, 200);

        let a0 = fx.fhe.encrypt(amt(100));
        let a1 = fx.fhe.encrypt(amt(200));
        let err = fx
            .pair
            .add_liquidity(&mut fx.fhe, &mut fx.token0, &mut fx.token1, a0, a1, &bob, 7)
            .unwrap_err();
        assert!(matches!(
            err,
            PairError::EpochMismatch { expected: 0, got: 7 }
        ));
    }

    #[test]
    fn test_submission_without_allowance_is_a_stale_approval() {
        let mut fx = fixture();
        let bob = AccountId::new("bob");
        fx.token0.mint(&mut fx.fhe, &bob, amt(100));
        fx.token1.mint(&mut fx.fhe, &bob, amt(200));

        let a0 = fx.fhe.encrypt(amt(100));
        let a1 = fx.fhe.encrypt(amt(200));
        let err = fx
            .pair
            .add_liquidity(&mut fx.fhe, &mut fx.token0, &mut fx.token1, a0, a1, &bob, 0)
            .unwrap_err();
        assert!(matches!(err, PairError::StaleApproval(_)));

        // nothing was queued
        let mut oracle = LocalQuorum::instant(&fx.fhe);
        let outcome = fx
            .pair
            .batch_settlement(&mut fx.fhe, &mut fx.token0, &mut fx.token1, &mut oracle)
            .unwrap();
        assert_eq!(
            outcome,
            SettlementOutcome::Settled {
                epoch: 0,
                reserves: (Amount::ZERO, Amount::ZERO)
            }
        );
    }

    #[test]
    fn test_claims_require_a_settled_epoch() {
        let mut fx = fixture();
        let bob = AccountId::new("bob");
        let err = fx.pair.claim_mint(&mut fx.fhe, 0, &bob).unwrap_err();
        assert!(matches!(err, PairError::EpochNotSettled(0)));
    }

    #[test]
    fn test_remove_liquidity_requires_a_liquidity_balance() {
        let mut fx = fixture();
        let bob = AccountId::new("bob");
        let liquidity = fx.fhe.encrypt(amt(10));
        let err = fx
            .pair
            .remove_liquidity(&mut fx.fhe, liquidity, &bob, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            PairError::Token(veildex_token::TokenError::InsufficientBalance(_))
        ));
    }

    #[test]
    fn test_overdraw_halts_the_epoch_for_good() {
        let mut fx = fixture();
        let bob = AccountId::new("bob");
        let carol = AccountId::new("carol");
        fund_and_approve(&mut fx, &bob, 100, 200);
        fund_and_approve(&mut fx, &carol, 200, 400);

        let a0 = fx.fhe.encrypt(amt(100));
        let a1 = fx.fhe.encrypt(amt(200));
        fx.pair
            .add_liquidity(&mut fx.fhe, &mut fx.token0, &mut fx.token1, a0, a1, &bob, 0)
            .unwrap();
        let a0 = fx.fhe.encrypt(amt(200));
        let a1 = fx.fhe.encrypt(amt(400));
        fx.pair
            .add_liquidity(
                &mut fx.fhe,
                &mut fx.token0,
                &mut fx.token1,
                a0,
                a1,
                &carol,
                0,
            )
            .unwrap();

        let mut oracle = LocalQuorum::instant(&fx.fhe);
        fx.pair
            .batch_settlement(&mut fx.fhe, &mut fx.token0, &mut fx.token1, &mut oracle)
            .unwrap();

        // simulate a broken share formula by poisoning the running tally
        let poisoned = fx.fhe.encrypt(Amount::from_raw(u64::MAX / 2));
        fx.pair.claims.tally_mut(&mut fx.fhe, 0).minted = poisoned;

        let err = fx.pair.claim_mint(&mut fx.fhe, 0, &bob).unwrap_err();
        assert!(matches!(err, PairError::RoundingUnderflow(0)));
        assert_eq!(fx.pair.epoch_phase(0), Some(EpochPhase::Halted));

        // the epoch pays nothing further, to anyone
        let err = fx.pair.claim_mint(&mut fx.fhe, 0, &carol).unwrap_err();
        assert!(matches!(err, PairError::ClaimsHalted(0)));
    }

    #[test]
    fn test_snapshot_reports_public_state_only() {
        let fx = fixture();
        let snap = fx.pair.snapshot();
        assert_eq!(snap.current_epoch, 0);
        assert_eq!(snap.phase, EpochPhase::Open);
        assert_eq!(snap.reserves, (Amount::ZERO, Amount::ZERO));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"current_epoch\":0"));
    }
}
