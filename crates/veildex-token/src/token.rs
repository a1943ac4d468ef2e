use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use veildex_fhe::{EncUint, FheEngine};
use veildex_types::{AccountId, Amount};

use crate::error::{Result, TokenError};

/// ERC20-style token holding encrypted balances and allowances
///
/// Transfer amounts are ciphertexts. A transfer that exceeds the sender's
/// balance or the spender's allowance moves an encrypted zero instead of
/// failing: the guard is evaluated inside the circuit and nothing about the
/// compared values is revealed. Callers that need a hard failure ask for a
/// comparison proof up front via [`EncryptedToken::require_allowance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedToken {
    name: String,
    balances: BTreeMap<AccountId, EncUint>,
    allowances: BTreeMap<(AccountId, AccountId), EncUint>,
    total_supply: EncUint,
}

impl EncryptedToken {
    pub fn new(fhe: &mut dyn FheEngine, name: impl Into<String>) -> Self {
        EncryptedToken {
            name: name.into(),
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: fhe.zero(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encrypted total supply; only ever revealed through the owner's
    /// reencryption path, never by the token itself
    pub fn total_supply(&self) -> EncUint {
        self.total_supply
    }

    /// Balance ciphertext, decryptable only by the owner's view key
    pub fn balance_of(&self, owner: &AccountId) -> Result<EncUint> {
        self.balances
            .get(owner)
            .copied()
            .ok_or_else(|| TokenError::UnknownAccount(owner.clone()))
    }

    fn balance_or_zero(&mut self, fhe: &mut dyn FheEngine, owner: &AccountId) -> EncUint {
        match self.balances.get(owner) {
            Some(ct) => *ct,
            None => {
                let zero = fhe.zero();
                self.balances.insert(owner.clone(), zero);
                zero
            }
        }
    }

    fn allowance_or_zero(
        &mut self,
        fhe: &mut dyn FheEngine,
        owner: &AccountId,
        spender: &AccountId,
    ) -> EncUint {
        let key = (owner.clone(), spender.clone());
        match self.allowances.get(&key) {
            Some(ct) => *ct,
            None => {
                let zero = fhe.zero();
                self.allowances.insert(key, zero);
                zero
            }
        }
    }

    /// Issue new supply from a public amount
    pub fn mint(&mut self, fhe: &mut dyn FheEngine, to: &AccountId, amount: Amount) {
        let ct = fhe.trivial(amount);
        self.mint_encrypted(fhe, to, ct);
    }

    /// Issue new supply from a ciphertext amount
    pub fn mint_encrypted(&mut self, fhe: &mut dyn FheEngine, to: &AccountId, amount: EncUint) {
        let balance = self.balance_or_zero(fhe, to);
        let updated = fhe.add(balance, amount);
        self.balances.insert(to.clone(), updated);
        self.total_supply = fhe.add(self.total_supply, amount);
        tracing::debug!(token = %self.name, to = %to, "minted encrypted amount");
    }

    /// Destroy up to `amount` from `from`, clamped to the available balance
    /// Returns the effective burned ciphertext
    pub fn burn_encrypted(
        &mut self,
        fhe: &mut dyn FheEngine,
        from: &AccountId,
        amount: EncUint,
    ) -> EncUint {
        let balance = self.balance_or_zero(fhe, from);
        let zero = fhe.zero();
        let covered = fhe.le(amount, balance);
        let effective = fhe.select(covered, amount, zero);
        let updated = fhe.sub(balance, effective);
        self.balances.insert(from.clone(), updated);
        self.total_supply = fhe.sub(self.total_supply, effective);
        effective
    }

    /// Move `amount` from `from` to `to`; an uncovered amount moves zero
    /// Returns the effective transferred ciphertext
    pub fn transfer(
        &mut self,
        fhe: &mut dyn FheEngine,
        from: &AccountId,
        to: &AccountId,
        amount: EncUint,
    ) -> EncUint {
        let from_balance = self.balance_or_zero(fhe, from);
        let zero = fhe.zero();
        let covered = fhe.le(amount, from_balance);
        let effective = fhe.select(covered, amount, zero);

        let debited = fhe.sub(from_balance, effective);
        self.balances.insert(from.clone(), debited);

        let to_balance = self.balance_or_zero(fhe, to);
        let credited = fhe.add(to_balance, effective);
        self.balances.insert(to.clone(), credited);
        effective
    }

    /// Set the allowance from `owner` to `spender` (overwrite, ERC20-style)
    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: EncUint,
    ) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    /// Check a comparison proof that the allowance covers `amount`
    ///
    /// Reveals one boolean; fails closed when no allowance was ever granted
    pub fn require_allowance(
        &mut self,
        fhe: &mut dyn FheEngine,
        owner: &AccountId,
        spender: &AccountId,
        amount: EncUint,
    ) -> Result<()> {
        let allowance = self.allowance_or_zero(fhe, owner, spender);
        let proof = fhe.le(amount, allowance);
        if fhe.verify(proof) {
            Ok(())
        } else {
            Err(TokenError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
            })
        }
    }

    /// Check a comparison proof that `owner`'s balance covers `amount`
    pub fn require_balance(
        &mut self,
        fhe: &mut dyn FheEngine,
        owner: &AccountId,
        amount: EncUint,
    ) -> Result<()> {
        let balance = self.balance_or_zero(fhe, owner);
        let proof = fhe.le(amount, balance);
        if fhe.verify(proof) {
            Ok(())
        } else {
            Err(TokenError::InsufficientBalance(owner.clone()))
        }
    }

    /// Spender-initiated transfer bounded by both allowance and balance
    ///
    /// The double guard stays inside the circuit: an uncovered request moves
    /// zero and debits nothing. Returns the effective transferred ciphertext
    pub fn transfer_from(
        &mut self,
        fhe: &mut dyn FheEngine,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: EncUint,
    ) -> EncUint {
        let allowance = self.allowance_or_zero(fhe, from, spender);
        let balance = self.balance_or_zero(fhe, from);
        let zero = fhe.zero();

        let within_allowance = fhe.le(amount, allowance);
        let within_balance = fhe.le(amount, balance);
        let if_allowed = fhe.select(within_balance, amount, zero);
        let effective = fhe.select(within_allowance, if_allowed, zero);

        let debited = fhe.sub(balance, effective);
        self.balances.insert(from.clone(), debited);

        let spent = fhe.sub(allowance, effective);
        self.allowances
            .insert((from.clone(), spender.clone()), spent);

        let to_balance = self.balance_or_zero(fhe, to);
        let credited = fhe.add(to_balance, effective);
        self.balances.insert(to.clone(), credited);
        effective
    }
}
