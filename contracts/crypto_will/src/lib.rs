#![no_std]

//! CryptoWill - Time-Locked Beneficiary-Release Escrow
//!
//! An owner deposits value and names a beneficiary. The owner may withdraw or
//! check in at any time; either action refreshes the activity timestamp. Once
//! the owner has been inactive for longer than the configured interval, the
//! beneficiary may claim the entire remaining balance.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short,
    token, Address, Env,
};

const DAY_IN_LEDGERS: u32 = 17280;
const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Will {
    /// Deployer; controls withdrawals and check-ins
    pub owner: Address,
    /// Entitled to the remaining balance once the interval elapses
    pub beneficiary: Address,
    /// Token holding the escrowed value
    pub token: Address,
    /// Permitted owner inactivity, in seconds
    pub interval: u64,
    /// Tracked balance; mirrors what the contract actually holds
    pub amount: i128,
    /// Last owner activity (init, withdraw or check-in)
    pub last_activity: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Will,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// only owner has access
    OnlyOwner = 3,
    /// only beneficiary has access
    OnlyBeneficiary = 4,
    /// interval has not passed yet
    IntervalNotPassed = 5,
    InsufficientFunds = 6,
    InvalidAmount = 7,
}

#[contract]
pub struct CryptoWill;

#[contractimpl]
impl CryptoWill {
    /// Set up the will and move the initial deposit in from the owner.
    ///
    /// # Arguments
    /// * `beneficiary` - Who may claim after the interval; not required to
    ///   differ from the owner
    /// * `token` - Token contract holding the escrowed value
    /// * `interval` - Seconds of owner inactivity before a claim is allowed
    /// * `initial_deposit` - Amount transferred in at creation; may be zero
    pub fn initialize(
        env: Env,
        owner: Address,
        beneficiary: Address,
        token: Address,
        interval: u64,
        initial_deposit: i128,
    ) -> Result<(), Error> {
        owner.require_auth();

        if env.storage().instance().has(&DataKey::Will) {
            return Err(Error::AlreadyInitialized);
        }
        if initial_deposit < 0 {
            return Err(Error::InvalidAmount);
        }

        if initial_deposit > 0 {
            let token_client = token::Client::new(&env, &token);
            token_client.transfer(&owner, &env.current_contract_address(), &initial_deposit);
        }

        let will = Will {
            owner: owner.clone(),
            beneficiary: beneficiary.clone(),
            token,
            interval,
            amount: initial_deposit,
            last_activity: env.ledger().timestamp(),
        };
        env.storage().instance().set(&DataKey::Will, &will);
        Self::bump_instance(&env);

        env.events().publish(
            (symbol_short!("init"), owner, beneficiary),
            initial_deposit,
        );

        Ok(())
    }

    /// Add value to the escrowed balance. Open to any caller; does not
    /// refresh the activity timestamp.
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        from.require_auth();

        let mut will = Self::load(&env)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let token_client = token::Client::new(&env, &will.token);
        token_client.transfer(&from, &env.current_contract_address(), &amount);

        will.amount = will.amount.checked_add(amount).ok_or(Error::InvalidAmount)?;
        env.storage().instance().set(&DataKey::Will, &will);
        Self::bump_instance(&env);

        env.events().publish((symbol_short!("deposit"), from), amount);

        Ok(())
    }

    /// Pay part of the balance back to the owner and refresh the activity
    /// timestamp. Available at any time, interval elapsed or not.
    pub fn withdraw(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        caller.require_auth();

        let mut will = Self::load(&env)?;
        if caller != will.owner {
            return Err(Error::OnlyOwner);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if amount > will.amount {
            return Err(Error::InsufficientFunds);
        }

        will.amount -= amount;
        will.last_activity = env.ledger().timestamp();

        let token_client = token::Client::new(&env, &will.token);
        token_client.transfer(&env.current_contract_address(), &will.owner, &amount);

        env.storage().instance().set(&DataKey::Will, &will);
        Self::bump_instance(&env);

        env.events().publish((symbol_short!("withdraw"), caller), amount);

        Ok(())
    }

    /// Sweep the entire remaining balance to the beneficiary.
    ///
    /// The identity guard is evaluated before the timing guard: a
    /// non-beneficiary is rejected with OnlyBeneficiary whether or not the
    /// interval has elapsed.
    pub fn claim(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let mut will = Self::load(&env)?;
        if caller != will.beneficiary {
            return Err(Error::OnlyBeneficiary);
        }
        let now = env.ledger().timestamp();
        if now < will.last_activity.saturating_add(will.interval) {
            return Err(Error::IntervalNotPassed);
        }

        let payout = will.amount;
        if payout > 0 {
            let token_client = token::Client::new(&env, &will.token);
            token_client.transfer(&env.current_contract_address(), &will.beneficiary, &payout);
        }

        will.amount = 0;
        env.storage().instance().set(&DataKey::Will, &will);
        Self::bump_instance(&env);

        env.events().publish((symbol_short!("claim"), caller), payout);

        Ok(())
    }

    /// Refresh the activity timestamp without moving funds, deferring the
    /// beneficiary's claim to now + interval.
    pub fn check_in(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let mut will = Self::load(&env)?;
        if caller != will.owner {
            return Err(Error::OnlyOwner);
        }

        will.last_activity = env.ledger().timestamp();
        env.storage().instance().set(&DataKey::Will, &will);
        Self::bump_instance(&env);

        env.events().publish((symbol_short!("checkin"), caller), ());

        Ok(())
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        Ok(Self::load(&env)?.owner)
    }

    pub fn beneficiary(env: Env) -> Result<Address, Error> {
        Ok(Self::load(&env)?.beneficiary)
    }

    pub fn amount(env: Env) -> Result<i128, Error> {
        Ok(Self::load(&env)?.amount)
    }

    pub fn interval(env: Env) -> Result<u64, Error> {
        Ok(Self::load(&env)?.interval)
    }

    pub fn last_activity(env: Env) -> Result<u64, Error> {
        Ok(Self::load(&env)?.last_activity)
    }

    /// Whether the timing gate is currently open. Says nothing about the
    /// balance; a claim on an empty will still succeeds and sweeps zero.
    pub fn can_claim(env: Env) -> bool {
        match Self::load(&env) {
            Ok(will) => {
                env.ledger().timestamp() >= will.last_activity.saturating_add(will.interval)
            }
            Err(_) => false,
        }
    }

    fn load(env: &Env) -> Result<Will, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Will)
            .ok_or(Error::NotInitialized)
    }

    fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}
