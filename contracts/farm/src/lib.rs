#![no_std]

pub mod events;
pub mod pool;
pub mod rewards;
pub mod schedule;

use common::admin_tiers::{self, AdminTier};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec,
};

use pool::{Pool, UserPosition};
use schedule::HalvingSchedule;

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const SCHEDULE: Symbol = symbol_short!("SCHEDULE");
const TOTAL_ALLOC: Symbol = symbol_short!("TOT_ALLOC");
const FUNDS: Symbol = symbol_short!("FUNDS");

/// Upper bound on registered pools; every allocation change settles them all.
pub const MAX_POOLS: u32 = 64;

/// Upper bound on side-fund recipients.
pub const MAX_FUNDS: u32 = 4;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InvalidSchedule = 5,
    InvalidRange = 6,
    InsufficientStake = 7,
    PoolNotFound = 8,
    PoolExists = 9,
    TooManyPools = 10,
    TokensIdentical = 11,
    ArithmeticOverflow = 12,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Emission parameters fixed at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    /// Token minted as reward. The farm must be its admin.
    pub reward_token: Address,
    /// Base emission per block, before the schedule multiplier.
    pub reward_per_block: i128,
}

/// A side allocation minted on top of every pool reward
/// (development, liquidity, community or founder fund).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundShare {
    pub recipient: Address,
    /// Share of each pool reward, in basis points.
    pub bps: u32,
}

/// Everything a settlement needs, loaded once per call.
struct Emission {
    config: FarmConfig,
    schedule: HalvingSchedule,
    total_alloc: u32,
    funds: Vec<FundShare>,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct FarmContract;

#[contractimpl]
impl FarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the farm.
    ///
    /// * `reward_token`     – SAC address of the reward token; its admin must
    ///                        be this contract so rewards can be minted.
    /// * `reward_per_block` – base emission per block across all pools.
    /// * `start_block`      – first block that earns emission.
    /// * `halving_interval` – blocks between genesis halvings.
    /// * `multipliers`      – genesis multiplier table, one entry per step.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        reward_per_block: i128,
        start_block: u64,
        halving_interval: u64,
        multipliers: Vec<u32>,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_per_block < 0 {
            return Err(ContractError::InvalidInput);
        }

        let schedule = HalvingSchedule::genesis(&env, start_block, halving_interval, multipliers)?;
        let finish_bonus_block = schedule.finish_bonus_block();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(
            &CONFIG,
            &FarmConfig {
                reward_token: reward_token.clone(),
                reward_per_block,
            },
        );
        env.storage().instance().set(&SCHEDULE, &schedule);
        // TOTAL_ALLOC, FUNDS and the pool counter start empty; reads default them.

        admin_tiers::set_super_admin(&env, &admin);

        events::publish_initialized(
            &env,
            admin,
            reward_token,
            reward_per_block,
            start_block,
            halving_interval,
            finish_bonus_block,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` of the pool's token.
    ///
    /// The pool is settled first and the user's pending reward is paid out,
    /// so the new stake never earns retroactively.
    pub fn deposit(env: Env, pool_id: u32, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let emission = Self::load_emission(&env)?;
        let mut pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let mut position = pool::get_position(&env, pool_id, &user);

        // 1. Settle the pool and compute what the user is owed so far.
        Self::settle_pool(&env, &mut pool, &emission)?;
        let reward = rewards::pending(
            &env,
            position.staked,
            &pool.acc_reward_per_share,
            &position.reward_debt,
        )?;

        // 2. Grow the position and checkpoint it.
        position.staked = position
            .staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        position.reward_debt =
            rewards::reward_debt(&env, position.staked, &pool.acc_reward_per_share);

        // 3. Pull the stake into the farm.
        token::Client::new(&env, &pool.stake_token).transfer(
            &user,
            &env.current_contract_address(),
            &amount,
        );

        pool::store_pool(&env, pool_id, &pool);
        pool::store_position(&env, pool_id, &user, &position);

        // 4. Pay out what was owed before the deposit.
        let paid = Self::pay_reward(&env, &emission.config, &user, reward);

        events::publish_deposit(&env, pool_id, user, amount, paid);

        Ok(())
    }

    /// Unstake `amount`, paying out pending rewards.
    ///
    /// Fails with `InsufficientStake` (and changes nothing) if `amount`
    /// exceeds the user's stake.
    pub fn withdraw(env: Env, pool_id: u32, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let emission = Self::load_emission(&env)?;
        let mut pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let mut position = pool::get_position(&env, pool_id, &user);
        if position.staked < amount {
            return Err(ContractError::InsufficientStake);
        }

        Self::settle_pool(&env, &mut pool, &emission)?;
        let reward = rewards::pending(
            &env,
            position.staked,
            &pool.acc_reward_per_share,
            &position.reward_debt,
        )?;

        position.staked = position
            .staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        position.reward_debt =
            rewards::reward_debt(&env, position.staked, &pool.acc_reward_per_share);

        pool::store_pool(&env, pool_id, &pool);
        pool::store_position(&env, pool_id, &user, &position);

        // Return the stake (checks-effects-interactions).
        token::Client::new(&env, &pool.stake_token).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );
        let paid = Self::pay_reward(&env, &emission.config, &user, reward);

        events::publish_withdraw(&env, pool_id, user, amount, paid);

        Ok(())
    }

    /// Collect pending rewards without moving stake. Returns the amount paid.
    ///
    /// The pool is always settled. When nothing is owed the position is left
    /// untouched and no event is emitted.
    pub fn harvest(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        let emission = Self::load_emission(&env)?;
        let mut pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let mut position = pool::get_position(&env, pool_id, &user);

        Self::settle_pool(&env, &mut pool, &emission)?;
        pool::store_pool(&env, pool_id, &pool);

        let reward = rewards::pending(
            &env,
            position.staked,
            &pool.acc_reward_per_share,
            &position.reward_debt,
        )?;
        if reward <= 0 {
            return Ok(0);
        }

        position.reward_debt =
            rewards::reward_debt(&env, position.staked, &pool.acc_reward_per_share);
        pool::store_position(&env, pool_id, &user, &position);

        let paid = Self::pay_reward(&env, &emission.config, &user, reward);

        events::publish_harvest(&env, pool_id, user, paid);

        Ok(paid)
    }

    /// Withdraw the whole stake without collecting rewards.
    ///
    /// Pending rewards are forfeited and the position is zeroed. Returns the
    /// stake returned to the user.
    pub fn emergency_withdraw(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        let emission = Self::load_emission(&env)?;
        let mut pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let position = pool::get_position(&env, pool_id, &user);
        if position.staked <= 0 {
            return Ok(0);
        }

        // Settle with the stake still counted so the other stakers' share of
        // the elapsed emission is unchanged.
        Self::settle_pool(&env, &mut pool, &emission)?;

        let amount = position.staked;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        pool::store_pool(&env, pool_id, &pool);
        pool::store_position(&env, pool_id, &user, &UserPosition::empty(&env));

        token::Client::new(&env, &pool.stake_token).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );

        events::publish_emergency_withdraw(&env, pool_id, user, amount);

        Ok(amount)
    }

    // ── Settlement ──────────────────────────────────────────────────────────

    /// Fold the emission up to the current block into one pool.
    pub fn update_pool(env: Env, pool_id: u32) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        let emission = Self::load_emission(&env)?;
        let mut pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        Self::settle_pool(&env, &mut pool, &emission)?;
        pool::store_pool(&env, pool_id, &pool);
        Ok(())
    }

    /// Settle every pool.
    pub fn mass_update_pools(env: Env) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        let emission = Self::load_emission(&env)?;
        Self::settle_all(&env, &emission)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Multiplier-weighted block count over `[from, to)`.
    pub fn get_multiplier(env: Env, from: u64, to: u64) -> Result<i128, ContractError> {
        Self::load_schedule(&env)?.weighted_emission(from, to)
    }

    /// Genesis multiplier of step `index` (0 past the table).
    pub fn reward_multiplier_at(env: Env, index: u32) -> Result<u32, ContractError> {
        Ok(Self::load_schedule(&env)?.multiplier_at(index))
    }

    /// Current end block of step `index`; the last step ends at `u64::MAX`.
    pub fn halving_boundary_at(env: Env, index: u32) -> Result<u64, ContractError> {
        Self::load_schedule(&env)?
            .boundary_at(index)
            .ok_or(ContractError::InvalidInput)
    }

    /// First block after which the genesis schedule stops paying.
    pub fn finish_bonus_block(env: Env) -> Result<u64, ContractError> {
        Ok(Self::load_schedule(&env)?.finish_bonus_block())
    }

    /// Number of schedule steps, sentinel included.
    pub fn schedule_length(env: Env) -> Result<u32, ContractError> {
        Ok(Self::load_schedule(&env)?.len())
    }

    pub fn get_schedule(env: Env) -> Result<HalvingSchedule, ContractError> {
        Self::load_schedule(&env)
    }

    /// Reward `user` could harvest from `pool_id` at the current block.
    pub fn pending_reward(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        let emission = Self::load_emission(&env)?;
        let pool = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let projected = rewards::settled(
            &env,
            &pool,
            &emission.schedule,
            Self::current_block(&env),
            emission.config.reward_per_block,
            emission.total_alloc,
        )?;
        let position = pool::get_position(&env, pool_id, &user);
        rewards::pending(
            &env,
            position.staked,
            &projected.acc_reward_per_share,
            &position.reward_debt,
        )
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)
    }

    pub fn pool_length(env: Env) -> u32 {
        pool::pool_count(&env)
    }

    pub fn get_position(env: Env, pool_id: u32, user: Address) -> UserPosition {
        pool::get_position(&env, pool_id, &user)
    }

    /// Sum of every pool's allocation share.
    pub fn get_total_alloc(env: Env) -> u32 {
        env.storage().instance().get(&TOTAL_ALLOC).unwrap_or(0)
    }

    pub fn get_config(env: Env) -> Result<FarmConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn get_funds(env: Env) -> Vec<FundShare> {
        env.storage()
            .instance()
            .get(&FUNDS)
            .unwrap_or(Vec::new(&env))
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Replace the not-yet-reached part of the halving schedule.
    ///
    /// Every boundary must lie after the current block and the list must be
    /// strictly increasing; steps that already ended are left untouched.
    ///
    /// Requires at least `ScheduleAdmin` tier.
    pub fn extend_schedule(
        env: Env,
        caller: Address,
        new_boundaries: Vec<u64>,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::ScheduleAdmin)?;

        let schedule = Self::load_schedule(&env)?;
        let extended = schedule.extend(&env, Self::current_block(&env), &new_boundaries)?;
        let kept_steps = extended
            .len()
            .saturating_sub(new_boundaries.len())
            .saturating_sub(1);

        env.storage().instance().set(&SCHEDULE, &extended);

        events::publish_schedule_extended(&env, caller, kept_steps, new_boundaries);

        Ok(())
    }

    /// Register a staking pool and return its id.
    ///
    /// All existing pools are settled first so the emission already elapsed
    /// is split by the old allocation. Requires at least `PoolManager` tier.
    pub fn add_pool(
        env: Env,
        caller: Address,
        stake_token: Address,
        alloc_share: u32,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::PoolManager)?;

        let emission = Self::load_emission(&env)?;
        if stake_token == emission.config.reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if pool::pool_for_token(&env, &stake_token).is_some() {
            return Err(ContractError::PoolExists);
        }
        if pool::pool_count(&env) >= MAX_POOLS {
            return Err(ContractError::TooManyPools);
        }
        let total_alloc = emission
            .total_alloc
            .checked_add(alloc_share)
            .ok_or(ContractError::InvalidInput)?;

        Self::settle_all(&env, &emission)?;

        let new_pool = Pool {
            stake_token: stake_token.clone(),
            alloc_share,
            total_staked: 0,
            last_reward_block: Self::current_block(&env).max(emission.schedule.start_block),
            acc_reward_per_share: rewards::zero(&env),
        };
        let pool_id = pool::push_pool(&env, &new_pool);
        env.storage().instance().set(&TOTAL_ALLOC, &total_alloc);

        events::publish_pool_added(&env, pool_id, stake_token, alloc_share, total_alloc);

        Ok(pool_id)
    }

    /// Change a pool's allocation share.
    ///
    /// Requires at least `PoolManager` tier.
    pub fn set_pool(
        env: Env,
        caller: Address,
        pool_id: u32,
        alloc_share: u32,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::PoolManager)?;

        let emission = Self::load_emission(&env)?;
        let current = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        let total_alloc = emission
            .total_alloc
            .saturating_sub(current.alloc_share)
            .checked_add(alloc_share)
            .ok_or(ContractError::InvalidInput)?;

        // Flush at the old shares before they change.
        Self::settle_all(&env, &emission)?;

        let mut updated = pool::get_pool(&env, pool_id).ok_or(ContractError::PoolNotFound)?;
        updated.alloc_share = alloc_share;
        pool::store_pool(&env, pool_id, &updated);
        env.storage().instance().set(&TOTAL_ALLOC, &total_alloc);

        events::publish_pool_set(&env, pool_id, alloc_share, total_alloc);

        Ok(())
    }

    /// Replace the side-fund allocations.
    ///
    /// At most `MAX_FUNDS` entries whose shares sum to at most 10 000 bps.
    /// Requires `SuperAdmin` tier.
    pub fn set_funds(env: Env, caller: Address, funds: Vec<FundShare>) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin_tier(&env, &caller, &AdminTier::SuperAdmin)?;

        if funds.len() > MAX_FUNDS {
            return Err(ContractError::InvalidInput);
        }
        let mut total_bps: u32 = 0;
        for fund in funds.iter() {
            total_bps = total_bps
                .checked_add(fund.bps)
                .ok_or(ContractError::InvalidInput)?;
        }
        if i128::from(total_bps) > rewards::BPS_DENOMINATOR {
            return Err(ContractError::InvalidInput);
        }

        // Rewards accrued so far are split by the old allocations.
        let emission = Self::load_emission(&env)?;
        Self::settle_all(&env, &emission)?;

        env.storage().instance().set(&FUNDS, &funds);

        events::publish_funds_set(&env, funds);

        Ok(())
    }

    // ── Admin tier management ────────────────────────────────────────────────

    /// Grants `tier` to `target`. Only a `SuperAdmin` may call this.
    pub fn promote_admin(
        env: Env,
        caller: Address,
        target: Address,
        tier: AdminTier,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::promote_admin(&env, &caller, &target, tier) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Removes every tier from `target`. Only a `SuperAdmin` may call this.
    pub fn demote_admin(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::demote_admin(&env, &caller, &target) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn get_admin_tier(env: Env, admin: Address) -> Option<AdminTier> {
        admin_tiers::get_admin_tier(&env, &admin)
    }

    pub fn list_admins(env: Env) -> Vec<Address> {
        admin_tiers::list_admins(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn current_block(env: &Env) -> u64 {
        u64::from(env.ledger().sequence())
    }

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` does not hold at least `min_tier`.
    /// Falls back to the bootstrap admin.
    fn require_admin_tier(
        env: &Env,
        caller: &Address,
        min_tier: &AdminTier,
    ) -> Result<(), ContractError> {
        if admin_tiers::require_tier(env, caller, min_tier) {
            return Ok(());
        }
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<FarmConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_schedule(env: &Env) -> Result<HalvingSchedule, ContractError> {
        env.storage()
            .instance()
            .get(&SCHEDULE)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_emission(env: &Env) -> Result<Emission, ContractError> {
        Ok(Emission {
            config: Self::load_config(env)?,
            schedule: Self::load_schedule(env)?,
            total_alloc: env.storage().instance().get(&TOTAL_ALLOC).unwrap_or(0),
            funds: env
                .storage()
                .instance()
                .get(&FUNDS)
                .unwrap_or(Vec::new(env)),
        })
    }

    /// Settle `pool` to the current block and mint what it generated.
    ///
    /// The stakers' reward is minted to the farm, which pays it out on
    /// harvest; each side fund receives its cut directly. The caller stores
    /// the pool.
    fn settle_pool(env: &Env, pool: &mut Pool, emission: &Emission) -> Result<(), ContractError> {
        let reward = rewards::settle(
            env,
            pool,
            &emission.schedule,
            Self::current_block(env),
            emission.config.reward_per_block,
            emission.total_alloc,
        )?;
        if reward <= 0 {
            return Ok(());
        }

        let minter = token::StellarAssetClient::new(env, &emission.config.reward_token);
        minter.mint(&env.current_contract_address(), &reward);
        for fund in emission.funds.iter() {
            let cut = rewards::fund_cut(reward, fund.bps);
            if cut > 0 {
                minter.mint(&fund.recipient, &cut);
            }
        }
        Ok(())
    }

    fn settle_all(env: &Env, emission: &Emission) -> Result<(), ContractError> {
        for pool_id in 0..pool::pool_count(env) {
            let mut pool = pool::get_pool(env, pool_id).ok_or(ContractError::PoolNotFound)?;
            Self::settle_pool(env, &mut pool, emission)?;
            pool::store_pool(env, pool_id, &pool);
        }
        Ok(())
    }

    /// Transfer up to `amount` reward tokens from the farm to `to`.
    ///
    /// Capped at the farm's balance so rounding dust can never make a payout
    /// revert. Returns the amount actually paid.
    fn pay_reward(env: &Env, config: &FarmConfig, to: &Address, amount: i128) -> i128 {
        if amount <= 0 {
            return 0;
        }
        let client = token::Client::new(env, &config.reward_token);
        let farm = env.current_contract_address();
        let paid = amount.min(client.balance(&farm));
        if paid > 0 {
            client.transfer(&farm, to, &paid);
        }
        paid
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
