#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Vec};

use crate::FundShare;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the farm is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub reward_token: Address,
    pub reward_per_block: i128,
    pub start_block: u64,
    pub halving_interval: u64,
    pub finish_bonus_block: u64,
    pub block: u64,
}

/// Fired when a staking pool is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u32,
    pub stake_token: Address,
    pub alloc_share: u32,
    pub total_alloc: u32,
    pub block: u64,
}

/// Fired when a pool's allocation share changes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSetEvent {
    pub pool_id: u32,
    pub alloc_share: u32,
    pub total_alloc: u32,
    pub block: u64,
}

/// Fired when a user stakes into a pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub pool_id: u32,
    pub user: Address,
    pub amount: i128,
    pub reward_paid: i128,
    pub block: u64,
}

/// Fired when a user takes stake out of a pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub pool_id: u32,
    pub user: Address,
    pub amount: i128,
    pub reward_paid: i128,
    pub block: u64,
}

/// Fired when a user collects rewards without moving stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestEvent {
    pub pool_id: u32,
    pub user: Address,
    pub reward_paid: i128,
    pub block: u64,
}

/// Fired when a user pulls their stake and forfeits pending rewards.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawEvent {
    pub pool_id: u32,
    pub user: Address,
    pub amount: i128,
    pub block: u64,
}

/// Fired when the future part of the halving schedule is replaced.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScheduleExtendedEvent {
    pub caller: Address,
    pub kept_steps: u32,
    pub new_boundaries: Vec<u64>,
    pub block: u64,
}

/// Fired when the side-fund allocations change.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsSetEvent {
    pub funds: Vec<FundShare>,
    pub block: u64,
}

fn block(env: &Env) -> u64 {
    u64::from(env.ledger().sequence())
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    reward_token: Address,
    reward_per_block: i128,
    start_block: u64,
    halving_interval: u64,
    finish_bonus_block: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            reward_token,
            reward_per_block,
            start_block,
            halving_interval,
            finish_bonus_block,
            block: block(env),
        },
    );
}

pub fn publish_pool_added(
    env: &Env,
    pool_id: u32,
    stake_token: Address,
    alloc_share: u32,
    total_alloc: u32,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolAddedEvent {
            pool_id,
            stake_token,
            alloc_share,
            total_alloc,
            block: block(env),
        },
    );
}

pub fn publish_pool_set(env: &Env, pool_id: u32, alloc_share: u32, total_alloc: u32) {
    env.events().publish(
        (symbol_short!("POOL_SET"), pool_id),
        PoolSetEvent {
            pool_id,
            alloc_share,
            total_alloc,
            block: block(env),
        },
    );
}

pub fn publish_deposit(env: &Env, pool_id: u32, user: Address, amount: i128, reward_paid: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), pool_id, user.clone()),
        DepositEvent {
            pool_id,
            user,
            amount,
            reward_paid,
            block: block(env),
        },
    );
}

pub fn publish_withdraw(env: &Env, pool_id: u32, user: Address, amount: i128, reward_paid: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), pool_id, user.clone()),
        WithdrawEvent {
            pool_id,
            user,
            amount,
            reward_paid,
            block: block(env),
        },
    );
}

pub fn publish_harvest(env: &Env, pool_id: u32, user: Address, reward_paid: i128) {
    env.events().publish(
        (symbol_short!("HARVEST"), pool_id, user.clone()),
        HarvestEvent {
            pool_id,
            user,
            reward_paid,
            block: block(env),
        },
    );
}

pub fn publish_emergency_withdraw(env: &Env, pool_id: u32, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EMRG_WD"), pool_id, user.clone()),
        EmergencyWithdrawEvent {
            pool_id,
            user,
            amount,
            block: block(env),
        },
    );
}

pub fn publish_schedule_extended(
    env: &Env,
    caller: Address,
    kept_steps: u32,
    new_boundaries: Vec<u64>,
) {
    env.events().publish(
        (symbol_short!("SCHED_EXT"), caller.clone()),
        ScheduleExtendedEvent {
            caller,
            kept_steps,
            new_boundaries,
            block: block(env),
        },
    );
}

pub fn publish_funds_set(env: &Env, funds: Vec<FundShare>) {
    env.events().publish(
        (symbol_short!("FUNDS_SET"),),
        FundsSetEvent {
            funds,
            block: block(env),
        },
    );
}
