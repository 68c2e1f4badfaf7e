use soroban_sdk::{Env, I256};

use crate::pool::Pool;
use crate::schedule::HalvingSchedule;
use crate::ContractError;

/// Fixed-point scaling factor.
///
/// `acc_reward_per_share` and `reward_debt` are stored multiplied by this
/// constant; every reward read divides it back out. Both are held as `I256`
/// so that 18-decimal tokens over the whole schedule never leave the
/// representable range.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Denominator of side-fund shares (basis points).
pub const BPS_DENOMINATOR: i128 = 10_000;

// ── Wide arithmetic ─────────────────────────────────────────────────────────

pub fn wide(env: &Env, value: i128) -> I256 {
    I256::from_i128(env, value)
}

pub fn zero(env: &Env) -> I256 {
    I256::from_i32(env, 0)
}

/// Narrow a wide result back to a token amount.
fn narrow(value: &I256) -> Result<i128, ContractError> {
    value.to_i128().ok_or(ContractError::ArithmeticOverflow)
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// Reward owed to one pool for `weight` multiplier-blocks.
///
/// ```text
/// pool_reward = weight × reward_per_block × alloc_share / total_alloc
/// ```
///
/// The emission across all pools must fit a token amount; anything larger
/// fails with `ArithmeticOverflow`.
pub fn pool_reward(
    env: &Env,
    weight: i128,
    reward_per_block: i128,
    alloc_share: u32,
    total_alloc: u32,
) -> Result<i128, ContractError> {
    if total_alloc == 0 {
        return Ok(0);
    }
    let emitted = weight
        .checked_mul(reward_per_block)
        .ok_or(ContractError::ArithmeticOverflow)?;
    let share = wide(env, emitted)
        .mul(&wide(env, i128::from(alloc_share)))
        .div(&wide(env, i128::from(total_alloc)));
    narrow(&share)
}

/// Fold `reward` into the per-share accumulator.
///
/// With nothing staked the accumulator is returned unchanged; callers never
/// generate a reward in that case, so nothing is orphaned.
pub fn compute_acc_reward_per_share(
    env: &Env,
    stored: &I256,
    reward: i128,
    total_staked: i128,
) -> I256 {
    if total_staked <= 0 {
        return stored.clone();
    }
    let increment = wide(env, reward)
        .mul(&wide(env, PRECISION))
        .div(&wide(env, total_staked));
    stored.add(&increment)
}

/// Scaled accumulator value already credited to a position.
pub fn reward_debt(env: &Env, staked: i128, acc_reward_per_share: &I256) -> I256 {
    wide(env, staked).mul(acc_reward_per_share)
}

/// Reward a position has earned since its last checkpoint.
///
/// ```text
/// pending = (staked × acc − reward_debt) / PRECISION
/// ```
///
/// `reward_debt` is kept scaled, so the division happens once and the sum of
/// every staker's pending reward never exceeds what the pool accrued.
pub fn pending(
    env: &Env,
    staked: i128,
    acc_reward_per_share: &I256,
    reward_debt: &I256,
) -> Result<i128, ContractError> {
    let owed = wide(env, staked)
        .mul(acc_reward_per_share)
        .sub(reward_debt);
    if owed <= zero(env) {
        return Ok(0);
    }
    narrow(&owed.div(&wide(env, PRECISION)))
}

/// Side-fund cut of a pool reward.
///
/// Split into quotient and remainder so `reward × bps` is never formed.
#[allow(clippy::arithmetic_side_effects)]
pub fn fund_cut(reward: i128, bps: u32) -> i128 {
    let bps = i128::from(bps);
    reward / BPS_DENOMINATOR * bps + reward % BPS_DENOMINATOR * bps / BPS_DENOMINATOR
}

// ── Pool settlement ─────────────────────────────────────────────────────────

/// Advance `pool` to `current_block`, returning the reward generated for it.
///
/// A pool with no stake (or no allocation) only moves `last_reward_block`
/// forward: the emission for that stretch is never generated. On error the
/// pool is left as it was.
pub fn settle(
    env: &Env,
    pool: &mut Pool,
    schedule: &HalvingSchedule,
    current_block: u64,
    reward_per_block: i128,
    total_alloc: u32,
) -> Result<i128, ContractError> {
    if current_block <= pool.last_reward_block {
        return Ok(0);
    }
    if pool.total_staked <= 0 || pool.alloc_share == 0 || total_alloc == 0 {
        pool.last_reward_block = current_block;
        return Ok(0);
    }

    let weight = schedule.weighted_emission(pool.last_reward_block, current_block)?;
    let reward = pool_reward(env, weight, reward_per_block, pool.alloc_share, total_alloc)?;

    pool.acc_reward_per_share =
        compute_acc_reward_per_share(env, &pool.acc_reward_per_share, reward, pool.total_staked);
    pool.last_reward_block = current_block;

    Ok(reward)
}

/// The pool as `settle` would leave it, without touching the original.
pub fn settled(
    env: &Env,
    pool: &Pool,
    schedule: &HalvingSchedule,
    current_block: u64,
    reward_per_block: i128,
    total_alloc: u32,
) -> Result<Pool, ContractError> {
    let mut next = pool.clone();
    settle(env, &mut next, schedule, current_block, reward_per_block, total_alloc)?;
    Ok(next)
}
