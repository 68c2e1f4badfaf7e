use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, I256};

// ── Storage keys ─────────────────────────────────────────────────────────────

const POOL_CTR: Symbol = symbol_short!("POOL_CTR");
const POOL: Symbol = symbol_short!("POOL");
const POOL_TOKEN: Symbol = symbol_short!("POOL_TOK");
const POSITION: Symbol = symbol_short!("POS");

/// TTL constants for persistent storage (in ledgers)
const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

// ── Types ────────────────────────────────────────────────────────────────────

/// Accumulator state of one staking pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    /// Token users stake into this pool.
    pub stake_token: Address,
    /// Relative weight among all pools.
    pub alloc_share: u32,
    pub total_staked: i128,
    /// Block up to which emission has been folded into the accumulator.
    pub last_reward_block: u64,
    /// Reward per staked unit since the pool opened, scaled by `PRECISION`.
    pub acc_reward_per_share: I256,
}

/// A user's stake in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub staked: i128,
    /// `staked × acc_reward_per_share` at the last checkpoint (scaled).
    pub reward_debt: I256,
}

impl UserPosition {
    pub fn empty(env: &Env) -> Self {
        UserPosition {
            staked: 0,
            reward_debt: I256::from_i32(env, 0),
        }
    }
}

// ── Pools ────────────────────────────────────────────────────────────────────

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_CTR).unwrap_or(0)
}

fn pool_key(pool_id: u32) -> (Symbol, u32) {
    (POOL, pool_id)
}

pub fn get_pool(env: &Env, pool_id: u32) -> Option<Pool> {
    let key = pool_key(pool_id);
    let pool: Option<Pool> = env.storage().persistent().get(&key);
    if pool.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    pool
}

pub fn store_pool(env: &Env, pool_id: u32, pool: &Pool) {
    let key = pool_key(pool_id);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Register a new pool and return its id.
pub fn push_pool(env: &Env, pool: &Pool) -> u32 {
    let pool_id = pool_count(env);
    store_pool(env, pool_id, pool);

    let token_key = (POOL_TOKEN, pool.stake_token.clone());
    env.storage().persistent().set(&token_key, &pool_id);
    env.storage()
        .persistent()
        .extend_ttl(&token_key, TTL_THRESHOLD, TTL_EXTEND_TO);

    env.storage()
        .instance()
        .set(&POOL_CTR, &pool_id.saturating_add(1));
    pool_id
}

/// Id of the pool staking `stake_token`, if one exists.
pub fn pool_for_token(env: &Env, stake_token: &Address) -> Option<u32> {
    env.storage()
        .persistent()
        .get(&(POOL_TOKEN, stake_token.clone()))
}

// ── Positions ────────────────────────────────────────────────────────────────

fn position_key(pool_id: u32, user: &Address) -> (Symbol, u32, Address) {
    (POSITION, pool_id, user.clone())
}

/// A user's position; users who never deposited read as zero.
pub fn get_position(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    env.storage()
        .persistent()
        .get(&position_key(pool_id, user))
        .unwrap_or_else(|| UserPosition::empty(env))
}

pub fn store_position(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    let key = position_key(pool_id, user);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
