use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

// ── Storage keys ─────────────────────────────────────────────────────────────

const TIER_PREFIX: Symbol = symbol_short!("ADM_TIER");
const SUPER_ADMIN: Symbol = symbol_short!("S_ADMIN");
const ADMIN_LIST: Symbol = symbol_short!("ADM_LIST");

/// TTL constants for persistent storage (in ledgers)
const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

// ── Tiers ────────────────────────────────────────────────────────────────────

/// Admin hierarchy for an emission farm.
///
/// - `PoolManager`   – may register staking pools and change their
///                     allocation share.
/// - `ScheduleAdmin` – everything a `PoolManager` may do, plus rewriting the
///                     future part of the halving schedule.
/// - `SuperAdmin`    – everything, including side-fund allocations and
///                     granting or revoking tiers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AdminTier {
    PoolManager = 1,
    ScheduleAdmin = 2,
    SuperAdmin = 3,
}

impl AdminTier {
    pub fn rank(&self) -> u32 {
        match self {
            AdminTier::PoolManager => 1,
            AdminTier::ScheduleAdmin => 2,
            AdminTier::SuperAdmin => 3,
        }
    }

    /// Returns true if this tier is at least as high as `min_tier`.
    pub fn has_at_least(&self, min_tier: &AdminTier) -> bool {
        self.rank() >= min_tier.rank()
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn tier_key(admin: &Address) -> (Symbol, Address) {
    (TIER_PREFIX, admin.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Assigns `tier` to `admin`. Callers verify authorization beforehand.
pub fn set_admin_tier(env: &Env, admin: &Address, tier: AdminTier) {
    let key = tier_key(admin);
    env.storage().persistent().set(&key, &tier);
    extend_ttl(env, &key);
}

pub fn get_admin_tier(env: &Env, admin: &Address) -> Option<AdminTier> {
    let key = tier_key(admin);
    let tier: Option<AdminTier> = env.storage().persistent().get(&key);
    if tier.is_some() {
        extend_ttl(env, &key);
    }
    tier
}

pub fn remove_admin_tier(env: &Env, admin: &Address) {
    env.storage().persistent().remove(&tier_key(admin));
}

/// Capability check: does `caller` hold at least `min_tier`?
pub fn require_tier(env: &Env, caller: &Address, min_tier: &AdminTier) -> bool {
    match get_admin_tier(env, caller) {
        Some(tier) => tier.has_at_least(min_tier),
        None => false,
    }
}

// ── SuperAdmin bootstrap ─────────────────────────────────────────────────────

/// Records the bootstrap admin and grants it `SuperAdmin`.
pub fn set_super_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&SUPER_ADMIN, admin);
    set_admin_tier(env, admin, AdminTier::SuperAdmin);
    track_admin(env, admin);
}

pub fn get_super_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&SUPER_ADMIN)
}

// ── Promote / demote ─────────────────────────────────────────────────────────

/// Grants `tier` to `target`. Returns `false` unless `caller` is a
/// `SuperAdmin`; `caller` must already be authenticated.
pub fn promote_admin(env: &Env, caller: &Address, target: &Address, tier: AdminTier) -> bool {
    if !require_tier(env, caller, &AdminTier::SuperAdmin) {
        return false;
    }
    set_admin_tier(env, target, tier);
    track_admin(env, target);
    true
}

/// Revokes every tier held by `target`. Returns `false` unless `caller` is a
/// `SuperAdmin`. The bootstrap admin cannot be demoted, so the farm always
/// keeps one address able to manage tiers.
pub fn demote_admin(env: &Env, caller: &Address, target: &Address) -> bool {
    if !require_tier(env, caller, &AdminTier::SuperAdmin) {
        return false;
    }
    if get_super_admin(env).as_ref() == Some(target) {
        return false;
    }
    remove_admin_tier(env, target);
    untrack_admin(env, target);
    true
}

// ── Admin list ───────────────────────────────────────────────────────────────

pub fn list_admins(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&ADMIN_LIST)
        .unwrap_or(Vec::new(env))
}

fn store_admins(env: &Env, admins: &Vec<Address>) {
    env.storage().persistent().set(&ADMIN_LIST, admins);
    env.storage()
        .persistent()
        .extend_ttl(&ADMIN_LIST, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn track_admin(env: &Env, admin: &Address) {
    let mut admins = list_admins(env);
    if !admins.contains(admin) {
        admins.push_back(admin.clone());
        store_admins(env, &admins);
    }
}

fn untrack_admin(env: &Env, admin: &Address) {
    let admins = list_admins(env);
    let mut kept = Vec::new(env);
    for a in admins.iter() {
        if a != *admin {
            kept.push_back(a);
        }
    }
    store_admins(env, &kept);
}
