#![no_main]

use arbitrary::Arbitrary;
use halving_farm::{FarmContract, FarmContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    Address, Env, Vec as SorobanVec,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
    Harvest,
    EmergencyWithdraw,
    Advance { blocks: u16 },
    ExtendSchedule { gaps: Vec<u16> },
    SetPool { alloc_share: u16 },
}

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    start_offset: u16,
    interval: u16,
    /// Emission rate is `10^(reward_exponent % 22)`, up to 1 000 tokens at 18 decimals.
    reward_exponent: u8,
    /// Stake amounts are scaled by `10^(stake_exponent % 7)`.
    stake_exponent: u8,
    multipliers: Vec<u16>,
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: FuzzInput| {
    let env = Env::default();
    env.mock_all_auths();
    let mut block: u64 = 1_000;
    env.ledger().set_sequence_number(block as u32);

    let contract_id = env.register(FarmContract, ());
    let client = FarmContractClient::new(&env, &contract_id);
    let reward_token = env
        .register_stellar_asset_contract_v2(contract_id.clone())
        .address();
    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let mut multipliers = SorobanVec::new(&env);
    for m in input.multipliers.iter().take(64) {
        multipliers.push_back(u32::from(*m));
    }

    // Invalid genesis parameters must be rejected, never panic.
    let admin = Address::generate(&env);
    let start = block + u64::from(input.start_offset);
    let reward_per_block = 10i128.pow(u32::from(input.reward_exponent % 22));
    let stake_scale = 10i128.pow(u32::from(input.stake_exponent % 7));
    if client
        .try_initialize(
            &admin,
            &reward_token,
            &reward_per_block,
            &start,
            &u64::from(input.interval),
            &multipliers,
        )
        .is_err()
    {
        return;
    }
    let _ = client.try_add_pool(&admin, &stake_token, &1);

    let minter = StellarAssetClient::new(&env, &stake_token);
    let mut users = vec![admin.clone()];
    for _ in 0..3 {
        users.push(Address::generate(&env));
    }
    for user in &users {
        minter.mint(user, &(i128::from(u64::MAX) * 1_000_000));
    }

    // Look for panics: overflow, out-of-bounds reads or payouts the farm
    // cannot cover.
    for (i, action) in input.actions.into_iter().take(64).enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Deposit { amount } => {
                let _ = client.try_deposit(&0, caller, &(i128::from(amount) * stake_scale));
            }
            FuzzAction::Withdraw { amount } => {
                let _ = client.try_withdraw(&0, caller, &(i128::from(amount) * stake_scale));
            }
            FuzzAction::Harvest => {
                let _ = client.try_harvest(&0, caller);
            }
            FuzzAction::EmergencyWithdraw => {
                let _ = client.try_emergency_withdraw(&0, caller);
            }
            FuzzAction::Advance { blocks } => {
                // Stay inside the default entry lifetime.
                block += u64::from(blocks % 50);
                env.ledger().set_sequence_number(block as u32);
            }
            FuzzAction::ExtendSchedule { gaps } => {
                let mut boundaries = SorobanVec::new(&env);
                let mut next = block;
                for gap in gaps.iter().take(32) {
                    next += u64::from(*gap);
                    boundaries.push_back(next);
                }
                let _ = client.try_extend_schedule(&admin, &boundaries);
            }
            FuzzAction::SetPool { alloc_share } => {
                let _ = client.try_set_pool(&admin, &0, &u32::from(alloc_share));
            }
        }
    }
});
