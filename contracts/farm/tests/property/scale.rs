#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for reward accounting at 18-decimal magnitudes.
//!
//! Emission rates reach 10^21 per block and stakes reach 10^24, so the
//! scaled accumulator and reward debts run far past `i128`.
//!
//! Invariants tested:
//! - Everything minted is either paid out or still held by the farm
//! - Held reward covers every pending claim, short only by rounding dust
//! - Two stakers split the emission to within rounding, never less

use halving_farm::rewards::PRECISION;
use halving_farm::{FarmContract, FarmContractClient};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{vec, Address, Env};

const START: u64 = 1_000;
const INTERVAL: u64 = 200;
const USERS: usize = 2;
const TOKEN: i128 = 1_000_000_000_000_000_000;
const MAX_STAKE: i128 = 1_000_000 * TOKEN;
const MAX_REWARD_PER_BLOCK: i128 = 1_000 * TOKEN;

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    Deposit {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..=MAX_STAKE")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..=MAX_STAKE")]
        amount: i128,
    },
    Harvest {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
    },
    Advance {
        #[proptest(strategy = "1u64..100")]
        blocks: u64,
    },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Farm {
    env: Env,
    client: FarmContractClient<'static>,
    reward_token: Address,
    stake_token: Address,
    users: std::vec::Vec<Address>,
    reward_per_block: i128,
    block: u64,
    /// Reward the schedule generated while anything was staked.
    emitted: i128,
}

fn setup(reward_per_block: i128) -> Farm {
    let env = Env::default();
    env.mock_all_auths();
    let block = START - 50;
    env.ledger().set_sequence_number(block as u32);

    let contract_id = env.register(FarmContract, ());
    let client = FarmContractClient::new(&env, &contract_id);
    let reward_token = env
        .register_stellar_asset_contract_v2(contract_id.clone())
        .address();
    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let admin = Address::generate(&env);
    client.initialize(
        &admin,
        &reward_token,
        &reward_per_block,
        &START,
        &INTERVAL,
        &vec![&env, 256u32, 128, 64],
    );
    client.add_pool(&admin, &stake_token, &1);

    let minter = StellarAssetClient::new(&env, &stake_token);
    let users = (0..USERS)
        .map(|_| {
            let user = Address::generate(&env);
            minter.mint(&user, &(10 * MAX_STAKE));
            user
        })
        .collect();

    Farm {
        env,
        client,
        reward_token,
        stake_token,
        users,
        reward_per_block,
        block,
        emitted: 0,
    }
}

fn apply(farm: &mut Farm, action: &Action) -> Result<(), TestCaseError> {
    let client = &farm.client;
    match action {
        Action::Deposit { user, amount } => {
            let user = &farm.users[*user];
            let held = TokenClient::new(&farm.env, &farm.stake_token).balance(user);
            if held == 0 {
                return Ok(());
            }
            client.deposit(&0, user, &(*amount).min(held));
        }
        Action::Withdraw { user, amount } => {
            let staked = client.get_position(&0, &farm.users[*user]).staked;
            if staked == 0 {
                return Ok(());
            }
            client.withdraw(&0, &farm.users[*user], &(*amount).min(staked));
        }
        Action::Harvest { user } => {
            let owed = client.pending_reward(&0, &farm.users[*user]);
            let paid = client.harvest(&0, &farm.users[*user]);
            prop_assert_eq!(paid, owed);
        }
        Action::Advance { blocks } => {
            let to = farm.block + blocks;
            if client.get_pool(&0).total_staked > 0 {
                farm.emitted += client.get_multiplier(&farm.block, &to) * farm.reward_per_block;
            }
            farm.block = to;
            farm.env.ledger().set_sequence_number(to as u32);
        }
    }
    Ok(())
}

fn reward_balance(farm: &Farm, who: &Address) -> i128 {
    TokenClient::new(&farm.env, &farm.reward_token).balance(who)
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Minted reward is conserved and every claim stays payable.
    #[test]
    fn prop_large_rewards_are_conserved(
        reward_per_block in 1i128..=MAX_REWARD_PER_BLOCK,
        actions in prop::collection::vec(any::<Action>(), 1..30),
    ) {
        let mut farm = setup(reward_per_block);
        for action in &actions {
            apply(&mut farm, action)?;
        }

        farm.client.update_pool(&0);

        let pending: i128 = farm
            .users
            .iter()
            .map(|u| farm.client.pending_reward(&0, u))
            .sum();
        let paid: i128 = farm.users.iter().map(|u| reward_balance(&farm, u)).sum();
        let held = reward_balance(&farm, &farm.client.address);

        prop_assert_eq!(paid + held, farm.emitted);
        prop_assert!(pending <= held, "pending {} exceeds held {}", pending, held);

        // Each settlement or payout may strand at most one accumulator unit
        // per staked share plus one base unit per staker.
        let per_step = (USERS as i128) * 10 * MAX_STAKE / PRECISION + USERS as i128;
        let dust = held - pending;
        prop_assert!(
            dust <= (actions.len() as i128 + 1) * per_step,
            "{} of {} emitted is unaccounted for",
            dust,
            farm.emitted
        );
    }

    /// Two whole-run stakers receive the full emission, less rounding dust.
    #[test]
    fn prop_large_stakers_split_without_shortfall(
        reward_per_block in 1i128..=MAX_REWARD_PER_BLOCK,
        a in 1i128..=MAX_STAKE,
        b in 1i128..=MAX_STAKE,
        blocks in 1u64..600,
    ) {
        let farm = setup(reward_per_block);
        let alice = &farm.users[0];
        let bob = &farm.users[1];
        farm.client.deposit(&0, alice, &a);
        farm.client.deposit(&0, bob, &b);

        farm.env.ledger().set_sequence_number((START + blocks) as u32);

        let total = farm.client.get_multiplier(&START, &(START + blocks)) * reward_per_block;
        let pa = farm.client.harvest(&0, alice);
        let pb = farm.client.harvest(&0, bob);

        prop_assert!(pa + pb <= total);
        prop_assert!(
            total - (pa + pb) <= (a + b) / PRECISION + 2,
            "shortfall {} of {}",
            total - (pa + pb),
            total
        );
    }
}
