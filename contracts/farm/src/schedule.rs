//! Halving schedule: the step function that weights per-block emission.
//!
//! Step `i` covers the half-open block range `[lower_i, boundaries[i])`, where
//! `lower_0 = start_block` and `lower_i = boundaries[i - 1]`. A boundary is the
//! exclusive end of its own step and the inclusive start of the next one.
//!
//! The last boundary is always [`NEVER`]. Its step weighs 0, so once the real
//! steps run out emission simply stops; the resolver never has to special-case
//! the end of the table.

use soroban_sdk::{contracttype, Env, Vec};

use crate::ContractError;

/// Sentinel closing every schedule ("infinite future, zero reward").
pub const NEVER: u64 = u64::MAX;

/// Upper bound on the number of boundaries, sentinel included.
pub const MAX_SCHEDULE_STEPS: u32 = 512;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HalvingSchedule {
    /// First block that earns emission.
    pub start_block: u64,
    /// Genesis distance between halvings. Only used to derive the
    /// finish-bonus block; extensions carry explicit boundaries.
    pub halving_interval: u64,
    /// Strictly increasing step ends, terminated by [`NEVER`].
    pub boundaries: Vec<u64>,
    /// Genesis multiplier table, indexed by step. Never mutated.
    pub multipliers: Vec<u32>,
}

impl HalvingSchedule {
    /// Build the genesis schedule.
    ///
    /// A table of `M` multipliers yields `M - 1` real halvings at
    /// `start_block + halving_interval * (i + 1)`, followed by the sentinel.
    pub fn genesis(
        env: &Env,
        start_block: u64,
        halving_interval: u64,
        multipliers: Vec<u32>,
    ) -> Result<Self, ContractError> {
        if multipliers.is_empty() || multipliers.len() > MAX_SCHEDULE_STEPS {
            return Err(ContractError::InvalidSchedule);
        }
        if halving_interval == 0 {
            return Err(ContractError::InvalidSchedule);
        }

        let mut boundaries = Vec::new(env);
        for step in 1..multipliers.len() {
            let boundary = halving_interval
                .checked_mul(u64::from(step))
                .and_then(|offset| start_block.checked_add(offset))
                .filter(|b| *b != NEVER)
                .ok_or(ContractError::InvalidSchedule)?;
            boundaries.push_back(boundary);
        }
        boundaries.push_back(NEVER);

        Ok(Self {
            start_block,
            halving_interval,
            boundaries,
            multipliers,
        })
    }

    /// Number of steps, sentinel included.
    pub fn len(&self) -> u32 {
        self.boundaries.len()
    }

    pub fn boundary_at(&self, index: u32) -> Option<u64> {
        self.boundaries.get(index)
    }

    /// Genesis multiplier for `index`; 0 past the end of the table.
    pub fn multiplier_at(&self, index: u32) -> u32 {
        self.multipliers.get(index).unwrap_or(0)
    }

    fn step_weight(&self, index: u32, boundary: u64) -> i128 {
        if boundary == NEVER {
            return 0;
        }
        i128::from(self.multiplier_at(index))
    }

    /// Total multiplier-weighted block count over `[from, to)`.
    pub fn weighted_emission(&self, from: u64, to: u64) -> Result<i128, ContractError> {
        if from >= to {
            return Err(ContractError::InvalidRange);
        }

        let mut total: i128 = 0;
        let mut lower = self.start_block;
        for (index, boundary) in self.boundaries.iter().enumerate() {
            if boundary > from {
                let overlap_start = from.max(lower).max(self.start_block);
                let overlap_end = to.min(boundary);
                if overlap_end > overlap_start {
                    let blocks = i128::from(overlap_end - overlap_start);
                    let weight = self.step_weight(index as u32, boundary);
                    total = total.saturating_add(blocks.saturating_mul(weight));
                }
                if boundary >= to {
                    break;
                }
            }
            lower = boundary;
        }

        Ok(total)
    }

    /// Replace every step that has not ended yet.
    ///
    /// Steps whose boundary is at or before `current_block` are kept verbatim;
    /// the first unfinished step and everything after it are replaced by
    /// `new_boundaries`, and the sentinel is re-appended. Step indices keep
    /// pointing into the genesis multiplier table, so any range that ends at
    /// or before `current_block` resolves exactly as it did before.
    pub fn extend(
        &self,
        env: &Env,
        current_block: u64,
        new_boundaries: &Vec<u64>,
    ) -> Result<Self, ContractError> {
        if new_boundaries.is_empty() {
            return Err(ContractError::InvalidSchedule);
        }
        let mut previous = current_block;
        for boundary in new_boundaries.iter() {
            if boundary <= previous || boundary == NEVER {
                return Err(ContractError::InvalidSchedule);
            }
            previous = boundary;
        }

        let mut boundaries = Vec::new(env);
        for boundary in self.boundaries.iter() {
            if boundary > current_block {
                break;
            }
            boundaries.push_back(boundary);
        }
        boundaries.append(new_boundaries);
        boundaries.push_back(NEVER);

        if boundaries.len() > MAX_SCHEDULE_STEPS {
            return Err(ContractError::InvalidSchedule);
        }

        Ok(Self {
            boundaries,
            ..self.clone()
        })
    }

    /// Start of the first genesis step that pays nothing.
    ///
    /// Derived from the genesis constants, so later extensions do not move it.
    pub fn finish_bonus_block(&self) -> u64 {
        let real_steps = self.multipliers.len().saturating_sub(1);
        let first_idle = (0..real_steps)
            .find(|step| self.multipliers.get(*step) == Some(0))
            .unwrap_or(real_steps);
        self.start_block
            .saturating_add(self.halving_interval.saturating_mul(u64::from(first_idle)))
    }
}
