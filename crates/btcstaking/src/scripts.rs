//! Leaf scripts of the staking taproot tree.
//!
//! Every key list is sorted by its serialized x-only bytes before a script is assembled, so
//! any permutation of the same key set yields byte-identical scripts.

use std::sync::LazyLock;

use bitcoin::{
    ScriptBuf, XOnlyPublicKey,
    opcodes::all::{
        OP_CHECKSIG, OP_CHECKSIGADD, OP_CHECKSIGVERIFY, OP_CSV, OP_NUMEQUAL, OP_NUMEQUALVERIFY,
    },
    script::Builder,
};

use crate::errors::{KeyRole, KeySetFault, StakingScriptError};

/// x-coordinate of `H = lift_x(SHA256(G))`, a point with no known discrete log (BIP341).
const UNSPENDABLE_KEY_BYTES: [u8; 32] = [
    0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a, 0x5e,
    0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80, 0x3a, 0xc0,
];

/// Internal key of every staking output, which disables the key path.
pub static UNSPENDABLE_INTERNAL_KEY: LazyLock<XOnlyPublicKey> = LazyLock::new(|| {
    XOnlyPublicKey::from_slice(&UNSPENDABLE_KEY_BYTES).expect("NUMS point is on the curve")
});

/// Sorts a key list into script order, rejecting empty lists and duplicates.
pub fn sort_keys(
    keys: &[XOnlyPublicKey],
    role: KeyRole,
) -> Result<Vec<XOnlyPublicKey>, StakingScriptError> {
    if keys.is_empty() {
        return Err(StakingScriptError::InvalidKeySet {
            role,
            fault: KeySetFault::Empty,
        });
    }

    let mut sorted = keys.to_vec();
    sorted.sort_by_key(|pk| pk.serialize());
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(StakingScriptError::InvalidKeySet {
            role,
            fault: KeySetFault::Duplicate,
        });
    }

    Ok(sorted)
}

/// Canonical key material shared by the three leaves of a staking or unbonding output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptKeys {
    staker: XOnlyPublicKey,
    validators: Vec<XOnlyPublicKey>,
    covenants: Vec<XOnlyPublicKey>,
    covenant_quorum: u32,
}

impl ScriptKeys {
    pub fn new(
        staker: XOnlyPublicKey,
        validators: &[XOnlyPublicKey],
        covenants: &[XOnlyPublicKey],
        covenant_quorum: u32,
    ) -> Result<Self, StakingScriptError> {
        let validators = sort_keys(validators, KeyRole::Validator)?;
        let covenants = sort_keys(covenants, KeyRole::Covenant)?;
        for (role, keys) in [(KeyRole::Validator, &validators), (KeyRole::Covenant, &covenants)] {
            if keys.contains(&staker) {
                return Err(StakingScriptError::InvalidKeySet {
                    role,
                    fault: KeySetFault::ContainsStaker,
                });
            }
        }
        if covenant_quorum == 0 || covenant_quorum as usize > covenants.len() {
            return Err(StakingScriptError::InvalidQuorum {
                quorum: covenant_quorum,
                size: covenants.len(),
            });
        }

        Ok(Self {
            staker,
            validators,
            covenants,
            covenant_quorum,
        })
    }

    pub fn staker(&self) -> &XOnlyPublicKey {
        &self.staker
    }

    /// Validator keys in script order.
    pub fn validators(&self) -> &[XOnlyPublicKey] {
        &self.validators
    }

    /// Covenant keys in script order.
    pub fn covenants(&self) -> &[XOnlyPublicKey] {
        &self.covenants
    }

    pub fn covenant_quorum(&self) -> u32 {
        self.covenant_quorum
    }

    /// `<staker> OP_CHECKSIGVERIFY <timelock> OP_CSV`
    pub fn timelock_script(&self, timelock: u16) -> Result<ScriptBuf, StakingScriptError> {
        timelock_script(&self.staker, timelock)
    }

    /// Staker signature followed by a covenant quorum.
    pub fn unbonding_script(&self) -> ScriptBuf {
        let builder = push_single_key(Builder::new(), &self.staker, true);
        push_multisig(builder, &self.covenants, self.covenant_quorum, false).into_script()
    }

    /// Staker signature, one validator signature, then a covenant quorum.
    pub fn slashing_script(&self) -> ScriptBuf {
        let builder = push_single_key(Builder::new(), &self.staker, true);
        let builder = push_multisig(builder, &self.validators, 1, true);
        push_multisig(builder, &self.covenants, self.covenant_quorum, false).into_script()
    }
}

/// `<pk> OP_CHECKSIGVERIFY <timelock> OP_CSV`
pub fn timelock_script(
    pk: &XOnlyPublicKey,
    timelock: u16,
) -> Result<ScriptBuf, StakingScriptError> {
    if timelock == 0 {
        return Err(StakingScriptError::InvalidTimelock);
    }
    Ok(push_single_key(Builder::new(), pk, true)
        .push_int(i64::from(timelock))
        .push_opcode(OP_CSV)
        .into_script())
}

/// Builds a `quorum`-of-`keys` tapscript multisig.
///
/// Keys are sorted first. A single key collapses to `<pk> OP_CHECKSIG[VERIFY]`.
pub fn multisig_script(
    keys: &[XOnlyPublicKey],
    quorum: u32,
    verify: bool,
    role: KeyRole,
) -> Result<ScriptBuf, StakingScriptError> {
    let sorted = sort_keys(keys, role)?;
    if quorum == 0 || quorum as usize > sorted.len() {
        return Err(StakingScriptError::InvalidQuorum {
            quorum,
            size: sorted.len(),
        });
    }
    Ok(push_multisig(Builder::new(), &sorted, quorum, verify).into_script())
}

fn push_single_key(builder: Builder, pk: &XOnlyPublicKey, verify: bool) -> Builder {
    let op = if verify { OP_CHECKSIGVERIFY } else { OP_CHECKSIG };
    builder.push_x_only_key(pk).push_opcode(op)
}

/// Expects `sorted` to be non-empty, sorted and duplicate free.
fn push_multisig(
    mut builder: Builder,
    sorted: &[XOnlyPublicKey],
    quorum: u32,
    verify: bool,
) -> Builder {
    if let [pk] = sorted {
        return push_single_key(builder, pk, verify);
    }

    for (i, pk) in sorted.iter().enumerate() {
        let op = if i == 0 { OP_CHECKSIG } else { OP_CHECKSIGADD };
        builder = builder.push_x_only_key(pk).push_opcode(op);
    }

    let op = if verify { OP_NUMEQUALVERIFY } else { OP_NUMEQUAL };
    builder.push_int(i64::from(quorum)).push_opcode(op)
}
