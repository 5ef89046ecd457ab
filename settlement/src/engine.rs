//! Hop validation and staged atomic execution.

use crate::error::SettlementError;
use crate::path::{Hop, PathSettled, PathValidator};
use halo_token::PersonalToken;
use halo_trust::{tradeable_capacity, TrustGraph};
use halo_types::{Timestamp, UserAddress};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Maximum amount of `token_owner`'s token that may currently flow so that
/// `dest` ends up holding it. Never fails; unknown inputs read as zero.
///
/// The "return" leg — sending the owner's token back to the owner — is
/// bounded by what `src` already holds of it rather than the percentage
/// formula: returning never needs trust beyond what was already extended.
/// All reads are live (pending issuance included in supply and the owner's
/// balance).
pub fn send_limit(
    tokens: &HashMap<UserAddress, PersonalToken>,
    graph: &TrustGraph,
    token_owner: &UserAddress,
    src: &UserAddress,
    dest: &UserAddress,
    now: Timestamp,
) -> u128 {
    match tokens.get(token_owner) {
        Some(token) => hop_capacity(token, graph, src, dest, now),
        None => 0,
    }
}

/// Capacity of one hop against a concrete token state. During settlement
/// this is evaluated against the staged token, so earlier hops in the same
/// call consume (or, by forwarding, free) capacity for later ones.
fn hop_capacity(
    token: &PersonalToken,
    graph: &TrustGraph,
    src: &UserAddress,
    dest: &UserAddress,
    now: Timestamp,
) -> u128 {
    if token.owner() == dest {
        return token.balance_of(src, now);
    }
    let limit = graph.limit(dest, token.owner());
    if limit == 0 {
        // covers src == dest with no edge: no further capacity needed
        return 0;
    }
    tradeable_capacity(token.total_supply(now), limit, token.balance_of(dest, now))
}

/// Validate and execute a batch of hops as one indivisible unit of work.
///
/// A single left-to-right pass, linear in the hop count, checks each hop and
/// immediately applies it to a staged clone of the affected token. Capacity
/// is therefore measured against the in-call state: hops crediting the same
/// receiver with the same token draw down one shared cap, and a hop can
/// never leave a receiver holding more than their trust limit allows. The
/// clones are committed back only after the last hop succeeds and the path
/// as a whole conserves, so a failure anywhere leaves `tokens` untouched.
/// The validator lives on the stack and is consumed before return on every
/// exit path.
pub fn settle(
    tokens: &mut HashMap<UserAddress, PersonalToken>,
    graph: &TrustGraph,
    hops: &[Hop],
    now: Timestamp,
) -> Result<PathSettled, SettlementError> {
    if hops.is_empty() {
        return Err(SettlementError::EmptyPath);
    }

    let mut validator = PathValidator::new();
    let mut staged: HashMap<UserAddress, PersonalToken> = HashMap::new();
    for (i, hop) in hops.iter().enumerate() {
        if hop.src == hop.dest {
            return Err(SettlementError::SelfHop { hop: i });
        }
        if hop.amount == 0 {
            return Err(SettlementError::ZeroAmount { hop: i });
        }
        let live = staged
            .get(&hop.token_owner)
            .or_else(|| tokens.get(&hop.token_owner))
            .ok_or_else(|| SettlementError::UnknownToken(hop.token_owner.clone()))?;
        let capacity = hop_capacity(live, graph, &hop.src, &hop.dest, now);
        if hop.amount > capacity {
            return Err(SettlementError::TrustExceeded {
                hop: i,
                amount: hop.amount,
                capacity,
            });
        }
        validator.record_hop(hop)?;
        let token = match staged.entry(hop.token_owner.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let clone = tokens
                    .get(&hop.token_owner)
                    .cloned()
                    .ok_or_else(|| SettlementError::UnknownToken(hop.token_owner.clone()))?;
                entry.insert(clone)
            }
        };
        token.hub_transfer(&hop.src, &hop.dest, hop.amount)?;
        tracing::debug!(
            hop = i,
            token = %hop.token_owner,
            src = %hop.src,
            dest = %hop.dest,
            amount = hop.amount,
            capacity,
            "hop validated"
        );
    }
    let settled = validator.finish(&hops[0].src, &hops[hops.len() - 1].dest)?;

    for (owner, token) in staged {
        tokens.insert(owner, token);
    }

    tracing::info!(
        src = %settled.src,
        dest = %settled.dest,
        amount = settled.amount,
        hops = hops.len(),
        "path settled"
    );
    Ok(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::build_hops;
    use halo_types::HubParams;

    fn test_address(n: u8) -> UserAddress {
        UserAddress::new(format!("halo_{:0>40}", n))
    }

    /// Zero-issuance params so supplies stay at the signup payout and
    /// capacity arithmetic is exact in tests.
    fn flat_params(payout: u128) -> HubParams {
        HubParams {
            initial_issuance: 0,
            signup_payout: payout,
            ..HubParams::halo_defaults()
        }
    }

    fn world(users: &[u8], payout: u128) -> HashMap<UserAddress, PersonalToken> {
        users
            .iter()
            .map(|&n| {
                let addr = test_address(n);
                (
                    addr.clone(),
                    PersonalToken::new(addr, &flat_params(payout), Timestamp::new(0)),
                )
            })
            .collect()
    }

    fn hops(raw: &[(u8, u8, u8, u128)]) -> Vec<Hop> {
        let owners: Vec<_> = raw.iter().map(|h| test_address(h.0)).collect();
        let srcs: Vec<_> = raw.iter().map(|h| test_address(h.1)).collect();
        let dests: Vec<_> = raw.iter().map(|h| test_address(h.2)).collect();
        let amounts: Vec<_> = raw.iter().map(|h| h.3).collect();
        build_hops(&owners, &srcs, &dests, &amounts).unwrap()
    }

    #[test]
    fn send_limit_is_zero_for_unknown_token() {
        let tokens = world(&[1], 100);
        let graph = TrustGraph::new();
        assert_eq!(
            send_limit(&tokens, &graph, &test_address(9), &test_address(1), &test_address(2), Timestamp::new(0)),
            0
        );
    }

    #[test]
    fn send_limit_applies_the_percentage_formula() {
        let tokens = world(&[1, 2], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        // 50% of supply 100, dest holds none
        assert_eq!(
            send_limit(&tokens, &graph, &test_address(1), &test_address(1), &test_address(2), Timestamp::new(0)),
            50
        );
    }

    #[test]
    fn return_leg_is_bounded_by_held_balance() {
        let mut tokens = world(&[1, 2], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        // B now holds 30 of A's token.
        tokens
            .get_mut(&test_address(1))
            .unwrap()
            .hub_transfer(&test_address(1), &test_address(2), 30)
            .unwrap();
        // Returning A's token to A is capped by what B holds, no edge needed.
        assert_eq!(
            send_limit(&tokens, &graph, &test_address(1), &test_address(2), &test_address(1), Timestamp::new(0)),
            30
        );
    }

    #[test]
    fn settle_moves_balances_along_a_chain() {
        let mut tokens = world(&[1, 2, 3], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        graph.set_limit(&test_address(3), &test_address(2), 50).unwrap();

        let batch = hops(&[(1, 1, 2, 25), (2, 2, 3, 25)]);
        let settled = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap();
        assert_eq!(settled.amount, 25);

        let now = Timestamp::new(0);
        let a = test_address(1);
        let b = test_address(2);
        let c = test_address(3);
        assert_eq!(tokens[&a].balance_of(&a, now), 75);
        assert_eq!(tokens[&a].balance_of(&b, now), 25);
        assert_eq!(tokens[&b].balance_of(&b, now), 75);
        assert_eq!(tokens[&b].balance_of(&c, now), 25);
    }

    #[test]
    fn capacity_failure_leaves_every_balance_untouched() {
        let mut tokens = world(&[1, 2, 3], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        graph.set_limit(&test_address(3), &test_address(2), 10).unwrap();

        // second hop exceeds C's 10% limit on B's token
        let batch = hops(&[(1, 1, 2, 25), (2, 2, 3, 25)]);
        let err = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::TrustExceeded { hop: 1, amount: 25, capacity: 10 }
        ));

        let now = Timestamp::new(0);
        for n in [1u8, 2, 3] {
            let addr = test_address(n);
            assert_eq!(tokens[&addr].balance_of(&addr, now), 100);
        }
    }

    #[test]
    fn insufficient_realized_balance_aborts_without_partial_commit() {
        // C's trust capacity allows the hop, but A's realized balance can't
        // fund it: staging must fail and nothing may change.
        let mut tokens = world(&[1, 2, 3], 10);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(3), &test_address(1), 100).unwrap();

        // Drain A to 5 realized; C holds none, so capacity reads 10.
        tokens
            .get_mut(&test_address(1))
            .unwrap()
            .hub_transfer(&test_address(1), &test_address(2), 5)
            .unwrap();

        let batch = hops(&[(1, 1, 3, 6)]);
        let err = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap_err();
        assert!(matches!(err, SettlementError::Token(_)));

        let now = Timestamp::new(0);
        let a = test_address(1);
        let b = test_address(2);
        let c = test_address(3);
        assert_eq!(tokens[&a].balance_of(&a, now), 5);
        assert_eq!(tokens[&a].balance_of(&b, now), 5);
        assert_eq!(tokens[&a].balance_of(&c, now), 0);
    }

    #[test]
    fn repeated_credits_to_one_receiver_share_a_single_cap() {
        // B trusts A at 50% of a 100 supply. Two 30-unit credits each fit
        // under 50 in isolation, but the second must see the 20 units left
        // after the first; letting both through would leave B holding 60.
        let mut tokens = world(&[1, 2, 3], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        graph.set_limit(&test_address(3), &test_address(2), 100).unwrap();

        let batch = hops(&[(1, 1, 2, 30), (1, 1, 2, 30), (2, 2, 3, 60)]);
        let err = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::TrustExceeded { hop: 1, amount: 30, capacity: 20 }
        ));

        let now = Timestamp::new(0);
        for n in [1u8, 2, 3] {
            let addr = test_address(n);
            assert_eq!(tokens[&addr].balance_of(&addr, now), 100);
        }
    }

    #[test]
    fn forwarding_within_the_call_frees_capacity() {
        // B's 50% cap on A's token is consumed by the first hop, partially
        // returned by the second, and re-filled to exactly the cap by the
        // third. Capacity tracks the in-call balances, not the pre-call ones.
        let mut tokens = world(&[1, 2], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();

        let batch = hops(&[(1, 1, 2, 50), (1, 2, 1, 20), (1, 1, 2, 20)]);
        let settled = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap();
        assert_eq!(settled.amount, 50);

        let now = Timestamp::new(0);
        let a = test_address(1);
        let b = test_address(2);
        assert_eq!(tokens[&a].balance_of(&b, now), 50);
        assert_eq!(tokens[&a].balance_of(&a, now), 50);
    }

    #[test]
    fn self_hop_is_rejected_with_its_index() {
        let mut tokens = world(&[1, 2], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        let batch = hops(&[(1, 1, 2, 10), (2, 2, 2, 10)]);
        assert!(matches!(
            settle(&mut tokens, &graph, &batch, Timestamp::new(0)),
            Err(SettlementError::SelfHop { hop: 1 })
        ));
    }

    #[test]
    fn fork_settles_both_branches() {
        // A -> {B, D} -> C, 15 + 10
        let mut tokens = world(&[1, 2, 3, 4], 100);
        let mut graph = TrustGraph::new();
        graph.set_limit(&test_address(2), &test_address(1), 50).unwrap();
        graph.set_limit(&test_address(4), &test_address(1), 50).unwrap();
        graph.set_limit(&test_address(3), &test_address(2), 50).unwrap();
        graph.set_limit(&test_address(3), &test_address(4), 50).unwrap();

        let batch = hops(&[
            (1, 1, 2, 15),
            (1, 1, 4, 10),
            (2, 2, 3, 15),
            (4, 4, 3, 10),
        ]);
        let settled = settle(&mut tokens, &graph, &batch, Timestamp::new(0)).unwrap();
        assert_eq!(settled.amount, 25);
        assert_eq!(settled.src, test_address(1));
        assert_eq!(settled.dest, test_address(3));

        let now = Timestamp::new(0);
        let b = test_address(2);
        let c = test_address(3);
        let d = test_address(4);
        assert_eq!(tokens[&b].balance_of(&b, now), 85);
        assert_eq!(tokens[&d].balance_of(&d, now), 90);
        assert_eq!(tokens[&b].balance_of(&c, now), 15);
        assert_eq!(tokens[&d].balance_of(&c, now), 10);
    }
}
